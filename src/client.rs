//! Modbus TCP client and request executor
//!
//! Every operation runs the same single pass:
//!
//! 1. fail fast with `NoConnection` if the transport is not connected
//! 2. check arguments, draw a transaction id, encode the frame
//! 3. drop stale input, send
//! 4. accumulate the response (see [`crate::accumulator`])
//! 5. resolve: exception frame, complete frame (validated and decoded) or
//!    short read (`Timeout`)
//!
//! No step is retried. The function-specific parts (layout, limits,
//! expected length, echo fields) all come from [`ModbusRequest`], so the
//! executor is the same for every function code.
//!
//! # API Naming Convention
//!
//! | Function Code | Primary Name | Semantic Alias |
//! |---------------|--------------|----------------|
//! | 0x01 | `read_01()` | `read_coils()` |
//! | 0x02 | `read_02()` | `read_discrete_inputs()` |
//! | 0x03 | `read_03()` | `read_holding_registers()` |
//! | 0x04 | `read_04()` | `read_input_registers()` |
//! | 0x05 | `write_05()` | `write_single_coil()` |
//! | 0x06 | `write_06()` | `write_single_register()` |
//! | 0x0F | `write_0f()` | `write_multiple_coils()` |
//! | 0x10 | `write_10()` | `write_multiple_registers()` |
//! | 0x16 | `mask_write_16()` | `mask_write_register()` |
//! | 0x17 | `read_write_17()` | `read_write_multiple_registers()`, `write_read_multiple_registers()` |
//! | 0x18 | `read_18()` | `read_fifo_queue()` |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voltage_mbap::{ClientConfig, ModbusClient, ModbusResult, ModbusTcpClient, Status};
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     let mut client = ModbusTcpClient::connect("127.0.0.1", 502, ClientConfig::default()).await?;
//!
//!     let result = client.read_03(1, 0, 10).await;
//!     match Status::from(&result) {
//!         Status::Ok => println!("Registers: {:?}", result?),
//!         status => println!("Read failed: {}", status),
//!     }
//!
//!     client.write_06(1, 100, 0x1234).await?;
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::accumulator::{accumulate, read_burst};
use crate::codec::{decode_response, encode_request};
use crate::config::ClientConfig;
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{ModbusRequest, ModbusResponse, SlaveId};
use crate::status::{resolve, FrameOutcome, Status};
use crate::transaction::{RandomTransactionIds, TransactionIdGenerator};
use crate::transport::{ModbusTransport, TcpTransport, TransportStats};

/// Interface for Modbus client operations.
///
/// Each call is one complete request/response exchange. `&mut self` keeps a
/// single request outstanding per connection. Failures come back as
/// [`ModbusError`]; use [`Status::from`] to reduce a result to its status.
///
/// # Protocol Limits
///
/// | Operation | Limit |
/// |-----------|-------|
/// | Read Coils / Discrete Inputs | 1-2000 |
/// | Read Holding / Input Registers | 1-125 |
/// | Write Multiple Coils | 1-1968 |
/// | Write Multiple Registers | 1-123 |
/// | Read/Write Multiple Registers | read 1-125, write 1-121 |
pub trait ModbusClient: Send + Sync {
    /// Read coils (function code 0x01).
    ///
    /// Returns exactly `quantity` states; padding bits of the last response
    /// byte are dropped.
    fn read_01(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<bool>>> + Send;

    /// Read discrete inputs (function code 0x02).
    fn read_02(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<bool>>> + Send;

    /// Read holding registers (function code 0x03).
    fn read_03(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send;

    /// Read input registers (function code 0x04).
    fn read_04(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send;

    /// Write single coil (function code 0x05). `true` is sent as 0xFF00.
    fn write_05(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        value: bool,
    ) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Write single register (function code 0x06).
    fn write_06(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        value: u16,
    ) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Write multiple coils (function code 0x0F).
    fn write_0f(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[bool],
    ) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Write multiple registers (function code 0x10).
    fn write_10(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[u16],
    ) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Mask write register (function code 0x16).
    ///
    /// The device computes `(current AND and_mask) OR (or_mask AND NOT and_mask)`.
    fn mask_write_16(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Read/write multiple registers (function code 0x17), arguments in
    /// wire order. The write is performed before the read.
    fn read_write_17(
        &mut self,
        slave_id: SlaveId,
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        values: &[u16],
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send;

    /// Read FIFO queue (function code 0x18). Returns up to 31 registers.
    fn read_18(
        &mut self,
        slave_id: SlaveId,
        fifo_address: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send;

    /// Send a non-standard function code with an opaque payload.
    ///
    /// The response is framed and validated like any other (transaction,
    /// unit and function code must match); its payload after the function
    /// code is returned unchanged.
    fn execute_custom(
        &mut self,
        slave_id: SlaveId,
        function_code: u8,
        data: &[u8],
    ) -> impl Future<Output = ModbusResult<Bytes>> + Send;

    /// Send `data` verbatim and return whatever arrives in the first burst.
    ///
    /// No framing is added and nothing is validated.
    fn execute_raw(&mut self, data: &[u8]) -> impl Future<Output = ModbusResult<Bytes>> + Send;

    /// Check if the client is connected.
    fn is_connected(&self) -> bool;

    /// Close the client connection.
    fn close(&mut self) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Get transport statistics.
    fn get_stats(&self) -> TransportStats;

    // ===== Semantic name aliases =====

    /// Alias for `read_01`
    #[inline]
    fn read_coils(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<bool>>> + Send {
        self.read_01(slave_id, address, quantity)
    }

    /// Alias for `read_02`
    #[inline]
    fn read_discrete_inputs(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<bool>>> + Send {
        self.read_02(slave_id, address, quantity)
    }

    /// Alias for `read_03`
    #[inline]
    fn read_holding_registers(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_03(slave_id, address, quantity)
    }

    /// Alias for `read_04`
    #[inline]
    fn read_input_registers(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_04(slave_id, address, quantity)
    }

    /// Alias for `write_05`
    #[inline]
    fn write_single_coil(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        value: bool,
    ) -> impl Future<Output = ModbusResult<()>> + Send {
        self.write_05(slave_id, address, value)
    }

    /// Alias for `write_06`
    #[inline]
    fn write_single_register(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        value: u16,
    ) -> impl Future<Output = ModbusResult<()>> + Send {
        self.write_06(slave_id, address, value)
    }

    /// Alias for `write_0f`
    #[inline]
    fn write_multiple_coils(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[bool],
    ) -> impl Future<Output = ModbusResult<()>> + Send {
        self.write_0f(slave_id, address, values)
    }

    /// Alias for `write_10`
    #[inline]
    fn write_multiple_registers(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[u16],
    ) -> impl Future<Output = ModbusResult<()>> + Send {
        self.write_10(slave_id, address, values)
    }

    /// Alias for `mask_write_16`
    #[inline]
    fn mask_write_register(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> impl Future<Output = ModbusResult<()>> + Send {
        self.mask_write_16(slave_id, address, and_mask, or_mask)
    }

    /// Alias for `read_write_17`
    #[inline]
    fn read_write_multiple_registers(
        &mut self,
        slave_id: SlaveId,
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        values: &[u16],
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_write_17(slave_id, read_address, read_quantity, write_address, values)
    }

    /// `read_write_17` with the write arguments first
    #[inline]
    fn write_read_multiple_registers(
        &mut self,
        slave_id: SlaveId,
        write_address: u16,
        values: &[u16],
        read_address: u16,
        read_quantity: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_write_17(slave_id, read_address, read_quantity, write_address, values)
    }

    /// Alias for `read_18`
    #[inline]
    fn read_fifo_queue(
        &mut self,
        slave_id: SlaveId,
        fifo_address: u16,
    ) -> impl Future<Output = ModbusResult<Vec<u16>>> + Send {
        self.read_18(slave_id, fifo_address)
    }
}

/// Request executor over any byte-stream transport
///
/// `G` supplies transaction ids; the default draws them from a time-seeded
/// generator owned by this client.
pub struct GenericModbusClient<T: ModbusTransport, G: TransactionIdGenerator = RandomTransactionIds> {
    transport: T,
    transaction_ids: G,
    config: ClientConfig,
}

impl<T: ModbusTransport> GenericModbusClient<T> {
    /// Create a client with default settings
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self::with_transaction_ids(transport, config, RandomTransactionIds::new())
    }
}

impl<T: ModbusTransport, G: TransactionIdGenerator> GenericModbusClient<T, G> {
    /// Create a client with an explicit transaction id source
    pub fn with_transaction_ids(transport: T, config: ClientConfig, transaction_ids: G) -> Self {
        Self {
            transport,
            transaction_ids,
            config,
        }
    }

    /// Get a reference to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Change the per-wait response timeout for subsequent requests
    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.config.response_timeout = timeout;
    }

    /// Execute one request and record its outcome in the transport stats.
    pub async fn execute_request(
        &mut self,
        slave_id: SlaveId,
        request: ModbusRequest,
    ) -> ModbusResult<ModbusResponse> {
        let result = self.transact(slave_id, &request).await;

        let status = Status::from(&result);
        self.transport.record_outcome(status);
        if let Err(ref e) = result {
            debug!("{} to slave {} failed: {} ({})", request.name(), slave_id, e, status);
        }

        result
    }

    async fn transact(
        &mut self,
        slave_id: SlaveId,
        request: &ModbusRequest,
    ) -> ModbusResult<ModbusResponse> {
        if !self.transport.is_connected() {
            return Err(ModbusError::NoConnection);
        }
        request.validate()?;

        let transaction_id = self.transaction_ids.next_id();
        let frame = encode_request(transaction_id, slave_id, request)?;
        let shape = request.response_shape();

        self.transport.discard_pending_input();
        self.transport.write(&frame).await?;
        debug!(
            "Sent {} tid={:04X} slave={}, expecting {:?}",
            request.name(),
            transaction_id,
            slave_id,
            shape
        );

        let timeout = self.config.response_timeout;
        let response = accumulate(&mut self.transport, shape, timeout).await;

        match resolve(&response, shape) {
            FrameOutcome::Complete => decode_response(&response, transaction_id, slave_id, request),
            FrameOutcome::Exception(code) => {
                warn!(
                    "Slave {} answered {} with exception 0x{:02X}",
                    slave_id,
                    request.name(),
                    code
                );
                Err(ModbusError::exception(request.function_code(), code))
            }
            FrameOutcome::Incomplete => {
                debug!(
                    "Short read for tid={:04X}: {} bytes collected",
                    transaction_id,
                    response.len()
                );
                Err(ModbusError::timeout(request.name(), timeout.as_millis() as u64))
            }
        }
    }

    /// Unframed exchange: send as-is, take the first burst back.
    pub async fn execute_raw_request(&mut self, data: &[u8]) -> ModbusResult<Bytes> {
        let result = self.transact_raw(data).await;
        self.transport.record_outcome(Status::from(&result));
        result
    }

    async fn transact_raw(&mut self, data: &[u8]) -> ModbusResult<Bytes> {
        if !self.transport.is_connected() {
            return Err(ModbusError::NoConnection);
        }

        self.transport.discard_pending_input();
        self.transport.write(data).await?;

        let timeout = self.config.response_timeout;
        let burst = read_burst(&mut self.transport, timeout).await;
        if burst.is_empty() {
            return Err(ModbusError::timeout("raw request", timeout.as_millis() as u64));
        }
        Ok(burst.freeze())
    }
}

impl<T: ModbusTransport, G: TransactionIdGenerator> ModbusClient for GenericModbusClient<T, G> {
    async fn read_01(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.execute_request(slave_id, ModbusRequest::ReadCoils { address, quantity })
            .await?
            .into_bits()
    }

    async fn read_02(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.execute_request(slave_id, ModbusRequest::ReadDiscreteInputs { address, quantity })
            .await?
            .into_bits()
    }

    async fn read_03(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.execute_request(slave_id, ModbusRequest::ReadHoldingRegisters { address, quantity })
            .await?
            .into_registers()
    }

    async fn read_04(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.execute_request(slave_id, ModbusRequest::ReadInputRegisters { address, quantity })
            .await?
            .into_registers()
    }

    async fn write_05(&mut self, slave_id: SlaveId, address: u16, value: bool) -> ModbusResult<()> {
        self.execute_request(slave_id, ModbusRequest::WriteSingleCoil { address, value })
            .await?
            .into_written()
    }

    async fn write_06(&mut self, slave_id: SlaveId, address: u16, value: u16) -> ModbusResult<()> {
        self.execute_request(slave_id, ModbusRequest::WriteSingleRegister { address, value })
            .await?
            .into_written()
    }

    async fn write_0f(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[bool],
    ) -> ModbusResult<()> {
        let request = ModbusRequest::WriteMultipleCoils {
            address,
            values: values.to_vec(),
        };
        self.execute_request(slave_id, request).await?.into_written()
    }

    async fn write_10(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[u16],
    ) -> ModbusResult<()> {
        let request = ModbusRequest::WriteMultipleRegisters {
            address,
            values: values.to_vec(),
        };
        self.execute_request(slave_id, request).await?.into_written()
    }

    async fn mask_write_16(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> ModbusResult<()> {
        let request = ModbusRequest::MaskWriteRegister {
            address,
            and_mask,
            or_mask,
        };
        self.execute_request(slave_id, request).await?.into_written()
    }

    async fn read_write_17(
        &mut self,
        slave_id: SlaveId,
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        values: &[u16],
    ) -> ModbusResult<Vec<u16>> {
        let request = ModbusRequest::ReadWriteMultipleRegisters {
            read_address,
            read_quantity,
            write_address,
            values: values.to_vec(),
        };
        self.execute_request(slave_id, request).await?.into_registers()
    }

    async fn read_18(&mut self, slave_id: SlaveId, fifo_address: u16) -> ModbusResult<Vec<u16>> {
        self.execute_request(slave_id, ModbusRequest::ReadFifoQueue { fifo_address })
            .await?
            .into_registers()
    }

    async fn execute_custom(
        &mut self,
        slave_id: SlaveId,
        function_code: u8,
        data: &[u8],
    ) -> ModbusResult<Bytes> {
        let request = ModbusRequest::Custom {
            function_code,
            data: data.to_vec(),
        };
        self.execute_request(slave_id, request).await?.into_payload()
    }

    async fn execute_raw(&mut self, data: &[u8]) -> ModbusResult<Bytes> {
        self.execute_raw_request(data).await
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    async fn close(&mut self) -> ModbusResult<()> {
        self.transport.close().await
    }

    fn get_stats(&self) -> TransportStats {
        self.transport.get_stats()
    }
}

/// Modbus TCP client
pub struct ModbusTcpClient {
    inner: GenericModbusClient<TcpTransport>,
}

impl ModbusTcpClient {
    /// Connect to `addr`; `timeout` bounds both the connect and each
    /// response wait.
    pub async fn new(addr: SocketAddr, timeout: Duration) -> ModbusResult<Self> {
        let config = ClientConfig::new()
            .with_connect_timeout(timeout)
            .with_response_timeout(timeout);
        config.validate()?;
        let transport = TcpTransport::new(addr, config.connect_timeout).await?;
        Ok(Self::with_transport(transport, config))
    }

    /// Create a new TCP client from an `ip:port` string
    pub async fn from_address(addr: &str, timeout: Duration) -> ModbusResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| ModbusError::configuration(format!("Invalid address: {}", e)))?;
        Self::new(addr, timeout).await
    }

    /// Resolve `host` and connect with the given settings
    pub async fn connect(host: &str, port: u16, config: ClientConfig) -> ModbusResult<Self> {
        config.validate()?;
        let transport = TcpTransport::connect(host, port, config.connect_timeout).await?;
        Ok(Self::with_transport(transport, config))
    }

    /// Create a new TCP client from a connected transport
    pub fn from_transport(transport: TcpTransport) -> Self {
        Self::with_transport(transport, ClientConfig::default())
    }

    fn with_transport(mut transport: TcpTransport, config: ClientConfig) -> Self {
        transport.set_packet_logging(config.packet_logging);
        Self {
            inner: GenericModbusClient::with_config(transport, config),
        }
    }

    /// Get the server address
    pub fn server_address(&self) -> SocketAddr {
        self.inner.transport().address
    }

    /// Enable or disable packet logging on existing client
    pub fn set_packet_logging(&mut self, enabled: bool) {
        self.inner.config.packet_logging = enabled;
        self.inner.transport_mut().set_packet_logging(enabled);
    }

    /// Change the per-wait response timeout for subsequent requests
    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.inner.set_response_timeout(timeout);
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    /// Connection state notifications, `false` once the connection is gone
    pub fn subscribe_connection_state(&self) -> watch::Receiver<bool> {
        self.inner.transport().subscribe()
    }

    /// Execute a prepared request
    pub async fn execute_request(
        &mut self,
        slave_id: SlaveId,
        request: ModbusRequest,
    ) -> ModbusResult<ModbusResponse> {
        self.inner.execute_request(slave_id, request).await
    }
}

impl ModbusClient for ModbusTcpClient {
    async fn read_01(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.inner.read_01(slave_id, address, quantity).await
    }

    async fn read_02(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<bool>> {
        self.inner.read_02(slave_id, address, quantity).await
    }

    async fn read_03(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.inner.read_03(slave_id, address, quantity).await
    }

    async fn read_04(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        quantity: u16,
    ) -> ModbusResult<Vec<u16>> {
        self.inner.read_04(slave_id, address, quantity).await
    }

    async fn write_05(&mut self, slave_id: SlaveId, address: u16, value: bool) -> ModbusResult<()> {
        self.inner.write_05(slave_id, address, value).await
    }

    async fn write_06(&mut self, slave_id: SlaveId, address: u16, value: u16) -> ModbusResult<()> {
        self.inner.write_06(slave_id, address, value).await
    }

    async fn write_0f(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[bool],
    ) -> ModbusResult<()> {
        self.inner.write_0f(slave_id, address, values).await
    }

    async fn write_10(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        values: &[u16],
    ) -> ModbusResult<()> {
        self.inner.write_10(slave_id, address, values).await
    }

    async fn mask_write_16(
        &mut self,
        slave_id: SlaveId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> ModbusResult<()> {
        self.inner
            .mask_write_16(slave_id, address, and_mask, or_mask)
            .await
    }

    async fn read_write_17(
        &mut self,
        slave_id: SlaveId,
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        values: &[u16],
    ) -> ModbusResult<Vec<u16>> {
        self.inner
            .read_write_17(slave_id, read_address, read_quantity, write_address, values)
            .await
    }

    async fn read_18(&mut self, slave_id: SlaveId, fifo_address: u16) -> ModbusResult<Vec<u16>> {
        self.inner.read_18(slave_id, fifo_address).await
    }

    async fn execute_custom(
        &mut self,
        slave_id: SlaveId,
        function_code: u8,
        data: &[u8],
    ) -> ModbusResult<Bytes> {
        self.inner.execute_custom(slave_id, function_code, data).await
    }

    async fn execute_raw(&mut self, data: &[u8]) -> ModbusResult<Bytes> {
        self.inner.execute_raw(data).await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn close(&mut self) -> ModbusResult<()> {
        self.inner.close().await
    }

    fn get_stats(&self) -> TransportStats {
        self.inner.get_stats()
    }
}
