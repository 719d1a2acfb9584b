//! # Byte-Stream Transport
//!
//! The executor talks to the device through the small byte-stream contract
//! of [`ModbusTransport`]: write a frame, drop stale input, wait for data
//! with a timeout, and take whatever bytes have arrived. Framing and
//! validation live above this layer, so a transport never interprets the
//! bytes it moves.
//!
//! [`TcpTransport`] is the tokio implementation. It buffers received bytes
//! internally so a wait that times out never loses data, and it publishes
//! connection state through a [`tokio::sync::watch`] channel.
//!
//! ```rust,no_run
//! use voltage_mbap::transport::{ModbusTransport, TcpTransport};
//! use std::time::Duration;
//!
//! # async fn example() -> voltage_mbap::ModbusResult<()> {
//! let mut transport = TcpTransport::connect("192.168.1.10", 502, Duration::from_secs(1)).await?;
//! let mut state = transport.subscribe();
//!
//! tokio::spawn(async move {
//!     while state.changed().await.is_ok() {
//!         if !*state.borrow() {
//!             println!("connection lost");
//!         }
//!     }
//! });
//!
//! transport.close().await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::constants::MODBUS_RESPONSE_BUFFER_SIZE;
use crate::error::{ModbusError, ModbusResult};
use crate::logging::{frame_unit_id, log_packet};
use crate::status::Status;

/// Byte-stream contract the request executor relies on
pub trait ModbusTransport: Send + Sync {
    /// Local view of the connection; no I/O is performed.
    fn is_connected(&self) -> bool;

    /// Write a complete request frame.
    fn write(&mut self, frame: &[u8]) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Drop every byte received but not yet consumed. Returns the count.
    fn discard_pending_input(&mut self) -> usize;

    /// Wait up to `timeout` for unread bytes.
    ///
    /// Returns `true` as soon as at least one unread byte is available,
    /// `false` on timeout or when the connection goes away.
    fn wait_for_data(&mut self, timeout: Duration) -> impl Future<Output = bool> + Send;

    /// Take up to `max` of the bytes already received, without waiting.
    fn read_available(&mut self, max: usize) -> Bytes;

    /// Close the connection.
    fn close(&mut self) -> impl Future<Output = ModbusResult<()>> + Send;

    /// Communication statistics
    fn get_stats(&self) -> TransportStats;

    /// Account for the final status of one request.
    fn record_outcome(&mut self, _status: Status) {}
}

/// Transport layer statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Bytes left over from earlier exchanges and dropped before a request
    pub stale_bytes_discarded: u64,
}

impl TransportStats {
    /// Fold one request outcome into the counters
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Ok | Status::Exception(_) => self.responses_received += 1,
            Status::Timeout => self.timeouts += 1,
            Status::NoConnection | Status::UnknownError => self.errors += 1,
        }
    }
}

/// Modbus TCP transport
pub struct TcpTransport {
    stream: Option<TcpStream>,
    pub address: SocketAddr,
    pending: BytesMut,
    stats: TransportStats,
    packet_logging: bool,
    state_tx: watch::Sender<bool>,
}

impl TcpTransport {
    /// Connect to `address`, giving up after `timeout`
    pub async fn new(address: SocketAddr, timeout: Duration) -> ModbusResult<Self> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
            .await
            .map_err(|_| ModbusError::timeout(format!("connect to {}", address), timeout.as_millis() as u64))?
            .map_err(|e| ModbusError::connection(format!("Failed to connect to {}: {}", address, e)))?;

        Self::from_stream(stream, address)
    }

    /// Resolve `host` and connect, giving up after `timeout`
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> ModbusResult<Self> {
        let target = format!("{}:{}", host, port);
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ModbusError::timeout(format!("connect to {}", target), timeout.as_millis() as u64))?
            .map_err(|e| ModbusError::connection(format!("Failed to connect to {}: {}", target, e)))?;

        let address = stream
            .peer_addr()
            .map_err(|e| ModbusError::connection(format!("Failed to resolve peer of {}: {}", target, e)))?;
        Self::from_stream(stream, address)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, address: SocketAddr) -> ModbusResult<Self> {
        // Request frames are small and latency bound
        stream.set_nodelay(true)?;
        debug!("Connected to {}", address);

        let (state_tx, _) = watch::channel(true);
        Ok(Self {
            stream: Some(stream),
            address,
            pending: BytesMut::with_capacity(MODBUS_RESPONSE_BUFFER_SIZE),
            stats: TransportStats::default(),
            packet_logging: false,
            state_tx,
        })
    }

    /// Enable or disable packet logging
    pub fn set_packet_logging(&mut self, enabled: bool) {
        self.packet_logging = enabled;
    }

    /// Connection state notifications; the value turns `false` once the
    /// connection is lost or closed.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state_tx.subscribe()
    }

    fn mark_disconnected(&mut self, reason: &str) {
        if self.stream.take().is_some() {
            warn!("Connection to {} lost: {}", self.address, reason);
            self.state_tx.send_replace(false);
        }
    }
}

impl ModbusTransport for TcpTransport {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn write(&mut self, frame: &[u8]) -> ModbusResult<()> {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.write_all(frame).await,
            None => return Err(ModbusError::NoConnection),
        };

        if let Err(e) = result {
            self.stats.errors += 1;
            self.mark_disconnected(&e.to_string());
            return Err(ModbusError::connection(format!("Failed to send request: {}", e)));
        }

        if self.packet_logging {
            log_packet("send", frame, frame_unit_id(frame));
        }
        self.stats.requests_sent += 1;
        self.stats.bytes_sent += frame.len() as u64;
        Ok(())
    }

    fn discard_pending_input(&mut self) -> usize {
        let mut discarded = self.pending.len();
        self.pending.clear();

        let mut lost = None;
        if let Some(stream) = self.stream.as_ref() {
            let mut scratch = [0u8; MODBUS_RESPONSE_BUFFER_SIZE];
            loop {
                match stream.try_read(&mut scratch) {
                    Ok(0) => {
                        lost = Some("peer closed the connection".to_string());
                        break;
                    }
                    Ok(n) => discarded += n,
                    Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                    Err(e) => {
                        lost = Some(e.to_string());
                        break;
                    }
                }
            }
        }
        if let Some(reason) = lost {
            self.mark_disconnected(&reason);
        }

        if discarded > 0 {
            debug!("Discarded {} stale bytes", discarded);
            self.stats.stale_bytes_discarded += discarded as u64;
        }
        discarded
    }

    async fn wait_for_data(&mut self, timeout: Duration) -> bool {
        if !self.pending.is_empty() {
            return true;
        }

        let result = match self.stream.as_mut() {
            Some(stream) => {
                self.pending.reserve(MODBUS_RESPONSE_BUFFER_SIZE);
                tokio::time::timeout(timeout, stream.read_buf(&mut self.pending)).await
            }
            None => return false,
        };

        match result {
            Ok(Ok(0)) => {
                self.mark_disconnected("peer closed the connection");
                false
            }
            Ok(Ok(n)) => {
                self.stats.bytes_received += n as u64;
                true
            }
            Ok(Err(e)) => {
                self.stats.errors += 1;
                self.mark_disconnected(&e.to_string());
                false
            }
            Err(_) => false,
        }
    }

    fn read_available(&mut self, max: usize) -> Bytes {
        let n = max.min(self.pending.len());
        let chunk = self.pending.split_to(n).freeze();
        if self.packet_logging && !chunk.is_empty() {
            log_packet("recv", &chunk, None);
        }
        chunk
    }

    async fn close(&mut self) -> ModbusResult<()> {
        self.pending.clear();
        if let Some(mut stream) = self.stream.take() {
            self.state_tx.send_replace(false);
            debug!("Closing connection to {}", self.address);
            stream.shutdown().await?;
        }
        Ok(())
    }

    fn get_stats(&self) -> TransportStats {
        self.stats.clone()
    }

    fn record_outcome(&mut self, status: Status) {
        self.stats.record(status);
    }
}

/// Scripted transport for driving the executor without a socket
#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;

    use super::*;

    /// One scripted reaction to a `wait_for_data` call
    #[derive(Debug, Clone)]
    pub(crate) enum Step {
        /// Bytes arrive
        Data(Vec<u8>),
        /// The wait times out
        Silence,
        /// The peer goes away
        Disconnect,
    }

    #[derive(Debug, Default)]
    pub(crate) struct MockTransport {
        pub connected: bool,
        pub steps: VecDeque<Step>,
        pub pending: BytesMut,
        pub writes: Vec<Vec<u8>>,
        pub waits: usize,
        pub discarded: usize,
        pub stats: TransportStats,
    }

    impl MockTransport {
        pub fn connected() -> Self {
            Self {
                connected: true,
                ..Default::default()
            }
        }

        pub fn disconnected() -> Self {
            Self::default()
        }

        /// Bytes already waiting before the next request is written
        pub fn with_stale(mut self, bytes: &[u8]) -> Self {
            self.pending.extend_from_slice(bytes);
            self
        }

        pub fn then(mut self, step: Step) -> Self {
            self.steps.push_back(step);
            self
        }

        pub fn then_data(self, bytes: &[u8]) -> Self {
            self.then(Step::Data(bytes.to_vec()))
        }
    }

    impl ModbusTransport for MockTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn write(&mut self, frame: &[u8]) -> ModbusResult<()> {
            if !self.connected {
                return Err(ModbusError::connection("mock is disconnected"));
            }
            self.writes.push(frame.to_vec());
            self.stats.requests_sent += 1;
            Ok(())
        }

        fn discard_pending_input(&mut self) -> usize {
            let n = self.pending.len();
            self.pending.clear();
            self.discarded += n;
            n
        }

        async fn wait_for_data(&mut self, _timeout: Duration) -> bool {
            self.waits += 1;
            if !self.pending.is_empty() {
                return true;
            }
            match self.steps.pop_front() {
                Some(Step::Data(bytes)) => {
                    self.pending.extend_from_slice(&bytes);
                    true
                }
                Some(Step::Disconnect) => {
                    self.connected = false;
                    false
                }
                Some(Step::Silence) | None => false,
            }
        }

        fn read_available(&mut self, max: usize) -> Bytes {
            let n = max.min(self.pending.len());
            self.pending.split_to(n).freeze()
        }

        async fn close(&mut self) -> ModbusResult<()> {
            self.connected = false;
            Ok(())
        }

        fn get_stats(&self) -> TransportStats {
            self.stats.clone()
        }

        fn record_outcome(&mut self, status: Status) {
            self.stats.record(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn connected_pair() -> (TcpTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (transport, accepted) = tokio::join!(
            TcpTransport::new(addr, Duration::from_secs(1)),
            listener.accept()
        );
        (transport.unwrap(), accepted.unwrap().0)
    }

    #[test]
    fn test_stats_record() {
        let mut stats = TransportStats::default();
        stats.record(Status::Ok);
        stats.record(Status::Exception(0x02));
        stats.record(Status::Timeout);
        stats.record(Status::UnknownError);
        assert_eq!(stats.responses_received, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let (mut transport, mut peer) = connected_pair().await;
        assert!(transport.is_connected());

        transport.write(&[0x00, 0x01, 0x00, 0x00]).await.unwrap();
        let mut buf = [0u8; 4];
        peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0x00, 0x01, 0x00, 0x00]);

        peer.write_all(&[0xAA, 0xBB, 0xCC]).await.unwrap();
        assert!(transport.wait_for_data(Duration::from_secs(1)).await);
        assert_eq!(transport.read_available(2).as_ref(), &[0xAA, 0xBB]);
        // Remaining byte is still buffered
        assert!(transport.wait_for_data(Duration::from_millis(10)).await);
        assert_eq!(transport.read_available(10).as_ref(), &[0xCC]);

        let stats = transport.get_stats();
        assert_eq!(stats.requests_sent, 1);
        assert_eq!(stats.bytes_sent, 4);
        assert_eq!(stats.bytes_received, 3);
    }

    #[tokio::test]
    async fn test_wait_times_out_without_data() {
        let (mut transport, _peer) = connected_pair().await;
        assert!(!transport.wait_for_data(Duration::from_millis(20)).await);
        assert!(transport.is_connected());
        assert!(transport.read_available(10).is_empty());
    }

    #[tokio::test]
    async fn test_discard_pending_input() {
        let (mut transport, mut peer) = connected_pair().await;
        peer.write_all(&[1, 2, 3, 4, 5]).await.unwrap();
        assert!(transport.wait_for_data(Duration::from_secs(1)).await);

        // Give the rest of the burst time to land in the socket buffer
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(transport.discard_pending_input(), 5);
        assert!(transport.read_available(10).is_empty());
        assert_eq!(transport.get_stats().stale_bytes_discarded, 5);
    }

    #[tokio::test]
    async fn test_peer_close_marks_disconnected() {
        let (mut transport, peer) = connected_pair().await;
        let mut state = transport.subscribe();
        assert!(*state.borrow());

        drop(peer);
        assert!(!transport.wait_for_data(Duration::from_secs(1)).await);
        assert!(!transport.is_connected());

        state.changed().await.unwrap();
        assert!(!*state.borrow());

        assert_eq!(
            transport.write(&[0x00]).await,
            Err(ModbusError::NoConnection)
        );
    }

    #[tokio::test]
    async fn test_close_notifies_subscribers() {
        let (mut transport, _peer) = connected_pair().await;
        let state = transport.subscribe();
        transport.close().await.unwrap();
        assert!(!transport.is_connected());
        assert!(!*state.borrow());
        // Closing twice is harmless
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpTransport::connect("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ModbusError::Connection { .. })));
    }
}
