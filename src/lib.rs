//! # Voltage MBAP - Modbus TCP Client Engine
//!
//! A single-request Modbus TCP client: it encodes function-specific requests
//! into MBAP frames, sends them over a connected byte stream, accumulates the
//! response under a per-wait timeout and checks that the response really
//! answers the request before decoding it.
//!
//! ## Features
//!
//! - **Strict validation**: transaction id, protocol id, length field, unit id,
//!   function code and every echoed field must match
//! - **Split-frame tolerant**: responses are accumulated across TCP segments,
//!   including variable-length FIFO and custom-function responses
//! - **One outcome per call**: every result maps to exactly one [`Status`]
//! - **Async**: tokio based, one outstanding request per connection
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Client |
//! |------|----------|--------|
//! | 0x01 | Read Coils | ✅ |
//! | 0x02 | Read Discrete Inputs | ✅ |
//! | 0x03 | Read Holding Registers | ✅ |
//! | 0x04 | Read Input Registers | ✅ |
//! | 0x05 | Write Single Coil | ✅ |
//! | 0x06 | Write Single Register | ✅ |
//! | 0x0F | Write Multiple Coils | ✅ |
//! | 0x10 | Write Multiple Registers | ✅ |
//! | 0x16 | Mask Write Register | ✅ |
//! | 0x17 | Read/Write Multiple Registers | ✅ |
//! | 0x18 | Read FIFO Queue | ✅ |
//! | any | Custom function / raw passthrough | ✅ |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voltage_mbap::{ModbusTcpClient, ModbusClient, ModbusResult};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ModbusResult<()> {
//!     let mut client = ModbusTcpClient::from_address("127.0.0.1:502", Duration::from_millis(500)).await?;
//!
//!     let values = client.read_03(1, 0, 10).await?;
//!     println!("Read registers: {:?}", values);
//!
//!     client.mask_write_16(1, 4, 0x00F2, 0x0025).await?;
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Caller-visible request status
pub mod status;

/// Modbus protocol constants
pub mod constants;

/// Stack-allocated PDU and builders
pub mod pdu;

/// Modbus protocol definitions and request descriptors
pub mod protocol;

/// MBAP frame encoding and response validation
pub mod codec;

/// Transaction id generators
pub mod transaction;

/// Byte-stream transport layer
pub mod transport;

/// Response accumulation loop
mod accumulator;

/// Modbus client implementations
pub mod client;

/// Client configuration
pub mod config;

/// Packet logging helpers
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use voltage_mbap::tokio) ===
pub use tokio;

// === Core client API ===
pub use client::{GenericModbusClient, ModbusClient, ModbusTcpClient};
pub use config::ClientConfig;

// === Error handling ===
pub use error::{ModbusError, ModbusResult};
pub use status::Status;

// === Core types ===
pub use protocol::{
    ModbusException, ModbusFunction, ModbusRequest, ModbusResponse, ResponseShape, SlaveId,
};

// === Framing ===
pub use codec::{decode_response, encode_request, MbapHeader};
pub use transaction::{RandomTransactionIds, SequentialTransactionIds, TransactionIdGenerator};

// === Transport and monitoring ===
pub use transport::{ModbusTransport, TcpTransport, TransportStats};

// === Protocol limits (commonly needed constants) ===
pub use constants::{
    MAX_FIFO_COUNT, MAX_PDU_SIZE, MAX_READ_COILS, MAX_READ_REGISTERS,
    MAX_READ_WRITE_WRITE_REGISTERS, MAX_WRITE_COILS, MAX_WRITE_REGISTERS,
};

// === PDU (advanced usage) ===
pub use pdu::{ModbusPdu, PduBuilder};

/// Modbus TCP default port
pub const DEFAULT_TCP_PORT: u16 = 502;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!("Voltage MBAP v{} - Modbus TCP client engine", VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_mentions_version() {
        assert!(info().contains(VERSION));
    }
}
