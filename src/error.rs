//! Error types for the MBAP client engine
//!
//! Every public operation returns [`ModbusResult`]. Each error variant
//! resolves to exactly one [`Status`] through [`ModbusError::status`].

use thiserror::Error;

use crate::status::Status;

/// Result type used across the crate
pub type ModbusResult<T> = Result<T, ModbusError>;

/// Modbus client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModbusError {
    /// Transport reported not connected; no I/O was performed
    #[error("Not connected")]
    NoConnection,

    /// Connection failed or was lost while sending
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Underlying I/O failure
    #[error("IO error: {message}")]
    Io { message: String },

    /// No response, or only part of one, within the wait budget
    #[error("Timeout during {operation} after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Device answered with an exception frame
    #[error("Modbus exception 0x{code:02X} for function 0x{function:02X}")]
    Exception { function: u8, code: u8 },

    /// Response frame failed header or echo validation
    #[error("Frame error: {message}")]
    Frame { message: String },

    /// Request could not be encoded
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Function code not usable for this operation
    #[error("Invalid function code: 0x{code:02X}")]
    InvalidFunction { code: u8 },

    /// Request arguments out of range
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Bad client configuration (address, timeouts)
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ModbusError {
    pub fn connection(message: impl Into<String>) -> Self {
        ModbusError::Connection {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        ModbusError::Io {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        ModbusError::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn exception(function: u8, code: u8) -> Self {
        ModbusError::Exception { function, code }
    }

    pub fn frame(message: impl Into<String>) -> Self {
        ModbusError::Frame {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        ModbusError::Protocol {
            message: message.into(),
        }
    }

    pub fn invalid_function(code: u8) -> Self {
        ModbusError::InvalidFunction { code }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        ModbusError::InvalidData {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ModbusError::Configuration {
            message: message.into(),
        }
    }

    /// Resolve this error to its caller-visible status.
    pub fn status(&self) -> Status {
        match self {
            ModbusError::NoConnection | ModbusError::Connection { .. } | ModbusError::Io { .. } => {
                Status::NoConnection
            }
            ModbusError::Timeout { .. } => Status::Timeout,
            ModbusError::Exception { code, .. } => Status::Exception(*code),
            ModbusError::Frame { .. }
            | ModbusError::Protocol { .. }
            | ModbusError::InvalidFunction { .. }
            | ModbusError::InvalidData { .. }
            | ModbusError::Configuration { .. } => Status::UnknownError,
        }
    }

    /// Device-reported exception code, if this is an exception response.
    pub fn exception_code(&self) -> Option<u8> {
        match self {
            ModbusError::Exception { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the caller should reconnect before the next request
    pub fn needs_reconnect(&self) -> bool {
        matches!(
            self,
            ModbusError::NoConnection | ModbusError::Connection { .. } | ModbusError::Io { .. }
        )
    }
}

impl From<std::io::Error> for ModbusError {
    fn from(err: std::io::Error) -> Self {
        ModbusError::io(err.to_string())
    }
}
