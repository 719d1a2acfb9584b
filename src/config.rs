//! # Client Configuration
//!
//! Timeouts and diagnostics for a Modbus TCP client.
//!
//! The response timeout bounds each individual wait for data, not the whole
//! request. A response that trickles in a few bytes at a time can therefore
//! take several timeouts to complete, while a silent device fails after one.

use std::time::Duration;

use crate::error::{ModbusError, ModbusResult};

/// Default per-wait response timeout in milliseconds.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 500;

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

/// Client settings
///
/// # Example
///
/// ```rust
/// use voltage_mbap::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_response_timeout(Duration::from_millis(250))
///     .with_packet_logging(true);
///
/// assert_eq!(config.response_timeout, Duration::from_millis(250));
/// assert_eq!(config.connect_timeout, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bound on each wait for response bytes
    pub response_timeout: Duration,
    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Dump every frame sent and received at `info` level
    pub packet_logging: bool,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_packet_logging(mut self, enabled: bool) -> Self {
        self.packet_logging = enabled;
        self
    }

    /// Reject zero timeouts, which would turn every request into a timeout.
    pub fn validate(&self) -> ModbusResult<()> {
        if self.response_timeout.is_zero() {
            return Err(ModbusError::configuration("Response timeout must be non-zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ModbusError::configuration("Connect timeout must be non-zero"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            packet_logging: false,
        }
    }
}
