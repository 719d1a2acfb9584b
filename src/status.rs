//! Caller-visible request status
//!
//! A request ends in exactly one [`Status`]. The executor decides which by
//! looking at what the accumulator collected:
//!
//! | Collected bytes | Outcome |
//! |-----------------|---------|
//! | 9 bytes, function code high bit set | exception code, echoed verbatim |
//! | exactly the expected frame length | decode; field mismatch is `UnknownError` |
//! | anything else | `Timeout` |
//! | transport not connected | `NoConnection` (no I/O) |

use std::fmt;

use crate::constants::{
    EXCEPTION_BIT, EXCEPTION_FRAME_LEN, FUNCTION_CODE_OFFSET, PAYLOAD_OFFSET, STATUS_NO_CONNECTION,
    STATUS_OK, STATUS_TIMEOUT, STATUS_UNKNOWN_ERROR,
};
use crate::error::ModbusResult;
use crate::protocol::{ModbusException, ResponseShape};

/// Outcome of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Response received and validated
    Ok,
    /// Transport not connected
    NoConnection,
    /// No or partial response within the wait budget
    Timeout,
    /// Response present but invalid
    UnknownError,
    /// Exception code reported by the device
    Exception(u8),
}

impl Status {
    /// Numeric status code
    pub fn code(self) -> u8 {
        match self {
            Status::Ok => STATUS_OK,
            Status::NoConnection => STATUS_NO_CONNECTION,
            Status::Timeout => STATUS_TIMEOUT,
            Status::UnknownError => STATUS_UNKNOWN_ERROR,
            Status::Exception(code) => code,
        }
    }

    /// Inverse of [`Status::code`]
    pub fn from_code(code: u8) -> Self {
        match code {
            STATUS_OK => Status::Ok,
            STATUS_NO_CONNECTION => Status::NoConnection,
            STATUS_TIMEOUT => Status::Timeout,
            STATUS_UNKNOWN_ERROR => Status::UnknownError,
            other => Status::Exception(other),
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Known exception, if the device reported one of the standard codes
    pub fn exception(self) -> Option<ModbusException> {
        match self {
            Status::Exception(code) => ModbusException::from_u8(code),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "Ok"),
            Status::NoConnection => write!(f, "No connection"),
            Status::Timeout => write!(f, "Timeout"),
            Status::UnknownError => write!(f, "Unknown error"),
            Status::Exception(code) => match ModbusException::from_u8(*code) {
                Some(exc) => write!(f, "{}", exc),
                None => write!(f, "Modbus Exception 0x{:02X}", code),
            },
        }
    }
}

impl<T> From<&ModbusResult<T>> for Status {
    fn from(result: &ModbusResult<T>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        }
    }
}

/// Classification of accumulated response bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameOutcome {
    /// Exactly the expected frame; decode and validate
    Complete,
    /// 9-byte exception frame carrying this code
    Exception(u8),
    /// Short read
    Incomplete,
}

/// Classify accumulated bytes against the expected response shape.
pub(crate) fn resolve(frame: &[u8], shape: ResponseShape) -> FrameOutcome {
    if frame.len() == EXCEPTION_FRAME_LEN && frame[FUNCTION_CODE_OFFSET] & EXCEPTION_BIT != 0 {
        return FrameOutcome::Exception(frame[PAYLOAD_OFFSET]);
    }

    match shape.target_len(frame) {
        Some(target) if frame.len() == target => FrameOutcome::Complete,
        _ => FrameOutcome::Incomplete,
    }
}
