//! Modbus protocol definitions and per-function request descriptors
//!
//! [`ModbusRequest`] is the single place where function-specific knowledge
//! lives: request layout ([`ModbusRequest::to_pdu`]), argument limits
//! ([`ModbusRequest::validate`]) and the expected response length
//! ([`ModbusRequest::response_shape`]). The codec uses the same variants to
//! check echoed fields, so the executor itself stays function-agnostic.
//!
//! | Code | Request | Response frame length |
//! |------|---------|-----------------------|
//! | 0x01/0x02 | start, quantity | 9 + ceil(quantity / 8) |
//! | 0x03/0x04 | start, quantity | 9 + 2 × quantity |
//! | 0x05/0x06 | address, value | 12 (echo) |
//! | 0x0F/0x10 | start, quantity, byte count, data | 12 (echo) |
//! | 0x16 | address, AND mask, OR mask | 14 (echo) |
//! | 0x17 | read start/qty, write start/qty, byte count, data | 9 + 2 × read quantity |
//! | 0x18 | FIFO pointer address | learned from the MBAP length field |
//! | custom | opaque | learned from the MBAP length field |

use std::fmt;

use bytes::Bytes;

use crate::constants::{
    EXCEPTION_BIT, EXCEPTION_FRAME_LEN, FUNCTION_CODE_OFFSET, MAX_MBAP_LENGTH, MAX_PDU_SIZE,
    MAX_READ_COILS, MAX_READ_REGISTERS, MAX_READ_WRITE_WRITE_REGISTERS, MAX_WRITE_COILS,
    MAX_WRITE_REGISTERS, MBAP_HEADER_LEN, MBAP_PREFIX_LEN,
};
use crate::error::{ModbusError, ModbusResult};
use crate::pdu::{ModbusPdu, PduBuilder};

/// Modbus slave/unit identifier
pub type SlaveId = u8;

/// Standard Modbus function codes supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModbusFunction {
    /// Read Coils (0x01)
    ReadCoils = 0x01,
    /// Read Discrete Inputs (0x02)
    ReadDiscreteInputs = 0x02,
    /// Read Holding Registers (0x03)
    ReadHoldingRegisters = 0x03,
    /// Read Input Registers (0x04)
    ReadInputRegisters = 0x04,
    /// Write Single Coil (0x05)
    WriteSingleCoil = 0x05,
    /// Write Single Register (0x06)
    WriteSingleRegister = 0x06,
    /// Write Multiple Coils (0x0F)
    WriteMultipleCoils = 0x0F,
    /// Write Multiple Registers (0x10)
    WriteMultipleRegisters = 0x10,
    /// Mask Write Register (0x16)
    MaskWriteRegister = 0x16,
    /// Read/Write Multiple Registers (0x17)
    ReadWriteMultipleRegisters = 0x17,
    /// Read FIFO Queue (0x18)
    ReadFifoQueue = 0x18,
}

impl ModbusFunction {
    /// Convert from u8 to ModbusFunction
    pub fn from_u8(value: u8) -> ModbusResult<Self> {
        match value {
            0x01 => Ok(ModbusFunction::ReadCoils),
            0x02 => Ok(ModbusFunction::ReadDiscreteInputs),
            0x03 => Ok(ModbusFunction::ReadHoldingRegisters),
            0x04 => Ok(ModbusFunction::ReadInputRegisters),
            0x05 => Ok(ModbusFunction::WriteSingleCoil),
            0x06 => Ok(ModbusFunction::WriteSingleRegister),
            0x0F => Ok(ModbusFunction::WriteMultipleCoils),
            0x10 => Ok(ModbusFunction::WriteMultipleRegisters),
            0x16 => Ok(ModbusFunction::MaskWriteRegister),
            0x17 => Ok(ModbusFunction::ReadWriteMultipleRegisters),
            0x18 => Ok(ModbusFunction::ReadFifoQueue),
            _ => Err(ModbusError::invalid_function(value)),
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ModbusFunction::ReadCoils => "Read Coils",
            ModbusFunction::ReadDiscreteInputs => "Read Discrete Inputs",
            ModbusFunction::ReadHoldingRegisters => "Read Holding Registers",
            ModbusFunction::ReadInputRegisters => "Read Input Registers",
            ModbusFunction::WriteSingleCoil => "Write Single Coil",
            ModbusFunction::WriteSingleRegister => "Write Single Register",
            ModbusFunction::WriteMultipleCoils => "Write Multiple Coils",
            ModbusFunction::WriteMultipleRegisters => "Write Multiple Registers",
            ModbusFunction::MaskWriteRegister => "Mask Write Register",
            ModbusFunction::ReadWriteMultipleRegisters => "Read/Write Multiple Registers",
            ModbusFunction::ReadFifoQueue => "Read FIFO Queue",
        }
    }
}

impl fmt::Display for ModbusFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), *self as u8)
    }
}

/// Modbus exception codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ModbusException {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    ServerDeviceFailure = 0x04,
    Acknowledge = 0x05,
    ServerDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDeviceFailedToRespond = 0x0B,
}

impl ModbusException {
    /// Convert from u8 to ModbusException
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ModbusException::IllegalFunction),
            0x02 => Some(ModbusException::IllegalDataAddress),
            0x03 => Some(ModbusException::IllegalDataValue),
            0x04 => Some(ModbusException::ServerDeviceFailure),
            0x05 => Some(ModbusException::Acknowledge),
            0x06 => Some(ModbusException::ServerDeviceBusy),
            0x08 => Some(ModbusException::MemoryParityError),
            0x0A => Some(ModbusException::GatewayPathUnavailable),
            0x0B => Some(ModbusException::GatewayTargetDeviceFailedToRespond),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ModbusException::IllegalFunction => "Illegal function",
            ModbusException::IllegalDataAddress => "Illegal data address",
            ModbusException::IllegalDataValue => "Illegal data value",
            ModbusException::ServerDeviceFailure => "Slave device failure",
            ModbusException::Acknowledge => "Acknowledge",
            ModbusException::ServerDeviceBusy => "Slave device busy",
            ModbusException::MemoryParityError => "Memory parity error",
            ModbusException::GatewayPathUnavailable => "Gateway path unavailable",
            ModbusException::GatewayTargetDeviceFailedToRespond => {
                "Gateway target device failed to respond"
            }
        }
    }
}

impl fmt::Display for ModbusException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Modbus Exception 0x{:02X}: {}",
            self.to_u8(),
            self.description()
        )
    }
}

/// Expected size of a response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Exact frame length in bytes, MBAP header included
    Exact(usize),
    /// Length unknown up front; learned from the MBAP length field
    Discover,
}

impl ResponseShape {
    /// Frame length to accumulate given the bytes received so far.
    ///
    /// Returns `None` while the length cannot be known yet. An exception
    /// function code shrinks the target to the 9-byte exception frame.
    pub fn target_len(&self, frame: &[u8]) -> Option<usize> {
        if frame.len() > FUNCTION_CODE_OFFSET && frame[FUNCTION_CODE_OFFSET] & EXCEPTION_BIT != 0 {
            return Some(EXCEPTION_FRAME_LEN);
        }

        match self {
            ResponseShape::Exact(len) => Some(*len),
            ResponseShape::Discover if frame.len() >= MBAP_PREFIX_LEN => {
                let length = u16::from_be_bytes([frame[4], frame[5]]) as usize;
                Some(MBAP_PREFIX_LEN + length.min(MAX_MBAP_LENGTH))
            }
            ResponseShape::Discover => None,
        }
    }
}

/// One request, with its function-specific arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModbusRequest {
    ReadCoils {
        address: u16,
        quantity: u16,
    },
    ReadDiscreteInputs {
        address: u16,
        quantity: u16,
    },
    ReadHoldingRegisters {
        address: u16,
        quantity: u16,
    },
    ReadInputRegisters {
        address: u16,
        quantity: u16,
    },
    WriteSingleCoil {
        address: u16,
        value: bool,
    },
    WriteSingleRegister {
        address: u16,
        value: u16,
    },
    WriteMultipleCoils {
        address: u16,
        values: Vec<bool>,
    },
    WriteMultipleRegisters {
        address: u16,
        values: Vec<u16>,
    },
    MaskWriteRegister {
        address: u16,
        and_mask: u16,
        or_mask: u16,
    },
    ReadWriteMultipleRegisters {
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        values: Vec<u16>,
    },
    ReadFifoQueue {
        fifo_address: u16,
    },
    /// Caller-supplied function code with an opaque payload
    Custom {
        function_code: u8,
        data: Vec<u8>,
    },
}

impl ModbusRequest {
    /// Function code placed on the wire
    pub fn function_code(&self) -> u8 {
        match self {
            ModbusRequest::Custom { function_code, .. } => *function_code,
            other => other.function().map(ModbusFunction::to_u8).unwrap_or(0),
        }
    }

    /// Standard function, `None` for custom requests
    pub fn function(&self) -> Option<ModbusFunction> {
        let function = match self {
            ModbusRequest::ReadCoils { .. } => ModbusFunction::ReadCoils,
            ModbusRequest::ReadDiscreteInputs { .. } => ModbusFunction::ReadDiscreteInputs,
            ModbusRequest::ReadHoldingRegisters { .. } => ModbusFunction::ReadHoldingRegisters,
            ModbusRequest::ReadInputRegisters { .. } => ModbusFunction::ReadInputRegisters,
            ModbusRequest::WriteSingleCoil { .. } => ModbusFunction::WriteSingleCoil,
            ModbusRequest::WriteSingleRegister { .. } => ModbusFunction::WriteSingleRegister,
            ModbusRequest::WriteMultipleCoils { .. } => ModbusFunction::WriteMultipleCoils,
            ModbusRequest::WriteMultipleRegisters { .. } => ModbusFunction::WriteMultipleRegisters,
            ModbusRequest::MaskWriteRegister { .. } => ModbusFunction::MaskWriteRegister,
            ModbusRequest::ReadWriteMultipleRegisters { .. } => {
                ModbusFunction::ReadWriteMultipleRegisters
            }
            ModbusRequest::ReadFifoQueue { .. } => ModbusFunction::ReadFifoQueue,
            ModbusRequest::Custom { .. } => return None,
        };
        Some(function)
    }

    /// Name used in logs and timeout errors
    pub fn name(&self) -> &'static str {
        self.function()
            .map(ModbusFunction::name)
            .unwrap_or("Custom Function")
    }

    /// Check argument limits before anything is sent.
    pub fn validate(&self) -> ModbusResult<()> {
        match self {
            ModbusRequest::ReadCoils { quantity, .. }
            | ModbusRequest::ReadDiscreteInputs { quantity, .. } => {
                check_quantity("coils", *quantity as usize, MAX_READ_COILS)
            }
            ModbusRequest::ReadHoldingRegisters { quantity, .. }
            | ModbusRequest::ReadInputRegisters { quantity, .. } => {
                check_quantity("registers", *quantity as usize, MAX_READ_REGISTERS)
            }
            ModbusRequest::WriteMultipleCoils { values, .. } => {
                check_quantity("coils", values.len(), MAX_WRITE_COILS)
            }
            ModbusRequest::WriteMultipleRegisters { values, .. } => {
                check_quantity("registers", values.len(), MAX_WRITE_REGISTERS)
            }
            ModbusRequest::ReadWriteMultipleRegisters {
                read_quantity,
                values,
                ..
            } => {
                check_quantity("read registers", *read_quantity as usize, MAX_READ_REGISTERS)?;
                check_quantity("write registers", values.len(), MAX_READ_WRITE_WRITE_REGISTERS)
            }
            ModbusRequest::Custom {
                function_code,
                data,
            } => {
                if *function_code == 0 || *function_code & EXCEPTION_BIT != 0 {
                    return Err(ModbusError::invalid_function(*function_code));
                }
                if 1 + data.len() > MAX_PDU_SIZE {
                    return Err(ModbusError::invalid_data(format!(
                        "Custom payload too large: {} bytes (max {})",
                        data.len(),
                        MAX_PDU_SIZE - 1
                    )));
                }
                Ok(())
            }
            ModbusRequest::WriteSingleCoil { .. }
            | ModbusRequest::WriteSingleRegister { .. }
            | ModbusRequest::MaskWriteRegister { .. }
            | ModbusRequest::ReadFifoQueue { .. } => Ok(()),
        }
    }

    /// Expected response size for this request
    pub fn response_shape(&self) -> ResponseShape {
        // MBAP header + function code + byte count
        const READ_PREFIX: usize = MBAP_HEADER_LEN + 2;
        // MBAP header + function code + address + value/quantity
        const ECHO_FRAME: usize = MBAP_HEADER_LEN + 5;

        match self {
            ModbusRequest::ReadCoils { quantity, .. }
            | ModbusRequest::ReadDiscreteInputs { quantity, .. } => {
                ResponseShape::Exact(READ_PREFIX + (*quantity as usize).div_ceil(8))
            }
            ModbusRequest::ReadHoldingRegisters { quantity, .. }
            | ModbusRequest::ReadInputRegisters { quantity, .. }
            | ModbusRequest::ReadWriteMultipleRegisters {
                read_quantity: quantity,
                ..
            } => ResponseShape::Exact(READ_PREFIX + 2 * *quantity as usize),
            ModbusRequest::WriteSingleCoil { .. }
            | ModbusRequest::WriteSingleRegister { .. }
            | ModbusRequest::WriteMultipleCoils { .. }
            | ModbusRequest::WriteMultipleRegisters { .. } => ResponseShape::Exact(ECHO_FRAME),
            ModbusRequest::MaskWriteRegister { .. } => ResponseShape::Exact(ECHO_FRAME + 2),
            ModbusRequest::ReadFifoQueue { .. } | ModbusRequest::Custom { .. } => {
                ResponseShape::Discover
            }
        }
    }

    /// Build the request PDU (function code + payload)
    pub fn to_pdu(&self) -> ModbusResult<ModbusPdu> {
        match self {
            ModbusRequest::ReadCoils { address, quantity }
            | ModbusRequest::ReadDiscreteInputs { address, quantity }
            | ModbusRequest::ReadHoldingRegisters { address, quantity }
            | ModbusRequest::ReadInputRegisters { address, quantity } => {
                PduBuilder::build_read_request(self.function_code(), *address, *quantity)
            }
            ModbusRequest::WriteSingleCoil { address, value } => {
                PduBuilder::build_write_single_coil(*address, *value)
            }
            ModbusRequest::WriteSingleRegister { address, value } => {
                PduBuilder::build_write_single_register(*address, *value)
            }
            ModbusRequest::WriteMultipleCoils { address, values } => {
                PduBuilder::build_write_multiple_coils(*address, values)
            }
            ModbusRequest::WriteMultipleRegisters { address, values } => {
                PduBuilder::build_write_multiple_registers(*address, values)
            }
            ModbusRequest::MaskWriteRegister {
                address,
                and_mask,
                or_mask,
            } => PduBuilder::build_mask_write_register(*address, *and_mask, *or_mask),
            ModbusRequest::ReadWriteMultipleRegisters {
                read_address,
                read_quantity,
                write_address,
                values,
            } => PduBuilder::build_read_write_multiple_registers(
                *read_address,
                *read_quantity,
                *write_address,
                values,
            ),
            ModbusRequest::ReadFifoQueue { fifo_address } => {
                PduBuilder::build_read_fifo_queue(*fifo_address)
            }
            ModbusRequest::Custom {
                function_code,
                data,
            } => PduBuilder::build_custom(*function_code, data),
        }
    }
}

fn check_quantity(what: &str, quantity: usize, max: usize) -> ModbusResult<()> {
    if quantity == 0 || quantity > max {
        return Err(ModbusError::invalid_data(format!(
            "Invalid quantity of {}: {} (must be 1-{})",
            what, quantity, max
        )));
    }
    Ok(())
}

/// Decoded, validated response payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModbusResponse {
    /// Coil or discrete input states, one per requested point
    Bits(Vec<bool>),
    /// Register values in address order
    Registers(Vec<u16>),
    /// Write confirmed by a matching echo
    Written,
    /// Custom function payload (everything after the function code)
    Payload(Bytes),
}

impl ModbusResponse {
    pub fn into_bits(self) -> ModbusResult<Vec<bool>> {
        match self {
            ModbusResponse::Bits(bits) => Ok(bits),
            other => Err(other.mismatch("bits")),
        }
    }

    pub fn into_registers(self) -> ModbusResult<Vec<u16>> {
        match self {
            ModbusResponse::Registers(registers) => Ok(registers),
            other => Err(other.mismatch("registers")),
        }
    }

    pub fn into_written(self) -> ModbusResult<()> {
        match self {
            ModbusResponse::Written => Ok(()),
            other => Err(other.mismatch("write confirmation")),
        }
    }

    pub fn into_payload(self) -> ModbusResult<Bytes> {
        match self {
            ModbusResponse::Payload(payload) => Ok(payload),
            other => Err(other.mismatch("payload")),
        }
    }

    fn mismatch(&self, expected: &str) -> ModbusError {
        ModbusError::frame(format!("Expected {} response, got {:?}", expected, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_code_round_trip() {
        for code in [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x0F, 0x10, 0x16, 0x17, 0x18] {
            assert_eq!(ModbusFunction::from_u8(code).unwrap().to_u8(), code);
        }
        assert_eq!(
            ModbusFunction::from_u8(0x2B),
            Err(ModbusError::invalid_function(0x2B))
        );
    }

    #[test]
    fn test_function_display() {
        assert_eq!(
            ModbusFunction::MaskWriteRegister.to_string(),
            "Mask Write Register (0x16)"
        );
    }

    #[test]
    fn test_response_shapes() {
        let coils = ModbusRequest::ReadCoils {
            address: 0,
            quantity: 10,
        };
        assert_eq!(coils.response_shape(), ResponseShape::Exact(11));

        let coils = ModbusRequest::ReadDiscreteInputs {
            address: 0,
            quantity: 8,
        };
        assert_eq!(coils.response_shape(), ResponseShape::Exact(10));

        let registers = ModbusRequest::ReadHoldingRegisters {
            address: 0,
            quantity: 4,
        };
        assert_eq!(registers.response_shape(), ResponseShape::Exact(17));

        let write = ModbusRequest::WriteMultipleRegisters {
            address: 0,
            values: vec![1, 2, 3],
        };
        assert_eq!(write.response_shape(), ResponseShape::Exact(12));

        let mask = ModbusRequest::MaskWriteRegister {
            address: 4,
            and_mask: 0xF2,
            or_mask: 0x25,
        };
        assert_eq!(mask.response_shape(), ResponseShape::Exact(14));

        let read_write = ModbusRequest::ReadWriteMultipleRegisters {
            read_address: 3,
            read_quantity: 6,
            write_address: 14,
            values: vec![0x00FF; 3],
        };
        assert_eq!(read_write.response_shape(), ResponseShape::Exact(21));

        let fifo = ModbusRequest::ReadFifoQueue { fifo_address: 0x04DE };
        assert_eq!(fifo.response_shape(), ResponseShape::Discover);
    }

    #[test]
    fn test_target_len_discovery() {
        let shape = ResponseShape::Discover;
        assert_eq!(shape.target_len(&[0x00, 0x01, 0x00]), None);
        assert_eq!(
            shape.target_len(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x0A]),
            Some(16)
        );
        // Oversized length fields are capped at the largest legal frame
        assert_eq!(
            shape.target_len(&[0x00, 0x01, 0x00, 0x00, 0xFF, 0xFF]),
            Some(260)
        );
    }

    #[test]
    fn test_target_len_exception() {
        let frame = [0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x01, 0x81];
        assert_eq!(ResponseShape::Exact(20).target_len(&frame), Some(9));
        assert_eq!(ResponseShape::Discover.target_len(&frame), Some(9));
        assert_eq!(ResponseShape::Exact(20).target_len(&frame[..7]), Some(20));
    }

    #[test]
    fn test_validate_limits() {
        let ok = ModbusRequest::ReadHoldingRegisters {
            address: 0,
            quantity: 125,
        };
        assert!(ok.validate().is_ok());

        let too_many = ModbusRequest::ReadHoldingRegisters {
            address: 0,
            quantity: 126,
        };
        assert!(matches!(
            too_many.validate(),
            Err(ModbusError::InvalidData { .. })
        ));

        let empty = ModbusRequest::WriteMultipleCoils {
            address: 0,
            values: vec![],
        };
        assert!(empty.validate().is_err());

        let read_write = ModbusRequest::ReadWriteMultipleRegisters {
            read_address: 0,
            read_quantity: 1,
            write_address: 0,
            values: vec![0; 122],
        };
        assert!(read_write.validate().is_err());
    }

    #[test]
    fn test_validate_custom() {
        let exception_code = ModbusRequest::Custom {
            function_code: 0x83,
            data: vec![],
        };
        assert_eq!(
            exception_code.validate(),
            Err(ModbusError::invalid_function(0x83))
        );

        let too_large = ModbusRequest::Custom {
            function_code: 0x41,
            data: vec![0; 253],
        };
        assert!(too_large.validate().is_err());

        let ok = ModbusRequest::Custom {
            function_code: 0x41,
            data: vec![0; 252],
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.function_code(), 0x41);
        assert_eq!(ok.function(), None);
    }

    #[test]
    fn test_response_conversions() {
        assert_eq!(
            ModbusResponse::Registers(vec![1, 2]).into_registers(),
            Ok(vec![1, 2])
        );
        assert!(ModbusResponse::Written.into_bits().is_err());
        assert!(ModbusResponse::Written.into_written().is_ok());
    }
}
