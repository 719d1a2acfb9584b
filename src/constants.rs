//! Modbus TCP protocol constants based on official specification
//!
//! These constants are derived from the Modbus Application Protocol and the
//! Modbus Messaging on TCP/IP implementation guide:
//! - Maximum PDU size: 253 bytes (inherited from RS485 ADU limit of 256 bytes)
//! - MBAP header: 7 bytes in front of every PDU
//! - Register/coil limits are calculated to fit within the PDU size constraint

// ============================================================================
// Frame Size Constants
// ============================================================================

/// MBAP prefix length: Transaction ID(2) + Protocol ID(2) + Length(2) = 6 bytes
///
/// The MBAP `length` field counts every byte that follows this prefix.
pub const MBAP_PREFIX_LEN: usize = 6;

/// Full MBAP header length: prefix (6) + Unit ID (1) = 7 bytes
pub const MBAP_HEADER_LEN: usize = 7;

/// Offset of the function code inside a TCP frame
pub const FUNCTION_CODE_OFFSET: usize = MBAP_HEADER_LEN;

/// Offset of the first PDU payload byte (right after the function code)
pub const PAYLOAD_OFFSET: usize = FUNCTION_CODE_OFFSET + 1;

/// Size of an exception frame: MBAP header (7) + function code (1) + exception code (1)
pub const EXCEPTION_FRAME_LEN: usize = PAYLOAD_OFFSET + 1;

/// High bit of the function code, set by the server on exception responses
pub const EXCEPTION_BIT: u8 = 0x80;

/// Protocol identifier carried by every Modbus TCP frame
pub const MODBUS_PROTOCOL_ID: u16 = 0;

/// Maximum PDU (Protocol Data Unit) size per Modbus specification
/// RS485 ADU (256 bytes) - Slave Address (1 byte) - CRC (2 bytes) = 253 bytes
pub const MAX_PDU_SIZE: usize = 253;

/// Maximum MBAP length field value (Unit ID + PDU)
/// = 1 (Unit ID) + 253 (Max PDU) = 254 bytes
pub const MAX_MBAP_LENGTH: usize = 1 + MAX_PDU_SIZE;

/// Largest TCP frame a compliant server can send: 6 + 254 = 260 bytes
pub const MAX_TCP_FRAME_SIZE: usize = MBAP_PREFIX_LEN + MAX_MBAP_LENGTH;

/// Read buffer size for a single socket read
///
/// - Theoretical max frame: 260 bytes
/// - Buffer size: 512 bytes (provides safety margin)
pub const MODBUS_RESPONSE_BUFFER_SIZE: usize = 512;

// ============================================================================
// Register Operation Limits
// ============================================================================

/// Maximum number of registers for FC03/FC04 (Read Holding/Input Registers)
///
/// Calculation for response PDU:
/// - Function Code: 1 byte
/// - Byte Count: 1 byte
/// - Register Data: N × 2 bytes
/// - Total: 1 + 1 + (N × 2) ≤ 253
/// - Therefore: N ≤ (253 - 2) / 2 = 125.5 → 125 registers
pub const MAX_READ_REGISTERS: usize = 125;

/// Maximum number of registers for FC16 (Write Multiple Registers)
///
/// Calculation for request PDU:
/// - Function Code: 1 byte
/// - Starting Address: 2 bytes
/// - Quantity of Registers: 2 bytes
/// - Byte Count: 1 byte
/// - Register Values: N × 2 bytes
/// - Total: 1 + 2 + 2 + 1 + (N × 2) ≤ 253
/// - Therefore: N ≤ (253 - 6) / 2 = 123.5 → 123 registers
pub const MAX_WRITE_REGISTERS: usize = 123;

/// Maximum number of registers written by FC23 (Read/Write Multiple Registers)
///
/// Calculation for request PDU:
/// - Function Code: 1 byte
/// - Read Start + Read Quantity: 4 bytes
/// - Write Start + Write Quantity: 4 bytes
/// - Write Byte Count: 1 byte
/// - Write Values: N × 2 bytes
/// - Total: 1 + 4 + 4 + 1 + (N × 2) ≤ 253
/// - Therefore: N ≤ (253 - 10) / 2 = 121.5 → 121 registers
pub const MAX_READ_WRITE_WRITE_REGISTERS: usize = 121;

/// Maximum FIFO count returned by FC24 (Read FIFO Queue)
pub const MAX_FIFO_COUNT: usize = 31;

// ============================================================================
// Coil Operation Limits
// ============================================================================

/// Maximum number of coils for FC01/FC02 (Read Coils/Discrete Inputs)
///
/// - Total: 1 + 1 + ceil(N / 8) ≤ 253
/// - Modbus limit: N ≤ 2000 (0x7D0)
pub const MAX_READ_COILS: usize = 2000;

/// Maximum number of coils for FC15 (Write Multiple Coils)
///
/// - Total: 1 + 2 + 2 + 1 + ceil(N / 8) ≤ 253
/// - Modbus limit: N ≤ 1968 (0x7B0)
pub const MAX_WRITE_COILS: usize = 1968;

// ============================================================================
// Modbus Function Codes
// ============================================================================

/// Read Coils (FC01)
pub const FC_READ_COILS: u8 = 0x01;

/// Read Discrete Inputs (FC02)
pub const FC_READ_DISCRETE_INPUTS: u8 = 0x02;

/// Read Holding Registers (FC03)
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Read Input Registers (FC04)
pub const FC_READ_INPUT_REGISTERS: u8 = 0x04;

/// Write Single Coil (FC05)
pub const FC_WRITE_SINGLE_COIL: u8 = 0x05;

/// Write Single Register (FC06)
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;

/// Write Multiple Coils (FC15)
pub const FC_WRITE_MULTIPLE_COILS: u8 = 0x0F;

/// Write Multiple Registers (FC16)
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

/// Mask Write Register (FC22)
pub const FC_MASK_WRITE_REGISTER: u8 = 0x16;

/// Read/Write Multiple Registers (FC23)
pub const FC_READ_WRITE_MULTIPLE_REGISTERS: u8 = 0x17;

/// Read FIFO Queue (FC24)
pub const FC_READ_FIFO_QUEUE: u8 = 0x18;

/// Coil ON value on the wire (FC05)
pub const COIL_ON: u16 = 0xFF00;

/// Coil OFF value on the wire (FC05)
pub const COIL_OFF: u16 = 0x0000;

// ============================================================================
// Modbus Exception Codes
// ============================================================================

/// Illegal Function
pub const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;

/// Illegal Data Address
pub const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;

/// Illegal Data Value
pub const EXCEPTION_ILLEGAL_DATA_VALUE: u8 = 0x03;

/// Server Device Failure
pub const EXCEPTION_SERVER_DEVICE_FAILURE: u8 = 0x04;

/// Acknowledge
pub const EXCEPTION_ACKNOWLEDGE: u8 = 0x05;

/// Server Device Busy
pub const EXCEPTION_SERVER_DEVICE_BUSY: u8 = 0x06;

/// Memory Parity Error
pub const EXCEPTION_MEMORY_PARITY_ERROR: u8 = 0x08;

/// Gateway Path Unavailable
pub const EXCEPTION_GATEWAY_PATH_UNAVAILABLE: u8 = 0x0A;

/// Gateway Target Device Failed to Respond
pub const EXCEPTION_GATEWAY_TARGET_FAILED: u8 = 0x0B;

// ============================================================================
// Status Codes
// ============================================================================

/// Request answered and validated
pub const STATUS_OK: u8 = 0x00;

/// Transport was not connected; no I/O attempted
pub const STATUS_NO_CONNECTION: u8 = 0xF0;

/// No or partial response within the wait budget
pub const STATUS_TIMEOUT: u8 = 0xF1;

/// Response present but failed header or echo validation
pub const STATUS_UNKNOWN_ERROR: u8 = 0xFF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_constants() {
        assert_eq!(MBAP_PREFIX_LEN, 6);
        assert_eq!(MBAP_HEADER_LEN, 7);
        assert_eq!(EXCEPTION_FRAME_LEN, 9);
        assert_eq!(MAX_MBAP_LENGTH, 254);
        assert_eq!(MAX_TCP_FRAME_SIZE, 260);
    }

    #[test]
    fn test_register_limits() {
        let read_pdu_size = 1 + 1 + (MAX_READ_REGISTERS * 2);
        assert!(read_pdu_size <= MAX_PDU_SIZE);

        let write_pdu_size = 1 + 2 + 2 + 1 + (MAX_WRITE_REGISTERS * 2);
        assert!(write_pdu_size <= MAX_PDU_SIZE);

        let read_write_pdu_size = 1 + 4 + 4 + 1 + (MAX_READ_WRITE_WRITE_REGISTERS * 2);
        assert!(read_write_pdu_size <= MAX_PDU_SIZE);
        assert!(read_write_pdu_size + 2 > MAX_PDU_SIZE);
    }

    #[test]
    fn test_coil_limits() {
        let read_coil_pdu = 1 + 1 + MAX_READ_COILS.div_ceil(8);
        assert!(read_coil_pdu <= MAX_PDU_SIZE);

        let write_coil_pdu = 1 + 2 + 2 + 1 + MAX_WRITE_COILS.div_ceil(8);
        assert!(write_coil_pdu <= MAX_PDU_SIZE);
    }

    #[test]
    fn test_status_codes_do_not_collide_with_exceptions() {
        let exceptions = [
            EXCEPTION_ILLEGAL_FUNCTION,
            EXCEPTION_ILLEGAL_DATA_ADDRESS,
            EXCEPTION_ILLEGAL_DATA_VALUE,
            EXCEPTION_SERVER_DEVICE_FAILURE,
            EXCEPTION_ACKNOWLEDGE,
            EXCEPTION_SERVER_DEVICE_BUSY,
            EXCEPTION_MEMORY_PARITY_ERROR,
            EXCEPTION_GATEWAY_PATH_UNAVAILABLE,
            EXCEPTION_GATEWAY_TARGET_FAILED,
        ];
        for code in exceptions {
            assert_ne!(code, STATUS_OK);
            assert_ne!(code, STATUS_NO_CONNECTION);
            assert_ne!(code, STATUS_TIMEOUT);
            assert_ne!(code, STATUS_UNKNOWN_ERROR);
        }
    }
}
