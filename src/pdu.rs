//! Stack-allocated Modbus PDU and request builders
//!
//! Use a fixed-size stack array to avoid heap allocation when encoding
//! requests. Every function code in the client has a `build_*` helper here.

use tracing::debug;

use crate::codec::pack_coils;
use crate::constants::{
    COIL_OFF, COIL_ON, EXCEPTION_BIT, FC_MASK_WRITE_REGISTER, FC_READ_FIFO_QUEUE,
    FC_READ_WRITE_MULTIPLE_REGISTERS, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER, MAX_PDU_SIZE,
};
use crate::error::{ModbusError, ModbusResult};

/// PDU backed by a fixed array
#[derive(Debug, Clone)]
pub struct ModbusPdu {
    data: [u8; MAX_PDU_SIZE],
    len: usize,
}

impl ModbusPdu {
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; MAX_PDU_SIZE],
            len: 0,
        }
    }

    /// Create a PDU from a byte slice
    pub fn from_slice(data: &[u8]) -> ModbusResult<Self> {
        let mut pdu = Self::new();
        pdu.extend(data)?;
        Ok(pdu)
    }

    #[inline]
    pub fn push(&mut self, byte: u8) -> ModbusResult<()> {
        if self.len >= MAX_PDU_SIZE {
            return Err(ModbusError::protocol("PDU buffer full"));
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Push u16 in big-endian
    #[inline]
    pub fn push_u16(&mut self, value: u16) -> ModbusResult<()> {
        self.extend(&value.to_be_bytes())
    }

    #[inline]
    pub fn extend(&mut self, data: &[u8]) -> ModbusResult<()> {
        if self.len + data.len() > MAX_PDU_SIZE {
            return Err(ModbusError::protocol(format!(
                "PDU would exceed max size: {} + {} > {}",
                self.len,
                data.len(),
                MAX_PDU_SIZE
            )));
        }
        self.data[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Function code (first byte)
    #[inline]
    pub fn function_code(&self) -> Option<u8> {
        self.as_slice().first().copied()
    }

    #[inline]
    pub fn is_exception(&self) -> bool {
        self.function_code()
            .map(|fc| fc & EXCEPTION_BIT != 0)
            .unwrap_or(false)
    }

    /// Get human-readable function code description
    pub fn function_code_description(fc: u8) -> &'static str {
        match fc & !EXCEPTION_BIT {
            0x01 => "Read Coils",
            0x02 => "Read Discrete Inputs",
            0x03 => "Read Holding Registers",
            0x04 => "Read Input Registers",
            0x05 => "Write Single Coil",
            0x06 => "Write Single Register",
            0x0F => "Write Multiple Coils",
            0x10 => "Write Multiple Registers",
            0x16 => "Mask Write Register",
            0x17 => "Read/Write Multiple Registers",
            0x18 => "Read FIFO Queue",
            _ => "Custom Function",
        }
    }
}

impl Default for ModbusPdu {
    fn default() -> Self {
        Self::new()
    }
}

/// PDU builder - fluent API
pub struct PduBuilder {
    pdu: ModbusPdu,
}

impl Default for PduBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PduBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            pdu: ModbusPdu::new(),
        }
    }

    #[inline]
    pub fn function_code(mut self, fc: u8) -> ModbusResult<Self> {
        self.pdu.push(fc)?;
        Ok(self)
    }

    /// Add a big-endian 16-bit field
    #[inline]
    pub fn word(mut self, value: u16) -> ModbusResult<Self> {
        self.pdu.push_u16(value)?;
        Ok(self)
    }

    /// Add a series of big-endian 16-bit fields
    pub fn words(mut self, values: &[u16]) -> ModbusResult<Self> {
        for &value in values {
            self.pdu.push_u16(value)?;
        }
        Ok(self)
    }

    #[inline]
    pub fn byte(mut self, b: u8) -> ModbusResult<Self> {
        self.pdu.push(b)?;
        Ok(self)
    }

    #[inline]
    pub fn data(mut self, data: &[u8]) -> ModbusResult<Self> {
        self.pdu.extend(data)?;
        Ok(self)
    }

    pub fn build(self) -> ModbusPdu {
        if let Some(fc) = self.pdu.function_code() {
            debug!(
                "PDU built: FC={:02X} ({}), total_len={}",
                fc,
                ModbusPdu::function_code_description(fc),
                self.pdu.len()
            );
        }
        self.pdu
    }

    /// Build a read request PDU for FC01-04
    pub fn build_read_request(fc: u8, start_address: u16, quantity: u16) -> ModbusResult<ModbusPdu> {
        if !matches!(fc, 0x01..=0x04) {
            return Err(ModbusError::invalid_function(fc));
        }
        Ok(PduBuilder::new()
            .function_code(fc)?
            .word(start_address)?
            .word(quantity)?
            .build())
    }

    /// Build a write single coil PDU (FC05); ON is 0xFF00, OFF is 0x0000
    pub fn build_write_single_coil(address: u16, value: bool) -> ModbusResult<ModbusPdu> {
        Ok(PduBuilder::new()
            .function_code(FC_WRITE_SINGLE_COIL)?
            .word(address)?
            .word(if value { COIL_ON } else { COIL_OFF })?
            .build())
    }

    /// Build a write single register PDU (FC06)
    pub fn build_write_single_register(address: u16, value: u16) -> ModbusResult<ModbusPdu> {
        Ok(PduBuilder::new()
            .function_code(FC_WRITE_SINGLE_REGISTER)?
            .word(address)?
            .word(value)?
            .build())
    }

    /// Build a write multiple coils PDU (FC15)
    pub fn build_write_multiple_coils(address: u16, values: &[bool]) -> ModbusResult<ModbusPdu> {
        let packed = pack_coils(values);
        let byte_count = u8::try_from(packed.len())
            .map_err(|_| ModbusError::invalid_data(format!("Too many coils: {}", values.len())))?;

        Ok(PduBuilder::new()
            .function_code(FC_WRITE_MULTIPLE_COILS)?
            .word(address)?
            .word(values.len() as u16)?
            .byte(byte_count)?
            .data(&packed)?
            .build())
    }

    /// Build a write multiple registers PDU (FC16)
    pub fn build_write_multiple_registers(address: u16, values: &[u16]) -> ModbusResult<ModbusPdu> {
        let byte_count = register_byte_count(values)?;

        Ok(PduBuilder::new()
            .function_code(FC_WRITE_MULTIPLE_REGISTERS)?
            .word(address)?
            .word(values.len() as u16)?
            .byte(byte_count)?
            .words(values)?
            .build())
    }

    /// Build a mask write register PDU (FC22)
    pub fn build_mask_write_register(
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> ModbusResult<ModbusPdu> {
        Ok(PduBuilder::new()
            .function_code(FC_MASK_WRITE_REGISTER)?
            .word(address)?
            .word(and_mask)?
            .word(or_mask)?
            .build())
    }

    /// Build a read/write multiple registers PDU (FC23)
    ///
    /// Wire order is read block first, then the write block.
    pub fn build_read_write_multiple_registers(
        read_address: u16,
        read_quantity: u16,
        write_address: u16,
        values: &[u16],
    ) -> ModbusResult<ModbusPdu> {
        let byte_count = register_byte_count(values)?;

        Ok(PduBuilder::new()
            .function_code(FC_READ_WRITE_MULTIPLE_REGISTERS)?
            .word(read_address)?
            .word(read_quantity)?
            .word(write_address)?
            .word(values.len() as u16)?
            .byte(byte_count)?
            .words(values)?
            .build())
    }

    /// Build a read FIFO queue PDU (FC24)
    pub fn build_read_fifo_queue(fifo_address: u16) -> ModbusResult<ModbusPdu> {
        Ok(PduBuilder::new()
            .function_code(FC_READ_FIFO_QUEUE)?
            .word(fifo_address)?
            .build())
    }

    /// Build a PDU for an arbitrary function code with an opaque payload
    pub fn build_custom(fc: u8, data: &[u8]) -> ModbusResult<ModbusPdu> {
        if fc == 0 || fc & EXCEPTION_BIT != 0 {
            return Err(ModbusError::invalid_function(fc));
        }
        Ok(PduBuilder::new().function_code(fc)?.data(data)?.build())
    }
}

fn register_byte_count(values: &[u16]) -> ModbusResult<u8> {
    u8::try_from(values.len() * 2)
        .map_err(|_| ModbusError::invalid_data(format!("Too many registers: {}", values.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdu_basic_operations() {
        let mut pdu = ModbusPdu::new();
        assert!(pdu.is_empty());

        pdu.push(0x03).unwrap();
        pdu.push_u16(0x0100).unwrap();
        pdu.push_u16(0x000A).unwrap();

        assert_eq!(pdu.function_code(), Some(0x03));
        assert!(!pdu.is_exception());
        assert_eq!(pdu.as_slice(), &[0x03, 0x01, 0x00, 0x00, 0x0A]);
    }

    #[test]
    fn test_pdu_overflow() {
        let mut pdu = ModbusPdu::from_slice(&[0u8; MAX_PDU_SIZE]).unwrap();
        assert!(matches!(pdu.push(0), Err(ModbusError::Protocol { .. })));
        assert!(ModbusPdu::from_slice(&[0u8; MAX_PDU_SIZE + 1]).is_err());
    }

    #[test]
    fn test_build_read_request() {
        let pdu = PduBuilder::build_read_request(0x03, 0x006B, 3).unwrap();
        assert_eq!(pdu.as_slice(), &[0x03, 0x00, 0x6B, 0x00, 0x03]);

        assert_eq!(
            PduBuilder::build_read_request(0x05, 0, 1).unwrap_err(),
            ModbusError::invalid_function(0x05)
        );
    }

    #[test]
    fn test_build_write_single_coil() {
        let on = PduBuilder::build_write_single_coil(0x00AC, true).unwrap();
        assert_eq!(on.as_slice(), &[0x05, 0x00, 0xAC, 0xFF, 0x00]);

        let off = PduBuilder::build_write_single_coil(0x00AC, false).unwrap();
        assert_eq!(off.as_slice(), &[0x05, 0x00, 0xAC, 0x00, 0x00]);
    }

    #[test]
    fn test_build_write_multiple_coils() {
        // 10 coils: 1 0 1 1 0 0 1 1 | 1 0
        let values = [
            true, false, true, true, false, false, true, true, true, false,
        ];
        let pdu = PduBuilder::build_write_multiple_coils(0x0013, &values).unwrap();
        assert_eq!(
            pdu.as_slice(),
            &[0x0F, 0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01]
        );
    }

    #[test]
    fn test_build_write_multiple_registers() {
        let pdu = PduBuilder::build_write_multiple_registers(0x0001, &[0x000A, 0x0102]).unwrap();
        assert_eq!(
            pdu.as_slice(),
            &[0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02]
        );
    }

    #[test]
    fn test_build_mask_write_register() {
        let pdu = PduBuilder::build_mask_write_register(0x0004, 0x00F2, 0x0025).unwrap();
        assert_eq!(pdu.as_slice(), &[0x16, 0x00, 0x04, 0x00, 0xF2, 0x00, 0x25]);
    }

    #[test]
    fn test_build_read_write_multiple_registers() {
        let pdu =
            PduBuilder::build_read_write_multiple_registers(0x0003, 6, 0x000E, &[0x00FF; 3])
                .unwrap();
        assert_eq!(
            pdu.as_slice(),
            &[
                0x17, 0x00, 0x03, 0x00, 0x06, 0x00, 0x0E, 0x00, 0x03, 0x06, 0x00, 0xFF, 0x00,
                0xFF, 0x00, 0xFF
            ]
        );
    }

    #[test]
    fn test_build_read_fifo_queue() {
        let pdu = PduBuilder::build_read_fifo_queue(0x04DE).unwrap();
        assert_eq!(pdu.as_slice(), &[0x18, 0x04, 0xDE]);
    }

    #[test]
    fn test_build_custom() {
        let pdu = PduBuilder::build_custom(0x41, &[0xDE, 0xAD]).unwrap();
        assert_eq!(pdu.as_slice(), &[0x41, 0xDE, 0xAD]);

        assert!(PduBuilder::build_custom(0x41, &[0u8; MAX_PDU_SIZE]).is_err());
        assert!(PduBuilder::build_custom(0x90, &[]).is_err());
    }
}
