//! # MBAP Frame Codec
//!
//! Encoding of requests into Modbus TCP frames and validation/decoding of
//! the matching response frames.
//!
//! ## Frame Layout (big-endian)
//!
//! ```text
//! | transaction id (2) | protocol id = 0 (2) | length (2) | unit id (1) | function code (1) | payload |
//!                                             └──────── length counts from here ──────────────┘
//! ```
//!
//! ## Response Validation
//!
//! A response is accepted only if, in order, the transaction id, protocol
//! id, length field, unit id, function code and every function-specific echo
//! field match the request. Any mismatch is a [`ModbusError::Frame`].

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::constants::{
    COIL_OFF, COIL_ON, EXCEPTION_BIT, EXCEPTION_FRAME_LEN, FUNCTION_CODE_OFFSET, MAX_FIFO_COUNT,
    MBAP_HEADER_LEN, MBAP_PREFIX_LEN, MODBUS_PROTOCOL_ID, PAYLOAD_OFFSET,
};
use crate::error::{ModbusError, ModbusResult};
use crate::protocol::{ModbusRequest, ModbusResponse, SlaveId};

/// Modbus Application Protocol header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbapHeader {
    pub transaction_id: u16,
    pub protocol_id: u16,
    /// Byte count of everything after this field (unit id included)
    pub length: u16,
    pub unit_id: u8,
}

impl MbapHeader {
    /// Parse the header from the front of a frame
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < MBAP_HEADER_LEN {
            return None;
        }
        Some(Self {
            transaction_id: u16::from_be_bytes([frame[0], frame[1]]),
            protocol_id: u16::from_be_bytes([frame[2], frame[3]]),
            length: u16::from_be_bytes([frame[4], frame[5]]),
            unit_id: frame[6],
        })
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u16(self.transaction_id);
        buf.put_u16(self.protocol_id);
        buf.put_u16(self.length);
        buf.put_u8(self.unit_id);
    }
}

/// Pack coil states into bytes, LSB first within each byte.
pub fn pack_coils(values: &[bool]) -> Vec<u8> {
    let mut packed = vec![0u8; values.len().div_ceil(8)];
    for (i, &value) in values.iter().enumerate() {
        if value {
            packed[i / 8] |= 1 << (i % 8);
        }
    }
    packed
}

/// Unpack `quantity` coil states; padding bits in the last byte are ignored.
pub fn unpack_coils(bytes: &[u8], quantity: usize) -> Vec<bool> {
    (0..quantity)
        .map(|i| bytes.get(i / 8).is_some_and(|b| b & (1 << (i % 8)) != 0))
        .collect()
}

/// Encode a request into a complete Modbus TCP frame.
pub fn encode_request(
    transaction_id: u16,
    slave_id: SlaveId,
    request: &ModbusRequest,
) -> ModbusResult<Bytes> {
    let pdu = request.to_pdu()?;
    let header = MbapHeader {
        transaction_id,
        protocol_id: MODBUS_PROTOCOL_ID,
        length: (pdu.len() + 1) as u16,
        unit_id: slave_id,
    };

    let mut frame = BytesMut::with_capacity(MBAP_HEADER_LEN + pdu.len());
    header.write_to(&mut frame);
    frame.put_slice(pdu.as_slice());

    debug!(
        "Encoded request: tid={:04X}, unit={}, FC={:02X}, frame_len={}",
        transaction_id,
        slave_id,
        request.function_code(),
        frame.len()
    );

    Ok(frame.freeze())
}

/// Exception code of a 9-byte exception frame, if `frame` is one.
pub fn exception_code(frame: &[u8]) -> Option<u8> {
    if frame.len() == EXCEPTION_FRAME_LEN && frame[FUNCTION_CODE_OFFSET] & EXCEPTION_BIT != 0 {
        Some(frame[PAYLOAD_OFFSET])
    } else {
        None
    }
}

/// Validate a complete response frame against the request that produced it
/// and decode its payload.
pub fn decode_response(
    frame: &[u8],
    transaction_id: u16,
    slave_id: SlaveId,
    request: &ModbusRequest,
) -> ModbusResult<ModbusResponse> {
    let function_code = request.function_code();

    if let Some(code) = exception_code(frame) {
        return Err(ModbusError::exception(function_code, code));
    }

    let header = match MbapHeader::parse(frame) {
        Some(header) if frame.len() > FUNCTION_CODE_OFFSET => header,
        _ => return Err(reject(format!("Frame too short: {} bytes", frame.len()))),
    };

    if header.transaction_id != transaction_id {
        return Err(reject(format!(
            "Transaction id mismatch: expected {:04X}, got {:04X}",
            transaction_id, header.transaction_id
        )));
    }
    if header.protocol_id != MODBUS_PROTOCOL_ID {
        return Err(reject(format!(
            "Protocol id mismatch: got {:04X}",
            header.protocol_id
        )));
    }
    if header.length as usize != frame.len() - MBAP_PREFIX_LEN {
        return Err(reject(format!(
            "Length field mismatch: field says {}, frame carries {}",
            header.length,
            frame.len() - MBAP_PREFIX_LEN
        )));
    }
    if header.unit_id != slave_id {
        return Err(reject(format!(
            "Unit id mismatch: expected {}, got {}",
            slave_id, header.unit_id
        )));
    }
    if frame[FUNCTION_CODE_OFFSET] != function_code {
        return Err(reject(format!(
            "Function code mismatch: expected {:02X}, got {:02X}",
            function_code, frame[FUNCTION_CODE_OFFSET]
        )));
    }

    let body = &frame[PAYLOAD_OFFSET..];
    let response = match request {
        ModbusRequest::ReadCoils { quantity, .. }
        | ModbusRequest::ReadDiscreteInputs { quantity, .. } => {
            let data = byte_counted(body, (*quantity as usize).div_ceil(8))?;
            ModbusResponse::Bits(unpack_coils(data, *quantity as usize))
        }
        ModbusRequest::ReadHoldingRegisters { quantity, .. }
        | ModbusRequest::ReadInputRegisters { quantity, .. }
        | ModbusRequest::ReadWriteMultipleRegisters {
            read_quantity: quantity,
            ..
        } => {
            let data = byte_counted(body, 2 * *quantity as usize)?;
            ModbusResponse::Registers(parse_registers(data))
        }
        ModbusRequest::WriteSingleCoil { address, value } => {
            expect_echo(body, &[*address, if *value { COIL_ON } else { COIL_OFF }])?;
            ModbusResponse::Written
        }
        ModbusRequest::WriteSingleRegister { address, value } => {
            expect_echo(body, &[*address, *value])?;
            ModbusResponse::Written
        }
        ModbusRequest::WriteMultipleCoils { address, values } => {
            expect_echo(body, &[*address, values.len() as u16])?;
            ModbusResponse::Written
        }
        ModbusRequest::WriteMultipleRegisters { address, values } => {
            expect_echo(body, &[*address, values.len() as u16])?;
            ModbusResponse::Written
        }
        ModbusRequest::MaskWriteRegister {
            address,
            and_mask,
            or_mask,
        } => {
            expect_echo(body, &[*address, *and_mask, *or_mask])?;
            ModbusResponse::Written
        }
        ModbusRequest::ReadFifoQueue { .. } => ModbusResponse::Registers(parse_fifo(body)?),
        ModbusRequest::Custom { .. } => ModbusResponse::Payload(Bytes::copy_from_slice(body)),
    };

    Ok(response)
}

fn reject(message: String) -> ModbusError {
    warn!("Rejected response: {}", message);
    ModbusError::frame(message)
}

/// Check a one-byte byte count prefix and return the data it covers.
fn byte_counted(body: &[u8], expected: usize) -> ModbusResult<&[u8]> {
    match body.split_first() {
        Some((&count, data)) if count as usize == expected && data.len() == expected => Ok(data),
        Some((&count, data)) => Err(reject(format!(
            "Byte count mismatch: expected {}, field says {}, carried {}",
            expected,
            count,
            data.len()
        ))),
        None => Err(reject("Missing byte count".to_string())),
    }
}

fn expect_echo(body: &[u8], expected: &[u16]) -> ModbusResult<()> {
    if body.len() != expected.len() * 2 {
        return Err(reject(format!(
            "Echo length mismatch: expected {} bytes, got {}",
            expected.len() * 2,
            body.len()
        )));
    }
    let echoed = parse_registers(body);
    if echoed != expected {
        return Err(reject(format!(
            "Echo mismatch: sent {:04X?}, device echoed {:04X?}",
            expected, echoed
        )));
    }
    Ok(())
}

fn parse_registers(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// FIFO body: byte count (2) = 2 + 2·N, FIFO count (2) = N, then N registers
fn parse_fifo(body: &[u8]) -> ModbusResult<Vec<u16>> {
    if body.len() < 4 {
        return Err(reject(format!("FIFO response too short: {} bytes", body.len())));
    }
    let byte_count = u16::from_be_bytes([body[0], body[1]]) as usize;
    let fifo_count = u16::from_be_bytes([body[2], body[3]]) as usize;

    if fifo_count > MAX_FIFO_COUNT {
        return Err(reject(format!(
            "FIFO count {} exceeds {}",
            fifo_count, MAX_FIFO_COUNT
        )));
    }
    if byte_count != 2 + 2 * fifo_count || body.len() != 2 + byte_count {
        return Err(reject(format!(
            "FIFO byte count mismatch: byte count {}, FIFO count {}, carried {}",
            byte_count,
            fifo_count,
            body.len() - 2
        )));
    }

    Ok(parse_registers(&body[4..]))
}
