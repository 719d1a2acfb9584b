#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voltage_mbap::{decode_response, ModbusRequest, ModbusResponse};

#[derive(Debug, Arbitrary)]
enum FuzzRequest {
    ReadCoils { address: u16, quantity: u16 },
    ReadHoldingRegisters { address: u16, quantity: u16 },
    WriteSingleCoil { address: u16, value: bool },
    WriteMultipleRegisters { address: u16, values: Vec<u16> },
    MaskWriteRegister { address: u16, and_mask: u16, or_mask: u16 },
    ReadWriteMultipleRegisters { read_address: u16, read_quantity: u16, write_address: u16, values: Vec<u16> },
    ReadFifoQueue { fifo_address: u16 },
    Custom { function_code: u8, data: Vec<u8> },
}

impl From<FuzzRequest> for ModbusRequest {
    fn from(r: FuzzRequest) -> Self {
        match r {
            FuzzRequest::ReadCoils { address, quantity } => ModbusRequest::ReadCoils { address, quantity },
            FuzzRequest::ReadHoldingRegisters { address, quantity } => {
                ModbusRequest::ReadHoldingRegisters { address, quantity }
            }
            FuzzRequest::WriteSingleCoil { address, value } => ModbusRequest::WriteSingleCoil { address, value },
            FuzzRequest::WriteMultipleRegisters { address, values } => {
                ModbusRequest::WriteMultipleRegisters { address, values }
            }
            FuzzRequest::MaskWriteRegister { address, and_mask, or_mask } => {
                ModbusRequest::MaskWriteRegister { address, and_mask, or_mask }
            }
            FuzzRequest::ReadWriteMultipleRegisters { read_address, read_quantity, write_address, values } => {
                ModbusRequest::ReadWriteMultipleRegisters { read_address, read_quantity, write_address, values }
            }
            FuzzRequest::ReadFifoQueue { fifo_address } => ModbusRequest::ReadFifoQueue { fifo_address },
            FuzzRequest::Custom { function_code, data } => ModbusRequest::Custom { function_code, data },
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput<'a> {
    transaction_id: u16,
    unit_id: u8,
    request: FuzzRequest,
    frame: &'a [u8],
}

fuzz_target!(|input: FuzzInput| {
    let request: ModbusRequest = input.request.into();
    let shape = request.response_shape();
    let _ = shape.target_len(input.frame);

    // A decoded read never yields more points than were asked for
    match decode_response(input.frame, input.transaction_id, input.unit_id, &request) {
        Ok(ModbusResponse::Bits(bits)) => {
            if let ModbusRequest::ReadCoils { quantity, .. } = request {
                assert_eq!(bits.len(), quantity as usize);
            }
        }
        Ok(ModbusResponse::Registers(registers)) => {
            if let ModbusRequest::ReadHoldingRegisters { quantity, .. } = request {
                assert_eq!(registers.len(), quantity as usize);
            }
        }
        _ => {}
    }
});
