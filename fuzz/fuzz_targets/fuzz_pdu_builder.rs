#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voltage_mbap::{encode_request, MbapHeader, ModbusRequest, MAX_PDU_SIZE};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    transaction_id: u16,
    unit_id: u8,
    address: u16,
    registers: Vec<u16>,
    coils: Vec<bool>,
    function_code: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let requests = [
        ModbusRequest::WriteMultipleRegisters { address: input.address, values: input.registers.clone() },
        ModbusRequest::WriteMultipleCoils { address: input.address, values: input.coils },
        ModbusRequest::ReadWriteMultipleRegisters {
            read_address: input.address,
            read_quantity: input.registers.len() as u16,
            write_address: input.address,
            values: input.registers,
        },
        ModbusRequest::Custom { function_code: input.function_code, data: input.data },
    ];

    for request in &requests {
        // Builders must reject oversized input instead of panicking
        if request.validate().is_err() {
            continue;
        }
        if let Ok(frame) = encode_request(input.transaction_id, input.unit_id, request) {
            let header = MbapHeader::parse(&frame).expect("encoded frame carries a header");
            assert_eq!(header.length as usize, frame.len() - 6);
            assert!(frame.len() - 7 <= MAX_PDU_SIZE);
        }
    }
});
