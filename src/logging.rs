//! Packet logging helpers
//!
//! Raw frames are dumped through `tracing` at `info` level when packet
//! logging is enabled on a transport:
//!
//! ```text
//! [MODBUS-TCP] send slave:1 00 2A 00 00 00 06 01 03 00 00 00 04
//! [MODBUS-TCP] recv slave:1 00 2A 00 00 00 0B 01 03 08 00 0A 00 14 00 1E 00 28
//! ```

use tracing::info;

use crate::constants::MBAP_PREFIX_LEN;

/// Protocol tag used in packet log lines
pub const PROTOCOL_TAG: &str = "TCP";

/// Format raw bytes as space separated uppercase hex
pub fn format_hex_packet(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log a frame with its direction and, when known, the unit id
pub fn log_packet(direction: &str, data: &[u8], slave_id: Option<u8>) {
    let hex = format_hex_packet(data);
    match slave_id {
        Some(id) => info!("[MODBUS-{}] {} slave:{} {}", PROTOCOL_TAG, direction, id, hex),
        None => info!("[MODBUS-{}] {} {}", PROTOCOL_TAG, direction, hex),
    }
}

/// Unit id of an MBAP frame, if the frame is long enough to carry one
pub fn frame_unit_id(frame: &[u8]) -> Option<u8> {
    frame.get(MBAP_PREFIX_LEN).copied()
}
