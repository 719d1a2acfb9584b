//! Response accumulation
//!
//! Collects response bytes from a transport until the frame is complete or a
//! wait times out. The target length comes from the request's
//! [`ResponseShape`]; it shrinks to the 9-byte exception frame as soon as the
//! function code byte shows the exception bit, and for variable-length
//! responses it is learned from the MBAP length field once six bytes are in.
//!
//! Reads never go past the current target, so bytes belonging to whatever
//! follows the frame stay in the transport and are dropped as stale input
//! before the next request.

use std::time::Duration;

use bytes::BytesMut;
use tracing::debug;

use crate::constants::{MBAP_PREFIX_LEN, MODBUS_RESPONSE_BUFFER_SIZE};
use crate::protocol::ResponseShape;
use crate::transport::ModbusTransport;

/// Accumulate one response frame.
///
/// Each wait is bounded by `timeout`; the loop ends early on the first wait
/// that yields nothing, returning the short read.
pub(crate) async fn accumulate<T: ModbusTransport>(
    transport: &mut T,
    shape: ResponseShape,
    timeout: Duration,
) -> BytesMut {
    let mut frame = BytesMut::with_capacity(MODBUS_RESPONSE_BUFFER_SIZE);

    loop {
        let wanted = match shape.target_len(&frame) {
            Some(target) if frame.len() >= target => break,
            Some(target) => target - frame.len(),
            None => MBAP_PREFIX_LEN - frame.len(),
        };

        if !transport.wait_for_data(timeout).await {
            debug!(
                "Wait for response timed out with {} bytes collected",
                frame.len()
            );
            break;
        }

        let chunk = transport.read_available(wanted);
        if chunk.is_empty() {
            break;
        }
        frame.extend_from_slice(&chunk);
    }

    frame
}

/// Single wait followed by taking everything that arrived. Used where no
/// framing exists to learn a length from.
pub(crate) async fn read_burst<T: ModbusTransport>(transport: &mut T, timeout: Duration) -> BytesMut {
    let mut burst = BytesMut::new();
    if transport.wait_for_data(timeout).await {
        burst.extend_from_slice(&transport.read_available(usize::MAX));
    }
    burst
}
