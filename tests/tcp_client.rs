//! TCP client against an in-process fake device

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use voltage_mbap::{ClientConfig, ModbusClient, ModbusError, ModbusTcpClient, Status};

/// How the fake device answers one request
#[derive(Clone)]
enum Reply {
    /// Send the frame in pieces of these lengths, pausing between them
    Split(Vec<u8>, Vec<usize>),
    /// Send the frame in one write
    Whole(Vec<u8>),
    /// Read the request and stay silent
    Silent,
    /// Read the request and hang up
    HangUp,
}

/// Read one MBAP request frame; returns its transaction id and the whole frame
async fn read_request(stream: &mut TcpStream) -> Option<(u16, Vec<u8>)> {
    let mut header = [0u8; 6];
    stream.read_exact(&mut header).await.ok()?;
    let length = u16::from_be_bytes([header[4], header[5]]) as usize;
    let mut rest = vec![0u8; length];
    stream.read_exact(&mut rest).await.ok()?;

    let mut frame = header.to_vec();
    frame.extend_from_slice(&rest);
    Some((u16::from_be_bytes([header[0], header[1]]), frame))
}

/// Build a response with the request's transaction id and a correct length field
fn response(tid: u16, unit: u8, pdu: &[u8]) -> Vec<u8> {
    let mut frame = tid.to_be_bytes().to_vec();
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(&((pdu.len() + 1) as u16).to_be_bytes());
    frame.push(unit);
    frame.extend_from_slice(pdu);
    frame
}

/// Spawn a device that answers each request with the PDU produced by
/// `script` for that request index. Returns the connected client and the
/// device task, which yields every request frame it received.
async fn start_device<F>(script: F) -> (ModbusTcpClient, JoinHandle<Vec<Vec<u8>>>)
where
    F: Fn(usize, u16, &[u8]) -> Reply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut index = 0;
        while let Some((tid, frame)) = read_request(&mut stream).await {
            let reply = script(index, tid, &frame);
            received.push(frame);
            index += 1;
            match reply {
                Reply::Whole(bytes) => stream.write_all(&bytes).await.unwrap(),
                Reply::Split(bytes, sizes) => {
                    let mut offset = 0;
                    for size in sizes {
                        stream.write_all(&bytes[offset..offset + size]).await.unwrap();
                        stream.flush().await.unwrap();
                        offset += size;
                        tokio::time::sleep(Duration::from_millis(30)).await;
                    }
                    stream.write_all(&bytes[offset..]).await.unwrap();
                }
                Reply::Silent => {}
                Reply::HangUp => break,
            }
        }
        received
    });

    let config = ClientConfig::new().with_response_timeout(Duration::from_millis(300));
    let client = ModbusTcpClient::connect("127.0.0.1", port, config)
        .await
        .unwrap();
    (client, device)
}

#[tokio::test]
async fn test_read_holding_registers_round_trip() {
    let (mut client, device) = start_device(|_, tid, _| {
        Reply::Whole(response(
            tid,
            1,
            &[0x03, 0x08, 0x00, 0x0A, 0x00, 0x14, 0x00, 0x1E, 0x00, 0x28],
        ))
    })
    .await;

    let values = client.read_holding_registers(1, 0, 4).await.unwrap();
    assert_eq!(values, vec![10, 20, 30, 40]);

    client.close().await.unwrap();
    let received = device.await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(&received[0][2..], &[0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x04]);

    let stats = client.get_stats();
    assert_eq!(stats.requests_sent, 1);
    assert_eq!(stats.responses_received, 1);
}

#[tokio::test]
async fn test_split_response_is_reassembled() {
    let (mut client, _device) = start_device(|_, tid, _| {
        let frame = response(tid, 1, &[0x03, 0x04, 0x12, 0x34, 0x56, 0x78]);
        Reply::Split(frame, vec![2, 5, 3])
    })
    .await;

    let values = client.read_03(1, 0, 2).await.unwrap();
    assert_eq!(values, vec![0x1234, 0x5678]);
}

#[tokio::test]
async fn test_exception_response() {
    let (mut client, _device) =
        start_device(|_, tid, _| Reply::Whole(response(tid, 1, &[0x81, 0x02]))).await;

    let result = client.read_coils(1, 0, 16).await;
    assert_eq!(result, Err(ModbusError::exception(0x01, 0x02)));
    assert_eq!(Status::from(&result), Status::Exception(0x02));
    assert_eq!(
        Status::from(&result).exception(),
        Some(voltage_mbap::ModbusException::IllegalDataAddress)
    );
}

#[tokio::test]
async fn test_silent_device_times_out_then_recovers() {
    let (mut client, _device) = start_device(|index, tid, _| {
        if index == 0 {
            Reply::Silent
        } else {
            Reply::Whole(response(tid, 1, &[0x06, 0x00, 0x01, 0x00, 0x07]))
        }
    })
    .await;

    let first = client.write_06(1, 1, 7).await;
    assert_eq!(Status::from(&first), Status::Timeout);

    client.write_06(1, 1, 7).await.unwrap();
    assert_eq!(client.get_stats().timeouts, 1);
}

#[tokio::test]
async fn test_late_reply_is_discarded_as_stale() {
    // First reply arrives after the client gave up; it must not be taken
    // as the answer to the second request.
    let (mut client, _device) = start_device(|index, tid, _| {
        let frame = response(tid, 1, &[0x04, 0x02, 0x00, index as u8 + 1]);
        if index == 0 {
            Reply::Split(frame, vec![0])
        } else {
            Reply::Whole(frame)
        }
    })
    .await;

    client.set_response_timeout(Duration::from_millis(10));
    let first = client.read_input_registers(1, 0, 1).await;
    assert_eq!(Status::from(&first), Status::Timeout);

    // Let the late reply land in the socket buffer
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.set_response_timeout(Duration::from_millis(300));

    let second = client.read_input_registers(1, 0, 1).await.unwrap();
    assert_eq!(second, vec![2]);
    assert!(client.get_stats().stale_bytes_discarded > 0);
}

#[tokio::test]
async fn test_fifo_split_response() {
    let (mut client, device) = start_device(|_, tid, _| {
        let frame = response(
            tid,
            1,
            &[0x18, 0x00, 0x08, 0x00, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03],
        );
        Reply::Split(frame, vec![4, 6])
    })
    .await;

    let queue = client.read_18(1, 0x04DE).await.unwrap();
    assert_eq!(queue, vec![1, 2, 3]);

    client.close().await.unwrap();
    let received = device.await.unwrap();
    assert_eq!(&received[0][7..], &[0x18, 0x04, 0xDE]);
}

#[tokio::test]
async fn test_custom_function_payload() {
    let (mut client, _device) = start_device(|_, tid, request| {
        // Echo the request payload back, reversed
        let mut pdu = vec![request[7]];
        pdu.extend(request[8..].iter().rev());
        Reply::Whole(response(tid, request[6], &pdu))
    })
    .await;

    let payload = client.execute_custom(7, 0x41, &[1, 2, 3]).await.unwrap();
    assert_eq!(payload.as_ref(), &[3, 2, 1]);
}

#[tokio::test]
async fn test_raw_passthrough() {
    let (mut client, _device) = start_device(|_, tid, _| {
        Reply::Whole(response(tid, 1, &[0x03, 0x02, 0xBE, 0xEF]))
    })
    .await;

    let request = [0x00, 0x2A, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x01];
    let reply = client.execute_raw(&request).await.unwrap();
    assert_eq!(
        reply.as_ref(),
        &[0x00, 0x2A, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02, 0xBE, 0xEF]
    );
}

#[tokio::test]
async fn test_hang_up_surfaces_on_next_call() {
    let (mut client, _device) = start_device(|_, _, _| Reply::HangUp).await;
    let mut state = client.subscribe_connection_state();

    let first = client.read_03(1, 0, 1).await;
    assert_eq!(Status::from(&first), Status::Timeout);
    assert!(!client.is_connected());

    let second = client.read_03(1, 0, 1).await;
    assert_eq!(second, Err(ModbusError::NoConnection));

    state.changed().await.unwrap();
    assert!(!*state.borrow());
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = ModbusTcpClient::connect("127.0.0.1", port, ClientConfig::default()).await;
    match result {
        Err(e) => assert_eq!(e.status(), Status::NoConnection),
        Ok(_) => panic!("connect to a closed port succeeded"),
    }
}
