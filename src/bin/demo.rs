//! Voltage MBAP Demo
//!
//! Runs every client operation once against a live device and prints the
//! resulting status of each.
//!
//! Usage: cargo run --features cli --bin demo [host] [port] [slave_id]
//! Example: RUST_LOG=voltage_mbap=debug cargo run --features cli --bin demo 127.0.0.1 502 1

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voltage_mbap::{ClientConfig, ModbusClient, ModbusResult, ModbusTcpClient, Status};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn report<T: std::fmt::Debug>(label: &str, result: &ModbusResult<T>) {
    match result {
        Ok(value) => println!("  {:<34} {} {:?}", label, Status::Ok, value),
        Err(e) => println!("  {:<34} {} ({})", label, Status::from(result), e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args.next().map(|p| p.parse()).transpose()?.unwrap_or(voltage_mbap::DEFAULT_TCP_PORT);
    let slave_id: u8 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(1);

    println!("{}", voltage_mbap::info());
    println!("Connecting to {}:{} (slave {})...", host, port, slave_id);

    let config = ClientConfig::new()
        .with_response_timeout(Duration::from_millis(500))
        .with_packet_logging(true);

    let mut client = match ModbusTcpClient::connect(&host, port, config).await {
        Ok(client) => client,
        Err(e) => {
            println!("Connection failed: {} ({})", e, e.status());
            return Ok(());
        }
    };

    let mut connection = client.subscribe_connection_state();
    tokio::spawn(async move {
        while connection.changed().await.is_ok() {
            if !*connection.borrow() {
                println!("  ! connection closed");
            }
        }
    });

    println!("\nReads:");
    report("FC01 read coils 0-7", &client.read_01(slave_id, 0, 8).await);
    report("FC02 read discrete inputs 0-7", &client.read_02(slave_id, 0, 8).await);
    report("FC03 read holding registers 0-4", &client.read_03(slave_id, 0, 5).await);
    report("FC04 read input registers 0-4", &client.read_04(slave_id, 0, 5).await);
    report("FC18 read FIFO queue 0", &client.read_18(slave_id, 0).await);

    println!("\nWrites:");
    report("FC05 write coil 0 = ON", &client.write_05(slave_id, 0, true).await);
    report("FC06 write register 100", &client.write_06(slave_id, 100, 0x1234).await);
    report(
        "FC0F write coils 0-9",
        &client
            .write_0f(slave_id, 0, &[true, false, true, true, false, false, true, true, true, false])
            .await,
    );
    report(
        "FC10 write registers 200-202",
        &client.write_10(slave_id, 200, &[0x1111, 0x2222, 0x3333]).await,
    );
    report(
        "FC16 mask write register 4",
        &client.mask_write_16(slave_id, 4, 0x00F2, 0x0025).await,
    );
    report(
        "FC17 write 200-201, read 0-3",
        &client
            .write_read_multiple_registers(slave_id, 200, &[0x00AA, 0x00BB], 0, 4)
            .await,
    );

    println!("\nPassthrough:");
    report(
        "FC2B custom (device id)",
        &client.execute_custom(slave_id, 0x2B, &[0x0E, 0x01, 0x00]).await,
    );
    // Read holding register 0, framed by hand
    let raw = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, slave_id, 0x03, 0x00, 0x00, 0x00, 0x01];
    report("raw FC03", &client.execute_raw(&raw).await);

    let stats = client.get_stats();
    println!("\nStatistics:");
    println!(
        "  Requests: {}, Responses: {}, Timeouts: {}, Errors: {}",
        stats.requests_sent, stats.responses_received, stats.timeouts, stats.errors
    );
    println!(
        "  Bytes sent: {}, received: {}, stale discarded: {}",
        stats.bytes_sent, stats.bytes_received, stats.stale_bytes_discarded
    );

    client.close().await?;
    Ok(())
}
