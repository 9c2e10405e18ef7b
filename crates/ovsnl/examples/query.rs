//! Query a switch-managed device and print its cached attributes.
//!
//! Usage: cargo run --example query -- <device-name>

use ovsnl::Result;
use ovsnl::netdev::Netdev;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "vport1".to_string());

    let dev = Netdev::system(name.as_str()).await?;

    let mac = dev.mac()?;
    println!("device:  {} ({})", dev.name(), dev.kind());
    println!(
        "mac:     {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    println!("mtu:     {}", dev.mtu()?);
    println!("flags:   {:#x}", dev.if_flags()?);
    println!("port:    {}", dev.port_no()?);
    println!("type:    {}", dev.device_type()?);

    Ok(())
}
