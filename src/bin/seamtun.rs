//! seamtun - run one end of a SEAM tunnel.
//!
//! Both ends run the same binary; only the addresses differ. The
//! master key is a file of at least 64 raw bytes shared out of band,
//! the same bytes on both ends.
//!
//! ```text
//! seamtun --local 0.0.0.0:4500 --remote 198.51.100.7:4500 \
//!         --key-file /etc/seamtun/master.key \
//!         --tun-local 10.0.0.1 --tun-remote 10.0.0.2
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seam_tunnel::TunnelConfig;
use seam_tunnel::core::{DEFAULT_MTU, DEFAULT_PAD_BLOCK};
use seam_tunnel::crypto::MasterKey;
use seam_tunnel::relay::Relay;
use seam_tunnel::transport::{TunConfig, TunDevice};

/// A pre-shared-key encrypted IP tunnel over UDP.
#[derive(Parser)]
#[command(name = "seamtun")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Local UDP address to bind
    #[arg(long)]
    local: SocketAddr,

    /// Remote peer's UDP address
    #[arg(long)]
    remote: SocketAddr,

    /// File holding the pre-shared master key (>= 64 raw bytes)
    #[arg(long)]
    key_file: PathBuf,

    /// Address for the local end of the TUN interface
    #[arg(long)]
    tun_local: Ipv4Addr,

    /// Address of the remote end of the TUN interface
    #[arg(long)]
    tun_remote: Ipv4Addr,

    /// TUN device name
    #[arg(long, default_value = "seam0")]
    tun_name: String,

    /// Device MTU
    #[arg(long, default_value_t = DEFAULT_MTU)]
    mtu: usize,

    /// Plaintext padding granularity (must match the peer; 1 disables)
    #[arg(long, default_value_t = DEFAULT_PAD_BLOCK)]
    pad_block: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let key_bytes = std::fs::read(&cli.key_file)
        .map_err(|e| format!("cannot read key file {}: {e}", cli.key_file.display()))?;
    let master_key = MasterKey::from_bytes(key_bytes);

    let config = TunnelConfig::builder(master_key, cli.local, cli.remote)
        .mtu(cli.mtu)
        .pad_block(cli.pad_block)
        .build()?;

    let tun = TunDevice::open(&TunConfig {
        mtu: cli.mtu,
        ..TunConfig::new(cli.tun_name, cli.tun_local, cli.tun_remote)
    })?;

    let relay = Relay::from_config(&config, tun).await?;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            let _ = stop_tx.send(());
        }
    });

    let stats = relay.run(stop_rx).await?;
    tracing::info!(
        sent = stats.sent,
        received = stats.received,
        dropped = stats.dropped,
        "tunnel closed"
    );
    Ok(())
}
