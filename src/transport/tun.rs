//! Linux TUN interface: the local raw-packet source/sink.
//!
//! The device is opened through `/dev/net/tun` and configured with
//! `ip(8)`, so creation requires CAP_NET_ADMIN. TUN reads block, and
//! the relay must not; a dedicated blocking task pumps packets into a
//! channel, which is the async face the relay sees. Writes go through
//! `spawn_blocking` one packet at a time.

use std::io;
use std::net::Ipv4Addr;
use std::process::Command;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task;
use tracing::{info, warn};
use tun_tap::{Iface, Mode};

use crate::core::DEFAULT_MTU;
use crate::relay::PacketIo;

/// Packets buffered between the blocking reader task and the relay.
const READER_CHANNEL_DEPTH: usize = 64;

/// TUN interface configuration.
#[derive(Debug, Clone)]
pub struct TunConfig {
    /// Device name (e.g. "seam0").
    pub name: String,
    /// Address assigned to the local end of the tunnel.
    pub local: Ipv4Addr,
    /// Address of the remote end, routed through the device.
    pub remote: Ipv4Addr,
    /// Prefix length for the local address.
    pub prefix_len: u8,
    /// Device MTU.
    pub mtu: usize,
}

impl TunConfig {
    /// Configuration with a /24 prefix and the default MTU.
    pub fn new(name: impl Into<String>, local: Ipv4Addr, remote: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            local,
            remote,
            prefix_len: 24,
            mtu: DEFAULT_MTU,
        }
    }
}

/// An open, configured TUN device.
pub struct TunDevice {
    iface: Arc<Iface>,
    incoming: mpsc::Receiver<io::Result<Vec<u8>>>,
    name: String,
}

impl TunDevice {
    /// Create the device, assign addresses, and bring the link up.
    pub fn open(config: &TunConfig) -> io::Result<Self> {
        let iface = Arc::new(Iface::without_packet_info(&config.name, Mode::Tun)?);
        let name = iface.name().to_string();

        run_ip(&[
            "addr",
            "add",
            &format!("{}/{}", config.local, config.prefix_len),
            "dev",
            &name,
        ])?;
        run_ip(&["link", "set", "dev", &name, "mtu", &config.mtu.to_string()])?;
        run_ip(&["link", "set", "dev", &name, "up"])?;
        run_ip(&[
            "route",
            "replace",
            &format!("{}/32", config.remote),
            "dev",
            &name,
        ])?;
        info!(device = %name, local = %config.local, remote = %config.remote, "tun device up");

        let incoming = spawn_reader(Arc::clone(&iface), config.mtu);
        Ok(Self {
            iface,
            incoming,
            name,
        })
    }

    /// The kernel-assigned device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PacketIo for TunDevice {
    async fn recv_packet(&mut self) -> io::Result<Vec<u8>> {
        match self.incoming.recv().await {
            Some(result) => result,
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "tun reader task exited",
            )),
        }
    }

    async fn send_packet(&mut self, packet: &[u8]) -> io::Result<()> {
        let iface = Arc::clone(&self.iface);
        let buf = packet.to_vec();
        task::spawn_blocking(move || iface.send(&buf))
            .await
            .map_err(io::Error::other)??;
        Ok(())
    }
}

impl Drop for TunDevice {
    fn drop(&mut self) {
        // Best effort: the non-persistent device disappears with its fd,
        // this just stops traffic a moment earlier.
        if let Err(e) = run_ip(&["link", "set", "dev", &self.name, "down"]) {
            warn!(device = %self.name, error = %e, "failed to down tun device");
        }
    }
}

/// Pump blocking TUN reads into a channel until either side closes.
fn spawn_reader(iface: Arc<Iface>, mtu: usize) -> mpsc::Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel(READER_CHANNEL_DEPTH);
    task::spawn_blocking(move || {
        loop {
            let mut buf = vec![0u8; mtu];
            match iface.recv(&mut buf) {
                Ok(len) => {
                    buf.truncate(len);
                    if tx.blocking_send(Ok(buf)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    break;
                }
            }
        }
    });
    rx
}

/// Run one `ip(8)` command, mapping a non-zero exit into an error.
fn run_ip(args: &[&str]) -> io::Result<()> {
    let output = Command::new("ip").args(args).output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "ip {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}
