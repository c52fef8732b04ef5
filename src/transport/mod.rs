//! SEAM transport layer.
//!
//! The two descriptors the relay multiplexes: the UDP socket carrying
//! encrypted datagrams to the peer, and (on Linux, behind the `tun`
//! feature) the TUN device supplying raw IP packets. Both are thin
//! seams - all protocol intelligence lives in [`crate::crypto`] and
//! [`crate::relay`].

mod socket;

#[cfg(all(feature = "tun", target_os = "linux"))]
mod tun;

pub use socket::TunnelSocket;

#[cfg(all(feature = "tun", target_os = "linux"))]
pub use tun::{TunConfig, TunDevice};
