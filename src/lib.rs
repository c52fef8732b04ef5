//! # SEAM Tunnel
//!
//! **S**ecure **E**ncapsulation over **A**uthenticated **M**essages
//!
//! SEAM is a pre-shared-key, point-to-point encrypted IP tunnel over
//! UDP. Raw IP packets from a local TUN interface travel inside
//! authenticated, replay-protected datagrams:
//!
//! - **Confidentiality**: AES-256-CTR with a fresh random IV per packet
//! - **Integrity**: HMAC-SHA256 over `IV || SeqNumber || Ciphertext`,
//!   verified before anything else happens to a datagram
//! - **Replay protection**: strictly monotonic per-direction sequence
//!   numbers
//! - **Simplicity**: no handshake, no negotiation - one master key,
//!   two peers, two counters
//!
//! Deliberately out of scope: key exchange, forward secrecy, packet
//! reordering tolerance, multi-peer routing, and congestion control.
//!
//! ## Feature Flags
//!
//! - `transport` (default): relay loop and UDP socket wrapper (tokio)
//! - `tun` (default): Linux TUN device support
//! - `cli`: the `seamtun` binary
//!
//! ## Example
//!
//! ```rust
//! use seam_tunnel::crypto::{MasterKey, TunnelSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let master = MasterKey::from_bytes(vec![0x42; 64]);
//!
//! // Each peer builds its own session from the shared master key.
//! let mut alice = TunnelSession::new(&master, 16)?;
//! let mut bob = TunnelSession::new(&master, 16)?;
//!
//! let wire = alice.encrypt_outbound(b"a raw ip packet")?;
//! let plaintext = bob.decrypt_inbound(&wire)?;
//! assert_eq!(plaintext, b"a raw ip packet");
//!
//! // The same datagram a second time is a replay.
//! assert!(bob.decrypt_inbound(&wire).is_err());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Core types (always included)
pub mod core;

// Security layer (always included - it is the point of the crate)
pub mod crypto;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
pub mod transport;

// The I/O loop (feature-gated)
#[cfg(feature = "transport")]
pub mod relay;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{ConfigError, PacketError, TunnelConfig, TunnelError};
    pub use crate::crypto::{DerivedKeys, MasterKey, ReplayGuard, TunnelSession, WirePacket};

    #[cfg(feature = "transport")]
    pub use crate::relay::{PacketIo, Relay, RelayStats};
    #[cfg(feature = "transport")]
    pub use crate::transport::TunnelSocket;
    #[cfg(all(feature = "tun", target_os = "linux"))]
    pub use crate::transport::{TunConfig, TunDevice};
}

// Re-export commonly used items at crate root
pub use crate::core::{ConfigError, PacketError, TunnelConfig, TunnelError};
pub use crate::crypto::{MasterKey, TunnelSession};
