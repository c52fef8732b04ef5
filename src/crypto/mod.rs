//! SEAM security layer.
//!
//! Key derivation, the authenticated packet codec, the anti-replay
//! guard, and the stateful [`TunnelSession`] that composes them.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Relay (I/O loop)             │
//! ├─────────────────────────────────────────┤
//! │          TunnelSession                  │  ← This module
//! │   keys, codec, sequence counters        │
//! ├─────────────────────────────────────────┤
//! │              UDP                        │
//! └─────────────────────────────────────────┘
//! ```

mod codec;
mod keys;
mod replay;
mod session;

pub use codec::{WirePacket, seal};
pub use keys::{DerivedKeys, MasterKey};
pub use replay::ReplayGuard;
pub use session::TunnelSession;
