//! Error types for the SEAM tunnel.

use thiserror::Error;

/// Fatal configuration errors. The session cannot be constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Master key shorter than the two derived keys it must supply.
    #[error("master key too short: {actual} bytes, need at least {required}")]
    MasterKeyTooShort {
        /// Length of the supplied key.
        actual: usize,
        /// Minimum accepted length.
        required: usize,
    },

    /// Padding granularity of zero is meaningless.
    #[error("padding granularity must be at least 1")]
    InvalidPadBlock,
}

/// Recoverable per-packet errors.
///
/// Every variant is terminal for the offending datagram only: the caller
/// drops the packet and the session continues with its counters and keys
/// untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Datagram shorter than the fixed header.
    #[error("packet too short: {len} bytes, need at least {min}")]
    TooShort {
        /// Length of the received datagram.
        len: usize,
        /// Minimum wire packet size.
        min: usize,
    },

    /// HMAC verification failed (tampered, forged, or wrong key).
    #[error("MAC verification failed")]
    MacMismatch,

    /// Sequence number not strictly greater than the highest accepted.
    #[error("replay detected: seq {seq} not above {highest}")]
    Replay {
        /// Sequence number of the rejected packet.
        seq: u32,
        /// Current receive high-water mark.
        highest: u32,
    },

    /// Decryption produced an inconsistently padded plaintext.
    #[error("decryption failed: invalid padding")]
    DecryptFailed,

    /// Send counter reached its maximum; no further packets may be sent.
    #[error("sequence counter exhausted - session must terminate")]
    SequenceExhausted,
}

/// Top-level SEAM tunnel errors.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-packet error.
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
