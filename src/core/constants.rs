//! Protocol constants for the SEAM wire format.
//!
//! These values are fixed by the protocol and MUST NOT be changed.

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// AES-CTR initialization vector size.
pub const IV_SIZE: usize = 16;

/// Sequence number size (u32, big-endian).
pub const SEQ_SIZE: usize = 4;

/// HMAC-SHA256 tag size.
pub const MAC_SIZE: usize = 32;

/// Fixed per-packet overhead: `IV || Seq || MAC` before the ciphertext.
pub const PACKET_OVERHEAD: usize = IV_SIZE + SEQ_SIZE + MAC_SIZE;

/// Byte offset of the sequence number within a wire packet.
pub const SEQ_OFFSET: usize = IV_SIZE;

/// Byte offset of the MAC within a wire packet.
pub const MAC_OFFSET: usize = IV_SIZE + SEQ_SIZE;

// =============================================================================
// KEY MATERIAL
// =============================================================================

/// AES-256 encryption key size.
pub const ENC_KEY_SIZE: usize = 32;

/// HMAC-SHA256 key size.
pub const MAC_KEY_SIZE: usize = 32;

/// Minimum master key length: both derived keys must fit without overlap.
pub const MASTER_KEY_MIN_SIZE: usize = ENC_KEY_SIZE + MAC_KEY_SIZE;

// =============================================================================
// FRAMING DEFAULTS
// =============================================================================

/// Default plaintext padding granularity (AES block size).
///
/// Plaintext is filled to a multiple of this before encryption. CTR mode
/// needs no padding; the overhead is kept as a documented framing choice.
/// A granularity of 1 disables padding. Both peers must use the same value.
pub const DEFAULT_PAD_BLOCK: usize = 16;

/// Default MTU for the local raw-packet source.
pub const DEFAULT_MTU: usize = 1500;

/// Receive buffer size for the transport socket.
pub const RECV_BUFFER_SIZE: usize = 65535;
