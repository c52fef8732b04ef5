//! The SEAM packet codec: authenticated encryption plus framing.
//!
//! Wire format (big-endian where numeric):
//!
//! ```text
//! offset  size  field
//! 0       16    IV
//! 16      4     SequenceNumber
//! 20      32    MAC  (HMAC-SHA256 over IV || SeqNumber || Ciphertext)
//! 52      N     Ciphertext (AES-256-CTR)
//! ```
//!
//! The IV is drawn fresh from the OS RNG on every [`seal`] call. It is
//! never derived from the sequence number and never cached: encrypting
//! two packets under the same key with the same CTR starting value
//! hands an eavesdropper the XOR of both plaintexts.
//!
//! Receive-side ordering is MAC first, sequence check second, decrypt
//! last. An unauthenticated packet is never decrypted and never touches
//! sequence state; [`WirePacket`] enforces the first step by being the
//! only way to reach [`WirePacket::decrypt`].

use aes::Aes256;
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

use crate::core::{IV_SIZE, MAC_KEY_SIZE, MAC_OFFSET, PACKET_OVERHEAD, PacketError, SEQ_OFFSET};

use super::keys::DerivedKeys;

type Aes256Ctr = Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Keyed HMAC over exactly `IV || SeqNumber || Ciphertext`.
fn mac_over(mac_key: &[u8; MAC_KEY_SIZE], iv: &[u8], seq: u32, ciphertext: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(mac_key).expect("HMAC can take key of any size");
    mac.update(iv);
    mac.update(&seq.to_be_bytes());
    mac.update(ciphertext);
    mac
}

/// Fill `plaintext` to a multiple of `block` bytes.
///
/// Every fill byte holds the fill length, so the receiver can strip it
/// without a length field. `block <= 1` disables padding.
fn pad(plaintext: &[u8], block: usize) -> Vec<u8> {
    if block <= 1 {
        return plaintext.to_vec();
    }
    let fill = block - (plaintext.len() % block);
    let mut padded = Vec::with_capacity(plaintext.len() + fill);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + fill, fill as u8);
    padded
}

/// Strip the padding applied by [`pad`].
fn unpad(mut buf: Vec<u8>, block: usize) -> Result<Vec<u8>, PacketError> {
    if block <= 1 {
        return Ok(buf);
    }
    let fill = buf.last().copied().ok_or(PacketError::DecryptFailed)? as usize;
    if fill == 0 || fill > block || fill > buf.len() {
        return Err(PacketError::DecryptFailed);
    }
    let body = buf.len() - fill;
    if buf[body..].iter().any(|&b| b != fill as u8) {
        return Err(PacketError::DecryptFailed);
    }
    buf.truncate(body);
    Ok(buf)
}

/// Encode one plaintext packet into its authenticated wire form.
///
/// `seq` must come from the session's send counter; the codec itself is
/// stateless and will happily reuse a sequence number it is handed twice
/// (the MAC covers it either way).
pub fn seal(keys: &DerivedKeys, seq: u32, plaintext: &[u8], pad_block: usize) -> Vec<u8> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut ciphertext = pad(plaintext, pad_block);
    let mut cipher = Aes256Ctr::new(keys.enc_key().into(), &iv.into());
    cipher.apply_keystream(&mut ciphertext);

    let tag = mac_over(keys.mac_key(), &iv, seq, &ciphertext)
        .finalize()
        .into_bytes();

    let mut wire = Vec::with_capacity(PACKET_OVERHEAD + ciphertext.len());
    wire.extend_from_slice(&iv);
    wire.extend_from_slice(&seq.to_be_bytes());
    wire.extend_from_slice(&tag);
    wire.extend_from_slice(&ciphertext);
    wire
}

/// A wire packet split into its fields by fixed offsets.
///
/// Borrowing the datagram keeps the receive path copy-free until the
/// packet has earned a decryption.
#[derive(Debug)]
pub struct WirePacket<'a> {
    iv: [u8; IV_SIZE],
    seq: u32,
    mac: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> WirePacket<'a> {
    /// Parse a datagram into its fields.
    ///
    /// # Errors
    /// `TooShort` if the datagram cannot hold the fixed header.
    pub fn parse(wire: &'a [u8]) -> Result<Self, PacketError> {
        if wire.len() < PACKET_OVERHEAD {
            return Err(PacketError::TooShort {
                len: wire.len(),
                min: PACKET_OVERHEAD,
            });
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&wire[..IV_SIZE]);
        let mut seq_bytes = [0u8; 4];
        seq_bytes.copy_from_slice(&wire[SEQ_OFFSET..MAC_OFFSET]);

        Ok(Self {
            iv,
            seq: u32::from_be_bytes(seq_bytes),
            mac: &wire[MAC_OFFSET..PACKET_OVERHEAD],
            ciphertext: &wire[PACKET_OVERHEAD..],
        })
    }

    /// The received sequence number.
    ///
    /// Untrusted until [`verify_mac`](Self::verify_mac) has passed.
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Recompute the MAC and compare it against the received tag.
    ///
    /// Comparison is constant-time. This must pass before the sequence
    /// number is believed or the ciphertext decrypted.
    pub fn verify_mac(&self, keys: &DerivedKeys) -> Result<(), PacketError> {
        mac_over(keys.mac_key(), &self.iv, self.seq, self.ciphertext)
            .verify_slice(self.mac)
            .map_err(|_| PacketError::MacMismatch)
    }

    /// Decrypt the ciphertext with the received IV and strip padding.
    pub fn decrypt(&self, keys: &DerivedKeys, pad_block: usize) -> Result<Vec<u8>, PacketError> {
        let mut buf = self.ciphertext.to_vec();
        let mut cipher = Aes256Ctr::new(keys.enc_key().into(), &self.iv.into());
        cipher.apply_keystream(&mut buf);
        unpad(buf, pad_block)
    }
}
