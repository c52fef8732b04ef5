//! Pre-shared key material and derivation.
//!
//! One master secret is supplied at session setup and split into two
//! purpose-bound keys: the first 32 bytes encrypt, the next 32 bytes
//! authenticate. The halves never overlap and are never swapped.

use crate::core::{ConfigError, ENC_KEY_SIZE, MAC_KEY_SIZE, MASTER_KEY_MIN_SIZE};
use zeroize::Zeroize;

/// The pre-shared master secret.
///
/// Opaque and immutable for the session lifetime; zeroized on drop.
#[derive(Clone)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Wrap raw key material. Length is checked at derivation, not here.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Length of the key material in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the key material is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw key material.
    ///
    /// # Security
    /// Handle with care - this exposes sensitive key material.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// The per-purpose keys derived from a [`MasterKey`].
///
/// Zeroized on drop.
#[derive(Clone)]
pub struct DerivedKeys {
    enc: [u8; ENC_KEY_SIZE],
    mac: [u8; MAC_KEY_SIZE],
}

impl DerivedKeys {
    /// Split a master key into encryption and MAC keys.
    ///
    /// Deterministic: the same master key always yields the same pair.
    ///
    /// # Errors
    /// `MasterKeyTooShort` if fewer than 64 bytes are supplied.
    pub fn derive(master: &MasterKey) -> Result<Self, ConfigError> {
        let bytes = master.as_bytes();
        if bytes.len() < MASTER_KEY_MIN_SIZE {
            return Err(ConfigError::MasterKeyTooShort {
                actual: bytes.len(),
                required: MASTER_KEY_MIN_SIZE,
            });
        }

        let mut enc = [0u8; ENC_KEY_SIZE];
        let mut mac = [0u8; MAC_KEY_SIZE];
        enc.copy_from_slice(&bytes[..ENC_KEY_SIZE]);
        mac.copy_from_slice(&bytes[ENC_KEY_SIZE..MASTER_KEY_MIN_SIZE]);

        Ok(Self { enc, mac })
    }

    /// The AES-256 encryption key.
    pub fn enc_key(&self) -> &[u8; ENC_KEY_SIZE] {
        &self.enc
    }

    /// The HMAC-SHA256 key.
    pub fn mac_key(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.mac
    }
}

impl Drop for DerivedKeys {
    fn drop(&mut self) {
        self.enc.zeroize();
        self.mac.zeroize();
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_rejects_short_keys() {
        for len in [0, 1, 32, 63] {
            let master = MasterKey::from_bytes(vec![0xab; len]);
            let err = DerivedKeys::derive(&master).unwrap_err();
            assert_eq!(
                err,
                ConfigError::MasterKeyTooShort {
                    actual: len,
                    required: MASTER_KEY_MIN_SIZE,
                }
            );
        }
    }

    #[test]
    fn test_derive_splits_halves() {
        let mut material = Vec::new();
        material.extend_from_slice(&[0x11; 32]);
        material.extend_from_slice(&[0x22; 32]);
        let master = MasterKey::from_bytes(material);

        let keys = DerivedKeys::derive(&master).unwrap();
        assert_eq!(keys.enc_key(), &[0x11; 32]);
        assert_eq!(keys.mac_key(), &[0x22; 32]);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let master = MasterKey::from_bytes((0u8..80).collect());
        let a = DerivedKeys::derive(&master).unwrap();
        let b = DerivedKeys::derive(&master).unwrap();

        assert_eq!(a.enc_key(), b.enc_key());
        assert_eq!(a.mac_key(), b.mac_key());
    }

    #[test]
    fn test_derive_ignores_trailing_bytes() {
        let short = MasterKey::from_bytes((0u8..64).collect());
        let long = MasterKey::from_bytes((0u8..128).collect());

        let a = DerivedKeys::derive(&short).unwrap();
        let b = DerivedKeys::derive(&long).unwrap();
        assert_eq!(a.enc_key(), b.enc_key());
        assert_eq!(a.mac_key(), b.mac_key());
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let master = MasterKey::from_bytes(vec![0xee; 64]);
        let keys = DerivedKeys::derive(&master).unwrap();

        let rendered = format!("{master:?} {keys:?}");
        assert!(!rendered.contains("ee"), "key bytes leaked: {rendered}");
        assert!(!rendered.contains("238"), "key bytes leaked: {rendered}");
    }

    #[test]
    fn test_exact_minimum_length_accepted() {
        let master = MasterKey::from_bytes(vec![0x01; MASTER_KEY_MIN_SIZE]);
        assert!(DerivedKeys::derive(&master).is_ok());
    }
}
