//! Session configuration.
//!
//! Collected once at startup and consumed to build a
//! [`TunnelSession`](crate::crypto::TunnelSession) plus its transport
//! collaborators. Beyond the master-key length check performed at key
//! derivation, values are taken as given.

use std::net::SocketAddr;

use super::constants::{DEFAULT_MTU, DEFAULT_PAD_BLOCK};
use super::error::ConfigError;
use crate::crypto::MasterKey;

/// Configuration for one point-to-point tunnel.
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    /// Pre-shared master key (>= 64 bytes).
    pub master_key: MasterKey,

    /// Local UDP address to bind.
    pub local_addr: SocketAddr,

    /// Remote peer's UDP address.
    pub remote_addr: SocketAddr,

    /// Maximum raw packet size read from the local source.
    pub mtu: usize,

    /// Plaintext padding granularity. Must match the peer's.
    pub pad_block: usize,
}

impl TunnelConfig {
    /// Start building a configuration from the required fields.
    pub fn builder(
        master_key: MasterKey,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
    ) -> TunnelConfigBuilder {
        TunnelConfigBuilder {
            master_key,
            local_addr,
            remote_addr,
            mtu: DEFAULT_MTU,
            pad_block: DEFAULT_PAD_BLOCK,
        }
    }
}

/// Builder for [`TunnelConfig`].
#[derive(Debug)]
pub struct TunnelConfigBuilder {
    master_key: MasterKey,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
    mtu: usize,
    pad_block: usize,
}

impl TunnelConfigBuilder {
    /// Set the local-source MTU.
    pub fn mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the padding granularity (1 disables padding).
    pub fn pad_block(mut self, pad_block: usize) -> Self {
        self.pad_block = pad_block;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<TunnelConfig, ConfigError> {
        if self.pad_block == 0 {
            return Err(ConfigError::InvalidPadBlock);
        }
        Ok(TunnelConfig {
            master_key: self.master_key,
            local_addr: self.local_addr,
            remote_addr: self.remote_addr,
            mtu: self.mtu,
            pad_block: self.pad_block,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> MasterKey {
        MasterKey::from_bytes(vec![0x5a; 64])
    }

    #[test]
    fn test_builder_defaults() {
        let config = TunnelConfig::builder(
            test_key(),
            "127.0.0.1:4500".parse().unwrap(),
            "127.0.0.1:4501".parse().unwrap(),
        )
        .build()
        .unwrap();

        assert_eq!(config.mtu, DEFAULT_MTU);
        assert_eq!(config.pad_block, DEFAULT_PAD_BLOCK);
    }

    #[test]
    fn test_builder_rejects_zero_pad_block() {
        let result = TunnelConfig::builder(
            test_key(),
            "127.0.0.1:4500".parse().unwrap(),
            "127.0.0.1:4501".parse().unwrap(),
        )
        .pad_block(0)
        .build();

        assert_eq!(result.unwrap_err(), ConfigError::InvalidPadBlock);
    }

    #[test]
    fn test_builder_overrides() {
        let config = TunnelConfig::builder(
            test_key(),
            "10.0.0.1:9000".parse().unwrap(),
            "10.0.0.2:9000".parse().unwrap(),
        )
        .mtu(1400)
        .pad_block(1)
        .build()
        .unwrap();

        assert_eq!(config.mtu, 1400);
        assert_eq!(config.pad_block, 1);
    }
}
