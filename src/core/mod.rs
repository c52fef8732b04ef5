//! Core types for the SEAM tunnel: constants, configuration, and errors.
//!
//! Always included; everything else in the crate builds on this module.

mod config;
mod constants;
mod error;

pub use config::{TunnelConfig, TunnelConfigBuilder};
pub use constants::*;
pub use error::{ConfigError, PacketError, TunnelError};
