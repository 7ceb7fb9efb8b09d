//! Router construction parameters.

use lsr_wire::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default heartbeat interval in milliseconds
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 1000;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Node address is empty
    #[error("router address must not be empty")]
    EmptyAddress,

    /// Heartbeat interval is zero
    #[error("heartbeat interval must be greater than zero")]
    ZeroHeartbeat,
}

/// Link-state router configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Address of this node
    pub address: Address,
    /// Interval between periodic re-advertisements
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

fn default_heartbeat_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_MS
}

impl RouterConfig {
    /// Create a configuration with the default heartbeat
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
        }
    }

    /// Set the heartbeat interval
    pub fn with_heartbeat_interval_ms(mut self, heartbeat_interval_ms: u64) -> Self {
        self.heartbeat_interval_ms = heartbeat_interval_ms;
        self
    }

    /// Check that the configuration can drive a router
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.is_empty() {
            return Err(ConfigError::EmptyAddress);
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::ZeroHeartbeat);
        }
        Ok(())
    }
}
