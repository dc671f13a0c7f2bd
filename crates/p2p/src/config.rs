//! P2P server configuration.

use serde::{Deserialize, Serialize};

/// Default P2P listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8057";
/// Default cap on simultaneously connected peers.
pub const DEFAULT_MAX_PEERS: usize = 25;

/// Transport configuration handed to the [`TransportFactory`](crate::TransportFactory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct P2pConfig {
    /// Address to accept inbound peers on. Empty disables listening.
    pub listen_addr: String,
    /// Maximum number of connected peers.
    pub max_peers: usize,
}

impl Default for P2pConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_peers: DEFAULT_MAX_PEERS,
        }
    }
}

impl P2pConfig {
    /// Returns `true` when inbound connections should be accepted.
    pub fn is_listening(&self) -> bool {
        !self.listen_addr.trim().is_empty()
    }
}
