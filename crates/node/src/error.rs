//! Error types for node lifecycle operations.

use crate::{ServiceError, ServiceId};
use seele_p2p::P2pError;
use seele_rpc::RpcError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors returned by [`Node`](crate::Node) operations.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Node built without a configuration.
    #[error("config is missing")]
    ConfigMissing,

    /// Node built without a logger.
    #[error("logger is missing")]
    LoggerMissing,

    /// Operation requires an idle node.
    #[error("node is already running")]
    NodeRunning,

    /// Operation requires a running node.
    #[error("node is already stopped")]
    NodeStopped,

    /// The p2p transport failed to start.
    #[error("failed to start service: {0}")]
    ServiceStartFailed(#[source] P2pError),

    /// The p2p transport failed to stop.
    #[error("failed to stop service")]
    ServiceStopFailed,

    /// One or more services failed to stop.
    #[error(transparent)]
    Stop(#[from] StopError),

    /// A service failed to start. The service's own error, unchanged.
    #[error(transparent)]
    Service(ServiceError),

    /// The RPC listeners could not be brought up.
    #[error("rpc startup failed: {0}")]
    Rpc(#[from] RpcError),
}

impl NodeError {
    /// The service error behind a failed start, if that is what this is.
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for node operations.
pub type NodeResult<T> = std::result::Result<T, NodeError>;

/// Services that failed to stop, keyed by identity.
#[derive(Debug, Default)]
pub struct StopError {
    pub services: BTreeMap<ServiceId, ServiceError>,
}

impl StopError {
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }
}

impl fmt::Display for StopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "services: {{")?;
        for (i, (id, err)) in self.services.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", id, err)?;
        }
        write!(f, "}}")
    }
}

impl std::error::Error for StopError {}
