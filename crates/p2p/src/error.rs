//! Error types for the P2P transport.

use thiserror::Error;

/// Result type alias for transport operations.
pub type P2pResult<T> = Result<T, P2pError>;

/// Errors raised while bringing the transport up.
#[derive(Error, Debug)]
pub enum P2pError {
    /// `start` was called on a server that is already running.
    #[error("p2p server is already running")]
    AlreadyRunning,

    /// The listen address could not be bound.
    #[error("failed to bind p2p listener on {addr}: {source}")]
    Bind {
        /// Configured listen address.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// IO error propagated from the socket layer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
