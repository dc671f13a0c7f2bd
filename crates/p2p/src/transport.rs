//! Transport contract consumed by the node.

use crate::{P2pConfig, P2pResult, Protocol};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;

/// The running peer-to-peer networking layer.
///
/// The node owns the transport's lifecycle. Services receive a
/// [`TransportHandle`] on start and may use it for networking, but never
/// call `start` or `stop` themselves.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Protocols this transport was configured with.
    fn protocols(&self) -> &[Protocol];

    /// Bound listen address once started.
    fn local_addr(&self) -> Option<SocketAddr>;

    /// Currently connected peers.
    fn peer_count(&self) -> usize;

    /// Brings the transport up.
    async fn start(&self) -> P2pResult<()>;

    /// Tears the transport down. Stopping an idle transport is a no-op.
    async fn stop(&self);
}

/// Shared handle to a running transport.
pub type TransportHandle = Arc<dyn Transport>;

/// Builds a fresh transport for every node start.
pub trait TransportFactory: Send + Sync {
    fn create(&self, config: P2pConfig, protocols: Vec<Protocol>) -> TransportHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _accepts_transport(_: &dyn Transport) {}
        fn _accepts_factory(_: &dyn TransportFactory) {}
    }
}
