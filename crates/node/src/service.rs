//! Contract for the pluggable subsystems a node runs.

use async_trait::async_trait;
use seele_p2p::{Protocol, TransportHandle};
use seele_rpc::Api;
use std::fmt;

/// Error a service reports from `start` or `stop`.
///
/// Kept opaque so callers can downcast to the service's own error type.
pub type ServiceError = anyhow::Error;

/// A subsystem hosted by a [`Node`](crate::Node).
///
/// The node calls `start` once per node start, in registration order, and
/// `stop` once per node stop (or when a later service fails to start).
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable name used when reporting failures.
    fn name(&self) -> &str;

    /// Sub-protocols this service wants the transport to run.
    fn protocols(&self) -> Vec<Protocol>;

    /// RPC namespaces this service contributes.
    fn apis(&self) -> Vec<Api>;

    /// Brings the service up on the running transport. The node owns the
    /// transport's lifecycle.
    async fn start(&self, transport: TransportHandle) -> Result<(), ServiceError>;

    /// Tears the service down. Must tolerate being called after a partial
    /// start.
    async fn stop(&self) -> Result<(), ServiceError>;
}

/// Identity of a registered service in failure reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId {
    /// Registration position.
    pub index: usize,
    pub name: String,
}

impl ServiceId {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}
