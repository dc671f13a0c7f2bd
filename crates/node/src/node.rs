//! The node lifecycle.

use crate::rpc::{start_rpc, RpcEndpoints};
use crate::{Config, NodeError, NodeResult, Service, ServiceId, StopError};
use seele_p2p::{Protocol, ServerFactory, TransportFactory, TransportHandle};
use seele_rpc::Api;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct NodeInner {
    /// Protocols handed to the transport on the last start.
    protocols: Vec<Protocol>,
    /// Present exactly while the node is running.
    transport: Option<TransportHandle>,
    services: Vec<Arc<dyn Service>>,
    rpc_apis: Vec<Api>,
    endpoints: Option<RpcEndpoints>,
}

/// Container hosting a set of services.
///
/// Registration, start, stop and restart are serialized by one lock, so
/// the running state is never observed half-way through a transition.
pub struct Node {
    config: Arc<Config>,
    transports: Arc<dyn TransportFactory>,
    inner: RwLock<NodeInner>,
}

impl Node {
    /// Creates an idle node over the default TCP transport. The config is
    /// copied; later changes to `config` do not reach the node.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(Arc::new(config.clone()), Arc::new(ServerFactory))
    }

    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    fn with_parts(config: Arc<Config>, transports: Arc<dyn TransportFactory>) -> Self {
        Self {
            config,
            transports,
            inner: RwLock::new(NodeInner::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Adds a service. Only allowed while the node is idle.
    pub async fn register(&self, service: Arc<dyn Service>) -> NodeResult<()> {
        let mut inner = self.inner.write().await;
        if inner.transport.is_some() {
            return Err(NodeError::NodeRunning);
        }
        debug!(target: "seele::node", service = service.name(), "registered service");
        inner.services.push(service);
        Ok(())
    }

    /// Starts the transport, every service and both RPC listeners.
    ///
    /// On failure everything already brought up is stopped again and the
    /// node stays idle. A service's start error is returned as
    /// [`NodeError::Service`] carrying that exact error.
    pub async fn start(&self) -> NodeResult<()> {
        let mut inner = self.inner.write().await;
        self.start_locked(&mut inner).await
    }

    /// Stops every service and the transport.
    ///
    /// The node always ends idle with no registered services. Services
    /// that failed to stop are reported together in [`NodeError::Stop`].
    pub async fn stop(&self) -> NodeResult<()> {
        let mut inner = self.inner.write().await;
        self.stop_locked(&mut inner).await
    }

    /// Stops then starts the node. Nothing is started if the stop fails.
    pub async fn restart(&self) -> NodeResult<()> {
        let mut inner = self.inner.write().await;
        self.stop_locked(&mut inner).await?;
        self.start_locked(&mut inner).await
    }

    async fn start_locked(&self, inner: &mut NodeInner) -> NodeResult<()> {
        if inner.transport.is_some() {
            return Err(NodeError::NodeRunning);
        }

        info!(target: "seele::node", name = %self.config.name, services = inner.services.len(), "starting node");

        inner.protocols = inner.services.iter().flat_map(|s| s.protocols()).collect();
        let transport = self
            .transports
            .create(self.config.p2p.clone(), inner.protocols.clone());
        transport.start().await.map_err(|err| {
            error!(target: "seele::node", error = %err, "p2p transport failed to start");
            NodeError::ServiceStartFailed(err)
        })?;

        for (index, service) in inner.services.iter().enumerate() {
            if let Err(err) = service.start(transport.clone()).await {
                error!(
                    target: "seele::node",
                    service = service.name(),
                    error = %err,
                    "service failed to start, rolling back"
                );
                unwind(&inner.services[..index], &transport).await;
                return Err(NodeError::Service(err));
            }
            debug!(target: "seele::node", service = service.name(), "service started");
        }

        let apis: Vec<Api> = inner.services.iter().flat_map(|s| s.apis()).collect();
        let endpoints = match start_rpc(&self.config, &apis).await {
            Ok(endpoints) => endpoints,
            Err(err) => {
                error!(target: "seele::node", error = %err, "rpc startup failed, rolling back");
                unwind(&inner.services, &transport).await;
                return Err(NodeError::Rpc(err));
            }
        };

        inner.transport = Some(transport);
        inner.rpc_apis = apis;
        inner.endpoints = Some(endpoints);
        info!(target: "seele::node", name = %self.config.name, "node started");
        Ok(())
    }

    async fn stop_locked(&self, inner: &mut NodeInner) -> NodeResult<()> {
        let Some(transport) = inner.transport.take() else {
            return Err(NodeError::NodeStopped);
        };

        if let Some(endpoints) = inner.endpoints.take() {
            endpoints.shutdown().await;
        }

        let mut failures = StopError::default();
        for (index, service) in inner.services.iter().enumerate() {
            if let Err(err) = service.stop().await {
                warn!(target: "seele::node", service = service.name(), error = %err, "service failed to stop");
                failures.services.insert(ServiceId::new(index, service.name()), err);
            }
        }

        transport.stop().await;
        inner.services.clear();
        inner.rpc_apis.clear();

        info!(target: "seele::node", name = %self.config.name, failures = failures.len(), "node stopped");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.into())
        }
    }

    pub async fn is_running(&self) -> bool {
        self.inner.read().await.transport.is_some()
    }

    pub async fn service_count(&self) -> usize {
        self.inner.read().await.services.len()
    }

    /// Protocols derived on the last start.
    pub async fn protocols(&self) -> Vec<Protocol> {
        self.inner.read().await.protocols.clone()
    }

    /// The running transport.
    pub async fn transport(&self) -> Option<TransportHandle> {
        self.inner.read().await.transport.clone()
    }

    /// Bound raw socket RPC address while running.
    pub async fn rpc_endpoint(&self) -> Option<SocketAddr> {
        self.inner.read().await.endpoints.as_ref().map(RpcEndpoints::rpc_addr)
    }

    /// Bound HTTP RPC address while running.
    pub async fn http_endpoint(&self) -> Option<SocketAddr> {
        self.inner.read().await.endpoints.as_ref().map(RpcEndpoints::http_addr)
    }

    /// APIs served while running.
    pub async fn apis(&self) -> Vec<Api> {
        self.inner.read().await.rpc_apis.clone()
    }
}

/// Stops `started` in order, then the transport. Failures are logged only.
async fn unwind(started: &[Arc<dyn Service>], transport: &TransportHandle) {
    for service in started {
        if let Err(err) = service.stop().await {
            warn!(
                target: "seele::node",
                service = service.name(),
                error = %err,
                "service failed to stop during rollback"
            );
        }
    }
    transport.stop().await;
}

/// Builder for a [`Node`] with a custom transport.
#[derive(Default)]
pub struct NodeBuilder {
    config: Option<Config>,
    transports: Option<Arc<dyn TransportFactory>>,
}

impl NodeBuilder {
    pub fn config(mut self, config: &Config) -> Self {
        self.config = Some(config.clone());
        self
    }

    pub fn transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.transports = Some(factory);
        self
    }

    pub fn build(self) -> NodeResult<Node> {
        let config = self.config.ok_or(NodeError::ConfigMissing)?;
        let transports = self
            .transports
            .unwrap_or_else(|| Arc::new(ServerFactory) as Arc<dyn TransportFactory>);
        Ok(Node::with_parts(Arc::new(config), transports))
    }
}
