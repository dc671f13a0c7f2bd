#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use seele_node::{Api, Config, Node, P2pConfig, Protocol, Service, ServiceError, TransportHandle};
use seele_p2p::{P2pError, P2pResult, Transport, TransportFactory};
use seele_rpc::MethodSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ordered record of lifecycle calls across services and transports.
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == event).count()
    }
}

pub struct MockTransport {
    protocols: Vec<Protocol>,
    events: Events,
    fail_start: bool,
    running: AtomicBool,
}

#[async_trait]
impl Transport for MockTransport {
    fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }

    fn peer_count(&self) -> usize {
        0
    }

    async fn start(&self) -> P2pResult<()> {
        self.events.push("transport.start");
        if self.fail_start {
            return Err(P2pError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.events.push("transport.stop");
        self.running.store(false, Ordering::SeqCst);
    }
}

pub struct MockFactory {
    pub events: Events,
    pub fail_start: bool,
    pub created: Mutex<Vec<Arc<MockTransport>>>,
}

impl MockFactory {
    pub fn new(events: Events) -> Arc<Self> {
        Arc::new(Self {
            events,
            fail_start: false,
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(events: Events) -> Arc<Self> {
        Arc::new(Self {
            events,
            fail_start: true,
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn last_protocols(&self) -> Vec<Protocol> {
        self.created
            .lock()
            .last()
            .map(|t| t.protocols.clone())
            .unwrap_or_default()
    }

    pub fn last_running(&self) -> bool {
        self.created
            .lock()
            .last()
            .map(|t| t.running.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

impl TransportFactory for MockFactory {
    fn create(&self, _config: P2pConfig, protocols: Vec<Protocol>) -> TransportHandle {
        let transport = Arc::new(MockTransport {
            protocols,
            events: self.events.clone(),
            fail_start: self.fail_start,
            running: AtomicBool::new(false),
        });
        self.created.lock().push(transport.clone());
        transport
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{service} refused: {reason}")]
pub struct Refused {
    pub service: String,
    pub reason: &'static str,
}

/// Service whose behavior is scripted per test.
pub struct ScriptedService {
    name: String,
    events: Events,
    namespaces: Vec<String>,
    fail_start: bool,
    fail_stop: bool,
}

impl ScriptedService {
    pub fn new(name: &str, events: &Events) -> Self {
        Self {
            name: name.to_string(),
            events: events.clone(),
            namespaces: Vec::new(),
            fail_start: false,
            fail_stop: false,
        }
    }

    /// Serves `namespace.name` returning the service name and
    /// `namespace.echo` returning its argument.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespaces.push(namespace.to_string());
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn arc(self) -> Arc<dyn Service> {
        Arc::new(self)
    }
}

#[async_trait]
impl Service for ScriptedService {
    fn name(&self) -> &str {
        &self.name
    }

    fn protocols(&self) -> Vec<Protocol> {
        vec![Protocol::new(self.name.clone(), 1, 4)]
    }

    fn apis(&self) -> Vec<Api> {
        self.namespaces
            .iter()
            .map(|namespace| {
                let module = MethodSet::new(self.name.clone())
                    .method("name", |name: &String, _: ()| Ok::<_, String>(name.clone()))
                    .method("echo", |_: &String, value: serde_json::Value| Ok::<_, String>(value))
                    .into_module();
                Api::new(namespace.clone(), module)
            })
            .collect()
    }

    async fn start(&self, _transport: TransportHandle) -> Result<(), ServiceError> {
        self.events.push(format!("{}.start", self.name));
        if self.fail_start {
            return Err(Refused {
                service: self.name.clone(),
                reason: "start",
            }
            .into());
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.events.push(format!("{}.stop", self.name));
        if self.fail_stop {
            return Err(Refused {
                service: self.name.clone(),
                reason: "stop",
            }
            .into());
        }
        Ok(())
    }
}

/// Config binding both RPC listeners to ephemeral loopback ports.
pub fn loopback_config() -> Config {
    Config {
        rpc_addr: "127.0.0.1:0".to_string(),
        http_addr: "127.0.0.1:0".to_string(),
        ..Config::default()
    }
}

pub fn node_with(factory: Arc<MockFactory>) -> Node {
    Node::builder()
        .config(&loopback_config())
        .transport_factory(factory)
        .build()
        .expect("node")
}
