//! TCP transport.
//!
//! Accepts inbound peers on the configured address and tracks them until
//! they disconnect or the server stops. Session handshakes and protocol
//! message routing belong to the services running on top of it.

use crate::{P2pConfig, P2pError, P2pResult, Protocol, Transport, TransportFactory, TransportHandle};
use async_trait::async_trait;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Connected peer information
#[derive(Debug, Clone)]
pub struct PeerInfo {
    /// Remote address
    pub address: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
}

struct Running {
    cancel: CancellationToken,
    accept_task: Option<JoinHandle<()>>,
}

/// Default [`Transport`] implementation.
pub struct Server {
    config: P2pConfig,
    protocols: Vec<Protocol>,
    peers: Arc<DashMap<SocketAddr, PeerInfo>>,
    running: Mutex<Option<Running>>,
    /// Bound listen address while running.
    local_addr: parking_lot::RwLock<Option<SocketAddr>>,
}

impl Server {
    pub fn new(config: P2pConfig, protocols: Vec<Protocol>) -> Self {
        Self {
            config,
            protocols,
            peers: Arc::new(DashMap::new()),
            running: Mutex::new(None),
            local_addr: parking_lot::RwLock::new(None),
        }
    }

    pub fn config(&self) -> &P2pConfig {
        &self.config
    }

    /// Snapshot of the connected peers.
    pub fn peers(&self) -> Vec<PeerInfo> {
        self.peers.iter().map(|entry| entry.value().clone()).collect()
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    async fn accept_loop(
        listener: TcpListener,
        peers: Arc<DashMap<SocketAddr, PeerInfo>>,
        max_peers: usize,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            if peers.len() >= max_peers {
                                warn!(
                                    target: "seele::p2p",
                                    addr = %addr,
                                    max_peers,
                                    "rejecting inbound connection: max reached"
                                );
                                continue;
                            }

                            debug!(target: "seele::p2p", addr = %addr, "accepted inbound connection");
                            peers.insert(
                                addr,
                                PeerInfo {
                                    address: addr,
                                    connected_at: Instant::now(),
                                },
                            );

                            let peer_peers = peers.clone();
                            let peer_cancel = cancel.child_token();
                            tokio::spawn(async move {
                                Self::run_peer(stream, addr, peer_cancel).await;
                                peer_peers.remove(&addr);
                            });
                        }
                        Err(e) => {
                            warn!(target: "seele::p2p", error = %e, "accepting peer failed");
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    debug!(target: "seele::p2p", "accept loop stopping");
                    break;
                }
            }
        }
    }

    async fn run_peer(mut stream: TcpStream, addr: SocketAddr, cancel: CancellationToken) {
        let mut buf = [0u8; 4096];
        loop {
            tokio::select! {
                read = stream.read(&mut buf) => {
                    match read {
                        Ok(0) => break,
                        Ok(_) => continue,
                        Err(e) => {
                            debug!(target: "seele::p2p", addr = %addr, error = %e, "peer read failed");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
        debug!(target: "seele::p2p", addr = %addr, "peer disconnected");
    }
}

#[async_trait]
impl Transport for Server {
    fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read()
    }

    fn peer_count(&self) -> usize {
        self.peers.len()
    }

    async fn start(&self) -> P2pResult<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(P2pError::AlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let mut state = Running {
            cancel: cancel.clone(),
            accept_task: None,
        };
        let mut bound = None;

        if self.config.is_listening() {
            let listener = TcpListener::bind(self.config.listen_addr.as_str())
                .await
                .map_err(|source| P2pError::Bind {
                    addr: self.config.listen_addr.clone(),
                    source,
                })?;
            let local_addr = listener.local_addr()?;
            bound = Some(local_addr);

            info!(
                target: "seele::p2p",
                address = %local_addr,
                max_peers = self.config.max_peers,
                protocols = self.protocols.len(),
                "p2p server listening"
            );

            let peers = self.peers.clone();
            let max_peers = self.config.max_peers;
            state.accept_task = Some(tokio::spawn(Self::accept_loop(
                listener, peers, max_peers, cancel,
            )));
        } else {
            info!(target: "seele::p2p", "p2p server started without a listener");
        }

        *self.local_addr.write() = bound;
        *running = Some(state);
        Ok(())
    }

    async fn stop(&self) {
        let Some(mut state) = self.running.lock().await.take() else {
            return;
        };

        state.cancel.cancel();
        if let Some(task) = state.accept_task.take() {
            if let Err(e) = task.await {
                warn!(target: "seele::p2p", error = %e, "accept loop ended abnormally");
            }
        }

        self.peers.clear();
        let address = self.local_addr.write().take();
        info!(
            target: "seele::p2p",
            address = ?address,
            "p2p server stopped"
        );
    }
}

/// Creates a [`Server`] per node start.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFactory;

impl TransportFactory for ServerFactory {
    fn create(&self, config: P2pConfig, protocols: Vec<Protocol>) -> TransportHandle {
        Arc::new(Server::new(config, protocols))
    }
}
