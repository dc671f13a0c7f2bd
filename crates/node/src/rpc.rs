//! RPC listener bootstrap.

use crate::Config;
use seele_rpc::{serve_codec, Api, HttpServer, RpcError, RpcResult, RpcServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The two running RPC listeners of a started node.
pub struct RpcEndpoints {
    cancel: CancellationToken,
    rpc_addr: SocketAddr,
    http_addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

impl RpcEndpoints {
    /// Bound address of the raw socket listener.
    pub fn rpc_addr(&self) -> SocketAddr {
        self.rpc_addr
    }

    /// Bound address of the HTTP listener.
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Closes both listeners along with every open session on either of
    /// them, and waits for the listener tasks to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(target: "seele::node", error = %err, "rpc listener task failed");
            }
        }
        debug!(target: "seele::node", rpc = %self.rpc_addr, http = %self.http_addr, "rpc listeners closed");
    }
}

/// Registers `apis` on both transports, binds both listeners and only then
/// starts serving.
pub async fn start_rpc(config: &Config, apis: &[Api]) -> RpcResult<RpcEndpoints> {
    let mut rpc = RpcServer::new();
    let mut http = HttpServer::new(config.http_white_host.clone(), config.http_cors.clone());
    for api in apis {
        rpc.register_name(&api.namespace, api.service.clone())?;
        http.register_name(&api.namespace, api.service.clone())?;
        debug!(target: "seele::node", namespace = %api.namespace, "registered rpc namespace");
    }

    let rpc_listener = bind(&config.rpc_addr).await?;
    let http_listener = bind(&config.http_addr).await?;
    let rpc_addr = rpc_listener.local_addr()?;
    let http_addr = http_listener.local_addr()?;

    let cancel = CancellationToken::new();
    let accept_task = tokio::spawn(accept_loop(rpc_listener, Arc::new(rpc), cancel.clone()));

    let http_task = tokio::spawn(http.serve(http_listener, cancel.clone()));

    info!(target: "seele::node", rpc = %rpc_addr, http = %http_addr, "rpc listeners started");
    Ok(RpcEndpoints {
        cancel,
        rpc_addr,
        http_addr,
        tasks: vec![accept_task, http_task],
    })
}

async fn bind(addr: &str) -> RpcResult<TcpListener> {
    TcpListener::bind(addr).await.map_err(|source| RpcError::Bind {
        addr: addr.to_string(),
        source,
    })
}

async fn accept_loop(listener: TcpListener, server: Arc<RpcServer>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        debug!(target: "seele::rpc", addr = %addr, "accepted rpc connection");
                        tokio::spawn(serve_codec(server.clone(), stream, cancel.child_token()));
                    }
                    Err(err) => {
                        error!(target: "seele::rpc", error = %err, "rpc accept failed");
                    }
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}
