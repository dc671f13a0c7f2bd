//! The seele full-node service.

use crate::{ChainReader, DebugApi, PublicSeeleApi, TxPoolReader};
use async_trait::async_trait;
use parking_lot::RwLock;
use seele_node::{Api, Protocol, Service, ServiceError, TransportHandle};
use std::sync::Arc;
use tracing::info;

pub const SERVICE_NAME: &str = "seele";
pub const PROTOCOL_NAME: &str = "seele";
pub const PROTOCOL_VERSION: u32 = 1;
/// Number of message codes the protocol uses.
pub const PROTOCOL_LENGTH: u16 = 8;

pub struct SeeleService {
    chain: Arc<dyn ChainReader>,
    pool: Arc<dyn TxPoolReader>,
    transport: Arc<RwLock<Option<TransportHandle>>>,
}

impl SeeleService {
    pub fn new(chain: Arc<dyn ChainReader>, pool: Arc<dyn TxPoolReader>) -> Self {
        Self {
            chain,
            pool,
            transport: Arc::new(RwLock::new(None)),
        }
    }

    pub fn chain(&self) -> &Arc<dyn ChainReader> {
        &self.chain
    }

    pub fn tx_pool(&self) -> &Arc<dyn TxPoolReader> {
        &self.pool
    }

    pub fn is_started(&self) -> bool {
        self.transport.read().is_some()
    }
}

#[async_trait]
impl Service for SeeleService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn protocols(&self) -> Vec<Protocol> {
        vec![Protocol::new(PROTOCOL_NAME, PROTOCOL_VERSION, PROTOCOL_LENGTH)]
    }

    fn apis(&self) -> Vec<Api> {
        vec![
            Api::new(
                "seele",
                PublicSeeleApi::new(self.chain.clone(), self.transport.clone()).into_module(),
            ),
            Api::new(
                "debug",
                DebugApi::new(self.chain.clone(), self.pool.clone()).into_module(),
            ),
        ]
    }

    async fn start(&self, transport: TransportHandle) -> Result<(), ServiceError> {
        let height = self.chain.head_block().map(|block| block.height());
        info!(target: "seele::service", head = ?height, "seele service started");
        *self.transport.write() = Some(transport);
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.transport.write().take();
        info!(target: "seele::service", "seele service stopped");
        Ok(())
    }
}
