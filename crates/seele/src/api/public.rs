use crate::{ChainReader, SeeleError};
use parking_lot::RwLock;
use seele_p2p::TransportHandle;
use seele_rpc::{MethodSet, RpcModule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Summary returned by `seele.getInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub current_block_height: u64,
    pub header_hash: String,
    pub peer_count: usize,
}

/// The `seele` namespace.
pub struct PublicSeeleApi {
    chain: Arc<dyn ChainReader>,
    transport: Arc<RwLock<Option<TransportHandle>>>,
}

impl PublicSeeleApi {
    pub fn new(chain: Arc<dyn ChainReader>, transport: Arc<RwLock<Option<TransportHandle>>>) -> Self {
        Self { chain, transport }
    }

    pub fn get_info(&self) -> Result<NodeInfo, SeeleError> {
        let head = self.chain.head_block().ok_or(SeeleError::EmptyChain)?;
        let peer_count = self
            .transport
            .read()
            .as_ref()
            .map_or(0, |transport| transport.peer_count());
        Ok(NodeInfo {
            current_block_height: head.height(),
            header_hash: head.hash.to_hex(),
            peer_count,
        })
    }

    pub fn get_reward(&self, block_number: u64) -> u64 {
        seele_miner::reward(block_number)
    }

    pub fn into_module(self) -> Arc<dyn RpcModule> {
        MethodSet::new(self)
            .method("getInfo", |api: &PublicSeeleApi, _: Value| api.get_info())
            .method("getReward", |api: &PublicSeeleApi, block_number: u64| {
                Ok::<_, SeeleError>(api.get_reward(block_number))
            })
            .into_module()
    }
}
