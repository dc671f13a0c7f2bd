use crate::{Block, ChainReader, SeeleError, SeeleResult, TxPoolReader};
use seele_rpc::{MethodSet, RpcModule};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Height selecting the chain head.
pub const HEAD_HEIGHT: i64 = -1;

/// The `debug` namespace: raw views of chain and pool state.
pub struct DebugApi {
    chain: Arc<dyn ChainReader>,
    pool: Arc<dyn TxPoolReader>,
}

impl DebugApi {
    pub fn new(chain: Arc<dyn ChainReader>, pool: Arc<dyn TxPoolReader>) -> Self {
        Self { chain, pool }
    }

    /// Bincode encoding of the block at `height`, `0x`-prefixed hex.
    pub fn get_block_rlp(&self, height: i64) -> SeeleResult<String> {
        let block = self.block(height)?;
        let encoded = bincode::serialize(block.as_ref())?;
        Ok(format!("0x{}", hex::encode(encoded)))
    }

    /// Pretty-printed form of the block at `height`.
    pub fn print_block(&self, height: i64) -> SeeleResult<String> {
        Ok(format!("{:#?}", self.block(height)?))
    }

    /// Processable pool transactions keyed by sender hex.
    pub fn get_tx_pool_content(&self) -> BTreeMap<String, Vec<Value>> {
        self.pool
            .processable_transactions()
            .into_iter()
            .map(|(sender, txs)| (sender.to_hex(), txs.iter().map(|tx| tx.to_rpc()).collect()))
            .collect()
    }

    pub fn get_tx_pool_tx_count(&self) -> u64 {
        self.pool.processable_count() as u64
    }

    fn block(&self, height: i64) -> SeeleResult<Arc<Block>> {
        match height {
            HEAD_HEIGHT => self.chain.head_block().ok_or(SeeleError::EmptyChain),
            h if h < 0 => Err(SeeleError::InvalidHeight(h)),
            h => {
                let h = h as u64;
                self.chain.block_by_height(h).ok_or(SeeleError::BlockNotFound(h))
            }
        }
    }

    pub fn into_module(self) -> Arc<dyn RpcModule> {
        MethodSet::new(self)
            .method("getBlockRlp", |api: &DebugApi, height: i64| api.get_block_rlp(height))
            .method("printBlock", |api: &DebugApi, height: i64| api.print_block(height))
            .method("getTxPoolContent", |api: &DebugApi, _: Value| {
                Ok::<_, SeeleError>(api.get_tx_pool_content())
            })
            .method("getTxPoolTxCount", |api: &DebugApi, _: Value| {
                Ok::<_, SeeleError>(api.get_tx_pool_tx_count())
            })
            .into_module()
    }
}
