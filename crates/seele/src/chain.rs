//! Read access to the canonical chain.

use crate::{Block, SeeleError, SeeleResult};
use parking_lot::RwLock;
use std::sync::Arc;

pub trait ChainReader: Send + Sync {
    fn head_block(&self) -> Option<Arc<Block>>;

    fn block_by_height(&self, height: u64) -> Option<Arc<Block>>;
}

/// Chain held in memory, indexed by height.
pub struct MemoryChain {
    blocks: RwLock<Vec<Arc<Block>>>,
}

impl MemoryChain {
    pub fn with_genesis(genesis: Block) -> Self {
        Self {
            blocks: RwLock::new(vec![Arc::new(genesis)]),
        }
    }

    /// Appends `block` on top of the current head.
    pub fn push(&self, block: Block) -> SeeleResult<()> {
        let mut blocks = self.blocks.write();
        if let Some(head) = blocks.last() {
            if block.height() != head.height() + 1 {
                return Err(SeeleError::InvalidBlock {
                    height: block.height(),
                    reason: format!("expected height {}", head.height() + 1),
                });
            }
            if block.header.previous_block_hash != head.hash {
                return Err(SeeleError::InvalidBlock {
                    height: block.height(),
                    reason: format!("parent {} is not the head", block.header.previous_block_hash),
                });
            }
        }
        blocks.push(Arc::new(block));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl ChainReader for MemoryChain {
    fn head_block(&self) -> Option<Arc<Block>> {
        self.blocks.read().last().cloned()
    }

    fn block_by_height(&self, height: u64) -> Option<Arc<Block>> {
        let index = usize::try_from(height).ok()?;
        self.blocks.read().get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Address;

    #[test]
    fn push_extends_the_head() {
        let genesis = Block::genesis().expect("genesis");
        let chain = MemoryChain::with_genesis(genesis.clone());
        let child = Block::new(genesis.child_header(Address::default(), 1), vec![]).expect("child");
        chain.push(child.clone()).expect("push");

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.head_block().map(|b| b.hash), Some(child.hash));
        assert_eq!(chain.block_by_height(0).map(|b| b.hash), Some(genesis.hash));
        assert!(chain.block_by_height(2).is_none());
    }

    #[test]
    fn push_rejects_blocks_off_the_head() {
        let genesis = Block::genesis().expect("genesis");
        let chain = MemoryChain::with_genesis(genesis.clone());

        let mut skip = genesis.child_header(Address::default(), 1);
        skip.height = 5;
        let err = chain.push(Block::new(skip, vec![]).expect("block")).expect_err("gap");
        assert!(matches!(err, SeeleError::InvalidBlock { height: 5, .. }));

        let mut orphan = genesis.child_header(Address::default(), 1);
        orphan.previous_block_hash = crate::Hash([7; 32]);
        let err = chain.push(Block::new(orphan, vec![]).expect("block")).expect_err("orphan");
        assert!(matches!(err, SeeleError::InvalidBlock { height: 1, .. }));
        assert_eq!(chain.len(), 1);
    }
}
