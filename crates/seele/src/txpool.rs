//! Read access to pending transactions.

use crate::{Address, Hash, SeeleError, SeeleResult, Transaction};
use parking_lot::RwLock;
use std::collections::BTreeMap;

pub trait TxPoolReader: Send + Sync {
    /// Transactions ready for inclusion, grouped by sender in nonce order.
    fn processable_transactions(&self) -> BTreeMap<Address, Vec<Transaction>>;

    fn processable_count(&self) -> usize;
}

#[derive(Default)]
pub struct MemoryTxPool {
    by_sender: RwLock<BTreeMap<Address, Vec<Transaction>>>,
}

impl MemoryTxPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, tx: Transaction) -> SeeleResult<()> {
        let mut by_sender = self.by_sender.write();
        if by_sender.values().flatten().any(|pending| pending.hash == tx.hash) {
            return Err(SeeleError::DuplicateTransaction(tx.hash.to_hex()));
        }
        let queue = by_sender.entry(tx.from).or_default();
        let at = queue.partition_point(|pending| pending.account_nonce <= tx.account_nonce);
        queue.insert(at, tx);
        Ok(())
    }

    /// Removes the transaction with `hash`, returning it if it was pooled.
    pub fn remove(&self, hash: &Hash) -> Option<Transaction> {
        let mut by_sender = self.by_sender.write();
        let sender = by_sender
            .iter()
            .find(|(_, txs)| txs.iter().any(|tx| tx.hash == *hash))
            .map(|(sender, _)| *sender)?;
        let queue = by_sender.get_mut(&sender)?;
        let index = queue.iter().position(|tx| tx.hash == *hash)?;
        let removed = queue.remove(index);
        if queue.is_empty() {
            by_sender.remove(&sender);
        }
        Some(removed)
    }
}

impl TxPoolReader for MemoryTxPool {
    fn processable_transactions(&self) -> BTreeMap<Address, Vec<Transaction>> {
        self.by_sender.read().clone()
    }

    fn processable_count(&self) -> usize {
        self.by_sender.read().values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(from: u8, nonce: u64) -> Transaction {
        Transaction::new(Address([from; 20]), Address([0xff; 20]), 1, nonce, 1, vec![]).expect("tx")
    }

    #[test]
    fn groups_by_sender_in_nonce_order() {
        let pool = MemoryTxPool::new();
        pool.add(tx(1, 2)).expect("add");
        pool.add(tx(1, 0)).expect("add");
        pool.add(tx(2, 0)).expect("add");

        let content = pool.processable_transactions();
        let nonces: Vec<u64> = content[&Address([1; 20])].iter().map(|t| t.account_nonce).collect();
        assert_eq!(nonces, vec![0, 2]);
        assert_eq!(pool.processable_count(), 3);
    }

    #[test]
    fn duplicates_are_rejected_and_removal_prunes_senders() {
        let pool = MemoryTxPool::new();
        let first = tx(1, 0);
        pool.add(first.clone()).expect("add");
        assert!(matches!(pool.add(first.clone()), Err(SeeleError::DuplicateTransaction(_))));

        assert_eq!(pool.remove(&first.hash), Some(first.clone()));
        assert!(pool.remove(&first.hash).is_none());
        assert!(pool.processable_transactions().is_empty());
    }
}
