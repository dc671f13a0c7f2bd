//! Chain data types.

use crate::SeeleResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

/// SHA-256 digest identifying blocks and transactions.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Hash of the bincode encoding of `value`.
    pub fn of<T: Serialize>(value: &T) -> SeeleResult<Self> {
        let encoded = bincode::serialize(value)?;
        Ok(Self(Sha256::digest(&encoded).into()))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub previous_block_hash: Hash,
    pub creator: Address,
    pub tx_hash: Hash,
    pub difficulty: u64,
    pub height: u64,
    pub create_timestamp: u64,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub from: Address,
    pub to: Address,
    pub amount: u64,
    pub account_nonce: u64,
    pub fee: u64,
    pub payload: Vec<u8>,
}

/// Fields a transaction hash commits to.
#[derive(Serialize)]
struct TransactionData<'a> {
    from: &'a Address,
    to: &'a Address,
    amount: u64,
    account_nonce: u64,
    fee: u64,
    payload: &'a [u8],
}

impl Transaction {
    pub fn new(
        from: Address,
        to: Address,
        amount: u64,
        account_nonce: u64,
        fee: u64,
        payload: Vec<u8>,
    ) -> SeeleResult<Self> {
        let hash = Hash::of(&TransactionData {
            from: &from,
            to: &to,
            amount,
            account_nonce,
            fee,
            payload: &payload,
        })?;
        Ok(Self {
            hash,
            from,
            to,
            amount,
            account_nonce,
            fee,
            payload,
        })
    }

    /// JSON shape used by the RPC namespaces.
    pub fn to_rpc(&self) -> serde_json::Value {
        serde_json::json!({
            "hash": self.hash.to_hex(),
            "from": self.from.to_hex(),
            "to": self.to.to_hex(),
            "amount": self.amount,
            "accountNonce": self.account_nonce,
            "fee": self.fee,
            "payload": format!("0x{}", hex::encode(&self.payload)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash,
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Seals `header` over `transactions`, filling in the transaction root
    /// and the block hash.
    pub fn new(mut header: BlockHeader, transactions: Vec<Transaction>) -> SeeleResult<Self> {
        let tx_hashes: Vec<Hash> = transactions.iter().map(|tx| tx.hash).collect();
        header.tx_hash = Hash::of(&tx_hashes)?;
        let hash = Hash::of(&header)?;
        Ok(Self {
            hash,
            header,
            transactions,
        })
    }

    pub fn genesis() -> SeeleResult<Self> {
        Self::new(
            BlockHeader {
                previous_block_hash: Hash::default(),
                creator: Address::default(),
                tx_hash: Hash::default(),
                difficulty: 1,
                height: 0,
                create_timestamp: 0,
                nonce: 0,
            },
            Vec::new(),
        )
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// Header for the block that would follow this one.
    pub fn child_header(&self, creator: Address, create_timestamp: u64) -> BlockHeader {
        BlockHeader {
            previous_block_hash: self.hash,
            creator,
            tx_hash: Hash::default(),
            difficulty: self.header.difficulty,
            height: self.header.height + 1,
            create_timestamp,
            nonce: 0,
        }
    }
}
