//! Seele
//!
//! The full-node service hosted by a [`seele_node::Node`]. It reads the
//! chain and the transaction pool and exposes them over two RPC
//! namespaces:
//!
//! - `seele`: node info and block rewards
//! - `debug`: encoded and pretty-printed blocks, pool content

pub mod api;
pub mod chain;
pub mod error;
pub mod service;
pub mod txpool;
pub mod types;

pub use api::{DebugApi, NodeInfo, PublicSeeleApi};
pub use chain::{ChainReader, MemoryChain};
pub use error::{SeeleError, SeeleResult};
pub use service::SeeleService;
pub use txpool::{MemoryTxPool, TxPoolReader};
pub use types::{Address, Block, BlockHeader, Hash, Transaction};
