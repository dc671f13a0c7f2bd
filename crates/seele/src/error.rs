use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeeleError {
    #[error("block not found at height {0}")]
    BlockNotFound(u64),

    /// Only `-1` (the chain head) is a valid negative height.
    #[error("invalid block height {0}")]
    InvalidHeight(i64),

    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block {height} does not extend the chain head: {reason}")]
    InvalidBlock { height: u64, reason: String },

    #[error("transaction {0} already in pool")]
    DuplicateTransaction(String),

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),
}

pub type SeeleResult<T> = std::result::Result<T, SeeleError>;
