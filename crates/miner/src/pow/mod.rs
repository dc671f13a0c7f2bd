//! Proof-of-work economics.

mod reward;

pub use reward::{reward, BLOCK_NUMBER_PER_ERA, FAN_PER_SEELE, REWARD_TABLE, TAIL_REWARD};
