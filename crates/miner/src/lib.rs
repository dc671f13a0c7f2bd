//! Seele Miner
//!
//! Proof-of-work support. Only the block reward schedule lives here; block
//! sealing is driven by the consensus engine.

pub mod pow;

pub use pow::reward;
