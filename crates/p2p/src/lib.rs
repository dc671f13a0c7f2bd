//! Seele P2P
//!
//! The networking layer a node runs its sub-protocols over. The node only
//! depends on the [`Transport`] contract; [`Server`] is the TCP
//! implementation used by default.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use config::P2pConfig;
pub use error::{P2pError, P2pResult};
pub use protocol::Protocol;
pub use server::{Server, ServerFactory};
pub use transport::{Transport, TransportFactory, TransportHandle};
