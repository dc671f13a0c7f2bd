//! Seele Node
//!
//! The container that wires a node's services together. A [`Node`] owns
//! the registered [`Service`]s, the p2p transport they run over and the two
//! RPC listeners that expose their APIs:
//!
//! - a raw socket carrying newline-delimited JSON-RPC
//! - an HTTP endpoint with host whitelisting and CORS
//!
//! Start brings everything up in registration order and unwinds on the
//! first failure. Stop tears everything down, collecting service failures
//! into a [`StopError`] while always returning the node to idle.

pub mod config;
pub mod error;
pub mod node;
pub mod rpc;
pub mod service;

pub use config::{Config, ConfigError, LogFormat, LoggingConfig};
pub use error::{NodeError, NodeResult, StopError};
pub use node::{Node, NodeBuilder};
pub use rpc::RpcEndpoints;
pub use service::{Service, ServiceError, ServiceId};

pub use seele_p2p::{P2pConfig, Protocol, TransportHandle};
pub use seele_rpc::Api;
