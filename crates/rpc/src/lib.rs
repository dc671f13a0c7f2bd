//! Seele RPC
//!
//! Dispatch of `namespace.method(params)` calls to the method sets that node
//! services contribute. The same [`RpcServer`] registry backs two transports:
//!
//! - [`serve_codec`]: newline-delimited JSON-RPC over a raw stream
//! - [`HttpServer`]: JSON-RPC over HTTP with host whitelisting and CORS

pub mod api;
pub mod codec;
pub mod error;
pub mod http;
pub mod module;
pub mod server;
pub mod types;

pub use api::Api;
pub use codec::serve_codec;
pub use error::{RpcError, RpcResult};
pub use http::HttpServer;
pub use module::{MethodSet, RpcModule};
pub use server::RpcServer;
pub use types::{ErrorObject, Request, Response};
