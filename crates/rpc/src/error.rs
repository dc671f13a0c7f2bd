//! Error types for RPC operations.

use thiserror::Error;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const CALL_FAILED: i32 = -32000;

/// Errors that can occur while registering or dispatching RPC methods.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Request body was not valid JSON.
    #[error("Parse error: {message}")]
    Parse {
        /// Error message.
        message: String,
    },

    /// Request was valid JSON but not a valid call.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Method not found.
    #[error("Method not found: {method}")]
    MethodNotFound {
        /// Method name.
        method: String,
    },

    /// Invalid parameters.
    #[error("Invalid parameters: {message}")]
    InvalidParams {
        /// Error message.
        message: String,
    },

    /// The method ran and returned an error.
    #[error("{message}")]
    Call {
        /// Error message produced by the method.
        message: String,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Namespace registered with an empty name.
    #[error("rpc: namespace must not be empty")]
    EmptyNamespace,

    /// Namespace registered twice on the same server.
    #[error("rpc: namespace already defined: {0}")]
    DuplicateNamespace(String),

    /// Module without callable methods.
    #[error("rpc: namespace {0} has no methods")]
    NoMethods(String),

    /// Listener could not be bound.
    #[error("failed to bind rpc listener on {addr}: {source}")]
    Bind {
        /// Configured listen address.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpcError {
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn method_not_found<S: Into<String>>(method: S) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    pub fn invalid_params<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    pub fn call<S: Into<String>>(message: S) -> Self {
        Self::Call {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// JSON-RPC error code reported to callers.
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse { .. } => PARSE_ERROR,
            Self::InvalidRequest { .. } => INVALID_REQUEST,
            Self::MethodNotFound { .. } => METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::Call { .. } => CALL_FAILED,
            Self::Serialization(_) => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        }
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = std::result::Result<T, RpcError>;
