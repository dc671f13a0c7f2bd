//! Namespace registry and request dispatch.

use crate::types::{single_param, Request, Response};
use crate::{RpcError, RpcModule, RpcResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Separator between namespace and method in a call name.
pub const METHOD_SEPARATOR: char = '.';

/// Maps namespaces to the modules that answer them.
#[derive(Default)]
pub struct RpcServer {
    modules: HashMap<String, Arc<dyn RpcModule>>,
}

impl RpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under `namespace`. Each namespace can be
    /// registered once.
    pub fn register_name(&mut self, namespace: &str, module: Arc<dyn RpcModule>) -> RpcResult<()> {
        if namespace.trim().is_empty() {
            return Err(RpcError::EmptyNamespace);
        }
        if self.modules.contains_key(namespace) {
            return Err(RpcError::DuplicateNamespace(namespace.to_string()));
        }
        if module.methods().is_empty() {
            return Err(RpcError::NoMethods(namespace.to_string()));
        }

        self.modules.insert(namespace.to_string(), module);
        Ok(())
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatches `namespace.method` with the call's single argument.
    pub fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let (namespace, name) = method
            .split_once(METHOD_SEPARATOR)
            .ok_or_else(|| RpcError::invalid_request(format!("method {} has no namespace", method)))?;
        let module = self
            .modules
            .get(namespace)
            .ok_or_else(|| RpcError::method_not_found(method))?;

        module.call(name, params).map_err(|err| match err {
            RpcError::MethodNotFound { .. } => RpcError::method_not_found(method),
            other => other,
        })
    }

    /// Handles a decoded request.
    pub fn handle(&self, request: Request) -> Response {
        if let Some(version) = request.jsonrpc.as_deref() {
            if version != crate::types::JSONRPC_VERSION {
                let err = RpcError::invalid_request(format!("unsupported jsonrpc version {}", version));
                return Response::failure(request.id, &err);
            }
        }

        debug!(target: "seele::rpc", method = %request.method, "dispatching rpc call");
        match self.call(&request.method, single_param(request.params)) {
            Ok(result) => Response::success(request.id, result),
            Err(err) => {
                debug!(target: "seele::rpc", method = %request.method, error = %err, "rpc call failed");
                Response::failure(request.id, &err)
            }
        }
    }

    /// Decodes a single request or a batch from `body` and encodes the reply.
    ///
    /// Notifications (requests without an `id`) are executed but not
    /// answered, so `None` is returned when nothing needs to be written back.
    pub fn handle_text(&self, body: &str) -> Option<String> {
        let reply = match serde_json::from_str::<Value>(body) {
            Ok(Value::Array(batch)) if batch.is_empty() => {
                to_json(&Response::failure(Value::Null, &RpcError::invalid_request("empty batch")))
            }
            Ok(Value::Array(batch)) => {
                let responses: Vec<Response> =
                    batch.into_iter().filter_map(|item| self.handle_value(item)).collect();
                if responses.is_empty() {
                    return None;
                }
                serde_json::to_value(responses).unwrap_or(Value::Null)
            }
            Ok(value) => to_json(&self.handle_value(value)?),
            Err(err) => parse_failure(err.to_string()),
        };
        Some(reply.to_string())
    }

    /// Like [`handle_text`](Self::handle_text) for raw bytes. A body that is
    /// not UTF-8 is a parse error.
    pub fn handle_bytes(&self, body: &[u8]) -> Option<String> {
        match std::str::from_utf8(body) {
            Ok(text) => self.handle_text(text),
            Err(err) => Some(parse_failure(err.to_string()).to_string()),
        }
    }

    fn handle_value(&self, value: Value) -> Option<Response> {
        let id = value.get("id").cloned();
        match serde_json::from_value::<Request>(value) {
            Ok(request) => {
                let response = self.handle(request);
                id.map(|_| response)
            }
            Err(err) => Some(Response::failure(
                id.unwrap_or(Value::Null),
                &RpcError::invalid_request(err.to_string()),
            )),
        }
    }
}

fn parse_failure(message: String) -> Value {
    to_json(&Response::failure(Value::Null, &RpcError::Parse { message }))
}

fn to_json(response: &Response) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}
