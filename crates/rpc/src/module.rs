//! Method sets exposed under a namespace.

use crate::{RpcError, RpcResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

/// A set of callable methods registered under one namespace.
pub trait RpcModule: Send + Sync {
    /// Names of the methods this module answers.
    fn methods(&self) -> Vec<String>;

    /// Invokes `method` with its single decoded argument.
    fn call(&self, method: &str, params: Value) -> RpcResult<Value>;
}

type Handler<T> = Box<dyn Fn(&T, Value) -> RpcResult<Value> + Send + Sync>;

/// Builds an [`RpcModule`] from typed methods on a shared target.
///
/// ```ignore
/// let module = MethodSet::new(api)
///     .method("getTxPoolTxCount", |api: &DebugApi, _: ()| api.tx_count());
/// ```
pub struct MethodSet<T> {
    target: Arc<T>,
    handlers: BTreeMap<String, Handler<T>>,
}

impl<T: Send + Sync + 'static> MethodSet<T> {
    pub fn new(target: T) -> Self {
        Self::from_arc(Arc::new(target))
    }

    pub fn from_arc(target: Arc<T>) -> Self {
        Self {
            target,
            handlers: BTreeMap::new(),
        }
    }

    /// Adds `name`. The argument is decoded from the call's params, the
    /// result is encoded back to JSON, and an `Err` becomes a call failure
    /// carrying its display text.
    pub fn method<I, O, E, F>(mut self, name: &str, func: F) -> Self
    where
        I: DeserializeOwned,
        O: Serialize,
        E: Display,
        F: Fn(&T, I) -> Result<O, E> + Send + Sync + 'static,
    {
        let method = name.to_string();
        let handler: Handler<T> = Box::new(move |target, params| {
            let input: I = serde_json::from_value(params).map_err(|err| {
                RpcError::invalid_params(format!("{}: {}", method, err))
            })?;
            let output = func(target, input).map_err(|err| RpcError::call(err.to_string()))?;
            Ok(serde_json::to_value(output)?)
        });
        self.handlers.insert(name.to_string(), handler);
        self
    }

    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    pub fn into_module(self) -> Arc<dyn RpcModule> {
        Arc::new(self)
    }
}

impl<T: Send + Sync + 'static> RpcModule for MethodSet<T> {
    fn methods(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    fn call(&self, method: &str, params: Value) -> RpcResult<Value> {
        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| RpcError::method_not_found(method))?;
        handler(&self.target, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Counter {
        value: AtomicU64,
    }

    fn counter_module() -> MethodSet<Counter> {
        MethodSet::new(Counter::default())
            .method("add", |counter: &Counter, by: u64| {
                Ok::<_, String>(counter.value.fetch_add(by, Ordering::SeqCst) + by)
            })
            .method("get", |counter: &Counter, _: ()| {
                Ok::<_, String>(counter.value.load(Ordering::SeqCst))
            })
            .method("fail", |_: &Counter, reason: String| Err::<(), _>(reason))
    }

    #[test]
    fn typed_methods_round_trip_json() {
        let module = counter_module();
        assert_eq!(module.call("add", json!(5)).expect("add"), json!(5));
        assert_eq!(module.call("add", json!(2)).expect("add"), json!(7));
        assert_eq!(module.call("get", Value::Null).expect("get"), json!(7));
    }

    #[test]
    fn bad_input_is_invalid_params() {
        let err = counter_module()
            .call("add", json!("five"))
            .expect_err("string is not a u64");
        assert!(matches!(err, RpcError::InvalidParams { .. }), "{err}");
    }

    #[test]
    fn method_errors_become_call_failures() {
        let err = counter_module()
            .call("fail", json!("out of range"))
            .expect_err("fail always errors");
        assert!(matches!(err, RpcError::Call { ref message } if message == "out of range"));
    }

    #[test]
    fn unknown_method_is_not_found() {
        let err = counter_module().call("nope", Value::Null).expect_err("missing");
        assert!(matches!(err, RpcError::MethodNotFound { .. }));
    }

    #[test]
    fn methods_are_listed_sorted() {
        assert_eq!(counter_module().methods(), vec!["add", "fail", "get"]);
    }
}
