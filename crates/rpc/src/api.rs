use crate::RpcModule;
use std::fmt;
use std::sync::Arc;

/// RPC surface contributed by a service: one namespace and its method set.
#[derive(Clone)]
pub struct Api {
    pub namespace: String,
    pub service: Arc<dyn RpcModule>,
}

impl Api {
    pub fn new(namespace: impl Into<String>, service: Arc<dyn RpcModule>) -> Self {
        Self {
            namespace: namespace.into(),
            service,
        }
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("namespace", &self.namespace)
            .field("methods", &self.service.methods())
            .finish()
    }
}
