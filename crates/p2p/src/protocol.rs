use serde::{Deserialize, Serialize};
use std::fmt;

/// A named sub-protocol the transport multiplexes over peer connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol name, e.g. `seele`.
    pub name: String,
    /// Protocol version.
    pub version: u32,
    /// Number of message codes the protocol uses.
    pub length: u16,
}

impl Protocol {
    pub fn new(name: impl Into<String>, version: u32, length: u16) -> Self {
        Self {
            name: name.into(),
            version,
            length,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}
