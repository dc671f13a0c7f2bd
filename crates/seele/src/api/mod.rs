//! RPC namespaces served by the seele service.

mod debug;
mod public;

pub use debug::DebugApi;
pub use public::{NodeInfo, PublicSeeleApi};
