//! Host-side compositor supervisor: spawns the rendering helper child
//! process, multiplexes concurrent request/response exchanges over its
//! stdio, and propagates lifecycle events to every in-flight caller.
//!
//! [`bootstrap::bootstrap`] is the crate's entry point; everything else is
//! composed underneath the [`gateway::CommandGateway`] it returns.

pub mod bootstrap;
pub mod dispatch;
pub mod gateway;
pub mod lifecycle;
pub mod nonce;
pub mod registry;

pub use bootstrap::{bootstrap, bootstrap_with_nonce_source};
pub use gateway::CommandGateway;
pub use nonce::{NonceSource, UuidNonceSource};
