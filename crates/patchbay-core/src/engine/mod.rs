//! Dataflow recompute engine.
//!
//! [`Engine::recompute()`] turns a [`PatchGraph`](crate::PatchGraph) into a
//! [`Snapshot`]: one [`ParamValue`] per well-known [`Param`].
//!
//! Each parameter has a [`Tap`] naming where it is read from. Input taps read
//! the value delivered on an input port and are defined iff that input is
//! satisfied. Control taps read a control of a node and are defined iff that
//! node is live. Upstream nodes are evaluated post-order, so every `resolve`
//! runs after the nodes it depends on.

mod param;
mod recompute;
mod snapshot;

pub use param::{Param, Tap};
pub use recompute::Engine;
pub use snapshot::{ParamValue, Snapshot};
