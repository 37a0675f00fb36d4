//! The patch graph: nodes, typed connections, and structural invariants.
//!
//! [`PatchGraph`] is the only mutable structure in the core. It enforces:
//!
//! - connections run from an output port to an input port of a different node
//! - the output socket can feed the input socket
//! - an input port has at most one incoming connection
//! - the graph stays acyclic
//!
//! Node and connection identities are sequential and never reused.

mod connection;
mod node;
mod patch;

pub use connection::{Connection, ConnectionId, Endpoint};
pub use node::{Node, NodeId};
pub use patch::{ConnectionPolicy, MAX_IDENTITY_GAP, PatchGraph};
