//! Error types for patch editing and recomputation.

use thiserror::Error;

use crate::catalog::{Direction, NodeKind};
use crate::graph::{ConnectionId, NodeId};
use crate::socket::SocketType;

/// Errors returned by [`PatchGraph`](crate::PatchGraph) mutations and by
/// [`Engine::recompute()`](crate::Engine::recompute).
///
/// Structural errors leave the graph unchanged. An unsatisfied input is not an
/// error; it shows up as [`ParamValue::Undefined`](crate::ParamValue::Undefined)
/// in the snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    /// A node with this identity already exists.
    #[error("node {0} already exists")]
    DuplicateIdentity(NodeId),

    /// The identity is too far past the next fresh identity, or no fresh
    /// identity would remain after it.
    #[error("node identity {0} is out of range")]
    IdentityOutOfRange(NodeId),

    /// The node does not exist.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The connection does not exist.
    #[error("connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    /// The node kind has no port with this name in this direction.
    #[error("{kind} node {node} has no {direction} port '{port}'")]
    PortNotFound {
        /// Node that was addressed.
        node: NodeId,
        /// Kind of that node.
        kind: NodeKind,
        /// Requested direction.
        direction: Direction,
        /// Requested port name.
        port: String,
    },

    /// The node kind has no control with this name.
    #[error("{kind} has no control '{control}'")]
    ControlNotFound {
        /// Kind of the addressed node.
        kind: NodeKind,
        /// Requested control name.
        control: String,
    },

    /// The output socket cannot feed the input socket.
    #[error("cannot connect {from} output to {to} input")]
    TypeMismatch {
        /// Socket type of the source port.
        from: SocketType,
        /// Socket type of the target port.
        to: SocketType,
    },

    /// The target input already has an incoming connection.
    #[error("input '{port}' of node {node} is already connected by {existing}")]
    PortOccupied {
        /// Target node.
        node: NodeId,
        /// Target input port.
        port: String,
        /// The connection currently occupying the port.
        existing: ConnectionId,
    },

    /// A cycle was found through the given node.
    #[error("cyclic dependency through node {0}")]
    CyclicDependency(NodeId),

    /// Control values must be finite.
    #[error("invalid value {value} for control '{control}'")]
    InvalidControlValue {
        /// Control name.
        control: String,
        /// Rejected value.
        value: f32,
    },
}

impl PatchError {
    /// Returns true for the "reference not found" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PatchError::NodeNotFound(_)
                | PatchError::ConnectionNotFound(_)
                | PatchError::PortNotFound { .. }
                | PatchError::ControlNotFound { .. }
        )
    }
}

/// Convenience result type for patch operations.
pub type Result<T> = core::result::Result<T, PatchError>;
