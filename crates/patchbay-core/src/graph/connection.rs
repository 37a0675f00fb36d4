//! Directed connections between node ports.

use core::fmt;

use super::node::NodeId;

/// Unique identifier for a connection in a [`PatchGraph`](super::PatchGraph).
///
/// Assigned sequentially and never reused, so a larger id always means a more
/// recently added connection. The recompute engine relies on this ordering for
/// its tie-break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub(crate) u32);

impl ConnectionId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection {}", self.0)
    }
}

/// One end of a connection: a node and one of its ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Node owning the port.
    pub node: NodeId,
    /// Port name, as declared by the node kind.
    pub port: &'static str,
    /// Port index within the kind's inputs or outputs.
    pub index: usize,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// A directed edge from an output port to an input port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Output side.
    pub source: Endpoint,
    /// Input side.
    pub target: Endpoint,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}
