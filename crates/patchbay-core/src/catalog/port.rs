//! Port specifications.

use crate::socket::SocketType;

/// Direction of a port relative to its node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Receives a signal. At most one incoming connection.
    Input,
    /// Emits a signal. Any number of outgoing connections.
    Output,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Static description of one port of a node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortSpec {
    /// Port name, unique within its node kind and direction.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Signal type carried by the port.
    pub socket: SocketType,
    /// Whether this input gates the node's liveness.
    ///
    /// Always `false` for outputs.
    pub required: bool,
}

impl PortSpec {
    /// A required input port.
    pub const fn required(name: &'static str, label: &'static str, socket: SocketType) -> Self {
        Self {
            name,
            label,
            socket,
            required: true,
        }
    }

    /// An optional input port.
    pub const fn optional(name: &'static str, label: &'static str, socket: SocketType) -> Self {
        Self {
            name,
            label,
            socket,
            required: false,
        }
    }

    /// An output port.
    pub const fn output(name: &'static str, label: &'static str, socket: SocketType) -> Self {
        Self::optional(name, label, socket)
    }
}
