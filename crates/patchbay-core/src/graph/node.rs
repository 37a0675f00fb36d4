//! Node identity and per-node state.

use core::fmt;

use super::connection::ConnectionId;
use crate::catalog::NodeKind;
use crate::error::{PatchError, Result};

/// Unique identifier for a node in a [`PatchGraph`](super::PatchGraph).
///
/// Identities are assigned sequentially and never reused within a graph
/// instance, so a stale id can never alias a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Creates an identifier from its raw value.
    ///
    /// Used by boundary layers that carry their own identities into
    /// [`PatchGraph::insert_node()`](super::PatchGraph::insert_node).
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A synthesizer building block: a kind plus its control values.
///
/// Controls are indexed like [`NodeKind::controls()`] and always hold finite
/// values inside each descriptor's range.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    controls: Vec<f32>,
}

impl Node {
    /// Creates a node of the given kind with default control values.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            controls: kind.default_controls(),
        }
    }

    /// Builder form of [`set_control()`](Self::set_control).
    pub fn with_control(mut self, name: &str, value: f32) -> Result<Self> {
        self.set_control(name, value)?;
        Ok(self)
    }

    /// Returns the node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns all control values, in descriptor order.
    pub fn controls(&self) -> &[f32] {
        &self.controls
    }

    /// Returns a control value by name.
    pub fn control(&self, name: &str) -> Option<f32> {
        let (index, _) = self.kind.control(name)?;
        self.controls.get(index).copied()
    }

    /// Sets a control value, clamped into the descriptor's range.
    ///
    /// Returns the value actually stored. Non-finite values are rejected.
    pub fn set_control(&mut self, name: &str, value: f32) -> Result<f32> {
        let (index, descriptor) =
            self.kind
                .control(name)
                .ok_or_else(|| PatchError::ControlNotFound {
                    kind: self.kind,
                    control: name.to_string(),
                })?;
        if !value.is_finite() {
            return Err(PatchError::InvalidControlValue {
                control: name.to_string(),
                value,
            });
        }
        let clamped = descriptor.clamp(value);
        self.controls[index] = clamped;
        Ok(clamped)
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self::new(kind)
    }
}

/// Internal bookkeeping for a node in the graph.
pub(crate) struct NodeData {
    pub node: Node,
    /// Connections arriving at this node, in insertion order.
    pub incoming: Vec<ConnectionId>,
    /// Connections leaving this node, in insertion order.
    pub outgoing: Vec<ConnectionId>,
}

impl NodeData {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_uses_catalog_defaults() {
        let node = Node::new(NodeKind::Mixer);
        assert_eq!(node.controls(), &[1.0, 1.0, 0.25]);
        assert_eq!(node.control("level3"), Some(0.25));
        assert_eq!(node.control("gain"), None);
    }

    #[test]
    fn set_control_clamps() {
        let mut node = Node::new(NodeKind::Sustain);
        assert_eq!(node.set_control("value", 1.5).unwrap(), 1.0);
        assert_eq!(node.control("value"), Some(1.0));
    }

    #[test]
    fn set_control_rejects_nan_and_unknown() {
        let mut node = Node::new(NodeKind::Attack);
        assert!(matches!(
            node.set_control("value", f32::NAN),
            Err(PatchError::InvalidControlValue { .. })
        ));
        assert!(matches!(
            node.set_control("gain", 0.5),
            Err(PatchError::ControlNotFound { .. })
        ));
        assert_eq!(node.control("value"), Some(0.1));
    }

    #[test]
    fn builder_form() {
        let node = Node::new(NodeKind::MonophonicKeyboard)
            .with_control("midi_f0", 60.0)
            .unwrap();
        assert_eq!(node.controls(), &[60.0, 1.0]);
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::new(7).to_string(), "#7");
        assert_eq!(NodeId::new(7).index(), 7);
    }
}
