//! Node palette and factory for patchbay patches.
//!
//! This crate provides a centralized registry for discovering and creating
//! patch nodes. It is what an editor's "add node" menu is built from: every
//! node kind with a display name, description and category, plus a factory
//! that applies per-session default overrides.
//!
//! # Features
//!
//! - **Node Discovery**: List all node kinds with metadata
//! - **Factory Pattern**: Create nodes by id at runtime
//! - **Category System**: Nodes organized by role (envelope, source, modifier, ...)
//! - **Default Overrides**: Replace catalog defaults per control
//!
//! # Example
//!
//! ```rust
//! use patchbay_registry::{NodeCategory, NodeRegistry};
//!
//! let mut registry = NodeRegistry::new();
//!
//! // List all nodes
//! for node in registry.all_nodes() {
//!     println!("{}: {}", node.name, node.description);
//! }
//!
//! // Override a default, then create a node by id
//! registry.set_default("attack", "value", 0.05).unwrap();
//! let attack = registry.create("attack").unwrap();
//! assert_eq!(attack.control("value"), Some(0.05));
//!
//! // Filter by category
//! for node in registry.nodes_in_category(NodeCategory::Envelope) {
//!     println!("Envelope node: {}", node.name);
//! }
//! ```

use std::collections::BTreeMap;

use patchbay_core::{Node, NodeKind, PatchError};
use thiserror::Error;

/// Errors from registry lookups that modify state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No node kind has this id or name.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// The kind exists but rejected the control or value.
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Category of node for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Envelope stages and the envelope generator
    Envelope,
    /// Signal sources (oscillator, noise)
    Source,
    /// Signal modifiers (amplifier)
    Modifier,
    /// Performance controls (keyboard)
    Control,
    /// Final summing stage
    Output,
}

impl NodeCategory {
    /// Every category, in menu order.
    pub const ALL: [NodeCategory; 5] = [
        NodeCategory::Envelope,
        NodeCategory::Source,
        NodeCategory::Modifier,
        NodeCategory::Control,
        NodeCategory::Output,
    ];

    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            NodeCategory::Envelope => "Envelope",
            NodeCategory::Source => "Source",
            NodeCategory::Modifier => "Modifier",
            NodeCategory::Control => "Control",
            NodeCategory::Output => "Output",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            NodeCategory::Envelope => "Attack, decay, sustain and release stages and the ADSR",
            NodeCategory::Source => "Oscillators and noise generators",
            NodeCategory::Modifier => "Amplifiers shaped by a modulation input",
            NodeCategory::Control => "Keyboards and other performance controls",
            NodeCategory::Output => "Mixers that sum signals for the backend",
        }
    }
}

/// Describes a node kind in the registry.
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    /// Unique identifier (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the node.
    pub description: &'static str,
    /// Category for organization.
    pub category: NodeCategory,
    /// The catalog kind this descriptor creates.
    pub kind: NodeKind,
}

impl NodeDescriptor {
    /// Number of controls on this kind.
    pub fn control_count(&self) -> usize {
        self.kind.controls().len()
    }
}

/// Registry of every node kind a patch can contain.
///
/// All built-in kinds are registered on construction. Per-control default
/// overrides apply to nodes created through [`create()`](Self::create).
pub struct NodeRegistry {
    entries: Vec<NodeDescriptor>,
    defaults: BTreeMap<(NodeKind, usize), f32>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    /// Create a new registry with all built-in nodes registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(NodeKind::ALL.len()),
            defaults: BTreeMap::new(),
        };
        registry.register_builtin_nodes();
        registry
    }

    fn register_builtin_nodes(&mut self) {
        // Envelope
        self.register(
            NodeKind::Attack,
            "Time for the envelope to rise to its peak",
            NodeCategory::Envelope,
        );
        self.register(
            NodeKind::Decay,
            "Time for the envelope to fall from peak to sustain",
            NodeCategory::Envelope,
        );
        self.register(
            NodeKind::Sustain,
            "Level held while the note is on",
            NodeCategory::Envelope,
        );
        self.register(
            NodeKind::Release,
            "Time for the envelope to fall to zero after note-off",
            NodeCategory::Envelope,
        );
        self.register(
            NodeKind::Adsr,
            "Envelope generator fed by the four stage nodes",
            NodeCategory::Envelope,
        );

        // Sources
        self.register(
            NodeKind::Vco,
            "Voltage-controlled oscillator with tuning and modulation depth",
            NodeCategory::Source,
        );
        self.register(
            NodeKind::Noise,
            "White noise generator",
            NodeCategory::Source,
        );

        // Modifiers
        self.register(
            NodeKind::Vca,
            "Voltage-controlled amplifier driven by an envelope",
            NodeCategory::Modifier,
        );

        // Controls
        self.register(
            NodeKind::MonophonicKeyboard,
            "Single-voice keyboard emitting a MIDI note and its duration",
            NodeCategory::Control,
        );

        // Output
        self.register(
            NodeKind::Mixer,
            "Three-input mixer: two oscillators and a noise channel",
            NodeCategory::Output,
        );
    }

    fn register(&mut self, kind: NodeKind, description: &'static str, category: NodeCategory) {
        self.entries.push(NodeDescriptor {
            id: kind.id(),
            name: kind.name(),
            description,
            category,
            kind,
        });
    }

    /// Returns descriptors for all registered nodes.
    pub fn all_nodes(&self) -> Vec<&NodeDescriptor> {
        self.entries.iter().collect()
    }

    /// Returns descriptors for nodes in a specific category.
    pub fn nodes_in_category(&self, category: NodeCategory) -> Vec<&NodeDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Get a descriptor by id or display name, ignoring ASCII case.
    pub fn get(&self, id: &str) -> Option<&NodeDescriptor> {
        self.entries
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(id) || e.name.eq_ignore_ascii_case(id))
    }

    /// Get the descriptor for a kind.
    pub fn descriptor(&self, kind: NodeKind) -> Option<&NodeDescriptor> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Create a node by id, with overridden defaults applied.
    ///
    /// Returns `None` if the id is not found.
    pub fn create(&self, id: &str) -> Option<Node> {
        self.get(id).map(|d| self.create_kind(d.kind))
    }

    /// Create a node of the given kind, with overridden defaults applied.
    pub fn create_kind(&self, kind: NodeKind) -> Node {
        let mut node = Node::new(kind);
        for ((_, index), value) in self.defaults.range((kind, 0)..=(kind, usize::MAX)) {
            if let Some(descriptor) = kind.controls().get(*index) {
                // Overrides were clamped and checked on the way in.
                let _ = node.set_control(descriptor.name, *value);
            }
        }
        node
    }

    /// Override the default value of a control for nodes created later.
    ///
    /// The value is clamped into the control's range; the stored value is
    /// returned. Fails for unknown ids, unknown controls and non-finite values.
    pub fn set_default(
        &mut self,
        id: &str,
        control: &str,
        value: f32,
    ) -> Result<f32, RegistryError> {
        let kind = self
            .get(id)
            .map(|d| d.kind)
            .ok_or_else(|| RegistryError::UnknownNode(id.to_string()))?;
        let index = self.control_index_by_name(kind.id(), control).ok_or_else(|| {
            PatchError::ControlNotFound {
                kind,
                control: control.to_string(),
            }
        })?;
        let descriptor = &kind.controls()[index];
        if !value.is_finite() {
            return Err(PatchError::InvalidControlValue {
                control: descriptor.name.to_string(),
                value,
            }
            .into());
        }
        let clamped = descriptor.clamp(value);
        self.defaults.insert((kind, index), clamped);
        Ok(clamped)
    }

    /// Returns the default a newly created node would get for a control.
    pub fn default_value(&self, kind: NodeKind, control: &str) -> Option<f32> {
        let (index, descriptor) = kind.control(control)?;
        Some(
            self.defaults
                .get(&(kind, index))
                .copied()
                .unwrap_or(descriptor.default),
        )
    }

    /// Removes every default override.
    pub fn clear_defaults(&mut self) {
        self.defaults.clear();
    }

    /// Find a control index by name or label for a given node id.
    ///
    /// Matching ignores ASCII case. Returns `None` if the node id or control
    /// is not found.
    pub fn control_index_by_name(&self, node_id: &str, control: &str) -> Option<usize> {
        let kind = self.get(node_id)?.kind;
        kind.controls().iter().position(|c| {
            c.name.eq_ignore_ascii_case(control) || c.label.eq_ignore_ascii_case(control)
        })
    }

    /// Returns the number of registered nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
