//! Patchbay Core - patch dataflow engine for a modular synthesizer editor
//!
//! This crate holds the data model and evaluation rules of a patch: typed
//! sockets, a closed catalog of node kinds, the patch graph, the connectivity
//! resolver and the recompute engine that produces a flat parameter snapshot.
//!
//! # Core Abstractions
//!
//! ## Sockets and Catalog
//!
//! - [`SocketType`] - Typed signal categories and the compatibility rule
//! - [`NodeKind`] - Closed set of node kinds, each with controls, ports and `resolve`
//!
//! ## Graph
//!
//! - [`PatchGraph`] - Nodes and connections with structural invariants
//! - [`ConnectionPolicy`] - Reject or replace on an occupied input
//!
//! ## Evaluation
//!
//! - [`Resolver`] - Decides whether an input has a live, type-correct path
//! - [`Engine`] - Recomputes a [`Snapshot`] of every [`Param`]
//!
//! # Undefined, not zero
//!
//! A parameter whose path is broken is reported as [`ParamValue::Undefined`].
//! It is never replaced by `0`, so a consumer can tell "no signal" from
//! "signal is zero".
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{Engine, Node, NodeKind, Param, ParamValue, PatchGraph};
//!
//! let mut graph = PatchGraph::new();
//! let attack = graph.add_node(Node::new(NodeKind::Attack))?;
//! let adsr = graph.add_node(Node::new(NodeKind::Adsr))?;
//! let wire = graph.add_connection(attack, "value", adsr, "attack")?;
//!
//! let engine = Engine::new();
//! assert_eq!(engine.recompute(&graph)?.get(Param::Attack), ParamValue::Defined(0.1));
//!
//! graph.remove_connection(wire)?;
//! assert_eq!(engine.recompute(&graph)?.get(Param::Attack), ParamValue::Undefined);
//! # Ok::<(), patchbay_core::PatchError>(())
//! ```
//!
//! # Features
//!
//! - `tracing` - emit `debug`/`trace` events for graph mutations and recomputes

pub mod catalog;
pub mod engine;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod socket;

pub use catalog::{ControlDescriptor, ControlUnit, Direction, InputValue, NodeKind, PortSpec};
pub use engine::{Engine, Param, ParamValue, Snapshot, Tap};
pub use error::{PatchError, Result};
pub use graph::{
    Connection, ConnectionId, ConnectionPolicy, Endpoint, MAX_IDENTITY_GAP, Node, NodeId,
    PatchGraph,
};
pub use resolver::Resolver;
pub use socket::{Socket, SocketType};
