//! A patch being edited, with coalesced recompute and dispatch.
//!
//! Every mutation made through [`PatchSession`] posts a [`GraphEvent`] to a
//! crossbeam channel. Nothing is recomputed until
//! [`process_pending()`](PatchSession::process_pending) drains that channel;
//! however many events arrived, it runs at most one recompute on the latest
//! graph state and dispatches at most one snapshot.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use patchbay_config::SessionConfig;
use patchbay_core::{
    Connection, ConnectionId, ConnectionPolicy, Engine, Node, NodeId, NodeKind, PatchError,
    PatchGraph, Snapshot,
};
use patchbay_registry::{NodeRegistry, RegistryError};

use crate::dispatcher::{Completion, DispatchStats, Dispatcher};
use crate::error::SyncError;
use crate::sink::ParameterSink;
use crate::update::SnapshotVersion;

/// A change notification.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    /// A node was added.
    NodeAdded(NodeId),
    /// A node and its connections were removed.
    NodeRemoved(NodeId),
    /// A connection was added (possibly replacing another).
    ConnectionAdded(ConnectionId),
    /// A connection was removed.
    ConnectionRemoved(ConnectionId),
    /// A control value was edited.
    ControlChanged {
        /// Edited node.
        node: NodeId,
        /// Control name.
        control: String,
    },
    /// Posted from outside the session.
    Changed,
}

/// Cloneable handle for posting change notifications from elsewhere.
#[derive(Clone, Debug)]
pub struct GraphEventSender {
    tx: Sender<GraphEvent>,
}

impl GraphEventSender {
    /// Requests a recompute on the next
    /// [`process_pending()`](PatchSession::process_pending).
    pub fn on_graph_changed(&self) {
        self.send(GraphEvent::Changed);
    }

    /// Posts an event. Events sent after the session is gone are ignored.
    pub fn send(&self, event: GraphEvent) {
        let _ = self.tx.send(event);
    }
}

/// What [`PatchSession::process_pending()`] did.
#[derive(Debug, PartialEq)]
pub enum Processed {
    /// No events and no unsynced edits.
    Idle,
    /// One recompute ran and its snapshot was dispatched.
    Dispatched {
        /// Version of the dispatched snapshot.
        version: SnapshotVersion,
        /// Graph generation it reflects.
        generation: u64,
        /// Events folded into this pass.
        events: usize,
    },
    /// The recompute failed; the previous snapshot stays in effect and
    /// nothing was dispatched.
    Aborted {
        /// Why the pass failed.
        error: PatchError,
        /// Events folded into this pass.
        events: usize,
    },
}

/// A patch graph plus everything needed to keep a backend in sync with it.
pub struct PatchSession {
    graph: PatchGraph,
    engine: Engine,
    registry: NodeRegistry,
    dispatcher: Dispatcher,
    events_tx: Sender<GraphEvent>,
    events_rx: Receiver<GraphEvent>,
    snapshot: Option<Snapshot>,
    flush_timeout: Duration,
}

impl PatchSession {
    /// Creates an empty session configured by `config`.
    ///
    /// Fails if the config's default overrides are invalid or the dispatch
    /// worker cannot be started.
    pub fn new(config: &SessionConfig, sink: Arc<dyn ParameterSink>) -> Result<Self, SyncError> {
        let registry = config.registry()?;
        let dispatcher = Dispatcher::new(config.dispatch.mode, sink)?;
        let (events_tx, events_rx) = unbounded();

        Ok(Self {
            graph: PatchGraph::with_policy(config.connection_policy()),
            engine: Engine::new(),
            registry,
            dispatcher,
            events_tx,
            events_rx,
            snapshot: None,
            flush_timeout: config.flush_timeout(),
        })
    }

    /// Read access to the graph.
    pub fn graph(&self) -> &PatchGraph {
        &self.graph
    }

    /// The node palette used by [`create_node()`](Self::create_node).
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// The last successfully computed snapshot, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// A handle for posting change notifications.
    pub fn event_sender(&self) -> GraphEventSender {
        GraphEventSender {
            tx: self.events_tx.clone(),
        }
    }

    /// Number of events waiting for [`process_pending()`](Self::process_pending).
    pub fn pending_events(&self) -> usize {
        self.events_rx.len()
    }

    fn post(&self, event: GraphEvent) {
        // The session owns the receiver, so this cannot be disconnected.
        let _ = self.events_tx.send(event);
    }

    /// Changes the occupied-port policy for later connections.
    pub fn set_policy(&mut self, policy: ConnectionPolicy) {
        self.graph.set_policy(policy);
    }

    /// Adds a node.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, PatchError> {
        let id = self.graph.add_node(node)?;
        self.post(GraphEvent::NodeAdded(id));
        Ok(id)
    }

    /// Adds a node from the palette by id or name, with default overrides.
    pub fn create_node(&mut self, id: &str) -> Result<NodeId, SyncError> {
        let node = self
            .registry
            .create(id)
            .ok_or_else(|| RegistryError::UnknownNode(id.to_string()))?;
        Ok(self.add_node(node)?)
    }

    /// Adds a node of `kind` with default overrides.
    pub fn create_kind(&mut self, kind: NodeKind) -> Result<NodeId, PatchError> {
        let node = self.registry.create_kind(kind);
        self.add_node(node)
    }

    /// Removes a node and every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, PatchError> {
        let node = self.graph.remove_node(id)?;
        self.post(GraphEvent::NodeRemoved(id));
        Ok(node)
    }

    /// Connects an output port to an input port.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<ConnectionId, PatchError> {
        let id = self
            .graph
            .add_connection(source, source_port, target, target_port)?;
        self.post(GraphEvent::ConnectionAdded(id));
        Ok(id)
    }

    /// Removes a connection.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<Connection, PatchError> {
        let connection = self.graph.remove_connection(id)?;
        self.post(GraphEvent::ConnectionRemoved(id));
        Ok(connection)
    }

    /// Edits a control; returns the stored (clamped) value.
    pub fn set_control(
        &mut self,
        node: NodeId,
        control: &str,
        value: f32,
    ) -> Result<f32, PatchError> {
        let stored = self.graph.set_control(node, control, value)?;
        self.post(GraphEvent::ControlChanged {
            node,
            control: control.to_string(),
        });
        Ok(stored)
    }

    /// Drains pending events and, if anything changed, recomputes once and
    /// dispatches the snapshot.
    ///
    /// A failed recompute keeps the previous snapshot and dispatches
    /// nothing; the next change triggers a fresh attempt.
    pub fn process_pending(&mut self) -> Processed {
        let events = self.events_rx.try_iter().count();
        let dirty = self.graph.take_dirty();
        if events == 0 && !dirty {
            return Processed::Idle;
        }

        let generation = self.graph.generation();
        match self.engine.recompute(&self.graph) {
            Ok(snapshot) => {
                tracing::debug!(events, generation, "coalesced recompute");
                let version = self.dispatcher.dispatch(generation, snapshot.clone());
                self.snapshot = Some(snapshot);
                Processed::Dispatched {
                    version,
                    generation,
                    events,
                }
            }
            Err(error) => {
                tracing::warn!(events, generation, "recompute aborted: {error}");
                Processed::Aborted { error, events }
            }
        }
    }

    /// Drains dispatch completions; see [`Dispatcher::poll()`].
    pub fn poll(&mut self) -> Vec<Completion> {
        self.dispatcher.poll()
    }

    /// Waits for dispatch to go idle, up to the configured flush timeout.
    pub fn flush(&self) -> Result<(), SyncError> {
        self.dispatcher.flush(self.flush_timeout)
    }

    /// Dispatch counters.
    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Processes what is pending, flushes, and shuts the dispatcher down.
    pub fn shutdown(mut self) -> Result<DispatchStats, SyncError> {
        self.process_pending();
        self.flush()?;
        self.poll();
        Ok(self.stats())
    }
}
