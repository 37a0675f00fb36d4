//! Connectivity resolver.
//!
//! Answers whether an input port is *satisfied*: it has an incoming
//! connection whose sockets are compatible and whose source node is *live*.
//! A node is live when every one of its required inputs is satisfied, so the
//! question recurses upstream until it reaches pure sources (nodes with no
//! required inputs), which are trivially live.
//!
//! The answer is a boolean, never a partial value. Results are memoized for
//! the lifetime of one [`Resolver`], which should therefore not outlive a
//! single recompute pass. Cycles are detected during the recursion and
//! reported as [`PatchError::CyclicDependency`].

use crate::catalog::Direction;
use crate::error::{PatchError, Result};
use crate::graph::{NodeId, PatchGraph};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Visiting,
    Live(bool),
}

/// Memoizing liveness oracle over a borrowed graph.
pub struct Resolver<'g> {
    graph: &'g PatchGraph,
    marks: Vec<Option<Mark>>,
}

impl<'g> Resolver<'g> {
    /// Creates a resolver for one pass over `graph`.
    pub fn new(graph: &'g PatchGraph) -> Self {
        Self {
            graph,
            marks: vec![None; graph.node_slots()],
        }
    }

    /// Returns the graph this resolver reads.
    pub fn graph(&self) -> &'g PatchGraph {
        self.graph
    }

    /// Returns true if every required input of `node` is satisfied.
    pub fn is_node_live(&mut self, node: NodeId) -> Result<bool> {
        let idx = node.0 as usize;
        match self.marks.get(idx).copied().flatten() {
            Some(Mark::Live(live)) => return Ok(live),
            Some(Mark::Visiting) => return Err(PatchError::CyclicDependency(node)),
            None => {}
        }
        let kind = self
            .graph
            .node(node)
            .ok_or(PatchError::NodeNotFound(node))?
            .kind();

        self.marks[idx] = Some(Mark::Visiting);
        let mut live = true;
        for (index, port) in kind.inputs().iter().enumerate() {
            if port.required && !self.input_satisfied_at(node, index)? {
                live = false;
                break;
            }
        }
        self.marks[idx] = Some(Mark::Live(live));
        Ok(live)
    }

    /// Returns true if the named input of `node` is satisfied.
    pub fn is_input_satisfied(&mut self, node: NodeId, port: &str) -> Result<bool> {
        let kind = self
            .graph
            .node(node)
            .ok_or(PatchError::NodeNotFound(node))?
            .kind();
        let (index, _) =
            kind.port(Direction::Input, port)
                .ok_or_else(|| PatchError::PortNotFound {
                    node,
                    kind,
                    direction: Direction::Input,
                    port: port.to_string(),
                })?;
        self.input_satisfied_at(node, index)
    }

    /// Index-based form of [`is_input_satisfied()`](Self::is_input_satisfied).
    pub(crate) fn input_satisfied_at(&mut self, node: NodeId, index: usize) -> Result<bool> {
        let Some(id) = self.graph.input_connection(node, index) else {
            return Ok(false);
        };
        let Some(connection) = self.graph.connection(id) else {
            return Ok(false);
        };
        let source = connection.source;
        let (Some(source_node), Some(target_node)) =
            (self.graph.node(source.node), self.graph.node(node))
        else {
            return Ok(false);
        };
        let from = source_node.kind().outputs()[source.index].socket;
        let to = target_node.kind().inputs()[index].socket;
        if !from.can_feed(to) {
            return Ok(false);
        }
        self.is_node_live(source.node)
    }
}
