//! The patch graph: node and connection storage plus every structural edit.

use super::connection::{Connection, ConnectionId, Endpoint};
use super::node::{Node, NodeData, NodeId};
use crate::catalog::Direction;
use crate::error::{PatchError, Result};
use crate::socket::SocketType;

/// How far past the next fresh identity [`PatchGraph::insert_node()`] may
/// reach. Node storage is indexed by identity, so every skipped identity costs
/// an empty slot.
pub const MAX_IDENTITY_GAP: u32 = 1024;

/// What [`PatchGraph::add_connection()`] does when the target input already
/// has an incoming connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionPolicy {
    /// Fail with [`PatchError::PortOccupied`] and keep the existing edge.
    #[default]
    Reject,
    /// Remove the existing edge and insert the new one.
    Replace,
}

/// The patch: nodes, connections, and a dirty flag.
///
/// The graph owns its nodes and connections exclusively. Every successful
/// mutation marks the graph dirty and bumps its [`generation()`](Self::generation);
/// the graph never recomputes anything itself. Every failing mutation leaves
/// the graph exactly as it was.
///
/// The graph is kept acyclic: [`add_connection()`](Self::add_connection)
/// refuses self-loops and edges that would close a cycle.
///
/// # Example
///
/// ```rust
/// use patchbay_core::{Node, NodeKind, PatchGraph};
///
/// let mut graph = PatchGraph::new();
/// let attack = graph.add_node(Node::new(NodeKind::Attack))?;
/// let adsr = graph.add_node(Node::new(NodeKind::Adsr))?;
/// graph.add_connection(attack, "value", adsr, "attack")?;
/// assert_eq!(graph.connection_count(), 1);
/// # Ok::<(), patchbay_core::PatchError>(())
/// ```
#[derive(Default)]
pub struct PatchGraph {
    nodes: Vec<Option<NodeData>>,
    connections: Vec<Option<Connection>>,
    next_node_slot: u32,
    next_connection_slot: u32,
    policy: ConnectionPolicy,
    generation: u64,
    dirty: bool,
}

impl PatchGraph {
    /// Creates an empty graph with the [`Reject`](ConnectionPolicy::Reject) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the given occupied-port policy.
    pub fn with_policy(policy: ConnectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Returns the occupied-port policy.
    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Changes the occupied-port policy. Existing connections are untouched.
    pub fn set_policy(&mut self, policy: ConnectionPolicy) {
        self.policy = policy;
    }

    // --- Node mutations ---

    /// Inserts a node under a freshly generated identity.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let id = NodeId(self.next_node_slot);
        self.insert_node(id, node)?;
        Ok(id)
    }

    /// Inserts a node under a caller-supplied identity.
    ///
    /// Fails with [`PatchError::DuplicateIdentity`] if the identity is in use.
    /// Identities of removed nodes stay retired and are rejected too.
    ///
    /// Fails with [`PatchError::IdentityOutOfRange`] if `id` lies more than
    /// [`MAX_IDENTITY_GAP`] past the next fresh identity, or if no fresh
    /// identity would remain after it.
    pub fn insert_node(&mut self, id: NodeId, node: Node) -> Result<()> {
        let idx = id.0 as usize;
        let retired =
            id.0 < self.next_node_slot && self.nodes.get(idx).is_none_or(Option::is_none);
        if retired || self.nodes.get(idx).is_some_and(Option::is_some) {
            return Err(PatchError::DuplicateIdentity(id));
        }
        let next_slot = id
            .0
            .checked_add(1)
            .filter(|_| id.0.saturating_sub(self.next_node_slot) <= MAX_IDENTITY_GAP)
            .ok_or(PatchError::IdentityOutOfRange(id))?;
        if idx >= self.nodes.len() {
            self.nodes.resize_with(idx + 1, || None);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} node {id}", node.kind());
        self.nodes[idx] = Some(NodeData::new(node));
        self.next_node_slot = self.next_node_slot.max(next_slot);
        self.touch();
        Ok(())
    }

    /// Removes a node and every connection touching it.
    ///
    /// Returns the removed node.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let data = self.get_node(id)?;
        let touching: Vec<ConnectionId> = data
            .incoming
            .iter()
            .chain(data.outgoing.iter())
            .copied()
            .collect();
        for connection in touching {
            self.detach(connection);
        }

        let data = self.nodes[id.0 as usize]
            .take()
            .ok_or(PatchError::NodeNotFound(id))?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        self.touch();
        Ok(data.node)
    }

    /// Sets a control value on a node. This is the control-edit event.
    ///
    /// Returns the value actually stored after clamping into range.
    pub fn set_control(&mut self, id: NodeId, control: &str, value: f32) -> Result<f32> {
        let idx = id.0 as usize;
        let data = self
            .nodes
            .get_mut(idx)
            .and_then(Option::as_mut)
            .ok_or(PatchError::NodeNotFound(id))?;
        let applied = data.node.set_control(control, value)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_control: {id}.{control} = {applied}");
        self.touch();
        Ok(applied)
    }

    // --- Connection mutations ---

    /// Connects an output port to an input port.
    ///
    /// Fails, leaving the graph unchanged, when:
    /// - either node or port does not exist (not-found errors)
    /// - the output socket cannot feed the input socket ([`PatchError::TypeMismatch`])
    /// - the edge is a self-loop or would close a cycle ([`PatchError::CyclicDependency`])
    /// - the input is occupied under the reject policy ([`PatchError::PortOccupied`])
    ///
    /// Under the replace policy the previous edge on the input is removed.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<ConnectionId> {
        let (source_end, source_socket) = self.endpoint(source, Direction::Output, source_port)?;
        let (target_end, target_socket) = self.endpoint(target, Direction::Input, target_port)?;

        if !source_socket.can_feed(target_socket) {
            return Err(PatchError::TypeMismatch {
                from: source_socket,
                to: target_socket,
            });
        }

        // A cycle exists if `target` can already reach `source`.
        if source == target || self.can_reach(target, source) {
            return Err(PatchError::CyclicDependency(source));
        }

        let existing = self.input_connection(target, target_end.index);
        if let Some(existing) = existing
            && self.policy == ConnectionPolicy::Reject
        {
            return Err(PatchError::PortOccupied {
                node: target,
                port: target_end.port.to_string(),
                existing,
            });
        }

        // All checks passed; mutate.
        if let Some(existing) = existing {
            self.detach(existing);
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_replace: {existing} on {target_end}");
        }

        let id = ConnectionId(self.next_connection_slot);
        self.next_connection_slot += 1;
        let idx = id.0 as usize;
        if idx >= self.connections.len() {
            self.connections.resize_with(idx + 1, || None);
        }
        self.connections[idx] = Some(Connection {
            source: source_end,
            target: target_end,
        });
        self.attach(id, source, target);

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {source_end} → {target_end} ({id})");
        self.touch();
        Ok(id)
    }

    /// Removes a connection and returns it.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<Connection> {
        let connection = self.detach(id).ok_or(PatchError::ConnectionNotFound(id))?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {id}");
        self.touch();
        Ok(connection)
    }

    // --- Read access ---

    /// Returns a node by identity.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.get_node(id).ok().map(|data| &data.node)
    }

    /// Returns true if the node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Returns a connection by identity.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0 as usize)?.as_ref()
    }

    /// Enumerates nodes. Callers must not rely on the order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref().map(|data| (NodeId(idx as u32), &data.node))
        })
    }

    /// Enumerates connections. Callers must not rely on the order.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> + '_ {
        self.connections
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (ConnectionId(idx as u32), c)))
    }

    /// Returns the connection feeding the named input, if any.
    pub fn incoming(&self, node: NodeId, port: &str) -> Option<(ConnectionId, &Connection)> {
        let (index, _) = self.node(node)?.kind().port(Direction::Input, port)?;
        let id = self.input_connection(node, index)?;
        Some((id, self.connection(id)?))
    }

    /// Returns every connection touching a node, incoming first.
    pub fn connections_of(&self, node: NodeId) -> Vec<ConnectionId> {
        self.get_node(node)
            .map(|data| data.incoming.iter().chain(&data.outgoing).copied().collect())
            .unwrap_or_default()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.iter().flatten().count()
    }

    /// Returns every node in dependency order (Kahn's algorithm).
    ///
    /// Sources come first; ties are broken by ascending identity. Fails with
    /// [`PatchError::CyclicDependency`] naming a node on a cycle.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        let n = self.nodes.len();
        let mut in_degree = vec![0u32; n];
        let mut active = 0usize;

        for (idx, data) in self.nodes.iter().enumerate() {
            if let Some(data) = data {
                active += 1;
                in_degree[idx] = data
                    .incoming
                    .iter()
                    .filter(|id| self.connection(**id).is_some())
                    .count() as u32;
            }
        }

        // Reversed so `pop()` yields the lowest identity first.
        let mut ready: Vec<usize> = (0..n)
            .rev()
            .filter(|&idx| self.nodes[idx].is_some() && in_degree[idx] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(active);

        while let Some(idx) = ready.pop() {
            sorted.push(NodeId(idx as u32));
            let Some(Some(data)) = self.nodes.get(idx) else {
                continue;
            };
            let mut released = Vec::new();
            for id in &data.outgoing {
                if let Some(connection) = self.connection(*id) {
                    let to = connection.target.node.0 as usize;
                    in_degree[to] -= 1;
                    if in_degree[to] == 0 {
                        released.push(to);
                    }
                }
            }
            released.sort_unstable_by(|a, b| b.cmp(a));
            ready.extend(released);
        }

        if sorted.len() != active {
            let stuck = (0..n)
                .find(|&idx| self.nodes[idx].is_some() && in_degree[idx] > 0)
                .unwrap_or_default();
            return Err(PatchError::CyclicDependency(NodeId(stuck as u32)));
        }
        Ok(sorted)
    }

    // --- Dirty tracking ---

    /// Returns true if the graph changed since the last [`take_dirty()`](Self::take_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning its previous value.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Mutation counter. Increases by one per successful mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // --- Crate-internal helpers ---

    /// Upper bound (exclusive) on node slot indices.
    pub(crate) fn node_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Connection feeding input `index` of `node`.
    pub(crate) fn input_connection(&self, node: NodeId, index: usize) -> Option<ConnectionId> {
        let data = self.get_node(node).ok()?;
        data.incoming
            .iter()
            .copied()
            .find(|id| self.connection(*id).is_some_and(|c| c.target.index == index))
    }

    /// Connections arriving at `node`.
    pub(crate) fn incoming_ids(&self, node: NodeId) -> &[ConnectionId] {
        self.get_node(node)
            .map(|data| data.incoming.as_slice())
            .unwrap_or(&[])
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    fn get_node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PatchError::NodeNotFound(id))
    }

    fn endpoint(
        &self,
        node: NodeId,
        direction: Direction,
        port: &str,
    ) -> Result<(Endpoint, SocketType)> {
        let kind = self.get_node(node)?.node.kind();
        let (index, spec) = kind
            .port(direction, port)
            .ok_or_else(|| PatchError::PortNotFound {
                node,
                kind,
                direction,
                port: port.to_string(),
            })?;
        Ok((
            Endpoint {
                node,
                port: spec.name,
                index,
            },
            spec.socket,
        ))
    }

    /// DFS reachability check: can `from` reach `to` along existing edges?
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(data)) = self.nodes.get(idx) {
                for id in &data.outgoing {
                    if let Some(connection) = self.connection(*id) {
                        stack.push(connection.target.node);
                    }
                }
            }
        }
        false
    }

    fn attach(&mut self, id: ConnectionId, source: NodeId, target: NodeId) {
        if let Some(Some(data)) = self.nodes.get_mut(source.0 as usize) {
            data.outgoing.push(id);
        }
        if let Some(Some(data)) = self.nodes.get_mut(target.0 as usize) {
            data.incoming.push(id);
        }
    }

    /// Removes a connection from storage and both adjacency lists.
    fn detach(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.get_mut(id.0 as usize)?.take()?;
        if let Some(Some(data)) = self.nodes.get_mut(connection.source.node.0 as usize) {
            data.outgoing.retain(|c| *c != id);
        }
        if let Some(Some(data)) = self.nodes.get_mut(connection.target.node.0 as usize) {
            data.incoming.retain(|c| *c != id);
        }
        Some(connection)
    }

    /// Inserts an edge with no validation at all. Lets tests build graphs the
    /// public API refuses, such as cycles.
    #[cfg(test)]
    pub(crate) fn connect_unchecked(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> ConnectionId {
        let (source_end, _) = self.endpoint(source, Direction::Output, source_port).unwrap();
        let (target_end, _) = self.endpoint(target, Direction::Input, target_port).unwrap();
        let id = ConnectionId(self.next_connection_slot);
        self.next_connection_slot += 1;
        self.connections.resize_with(id.0 as usize + 1, || None);
        self.connections[id.0 as usize] = Some(Connection {
            source: source_end,
            target: target_end,
        });
        self.attach(id, source, target);
        self.touch();
        id
    }
}
