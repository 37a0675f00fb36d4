//! Property-based tests for patchbay-core.
//!
//! Builds random patches from random connection attempts and checks the
//! graph invariants and the connectivity-gated snapshot rules.

use patchbay_core::{
    ConnectionId, Direction, Engine, Node, NodeId, NodeKind, Param, PatchError, PatchGraph,
    Resolver, Tap,
};
use proptest::prelude::*;

/// A connection attempt addressed by indices, resolved modulo what exists.
#[derive(Clone, Debug)]
struct Attempt {
    source: usize,
    output: usize,
    target: usize,
    input: usize,
}

fn attempt() -> impl Strategy<Value = Attempt> {
    (0usize..64, 0usize..4, 0usize..64, 0usize..8).prop_map(|(source, output, target, input)| {
        Attempt {
            source,
            output,
            target,
            input,
        }
    })
}

fn kinds() -> impl Strategy<Value = Vec<NodeKind>> {
    prop::collection::vec((0usize..NodeKind::ALL.len()).prop_map(|i| NodeKind::ALL[i]), 1..14)
}

/// Adds the nodes, then applies every attempt that names existing ports.
/// Failing attempts are ignored, so the result is a valid random patch.
fn build(kinds: &[NodeKind], attempts: &[Attempt]) -> (PatchGraph, Vec<NodeId>) {
    let mut graph = PatchGraph::new();
    let ids: Vec<NodeId> = kinds
        .iter()
        .map(|k| graph.add_node(Node::new(*k)).unwrap())
        .collect();
    for a in attempts {
        let _ = try_connect(&mut graph, &ids, a);
    }
    (graph, ids)
}

fn try_connect(
    graph: &mut PatchGraph,
    ids: &[NodeId],
    a: &Attempt,
) -> Option<Result<ConnectionId, PatchError>> {
    let source = ids[a.source % ids.len()];
    let target = ids[a.target % ids.len()];
    let outputs = graph.node(source)?.kind().outputs();
    let inputs = graph.node(target)?.kind().inputs();
    if outputs.is_empty() || inputs.is_empty() {
        return None;
    }
    let output = outputs[a.output % outputs.len()].name;
    let input = inputs[a.input % inputs.len()].name;
    Some(graph.add_connection(source, output, target, input))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Identical graph state yields identical snapshots.
    #[test]
    fn recompute_is_deterministic(
        kinds in kinds(),
        attempts in prop::collection::vec(attempt(), 0..40),
    ) {
        let (graph, _) = build(&kinds, &attempts);
        let engine = Engine::new();
        let first = engine.recompute(&graph).unwrap();
        let second = engine.recompute(&graph).unwrap();
        prop_assert_eq!(first.to_string(), second.to_string());
        prop_assert_eq!(first, second);
    }

    /// Input-tapped parameters are defined exactly when some tapped input is
    /// satisfied, and are never NaN when defined.
    #[test]
    fn defined_iff_satisfied(
        kinds in kinds(),
        attempts in prop::collection::vec(attempt(), 0..40),
    ) {
        let (graph, _) = build(&kinds, &attempts);
        let snapshot = Engine::new().recompute(&graph).unwrap();
        let mut resolver = Resolver::new(&graph);

        for param in Param::ALL {
            let expected = match param.tap() {
                Tap::Input { kind, port } => graph
                    .nodes()
                    .filter(|(_, n)| n.kind() == kind)
                    .map(|(id, _)| id)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .any(|id| resolver.is_input_satisfied(id, port).unwrap()),
                Tap::Control { kind, .. } => graph
                    .nodes()
                    .filter(|(_, n)| n.kind() == kind)
                    .map(|(id, _)| id)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .any(|id| resolver.is_node_live(id).unwrap()),
            };
            let value = snapshot.get(param);
            prop_assert_eq!(value.is_defined(), expected, "{}", param);
            if let Some(v) = value.value() {
                prop_assert!(v.is_finite(), "{} = {}", param, v);
            }
        }
    }

    /// Every input port has at most one incoming connection and no
    /// connection joins a node to itself.
    #[test]
    fn structural_invariants_hold(
        kinds in kinds(),
        attempts in prop::collection::vec(attempt(), 0..60),
    ) {
        let (graph, ids) = build(&kinds, &attempts);
        prop_assert!(graph.topological_order().is_ok());
        for id in &ids {
            let kind = graph.node(*id).unwrap().kind();
            for (index, _) in kind.ports(Direction::Input).iter().enumerate() {
                let count = graph
                    .connections()
                    .filter(|(_, c)| c.target.node == *id && c.target.index == index)
                    .count();
                prop_assert!(count <= 1);
            }
        }
        for (_, connection) in graph.connections() {
            prop_assert_ne!(connection.source.node, connection.target.node);
        }
    }

    /// Adding then removing one more connection restores the snapshot, and a
    /// refused connection changes nothing.
    #[test]
    fn add_remove_round_trip(
        kinds in kinds(),
        attempts in prop::collection::vec(attempt(), 0..30),
        extra in attempt(),
    ) {
        let (mut graph, ids) = build(&kinds, &attempts);
        let engine = Engine::new();
        let before = engine.recompute(&graph).unwrap();
        let generation = graph.generation();
        let count = graph.connection_count();

        match try_connect(&mut graph, &ids, &extra) {
            Some(Ok(id)) => {
                graph.remove_connection(id).unwrap();
            }
            Some(Err(_)) | None => {
                prop_assert_eq!(graph.generation(), generation);
            }
        }
        prop_assert_eq!(graph.connection_count(), count);
        prop_assert_eq!(engine.recompute(&graph).unwrap(), before);
    }

    /// Removing any node leaves no connection that references it.
    #[test]
    fn remove_node_drops_connections(
        kinds in kinds(),
        attempts in prop::collection::vec(attempt(), 0..40),
        victim in 0usize..64,
    ) {
        let (mut graph, ids) = build(&kinds, &attempts);
        let victim = ids[victim % ids.len()];
        graph.remove_node(victim).unwrap();
        for (_, connection) in graph.connections() {
            prop_assert_ne!(connection.source.node, victim);
            prop_assert_ne!(connection.target.node, victim);
        }
        prop_assert!(Engine::new().recompute(&graph).is_ok());
    }
}
