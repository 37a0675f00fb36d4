//! Criterion benchmarks for the recompute engine (`patchbay-core::engine`).
//!
//! Two axes:
//!
//! - **Recompute** - one full snapshot pass over patches of growing size
//! - **Edit** - a connection toggle followed by a recompute, the hot path of
//!   an interactive editor
//!
//! Run with: `cargo bench -p patchbay-core -- recompute/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patchbay_core::{Engine, Node, NodeId, NodeKind, PatchGraph};

const VOICE_COUNTS: &[usize] = &[1, 4, 16, 64];

// ---------------------------------------------------------------------------
// Patch constructors
// ---------------------------------------------------------------------------

fn add(graph: &mut PatchGraph, kind: NodeKind) -> NodeId {
    graph.add_node(Node::new(kind)).unwrap()
}

/// One full voice: four stages → ADSR, keyboard → VCO, VCO + ADSR → VCA,
/// VCA + noise → mixer. Returns the attack stage and its ADSR.
fn add_voice(graph: &mut PatchGraph) -> (NodeId, NodeId) {
    let adsr = add(graph, NodeKind::Adsr);
    let mut attack = adsr;
    for (kind, port) in [
        (NodeKind::Attack, "attack"),
        (NodeKind::Decay, "decay"),
        (NodeKind::Sustain, "sustain"),
        (NodeKind::Release, "release"),
    ] {
        let stage = add(graph, kind);
        graph.add_connection(stage, "value", adsr, port).unwrap();
        if kind == NodeKind::Attack {
            attack = stage;
        }
    }
    let keyboard = add(graph, NodeKind::MonophonicKeyboard);
    let vco = add(graph, NodeKind::Vco);
    let vca = add(graph, NodeKind::Vca);
    let noise = add(graph, NodeKind::Noise);
    let mixer = add(graph, NodeKind::Mixer);
    graph.add_connection(keyboard, "pitch", vco, "pitch").unwrap();
    graph.add_connection(keyboard, "duration", adsr, "gate").unwrap();
    graph.add_connection(vco, "audio", vca, "audio").unwrap();
    graph.add_connection(adsr, "envelope", vca, "cv").unwrap();
    graph.add_connection(vca, "audio", mixer, "osc1").unwrap();
    graph.add_connection(noise, "noise", mixer, "noise").unwrap();
    (attack, adsr)
}

fn make_patch(voices: usize) -> (PatchGraph, NodeId, NodeId) {
    let mut graph = PatchGraph::new();
    let mut last = (NodeId::new(0), NodeId::new(0));
    for _ in 0..voices {
        last = add_voice(&mut graph);
    }
    (graph, last.0, last.1)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute/full");
    let engine = Engine::new();

    for &voices in VOICE_COUNTS {
        let (graph, _, _) = make_patch(voices);
        group.bench_with_input(BenchmarkId::from_parameter(voices), &graph, |b, graph| {
            b.iter(|| black_box(engine.recompute(black_box(graph)).unwrap()));
        });
    }

    group.finish();
}

fn bench_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute/edit");
    let engine = Engine::new();

    for &voices in VOICE_COUNTS {
        let (mut graph, attack, adsr) = make_patch(voices);
        let mut wire = graph.incoming(adsr, "attack").map(|(id, _)| id);
        group.bench_function(BenchmarkId::from_parameter(voices), |b| {
            b.iter(|| {
                wire = match wire.take() {
                    Some(id) => {
                        graph.remove_connection(id).unwrap();
                        None
                    }
                    None => Some(graph.add_connection(attack, "value", adsr, "attack").unwrap()),
                };
                black_box(engine.recompute(&graph).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_recompute, bench_edit);
criterion_main!(benches);
