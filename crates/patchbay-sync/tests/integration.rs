//! End-to-end tests: session edits through to sink deliveries.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use patchbay_config::{DispatchMode, OccupiedPort, SessionConfig};
use patchbay_core::{NodeId, Param, ParamValue, PatchError};
use patchbay_sync::{
    Ack, MemorySink, ParameterSink, ParameterUpdate, PatchSession, Processed, SinkError,
    SnapshotVersion, SyncError,
};

fn inline_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.dispatch.mode = DispatchMode::Inline;
    config
}

/// ADSR with all four stages wired, feeding a VCA that feeds a mixer.
struct Voice {
    stages: [NodeId; 4],
    adsr: NodeId,
}

fn build_voice(session: &mut PatchSession) -> Voice {
    let adsr = session.create_node("adsr").unwrap();
    let mut stages = [adsr; 4];
    for (slot, id) in ["attack", "decay", "sustain", "release"].into_iter().enumerate() {
        let stage = session.create_node(id).unwrap();
        session.add_connection(stage, "value", adsr, id).unwrap();
        stages[slot] = stage;
    }
    let keyboard = session.create_node("keyboard").unwrap();
    let vco = session.create_node("vco").unwrap();
    let vca = session.create_node("vca").unwrap();
    let mixer = session.create_node("mixer").unwrap();
    session.add_connection(keyboard, "pitch", vco, "pitch").unwrap();
    session.add_connection(vco, "audio", vca, "audio").unwrap();
    session.add_connection(adsr, "envelope", vca, "cv").unwrap();
    session.add_connection(vca, "audio", mixer, "osc1").unwrap();
    Voice { stages, adsr }
}

#[test]
fn two_quick_mutations_send_once_with_final_state() {
    let sink = MemorySink::new();
    let mut session = PatchSession::new(&inline_config(), Arc::new(sink.clone())).unwrap();
    let voice = build_voice(&mut session);
    session.process_pending();
    sink.clear();

    session.set_control(voice.stages[0], "value", 0.5).unwrap();
    session.set_control(voice.stages[0], "value", 0.25).unwrap();
    session.process_pending();

    assert_eq!(sink.len(), 1);
    assert_eq!(
        sink.last().unwrap().snapshot.get(Param::Attack),
        ParamValue::Defined(0.25)
    );
}

#[test]
fn removing_attack_wire_gates_attack_and_downstream_vca() {
    let sink = MemorySink::new();
    let mut session = PatchSession::new(&inline_config(), Arc::new(sink.clone())).unwrap();
    let voice = build_voice(&mut session);
    session.process_pending();
    let before = sink.last().unwrap().snapshot;

    let (wire, _) = session.graph().incoming(voice.adsr, "attack").unwrap();
    session.remove_connection(wire).unwrap();
    session.process_pending();
    let after = sink.last().unwrap().snapshot;

    // The ADSR loses a required input, so the VCA fed by its envelope goes
    // dark with it. Decay, sustain and release still read their own wires.
    for param in Param::ALL {
        if matches!(param, Param::Attack | Param::Vca) {
            assert!(before.get(param).is_defined(), "{param}");
            assert_eq!(after.get(param), ParamValue::Undefined, "{param}");
        } else {
            assert_eq!(before.get(param), after.get(param), "{param}");
        }
    }
}

#[test]
fn refused_connection_leaves_snapshot_and_dispatch_alone() {
    let sink = MemorySink::new();
    let mut session = PatchSession::new(&inline_config(), Arc::new(sink.clone())).unwrap();
    let voice = build_voice(&mut session);
    session.process_pending();
    let snapshot = session.snapshot().cloned();

    let extra = session.create_node("attack").unwrap();
    session.process_pending();
    let err = session
        .add_connection(extra, "value", voice.adsr, "attack")
        .unwrap_err();
    assert!(matches!(err, PatchError::PortOccupied { .. }));

    assert_eq!(session.process_pending(), Processed::Idle);
    assert_eq!(session.snapshot().cloned(), snapshot);
}

#[test]
fn replace_policy_from_config_swaps_the_edge() {
    let mut config = inline_config();
    config.graph.occupied_port = OccupiedPort::Replace;
    let sink = MemorySink::new();
    let mut session = PatchSession::new(&config, Arc::new(sink.clone())).unwrap();
    let voice = build_voice(&mut session);

    let fast = session.create_node("attack").unwrap();
    session.set_control(fast, "value", 0.01).unwrap();
    session.add_connection(fast, "value", voice.adsr, "attack").unwrap();
    session.process_pending();

    assert_eq!(
        sink.last().unwrap().snapshot.get(Param::Attack),
        ParamValue::Defined(0.01)
    );
    assert_eq!(
        session.graph().incoming(voice.adsr, "attack").unwrap().1.source.node,
        fast
    );
}

#[test]
fn failing_sink_does_not_block_later_updates() {
    let sink = MemorySink::new();
    sink.fail_next(1);
    let mut session = PatchSession::new(&inline_config(), Arc::new(sink.clone())).unwrap();
    session.create_node("attack").unwrap();
    session.process_pending();
    let completions = session.poll();
    assert!(matches!(completions[0].result, Err(SinkError::Rejected(_))));

    session.create_node("adsr").unwrap();
    session.process_pending();
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.last().unwrap().version, SnapshotVersion(2));
}

/// Blocks each send until the test releases it.
struct GatedSink {
    entered: Sender<SnapshotVersion>,
    release: Receiver<()>,
    inner: MemorySink,
}

impl ParameterSink for GatedSink {
    fn send(&self, update: &ParameterUpdate) -> Result<Ack, SinkError> {
        let _ = self.entered.send(update.version);
        let _ = self.release.recv();
        self.inner.send(update)
    }
}

#[test]
fn queued_snapshots_supersede_and_stale_completions_drop() {
    let (entered_tx, entered_rx) = unbounded();
    let (release_tx, release_rx) = unbounded();
    let recorded = MemorySink::new();
    let sink = GatedSink {
        entered: entered_tx,
        release: release_rx,
        inner: recorded.clone(),
    };
    let mut session = PatchSession::new(&SessionConfig::default(), Arc::new(sink)).unwrap();

    let attack = session.create_node("attack").unwrap();
    session.process_pending();
    assert_eq!(
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        SnapshotVersion(1)
    );

    // v1 is in flight; v2 and v3 queue up behind it.
    session.set_control(attack, "value", 0.2).unwrap();
    session.process_pending();
    session.set_control(attack, "value", 0.3).unwrap();
    session.process_pending();

    release_tx.send(()).unwrap();
    assert_eq!(
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        SnapshotVersion(3)
    );
    release_tx.send(()).unwrap();
    session.flush().unwrap();

    let versions: Vec<_> = recorded.updates().iter().map(|u| u.version).collect();
    assert_eq!(versions, [SnapshotVersion(1), SnapshotVersion(3)]);

    let completions = session.poll();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].version, SnapshotVersion(3));

    let stats = session.stats();
    assert_eq!(stats.dispatched, 3);
    assert_eq!(stats.superseded, 1);
    assert_eq!(stats.stale, 1);
    assert_eq!(stats.delivered, 1);
}

#[test]
fn flush_times_out_while_sink_is_stuck() {
    let (entered_tx, entered_rx) = unbounded();
    let (release_tx, release_rx) = unbounded();
    let mut config = SessionConfig::default();
    config.dispatch.flush_timeout_ms = 20;
    let sink = GatedSink {
        entered: entered_tx,
        release: release_rx,
        inner: MemorySink::new(),
    };
    let mut session = PatchSession::new(&config, Arc::new(sink)).unwrap();
    session.create_node("noise").unwrap();
    session.process_pending();
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(matches!(
        session.flush(),
        Err(SyncError::FlushTimeout { pending: 1, .. })
    ));

    release_tx.send(()).unwrap();
    let stats = session.shutdown().unwrap();
    assert_eq!(stats.delivered, 1);
}
