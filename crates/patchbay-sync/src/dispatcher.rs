//! Versioned hand-off of snapshots to a [`ParameterSink`].
//!
//! Every dispatched snapshot gets the next [`SnapshotVersion`]. In
//! [`DispatchMode::Background`] a single worker thread owns the sink and
//! receives updates over a crossbeam channel. While it is busy, newer
//! updates pile up in the channel; when it comes back it sends only the
//! newest and counts the rest as superseded. At most one update is ever in
//! flight.
//!
//! Completions come back over a second channel and are drained by
//! [`Dispatcher::poll()`]. A completion older than the latest dispatched
//! version is stale and dropped there.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Condvar, Mutex};
use patchbay_config::DispatchMode;
use patchbay_core::Snapshot;

use crate::error::SyncError;
use crate::sink::{Ack, ParameterSink, SinkError};
use crate::update::{ParameterUpdate, SnapshotVersion};

/// Outcome of one delivered update.
#[derive(Debug)]
pub struct Completion {
    /// Version that was sent.
    pub version: SnapshotVersion,
    /// Graph generation it reflected.
    pub generation: u64,
    /// What the sink said.
    pub result: Result<Ack, SinkError>,
}

/// Counters since the dispatcher was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Updates handed to [`Dispatcher::dispatch()`].
    pub dispatched: u64,
    /// Queued updates replaced by a newer one before being sent.
    pub superseded: u64,
    /// Completions dropped because a newer version had been dispatched.
    pub stale: u64,
    /// Current completions the sink acknowledged.
    pub delivered: u64,
    /// Current completions the sink failed.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct WorkerState {
    queued: usize,
    in_flight: bool,
    superseded: u64,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<WorkerState>,
    idle: Condvar,
}

impl Shared {
    fn pending(state: &WorkerState) -> usize {
        state.queued + usize::from(state.in_flight)
    }
}

/// Sends snapshots to a sink, inline or from a worker thread.
pub struct Dispatcher {
    mode: DispatchMode,
    sink: Arc<dyn ParameterSink>,
    shared: Arc<Shared>,
    updates_tx: Option<Sender<ParameterUpdate>>,
    worker: Option<JoinHandle<()>>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    latest: SnapshotVersion,
    stats: DispatchStats,
}

impl Dispatcher {
    /// Creates a dispatcher; background mode starts the worker thread.
    pub fn new(mode: DispatchMode, sink: Arc<dyn ParameterSink>) -> Result<Self, SyncError> {
        let shared = Arc::new(Shared::default());
        let (completions_tx, completions_rx) = unbounded();

        let (updates_tx, worker) = match mode {
            DispatchMode::Inline => (None, None),
            DispatchMode::Background => {
                let (tx, rx) = unbounded();
                let worker_sink = Arc::clone(&sink);
                let worker_shared = Arc::clone(&shared);
                let worker_completions = completions_tx.clone();
                let handle = thread::Builder::new()
                    .name("patchbay-dispatch".into())
                    .spawn(move || {
                        worker_loop(&rx, &*worker_sink, &worker_shared, &worker_completions);
                    })
                    .map_err(SyncError::Spawn)?;
                (Some(tx), Some(handle))
            }
        };

        tracing::debug!(?mode, sink = sink.name(), "dispatcher started");

        Ok(Self {
            mode,
            sink,
            shared,
            updates_tx,
            worker,
            completions_tx,
            completions_rx,
            latest: SnapshotVersion::default(),
            stats: DispatchStats::default(),
        })
    }

    /// Dispatch mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Latest version handed out, `v0` before the first dispatch.
    pub fn latest_version(&self) -> SnapshotVersion {
        self.latest
    }

    /// Tags `snapshot` with the next version and sends it.
    ///
    /// Inline mode sends before returning; background mode only enqueues.
    /// Either way the outcome arrives through [`poll()`](Self::poll).
    pub fn dispatch(&mut self, generation: u64, snapshot: Snapshot) -> SnapshotVersion {
        self.latest = self.latest.next();
        self.stats.dispatched += 1;
        let update = ParameterUpdate::new(self.latest, generation, snapshot);
        tracing::debug!(
            version = update.version.0,
            generation,
            defined = update.snapshot.defined_count(),
            "dispatch"
        );

        match &self.updates_tx {
            Some(tx) => {
                self.shared.state.lock().queued += 1;
                if let Err(err) = tx.send(update) {
                    // Worker is gone; nothing will ever complete this one.
                    self.shared.state.lock().queued -= 1;
                    tracing::error!(version = err.0.version.0, "dispatch worker disconnected");
                }
            }
            None => {
                let result = self.sink.send(&update);
                let _ = self.completions_tx.send(Completion {
                    version: update.version,
                    generation,
                    result,
                });
            }
        }
        self.latest
    }

    /// Drains finished sends, dropping stale ones.
    ///
    /// Returns only completions for the latest dispatched version.
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut current = Vec::new();
        for completion in self.completions_rx.try_iter() {
            if completion.version < self.latest {
                self.stats.stale += 1;
                tracing::trace!(
                    version = completion.version.0,
                    latest = self.latest.0,
                    "dropping stale completion"
                );
                continue;
            }
            match &completion.result {
                Ok(_) => self.stats.delivered += 1,
                Err(err) => {
                    self.stats.failed += 1;
                    tracing::warn!(version = completion.version.0, "update failed: {err}");
                }
            }
            current.push(completion);
        }
        current
    }

    /// Number of updates queued or in flight.
    pub fn pending(&self) -> usize {
        Shared::pending(&self.shared.state.lock())
    }

    /// Blocks until nothing is queued or in flight, or `timeout` passes.
    pub fn flush(&self, timeout: Duration) -> Result<(), SyncError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while Shared::pending(&state) > 0 {
            if self.shared.idle.wait_until(&mut state, deadline).timed_out()
                && Shared::pending(&state) > 0
            {
                return Err(SyncError::FlushTimeout {
                    timeout,
                    pending: Shared::pending(&state),
                });
            }
        }
        Ok(())
    }

    /// Counters so far. Call [`poll()`](Self::poll) first for fresh
    /// delivery counts.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            superseded: self.shared.state.lock().superseded,
            ..self.stats
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Closing the channel ends the worker once it has drained it.
        self.updates_tx = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("dispatch worker panicked");
        }
    }
}

fn worker_loop(
    updates: &Receiver<ParameterUpdate>,
    sink: &dyn ParameterSink,
    shared: &Shared,
    completions: &Sender<Completion>,
) {
    while let Ok(mut update) = updates.recv() {
        let mut taken = 1;
        while let Ok(newer) = updates.try_recv() {
            tracing::debug!(
                superseded = update.version.0,
                by = newer.version.0,
                "superseding queued update"
            );
            update = newer;
            taken += 1;
        }
        {
            let mut state = shared.state.lock();
            state.queued -= taken;
            state.superseded += (taken - 1) as u64;
            state.in_flight = true;
        }

        let result = sink.send(&update);
        let _ = completions.send(Completion {
            version: update.version,
            generation: update.generation,
            result,
        });

        let mut state = shared.state.lock();
        state.in_flight = false;
        if state.queued == 0 {
            shared.idle.notify_all();
        }
    }
}
