//! Destinations for parameter updates.
//!
//! A [`ParameterSink`] is the outbound edge of a session: it receives every
//! dispatched [`ParameterUpdate`] and reports an [`Ack`] or a [`SinkError`].
//! Results are informational only; nothing a sink returns flows back into
//! the graph.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::update::{ParameterUpdate, SnapshotVersion};

/// Successful delivery of one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ack {
    /// Version the sink accepted.
    pub version: SnapshotVersion,
}

/// Delivery failures.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the underlying stream failed.
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The update could not be encoded.
    #[error("failed to encode update: {0}")]
    Encode(#[from] serde_json::Error),

    /// The receiving side refused the update.
    #[error("update rejected: {0}")]
    Rejected(String),
}

/// Receives parameter updates.
///
/// Sinks are shared with the dispatch worker, so `send` takes `&self`.
pub trait ParameterSink: Send + Sync {
    /// Deliver one update.
    fn send(&self, update: &ParameterUpdate) -> Result<Ack, SinkError>;

    /// Short name used in log events.
    fn name(&self) -> &str {
        "sink"
    }
}

impl<S: ParameterSink + ?Sized> ParameterSink for Arc<S> {
    fn send(&self, update: &ParameterUpdate) -> Result<Ack, SinkError> {
        (**self).send(update)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    updates: Vec<ParameterUpdate>,
    failures: usize,
}

/// Records every update in memory.
///
/// Clones share the same recording, so a test can keep one handle and give
/// the other to a session.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    /// An empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update received so far, oldest first.
    pub fn updates(&self) -> Vec<ParameterUpdate> {
        self.state.lock().updates.clone()
    }

    /// The most recent update.
    pub fn last(&self) -> Option<ParameterUpdate> {
        self.state.lock().updates.last().cloned()
    }

    /// Number of updates received.
    pub fn len(&self) -> usize {
        self.state.lock().updates.len()
    }

    /// True if nothing was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next `count` sends fail with [`SinkError::Rejected`].
    /// Rejected updates are not recorded.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().failures = count;
    }

    /// Forget every recorded update.
    pub fn clear(&self) {
        self.state.lock().updates.clear();
    }
}

impl ParameterSink for MemorySink {
    fn send(&self, update: &ParameterUpdate) -> Result<Ack, SinkError> {
        let mut state = self.state.lock();
        if state.failures > 0 {
            state.failures -= 1;
            return Err(SinkError::Rejected(format!("{} refused", update.version)));
        }
        state.updates.push(update.clone());
        Ok(Ack {
            version: update.version,
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Writes each update as one line of JSON.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
    pretty: bool,
}

impl<W: Write> JsonLinesSink<W> {
    /// Compact output, one object per line.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty: false,
        }
    }

    /// Indented output; objects span several lines.
    pub fn pretty(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty: true,
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Compact output on stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ParameterSink for JsonLinesSink<W> {
    fn send(&self, update: &ParameterUpdate) -> Result<Ack, SinkError> {
        let line = if self.pretty {
            update.to_json_pretty()?
        } else {
            update.to_json()?
        };
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(Ack {
            version: update.version,
        })
    }

    fn name(&self) -> &str {
        "json-lines"
    }
}

/// Logs each update as a `tracing` event and acknowledges it.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ParameterSink for TracingSink {
    fn send(&self, update: &ParameterUpdate) -> Result<Ack, SinkError> {
        tracing::info!(
            version = update.version.0,
            generation = update.generation,
            defined = update.snapshot.defined_count(),
            "parameters: {}",
            update.snapshot
        );
        Ok(Ack {
            version: update.version,
        })
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
