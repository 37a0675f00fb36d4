//! Keeping a synthesis backend in sync with a patch.
//!
//! [`PatchSession`] owns a [`PatchGraph`](patchbay_core::PatchGraph), the
//! recompute [`Engine`](patchbay_core::Engine) and a [`Dispatcher`]. Edits
//! post events; [`PatchSession::process_pending()`] folds any burst of
//! events into one recompute and one dispatched [`ParameterUpdate`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use patchbay_config::{DispatchMode, SessionConfig};
//! use patchbay_core::{Param, ParamValue};
//! use patchbay_sync::{MemorySink, PatchSession, Processed};
//!
//! let mut config = SessionConfig::default();
//! config.dispatch.mode = DispatchMode::Inline;
//!
//! let sink = MemorySink::new();
//! let mut session = PatchSession::new(&config, Arc::new(sink.clone())).unwrap();
//!
//! let attack = session.create_node("attack").unwrap();
//! let adsr = session.create_node("adsr").unwrap();
//! session.add_connection(attack, "value", adsr, "attack").unwrap();
//!
//! assert!(matches!(session.process_pending(), Processed::Dispatched { .. }));
//! let update = sink.last().unwrap();
//! assert_eq!(update.snapshot.get(Param::Attack), ParamValue::Defined(0.1));
//! assert_eq!(update.snapshot.get(Param::Decay), ParamValue::Undefined);
//! ```

mod dispatcher;
mod error;
mod session;
mod sink;
mod update;

pub use dispatcher::{Completion, DispatchStats, Dispatcher};
pub use error::SyncError;
pub use patchbay_config::DispatchMode;
pub use session::{GraphEvent, GraphEventSender, PatchSession, Processed};
pub use sink::{Ack, JsonLinesSink, MemorySink, ParameterSink, SinkError, TracingSink};
pub use update::{ParameterUpdate, SnapshotVersion};
