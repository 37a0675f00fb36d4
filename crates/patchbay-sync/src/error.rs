//! Session and dispatcher errors.

use std::time::Duration;

use patchbay_config::ConfigError;
use patchbay_core::PatchError;
use patchbay_registry::RegistryError;
use thiserror::Error;

/// Errors from [`PatchSession`](crate::PatchSession) and
/// [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Error)]
pub enum SyncError {
    /// A graph operation failed; the graph is unchanged.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A palette lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The session config is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The background dispatch thread could not be started.
    #[error("failed to spawn dispatch worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Updates were still queued or in flight when the flush deadline passed.
    #[error("dispatch did not go idle within {timeout:?} ({pending} update(s) pending)")]
    FlushTimeout {
        /// The deadline that passed.
        timeout: Duration,
        /// Queued plus in-flight updates at the deadline.
        pending: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchbay_core::NodeId;

    #[test]
    fn patch_errors_pass_through() {
        let err: SyncError = PatchError::NodeNotFound(NodeId::new(3)).into();
        assert_eq!(err.to_string(), PatchError::NodeNotFound(NodeId::new(3)).to_string());
    }

    #[test]
    fn flush_timeout_message() {
        let err = SyncError::FlushTimeout {
            timeout: Duration::from_millis(50),
            pending: 2,
        };
        assert_eq!(
            err.to_string(),
            "dispatch did not go idle within 50ms (2 update(s) pending)"
        );
    }
}
