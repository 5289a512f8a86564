//! Typed error taxonomy for the proving pipeline.
//!
//! The executor's fallback logic matches on [`ProveError::MissingArtifacts`]
//! only; every other variant propagates and finalizes the job as a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a proving strategy.
#[derive(Debug, Error)]
pub enum ProveError {
    /// One or more required model artifacts are absent. Raised as a single
    /// aggregated condition naming every missing item, before any pipeline
    /// step runs; the executor recovers from this by re-running the
    /// simulated strategy.
    #[error("missing EZKL artifacts: {} (model dir: {})", missing.join(", "), model_dir.display())]
    MissingArtifacts {
        /// Logical names of every absent artifact.
        missing: Vec<String>,
        /// The configured model directory that was scanned.
        model_dir: PathBuf,
    },

    /// Any other pipeline failure. Not recovered; finalizes the job as
    /// `FAILURE` with this error's display text.
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

impl ProveError {
    /// Whether the executor may recover by falling back to simulation.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingArtifacts { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifacts_lists_every_item() {
        let err = ProveError::MissingArtifacts {
            missing: vec!["model".into(), "pk".into(), "srs".into()],
            model_dir: PathBuf::from("/srv/model"),
        };
        let msg = err.to_string();
        assert!(msg.contains("model, pk, srs"));
        assert!(msg.contains("/srv/model"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn execution_errors_are_fatal() {
        let err = ProveError::from(anyhow::anyhow!("proof verification failed"));
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "proof verification failed");
    }
}
