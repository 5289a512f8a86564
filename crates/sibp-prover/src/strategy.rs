//! Strategy abstraction for proof generation.
//!
//! Implementors provide a blocking API that takes one job and a progress
//! sink and either produces a [`ProofResult`] or fails with a
//! [`ProveError`]. This keeps the call surface stable across the executor
//! and tests.
//!
//! ## Contracts implementors should uphold
//! - Progress reported through the sink must be monotonically
//!   non-decreasing and stay within the band the executor leaves open
//!   (the executor itself reports 10 before delegating).
//! - The reported statistic must be computed from the **raw** submitted
//!   returns, never from any normalized/quantized circuit input.
//! - `mode` in the returned result must name the strategy that actually
//!   ran; the executor rewrites it only for the missing-artifact fallback.
//! - Neither success nor failure may leave stray files behind; all
//!   intermediates live in scoped temp locations.

use sibp_core::{ProofJob, ProofResult, ProveError};

use crate::progress::ProgressSink;

/// Minimal strategy API the executor depends on.
pub trait ProvingStrategy {
    /// Run the pipeline to completion for `job`, reporting stage progress
    /// through `sink`.
    ///
    /// # Errors
    /// Returns [`ProveError::MissingArtifacts`] if required on-disk
    /// artifacts are absent (recoverable by the executor), or
    /// [`ProveError::Execution`] for any other pipeline failure.
    fn prove(&self, job: &ProofJob, sink: &dyn ProgressSink) -> Result<ProofResult, ProveError>;
}
