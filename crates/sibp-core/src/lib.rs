//! sibp-core — shared types and pure logic for the sib-prover service.
//!
//! This crate defines the **stable boundary** used across sib-prover crates:
//! - canonical data types (`ProofJob`, `JobState`, `ProofResult`, …),
//! - the annualized Sharpe-ratio calculator used identically by both
//!   proving strategies,
//! - canonical big-endian BN254 scalar-field hex encoding, and
//! - the typed error taxonomy the executor's fallback logic matches on.
//!
//! ```
//! use sibp_core::{compute_sharpe, ProofJob};
//!
//! let job = ProofJob::new("job-1", "agent-7", vec![0.01, -0.005, 0.02]);
//! let sharpe = compute_sharpe(&job.returns);
//! assert!(sharpe.is_finite());
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Typed error taxonomy shared by the proving pipeline.
pub mod error;
/// BN254 scalar-field hash-to-field reduction and canonical hex encoding.
pub mod field;
/// Annualized Sharpe-ratio calculator and numeric helpers.
pub mod sharpe;
/// Canonical core data types shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use error::*;
pub use field::*;
pub use sharpe::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use sibp_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        error::ProveError, sharpe::compute_sharpe, types::ExecutionMode, types::JobState,
        types::ProofJob, types::ProofResult,
    };
}
