//! sibp-prover — the dual-strategy proof execution pipeline.
//!
//! This crate implements the worker-side half of the service:
//! - the [`ProvingEngine`] adapter over the external `ezkl` toolchain
//!   (one capability: run a proving operation, block until complete),
//! - the model-artifact layout with an aggregated missing-artifact check,
//! - the **real** strategy (normalize → witness → prove → verify → extract),
//! - the **simulated** strategy (artifact-free, deterministic, field-valid
//!   public instances), and
//! - the [`ProofExecutor`] that selects a strategy, reports progress, and
//!   recovers locally from missing artifacts by re-running simulation.
//!
//! ```no_run
//! use sibp_core::ProofJob;
//! use sibp_prover::{ConfiguredMode, NullSink, ProofExecutor};
//!
//! let exec = ProofExecutor::simulated_only(ConfiguredMode::Simulated);
//! let job = ProofJob::new("j1", "agent-1", vec![0.01, -0.02, 0.03]);
//! let result = exec.execute(&job, &NullSink)?;
//! assert!(result.verified);
//! # Ok::<(), sibp_core::ProveError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Model-artifact layout and normalization parameters.
pub mod artifacts;
/// Adapter trait over the external proving toolchain + `ezkl` CLI impl.
pub mod engine;
/// The proof executor: strategy selection, fallback, result stamping.
pub mod executor;
/// Progress reporting across the worker/store boundary.
pub mod progress;
/// Real proving pipeline against on-disk artifacts.
pub mod real;
/// Deterministic artifact-free stand-in pipeline.
pub mod simulated;
/// The strategy seam both pipelines implement.
pub mod strategy;

// ---- Re-exports for workspace compatibility ----
pub use artifacts::*;
pub use engine::*;
pub use executor::*;
pub use progress::*;
pub use real::*;
pub use simulated::*;
pub use strategy::*;
