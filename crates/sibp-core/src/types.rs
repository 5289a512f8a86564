//! Canonical core types used across the sib-prover workspace.
//!
//! These live in `sibp-core` and are broadly re-exported at the crate root
//! so other crates can import via `sibp_core::ProofJob`, `sibp_core::JobState`, etc.
//!
//! The design aims to keep serialized forms conservative and portable (serde).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One proof request as dispatched to a worker.
///
/// Immutable once submitted: the gateway assigns `id` exactly once and the
/// `returns` series is never mutated downstream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProofJob {
    /// Opaque unique identifier, assigned by the gateway; used as the
    /// task/result key end-to-end.
    pub id: String,
    /// Opaque agent label (1–200 chars), carried through unchanged.
    pub agent_id: String,
    /// Daily returns series (1–365 values).
    pub returns: Vec<f64>,
}

impl ProofJob {
    /// Construct a new job (no validation; the gateway validates bounds).
    #[must_use]
    pub fn new(id: impl Into<String>, agent_id: impl Into<String>, returns: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            agent_id: agent_id.into(),
            returns,
        }
    }
}

/// Closed job lifecycle state as recorded in the result store.
///
/// `Pending` is implicit (no record exists yet); the executor writes
/// `Processing` updates and exactly one terminal `Success`/`Failure`.
/// No transition out of a terminal state is permitted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    /// Queued, not yet picked up by a worker.
    Pending,
    /// A worker is executing the pipeline; progress/message are live.
    Processing,
    /// Terminal: the pipeline completed and a result is attached.
    Success,
    /// Terminal: the pipeline failed and an error message is attached.
    Failure,
}

impl JobState {
    /// Whether this state is terminal (no further transitions allowed).
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// Which strategy actually executed, not which was requested.
///
/// `SimulatedFallback` records that the real strategy was selected but
/// aborted on missing artifacts before any side effect, and the simulated
/// strategy ran in its place.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// The real proving pipeline ran against on-disk artifacts.
    #[serde(rename = "real")]
    Real,
    /// The simulated pipeline ran (configured, or engine unavailable).
    #[serde(rename = "simulated")]
    Simulated,
    /// The real pipeline was selected but fell back to simulated.
    #[serde(rename = "simulated (fallback)")]
    SimulatedFallback,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Real => "real",
            Self::Simulated => "simulated",
            Self::SimulatedFallback => "simulated (fallback)",
        };
        f.write_str(s)
    }
}

/// The payload attached to a successful job.
///
/// **Invariants**
/// - `instances` entries are `0x`-prefixed 32-byte big-endian hex strings,
///   each strictly below the BN254 scalar-field modulus.
/// - `mode` reflects the strategy that actually executed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProofResult {
    /// Annualized Sharpe ratio of the raw submitted returns, rounded to
    /// 4 decimal places.
    pub sharpe_ratio: f64,
    /// `0x`-prefixed hex encoding of the proof bytes.
    pub proof_hex: String,
    /// Public instances in canonical big-endian field encoding.
    pub instances: Vec<String>,
    /// Whether local verification succeeded (always `true` in simulated mode).
    pub verified: bool,
    /// Elapsed wall-clock seconds, rounded to 2 decimals.
    pub proving_time: f64,
    /// Strategy that actually executed.
    pub mode: ExecutionMode,
    /// Job id stamped by the executor on success.
    #[serde(default)]
    pub job_id: String,
    /// Agent label stamped by the executor on success.
    #[serde(default)]
    pub agent_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Success.is_terminal());
        assert!(JobState::Failure.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Processing.is_terminal());
    }

    #[test]
    fn mode_wire_names() {
        let ser = |m: ExecutionMode| serde_json::to_string(&m).unwrap();
        assert_eq!(ser(ExecutionMode::Real), "\"real\"");
        assert_eq!(ser(ExecutionMode::Simulated), "\"simulated\"");
        assert_eq!(
            ser(ExecutionMode::SimulatedFallback),
            "\"simulated (fallback)\""
        );
        let de: ExecutionMode = serde_json::from_str("\"simulated (fallback)\"").unwrap();
        assert_eq!(de, ExecutionMode::SimulatedFallback);
    }

    #[test]
    fn proof_result_roundtrip() {
        let r = ProofResult {
            sharpe_ratio: 1.2345,
            proof_hex: "0xdeadbeef".to_owned(),
            instances: vec!["0x01".to_owned()],
            verified: true,
            proving_time: 3.21,
            mode: ExecutionMode::Simulated,
            job_id: "j1".to_owned(),
            agent_id: "a1".to_owned(),
        };
        let ser = serde_json::to_string(&r).unwrap();
        let de: ProofResult = serde_json::from_str(&ser).unwrap();
        assert_eq!(de, r);
    }
}
