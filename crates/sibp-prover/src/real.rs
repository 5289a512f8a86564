//! Real proving pipeline against pre-generated on-disk artifacts.
//!
//! Steps: normalize input → witness → prove → verify → extract outputs.
//! Every step reports progress before invoking the engine, and all
//! intermediate files (normalized input, witness, proof) live in a scoped
//! temp directory removed on every exit path.

use std::fs;
use std::time::Instant;

use anyhow::Context;
use serde::Deserialize;
use sibp_core::{compute_sharpe, round_dp, ExecutionMode, ProofJob, ProofResult, ProveError};
use tracing::info;

use crate::artifacts::{fit_to_circuit_width, ArtifactLayout};
use crate::engine::ProvingEngine;
use crate::progress::ProgressSink;
use crate::strategy::ProvingStrategy;

/// Proof artifact as emitted by the toolchain.
///
/// `hex_proof` is the ready-made `0x`-prefixed encoding; `proof` is the raw
/// byte array we fall back to hex-encoding ourselves. Public instances are
/// taken from the **pretty** (big-endian, canonical) representation; the
/// raw `instances` field is little-endian and would fail downstream field
/// range checks.
#[derive(Debug, Deserialize)]
struct ProofFile {
    #[serde(default)]
    hex_proof: Option<String>,
    #[serde(default)]
    proof: Option<Vec<u8>>,
    #[serde(default)]
    pretty_public_inputs: Option<PrettyPublicInputs>,
}

#[derive(Debug, Deserialize)]
struct PrettyPublicInputs {
    #[serde(default)]
    inputs: Vec<Vec<String>>,
}

/// Pipeline over real artifacts through a [`ProvingEngine`].
pub struct RealStrategy<'e> {
    engine: &'e dyn ProvingEngine,
    layout: ArtifactLayout,
}

impl<'e> RealStrategy<'e> {
    /// Bind the strategy to an engine and artifact layout.
    #[must_use]
    pub fn new(engine: &'e dyn ProvingEngine, layout: ArtifactLayout) -> Self {
        Self { engine, layout }
    }
}

impl ProvingStrategy for RealStrategy<'_> {
    fn prove(&self, job: &ProofJob, sink: &dyn ProgressSink) -> Result<ProofResult, ProveError> {
        let start = Instant::now();

        // Aggregated up-front check; nothing below runs with a partial layout.
        self.layout.check_required()?;

        let norm = self.layout.load_norm_params()?;
        let normalized = norm.apply(&fit_to_circuit_width(&job.returns));

        let tmp = tempfile::Builder::new()
            .prefix("sib_proof_")
            .tempdir()
            .context("creating scratch directory")?;
        let input_path = tmp.path().join("input.json");
        let witness_path = tmp.path().join("witness.json");
        let proof_path = tmp.path().join("proof.json");

        let input = serde_json::json!({ "input_data": [normalized] });
        fs::write(&input_path, serde_json::to_vec(&input).context("encoding input")?)
            .with_context(|| format!("writing {}", input_path.display()))?;

        sink.report(30, "Generating witness from returns data...");
        info!(job_id = %job.id, "generating witness");
        self.engine
            .gen_witness(&input_path, &self.layout.circuit(), &witness_path)?;

        sink.report(60, "Generating KZG proof...");
        info!(job_id = %job.id, "generating proof");
        self.engine.prove(
            &witness_path,
            &self.layout.circuit(),
            &self.layout.proving_key(),
            &proof_path,
            &self.layout.srs(),
        )?;

        sink.report(85, "Verifying proof locally...");
        info!(job_id = %job.id, "verifying proof");
        let verified = self.engine.verify(
            &proof_path,
            &self.layout.settings(),
            &self.layout.verification_key(),
            &self.layout.srs(),
        )?;

        let raw = fs::read(&proof_path)
            .with_context(|| format!("reading proof artifact {}", proof_path.display()))?;
        let proof_file: ProofFile =
            serde_json::from_slice(&raw).context("parsing proof artifact")?;

        let proof_hex = proof_file
            .hex_proof
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("0x{}", hex::encode(proof_file.proof.unwrap_or_default())));
        let instances = proof_file
            .pretty_public_inputs
            .and_then(|ppi| ppi.inputs.into_iter().next())
            .unwrap_or_default();

        // The statistic always comes from the raw submitted returns, not
        // the quantized circuit input.
        let sharpe = compute_sharpe(&job.returns);

        Ok(ProofResult {
            sharpe_ratio: round_dp(sharpe, 4),
            proof_hex,
            instances,
            verified,
            proving_time: round_dp(start.elapsed().as_secs_f64(), 2),
            mode: ExecutionMode::Real,
            job_id: String::new(),
            agent_id: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_file_prefers_hex_proof() {
        let raw = serde_json::json!({
            "hex_proof": "0xabcd",
            "proof": [1, 2, 3],
            "pretty_public_inputs": { "inputs": [["0x01", "0x02"]] }
        });
        let pf: ProofFile = serde_json::from_value(raw).unwrap();
        assert_eq!(pf.hex_proof.as_deref(), Some("0xabcd"));
        assert_eq!(pf.proof.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(
            pf.pretty_public_inputs.unwrap().inputs[0],
            vec!["0x01", "0x02"]
        );
    }

    #[test]
    fn proof_file_tolerates_missing_fields() {
        let pf: ProofFile = serde_json::from_str("{}").unwrap();
        assert!(pf.hex_proof.is_none());
        assert!(pf.proof.is_none());
        assert!(pf.pretty_public_inputs.is_none());
    }
}
