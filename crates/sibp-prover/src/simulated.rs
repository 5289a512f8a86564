//! Deterministic artifact-free stand-in pipeline.
//!
//! Produces a structurally indistinguishable proof payload when no real
//! artifacts or toolchain exist: same proof size class, same public-input
//! count, field-valid instances. Stage delays pace the pipeline like the
//! real one; they are configurable and zeroed in tests. Never touches the
//! filesystem.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sibp_core::{
    compute_sharpe, field_element_hex, round_dp, ExecutionMode, ProofJob, ProofResult, ProveError,
};

use crate::progress::ProgressSink;
use crate::strategy::ProvingStrategy;

/// Seed repetitions building the proof payload: 32 × 96 = 3072 bytes,
/// matching the real pipeline's typical proof size class.
pub const SIM_PROOF_SEED_REPEAT: usize = 96;

/// Public-instance count mirroring the real circuit: 30 inputs + 1 output.
pub const SIM_INSTANCE_COUNT: usize = 31;

/// Per-stage pacing delays (compile, witness, prove, verify).
#[derive(Debug, Clone, Copy)]
pub struct StageDelays(
    /// Delay applied before each of the four stage reports, in order.
    pub [Duration; 4],
);

impl StageDelays {
    /// Production pacing.
    #[must_use]
    pub fn standard() -> Self {
        Self([
            Duration::from_millis(1000),
            Duration::from_millis(800),
            Duration::from_millis(800),
            Duration::from_millis(400),
        ])
    }

    /// No pacing (tests).
    #[must_use]
    pub const fn none() -> Self {
        Self([Duration::ZERO; 4])
    }
}

impl Default for StageDelays {
    fn default() -> Self {
        Self::standard()
    }
}

/// The simulated proving pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedStrategy {
    delays: StageDelays,
}

impl SimulatedStrategy {
    /// Construct with explicit pacing.
    #[must_use]
    pub const fn new(delays: StageDelays) -> Self {
        Self { delays }
    }

    /// Deterministic entry point: identical `(job, ts)` pairs yield
    /// identical proof payloads and instances.
    pub fn prove_with_timestamp(
        &self,
        job: &ProofJob,
        sink: &dyn ProgressSink,
        ts: f64,
    ) -> Result<ProofResult, ProveError> {
        let start = Instant::now();

        const STAGES: [(u8, &str); 4] = [
            (25, "Compiling zkML circuit..."),
            (50, "Computing witness from daily returns..."),
            (75, "Generating KZG proof..."),
            (90, "Verifying proof locally..."),
        ];
        for (delay, (progress, message)) in self.delays.0.iter().zip(STAGES) {
            if !delay.is_zero() {
                thread::sleep(*delay);
            }
            sink.report(progress, message);
        }

        let sharpe = compute_sharpe(&job.returns);

        // Canonical seed payload: first 10 returns, the statistic, and the
        // submission timestamp.
        let head = &job.returns[..job.returns.len().min(10)];
        let payload =
            serde_json::json!({ "returns": head, "sharpe": sharpe, "ts": ts }).to_string();
        let seed = blake3::hash(payload.as_bytes());

        let mut proof = Vec::with_capacity(32 * SIM_PROOF_SEED_REPEAT);
        for _ in 0..SIM_PROOF_SEED_REPEAT {
            proof.extend_from_slice(seed.as_bytes());
        }
        let proof_hex = format!("0x{}", hex::encode(&proof));

        // Per-index discriminator, hashed and reduced into the scalar field
        // so every instance passes downstream range checks.
        let instances: Vec<String> = (0..SIM_INSTANCE_COUNT)
            .map(|i| {
                let h = blake3::hash(format!("inst_{i}_{sharpe}_{ts}").as_bytes());
                field_element_hex(h.as_bytes())
            })
            .collect();

        Ok(ProofResult {
            sharpe_ratio: round_dp(sharpe, 4),
            proof_hex,
            instances,
            verified: true,
            proving_time: round_dp(start.elapsed().as_secs_f64(), 2),
            mode: ExecutionMode::Simulated,
            job_id: String::new(),
            agent_id: String::new(),
        })
    }
}

impl ProvingStrategy for SimulatedStrategy {
    fn prove(&self, job: &ProofJob, sink: &dyn ProgressSink) -> Result<ProofResult, ProveError> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.prove_with_timestamp(job, sink, ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingSink;
    use sibp_core::{is_below_modulus, parse_instance_hex};

    fn job() -> ProofJob {
        ProofJob::new("job-1", "agent-1", vec![0.01, -0.005, 0.02, 0.0, -0.01])
    }

    fn run(ts: f64) -> ProofResult {
        SimulatedStrategy::new(StageDelays::none())
            .prove_with_timestamp(&job(), &RecordingSink::default(), ts)
            .unwrap()
    }

    #[test]
    fn proof_hex_size_class() {
        let r = run(1_700_000_000.0);
        // 0x prefix + 2 chars per byte over 3072 bytes.
        assert_eq!(r.proof_hex.len(), 2 + 2 * 32 * SIM_PROOF_SEED_REPEAT);
        assert!(hex::decode(&r.proof_hex[2..]).is_ok());
    }

    #[test]
    fn instances_are_field_valid() {
        let r = run(1_700_000_000.0);
        assert_eq!(r.instances.len(), SIM_INSTANCE_COUNT);
        for inst in &r.instances {
            let bytes = parse_instance_hex(inst).expect("canonical 32-byte hex");
            assert!(is_below_modulus(&bytes), "instance {inst} out of field");
        }
    }

    #[test]
    fn deterministic_for_fixed_timestamp() {
        let a = run(42.5);
        let b = run(42.5);
        assert_eq!(a.proof_hex, b.proof_hex);
        assert_eq!(a.instances, b.instances);

        let c = run(43.5);
        assert_ne!(a.proof_hex, c.proof_hex);
    }

    #[test]
    fn progress_is_strictly_increasing() {
        let sink = RecordingSink::default();
        SimulatedStrategy::new(StageDelays::none())
            .prove_with_timestamp(&job(), &sink, 0.0)
            .unwrap();
        let seen: Vec<u8> = sink.updates().iter().map(|(p, _)| *p).collect();
        assert_eq!(seen, vec![25, 50, 75, 90]);
    }

    #[test]
    fn always_reports_verified() {
        let r = run(7.0);
        assert!(r.verified);
        assert_eq!(r.mode, ExecutionMode::Simulated);
    }
}
