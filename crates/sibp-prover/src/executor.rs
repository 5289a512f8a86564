//! The proof executor: strategy selection, local fallback, result stamping.
//!
//! Selection happens once per job from configuration injected at
//! construction: the real strategy runs iff the deployment is configured
//! for real mode **and** the proving engine probed available at process
//! start. The only permitted retry is the local missing-artifact fallback
//! to simulation; every other error propagates to finalize the job as a
//! failure.

use std::sync::Arc;

use sibp_core::{ExecutionMode, ProofJob, ProofResult, ProveError};
use tracing::{info, warn};

use crate::artifacts::ArtifactLayout;
use crate::engine::ProvingEngine;
use crate::progress::ProgressSink;
use crate::real::RealStrategy;
use crate::simulated::{SimulatedStrategy, StageDelays};
use crate::strategy::ProvingStrategy;

/// Deployment-configured execution mode (what was *requested*, as opposed
/// to [`ExecutionMode`], which records what actually ran).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfiguredMode {
    /// Run the real pipeline when the engine is available.
    Real,
    /// Always simulate.
    Simulated,
}

impl ConfiguredMode {
    /// Parse the `EZKL_MODE`-style setting; anything other than `"real"`
    /// means simulated.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("real") {
            Self::Real
        } else {
            Self::Simulated
        }
    }
}

/// Task body for one proof job.
pub struct ProofExecutor {
    mode: ConfiguredMode,
    engine: Option<Arc<dyn ProvingEngine>>,
    layout: ArtifactLayout,
    delays: StageDelays,
}

impl ProofExecutor {
    /// Construct with explicit configuration. `engine` carries the
    /// startup probe outcome: `None` means the toolchain is unavailable
    /// and simulation runs regardless of `mode`.
    #[must_use]
    pub fn new(
        mode: ConfiguredMode,
        engine: Option<Arc<dyn ProvingEngine>>,
        layout: ArtifactLayout,
        delays: StageDelays,
    ) -> Self {
        Self {
            mode,
            engine,
            layout,
            delays,
        }
    }

    /// Engine-less executor (development/demo deployments).
    #[must_use]
    pub fn simulated_only(mode: ConfiguredMode) -> Self {
        Self::new(mode, None, ArtifactLayout::new("model"), StageDelays::standard())
    }

    /// The mode that will actually execute, for health reporting:
    /// `Real` only when configured real *and* the engine is available.
    #[must_use]
    pub fn effective_mode(&self) -> ExecutionMode {
        if self.mode == ConfiguredMode::Real && self.engine.is_some() {
            ExecutionMode::Real
        } else {
            ExecutionMode::Simulated
        }
    }

    /// Run exactly one strategy to completion for `job` (plus the one
    /// permitted fallback), stamping the result with the job identity.
    pub fn execute(
        &self,
        job: &ProofJob,
        sink: &dyn ProgressSink,
    ) -> Result<ProofResult, ProveError> {
        info!(
            job_id = %job.id,
            agent_id = %job.agent_id,
            n_returns = job.returns.len(),
            mode = %self.effective_mode(),
            "starting proof job"
        );
        sink.report(10, "Initializing proof pipeline...");

        let sim = SimulatedStrategy::new(self.delays);
        let mut result = match (&self.engine, self.mode) {
            (Some(engine), ConfiguredMode::Real) => {
                let real = RealStrategy::new(engine.as_ref(), self.layout.clone());
                match real.prove(job, sink) {
                    Err(err) if err.is_recoverable() => {
                        warn!(job_id = %job.id, %err, "falling back to simulated proving");
                        let mut r = sim.prove(job, sink)?;
                        r.mode = ExecutionMode::SimulatedFallback;
                        r
                    }
                    other => other?,
                }
            }
            _ => sim.prove(job, sink)?,
        };

        result.job_id = job.id.clone();
        result.agent_id = job.agent_id.clone();

        info!(
            job_id = %job.id,
            sharpe = result.sharpe_ratio,
            verified = result.verified,
            mode = %result.mode,
            proving_time = result.proving_time,
            "proof job complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingSink;

    #[test]
    fn parse_mode() {
        assert_eq!(ConfiguredMode::parse("real"), ConfiguredMode::Real);
        assert_eq!(ConfiguredMode::parse("REAL"), ConfiguredMode::Real);
        assert_eq!(ConfiguredMode::parse("simulated"), ConfiguredMode::Simulated);
        assert_eq!(ConfiguredMode::parse("anything"), ConfiguredMode::Simulated);
    }

    #[test]
    fn effective_mode_requires_engine() {
        let exec = ProofExecutor::new(
            ConfiguredMode::Real,
            None,
            ArtifactLayout::new("model"),
            StageDelays::none(),
        );
        assert_eq!(exec.effective_mode(), ExecutionMode::Simulated);
    }

    #[test]
    fn simulated_execution_stamps_identity() {
        let exec = ProofExecutor::new(
            ConfiguredMode::Simulated,
            None,
            ArtifactLayout::new("model"),
            StageDelays::none(),
        );
        let job = ProofJob::new("j-42", "agent-9", vec![0.01, 0.02, -0.01]);
        let sink = RecordingSink::default();
        let result = exec.execute(&job, &sink).unwrap();

        assert_eq!(result.job_id, "j-42");
        assert_eq!(result.agent_id, "agent-9");
        assert_eq!(result.mode, ExecutionMode::Simulated);

        let progress: Vec<u8> = sink.updates().iter().map(|(p, _)| *p).collect();
        assert_eq!(progress, vec![10, 25, 50, 75, 90]);
    }
}
