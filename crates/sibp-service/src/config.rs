//! Environment-derived service configuration.
//!
//! Everything is read once at startup and injected into the components
//! that need it; nothing downstream re-reads the environment. Retention
//! and task time limits are deployment constants, not knobs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use sibp_prover::ConfiguredMode;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "sib-prover";

/// Result-store retention window.
pub const RESULT_EXPIRES: Duration = Duration::from_secs(3600);

/// Hard wall-clock limit per task; expiry finalizes the job as failed.
pub const TASK_TIME_LIMIT: Duration = Duration::from_secs(300);

/// Soft limit: the task's opportunity to wind down cooperatively.
pub const TASK_SOFT_TIME_LIMIT: Duration = Duration::from_secs(270);

/// Startup configuration for the gateway and worker pool.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Message-broker address (reported by `/health`).
    pub broker_url: String,
    /// Result-backend address.
    pub backend_url: String,
    /// Requested execution mode; the effective mode also depends on the
    /// engine probe.
    pub mode: ConfiguredMode,
    /// Directory holding the pre-generated model artifacts.
    pub model_dir: PathBuf,
    /// HTTP bind address.
    pub bind_addr: String,
    /// Worker-pool size.
    pub workers: usize,
    /// Result retention window.
    pub result_expires: Duration,
    /// Hard per-task wall-clock limit.
    pub hard_time_limit: Duration,
    /// Soft per-task wall-clock limit.
    pub soft_time_limit: Duration,
}

impl ServiceConfig {
    /// Build from the process environment, falling back to development
    /// defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_owned());
        Self {
            broker_url: var("CELERY_BROKER", "redis://localhost:6379/0"),
            backend_url: var("CELERY_BACKEND", "redis://localhost:6379/1"),
            mode: ConfiguredMode::parse(&var("EZKL_MODE", "simulated")),
            model_dir: PathBuf::from(var("MODEL_DIR", "model")),
            bind_addr: var("BIND_ADDR", "127.0.0.1:8000"),
            workers: var("WORKER_CONCURRENCY", "2").parse().unwrap_or(2),
            result_expires: RESULT_EXPIRES,
            hard_time_limit: TASK_TIME_LIMIT,
            soft_time_limit: TASK_SOFT_TIME_LIMIT,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            broker_url: "redis://localhost:6379/0".to_owned(),
            backend_url: "redis://localhost:6379/1".to_owned(),
            mode: ConfiguredMode::Simulated,
            model_dir: PathBuf::from("model"),
            bind_addr: "127.0.0.1:8000".to_owned(),
            workers: 2,
            result_expires: RESULT_EXPIRES,
            hard_time_limit: TASK_TIME_LIMIT,
            soft_time_limit: TASK_SOFT_TIME_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_simulated() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.mode, ConfiguredMode::Simulated);
        assert_eq!(cfg.result_expires, Duration::from_secs(3600));
        assert!(cfg.soft_time_limit < cfg.hard_time_limit);
    }
}
