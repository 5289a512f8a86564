//! Result store: per-job-id state with a bounded retention window.
//!
//! The store is the only shared mutable resource in the service. Writes
//! are keyed per job id, the executor (through [`StoreProgress`]) is the
//! sole writer per key and the gateway the sole reader, so a plain
//! `RwLock<HashMap>` suffices.
//!
//! Semantics enforced here rather than by callers:
//! - progress is monotonically non-decreasing within an execution,
//! - a terminal record never changes (idempotent re-reads; late writes
//!   from an abandoned timed-out task are discarded),
//! - records expire after the retention window.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use sibp_core::{JobState, ProofResult};
use sibp_prover::ProgressSink;

/// One row of job state as seen by the gateway.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Current lifecycle state.
    pub state: JobState,
    /// 0–100, monotonically non-decreasing.
    pub progress: u8,
    /// Human-readable current-stage description.
    pub message: String,
    /// Attached on `Success` only.
    pub result: Option<ProofResult>,
    /// Attached on `Failure` only.
    pub error: Option<String>,
    updated_at: Instant,
}

impl JobRecord {
    fn processing(progress: u8, message: &str) -> Self {
        Self {
            state: JobState::Processing,
            progress,
            message: message.to_owned(),
            result: None,
            error: None,
            updated_at: Instant::now(),
        }
    }
}

/// Job-state storage keyed by job id.
pub trait ResultStore: Send + Sync {
    /// Look up a job; `None` for unknown or expired ids (≡ pending).
    fn get(&self, job_id: &str) -> Option<JobRecord>;

    /// Record a processing-stage update. Ignored once terminal; progress
    /// never decreases.
    fn update_progress(&self, job_id: &str, progress: u8, message: &str);

    /// Finalize as success. A second terminal write is a no-op.
    fn complete(&self, job_id: &str, result: ProofResult);

    /// Finalize as failure. A second terminal write is a no-op.
    fn fail(&self, job_id: &str, error: &str);
}

/// In-memory store with lazy expiry.
pub struct InMemoryStore {
    ttl: Duration,
    inner: RwLock<HashMap<String, JobRecord>>,
}

impl InMemoryStore {
    /// Create a store retaining records for `ttl` after their last write.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn finalize(&self, job_id: &str, record: JobRecord) {
        let Ok(mut map) = self.inner.write() else {
            return;
        };
        match map.get(job_id) {
            // Terminal states are immutable; duplicate finalization
            // (broker redelivery) keeps the first result.
            Some(existing) if existing.state.is_terminal() => {}
            _ => {
                map.insert(job_id.to_owned(), record);
            }
        }
    }
}

impl ResultStore for InMemoryStore {
    fn get(&self, job_id: &str) -> Option<JobRecord> {
        let expired = {
            let map = self.inner.read().ok()?;
            let record = map.get(job_id)?;
            if record.updated_at.elapsed() <= self.ttl {
                return Some(record.clone());
            }
            true
        };
        if expired {
            if let Ok(mut map) = self.inner.write() {
                map.remove(job_id);
            }
        }
        None
    }

    fn update_progress(&self, job_id: &str, progress: u8, message: &str) {
        let Ok(mut map) = self.inner.write() else {
            return;
        };
        match map.get_mut(job_id) {
            Some(record) if record.state.is_terminal() => {}
            Some(record) if record.progress > progress => {}
            Some(record) => {
                record.progress = progress;
                record.message = message.to_owned();
                record.updated_at = Instant::now();
            }
            None => {
                map.insert(job_id.to_owned(), JobRecord::processing(progress, message));
            }
        }
    }

    fn complete(&self, job_id: &str, result: ProofResult) {
        self.finalize(
            job_id,
            JobRecord {
                state: JobState::Success,
                progress: 100,
                message: "Proof generation complete".to_owned(),
                result: Some(result),
                error: None,
                updated_at: Instant::now(),
            },
        );
    }

    fn fail(&self, job_id: &str, error: &str) {
        self.finalize(
            job_id,
            JobRecord {
                state: JobState::Failure,
                progress: 0,
                message: error.to_owned(),
                result: None,
                error: Some(error.to_owned()),
                updated_at: Instant::now(),
            },
        );
    }
}

/// Bridges the executor's progress reports into the store.
pub struct StoreProgress {
    store: Arc<dyn ResultStore>,
    job_id: String,
}

impl StoreProgress {
    /// Bind a sink to one job id.
    #[must_use]
    pub fn new(store: Arc<dyn ResultStore>, job_id: impl Into<String>) -> Self {
        Self {
            store,
            job_id: job_id.into(),
        }
    }
}

impl ProgressSink for StoreProgress {
    fn report(&self, progress: u8, message: &str) {
        self.store.update_progress(&self.job_id, progress, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibp_core::ExecutionMode;

    fn result() -> ProofResult {
        ProofResult {
            sharpe_ratio: 1.0,
            proof_hex: "0xab".to_owned(),
            instances: vec![],
            verified: true,
            proving_time: 0.1,
            mode: ExecutionMode::Simulated,
            job_id: "j".to_owned(),
            agent_id: "a".to_owned(),
        }
    }

    #[test]
    fn progress_is_monotonic() {
        let store = InMemoryStore::new(Duration::from_secs(60));
        store.update_progress("j", 30, "witness");
        store.update_progress("j", 10, "stale");
        let rec = store.get("j").unwrap();
        assert_eq!(rec.progress, 30);
        assert_eq!(rec.message, "witness");
    }

    #[test]
    fn terminal_records_are_immutable() {
        let store = InMemoryStore::new(Duration::from_secs(60));
        store.complete("j", result());
        store.fail("j", "late failure");
        store.update_progress("j", 99, "late progress");
        let rec = store.get("j").unwrap();
        assert_eq!(rec.state, JobState::Success);
        assert_eq!(rec.progress, 100);
        assert!(rec.result.is_some());
    }

    #[test]
    fn duplicate_completion_keeps_first() {
        let store = InMemoryStore::new(Duration::from_secs(60));
        store.complete("j", result());
        let mut second = result();
        second.sharpe_ratio = 9.9;
        store.complete("j", second);
        assert_eq!(store.get("j").unwrap().result.unwrap().sharpe_ratio, 1.0);
    }

    #[test]
    fn idempotent_reads() {
        let store = InMemoryStore::new(Duration::from_secs(60));
        store.complete("j", result());
        let a = store.get("j").unwrap();
        let b = store.get("j").unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.progress, b.progress);
    }

    #[test]
    fn records_expire() {
        let store = InMemoryStore::new(Duration::ZERO);
        store.complete("j", result());
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get("j").is_none());
    }

    #[test]
    fn unknown_id_is_none() {
        let store = InMemoryStore::new(Duration::from_secs(60));
        assert!(store.get("nope").is_none());
    }
}
