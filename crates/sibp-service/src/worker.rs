//! Worker pool: blocking pipeline execution under time limits.
//!
//! One delivery occupies one worker for its full duration. The pipeline
//! is CPU/IO-bound and runs on a blocking thread; the async side only
//! supervises the soft/hard time limits. Acknowledgment is late: the
//! delivery is acked only after the job is finalized in the store, so a
//! crashed worker causes redelivery instead of silent loss.

use std::sync::Arc;
use std::time::Duration;

use sibp_core::{ProofResult, ProveError};
use sibp_prover::ProofExecutor;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use crate::broker::BrokerConsumer;
use crate::store::{ResultStore, StoreProgress};

enum Outcome {
    Finished(Result<ProofResult, ProveError>),
    Panicked(JoinError),
    TimedOut,
}

/// Spawn `count` workers over one shared broker consumer.
#[must_use]
pub fn spawn_workers(
    count: usize,
    consumer: BrokerConsumer,
    store: Arc<dyn ResultStore>,
    executor: Arc<ProofExecutor>,
    soft_limit: Duration,
    hard_limit: Duration,
) -> Vec<JoinHandle<()>> {
    let consumer = Arc::new(Mutex::new(consumer));
    (0..count)
        .map(|idx| {
            let consumer = Arc::clone(&consumer);
            let store = Arc::clone(&store);
            let executor = Arc::clone(&executor);
            tokio::spawn(worker_loop(
                idx, consumer, store, executor, soft_limit, hard_limit,
            ))
        })
        .collect()
}

async fn worker_loop(
    idx: usize,
    consumer: Arc<Mutex<BrokerConsumer>>,
    store: Arc<dyn ResultStore>,
    executor: Arc<ProofExecutor>,
    soft_limit: Duration,
    hard_limit: Duration,
) {
    loop {
        let delivery = { consumer.lock().await.next().await };
        let Some(delivery) = delivery else {
            info!(worker = idx, "broker drained; worker exiting");
            break;
        };

        let job = delivery.job().clone();
        let job_id = job.id.clone();
        info!(worker = idx, job_id = %job_id, "job received");

        let task_store = Arc::clone(&store);
        let task_executor = Arc::clone(&executor);
        let mut handle = tokio::task::spawn_blocking(move || {
            let sink = StoreProgress::new(Arc::clone(&task_store), job.id.clone());
            task_executor.execute(&job, &sink)
        });

        match run_with_limits(&mut handle, soft_limit, hard_limit, &job_id).await {
            Outcome::Finished(Ok(result)) => store.complete(&job_id, result),
            Outcome::Finished(Err(err)) => {
                error!(job_id = %job_id, %err, "proof generation failed");
                store.fail(&job_id, &err.to_string());
            }
            Outcome::Panicked(err) => {
                error!(job_id = %job_id, %err, "proof task panicked");
                store.fail(&job_id, &format!("task panicked: {err}"));
            }
            Outcome::TimedOut => {
                error!(job_id = %job_id, "hard time limit exceeded");
                // The blocking thread cannot be killed; abandon it. Its
                // late writes are discarded by terminal-state immutability.
                handle.abort();
                store.fail(
                    &job_id,
                    &format!("hard time limit of {}s exceeded", hard_limit.as_secs()),
                );
            }
        }

        // Late acknowledgment: only after finalization.
        delivery.ack();
    }
}

async fn run_with_limits(
    handle: &mut JoinHandle<Result<ProofResult, ProveError>>,
    soft_limit: Duration,
    hard_limit: Duration,
    job_id: &str,
) -> Outcome {
    tokio::select! {
        res = &mut *handle => return classify(res),
        () = tokio::time::sleep(soft_limit) => {
            warn!(job_id = %job_id, "soft time limit exceeded; waiting for task to wind down");
        }
    }
    match tokio::time::timeout(hard_limit.saturating_sub(soft_limit), handle).await {
        Ok(res) => classify(res),
        Err(_) => Outcome::TimedOut,
    }
}

fn classify(res: Result<Result<ProofResult, ProveError>, JoinError>) -> Outcome {
    match res {
        Ok(inner) => Outcome::Finished(inner),
        Err(join_err) => Outcome::Panicked(join_err),
    }
}
