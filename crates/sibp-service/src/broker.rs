//! Late-acknowledgment in-process job broker.
//!
//! Dispatch is at-least-once: a [`Delivery`] holds the job until the
//! worker explicitly acknowledges it **after** finalization. Dropping an
//! un-acked delivery (worker crash, panic) requeues the job for another
//! worker, so a crash causes redelivery rather than silent loss. Callers
//! therefore treat duplicate execution of an already-finalized job id as
//! an idempotent store overwrite, which the store guarantees.

use anyhow::{anyhow, Result};
use sibp_core::ProofJob;
use tokio::sync::mpsc;

/// Dispatch side of the broker, held by the gateway.
pub trait JobBroker: Send + Sync {
    /// Enqueue a job for the worker pool. An error here means the broker
    /// is unreachable; the gateway surfaces it as a service-unavailable
    /// response and no job record is created.
    fn dispatch(&self, job: ProofJob) -> Result<()>;
}

/// In-process channel-backed broker.
pub struct ChannelBroker {
    tx: mpsc::UnboundedSender<ProofJob>,
}

impl ChannelBroker {
    /// Create the broker and its consumer half.
    #[must_use]
    pub fn new() -> (Self, BrokerConsumer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let consumer = BrokerConsumer {
            rx,
            requeue: tx.clone(),
        };
        (Self { tx }, consumer)
    }
}

impl JobBroker for ChannelBroker {
    fn dispatch(&self, job: ProofJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| anyhow!("job broker unavailable (worker pool shut down)"))
    }
}

/// Consumer half, shared by the worker pool behind a lock.
pub struct BrokerConsumer {
    rx: mpsc::UnboundedReceiver<ProofJob>,
    requeue: mpsc::UnboundedSender<ProofJob>,
}

impl BrokerConsumer {
    /// Wait for the next delivery. `None` when the broker is gone and the
    /// queue has drained.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await.map(|job| Delivery {
            job: Some(job),
            requeue: self.requeue.clone(),
        })
    }
}

/// One in-flight job. Acknowledge after finalization; dropping without
/// acknowledging requeues the job.
pub struct Delivery {
    job: Option<ProofJob>,
    requeue: mpsc::UnboundedSender<ProofJob>,
}

impl Delivery {
    /// The job carried by this delivery.
    ///
    /// # Panics
    /// Never: the job is only taken on ack/drop, which consume `self`.
    #[must_use]
    pub fn job(&self) -> &ProofJob {
        self.job.as_ref().expect("delivery still holds its job")
    }

    /// Mark the job consumed; no redelivery will happen.
    pub fn ack(mut self) {
        self.job = None;
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            // Un-acked: hand the job back for redelivery.
            let _ = self.requeue.send(job);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> ProofJob {
        ProofJob::new(id, "agent", vec![0.01, 0.02])
    }

    #[tokio::test]
    async fn dispatch_and_ack() {
        let (broker, mut consumer) = ChannelBroker::new();
        broker.dispatch(job("a")).unwrap();

        let delivery = consumer.next().await.unwrap();
        assert_eq!(delivery.job().id, "a");
        delivery.ack();

        // Acked: nothing left to deliver.
        broker.dispatch(job("b")).unwrap();
        assert_eq!(consumer.next().await.unwrap().job().id, "b");
    }

    #[tokio::test]
    async fn dropped_delivery_is_redelivered() {
        let (broker, mut consumer) = ChannelBroker::new();
        broker.dispatch(job("a")).unwrap();

        let delivery = consumer.next().await.unwrap();
        drop(delivery);

        let redelivered = consumer.next().await.unwrap();
        assert_eq!(redelivered.job().id, "a");
        redelivered.ack();
    }

    #[tokio::test]
    async fn dispatch_after_shutdown_errors() {
        let (broker, consumer) = ChannelBroker::new();
        drop(consumer);
        let err = broker.dispatch(job("a")).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}
