//! HTTP surface: submission, polling, health.
//!
//! Validation happens entirely at this boundary: a malformed submission
//! is rejected before any job id is allocated and never reaches the
//! executor. The record → client-view translation lives in one place,
//! [`status_view`], keyed off the closed [`JobState`] enum.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sibp_core::{ExecutionMode, JobState, ProofJob, ProofResult};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::broker::JobBroker;
use crate::config::SERVICE_NAME;
use crate::store::{JobRecord, ResultStore};

/// Shared handler state, assembled once in `main`.
#[derive(Clone)]
pub struct AppState {
    /// Result store (gateway is its sole reader).
    pub store: Arc<dyn ResultStore>,
    /// Job dispatch.
    pub broker: Arc<dyn JobBroker>,
    /// Broker address, echoed by `/health`.
    pub broker_url: String,
    /// Startup probe outcome.
    pub ezkl_available: bool,
    /// Toolchain version when available.
    pub ezkl_version: Option<String>,
    /// Mode that will actually execute (configured ∧ available).
    pub effective_mode: ExecutionMode,
}

/// Proof submission body.
#[derive(Debug, Deserialize)]
pub struct ProveRequest {
    /// Opaque agent label (1–200 chars).
    pub agent_id: String,
    /// Daily returns series (1–365 values).
    pub returns: Vec<f64>,
}

/// Accepted-submission response.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Fresh job id to poll.
    pub job_id: String,
    /// Echoed agent label.
    pub agent_id: String,
    /// Always `"pending"` at submission.
    pub status: &'static str,
    /// Human-readable dispatch note.
    pub message: &'static str,
}

/// Client-facing job status.
#[derive(Debug, Serialize)]
pub struct JobStatusView {
    /// Polled job id.
    pub job_id: String,
    /// `pending` / `processing` / `completed` / `failed`.
    pub status: &'static str,
    /// 0–100.
    pub progress: u8,
    /// Current-stage description or failure text.
    pub message: String,
    /// Full proof payload, present on `completed` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProofResult>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    ezkl_available: bool,
    ezkl_version: Option<String>,
    ezkl_mode: ExecutionMode,
    celery_broker: String,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prove", post(submit))
        .route("/prove/:job_id", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a store lookup to the client-facing view. The single place raw
/// state becomes a status string.
#[must_use]
pub fn status_view(job_id: &str, record: Option<JobRecord>) -> JobStatusView {
    let pending = || JobStatusView {
        job_id: job_id.to_owned(),
        status: "pending",
        progress: 0,
        message: "Job queued, waiting for worker...".to_owned(),
        result: None,
    };
    let Some(record) = record else {
        return pending();
    };
    match record.state {
        JobState::Pending => pending(),
        JobState::Processing => JobStatusView {
            job_id: job_id.to_owned(),
            status: "processing",
            progress: record.progress,
            message: record.message,
            result: None,
        },
        JobState::Success => JobStatusView {
            job_id: job_id.to_owned(),
            status: "completed",
            progress: 100,
            message: "Proof generation complete".to_owned(),
            result: record.result,
        },
        JobState::Failure => JobStatusView {
            job_id: job_id.to_owned(),
            status: "failed",
            progress: 0,
            message: record.error.unwrap_or_else(|| "Unknown error".to_owned()),
            result: None,
        },
    }
}

fn validate(req: &ProveRequest) -> Result<(), String> {
    let agent_len = req.agent_id.chars().count();
    if !(1..=200).contains(&agent_len) {
        return Err(format!(
            "agent_id must be 1-200 characters, got {agent_len}"
        ));
    }
    if !(1..=365).contains(&req.returns.len()) {
        return Err(format!(
            "returns must hold 1-365 values, got {}",
            req.returns.len()
        ));
    }
    Ok(())
}

fn new_job_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        ezkl_available: state.ezkl_available,
        ezkl_version: state.ezkl_version.clone(),
        ezkl_mode: state.effective_mode,
        celery_broker: state.broker_url.clone(),
    })
}

async fn submit(
    State(state): State<AppState>,
    Json(req): Json<ProveRequest>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(msg) = validate(&req) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse { error: msg }),
        ));
    }

    let job_id = new_job_id();
    info!(job_id = %job_id, agent_id = %req.agent_id, n_returns = req.returns.len(), "submitting proof job");

    let job = ProofJob::new(job_id.clone(), req.agent_id.clone(), req.returns);
    if let Err(err) = state.broker.dispatch(job) {
        warn!(job_id = %job_id, %err, "dispatch failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: format!("Worker unavailable: {err}"),
            }),
        ));
    }

    Ok(Json(SubmitResponse {
        job_id,
        agent_id: req.agent_id,
        status: "pending",
        message: "Proof job dispatched to worker",
    }))
}

async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<JobStatusView> {
    Json(status_view(&job_id, state.store.get(&job_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_bounds() {
        let ok = ProveRequest {
            agent_id: "a".to_owned(),
            returns: vec![0.01],
        };
        assert!(validate(&ok).is_ok());

        let empty_agent = ProveRequest {
            agent_id: String::new(),
            returns: vec![0.01],
        };
        assert!(validate(&empty_agent).is_err());

        let long_agent = ProveRequest {
            agent_id: "x".repeat(201),
            returns: vec![0.01],
        };
        assert!(validate(&long_agent).is_err());

        let too_many = ProveRequest {
            agent_id: "a".to_owned(),
            returns: vec![0.0; 366],
        };
        assert!(validate(&too_many).is_err());

        let none = ProveRequest {
            agent_id: "a".to_owned(),
            returns: vec![],
        };
        assert!(validate(&none).is_err());
    }

    #[test]
    fn job_ids_are_short_and_unique() {
        let a = new_job_id();
        let b = new_job_id();
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_record_maps_to_pending() {
        let view = status_view("j1", None);
        assert_eq!(view.status, "pending");
        assert_eq!(view.progress, 0);
        assert!(view.result.is_none());
    }

    #[test]
    fn record_states_map_to_client_statuses() {
        use crate::store::InMemoryStore;
        use std::time::Duration;

        let store = InMemoryStore::new(Duration::from_secs(60));

        store.update_progress("j1", 60, "Generating KZG proof...");
        let view = status_view("j1", store.get("j1"));
        assert_eq!(view.status, "processing");
        assert_eq!(view.progress, 60);
        assert_eq!(view.message, "Generating KZG proof...");

        store.complete(
            "j2",
            ProofResult {
                sharpe_ratio: 0.5,
                proof_hex: "0xab".to_owned(),
                instances: vec![],
                verified: true,
                proving_time: 0.0,
                mode: ExecutionMode::Simulated,
                job_id: "j2".to_owned(),
                agent_id: "a".to_owned(),
            },
        );
        let view = status_view("j2", store.get("j2"));
        assert_eq!(view.status, "completed");
        assert_eq!(view.progress, 100);
        assert!(view.result.is_some());

        store.fail("j3", "circuit exploded");
        let view = status_view("j3", store.get("j3"));
        assert_eq!(view.status, "failed");
        assert_eq!(view.progress, 0);
        assert_eq!(view.message, "circuit exploded");
    }
}
