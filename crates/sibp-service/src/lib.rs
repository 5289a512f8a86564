//! sibp-service — HTTP gateway, broker, result store, and worker pool.
//!
//! The service half of sib-prover:
//! - [`config`]: environment-derived configuration, built once at startup
//!   and injected downward (no process-global flags),
//! - [`store`]: the result store (the only shared mutable resource),
//!   keyed per job id, with monotonic progress, terminal-state
//!   immutability, and a bounded retention window,
//! - [`broker`]: late-acknowledgment job dispatch to the worker pool,
//! - [`worker`]: blocking pipeline execution under soft/hard time limits,
//! - [`api`]: the axum surface (`POST /prove`, `GET /prove/{id}`,
//!   `GET /health`) and the single record → client-view mapping.

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

/// HTTP handlers and the client-facing status mapping.
pub mod api;
/// Late-acknowledgment in-process job broker.
pub mod broker;
/// Environment-derived service configuration.
pub mod config;
/// Result store: job state keyed by job id.
pub mod store;
/// Worker pool consuming the broker.
pub mod worker;

pub use api::{router, AppState};
pub use broker::{ChannelBroker, Delivery, JobBroker};
pub use config::ServiceConfig;
pub use store::{InMemoryStore, JobRecord, ResultStore, StoreProgress};
pub use worker::spawn_workers;
