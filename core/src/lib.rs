//! Synchronous client core and dashboard state for the student roster service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host supplies a
//! [`Transport`] that executes the round-trip; everything else, from field
//! normalization to the derived dashboard numbers, is deterministic.
//!
//! # Design
//! - `StudentClient` is stateless. It holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `normalize` is the only place that knows the service's alternate field
//!   names; everything past it works on canonical [`Student`] records.
//! - `pipeline` holds pure functions over a roster snapshot; `Dashboard`
//!   owns the snapshot and replaces it wholesale on reload.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod form;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod transport;
pub mod types;

pub use client::StudentClient;
pub use config::ApiConfig;
pub use dashboard::{
    Dashboard, DashboardError, DeleteOutcome, Notification, PendingReload, ReloadMode, Snapshot, Tone,
};
pub use error::{ApiError, ConfigError};
pub use form::{FieldErrors, FormError, FormMode, FormState, StudentForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pipeline::{DashboardView, ViewState, YearFilter};
pub use transport::{StudentService, Transport};
pub use types::{Student, StudentId, StudentPayload, YearLabel, YearStat};
