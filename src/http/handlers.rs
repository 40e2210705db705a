//! Route handlers: resource lookup plus the orchestrator probes.

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::http::response::{ProblemDetail, ServiceResponse};
use crate::http::server::AppState;

/// `GET /{id}`: look up a resource.
pub async fn lookup(State(state): State<AppState>, Path(id): Path<String>, uri: Uri) -> Response {
    match perform_lookup(&state, id, uri.path()) {
        Ok(body) => body.into_response(),
        Err(problem) => {
            tracing::warn!(instance = %problem.instance, detail = %problem.detail, "Lookup failed");
            problem.into_response()
        }
    }
}

/// Decide the outcome of a lookup.
///
/// Fails while any dependency is down, or when fault injection trips.
pub fn perform_lookup(state: &AppState, id: String, path: &str) -> Result<ServiceResponse, ProblemDetail> {
    if let Some(dep) = state.dependencies.first_down() {
        return Err(ProblemDetail::service_unavailable(
            format!("Dependency '{}' at {} is unreachable", dep.name, dep.address),
            path,
        ));
    }

    if state.faults.should_fail() {
        return Err(ProblemDetail::service_unavailable(
            "The request could not be completed, retry later",
            path,
        ));
    }

    tracing::debug!(id = %id, "Lookup succeeded");
    Ok(ServiceResponse::ok(id))
}

/// `/live`: the process is up and answering.
pub async fn live() -> StatusCode {
    StatusCode::OK
}

/// `/ready`: 200 while serving with every dependency reachable, else 503.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    if state.readiness.is_ready() && state.dependencies.all_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
