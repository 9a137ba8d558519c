use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{VisitId, VisitRequest, VisitStatus};
use super::repository::{RepositoryError, SiteVisitRepository};
use super::service::{VisitService, VisitServiceError};
use crate::crm::access::ActorDirectory;
use crate::crm::http::{bad_request, resolve_actor, server_error};

/// Router state pairing the visit service with the directory used for
/// actor resolution.
pub struct VisitRouterState<R, D> {
    pub service: Arc<VisitService<R>>,
    pub directory: Arc<D>,
}

impl<R, D> Clone for VisitRouterState<R, D> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            directory: self.directory.clone(),
        }
    }
}

/// Router builder exposing visit scheduling and the status lifecycle.
pub fn visit_router<R, D>(service: Arc<VisitService<R>>, directory: Arc<D>) -> Router
where
    R: SiteVisitRepository + 'static,
    D: ActorDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/site_visits",
            get(list_handler::<R, D>).post(schedule_handler::<R, D>),
        )
        .route(
            "/api/v1/site_visits/:visit_id/status",
            post(status_handler::<R, D>),
        )
        .with_state(VisitRouterState { service, directory })
}

fn visit_error_response(error: VisitServiceError) -> Response {
    match error {
        VisitServiceError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, Json(errors)).into_response()
        }
        VisitServiceError::InvalidTransition { .. } => bad_request(error.to_string()),
        VisitServiceError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Not found." })),
        )
            .into_response(),
        other => {
            error!(%other, "site visit request failed");
            server_error(other.to_string())
        }
    }
}

pub(crate) async fn list_handler<R, D>(
    State(state): State<VisitRouterState<R, D>>,
    headers: HeaderMap,
) -> Response
where
    R: SiteVisitRepository + 'static,
    D: ActorDirectory + 'static,
{
    if let Err(response) = resolve_actor(state.directory.as_ref(), &headers) {
        return response;
    }

    match state.service.list() {
        Ok(visits) => (StatusCode::OK, Json(visits)).into_response(),
        Err(error) => visit_error_response(error),
    }
}

pub(crate) async fn schedule_handler<R, D>(
    State(state): State<VisitRouterState<R, D>>,
    headers: HeaderMap,
    Json(request): Json<VisitRequest>,
) -> Response
where
    R: SiteVisitRepository + 'static,
    D: ActorDirectory + 'static,
{
    if let Err(response) = resolve_actor(state.directory.as_ref(), &headers) {
        return response;
    }

    match state.service.schedule(request) {
        Ok(visit) => (StatusCode::CREATED, Json(visit)).into_response(),
        Err(error) => visit_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: String,
    #[serde(default)]
    feedback: Option<String>,
}

pub(crate) async fn status_handler<R, D>(
    State(state): State<VisitRouterState<R, D>>,
    headers: HeaderMap,
    Path(visit_id): Path<u64>,
    Json(change): Json<StatusChange>,
) -> Response
where
    R: SiteVisitRepository + 'static,
    D: ActorDirectory + 'static,
{
    if let Err(response) = resolve_actor(state.directory.as_ref(), &headers) {
        return response;
    }

    let Some(next) = VisitStatus::parse(&change.status) else {
        return bad_request(format!("\"{}\" is not a valid choice.", change.status));
    };

    match state
        .service
        .update_status(VisitId(visit_id), next, change.feedback)
    {
        Ok(visit) => (StatusCode::OK, Json(visit)).into_response(),
        Err(error) => visit_error_response(error),
    }
}
