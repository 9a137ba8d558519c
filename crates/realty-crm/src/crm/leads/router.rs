use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::domain::{LeadDraft, LeadPriority, LeadSource, LeadStatus};
use super::reporting::TimeRange;
use super::repository::{LeadFilter, LeadOrdering, LeadRepository};
use super::service::{LeadService, LeadServiceError};
use super::transfer::{ImportError, SkippedRow, EXPORT_FILE_NAME};
use crate::crm::access::{ActorDirectory, ActorId, VisibilityScope};
use crate::crm::http::{bad_request, require_back_office, resolve_actor, server_error};

/// Router builder exposing the lead collection, dashboards, and bulk
/// transfer endpoints.
pub fn lead_router<R, D>(service: Arc<LeadService<R, D>>) -> Router
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/leads",
            get(list_handler::<R, D>).post(create_handler::<R, D>),
        )
        .route(
            "/api/v1/leads/dashboard_stats",
            get(dashboard_handler::<R, D>),
        )
        .route(
            "/api/v1/leads/team_performance",
            get(team_performance_handler::<R, D>),
        )
        .route(
            "/api/v1/leads/revenue_overview",
            get(revenue_overview_handler::<R, D>),
        )
        .route("/api/v1/leads/import_leads", post(import_handler::<R, D>))
        .route("/api/v1/leads/export", get(export_handler::<R, D>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    time_range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeadListQuery {
    status: Option<String>,
    source: Option<String>,
    priority: Option<String>,
    assigned_to: Option<u64>,
    created_by: Option<u64>,
    search: Option<String>,
    ordering: Option<String>,
}

fn filter_from_query(query: LeadListQuery) -> Result<LeadFilter, String> {
    let mut filter = LeadFilter::default();

    if let Some(raw) = query.status.as_deref().filter(|raw| !raw.trim().is_empty()) {
        filter.status =
            Some(LeadStatus::parse(raw).ok_or_else(|| format!("\"{raw}\" is not a valid status."))?);
    }
    if let Some(raw) = query.source.as_deref().filter(|raw| !raw.trim().is_empty()) {
        filter.source =
            Some(LeadSource::parse(raw).ok_or_else(|| format!("\"{raw}\" is not a valid source."))?);
    }
    if let Some(raw) = query
        .priority
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
    {
        filter.priority = Some(
            LeadPriority::parse(raw)
                .ok_or_else(|| format!("\"{raw}\" is not a valid priority."))?,
        );
    }
    filter.assigned_to = query.assigned_to.map(ActorId);
    filter.created_by = query.created_by.map(ActorId);
    filter.search = query.search.filter(|needle| !needle.trim().is_empty());
    if let Some(raw) = query
        .ordering
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
    {
        filter.ordering = LeadOrdering::parse(raw)
            .ok_or_else(|| format!("\"{raw}\" is not a valid ordering field."))?;
    }

    Ok(filter)
}

fn service_error_response(error: LeadServiceError) -> Response {
    match error {
        LeadServiceError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, Json(errors)).into_response()
        }
        other => {
            error!(%other, "lead request failed");
            server_error(other.to_string())
        }
    }
}

pub(crate) async fn list_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
    Query(query): Query<LeadListQuery>,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let filter = match filter_from_query(query) {
        Ok(filter) => filter,
        Err(message) => return bad_request(message),
    };

    let scope = VisibilityScope::for_actor(&actor);
    match service.list(&scope, &filter) {
        Ok(leads) => (StatusCode::OK, Json(leads)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
    Json(draft): Json<LeadDraft>,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.create(&actor, draft) {
        Ok(lead) => (StatusCode::CREATED, Json(lead)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn dashboard_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    if let Err(response) = require_back_office(&actor) {
        return response;
    }

    let range = TimeRange::parse_or_default(query.time_range.as_deref());
    let scope = VisibilityScope::for_actor(&actor);
    match service.dashboard_stats(&scope, range, Utc::now()) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn team_performance_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let scope = VisibilityScope::for_actor(&actor);
    match service.team_performance(&scope) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn revenue_overview_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    if let Err(response) = require_back_office(&actor) {
        return response;
    }

    let scope = VisibilityScope::for_actor(&actor);
    match service.revenue_overview(&scope) {
        Ok(points) => (StatusCode::OK, Json(points)).into_response(),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    message: String,
    created_count: usize,
    skipped_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped_details: Option<Vec<SkippedRow>>,
}

fn import_error_response(error: ImportError) -> Response {
    if error.is_client_fault() {
        bad_request(error.to_string())
    } else {
        error!(%error, "lead import failed");
        server_error(
            "An unexpected critical error occurred during import. Please check server logs."
                .to_string(),
        )
    }
}

pub(crate) async fn import_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    if let Err(response) = require_back_office(&actor) {
        return response;
    }

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes.to_vec()));
                        break;
                    }
                    Err(_) => {
                        return bad_request("Malformed multipart payload.".to_string());
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => return bad_request("Malformed multipart payload.".to_string()),
        }
    }

    let Some((file_name, bytes)) = upload else {
        return import_error_response(ImportError::MissingFile);
    };

    match service.import(&actor, &file_name, &bytes) {
        Ok(report) => {
            let status = if report.all_rows_failed() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::CREATED
            };
            let body = ImportResponse {
                message: report.message(),
                created_count: report.created_count,
                skipped_count: report.skipped_count(),
                skipped_details: if report.skipped.is_empty() {
                    None
                } else {
                    Some(report.skipped)
                },
            };
            (status, Json(body)).into_response()
        }
        Err(error) => import_error_response(error),
    }
}

pub(crate) async fn export_handler<R, D>(
    State(service): State<Arc<LeadService<R, D>>>,
    headers: HeaderMap,
    Query(query): Query<LeadListQuery>,
) -> Response
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    let actor = match resolve_actor(service.directory(), &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    if let Err(response) = require_back_office(&actor) {
        return response;
    }
    let filter = match filter_from_query(query) {
        Ok(filter) => filter,
        Err(message) => return bad_request(message),
    };

    let scope = VisibilityScope::for_actor(&actor);
    match service.export(&scope, &filter) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => service_error_response(error),
    }
}
