use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use realty_crm::crm::access::ActorDirectory;
use realty_crm::crm::leads::{lead_router, LeadRepository, LeadService};
use realty_crm::crm::visits::{visit_router, SiteVisitRepository, VisitService};

/// Mounts the CRM routers plus the service-level probes.
pub(crate) fn with_crm_routes<R, D, V>(
    lead_service: Arc<LeadService<R, D>>,
    visit_service: Arc<VisitService<V>>,
    directory: Arc<D>,
) -> axum::Router
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
    V: SiteVisitRepository + 'static,
{
    lead_router(lead_service)
        .merge(visit_router(visit_service, directory))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
