use crate::cli::ServeArgs;
use crate::infra::{seed_directory, AppState};
use crate::routes::with_crm_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use realty_crm::config::AppConfig;
use realty_crm::crm::leads::{InMemoryLeadRepository, LeadService};
use realty_crm::crm::visits::{InMemorySiteVisitRepository, VisitService};
use realty_crm::error::AppError;
use realty_crm::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(seed_directory());
    let lead_repository = Arc::new(InMemoryLeadRepository::new());
    let visit_repository = Arc::new(InMemorySiteVisitRepository::new());
    let lead_service = Arc::new(LeadService::new(lead_repository, directory.clone()));
    let visit_service = Arc::new(VisitService::new(visit_repository));

    let app = with_crm_routes(lead_service, visit_service, directory)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "realty CRM service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
