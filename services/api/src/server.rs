use crate::cli::ServeArgs;
use crate::infra::{in_memory_service, load_engine, AppState};
use crate::routes::with_prakriti_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use prakriti::config::AppConfig;
use prakriti::error::AppError;
use prakriti::telemetry;
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

    let engine = load_engine(&config.assessment)?;
    let service = Arc::new(in_memory_service(engine));

    let app = with_prakriti_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        secondary_threshold_pct = config.assessment.secondary_threshold_pct,
        "prakriti assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
