use crate::cli::ServeArgs;
use crate::infra::{bootstrap, AppState};
use crate::routes::with_backend_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use finapp::applications::InMemoryApplicationStorage;
use finapp::error::AppError;

/// Run the development storage backend. Records live only as long as the process.
pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = bootstrap()?;
    config.ensure_development_backend()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let storage = Arc::new(InMemoryApplicationStorage::new());
    let app = with_backend_routes(storage)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "application storage backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
