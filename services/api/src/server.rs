use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rawad::config::AppConfig;
use rawad::error::AppError;
use rawad::telemetry;
use rawad::workflows::admin::{AdminAuthenticator, AdminContext};
use rawad::workflows::registration::SubmissionPipeline;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryCredentialStore, InMemoryFileStore, InMemoryRegistrationStore,
};
use crate::routes::with_platform_routes;

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

    let repository = Arc::new(InMemoryRegistrationStore::default());
    let files = Arc::new(InMemoryFileStore::default());
    let pipeline = Arc::new(SubmissionPipeline::new(files, repository.clone()));

    let credentials = Arc::new(InMemoryCredentialStore::default());
    let admin = Arc::new(AdminContext {
        auth: AdminAuthenticator::new(
            credentials,
            config.admin.password_salt.clone(),
            config.admin.initial_password.clone(),
        ),
        repository,
    });

    let app = with_platform_routes(pipeline, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rawad platform service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
