use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use rawad::workflows::admin::{admin_router, AdminContext, CredentialStore};
use rawad::workflows::registration::{
    registration_router, FileStore, RegistrationRepository, SubmissionPipeline,
};
use serde_json::json;

use crate::infra::AppState;

pub(crate) fn with_platform_routes<S, R, C>(
    pipeline: Arc<SubmissionPipeline<S, R>>,
    admin: Arc<AdminContext<C, R>>,
) -> axum::Router
where
    S: FileStore + 'static,
    R: RegistrationRepository + 'static,
    C: CredentialStore + 'static,
{
    registration_router(pipeline)
        .merge(admin_router(admin))
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
