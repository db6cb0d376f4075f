use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{Registration, RegistrationDraft};
use super::repository::RegistrationRepository;
use super::service::{
    SubmissionError, SubmissionListener, SubmissionPipeline, SubmissionUpdate,
};
use super::storage::FileStore;

/// Router builder exposing the public intake endpoint.
pub fn registration_router<S, R>(pipeline: Arc<SubmissionPipeline<S, R>>) -> Router
where
    S: FileStore + 'static,
    R: RegistrationRepository + 'static,
{
    Router::new()
        .route("/api/v1/registrations", post(submit_handler::<S, R>))
        .with_state(pipeline)
}

/// Response for an accepted submission.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: String,
    pub status: &'static str,
    pub cv_link: String,
}

impl From<Registration> for SubmissionReceipt {
    fn from(registration: Registration) -> Self {
        Self {
            id: registration.id.0,
            status: registration.status.label(),
            cv_link: registration.cv_link,
        }
    }
}

struct TracingListener;

impl SubmissionListener for TracingListener {
    fn update(&self, update: SubmissionUpdate) {
        tracing::debug!(
            state = update.state.label(),
            progress = update.progress_percent,
            "submission progress"
        );
    }
}

pub(crate) async fn submit_handler<S, R>(
    State(pipeline): State<Arc<SubmissionPipeline<S, R>>>,
    axum::Json(draft): axum::Json<RegistrationDraft>,
) -> Response
where
    S: FileStore + 'static,
    R: RegistrationRepository + 'static,
{
    // The pipeline blocks on the storage SDK, so it runs off the async
    // worker threads.
    let joined =
        tokio::task::spawn_blocking(move || pipeline.submit(&draft, &TracingListener)).await;

    let result = match joined {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "submission task aborted");
            let payload = json!({
                "error": "the registration could not be processed, please try again",
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
        }
    };

    match result {
        Ok(registration) => {
            let receipt = SubmissionReceipt::from(registration);
            (StatusCode::ACCEPTED, axum::Json(receipt)).into_response()
        }
        Err(SubmissionError::Rejected(reason)) => {
            let payload = json!({
                "error": reason.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
