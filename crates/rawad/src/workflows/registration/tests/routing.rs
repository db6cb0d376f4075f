use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::registration::router::registration_router;
use crate::workflows::registration::service::SubmissionPipeline;

fn submit_request(draft: &crate::workflows::registration::domain::RegistrationDraft) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/registrations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(draft).expect("draft serializes"),
        ))
        .expect("request builds")
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn submit_endpoint_accepts_a_valid_draft() {
    let files = Arc::new(MemoryFileStore::with_progress(vec![100]));
    let repository = Arc::new(MemoryRepository::default());
    let app = registration_router(Arc::new(SubmissionPipeline::new(files, repository.clone())));

    let response = app
        .oneshot(submit_request(&beneficiary_draft()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert!(body["id"].as_str().expect("id string").starts_with("reg-"));
    assert!(body["cv_link"]
        .as_str()
        .expect("cv_link string")
        .contains("cv_uploads/"));
    assert_eq!(repository.stored().len(), 1);
}

#[tokio::test]
async fn submit_endpoint_rejects_an_invalid_draft() {
    let files = Arc::new(MemoryFileStore::default());
    let repository = Arc::new(MemoryRepository::default());
    let app = registration_router(Arc::new(SubmissionPipeline::new(
        files.clone(),
        repository.clone(),
    )));

    let mut draft = beneficiary_draft();
    draft.phone = "1234567890".to_string();

    let response = app
        .oneshot(submit_request(&draft))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error string")
        .contains("phone number"));
    assert!(files.uploaded_paths().is_empty());
    assert!(repository.stored().is_empty());
}

#[tokio::test]
async fn submit_endpoint_maps_upload_failure_to_bad_gateway() {
    let files = Arc::new(MemoryFileStore::failing());
    let repository = Arc::new(MemoryRepository::default());
    let app = registration_router(Arc::new(SubmissionPipeline::new(files, repository.clone())));

    let response = app
        .oneshot(submit_request(&beneficiary_draft()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error string")
        .contains("CV upload failed"));
    assert!(repository.stored().is_empty());
}
