use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use rawad::workflows::admin::{
    admin_router, AdminAuthenticator, AdminContext, AdminCredentials, CredentialStore,
    CredentialStoreError,
};
use rawad::workflows::registration::{
    NewRegistration, Registration, RegistrationId, RegistrationObserver, RegistrationRepository,
    RegistrationStatus, RepositoryError, RoleDetails, SubscriptionId,
};
use serde_json::Value;
use tower::ServiceExt;

#[derive(Default)]
struct MemoryCredentialStore {
    document: Mutex<Option<AdminCredentials>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<AdminCredentials>, CredentialStoreError> {
        Ok(self.document.lock().expect("credential mutex").clone())
    }

    fn save(&self, credentials: AdminCredentials) -> Result<(), CredentialStoreError> {
        *self.document.lock().expect("credential mutex") = Some(credentials);
        Ok(())
    }
}

#[derive(Default)]
struct SeededRepository {
    records: Mutex<Vec<Registration>>,
}

impl SeededRepository {
    fn with_one_registration() -> Self {
        let repository = Self::default();
        repository
            .records
            .lock()
            .expect("record mutex")
            .push(Registration {
                id: RegistrationId("reg-000001".to_string()),
                full_name: "Ahmed Ali".to_string(),
                email: "ahmed@example.com".to_string(),
                phone: "0512345678".to_string(),
                cv_link: "https://files.rawad.example/cv_uploads/1.pdf".to_string(),
                bio: String::new(),
                additional_notes: String::new(),
                status: RegistrationStatus::Pending,
                created_at: Utc::now(),
                details: RoleDetails::Beneficiary {
                    current_field: "طالب".to_string(),
                    reason: "توجيه مهني عام".to_string(),
                },
            });
        repository
    }
}

impl RegistrationRepository for SeededRepository {
    fn create(&self, _registration: NewRegistration) -> Result<Registration, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn list(&self) -> Result<Vec<Registration>, RepositoryError> {
        Ok(self.records.lock().expect("record mutex").clone())
    }

    fn delete(&self, id: &RegistrationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("record mutex");
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn subscribe(&self, _observer: Arc<dyn RegistrationObserver>) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn unsubscribe(&self, _id: SubscriptionId) {}
}

fn admin_app() -> axum::Router {
    let context = AdminContext {
        auth: AdminAuthenticator::new(
            Arc::new(MemoryCredentialStore::default()),
            "router-salt",
            "router password",
        ),
        repository: Arc::new(SeededRepository::with_one_registration()),
    };
    admin_router(Arc::new(context))
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

async fn login(app: &axum::Router, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!("{{\"password\":\"{password}\"}}")))
                .expect("request builds"),
        )
        .await
        .expect("router responds")
}

#[tokio::test]
async fn login_issues_a_token_and_protected_routes_accept_it() {
    let app = admin_app();

    let response = login(&app, "router password").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let token = body["token"].as_str().expect("token string").to_string();
    assert!(!token.is_empty());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/admin/registrations")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().expect("list").len(), 1);
}

#[tokio::test]
async fn protected_routes_reject_missing_or_garbage_tokens() {
    let app = admin_app();

    for uri in [
        "/api/v1/admin/registrations",
        "/api/v1/admin/analytics",
        "/api/v1/admin/report",
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri {uri}");
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/admin/analytics")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized_and_lockout_returns_locked() {
    let app = admin_app();

    for _ in 0..5 {
        let response = login(&app, "guess").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = login(&app, "router password").await;
    assert_eq!(response.status(), StatusCode::LOCKED);
}

#[tokio::test]
async fn report_endpoint_returns_csv_with_filters_applied() {
    let app = admin_app();

    let response = login(&app, "router password").await;
    let body = read_json_body(response).await;
    let token = body["token"].as_str().expect("token string").to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/admin/report?role=beneficiary&search=ahmed")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .expect("content type")
        .to_str()
        .expect("header string")
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let csv = String::from_utf8(body.to_vec()).expect("utf-8 csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Ahmed Ali"));
}

#[tokio::test]
async fn delete_endpoint_removes_a_registration() {
    let app = admin_app();

    let response = login(&app, "router password").await;
    let body = read_json_body(response).await;
    let token = body["token"].as_str().expect("token string").to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/admin/registrations/reg-000001")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/admin/registrations/reg-000001")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
