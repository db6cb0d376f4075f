use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::analytics;
use super::auth::{AdminAuthenticator, AuthError, CredentialStore};
use super::report::{export_csv, filter_registrations, ReportFilter};
use crate::workflows::registration::domain::RegistrationId;
use crate::workflows::registration::repository::{RegistrationRepository, RepositoryError};

/// Shared state for the admin surface.
pub struct AdminContext<C, R> {
    pub auth: AdminAuthenticator<C>,
    pub repository: Arc<R>,
}

/// Router builder exposing the back-office endpoints. Everything except
/// `login` requires a valid bearer token.
pub fn admin_router<C, R>(context: Arc<AdminContext<C, R>>) -> Router
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/login", post(login_handler::<C, R>))
        .route("/api/v1/admin/logout", post(logout_handler::<C, R>))
        .route("/api/v1/admin/password", post(change_password_handler::<C, R>))
        .route("/api/v1/admin/unlock", post(unlock_handler::<C, R>))
        .route(
            "/api/v1/admin/registrations",
            get(list_registrations_handler::<C, R>),
        )
        .route(
            "/api/v1/admin/registrations/:registration_id",
            delete(delete_registration_handler::<C, R>),
        )
        .route("/api/v1/admin/analytics", get(analytics_handler::<C, R>))
        .route("/api/v1/admin/report", get(report_handler::<C, R>))
        .with_state(context)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn require_session<C, R>(
    context: &AdminContext<C, R>,
    headers: &HeaderMap,
) -> Result<(), Response>
where
    C: CredentialStore,
{
    match bearer_token(headers) {
        Some(token) if context.auth.sessions().validate(token) => Ok(()),
        _ => {
            let payload = json!({ "error": "a valid session token is required" });
            Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response())
        }
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let payload = json!({ "error": error.to_string() });
    let status = match error {
        AuthError::AccountLocked => StatusCode::LOCKED,
        AuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
        AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(payload)).into_response()
}

pub(crate) async fn login_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    Json(payload): Json<LoginRequest>,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    match context.auth.login(&payload.password) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub(crate) async fn logout_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Some(token) = bearer_token(&headers) {
        context.auth.logout(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn change_password_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
    Json(payload): Json<ChangePasswordRequest>,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Err(response) = require_session(&context, &headers) {
        return response;
    }

    match context
        .auth
        .change_password(&payload.current_password, &payload.new_password)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub(crate) async fn unlock_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Err(response) = require_session(&context, &headers) {
        return response;
    }

    match context.auth.unlock() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub(crate) async fn list_registrations_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Err(response) = require_session(&context, &headers) {
        return response;
    }

    match context.repository.list() {
        Ok(registrations) => (StatusCode::OK, Json(registrations)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn delete_registration_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Err(response) = require_session(&context, &headers) {
        return response;
    }

    match context.repository.delete(&RegistrationId(registration_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(RepositoryError::NotFound) => {
            let payload = json!({ "error": "registration not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn analytics_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Err(response) = require_session(&context, &headers) {
        return response;
    }

    match context.repository.list() {
        Ok(registrations) => {
            let summary = analytics::summarize(&registrations, Utc::now().date_naive());
            (StatusCode::OK, Json(summary)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn report_handler<C, R>(
    State(context): State<Arc<AdminContext<C, R>>>,
    headers: HeaderMap,
    Query(filter): Query<ReportFilter>,
) -> Response
where
    C: CredentialStore + 'static,
    R: RegistrationRepository + 'static,
{
    if let Err(response) = require_session(&context, &headers) {
        return response;
    }

    let registrations = match context.repository.list() {
        Ok(registrations) => registrations,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let filtered = filter_registrations(&registrations, &filter);
    match export_csv(&filtered) {
        Ok(csv) => {
            let filename = format!("registrations_{}.csv", Utc::now().format("%Y-%m-%d"));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
