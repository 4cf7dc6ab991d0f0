//! API Handlers
//!
//! HTTP request handlers for the expense tracker endpoints.

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::session::{BearerSession, SignedIn};
use crate::error::{Result, TrackerError};
use crate::expenses::ExpenseService;
use crate::form::{ExpenseForm, FormSubmission};
use crate::models::{
    HealthResponse, InvalidateResponse, LandingResponse, MutationResponse, SignOutResponse,
    StatsResponse,
};
use crate::views::DashboardView;
use crate::worker::ShellGateway;

/// Largest request body forwarded to the asset origin
const MAX_SHELL_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached expenses query and writes
    pub service: ExpenseService,
    /// Offline shell in front of the asset origin
    pub shell: ShellGateway,
}

impl AppState {
    pub fn new(service: ExpenseService, shell: ShellGateway) -> Self {
        Self { service, shell }
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.shell.is_active()))
}

/// Handler for GET /api/stats
///
/// Returns query cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.stats().await.into())
}

/// Handler for GET /api/landing
///
/// Signed-in visitors are sent to the dashboard.
pub async fn landing_handler(signed_in: Option<SignedIn>) -> Json<LandingResponse> {
    Json(LandingResponse::for_session(signed_in.is_some()))
}

/// Handler for GET /api/dashboard
pub async fn dashboard_handler(
    State(state): State<AppState>,
    signed_in: SignedIn,
) -> Result<Json<DashboardView>> {
    let data = state.service.expenses(&signed_in.session).await?;
    Ok(Json(DashboardView::build(&data, &signed_in.user.id)))
}

/// Handler for POST /api/expenses
pub async fn create_expense_handler(
    State(state): State<AppState>,
    signed_in: SignedIn,
    Json(form): Json<ExpenseForm>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let submission = FormSubmission::Create {
        user_id: signed_in.user.id.clone(),
    };
    let notification = state
        .service
        .save_expense(&signed_in.session, &submission, &form)
        .await?;

    Ok((StatusCode::CREATED, Json(MutationResponse::new(notification, None))))
}

/// Handler for PUT /api/expenses/:id
pub async fn update_expense_handler(
    State(state): State<AppState>,
    signed_in: SignedIn,
    Path(id): Path<String>,
    Json(form): Json<ExpenseForm>,
) -> Result<Json<MutationResponse>> {
    let submission = FormSubmission::Update { id: id.clone() };
    let notification = state
        .service
        .save_expense(&signed_in.session, &submission, &form)
        .await?;

    Ok(Json(MutationResponse::new(notification, Some(id))))
}

/// Handler for DELETE /api/expenses/:id
pub async fn delete_expense_handler(
    State(state): State<AppState>,
    signed_in: SignedIn,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>> {
    let notification = state.service.delete_expense(&signed_in.session, &id).await?;
    Ok(Json(MutationResponse::new(notification, Some(id))))
}

/// Handler for POST /api/expenses/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    _signed_in: SignedIn,
) -> Json<InvalidateResponse> {
    Json(InvalidateResponse {
        invalidated: state.service.invalidate_expenses().await,
    })
}

/// Handler for POST /api/auth/sign-out
pub async fn sign_out_handler(
    State(state): State<AppState>,
    BearerSession(session): BearerSession,
) -> Result<Json<SignOutResponse>> {
    state.service.backend().sign_out(&session).await?;
    Ok(Json(SignOutResponse::signed_out()))
}

/// Fallback for every other path: served through the offline shell.
pub async fn shell_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let body = to_bytes(body, MAX_SHELL_BODY_BYTES)
        .await
        .map_err(|e| TrackerError::Validation(format!("Request body rejected: {e}")))?;

    let shell_request = state
        .shell
        .request(parts.method, path_and_query, parts.headers, body)?;
    let response = state.shell.serve(&shell_request).await?;
    debug!("Shell served {} with {}", shell_request.url, response.status);

    let mut out = (response.status, Body::from(response.body)).into_response();
    out.headers_mut().extend(response.headers);
    Ok(out)
}
