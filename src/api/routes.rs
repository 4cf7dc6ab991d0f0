//! API Routes
//!
//! Configures the Axum router with all expense tracker endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_expense_handler, dashboard_handler, delete_expense_handler, health_handler,
    invalidate_handler, landing_handler, shell_handler, sign_out_handler, stats_handler,
    update_expense_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /api/stats` - Query cache statistics
/// - `GET /api/landing` - Where a visitor should go
/// - `GET /api/dashboard` - Dashboard of the signed-in user
/// - `POST /api/expenses` - Add an expense
/// - `PUT /api/expenses/:id` - Update an expense
/// - `DELETE /api/expenses/:id` - Delete an expense
/// - `POST /api/expenses/invalidate` - Force a refetch on next read
/// - `POST /api/auth/sign-out` - End the session
/// - anything else - served through the offline shell
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/landing", get(landing_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/expenses", post(create_expense_handler))
        .route("/api/expenses/invalidate", post(invalidate_handler))
        .route(
            "/api/expenses/:id",
            put(update_expense_handler).delete(delete_expense_handler),
        )
        .route("/api/auth/sign-out", post(sign_out_handler))
        .fallback(shell_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
