//! Response DTOs for the expense tracker API
//!
//! Defines the structure of outgoing HTTP response bodies. The dashboard
//! itself is served as `views::DashboardView`.

use serde::Serialize;

use super::Notification;
use crate::cache::CacheStats;

/// Response body for create, update and delete.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub notification: Notification,
    /// Id of the expense that was touched, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<String>,
}

impl MutationResponse {
    pub fn new(notification: Notification, expense_id: Option<String>) -> Self {
        Self {
            notification,
            expense_id,
        }
    }
}

/// Response body for POST /api/expenses/invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Whether a cached result was dropped
    pub invalidated: bool,
}

/// Response body for GET /api/landing
///
/// Signed-in users are sent on to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct LandingResponse {
    pub redirect: Option<String>,
}

impl LandingResponse {
    pub fn for_session(signed_in: bool) -> Self {
        Self {
            redirect: signed_in.then(|| "/dashboard".to_string()),
        }
    }
}

/// Response body for POST /api/auth/sign-out
#[derive(Debug, Clone, Serialize)]
pub struct SignOutResponse {
    pub notification: Notification,
    pub redirect: String,
}

impl SignOutResponse {
    pub fn signed_out() -> Self {
        Self {
            notification: Notification::success("Signed out successfully"),
            redirect: "/".to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /api/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads answered with a fresh value
    pub hits: u64,
    /// Reads answered with a stale value (a refetch was started)
    pub stale_hits: u64,
    /// Reads that had to fetch
    pub misses: u64,
    /// Explicit invalidations
    pub invalidations: u64,
    /// Current number of cached queries
    pub total_entries: usize,
    /// (hits + stale_hits) / all reads
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            stale_hits: stats.stale_hits,
            misses: stats.misses,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether the offline shell cache is installed and active
    pub offline_shell: bool,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(offline_shell: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            offline_shell,
        }
    }
}
