//! Remote data service
//!
//! The hosted service owns durability, row-level authorization, id
//! generation and sessions. `ExpenseBackend` is the seam the rest of the
//! crate talks through; `RestBackend` speaks its HTTP API.

mod rest;

pub use rest::RestBackend;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::form::ValidExpense;
use crate::models::{Category, ExpenseWithOwner, Profile};

// == Session ==
/// Bearer token of the signed-in user, forwarded on every call so the data
/// service can apply its access policies.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Session(..)")
    }
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

// == Write payloads ==
/// Row inserted for a new expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub user_id: String,
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
}

impl NewExpense {
    pub fn new(user_id: impl Into<String>, valid: ValidExpense) -> Self {
        Self {
            user_id: user_id.into(),
            description: valid.description,
            amount: valid.amount,
            category: valid.category,
        }
    }
}

/// Columns an update may change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseChanges {
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
}

impl From<ValidExpense> for ExpenseChanges {
    fn from(valid: ValidExpense) -> Self {
        Self {
            description: valid.description,
            amount: valid.amount,
            category: valid.category,
        }
    }
}

// == Backend Error ==
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The service answered with a non-success status
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },
    /// The write matched no row the session may change
    #[error("no rows affected")]
    NoRowsAffected,
    /// The request never completed
    #[error("transport: {0}")]
    Transport(String),
    /// The response body did not have the expected shape
    #[error("decode: {0}")]
    Decode(String),
}

impl From<BackendError> for TrackerError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status: 401, .. } => TrackerError::Unauthorized,
            BackendError::Status { status, message } => TrackerError::Remote { status, message },
            BackendError::NoRowsAffected => TrackerError::NotFound("expense".to_string()),
            BackendError::Transport(msg) => TrackerError::Network(msg),
            BackendError::Decode(msg) => TrackerError::Network(format!("invalid response: {msg}")),
        }
    }
}

// == Expense Backend ==
/// Operations the application needs from the hosted service.
#[async_trait]
pub trait ExpenseBackend: Send + Sync {
    /// Resolves the session's user, `None` when the token is not accepted.
    async fn current_user(&self, session: &Session) -> Result<Option<AuthUser>, BackendError>;

    /// Ends the session at the auth service.
    async fn sign_out(&self, session: &Session) -> Result<(), BackendError>;

    /// All expenses with their owner's profile, newest first.
    async fn list_expenses(&self, session: &Session)
        -> Result<Vec<ExpenseWithOwner>, BackendError>;

    async fn list_profiles(&self, session: &Session) -> Result<Vec<Profile>, BackendError>;

    async fn insert_expense(&self, session: &Session, expense: &NewExpense)
        -> Result<(), BackendError>;

    /// Updates the expense with `id`. Fails with `NoRowsAffected` when the
    /// row is missing or not owned by the session's user.
    async fn update_expense(
        &self,
        session: &Session,
        id: &str,
        changes: &ExpenseChanges,
    ) -> Result<(), BackendError>;

    /// Deletes the expense with `id`, same failure rules as update.
    async fn delete_expense(&self, session: &Session, id: &str) -> Result<(), BackendError>;
}
