use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use async_trait::async_trait;

use super::{AuthUser, BackendError, ExpenseBackend, ExpenseChanges, NewExpense, Session};
use crate::models::{Expense, ExpenseWithOwner, Profile};

/// Expense listing joined with the owner's profile, newest first.
const EXPENSE_SELECT: &str = "*,profiles:user_id(full_name,email)";

/// Client for the hosted data service's REST and auth endpoints.
pub struct RestBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
}

/// Expense row as returned by the join query.
#[derive(Debug, Deserialize)]
struct ExpenseRow {
    #[serde(flatten)]
    expense: Expense,
    #[serde(default)]
    profiles: Option<JoinedProfile>,
}

#[derive(Debug, Deserialize)]
struct JoinedProfile {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            full_name: row.full_name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
        }
    }
}

impl From<ExpenseRow> for ExpenseWithOwner {
    fn from(row: ExpenseRow) -> Self {
        let owner = row.profiles.map(|p| Profile {
            id: row.expense.user_id.clone(),
            full_name: p.full_name.unwrap_or_default(),
            email: p.email.unwrap_or_default(),
        });
        ExpenseWithOwner::new(row.expense, owner)
    }
}

/// Error body shapes used by the REST and auth endpoints.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(session.access_token())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.msg)
            .or(parsed.error_description)
            .unwrap_or(body);

        tracing::debug!("Data service returned {}: {}", status, message);
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Sends a write that returns the touched rows, failing when none were.
    async fn write_returning(&self, request: RequestBuilder) -> Result<(), BackendError> {
        let response = self
            .send(request.header("Prefer", "return=representation"))
            .await?;
        let rows: Vec<serde_json::Value> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NoRowsAffected);
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseBackend for RestBackend {
    async fn current_user(&self, session: &Session) -> Result<Option<AuthUser>, BackendError> {
        let request = self.authorized(self.http_client.get(self.auth_url("user")), session);
        match self.send(request).await {
            Ok(response) => Ok(Some(Self::decode(response).await?)),
            Err(BackendError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        let request = self.authorized(self.http_client.post(self.auth_url("logout")), session);
        match self.send(request).await {
            Ok(_) => Ok(()),
            // Session already gone
            Err(BackendError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn list_expenses(&self, session: &Session) -> Result<Vec<ExpenseWithOwner>, BackendError> {
        let url = self.table_url("expenses");
        tracing::debug!("Listing expenses: {}", url);

        let request = self
            .http_client
            .get(&url)
            .query(&[("select", EXPENSE_SELECT), ("order", "created_at.desc")]);
        let response = self.send(self.authorized(request, session)).await?;
        let rows: Vec<ExpenseRow> = Self::decode(response).await?;
        Ok(rows.into_iter().map(ExpenseWithOwner::from).collect())
    }

    async fn list_profiles(&self, session: &Session) -> Result<Vec<Profile>, BackendError> {
        let request = self
            .http_client
            .get(self.table_url("profiles"))
            .query(&[("select", "id,full_name,email")]);
        let response = self.send(self.authorized(request, session)).await?;
        let rows: Vec<ProfileRow> = Self::decode(response).await?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn insert_expense(&self, session: &Session, expense: &NewExpense) -> Result<(), BackendError> {
        let request = self
            .http_client
            .post(self.table_url("expenses"))
            .header("Prefer", "return=minimal")
            .json(expense);
        self.send(self.authorized(request, session)).await?;
        Ok(())
    }

    async fn update_expense(
        &self,
        session: &Session,
        id: &str,
        changes: &ExpenseChanges,
    ) -> Result<(), BackendError> {
        let request = self
            .http_client
            .patch(self.table_url("expenses"))
            .query(&[("id", format!("eq.{id}"))])
            .json(changes);
        self.write_returning(self.authorized(request, session)).await
    }

    async fn delete_expense(&self, session: &Session, id: &str) -> Result<(), BackendError> {
        let request = self
            .http_client
            .delete(self.table_url("expenses"))
            .query(&[("id", format!("eq.{id}"))]);
        self.write_returning(self.authorized(request, session)).await
    }
}
