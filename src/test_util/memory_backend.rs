use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{Expense, ExpenseWithOwner, Profile};
use crate::remote::{AuthUser, BackendError, ExpenseBackend, ExpenseChanges, NewExpense, Session};

/// Backend operations, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CurrentUser,
    SignOut,
    ListExpenses,
    ListProfiles,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct State {
    expenses: Vec<Expense>,
    profiles: Vec<Profile>,
    /// access token -> user id
    sessions: HashMap<String, String>,
    failing: HashSet<Op>,
    calls: HashMap<Op, usize>,
    next_id: u64,
    list_delay: Option<Duration>,
}

/// In-process stand-in for the hosted data service.
///
/// Mirrors its row policies: writes only touch rows owned by the session's
/// user and inserts must be for that user.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.state.lock().unwrap().profiles.push(profile);
        self
    }

    /// Accepts `token` as a session of `user_id`.
    pub fn with_session(self, token: &str, user_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(token.to_string(), user_id.to_string());
        self
    }

    pub fn with_expense(self, expense: Expense) -> Self {
        self.state.lock().unwrap().expenses.push(expense);
        self
    }

    /// Delays every expense listing, to hold a fetch in flight.
    pub fn with_list_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().list_delay = Some(delay);
        self
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state.lock().unwrap().expenses.clone()
    }

    /// Records the call and returns the session's user id.
    fn enter(&self, op: Op, session: &Session) -> Result<Option<String>, BackendError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_default() += 1;
        if state.failing.contains(&op) {
            return Err(BackendError::Status {
                status: 500,
                message: format!("{op:?} failed"),
            });
        }
        Ok(state.sessions.get(session.access_token()).cloned())
    }

    fn require_user(&self, op: Op, session: &Session) -> Result<String, BackendError> {
        self.enter(op, session)?.ok_or(BackendError::Status {
            status: 401,
            message: "JWT expired".to_string(),
        })
    }
}

#[async_trait]
impl ExpenseBackend for MemoryBackend {
    async fn current_user(&self, session: &Session) -> Result<Option<AuthUser>, BackendError> {
        Ok(self.enter(Op::CurrentUser, session)?.map(|id| AuthUser {
            email: Some(format!("{id}@example.com")),
            id,
        }))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        self.enter(Op::SignOut, session)?;
        self.state
            .lock()
            .unwrap()
            .sessions
            .remove(session.access_token());
        Ok(())
    }

    async fn list_expenses(&self, session: &Session) -> Result<Vec<ExpenseWithOwner>, BackendError> {
        self.require_user(Op::ListExpenses, session)?;
        let delay = self.state.lock().unwrap().list_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        let mut rows: Vec<ExpenseWithOwner> = state
            .expenses
            .iter()
            .map(|e| {
                let owner = state.profiles.iter().find(|p| p.id == e.user_id).cloned();
                ExpenseWithOwner::new(e.clone(), owner)
            })
            .collect();
        rows.sort_by(|a, b| b.expense.created_at.cmp(&a.expense.created_at));
        Ok(rows)
    }

    async fn list_profiles(&self, session: &Session) -> Result<Vec<Profile>, BackendError> {
        self.require_user(Op::ListProfiles, session)?;
        Ok(self.state.lock().unwrap().profiles.clone())
    }

    async fn insert_expense(&self, session: &Session, expense: &NewExpense) -> Result<(), BackendError> {
        let user_id = self.require_user(Op::Insert, session)?;
        if user_id != expense.user_id {
            return Err(BackendError::Status {
                status: 403,
                message: "new row violates row-level security policy".to_string(),
            });
        }

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);
        state.expenses.push(Expense {
            id,
            user_id,
            description: expense.description.clone(),
            amount: expense.amount,
            category: expense.category,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn update_expense(
        &self,
        session: &Session,
        id: &str,
        changes: &ExpenseChanges,
    ) -> Result<(), BackendError> {
        let user_id = self.require_user(Op::Update, session)?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or(BackendError::NoRowsAffected)?;

        row.description = changes.description.clone();
        row.amount = changes.amount;
        row.category = changes.category;
        Ok(())
    }

    async fn delete_expense(&self, session: &Session, id: &str) -> Result<(), BackendError> {
        let user_id = self.require_user(Op::Delete, session)?;
        let mut state = self.state.lock().unwrap();
        let before = state.expenses.len();
        state.expenses.retain(|e| !(e.id == id && e.user_id == user_id));
        if state.expenses.len() == before {
            return Err(BackendError::NoRowsAffected);
        }
        Ok(())
    }
}
