//! Cached access to the expenses query and the writes that invalidate it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::fetch_expenses_data;
use crate::cache::{CacheStats, Lookup, QueryCache, QueryKey};
use crate::error::{Result, TrackerError};
use crate::form::{ExpenseForm, FormSubmission};
use crate::models::{ExpensesData, Notification};
use crate::remote::{ExpenseBackend, ExpenseChanges, NewExpense, Session};

/// Expenses query behind a stale-while-revalidate cache.
///
/// Cloning is cheap; clones share the backend, the cache and the refetch
/// bookkeeping.
#[derive(Clone)]
pub struct ExpenseService {
    backend: Arc<dyn ExpenseBackend>,
    cache: Arc<RwLock<QueryCache<ExpensesData>>>,
    /// Held for the duration of a refetch, so at most one is in flight
    refetch_lock: Arc<Mutex<()>>,
    /// Bumped by every invalidation; results fetched under an older
    /// generation are returned to their caller but never cached
    generation: Arc<AtomicU64>,
}

impl ExpenseService {
    pub fn new(backend: Arc<dyn ExpenseBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            cache: Arc::new(RwLock::new(QueryCache::new(ttl))),
            refetch_lock: Arc::new(Mutex::new(())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn backend(&self) -> &Arc<dyn ExpenseBackend> {
        &self.backend
    }

    /// Shared handle on the query cache, for the background sweeper.
    pub fn cache(&self) -> Arc<RwLock<QueryCache<ExpensesData>>> {
        self.cache.clone()
    }

    // == Read ==
    /// Returns the expenses query result.
    ///
    /// Fresh results are served from the cache. Stale results are served as
    /// well while a background refetch replaces them. On a miss the caller
    /// waits for the fetch.
    pub async fn expenses(&self, session: &Session) -> Result<ExpensesData> {
        let lookup = self.cache.write().await.get(QueryKey::Expenses);

        match lookup {
            Lookup::Fresh(data) => Ok(data),
            Lookup::Stale(data) => {
                debug!("Serving stale expenses, refetching in background");
                self.spawn_refetch(session.clone());
                Ok(data)
            }
            Lookup::Miss => self.refetch(session).await,
        }
    }

    async fn refetch(&self, session: &Session) -> Result<ExpensesData> {
        let _guard = self.refetch_lock.lock().await;

        // Another caller may have refreshed the entry while we waited
        if let Some(data) = self.cache.read().await.peek_fresh(QueryKey::Expenses) {
            return Ok(data);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let data = fetch_expenses_data(self.backend.as_ref(), session).await?;

        let mut cache = self.cache.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            cache.set(QueryKey::Expenses, data.clone(), None);
            debug!(
                "Cached {} expenses and {} team members",
                data.expenses.len(),
                data.team_members.len()
            );
        } else {
            debug!("Expenses were invalidated during fetch, result not cached");
        }

        Ok(data)
    }

    fn spawn_refetch(&self, session: Session) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.refetch(&session).await {
                warn!("Background refetch of expenses failed: {}", e);
            }
        });
    }

    // == Invalidate ==
    /// Marks the expenses query as needing a refetch.
    ///
    /// Returns whether a cached result was dropped.
    pub async fn invalidate_expenses(&self) -> bool {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let removed = self.cache.write().await.invalidate(QueryKey::Expenses);
        debug!("Expenses query invalidated (had entry: {})", removed);
        removed
    }

    // == Writes ==
    /// Validates `form` and writes it as described by `submission`.
    ///
    /// Validation failures are returned before the data service is
    /// contacted. A failed write leaves the cache untouched and hands the
    /// form back unchanged.
    pub async fn save_expense(
        &self,
        session: &Session,
        submission: &FormSubmission,
        form: &ExpenseForm,
    ) -> Result<Notification> {
        let valid = form.validate()?;

        let outcome = match submission {
            FormSubmission::Create { user_id } => {
                let expense = NewExpense::new(user_id.clone(), valid);
                self.backend.insert_expense(session, &expense).await
            }
            FormSubmission::Update { id } => {
                let changes = ExpenseChanges::from(valid);
                self.backend.update_expense(session, id, &changes).await
            }
        };

        match outcome {
            Ok(()) => {
                self.invalidate_expenses().await;
                info!("{}", submission.success_message());
                Ok(Notification::success(submission.success_message()))
            }
            Err(e) => {
                error!("Error saving expense: {}", e);
                Err(TrackerError::mutation_failed(
                    "Failed to save expense",
                    Some(form.clone()),
                ))
            }
        }
    }

    /// Deletes the expense with `id`. The data service decides whether the
    /// session may delete it.
    pub async fn delete_expense(&self, session: &Session, id: &str) -> Result<Notification> {
        match self.backend.delete_expense(session, id).await {
            Ok(()) => {
                self.invalidate_expenses().await;
                info!("Expense {} deleted", id);
                Ok(Notification::success("Expense deleted"))
            }
            Err(e) => {
                error!("Error deleting expense {}: {}", id, e);
                Err(TrackerError::mutation_failed("Failed to delete expense", None))
            }
        }
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
