//! Record Store: the session's expense list and budget summaries.

use std::cell::RefCell;

use futures::future::join;
use tracing::{info, warn};

use crate::api::ExpenseService;
use crate::error::{ClientError, ClientResult};
use crate::models::{BudgetSummary, ExpenseRecord};
use crate::session::{SessionManager, SessionToken};
use crate::storage::CredentialStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSnapshot {
    pub expenses: Vec<ExpenseRecord>,
    pub summaries: Vec<BudgetSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    /// No session; nothing was requested.
    NoSession,
    /// The session changed while the reads were in flight; results dropped.
    Discarded,
    Completed(ReloadReport),
}

/// Per-list result of a reload: the new length, or why the old list was kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadReport {
    pub expenses: ClientResult<usize>,
    pub summaries: ClientResult<usize>,
}

impl ReloadReport {
    pub fn is_complete(&self) -> bool {
        self.expenses.is_ok() && self.summaries.is_ok()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ClientError> {
        self.expenses
            .as_ref()
            .err()
            .into_iter()
            .chain(self.summaries.as_ref().err())
    }
}

impl ReloadOutcome {
    /// True when the service refused the credential during this reload.
    pub fn credential_rejected(&self) -> bool {
        match self {
            ReloadOutcome::Completed(report) => report
                .errors()
                .any(|err| matches!(err, ClientError::Unauthorized)),
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordStore {
    expenses: RefCell<Vec<ExpenseRecord>>,
    summaries: RefCell<Vec<BudgetSummary>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both lists with what the service currently holds.
    ///
    /// The two reads run concurrently and each list is swapped on its own
    /// once its response is decoded. A failed read keeps that list as it was.
    pub async fn reload<S, C>(
        &self,
        service: &S,
        sessions: &SessionManager<C>,
        token: Option<&SessionToken>,
    ) -> ReloadOutcome
    where
        S: ExpenseService + ?Sized,
        C: CredentialStore,
    {
        let Some(token) = token else {
            return ReloadOutcome::NoSession;
        };
        if !sessions.is_current(token) {
            return ReloadOutcome::Discarded;
        }

        let credential = token.credential();
        let expenses = async {
            let result = service.expenses(credential).await;
            settle(sessions, token, result, &self.expenses, "expenses")
        };
        let summaries = async {
            let result = service.summaries(credential).await;
            settle(sessions, token, result, &self.summaries, "summaries")
        };

        match join(expenses, summaries).await {
            (Some(expenses), Some(summaries)) => {
                let report = ReloadReport {
                    expenses,
                    summaries,
                };
                if report.is_complete() {
                    info!(
                        expenses = self.expenses.borrow().len(),
                        summaries = self.summaries.borrow().len(),
                        "records reloaded"
                    );
                }
                ReloadOutcome::Completed(report)
            }
            _ => ReloadOutcome::Discarded,
        }
    }

    pub fn current_expenses(&self) -> Vec<ExpenseRecord> {
        self.expenses.borrow().clone()
    }

    pub fn current_summaries(&self) -> Vec<BudgetSummary> {
        self.summaries.borrow().clone()
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            expenses: self.current_expenses(),
            summaries: self.current_summaries(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.borrow().is_empty() && self.summaries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.expenses.borrow_mut().clear();
        self.summaries.borrow_mut().clear();
    }
}

/// Apply one read's result if the session that issued it is still current.
/// Returns `None` when the result was dropped as stale.
fn settle<T, C: CredentialStore>(
    sessions: &SessionManager<C>,
    token: &SessionToken,
    result: ClientResult<Vec<T>>,
    slot: &RefCell<Vec<T>>,
    what: &'static str,
) -> Option<ClientResult<usize>> {
    if !sessions.is_current(token) {
        warn!(list = what, "session changed during reload, dropping response");
        return None;
    }
    match result {
        Ok(list) => {
            let len = list.len();
            *slot.borrow_mut() = list;
            Some(Ok(len))
        }
        Err(err) => {
            warn!(list = what, error = %err, "reload failed, keeping previous data");
            Some(Err(err))
        }
    }
}
