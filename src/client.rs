use tracing::{info, warn};

use crate::aggregate::{to_bar_series, to_pie_series};
use crate::api::{ExpenseService, HttpService};
use crate::config::ClientConfig;
use crate::coordinator::{BudgetDraft, ExpenseDraft, MutationCoordinator, Submission};
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthMode, BarDatum, BudgetSummary, Credentials, ExpenseRecord, PieDatum};
use crate::session::{SessionManager, SessionToken};
use crate::storage::{CredentialStore, LocalStorageStore};
use crate::store::{RecordSnapshot, RecordStore, ReloadOutcome};

/// The browser build: HTTP service plus localStorage.
pub type BrowserTracker = ExpenseTracker<HttpService, LocalStorageStore>;

/// Entry point for the UI. Ties the session, the record lists and the
/// mutation flow together.
pub struct ExpenseTracker<S, C> {
    service: S,
    sessions: SessionManager<C>,
    records: RecordStore,
}

impl BrowserTracker {
    pub fn browser(config: ClientConfig) -> Self {
        let store = LocalStorageStore::new(config.token_key.clone());
        Self::new(HttpService::new(config), store)
    }
}

impl<S: ExpenseService, C: CredentialStore> ExpenseTracker<S, C> {
    pub fn new(service: S, store: C) -> Self {
        Self {
            service,
            sessions: SessionManager::new(store),
            records: RecordStore::new(),
        }
    }

    /// Called once at startup. Does not reload; the caller decides when.
    pub fn restore_session(&self) -> Option<SessionToken> {
        self.sessions.restore()
    }

    /// Register or log in, then reload the records once under the new session.
    pub async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> ClientResult<SessionToken> {
        let token = self
            .sessions
            .authenticate(&self.service, mode, credentials)
            .await?;
        // Lists from a previous account must not survive a failed first read.
        self.records.clear();
        let outcome = self
            .records
            .reload(&self.service, &self.sessions, Some(&token))
            .await;
        self.check_rejection(&outcome);
        Ok(token)
    }

    pub fn end_session(&self) {
        self.sessions.end();
        self.records.clear();
    }

    pub async fn reload(&self) -> ReloadOutcome {
        let token = self.sessions.current();
        let outcome = self
            .records
            .reload(&self.service, &self.sessions, token.as_ref())
            .await;
        self.check_rejection(&outcome);
        outcome
    }

    pub async fn create_expense(&self, draft: &mut ExpenseDraft) -> ClientResult<Submission> {
        let token = self.sessions.current();
        let result = self
            .coordinator()
            .create_expense(token.as_ref(), draft)
            .await;
        self.check_submission(token.as_ref(), result)
    }

    pub async fn set_budget(&self, draft: &mut BudgetDraft) -> ClientResult<Submission> {
        let token = self.sessions.current();
        let result = self.coordinator().set_budget(token.as_ref(), draft).await;
        self.check_submission(token.as_ref(), result)
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_active()
    }

    pub fn session(&self) -> Option<SessionToken> {
        self.sessions.current()
    }

    pub fn expenses(&self) -> Vec<ExpenseRecord> {
        self.records.current_expenses()
    }

    pub fn summaries(&self) -> Vec<BudgetSummary> {
        self.records.current_summaries()
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        self.records.snapshot()
    }

    pub fn bar_series(&self) -> Vec<BarDatum> {
        to_bar_series(&self.records.current_summaries())
    }

    pub fn pie_series(&self) -> Vec<PieDatum> {
        to_pie_series(&self.records.current_expenses())
    }

    fn coordinator(&self) -> MutationCoordinator<'_, S, C> {
        MutationCoordinator::new(&self.service, &self.sessions, &self.records)
    }

    fn check_submission(
        &self,
        token: Option<&SessionToken>,
        result: ClientResult<Submission>,
    ) -> ClientResult<Submission> {
        match &result {
            Err(ClientError::Unauthorized) => {
                // A rejection aimed at an older session says nothing about this one.
                if token.is_some_and(|t| self.sessions.is_current(t)) {
                    self.reject_credential();
                }
            }
            Ok(Submission::Saved(outcome)) => self.check_rejection(outcome),
            _ => {}
        }
        result
    }

    fn check_rejection(&self, outcome: &ReloadOutcome) {
        if outcome.credential_rejected() {
            self.reject_credential();
        }
    }

    fn reject_credential(&self) {
        if self.sessions.is_active() {
            warn!("service rejected the session credential");
            self.end_session();
            info!("logged out after credential rejection");
        }
    }
}
