//! Mutation Coordinator.
//!
//! Writes go to the service first; on success the inputs are cleared and the
//! Record Store is reloaded in full. Local lists are never patched, so the
//! spent/remaining numbers shown are always the service's own.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::ExpenseService;
use crate::error::ClientResult;
use crate::models::{BudgetRequest, NewExpense};
use crate::session::{SessionManager, SessionToken};
use crate::storage::CredentialStore;
use crate::store::{RecordStore, ReloadOutcome};

/// Raw text of the add-expense form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub category: String,
    pub description: String,
    /// `YYYY-MM-DD`; blank lets the service stamp today's date.
    pub date: String,
}

impl ExpenseDraft {
    /// `None` when a required field is missing or unreadable.
    pub fn to_request(&self) -> Option<NewExpense> {
        let amount = parse_amount(&self.amount)?;
        if self.category.trim().is_empty() {
            return None;
        }
        let date = match self.date.trim() {
            "" => None,
            raw => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?),
        };
        Some(NewExpense {
            amount,
            category: self.category.clone(),
            description: self.description.clone(),
            date,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Raw text of the set-budget form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetDraft {
    pub category: String,
    pub amount: String,
}

impl BudgetDraft {
    pub fn to_request(&self) -> Option<BudgetRequest> {
        let budget = parse_amount(&self.amount)?;
        if self.category.trim().is_empty() {
            return None;
        }
        Some(BudgetRequest {
            category: self.category.clone(),
            budget,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Nothing was sent: no session, or the draft was incomplete.
    Skipped,
    /// The service accepted the write; carries the follow-up reload.
    Saved(ReloadOutcome),
}

pub struct MutationCoordinator<'a, S: ?Sized, C> {
    service: &'a S,
    sessions: &'a SessionManager<C>,
    records: &'a RecordStore,
}

impl<'a, S, C> MutationCoordinator<'a, S, C>
where
    S: ExpenseService + ?Sized,
    C: CredentialStore,
{
    pub fn new(service: &'a S, sessions: &'a SessionManager<C>, records: &'a RecordStore) -> Self {
        Self {
            service,
            sessions,
            records,
        }
    }

    /// On failure the draft is left untouched so the user can retry.
    pub async fn create_expense(
        &self,
        token: Option<&SessionToken>,
        draft: &mut ExpenseDraft,
    ) -> ClientResult<Submission> {
        let Some(token) = token else {
            return Ok(Submission::Skipped);
        };
        let Some(request) = draft.to_request() else {
            debug!("expense draft incomplete, not submitting");
            return Ok(Submission::Skipped);
        };

        if let Err(err) = self.service.create_expense(token.credential(), &request).await {
            warn!(category = %request.category, error = %err, "could not save expense");
            return Err(err);
        }
        info!(category = %request.category, amount = request.amount, "expense saved");
        draft.clear();
        Ok(Submission::Saved(self.reload(token).await))
    }

    pub async fn set_budget(
        &self,
        token: Option<&SessionToken>,
        draft: &mut BudgetDraft,
    ) -> ClientResult<Submission> {
        let Some(token) = token else {
            return Ok(Submission::Skipped);
        };
        let Some(request) = draft.to_request() else {
            debug!("budget draft incomplete, not submitting");
            return Ok(Submission::Skipped);
        };

        if let Err(err) = self.service.set_budget(token.credential(), &request).await {
            warn!(category = %request.category, error = %err, "could not save budget");
            return Err(err);
        }
        info!(category = %request.category, budget = request.budget, "budget saved");
        draft.clear();
        Ok(Submission::Saved(self.reload(token).await))
    }

    async fn reload(&self, token: &SessionToken) -> ReloadOutcome {
        self.records
            .reload(self.service, self.sessions, Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(amount: &str, category: &str) -> ExpenseDraft {
        ExpenseDraft {
            amount: amount.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_expense_draft_requires_amount_and_category() {
        assert!(draft("", "Food").to_request().is_none());
        assert!(draft("12", "").to_request().is_none());
        assert!(draft("12", "   ").to_request().is_none());
        assert!(draft("abc", "Food").to_request().is_none());
        assert!(draft("-5", "Food").to_request().is_none());
        assert!(draft("NaN", "Food").to_request().is_none());
    }

    #[test]
    fn test_expense_draft_builds_request() {
        let mut d = draft(" 12.50 ", "Food");
        d.description = "lunch".into();
        d.date = "2024-05-02".into();
        let req = d.to_request().unwrap();
        assert_eq!(req.amount, 12.5);
        assert_eq!(req.category, "Food");
        assert_eq!(req.description, "lunch");
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[test]
    fn test_expense_draft_rejects_bad_date() {
        let mut d = draft("10", "Food");
        d.date = "02/05/2024".into();
        assert!(d.to_request().is_none());
    }

    #[test]
    fn test_category_case_is_kept() {
        let req = draft("1", "food").to_request().unwrap();
        assert_eq!(req.category, "food");
    }

    #[test]
    fn test_budget_draft() {
        let mut d = BudgetDraft {
            category: "Food".into(),
            amount: "200".into(),
        };
        assert_eq!(d.to_request().unwrap().budget, 200.0);
        d.clear();
        assert_eq!(d, BudgetDraft::default());
        assert!(d.to_request().is_none());
    }
}
