#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::channel::oneshot;

use expense_tracker_frontend::api::ExpenseService;
use expense_tracker_frontend::storage::MemoryStore;
use expense_tracker_frontend::{
    AuthMode, BudgetSummary, ClientError, ClientResult, Credentials, ExpenseRecord,
    ExpenseTracker, NewExpense,
};
use expense_tracker_frontend::models::BudgetRequest;

pub type TestTracker = ExpenseTracker<Rc<FakeService>, Rc<MemoryStore>>;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn creds(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

pub fn record(category: &str, amount: f64) -> ExpenseRecord {
    ExpenseRecord {
        date: today(),
        category: category.to_string(),
        amount,
        description: String::new(),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Calls {
    pub auth: usize,
    pub expenses: usize,
    pub summaries: usize,
    pub create_expense: usize,
    pub set_budget: usize,
}

impl Calls {
    pub fn data_calls(&self) -> usize {
        self.expenses + self.summaries + self.create_expense + self.set_budget
    }
}

#[derive(Default)]
struct Account {
    password: String,
    expenses: Vec<ExpenseRecord>,
    budgets: Vec<(String, f64)>,
}

/// In-process stand-in for the expense service, summarizing the way the
/// real one does.
#[derive(Default)]
pub struct FakeService {
    accounts: RefCell<HashMap<String, Account>>,
    tokens: RefCell<HashMap<String, String>>,
    issued: Cell<usize>,
    calls: Cell<Calls>,
    pub fail_expenses: Cell<bool>,
    pub fail_summaries: Cell<bool>,
    pub fail_writes: Cell<bool>,
    pub fail_auth: Cell<bool>,
    expenses_gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl FakeService {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn calls(&self) -> Calls {
        self.calls.get()
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.accounts.borrow_mut().insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                ..Default::default()
            },
        );
    }

    pub fn seed_expense(&self, username: &str, expense: ExpenseRecord) {
        if let Some(account) = self.accounts.borrow_mut().get_mut(username) {
            account.expenses.push(expense);
        }
    }

    pub fn issue_token(&self, username: &str) -> String {
        let n = self.issued.get() + 1;
        self.issued.set(n);
        let token = format!("token-{}-{}", username, n);
        self.tokens
            .borrow_mut()
            .insert(token.clone(), username.to_string());
        token
    }

    pub fn revoke_all_tokens(&self) {
        self.tokens.borrow_mut().clear();
    }

    /// Park the next `GET /expenses` until the returned sender fires.
    pub fn hold_next_expenses_read(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.expenses_gate.borrow_mut() = Some(rx);
        tx
    }

    fn bump(&self, f: impl FnOnce(&mut Calls)) {
        let mut calls = self.calls.get();
        f(&mut calls);
        self.calls.set(calls);
    }

    fn user_for(&self, credential: &str) -> ClientResult<String> {
        self.tokens
            .borrow()
            .get(credential)
            .cloned()
            .ok_or(ClientError::Unauthorized)
    }

    fn outage() -> ClientError {
        ClientError::Service {
            status: 503,
            message: "unavailable".to_string(),
        }
    }
}

#[async_trait(?Send)]
impl ExpenseService for FakeService {
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> ClientResult<String> {
        self.bump(|c| c.auth += 1);
        if self.fail_auth.get() {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        let mut accounts = self.accounts.borrow_mut();
        match mode {
            AuthMode::Register => {
                if accounts.contains_key(&credentials.username) {
                    return Err(ClientError::Auth("Username already exists".to_string()));
                }
                accounts.insert(
                    credentials.username.clone(),
                    Account {
                        password: credentials.password.clone(),
                        ..Default::default()
                    },
                );
            }
            AuthMode::Login => match accounts.get(&credentials.username) {
                Some(account) if account.password == credentials.password => {}
                _ => return Err(ClientError::Auth("Invalid credentials".to_string())),
            },
        }
        drop(accounts);
        Ok(self.issue_token(&credentials.username))
    }

    async fn expenses(&self, credential: &str) -> ClientResult<Vec<ExpenseRecord>> {
        self.bump(|c| c.expenses += 1);
        let gate = self.expenses_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_expenses.get() {
            return Err(Self::outage());
        }
        let user = self.user_for(credential)?;
        Ok(self.accounts.borrow()[&user].expenses.clone())
    }

    async fn summaries(&self, credential: &str) -> ClientResult<Vec<BudgetSummary>> {
        self.bump(|c| c.summaries += 1);
        if self.fail_summaries.get() {
            return Err(Self::outage());
        }
        let user = self.user_for(credential)?;
        let accounts = self.accounts.borrow();
        let account = &accounts[&user];
        Ok(account
            .budgets
            .iter()
            .map(|(category, budget)| {
                let spent: f64 = account
                    .expenses
                    .iter()
                    .filter(|e| &e.category == category)
                    .map(|e| e.amount)
                    .sum();
                BudgetSummary {
                    category: category.clone(),
                    budget: *budget,
                    spent,
                    remaining: budget - spent,
                }
            })
            .collect())
    }

    async fn create_expense(&self, credential: &str, expense: &NewExpense) -> ClientResult<()> {
        self.bump(|c| c.create_expense += 1);
        if self.fail_writes.get() {
            return Err(ClientError::Network("connection reset".to_string()));
        }
        let user = self.user_for(credential)?;
        let mut accounts = self.accounts.borrow_mut();
        if let Some(account) = accounts.get_mut(&user) {
            account.expenses.push(ExpenseRecord {
                date: expense.date.unwrap_or_else(today),
                category: expense.category.clone(),
                amount: expense.amount,
                description: expense.description.clone(),
            });
        }
        Ok(())
    }

    async fn set_budget(&self, credential: &str, budget: &BudgetRequest) -> ClientResult<()> {
        self.bump(|c| c.set_budget += 1);
        if self.fail_writes.get() {
            return Err(ClientError::Network("connection reset".to_string()));
        }
        let user = self.user_for(credential)?;
        let mut accounts = self.accounts.borrow_mut();
        if let Some(account) = accounts.get_mut(&user) {
            match account.budgets.iter_mut().find(|(c, _)| c == &budget.category) {
                Some(entry) => entry.1 = budget.budget,
                None => account
                    .budgets
                    .push((budget.category.clone(), budget.budget)),
            }
        }
        Ok(())
    }
}

pub fn tracker() -> (TestTracker, Rc<FakeService>, Rc<MemoryStore>) {
    let service = FakeService::new();
    let store = Rc::new(MemoryStore::default());
    let tracker = ExpenseTracker::new(service.clone(), store.clone());
    (tracker, service, store)
}
