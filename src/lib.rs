//! Client core for the expense tracker: session handling, the synchronized
//! record lists, write-then-reload mutations and the chart aggregations.

pub mod aggregate;
pub mod api;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use client::{BrowserTracker, ExpenseTracker};
pub use config::ClientConfig;
pub use coordinator::{BudgetDraft, ExpenseDraft, Submission};
pub use error::{ClientError, ClientResult};
pub use models::{
    AuthMode, BarDatum, BudgetSummary, Credentials, ExpenseRecord, NewExpense, PieDatum,
};
pub use store::{RecordSnapshot, ReloadOutcome, ReloadReport};
