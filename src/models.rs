use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One spending event as returned by `GET /expenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// One line of `GET /summary`. `remaining` is the service's number, never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
}

/// Body of `POST /expenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Body of `POST /budget`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub category: String,
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Register,
    Login,
}

impl AuthMode {
    pub fn path(self) -> &'static str {
        match self {
            AuthMode::Register => "/register",
            AuthMode::Login => "/login",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Register => AuthMode::Login,
            AuthMode::Login => AuthMode::Register,
        }
    }
}

/// Spending vs budget for one category, ready for a grouped bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    pub category: String,
    pub spent: f64,
    pub budget: f64,
}

/// Total spent in one category, ready for a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PieDatum {
    pub category: String,
    pub total: f64,
}

impl PieDatum {
    /// Fraction of `series_total` this slice covers; 0 for an empty series.
    pub fn share(&self, series_total: f64) -> f64 {
        if series_total > 0.0 {
            self.total / series_total
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_without_description_decodes() {
        let raw = r#"{"date":"2024-03-01","category":"Food","amount":12.5}"#;
        let record: ExpenseRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_new_expense_omits_missing_date() {
        let body = NewExpense {
            amount: 40.0,
            category: "Travel".into(),
            description: String::new(),
            date: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("date").is_none());
        assert_eq!(json["amount"], 40.0);
    }

    #[test]
    fn test_auth_mode_paths() {
        assert_eq!(AuthMode::Login.path(), "/login");
        assert_eq!(AuthMode::Register.path(), "/register");
        assert_eq!(AuthMode::Login.toggled(), AuthMode::Register);
    }

    #[test]
    fn test_pie_share_of_empty_series() {
        let slice = PieDatum {
            category: "Food".into(),
            total: 0.0,
        };
        assert_eq!(slice.share(0.0), 0.0);
    }
}
