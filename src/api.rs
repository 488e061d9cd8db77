//! The expense service seam.
//!
//! `ExpenseService` is everything the client needs from the backend. The
//! browser build talks to it over HTTP with [`HttpService`]; tests swap in
//! an in-process fake.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, AUTH_FALLBACK_MESSAGE};
use crate::models::{
    AuthMode, BudgetRequest, BudgetSummary, Credentials, ExpenseRecord, NewExpense, TokenResponse,
};

#[async_trait(?Send)]
pub trait ExpenseService {
    /// Register or log in, returning the bearer credential.
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> ClientResult<String>;

    async fn expenses(&self, credential: &str) -> ClientResult<Vec<ExpenseRecord>>;

    async fn summaries(&self, credential: &str) -> ClientResult<Vec<BudgetSummary>>;

    async fn create_expense(&self, credential: &str, expense: &NewExpense) -> ClientResult<()>;

    async fn set_budget(&self, credential: &str, budget: &BudgetRequest) -> ClientResult<()>;
}

#[derive(Debug, Clone)]
pub struct HttpService {
    config: ClientConfig,
}

impl HttpService {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn authorized(&self, builder: RequestBuilder, credential: &str) -> RequestBuilder {
        builder.header("Authorization", &format!("Bearer {}", credential))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, credential: &str) -> ClientResult<T> {
        let url = self.config.endpoint(path);
        let resp = self.authorized(Request::get(&url), credential).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn request_token(&self, mode: AuthMode, credentials: &Credentials) -> ClientResult<String> {
        let url = self.config.endpoint(mode.path());
        let resp = Request::post(&url).json(credentials)?.send().await?;

        if !resp.ok() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Auth(
                detail_message(&body).unwrap_or_else(|| AUTH_FALLBACK_MESSAGE.to_string()),
            ));
        }

        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        credential: &str,
        body: &B,
    ) -> ClientResult<()> {
        let url = self.config.endpoint(path);
        let resp = self
            .authorized(Request::post(&url), credential)
            .json(body)?
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl ExpenseService for HttpService {
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> ClientResult<String> {
        self.request_token(mode, credentials)
            .await
            .map_err(ClientError::into_auth_failure)
    }

    async fn expenses(&self, credential: &str) -> ClientResult<Vec<ExpenseRecord>> {
        self.get_json("/expenses", credential).await
    }

    async fn summaries(&self, credential: &str) -> ClientResult<Vec<BudgetSummary>> {
        self.get_json("/summary", credential).await
    }

    async fn create_expense(&self, credential: &str, expense: &NewExpense) -> ClientResult<()> {
        self.post_json("/expenses", credential, expense).await
    }

    async fn set_budget(&self, credential: &str, budget: &BudgetRequest) -> ClientResult<()> {
        self.post_json("/budget", credential, budget).await
    }
}

#[async_trait(?Send)]
impl<T: ExpenseService + ?Sized> ExpenseService for std::rc::Rc<T> {
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> ClientResult<String> {
        (**self).authenticate(mode, credentials).await
    }

    async fn expenses(&self, credential: &str) -> ClientResult<Vec<ExpenseRecord>> {
        (**self).expenses(credential).await
    }

    async fn summaries(&self, credential: &str) -> ClientResult<Vec<BudgetSummary>> {
        (**self).summaries(credential).await
    }

    async fn create_expense(&self, credential: &str, expense: &NewExpense) -> ClientResult<()> {
        (**self).create_expense(credential, expense).await
    }

    async fn set_budget(&self, credential: &str, budget: &BudgetRequest) -> ClientResult<()> {
        (**self).set_budget(credential, budget).await
    }
}

async fn check_status(resp: Response) -> ClientResult<Response> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    if status == 401 {
        return Err(ClientError::Unauthorized);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Service {
        status,
        message: detail_message(&body).unwrap_or(body),
    })
}

/// Pull the human-readable `detail` out of an error body.
///
/// The service sends either `{"detail": "text"}` or, for rejected request
/// bodies, `{"detail": [{"msg": "text", ...}, ...]}`.
pub fn detail_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_string() {
        let body = r#"{"detail":"Username already exists"}"#;
        assert_eq!(detail_message(body).as_deref(), Some("Username already exists"));
    }

    #[test]
    fn test_detail_message_validation_list() {
        let body = r#"{"detail":[{"loc":["body","password"],"msg":"field required"},{"msg":"too short"}]}"#;
        assert_eq!(
            detail_message(body).as_deref(),
            Some("field required; too short")
        );
    }

    #[test]
    fn test_detail_message_rejects_non_json() {
        assert_eq!(detail_message("Internal Server Error"), None);
        assert_eq!(detail_message(r#"{"message":"nope"}"#), None);
    }
}
