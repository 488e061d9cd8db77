/// Where the client talks to and where it keeps its credential.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the expense service, without a trailing slash.
    pub api_base_url: String,
    /// localStorage key holding the bearer credential.
    pub token_key: String,
}

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TOKEN_KEY: &str = "token";

impl Default for ClientConfig {
    fn default() -> Self {
        let base = option_env!("EXPENSE_API_URL").unwrap_or(DEFAULT_API_BASE_URL);
        Self {
            api_base_url: normalize_base_url(base),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_api_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.api_base_url = normalize_base_url(url.as_ref());
        self
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
