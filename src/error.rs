use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Bad credentials or a taken username. The session is left as it was.
    #[error("{0}")]
    Auth(String),

    /// The service refused the bearer credential.
    #[error("session expired, please log in again")]
    Unauthorized,

    #[error("service error: {status} - {message}")]
    Service { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Shown when a failed login carries no message of its own.
pub const AUTH_FALLBACK_MESSAGE: &str = "Error";

impl ClientError {
    /// Failures that leave prior data intact and are safe to retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Service { .. } | ClientError::Network(_) | ClientError::Decode(_)
        )
    }
}

impl ClientError {
    /// Any failure during register/login is an auth failure to the user.
    pub fn into_auth_failure(self) -> ClientError {
        match self {
            ClientError::Auth(msg) => ClientError::Auth(msg),
            _ => ClientError::Auth(AUTH_FALLBACK_MESSAGE.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<gloo_net::Error> for ClientError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(e) => ClientError::Decode(e.to_string()),
            other => ClientError::Network(other.to_string()),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Network("offline".into()).is_transient());
        assert!(ClientError::Service {
            status: 500,
            message: "boom".into()
        }
        .is_transient());
        assert!(!ClientError::Auth("Invalid credentials".into()).is_transient());
        assert!(!ClientError::Unauthorized.is_transient());
    }

    #[test]
    fn test_into_auth_failure() {
        let from_network = ClientError::Network("offline".into()).into_auth_failure();
        assert_eq!(from_network, ClientError::Auth("Error".into()));
        assert!(!from_network.is_transient());

        let kept = ClientError::Auth("Invalid credentials".into()).into_auth_failure();
        assert_eq!(kept, ClientError::Auth("Invalid credentials".into()));
    }

    #[test]
    fn test_auth_error_displays_detail_verbatim() {
        let err = ClientError::Auth("Username already exists".into());
        assert_eq!(err.to_string(), "Username already exists");
    }
}
