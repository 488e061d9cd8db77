//! Session Manager.
//!
//! Owns the bearer credential and a monotonically increasing epoch. Every
//! data operation receives a [`SessionToken`] captured when it started; once
//! its awaits resolve it checks [`SessionManager::is_current`] before
//! touching local state, so work started under a session that has since
//! ended is dropped.

use std::cell::RefCell;

use tracing::{info, warn};

use crate::api::ExpenseService;
use crate::error::ClientResult;
use crate::models::{AuthMode, Credentials};
use crate::storage::CredentialStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

/// A credential paired with the epoch it was granted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    credential: String,
    epoch: Epoch,
}

impl SessionToken {
    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

#[derive(Debug, Default)]
struct SessionState {
    credential: Option<String>,
    epoch: Epoch,
}

pub struct SessionManager<C> {
    store: C,
    state: RefCell<SessionState>,
}

impl<C: CredentialStore> SessionManager<C> {
    pub fn new(store: C) -> Self {
        Self {
            store,
            state: RefCell::new(SessionState::default()),
        }
    }

    pub fn current(&self) -> Option<SessionToken> {
        let state = self.state.borrow();
        state.credential.as_ref().map(|credential| SessionToken {
            credential: credential.clone(),
            epoch: state.epoch,
        })
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().credential.is_some()
    }

    pub fn is_current(&self, token: &SessionToken) -> bool {
        let state = self.state.borrow();
        state.credential.is_some() && state.epoch == token.epoch
    }

    /// Pick up a credential left by a previous run. It is not checked with
    /// the service; a stale one is discovered on the first data call.
    pub fn restore(&self) -> Option<SessionToken> {
        let credential = self.store.load()?;
        info!("restored session from storage");
        Some(self.begin(credential))
    }

    /// Register or log in. Nothing changes unless the service grants a
    /// credential and it is written to durable storage. Every service-side
    /// failure comes back as `ClientError::Auth`.
    pub async fn authenticate<S: ExpenseService + ?Sized>(
        &self,
        service: &S,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> ClientResult<SessionToken> {
        let credential = match service.authenticate(mode, credentials).await {
            Ok(credential) => credential,
            Err(err) => {
                warn!(?mode, error = %err, "authentication failed");
                return Err(err.into_auth_failure());
            }
        };
        self.store.save(&credential)?;
        info!(?mode, username = %credentials.username, "authenticated");
        Ok(self.begin(credential))
    }

    /// Drop the credential everywhere. Always succeeds locally.
    pub fn end(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "could not clear stored credential");
        }
        let mut state = self.state.borrow_mut();
        state.credential = None;
        state.epoch = state.epoch.next();
        info!("session ended");
    }

    fn begin(&self, credential: String) -> SessionToken {
        let mut state = self.state.borrow_mut();
        state.epoch = state.epoch.next();
        state.credential = Some(credential.clone());
        SessionToken {
            credential,
            epoch: state.epoch,
        }
    }
}
