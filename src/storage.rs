use std::cell::RefCell;

use crate::error::{ClientError, ClientResult};

/// Durable home of the session credential. Exactly one key is used.
pub trait CredentialStore {
    fn load(&self) -> Option<String>;
    fn save(&self, credential: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// Browser `localStorage`, survives reloads of the page.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage(&self) -> ClientResult<web_sys::Storage> {
        let window =
            web_sys::window().ok_or_else(|| ClientError::Storage("no window".to_string()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            _ => Err(ClientError::Storage("localStorage unavailable".to_string())),
        }
    }
}

impl CredentialStore for LocalStorageStore {
    fn load(&self) -> Option<String> {
        let storage = self.storage().ok()?;
        match storage.get_item(&self.key) {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            _ => None,
        }
    }

    fn save(&self, credential: &str) -> ClientResult<()> {
        self.storage()?
            .set_item(&self.key, credential)
            .map_err(|_| ClientError::Storage(format!("could not write {}", self.key)))
    }

    fn clear(&self) -> ClientResult<()> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|_| ClientError::Storage(format!("could not remove {}", self.key)))
    }
}

/// Process-local store, for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(credential.into())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    fn save(&self, credential: &str) -> ClientResult<()> {
        *self.slot.borrow_mut() = Some(credential.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::rc::Rc<T> {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, credential: &str) -> ClientResult<()> {
        (**self).save(credential)
    }

    fn clear(&self) -> ClientResult<()> {
        (**self).clear()
    }
}
