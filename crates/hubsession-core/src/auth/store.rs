//! Persistence of the single bearer token slot.

use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use crate::config::APP_NAME;
use crate::models::Token;

use super::StoreError;

/// Single-slot token persistence. Setting overwrites any previous token.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<Token>, StoreError>;

    fn set(&self, token: &Token) -> Result<(), StoreError>;

    /// Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Token kept in the OS keychain.
///
/// The keychain account is the API host, so tokens for different
/// endpoints (e.g. github.com and an enterprise server) do not collide.
pub struct KeyringStore {
    account: String,
}

impl KeyringStore {
    pub fn for_api(base_url: &str) -> Self {
        let account = base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
        Self { account }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Ok(Entry::new(APP_NAME, &self.account)?)
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self) -> Result<Option<Token>, StoreError> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(Token::new(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, token: &Token) -> Result<(), StoreError> {
        self.entry()?.set_password(token.as_str())?;
        debug!(account = %self.account, "Stored token in keychain");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local slot. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Token) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Token>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<Token>, StoreError> {
        Ok(self.slot().clone())
    }

    fn set(&self, token: &Token) -> Result<(), StoreError> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_single_slot() {
        let store = MemoryStore::new();
        assert!(store.get().unwrap().is_none());

        store.set(&Token::new("tok-1")).unwrap();
        store.set(&Token::new("tok-2")).unwrap();
        assert_eq!(store.get().unwrap(), Some(Token::new("tok-2")));

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        // Clearing again is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_keyring_account_from_api_url() {
        assert_eq!(
            KeyringStore::for_api("https://api.github.com").account(),
            "api.github.com"
        );
        assert_eq!(
            KeyringStore::for_api("http://ghe.example.test/api/v3/").account(),
            "ghe.example.test/api/v3"
        );
    }
}
