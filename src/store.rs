//! An in-memory registry of loaded [`Account`] records, keyed by account short name.
//!
//! The real account store lives outside this crate (an encrypted on-disk file, decrypted by a
//! surrounding daemon); `AccountStore` is the ambient stand-in used to drive the engine end-to-end
//! from tests and the demo binary. Its lock exists only to let async tasks share it safely -- it
//! is not a substitute for the serialization the real IPC layer is responsible for.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::account::{now, Account};
use crate::error::{OidcError, Result};
use crate::lifetime;

/// A shared, cloneable handle to an [`AccountStore`]. Cloning shares the underlying map; it does
/// not duplicate the accounts.
#[derive(Clone, Default)]
pub struct AccountStore {
    inner: Arc<RwLock<HashMap<String, Account>>>,
}

impl AccountStore {
    pub fn new() -> Self {
        AccountStore::default()
    }

    /// Insert or replace the account named `account.name`.
    pub async fn load(&self, account: Account) {
        let name = account.name.clone();
        info!(account = %name, "loading account");
        self.inner.write().await.insert(name, account);
    }

    /// Remove and return the named account, wiping its secrets first. Returns `None` if no such
    /// account is loaded.
    pub async fn unload(&self, name: &str) -> Option<Account> {
        let mut map = self.inner.write().await;
        let mut account = map.remove(name)?;
        account.wipe_secrets();
        info!(account = %name, "unloaded account");
        Some(account)
    }

    /// Run `f` against the named account under an exclusive lock, e.g. to acquire a token and
    /// observe the resulting mutation. Returns [`OidcError::UnknownAccount`] if it isn't loaded.
    pub async fn with_account_mut<F, Fut, T>(&self, name: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Account) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut map = self.inner.write().await;
        let account = map
            .get_mut(name)
            .ok_or_else(|| OidcError::UnknownAccount(name.to_owned()))?;
        f(account).await
    }

    /// A read-only snapshot of the named account, for callers that only need to inspect state
    /// (e.g. `list-accounts`).
    pub async fn get(&self, name: &str) -> Option<Account> {
        self.inner.read().await.get(name).cloned()
    }

    /// The names of every currently loaded account, in no particular order.
    pub async fn list_names(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }

    /// Apply the credential lifetime policy to every loaded account: accounts whose `death` has
    /// passed are wiped and removed; accounts whose `pw_death` has passed keep their account but
    /// lose the stored password. Returns the names of accounts that were unloaded.
    pub async fn sweep_expired(&self) -> Vec<String> {
        let at = now();
        let mut map = self.inner.write().await;
        let mut unloaded = Vec::new();
        map.retain(|name, account| match lifetime::sweep(account, at) {
            lifetime::SweepOutcome::Unloaded => {
                unloaded.push(name.clone());
                false
            }
            _ => true,
        });
        unloaded
    }
}
