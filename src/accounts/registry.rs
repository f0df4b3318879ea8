//! In-memory account registry, one account per user.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::accounts::address::AccountAddress;
use crate::accounts::keys::KeyHandle;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Each user controls exactly one account; a second registration is a conflict.
    #[error("user {0} already has a registered account")]
    AlreadyRegistered(u64),
}

/// One user's blockchain account. Immutable once registered; key
/// material stays behind the opaque handle and is never exposed here.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: u64,
    pub address: AccountAddress,
    pub key: KeyHandle,
}

/// Thread-safe user → account table. No persistence; accounts live for
/// the process lifetime only.
#[derive(Clone, Default)]
pub struct AccountRegistry {
    inner: Arc<DashMap<u64, Account>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the user's account. Fails if one already exists.
    pub fn register(
        &self,
        user_id: u64,
        address: AccountAddress,
        key: KeyHandle,
    ) -> Result<Account, RegistryError> {
        let entry = self.inner.entry(user_id);
        match entry {
            dashmap::Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(user_id)),
            dashmap::Entry::Vacant(slot) => {
                let account = Account {
                    user_id,
                    address,
                    key,
                };
                slot.insert(account.clone());
                tracing::info!(user_id, address = %address, "Account registered");
                Ok(account)
            }
        }
    }

    pub fn get(&self, user_id: u64) -> Option<Account> {
        self.inner.get(&user_id).map(|r| r.value().clone())
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.inner.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::keys::KeyHandle;

    fn addr(last: u8) -> AccountAddress {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        AccountAddress::new(bytes)
    }

    #[test]
    fn register_then_get() {
        let registry = AccountRegistry::new();
        let account = registry.register(7, addr(1), KeyHandle::random()).unwrap();
        assert_eq!(account.user_id, 7);
        assert_eq!(registry.get(7).unwrap().address, addr(1));
        assert!(registry.contains(7));
        assert!(!registry.contains(8));
    }

    #[test]
    fn second_registration_is_a_conflict() {
        let registry = AccountRegistry::new();
        registry.register(7, addr(1), KeyHandle::random()).unwrap();
        let err = registry
            .register(7, addr(2), KeyHandle::random())
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered(7));
        // The original account is untouched.
        assert_eq!(registry.get(7).unwrap().address, addr(1));
    }
}
