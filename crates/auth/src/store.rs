//! Credential store contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use usersvc_core::{Email, UserId};

use crate::{NewUserRecord, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence of user records keyed by id and by unique email.
///
/// Implementations own email uniqueness: concurrent inserts or updates that
/// would produce two records with the same email must fail with
/// [`StoreError::DuplicateEmail`]. A successful write is visible to the next
/// read.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    /// Save a new record, assigning its id.
    fn insert(&self, record: NewUserRecord) -> Result<User, StoreError>;
    /// Save changes to an existing record.
    fn update(&self, user: User) -> Result<User, StoreError>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id)
    }

    fn insert(&self, record: NewUserRecord) -> Result<User, StoreError> {
        (**self).insert(record)
    }

    fn update(&self, user: User) -> Result<User, StoreError> {
        (**self).update(user)
    }
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    ids_by_email: HashMap<Email, UserId>,
    last_id: i64,
}

/// In-memory store for tests/dev. Ids start at 1.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().map_err(poisoned)?.users.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .ids_by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.users.get(&id).cloned())
    }

    fn insert(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.ids_by_email.contains_key(&record.email) {
            return Err(StoreError::DuplicateEmail(record.email.into_string()));
        }

        inner.last_id += 1;
        let user = User {
            id: UserId::new(inner.last_id),
            email: record.email,
            name: record.name,
            password_hash: record.password_hash,
            role: record.role,
        };
        inner.ids_by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let previous_email = match inner.users.get(&user.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(StoreError::NotFound(user.id)),
        };

        if previous_email != user.email {
            if inner.ids_by_email.contains_key(&user.email) {
                return Err(StoreError::DuplicateEmail(user.email.into_string()));
            }
            inner.ids_by_email.remove(&previous_email);
            inner.ids_by_email.insert(user.email.clone(), user.id);
        }

        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn record(email: &str) -> NewUserRecord {
        NewUserRecord {
            email: Email::parse(email).unwrap(),
            name: "Test".to_string(),
            password_hash: "$hash".to_string(),
            role: Role::Passenger,
        }
    }

    #[test]
    fn insert_assigns_sequential_ids_and_is_readable() {
        let store = InMemoryCredentialStore::new();
        let a = store.insert(record("a@x.com")).unwrap();
        let b = store.insert(record("b@x.com")).unwrap();

        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
        assert_eq!(store.len().unwrap(), 2);

        let found = store.find_by_email(&Email::parse("a@x.com").unwrap()).unwrap();
        assert_eq!(found, Some(a.clone()));
        assert_eq!(store.find_by_id(a.id).unwrap(), Some(a));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@x.com")).unwrap();

        let err = store.insert(record("A@X.com")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail("a@x.com".to_string()));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn update_moves_the_email_index() {
        let store = InMemoryCredentialStore::new();
        let mut user = store.insert(record("a@x.com")).unwrap();
        user.email = Email::parse("c@x.com").unwrap();
        store.update(user.clone()).unwrap();

        assert_eq!(store.find_by_email(&Email::parse("a@x.com").unwrap()).unwrap(), None);
        assert_eq!(
            store.find_by_email(&Email::parse("c@x.com").unwrap()).unwrap(),
            Some(user)
        );
    }

    #[test]
    fn update_cannot_steal_another_users_email() {
        let store = InMemoryCredentialStore::new();
        store.insert(record("a@x.com")).unwrap();
        let mut b = store.insert(record("b@x.com")).unwrap();
        b.email = Email::parse("a@x.com").unwrap();

        assert!(matches!(store.update(b), Err(StoreError::DuplicateEmail(_))));
    }

    #[test]
    fn update_of_unknown_id_fails() {
        let store = InMemoryCredentialStore::new();
        let ghost = User {
            id: UserId::new(99),
            email: Email::parse("g@x.com").unwrap(),
            name: String::new(),
            password_hash: String::new(),
            role: Role::Passenger,
        };
        assert_eq!(store.update(ghost), Err(StoreError::NotFound(UserId::new(99))));
    }

    #[test]
    fn concurrent_registrations_of_one_email_admit_exactly_one() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.insert(record("race@x.com")).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn poisoned_lock_surfaces_as_unavailable() {
        let store = std::sync::Arc::new(InMemoryCredentialStore::new());
        assert!(store.is_empty().unwrap());

        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.find_by_email(&Email::parse("a@x.com").unwrap()),
            Err(StoreError::Unavailable(_))
        ));
    }
}
