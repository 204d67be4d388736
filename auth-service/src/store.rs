use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pk_auth::Role;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already in use")]
    EmailTaken,
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// A stored account. The password hash never leaves the store layer in
/// serialized responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub status: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub password_hash: String,
}

/// Public projection of a [`User`] safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub status: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            status: user.status.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Boundary to whatever persists accounts. The relational database
/// behind the original backend is a collaborator, not part of this
/// service; handlers only ever see this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;
}

/// In-process store keyed by id, with email uniqueness enforced on
/// insert. Email lookups are case-insensitive.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    next_id: i64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut guard = self.inner.write().expect("rwlock poisoned");

        let taken = guard
            .users
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(&new_user.email));
        if taken {
            return Err(StoreError::EmailTaken);
        }

        guard.next_id += 1;
        let user = User {
            id: guard.next_id,
            name: new_user.name,
            email: new_user.email,
            avatar: None,
            status: None,
            role: new_user.role,
            created_at: Utc::now(),
            password_hash: new_user.password_hash,
        };
        guard.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryUserStore::new();
        let first = store.insert(new_user("a@example.com")).await.unwrap();
        let second = store.insert(new_user("b@example.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@example.com")).await.unwrap();
        let err = store.insert(new_user("A@EXAMPLE.COM")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[tokio::test]
    async fn lookup_by_id_and_email() {
        let store = InMemoryUserStore::new();
        let created = store.insert(new_user("a@example.com")).await.unwrap();
        assert!(store.find_by_id(created.id).await.unwrap().is_some());
        assert!(store.find_by_id(99).await.unwrap().is_none());
        assert!(store
            .find_by_email("A@example.com")
            .await
            .unwrap()
            .is_some());
    }
}
