use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use super::{NewUser, User, UserStore};
use crate::error::StoreError;

/// Process-local user store.
///
/// Used when no database is configured and by the test suites. Records live
/// in one map keyed by id; the email index is kept in the same lock so the
/// uniqueness check and the insert are atomic.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<String, User>,
    id_by_email: HashMap<String, String>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user, returning whether it existed.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        match tables.by_id.remove(id) {
            Some(user) => {
                tables.id_by_email.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unexpected("user table lock poisoned".to_string())
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables
            .id_by_email
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables.by_id.get(id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if tables.id_by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }

        let record = User {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables
            .id_by_email
            .insert(record.email.clone(), record.id.clone());
        tables.by_id.insert(record.id.clone(), record.clone());

        Ok(record)
    }
}
