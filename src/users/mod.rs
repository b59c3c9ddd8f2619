/// User persistence boundary
///
/// The authentication core only needs lookup by id/email, creation with a
/// unique email, and a sanitized public view. Storage engines implement
/// `UserStore`.

mod memory;
mod postgres;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Identity;
use crate::error::StoreError;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

/// Stored user record, including the password digest.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Drop the password digest before anything leaves the service.
    pub fn sanitize(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public-safe view of a user
#[derive(Debug, Clone, Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::Conflict` when the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}
