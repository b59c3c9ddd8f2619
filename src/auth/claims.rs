/// JWT Claims structure
///
/// Payload of both access and refresh tokens. Only the caller's identity
/// travels in a token: `sub` and `email`, plus the standard timing claims.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity resolved from a token: the only data a token carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Which of the two token families a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id; keeps tokens minted in the same second distinct
    pub jti: String,
}

impl Claims {
    /// Create claims for `identity`, issued at `now` and valid for `ttl_seconds`.
    pub fn new(identity: &Identity, now: i64, ttl_seconds: i64) -> Self {
        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            iat: now,
            exp: now + ttl_seconds,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// A token is dead from its expiry instant onward.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub.clone(),
            email: self.email.clone(),
        }
    }
}
