/// JWT Token Issuance and Validation
///
/// Access and refresh tokens are HS256 JWTs signed with two distinct secrets.
/// Expiry is checked against the same `Clock` that stamped the token, with no
/// leeway: a token is rejected from its `exp` second onward.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, Identity, TokenKind};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

/// Trusted time source shared by issuance and validation.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A freshly minted access/refresh pair.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: i64,
}

impl SigningKeys {
    fn from_secret(secret: &str, ttl: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Build the service from validated settings.
    ///
    /// # Errors
    /// Returns a configuration error for missing or shared secrets and
    /// non-positive lifetimes.
    pub fn new(config: &JwtSettings, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced against our own clock in `validate`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            access: SigningKeys::from_secret(&config.access_secret, config.access_token_expiry),
            refresh: SigningKeys::from_secret(&config.refresh_secret, config.refresh_token_expiry),
            validation,
            clock,
        })
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime in seconds of a `kind` token.
    pub fn ttl(&self, kind: TokenKind) -> i64 {
        self.keys(kind).ttl
    }

    /// Sign a single token of `kind` for `identity`.
    pub fn issue(&self, identity: &Identity, kind: TokenKind) -> Result<String, AppError> {
        let keys = self.keys(kind);
        let claims = Claims::new(identity, self.clock.now(), keys.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(|e| {
            AppError::Internal(format!("{} token generation failed: {}", kind.as_str(), e))
        })
    }

    /// Mint a fresh access/refresh pair for `identity`.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue(identity, TokenKind::Access)?,
            refresh_token: self.issue(identity, TokenKind::Refresh)?,
        })
    }

    /// Verify signature and expiry of a `kind` token and return its identity.
    ///
    /// # Errors
    /// `AuthError::TokenInvalid` for bad signatures or malformed tokens,
    /// `AuthError::TokenExpired` once `now >= exp`.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<Identity, AppError> {
        let claims = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(token_kind = kind.as_str(), "JWT validation error: {}", e);
                AuthError::TokenInvalid
            })?;

        if claims.is_expired_at(self.clock.now()) {
            tracing::info!(token_kind = kind.as_str(), user_id = %claims.sub, "Token expired");
            return Err(AuthError::TokenExpired.into());
        }

        Ok(claims.identity())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Settable clock for expiry tests.
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn new(now: i64) -> Self {
            Self(AtomicI64::new(now))
        }

        pub fn set(&self, now: i64) {
            self.0.store(now, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    pub fn test_config() -> JwtSettings {
        JwtSettings {
            access_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604_800,
        }
    }

    fn identity() -> Identity {
        Identity {
            id: "6f1c2d1e-user".to_string(),
            email: "test@example.com".to_string(),
        }
    }

    fn service_at(now: i64) -> (TokenService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let service = TokenService::new(&test_config(), clock.clone()).unwrap();
        (service, clock)
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = TokenService::new(&test_config(), Arc::new(SystemClock)).unwrap();
        let pair = service.issue_pair(&identity()).unwrap();

        assert_eq!(service.validate(&pair.access_token, TokenKind::Access).unwrap(), identity());
        assert_eq!(service.validate(&pair.refresh_token, TokenKind::Refresh).unwrap(), identity());
    }

    #[test]
    fn test_payload_shape() {
        let (service, _) = service_at(1_700_000_000);
        let token = service.issue(&identity(), TokenKind::Access).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(test_config().access_secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(claims["sub"], "6f1c2d1e-user");
        assert_eq!(claims["email"], "test@example.com");
        assert_eq!(claims["exp"], 1_700_000_900);
    }

    #[test]
    fn test_refresh_lifetime_is_seven_days() {
        let (service, clock) = service_at(1_000);
        let token = service.issue(&identity(), TokenKind::Refresh).unwrap();

        clock.set(1_000 + 604_799);
        assert!(service.validate(&token, TokenKind::Refresh).is_ok());

        clock.set(1_000 + 604_800);
        assert!(service.validate(&token, TokenKind::Refresh).is_err());
    }

    #[test]
    fn test_ttl_follows_settings() {
        let (service, _) = service_at(0);
        assert_eq!(service.ttl(TokenKind::Access), 900);
        assert_eq!(service.ttl(TokenKind::Refresh), 604_800);
    }

    #[test]
    fn test_access_expiry_boundary() {
        let (service, clock) = service_at(1_000);
        let token = service.issue(&identity(), TokenKind::Access).unwrap();

        clock.set(1_899);
        assert!(service.validate(&token, TokenKind::Access).is_ok());

        clock.set(1_900);
        let result = service.validate(&token, TokenKind::Access);
        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenExpired))));
    }

    #[test]
    fn test_cross_secret_rejection() {
        let (service, _) = service_at(chrono::Utc::now().timestamp());
        let pair = service.issue_pair(&identity()).unwrap();

        let as_access = service.validate(&pair.refresh_token, TokenKind::Access);
        let as_refresh = service.validate(&pair.access_token, TokenKind::Refresh);

        assert!(matches!(as_access, Err(AppError::Auth(AuthError::TokenInvalid))));
        assert!(matches!(as_refresh, Err(AppError::Auth(AuthError::TokenInvalid))));
    }

    #[test]
    fn test_tampered_token() {
        let (service, _) = service_at(chrono::Utc::now().timestamp());
        let token = service.issue(&identity(), TokenKind::Access).unwrap();

        let tampered = format!("{}X", token);
        assert!(service.validate(&tampered, TokenKind::Access).is_err());
        assert!(service.validate("invalid.token.here", TokenKind::Access).is_err());
    }

    #[test]
    fn test_pairs_are_distinct() {
        let (service, _) = service_at(1_000);
        let first = service.issue_pair(&identity()).unwrap();
        let second = service.issue_pair(&identity()).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, first.refresh_token);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let mut config = test_config();
        config.refresh_secret = String::new();

        let result = TokenService::new(&config, Arc::new(SystemClock));
        assert!(matches!(result, Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let (service, _) = service_at(1_000);
        let pair = service.issue_pair(&identity()).unwrap();
        let rendered = format!("{:?}", pair);

        assert!(!rendered.contains(&pair.refresh_token));
        assert!(!rendered.contains(&pair.access_token));
    }
}
