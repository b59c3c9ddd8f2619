/// Authentication Orchestrator
///
/// Composes the credential verifier, token service and cookie manager into
/// register, login, refresh and logout. Each operation is a single step: it
/// either completes and writes the refresh cookie onto the response under
/// construction, or fails without touching it.

use std::sync::Arc;

use actix_web::{web, HttpResponseBuilder};
use serde::{Deserialize, Serialize};

use crate::auth::claims::{Identity, TokenKind};
use crate::auth::cookie::SessionCookies;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{Clock, TokenService};
use crate::configuration::{PasswordSettings, Settings};
use crate::error::{AppError, AuthError};
use crate::users::{NewUser, PublicUser, User, UserStore};
use crate::validators::{is_valid_email, is_valid_name, is_valid_password, normalize_email};

/// Compared against when the email is unknown, so both login failures cost
/// one bcrypt verification.
const TIMING_EQUALIZER: &str = "timing-equalizer-password";

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login. The refresh token is never part of it.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LogoutResponse {
    pub message: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    cookies: SessionCookies,
    hash_cost: u32,
    dummy_digest: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenService,
        cookies: SessionCookies,
        password: &PasswordSettings,
    ) -> Result<Self, AppError> {
        let dummy_digest = hash_password(TIMING_EQUALIZER, password.hash_cost)?;

        Ok(Self {
            users,
            tokens,
            cookies,
            hash_cost: password.hash_cost,
            dummy_digest,
        })
    }

    /// Wire the service from loaded settings.
    pub fn from_settings(
        settings: &Settings,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let tokens = TokenService::new(&settings.jwt, clock)?;
        let cookies = SessionCookies::new(&settings.cookie, tokens.ttl(TokenKind::Refresh));
        Self::new(users, tokens, cookies, &settings.password)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.hash_cost;
        web::block(move || hash_password(&password, cost)).await?
    }

    async fn verify(&self, password: String, digest: String) -> Result<bool, AppError> {
        web::block(move || verify_password(&password, &digest)).await?
    }

    /// Mint a pair for `user`, put the refresh half in the cookie, return the
    /// access half.
    fn start_session(&self, user: &User, res: &mut HttpResponseBuilder) -> Result<String, AppError> {
        let pair = self.tokens.issue_pair(&user.identity())?;
        self.cookies.set_refresh_cookie(res, &pair.refresh_token);
        Ok(pair.access_token)
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    /// - Validation for malformed email, password or name
    /// - `StoreError::Conflict` when the email is taken, unchanged
    pub async fn register(
        &self,
        request: RegisterRequest,
        res: &mut HttpResponseBuilder,
    ) -> Result<AuthResponse, AppError> {
        let email = is_valid_email(&request.email)?;
        is_valid_password(&request.password)?;
        let name = request.name.as_deref().map(is_valid_name).transpose()?;

        let password_hash = self.hash(request.password).await?;
        let user = self
            .users
            .create(NewUser {
                email,
                name,
                password_hash,
            })
            .await?;

        let access_token = self.start_session(&user, res)?;
        tracing::info!(user_id = %user.id, "User registered successfully");

        Ok(AuthResponse {
            user: user.sanitize(),
            access_token,
        })
    }

    /// Check credentials and sign the user in.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        res: &mut HttpResponseBuilder,
    ) -> Result<AuthResponse, AppError> {
        let user = self.users.find_by_email(&normalize_email(email)).await?;

        let digest = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_digest.clone());
        let matches = self.verify(password.to_string(), digest).await?;

        let user = match user {
            Some(user) if matches => user,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };

        let access_token = self.start_session(&user, res)?;
        tracing::info!(user_id = %user.id, "User logged in successfully");

        Ok(AuthResponse {
            user: user.sanitize(),
            access_token,
        })
    }

    /// Rotate the session of a user already resolved by the refresh guard.
    ///
    /// The replaced refresh token stays cryptographically valid until its own
    /// expiry; rotation only overwrites the client's cookie.
    pub fn refresh(
        &self,
        user: &User,
        res: &mut HttpResponseBuilder,
    ) -> Result<RefreshResponse, AppError> {
        let access_token = self.start_session(user, res)?;
        tracing::info!(user_id = %user.id, "Tokens rotated");

        Ok(RefreshResponse { access_token })
    }

    /// Clear the refresh cookie. Safe to call repeatedly.
    pub fn logout(&self, res: &mut HttpResponseBuilder) -> LogoutResponse {
        self.cookies.clear_refresh_cookie(res);
        LogoutResponse {
            message: "Logged out".to_string(),
        }
    }

    /// Public view of the user behind an access token.
    pub async fn current_user(&self, identity: &Identity) -> Result<PublicUser, AppError> {
        self.users
            .find_by_id(&identity.id)
            .await?
            .map(|user| user.sanitize())
            .ok_or_else(|| AuthError::UnknownUser.into())
    }
}
