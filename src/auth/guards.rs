/// Request guards
///
/// Both guards share one routine: pull a token out of the request with a
/// `TokenSource`, verify it with the matching secret, hand back the identity.
/// They are exposed as actix extractors so handlers receive the resolved
/// identity as a typed argument. Guards never touch cookies or mint tokens.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::claims::{Identity, TokenKind};
use crate::auth::cookie::REFRESH_COOKIE_NAME;
use crate::auth::service::AuthService;
use crate::auth::tokens::TokenService;
use crate::error::{AppError, AuthError, ConfigError};
use crate::users::User;

/// Where a guard looks for its token.
pub trait TokenSource {
    fn extract(req: &HttpRequest) -> Option<String>;
}

/// `Authorization: Bearer <token>`
pub struct BearerHeader;

impl TokenSource for BearerHeader {
    fn extract(req: &HttpRequest) -> Option<String> {
        let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// The `refresh_token` cookie, and nothing else.
pub struct RefreshCookieSource;

impl TokenSource for RefreshCookieSource {
    fn extract(req: &HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Extract a token with `S` and validate it as a `kind` token.
pub fn authenticate<S: TokenSource>(
    req: &HttpRequest,
    tokens: &TokenService,
    kind: TokenKind,
) -> Result<Identity, AppError> {
    let token = S::extract(req).ok_or(AuthError::MissingToken)?;
    tokens.validate(&token, kind)
}

fn auth_service(req: &HttpRequest) -> Result<web::Data<AuthService>, AppError> {
    req.app_data::<web::Data<AuthService>>().cloned().ok_or_else(|| {
        AppError::Config(ConfigError::MissingRequired(
            "AuthService is not registered as app data".to_string(),
        ))
    })
}

/// Identity proven by a valid access token.
#[derive(Debug, Clone)]
pub struct AccessIdentity(pub Identity);

impl FromRequest for AccessIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = auth_service(req).and_then(|service| {
            authenticate::<BearerHeader>(req, service.tokens(), TokenKind::Access)
        });

        if let Ok(identity) = &result {
            tracing::debug!(user_id = %identity.id, "Access token accepted");
        }

        ready(result.map(AccessIdentity))
    }
}

/// User behind a valid refresh cookie.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub user: User,
}

impl FromRequest for RefreshSession {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(resolve_refresh_session(req.clone()))
    }
}

async fn resolve_refresh_session(req: HttpRequest) -> Result<RefreshSession, AppError> {
    let service = auth_service(&req)?;
    let identity = authenticate::<RefreshCookieSource>(&req, service.tokens(), TokenKind::Refresh)?;

    // The cookie must still be there once verification is done.
    if RefreshCookieSource::extract(&req).is_none() {
        return Err(AuthError::MissingToken.into());
    }

    let user = service
        .users()
        .find_by_id(&identity.id)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    tracing::debug!(user_id = %user.id, "Refresh cookie accepted");
    Ok(RefreshSession { user })
}
