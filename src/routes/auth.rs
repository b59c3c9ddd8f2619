/// Authentication Routes
///
/// Thin HTTP layer over `AuthService`. Guards run as extractors, so a handler
/// body only executes for callers that already passed them.

use actix_web::{web, HttpResponse};

use crate::auth::{AccessIdentity, AuthService, LoginRequest, RefreshSession, RegisterRequest};
use crate::error::AppError;

/// POST /auth/register
///
/// Creates the account, sets the refresh cookie and returns
/// `{ user, accessToken }`.
///
/// # Errors
/// - 400: invalid email, password or name
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let mut res = HttpResponse::Ok();
    let body = auth.register(form.into_inner(), &mut res).await?;
    Ok(res.json(body))
}

/// POST /auth/login
///
/// # Errors
/// - 401: invalid credentials, the same body for unknown email and wrong
///   password
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let mut res = HttpResponse::Ok();
    let body = auth.login(&form.email, &form.password, &mut res).await?;
    Ok(res.json(body))
}

/// GET /auth/refresh
///
/// **Requires the `refresh_token` cookie.** Rotates the cookie and returns
/// only `{ accessToken }`.
pub async fn refresh(
    session: RefreshSession,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let mut res = HttpResponse::Ok();
    let body = auth.refresh(&session.user, &mut res)?;
    Ok(res.json(body))
}

/// GET /auth/me
///
/// **Requires a valid access token** in the Authorization header.
///
/// # Errors
/// - 401: missing, invalid or expired token, or the user no longer exists
pub async fn get_current_user(
    AccessIdentity(identity): AccessIdentity,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = auth.current_user(&identity).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /auth/logout
pub async fn logout(
    AccessIdentity(identity): AccessIdentity,
    auth: web::Data<AuthService>,
) -> HttpResponse {
    let mut res = HttpResponse::Ok();
    let body = auth.logout(&mut res);
    tracing::info!(user_id = %identity.id, "User logged out");
    res.json(body)
}
