// Refresh-token cookie handling
//
// The refresh token only ever travels in this cookie. Setting and clearing
// share one attribute template so a browser always matches the removal to the
// cookie it holds.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpResponseBuilder;

use crate::configuration::CookieSettings;

/// Cookie name for the refresh token
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(Debug, Clone)]
pub struct SessionCookies {
    secure: bool,
    path: String,
    max_age_seconds: i64,
}

impl SessionCookies {
    /// `max_age_seconds` should equal the refresh-token lifetime.
    pub fn new(settings: &CookieSettings, max_age_seconds: i64) -> Self {
        Self {
            secure: settings.secure,
            path: "/".to_string(),
            max_age_seconds,
        }
    }

    fn refresh_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE_NAME, value)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .path(self.path.clone())
            .max_age(Duration::seconds(self.max_age_seconds))
            .finish()
    }

    /// Attach the refresh cookie carrying `token`, replacing any previous one.
    pub fn set_refresh_cookie(&self, res: &mut HttpResponseBuilder, token: &str) {
        res.cookie(self.refresh_cookie(token.to_string()));
    }

    /// Instruct the client to drop the refresh cookie.
    pub fn clear_refresh_cookie(&self, res: &mut HttpResponseBuilder) {
        let mut cookie = self.refresh_cookie(String::new());
        cookie.make_removal();
        res.cookie(cookie);
    }
}
