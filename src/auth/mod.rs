/// Authentication module
///
/// Password hashing, access/refresh JWT issuance and validation, the
/// refresh-cookie manager, request guards and the orchestrating service.

mod claims;
mod cookie;
mod guards;
mod password;
mod service;
mod tokens;

pub use claims::{Claims, Identity, TokenKind};
pub use cookie::{SessionCookies, REFRESH_COOKIE_NAME};
pub use guards::{authenticate, AccessIdentity, BearerHeader, RefreshCookieSource, RefreshSession, TokenSource};
pub use password::{hash_password, verify_password};
pub use service::{
    AuthResponse, AuthService, LoginRequest, LogoutResponse, RefreshResponse, RegisterRequest,
};
pub use tokens::{Clock, SystemClock, TokenPair, TokenService};
