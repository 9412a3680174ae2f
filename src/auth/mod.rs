pub mod authorize;
pub mod password;
pub mod secret;
pub mod service;
pub mod session;

pub use authorize::{has_role, is_authenticated, is_owner, is_owner_or_role, Owned};
pub use secret::secrets_match;
pub use service::{AuthError, AuthService};
pub use session::{SessionSigner, SessionUser, SESSION_COOKIE, SESSION_MAX_AGE_SECS};
