mod auth;
mod handle;
mod state;
mod types;

pub use auth::{AuthService, CURRENT_USER_ENDPOINT, LOGIN_ENDPOINT, LOGOUT_ENDPOINT};
pub use handle::SessionHandle;
pub use state::SessionState;
pub use types::{AuthPhase, Credentials, Identity, Session};
