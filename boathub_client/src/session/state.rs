use std::sync::Arc;

use crate::csrf::TokenFetcher;

use super::auth::AuthService;
use super::handle::SessionHandle;
use super::types::{AuthPhase, Credentials, Session};

/// Login/logout/session-check state machine.
///
/// ```text
/// Unauthenticated ──login/check──▶ Authenticating ──ok──▶ Authenticated
///        ▲                              │                      │
///        └────────────failure───────────┘◀───────logout────────┘
/// ```
///
/// Errors never escape these actions; they are recorded in
/// [`Session::last_error`] for display.
#[derive(Clone)]
pub struct SessionState {
    handle: SessionHandle,
    auth: AuthService,
    fetcher: Arc<TokenFetcher>,
}

impl SessionState {
    pub fn new(handle: SessionHandle, auth: AuthService, fetcher: Arc<TokenFetcher>) -> Self {
        Self {
            handle,
            auth,
            fetcher,
        }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn snapshot(&self) -> Session {
        self.handle.snapshot()
    }

    pub fn phase(&self) -> AuthPhase {
        self.handle.snapshot().phase()
    }

    pub fn is_authenticated(&self) -> bool {
        self.handle.snapshot().authenticated
    }

    pub fn username(&self) -> Option<String> {
        self.handle.snapshot().username().map(str::to_string)
    }

    /// Logs in and returns whether this call left the session authenticated.
    ///
    /// A successful login refreshes the CSRF token, since the new session has
    /// its own token scope. A failed login leaves the token alone.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        tracing::debug!("Logging in as {}", credentials.username);
        let transition = self.handle.begin();

        match self.auth.login(credentials).await {
            Ok(user) => {
                let applied = self.handle.complete(transition, |s| s.sign_in(user));
                if !applied {
                    return false;
                }

                tracing::info!("Logged in as {}", credentials.username);
                if let Err(e) = self.fetcher.refresh().await {
                    tracing::warn!("Logged in but failed to refresh CSRF token: {}", e);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Login failed for {}: {}", credentials.username, e);
                self.handle.complete(transition, |s| {
                    s.sign_out();
                    s.last_error = Some(e.to_string());
                });
                false
            }
        }
    }

    /// Logs out. Local state and the CSRF token are cleared whatever the
    /// server answers; a server failure is only recorded.
    pub async fn logout(&self) {
        let transition = self.handle.begin();

        let result = self.auth.logout().await;
        self.fetcher.store().clear();

        match result {
            Ok(()) => {
                tracing::info!("Logged out");
                self.handle.complete(transition, |s| s.sign_out());
            }
            Err(e) => {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
                self.handle.complete(transition, |s| {
                    s.sign_out();
                    s.last_error = Some(e.to_string());
                });
            }
        }
    }

    /// Probes the current user. Used by route guards; leaves the token alone.
    pub async fn check_auth(&self) -> bool {
        let transition = self.handle.begin();

        match self.auth.current_user().await {
            Ok(user) => {
                tracing::debug!("Session is active for {}", user.username);
                self.handle.complete(transition, |s| s.sign_in(user))
            }
            Err(e) => {
                tracing::debug!("No active session: {}", e);
                self.handle.complete(transition, |s| s.sign_out());
                false
            }
        }
    }

    pub fn clear_error(&self) {
        self.handle.update(|s| s.last_error = None);
    }

    /// Drops the client session and the CSRF token without calling the server.
    pub fn clear_auth_state(&self) {
        self.handle.reset();
        self.fetcher.store().clear();
    }
}
