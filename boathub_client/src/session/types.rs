use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity reported by `/api/auth/login` and `/api/auth/user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub authenticated: bool,
}

/// Login form payload
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Client-side view of the server session.
///
/// `authenticated` is only ever true together with a `user`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<Identity>,
    pub authenticated: bool,
    pub pending: bool,
    pub last_error: Option<String>,
}

impl Session {
    pub fn phase(&self) -> AuthPhase {
        if self.pending {
            AuthPhase::Authenticating
        } else if self.authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.username.as_str())
    }

    pub(crate) fn sign_in(&mut self, user: Identity) {
        self.user = Some(user);
        self.authenticated = true;
    }

    pub(crate) fn sign_out(&mut self) {
        self.user = None;
        self.authenticated = false;
    }
}
