use std::sync::{PoisonError, RwLock};

/// Navigation collaborator used when the server ends the session.
///
/// A browser embedding maps this onto its router; headless callers can use
/// [`MemoryNavigator`].
pub trait Navigator: Send + Sync {
    /// Path the user is currently on.
    fn current_path(&self) -> String;

    /// Moves the user to `path`.
    fn redirect(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: RwLock<NavigationState>,
}

#[derive(Debug)]
struct NavigationState {
    current: String,
    redirects: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(NavigationState {
                current: initial_path.into(),
                redirects: Vec::new(),
            }),
        }
    }

    /// Records a user-initiated move, which is not counted as a redirect.
    pub fn navigate(&self, path: impl Into<String>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .current = path.into();
    }

    /// Every redirect issued so far, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .redirects
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    fn redirect(&self, path: &str) {
        tracing::info!("Redirecting to {}", path);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.current = path.to_string();
        state.redirects.push(path.to_string());
    }
}
