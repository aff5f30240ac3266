use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use super::types::Session;

#[derive(Debug, Default)]
struct SessionCell {
    session: Session,
    generation: u64,
}

/// Shared handle on the [`Session`].
///
/// Cloning is cheap; all clones see the same session. Transitions are
/// numbered so that only the most recently started one may write its result.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    cell: Arc<RwLock<SessionCell>>,
}

/// Ticket for a transition started with [`SessionHandle::begin`].
#[derive(Debug)]
#[must_use]
pub(crate) struct Transition(u64);

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Session {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .clone()
    }

    /// Marks the session as gone after the server rejected it.
    pub fn invalidate(&self) {
        tracing::debug!("Invalidating client session");
        self.write().session.sign_out();
    }

    /// Back to a fresh unauthenticated session. Transitions still in flight
    /// are superseded.
    pub fn reset(&self) {
        let mut cell = self.write();
        cell.generation += 1;
        cell.session = Session::default();
    }

    pub(crate) fn update(&self, apply: impl FnOnce(&mut Session)) {
        apply(&mut self.write().session);
    }

    /// Enters `Authenticating` and supersedes any transition started earlier.
    pub(crate) fn begin(&self) -> Transition {
        let mut cell = self.write();
        cell.generation += 1;
        cell.session.pending = true;
        cell.session.last_error = None;
        Transition(cell.generation)
    }

    /// Applies the outcome of `transition` unless a newer one has started.
    /// Returns whether the outcome was applied.
    pub(crate) fn complete(&self, transition: Transition, apply: impl FnOnce(&mut Session)) -> bool {
        let mut cell = self.write();
        if cell.generation != transition.0 {
            tracing::debug!(
                "Discarding superseded session transition {} (current {})",
                transition.0,
                cell.generation
            );
            return false;
        }
        apply(&mut cell.session);
        cell.session.pending = false;
        true
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionCell> {
        self.cell.write().unwrap_or_else(PoisonError::into_inner)
    }
}
