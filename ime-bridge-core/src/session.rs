//! Bookkeeping shared by the adapters for the text input session.

use std::cell::Cell;

use crate::error::ImeError;

/// The "text input active" flag, plus whether the adapter was detached.
#[derive(Debug, Default)]
pub struct SessionState {
    active: Cell<bool>,
    detached: Cell<bool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    /// Whether a start request should go ahead: `Ok(false)` if a session is already running.
    pub fn should_start(&self) -> Result<bool, ImeError> {
        if self.detached.get() {
            return Err(ImeError::Detached);
        }
        Ok(!self.active.get())
    }

    pub fn activate(&self) {
        self.active.set(true);
    }

    /// Mark the session inactive, returning whether it was active.
    ///
    /// Adapters call this before running any side effect of a stop, so that a listener stopping
    /// the session again from inside a notification sees it already stopped.
    pub fn deactivate(&self) -> bool {
        self.active.replace(false)
    }

    /// Returns `false` if the adapter was already detached.
    pub fn mark_detached(&self) -> bool {
        !self.detached.replace(true)
    }
}

/// Marks writes to the native text field made by the adapter itself.
///
/// Native fields report programmatic changes through the same callback as user edits. While
/// the guard returned by [`EditSuppression::suppress`] is alive, [`EditSuppression::is_suppressed`]
/// is `true` and adapters drop change notifications.
#[derive(Debug, Default)]
pub struct EditSuppression {
    depth: Cell<u32>,
}

impl EditSuppression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suppress(&self) -> SuppressGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        SuppressGuard { owner: self }
    }

    pub fn is_suppressed(&self) -> bool {
        self.depth.get() > 0
    }
}

#[derive(Debug)]
pub struct SuppressGuard<'a> {
    owner: &'a EditSuppression,
}

impl Drop for SuppressGuard<'_> {
    fn drop(&mut self) {
        self.owner.depth.set(self.owner.depth.get() - 1);
    }
}
