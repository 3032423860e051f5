//! Two-step confirmation for the irreversible "delete all parameters" action

/// Warning shown while a purge awaits confirmation
pub const PURGE_WARNING: &str = "Are you ABSOLUTELY sure you want to delete ALL parameters? \
This action cannot be undone!\n\
This will permanently:\n  \
- Delete all parameters in this collection\n  \
- Remove all associated embeddings";

/// Purge confirmation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PurgeState {
    #[default]
    Idle,
    AwaitingConfirmation,
}

impl PurgeState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, PurgeState::AwaitingConfirmation)
    }

    /// "Delete all parameters" pressed
    pub fn request(&mut self) {
        *self = PurgeState::AwaitingConfirmation;
    }

    /// Confirm; returns `true` when the purge should be executed.
    /// Always lands back in `Idle`.
    pub fn confirm(&mut self) -> bool {
        let awaiting = self.is_awaiting();
        *self = PurgeState::Idle;
        awaiting
    }

    /// Cancel; never triggers a backend call
    pub fn cancel(&mut self) {
        *self = PurgeState::Idle;
    }
}
