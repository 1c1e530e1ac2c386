//! Engine contract errors.
//!
//! Only programmer/contract violations surface as errors: an action index
//! outside the declared space, or stepping a finished game. An action
//! that is structurally valid but not legal for the current
//! (player, phase) is a defined no-op, not an error.

use thiserror::Error;

use crate::actions::DecodeError;

/// Contract violations reported by [`crate::engine::MonopolyEnv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The supplied action index lies outside the action space.
    #[error(transparent)]
    InvalidAction(#[from] DecodeError),

    /// `step` was called after the game already finished.
    #[error("step called after the game has finished")]
    GameFinished,
}
