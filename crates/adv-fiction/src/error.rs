//! Error types for play sessions.

use adv_core::{AdvError, EntityId};
use thiserror::Error;

/// Result type for session operations.
pub type FictionResult<T> = Result<T, FictionError>;

/// Errors raised while resolving and running player commands.
#[derive(Debug, Error)]
pub enum FictionError {
    /// The controlled player no longer exists.
    #[error("player entity not found: {0}")]
    PlayerNotFound(EntityId),

    /// No registered entity has this name.
    #[error("There is no \"{name}\" anywhere.")]
    NotFound {
        /// What the player typed.
        name: String,
        /// Close registry names.
        suggestions: Vec<String>,
    },

    /// The entity exists but the player can't reach it.
    #[error("That isn't here.")]
    NotHere(String),

    /// The input could not be parsed into anything.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// An engine error surfaced outside of verb dispatch.
    #[error(transparent)]
    Core(#[from] AdvError),
}

impl FictionError {
    /// The text shown to the player.
    pub fn player_message(&self) -> String {
        match self {
            FictionError::NotFound { suggestions, .. } if !suggestions.is_empty() => {
                format!("{self} Did you mean: {}?", suggestions.join(", "))
            }
            FictionError::UnknownCommand(_) => "I don't know how to do that.".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_offered() {
        let err = FictionError::NotFound {
            name: "rok".into(),
            suggestions: vec!["rock".into()],
        };
        assert_eq!(
            err.player_message(),
            "There is no \"rok\" anywhere. Did you mean: rock?"
        );
    }

    #[test]
    fn core_errors_pass_through() {
        let err: FictionError = AdvError::InsufficientFunds.into();
        assert_eq!(
            err.player_message(),
            "You don't have that kind of money, peasant."
        );
    }
}
