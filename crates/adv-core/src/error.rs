use crate::entity::{EntityId, Kind};

/// Alias for `Result<T, AdvError>`.
pub type AdvResult<T> = Result<T, AdvError>;

/// Errors raised by the entity graph and by verb handlers.
///
/// Everything except [`AdvError::EntityMissing`] and [`AdvError::HandlerFault`]
/// is a soft failure: the player is told, nothing changes, play continues.
#[derive(Debug, thiserror::Error)]
pub enum AdvError {
    /// An edge set already holds a link under this name.
    #[error("\"{0}\" is already linked here")]
    LinkConflict(String),

    /// An edge set holds no link under this name.
    #[error("nothing called \"{0}\" is linked here")]
    NoLink(String),

    /// The registry has no entity with this name (and kind).
    #[error("There is no \"{0}\" anywhere.")]
    NotFound(String),

    /// An entity exists but is not of the kind an operation needs.
    #[error("{name} is not a {expected}.")]
    WrongKind {
        /// The offending entity name.
        name: String,
        /// The kind the operation expected.
        expected: Kind,
    },

    /// The acting character's inventory is full.
    #[error("You already have {0} items, buddy.")]
    CapacityExceeded(usize),

    /// The actor is not allowed to do this right now (wrong room, no key, ...).
    #[error("{0}")]
    Unauthorized(String),

    /// Not enough money for a purchase.
    #[error("You don't have that kind of money, peasant.")]
    InsufficientFunds,

    /// The input source ran dry while a handler was waiting for an answer.
    #[error("No answer given.")]
    InputClosed,

    /// The conversation backend failed.
    #[error("The line crackles and goes quiet ({0}).")]
    Chat(String),

    /// An id that should be live no longer resolves to an entity.
    #[error("entity {0} no longer exists")]
    EntityMissing(EntityId),

    /// A verb handler failed in a way the player cannot fix.
    #[error("{verb} failed on {target}: {reason}")]
    HandlerFault {
        /// The verb being dispatched.
        verb: String,
        /// Name of the entity the verb was dispatched on.
        target: String,
        /// What went wrong.
        reason: String,
    },
}

impl AdvError {
    /// Soft failures are reported to the player and leave state untouched.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AdvError::EntityMissing(_) | AdvError::HandlerFault { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_are_not_recoverable() {
        assert!(AdvError::NotFound("rock".into()).is_recoverable());
        assert!(AdvError::CapacityExceeded(5).is_recoverable());
        assert!(!AdvError::EntityMissing(EntityId::new()).is_recoverable());
        let fault = AdvError::HandlerFault {
            verb: "eat".into(),
            target: "rock".into(),
            reason: "too hard".into(),
        };
        assert!(!fault.is_recoverable());
        assert_eq!(fault.to_string(), "eat failed on rock: too hard");
    }

    #[test]
    fn capacity_message_names_the_limit() {
        assert_eq!(
            AdvError::CapacityExceeded(1).to_string(),
            "You already have 1 items, buddy."
        );
    }
}
