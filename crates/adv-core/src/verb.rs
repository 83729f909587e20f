//! Per-entity verb tables.
//!
//! What can currently be done to an entity is the set of handlers registered
//! on it. State machines (take/drop, lock/unlock, wear/remove) are expressed by
//! adding and removing entries as transitions happen.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::entity::EntityId;
use crate::error::{AdvError, AdvResult};
use crate::game::Game;

/// What a handler is invoked with.
#[derive(Debug, Clone)]
pub struct Call {
    /// The entity the verb was dispatched on.
    pub entity: EntityId,
    /// Optional indirect object ("use sword on *troll*").
    pub argument: Option<String>,
}

impl Call {
    /// A call with no argument.
    pub fn on(entity: EntityId) -> Self {
        Self {
            entity,
            argument: None,
        }
    }

    /// A call carrying an indirect object.
    pub fn with_argument(entity: EntityId, argument: impl Into<String>) -> Self {
        Self {
            entity,
            argument: Some(argument.into()),
        }
    }
}

/// The result of a handler that ran to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Whether any world state changed.
    pub state_changed: bool,
}

impl Outcome {
    /// Something changed.
    pub fn changed() -> Self {
        Self {
            state_changed: true,
        }
    }

    /// Nothing changed.
    pub fn unchanged() -> Self {
        Self {
            state_changed: false,
        }
    }
}

/// Tri-state result of dispatching a verb.
#[derive(Debug)]
pub enum Dispatch {
    /// A handler ran. Soft failures land here with `state_changed == false`.
    Handled(Outcome),
    /// The entity has no handler for this verb.
    UnknownVerb,
    /// The handler failed with a non-recoverable error.
    Fault(AdvError),
}

type Handler = dyn Fn(&mut Game, &Call) -> AdvResult<Outcome>;

/// A shareable verb handler.
#[derive(Clone)]
pub struct Verb(Rc<Handler>);

impl Verb {
    /// Wrap a handler.
    pub fn new(handler: impl Fn(&mut Game, &Call) -> AdvResult<Outcome> + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Run the handler.
    pub fn invoke(&self, game: &mut Game, call: &Call) -> AdvResult<Outcome> {
        (self.0)(game, call)
    }
}

impl fmt::Debug for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Verb(..)")
    }
}

/// Verb name → handler, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct VerbTable {
    verbs: BTreeMap<String, Verb>,
}

impl VerbTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a verb.
    pub fn add(&mut self, name: impl Into<String>, verb: Verb) {
        self.verbs.insert(name.into(), verb);
    }

    /// Deregister a verb. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.verbs.remove(name).is_some()
    }

    /// Whether a verb is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.verbs.contains_key(name)
    }

    /// A handle to a registered verb.
    pub fn get(&self, name: &str) -> Option<Verb> {
        self.verbs.get(name).cloned()
    }

    /// Registered verb names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.verbs.keys().map(String::as_str)
    }

    /// Number of registered verbs.
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    /// Whether no verbs are registered.
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}
