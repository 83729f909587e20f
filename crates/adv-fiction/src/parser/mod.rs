//! Command parsing and entity name resolution.

mod command;
mod resolver;

pub use command::{Command, canonical_verb, parse_command};
pub use resolver::{fuzzy_match, resolve_entity, suggest_entities};
