//! Play sessions for the adventure engine.
//!
//! Parses typed commands, resolves target names against the registry,
//! checks that the player can reach the target, and dispatches the verb.
//! Every outcome, including failures, comes back as text in a [`Reply`].

/// Error types for play sessions.
pub mod error;
/// Command parsing and entity resolution.
pub mod parser;
/// Interactive session management.
pub mod session;

pub use error::{FictionError, FictionResult};
pub use parser::{Command, parse_command};
pub use session::{Reply, RoomSnapshot, Session};
