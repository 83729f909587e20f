//! Core of the adventure engine: the entity graph, the registry, and
//! capability dispatch.
//!
//! A [`World`] owns every [`Entity`] and doubles as the registry: each entity
//! is linked into the root by name. Rooms link their neighbors and whatever is
//! present in them; characters carry an inventory outside the graph. What can
//! be done to an entity is whatever its verb table holds right now, and a
//! [`Game`] dispatches those verbs on behalf of the controlled player.

/// Characters, inventories and movement.
pub mod character;
/// Conversations and news.
pub mod chat;
/// Health, attacks and death.
pub mod combat;
/// Game configuration.
pub mod config;
/// Entity nodes, identifiers and variant data.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The game context and its I/O collaborators.
pub mod game;
/// Containment and adjacency queries.
pub mod graph;
/// Item constructors and handlers.
pub mod items;
/// Rooms, doors and movement verbs.
pub mod rooms;
/// Per-entity verb tables.
pub mod verb;
/// Wandering characters.
pub mod wander;
/// The world registry.
pub mod world;

pub use character::{CharacterState, Inventory};
pub use chat::{CannedChat, ChatBackend, ChatMessage, Persona, Role};
pub use config::GameConfig;
pub use entity::{Body, Cents, DoorState, Entity, EntityId, Guard, ItemKind, ItemState, Kind};
pub use error::{AdvError, AdvResult};
pub use game::{
    Game, GameEvent, InputSource, NoInput, OutputSink, ScriptedInput, StdoutSink, Tee, Transcript,
};
pub use verb::{Call, Dispatch, Outcome, Verb, VerbTable};
pub use world::World;
