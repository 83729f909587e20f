//! Characters: location, inventory, money, health.

use std::collections::BTreeMap;

use crate::chat::{self, Persona};
use crate::combat;
use crate::entity::{Body, Cents, Entity, EntityId, Kind};
use crate::error::{AdvError, AdvResult};
use crate::items;
use crate::verb::Verb;
use crate::world::World;

/// Default number of inventory slots.
pub const DEFAULT_CAPACITY: usize = 5;

/// A capacity-bounded name → item map, disjoint from the graph edges.
#[derive(Debug, Clone)]
pub struct Inventory {
    items: Vec<(String, EntityId)>,
    capacity: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Inventory {
    /// An empty inventory with `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Maximum number of items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether every slot is taken.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Add an item. Fails when full or when the name is already held.
    pub fn insert(&mut self, name: &str, id: EntityId) -> AdvResult<()> {
        if self.get(name).is_some() {
            return Err(AdvError::LinkConflict(name.to_string()));
        }
        if self.is_full() {
            return Err(AdvError::CapacityExceeded(self.capacity));
        }
        self.items.push((name.to_string(), id));
        Ok(())
    }

    /// Remove an item by name.
    pub fn remove(&mut self, name: &str) -> Option<EntityId> {
        let pos = self.items.iter().position(|(n, _)| n == name)?;
        Some(self.items.remove(pos).1)
    }

    /// Look up a held item by name.
    pub fn get(&self, name: &str) -> Option<EntityId> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Whether this exact item is held.
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.items.iter().any(|(_, held)| *held == id)
    }

    /// Held item names in the order they were picked up.
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Held item IDs in the order they were picked up.
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|(_, id)| *id).collect()
    }
}

/// Everything a character owns besides its graph edges.
#[derive(Debug, Clone)]
pub struct CharacterState {
    /// The room the character is in. Exactly one once placed.
    pub current_room: Option<EntityId>,
    /// Items on the character's person.
    pub inventory: Inventory,
    /// Items currently worn, a subset of the inventory.
    pub wearing: BTreeMap<String, EntityId>,
    /// Currency balance.
    pub money: Cents,
    /// Current health; zero means dead.
    pub health: u32,
    /// Health at full strength.
    pub max_health: u32,
    /// Damage dealt at full health. Zero means the character never fights back.
    pub attack_strength: u32,
    /// Printed when this character is hurt.
    pub damage_msg: Option<String>,
    /// Printed when this character attacks.
    pub attack_msg: Option<String>,
    /// Moves around on its own when watching the player.
    pub wanders: bool,
    /// Characters that react when this one enters a room.
    pub watchers: Vec<EntityId>,
    /// Conversation persona, for characters that can talk.
    pub persona: Option<Persona>,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            current_room: None,
            inventory: Inventory::default(),
            wearing: BTreeMap::new(),
            money: Cents::default(),
            health: 10,
            max_health: 10,
            attack_strength: 0,
            damage_msg: None,
            attack_msg: None,
            wanders: false,
            watchers: Vec::new(),
            persona: None,
        }
    }
}

impl CharacterState {
    /// Default stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set starting and maximum health.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    /// Set attack strength.
    pub fn with_attack(mut self, strength: u32) -> Self {
        self.attack_strength = strength;
        self
    }

    /// Set inventory capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.inventory = Inventory::with_capacity(capacity);
        self
    }

    /// Set the starting balance.
    pub fn with_money(mut self, money: Cents) -> Self {
        self.money = money;
        self
    }

    /// Set the hurt and attack messages.
    pub fn with_messages(mut self, damage_msg: &str, attack_msg: &str) -> Self {
        self.damage_msg = Some(damage_msg.to_string());
        self.attack_msg = Some(attack_msg.to_string());
        self
    }

    /// Make the character wander.
    pub fn wandering(mut self) -> Self {
        self.wanders = true;
        self
    }

    /// Give the character a conversation persona.
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Health as a whole percentage of maximum.
    pub fn health_percent(&self) -> u32 {
        if self.max_health == 0 {
            return 0;
        }
        ((u64::from(self.health) * 100) / u64::from(self.max_health)) as u32
    }

    /// Whether the character still has health.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Drop every trace of `name` from the inventory and worn map.
    pub(crate) fn forget(&mut self, name: &str) -> bool {
        let held = self.inventory.remove(name).is_some();
        let worn = self.wearing.remove(name).is_some();
        held || worn
    }
}

/// The controlled player: no verbs of its own.
pub fn player(name: &str, description: &str, state: CharacterState) -> Entity {
    Entity::new(name, description, Body::Character(Box::new(state)))
}

/// A non-player character: can be looked at and attacked, and talks if it
/// has a persona.
pub fn npc(name: &str, description: &str, state: CharacterState) -> Entity {
    let talks = state.persona.is_some();
    let entity = Entity::new(name, description, Body::Character(Box::new(state)))
        .with_verb("look", Verb::new(items::look))
        .with_verb("attack", Verb::new(combat::attack_verb));
    if talks {
        entity.with_verb("talk", Verb::new(chat::talk_verb))
    } else {
        entity
    }
}

/// An NPC that answers one custom verb with a fixed line, e.g. "greet" → "Hi!".
pub fn npc_with_verb(
    name: &str,
    description: &str,
    state: CharacterState,
    verb: &str,
    message: &str,
) -> Entity {
    let message = message.to_string();
    npc(name, description, state).with_verb(
        verb,
        Verb::new(move |game, _| {
            game.say(&message);
            Ok(crate::verb::Outcome::unchanged())
        }),
    )
}

impl World {
    /// Character state of `who`, or `WrongKind`.
    pub fn character(&self, who: EntityId) -> AdvResult<&CharacterState> {
        let entity = self.entity(who)?;
        entity.as_character().ok_or_else(|| AdvError::WrongKind {
            name: entity.name.clone(),
            expected: Kind::Character,
        })
    }

    /// Mutable character state of `who`, or `WrongKind`.
    pub fn character_mut(&mut self, who: EntityId) -> AdvResult<&mut CharacterState> {
        let entity = self.entity_mut(who)?;
        let name = entity.name.clone();
        entity.as_character_mut().ok_or(AdvError::WrongKind {
            name,
            expected: Kind::Character,
        })
    }

    /// The room `who` is in.
    pub fn current_room(&self, who: EntityId) -> AdvResult<EntityId> {
        self.character(who)?
            .current_room
            .ok_or_else(|| AdvError::Unauthorized("You are nowhere at all.".to_string()))
    }

    /// Move a character: leave the old room's presence set, update the
    /// current room, join the new room's presence set.
    ///
    /// Either all three steps happen or none do. Returns the previous room.
    pub fn move_character(&mut self, who: EntityId, to: EntityId) -> AdvResult<Option<EntityId>> {
        let name = self.name_of(who)?.to_string();
        let from = self.character(who)?.current_room;
        let target = self.entity(to)?;
        if !target.is(Kind::Room) {
            return Err(AdvError::WrongKind {
                name: target.name.clone(),
                expected: Kind::Room,
            });
        }
        if from == Some(to) {
            return Ok(from);
        }

        let popped = match from {
            Some(old) => self.unlink(old, &name).is_ok(),
            None => false,
        };

        if let Err(err) = self.entity_mut(to)?.links.insert(&name, who, false) {
            if let (Some(old), true) = (from, popped) {
                self.entity_mut(old)?.links.insert(&name, who, true)?;
            }
            return Err(err);
        }
        self.character_mut(who)?.current_room = Some(to);

        tracing::debug!(who = %name, to = %self.name_of(to)?, "moved");
        Ok(from)
    }

    /// Add to a character's balance and return the new total.
    pub fn earn(&mut self, who: EntityId, amount: Cents) -> AdvResult<Cents> {
        let c = self.character_mut(who)?;
        c.money = c.money.saturating_add(amount);
        Ok(c.money)
    }

    /// Take from a character's balance. Fails softly when short.
    pub fn spend(&mut self, who: EntityId, amount: Cents) -> AdvResult<Cents> {
        let c = self.character_mut(who)?;
        c.money = c
            .money
            .checked_sub(amount)
            .ok_or(AdvError::InsufficientFunds)?;
        Ok(c.money)
    }

    /// Whether `id` is linked into the room `who` is standing in.
    pub fn in_room(&self, who: EntityId, id: EntityId) -> bool {
        self.current_room(who)
            .and_then(|room| self.entity(room))
            .is_ok_and(|room| room.links.contains_id(id))
    }

    /// Whether `who` carries `id`.
    pub fn holds(&self, who: EntityId, id: EntityId) -> bool {
        self.character(who)
            .is_ok_and(|c| c.inventory.contains_id(id))
    }

    /// Present in the actor's room or held by the actor.
    pub fn can_see(&self, who: EntityId, id: EntityId) -> bool {
        self.in_room(who, id) || self.holds(who, id)
    }

    /// Whether `room` is a visible neighbor of the room `who` is in.
    pub fn is_adjacent(&self, who: EntityId, room: EntityId) -> bool {
        self.current_room(who)
            .and_then(|here| self.rooms_from(here, false))
            .is_ok_and(|rooms| rooms.contains(&room))
    }
}
