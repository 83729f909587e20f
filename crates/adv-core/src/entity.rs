use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::character::CharacterState;
use crate::error::{AdvError, AdvResult};
use crate::verb::{Verb, VerbTable};
use crate::world::World;

/// Unique identifier for every entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// An amount of money in cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cents(pub u64);

impl Cents {
    /// Add two amounts, saturating at the maximum.
    pub fn saturating_add(self, other: Cents) -> Cents {
        Cents(self.0.saturating_add(other.0))
    }

    /// Subtract, or `None` if `other` is larger.
    pub fn checked_sub(self, other: Cents) -> Option<Cents> {
        self.0.checked_sub(other.0).map(Cents)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A named, non-owning edge set.
///
/// Keeps insertion order so listings and door sides are stable.
#[derive(Debug, Clone, Default)]
pub struct Links {
    entries: Vec<(String, EntityId)>,
}

impl Links {
    /// Create an empty edge set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge. Fails with [`AdvError::LinkConflict`] when the name is taken,
    /// unless `replace` is set, in which case the old target is overwritten in place.
    pub fn insert(&mut self, name: &str, id: EntityId, replace: bool) -> AdvResult<()> {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) if replace => {
                entry.1 = id;
                Ok(())
            }
            Some(_) => Err(AdvError::LinkConflict(name.to_string())),
            None => {
                self.entries.push((name.to_string(), id));
                Ok(())
            }
        }
    }

    /// Remove an edge and return its target.
    pub fn remove(&mut self, name: &str) -> AdvResult<EntityId> {
        let pos = self
            .entries
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| AdvError::NoLink(name.to_string()))?;
        Ok(self.entries.remove(pos).1)
    }

    /// Look up the target of an edge.
    pub fn get(&self, name: &str) -> Option<EntityId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Whether an edge with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether any edge points at this entity.
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.entries.iter().any(|(_, target)| *target == id)
    }

    /// Iterate over `(name, target)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }

    /// Edge targets in insertion order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.iter().map(|(_, id)| *id).collect()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A predicate re-evaluated on every access (hidden doors).
#[derive(Clone)]
pub struct Guard(Rc<dyn Fn(&World) -> bool>);

impl Guard {
    /// Wrap a predicate over the world.
    pub fn new(predicate: impl Fn(&World) -> bool + 'static) -> Self {
        Self(Rc::new(predicate))
    }

    /// Evaluate the predicate now.
    pub fn holds(&self, world: &World) -> bool {
        (self.0)(world)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// State carried by a door: the two rooms it joins, its lock and an optional guard.
#[derive(Debug, Clone)]
pub struct DoorState {
    /// The two rooms on either side.
    pub sides: [EntityId; 2],
    /// Whether the door is currently locked.
    pub locked: bool,
    /// The item that locks and unlocks the door.
    pub key: Option<EntityId>,
    /// Present on hidden doors only.
    pub guard: Option<Guard>,
}

impl DoorState {
    /// The side opposite `from`. A door entered from neither side leads to its first side.
    pub fn other(&self, from: EntityId) -> EntityId {
        if self.sides[0] == from {
            self.sides[1]
        } else {
            self.sides[0]
        }
    }

    /// Whether this is a hidden door.
    pub fn is_hidden(&self) -> bool {
        self.guard.is_some()
    }
}

/// The concrete flavor of an item, with the data its verbs need.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Take, drop and look.
    Plain,
    /// Taking it credits the taker's balance.
    Money {
        /// How much it is worth.
        amount: Cents,
    },
    /// Can be worn and removed.
    Wearable {
        /// Printed when worn.
        wear_msg: String,
        /// Printed when removed.
        remove_msg: String,
    },
    /// Exposes a custom verb with an optional message and effect.
    Useable {
        /// The verb name, e.g. "read".
        verb: String,
        /// Printed when used.
        use_msg: Option<String>,
        /// Extra behavior run after the message.
        effect: Option<Verb>,
    },
    /// One-shot consumable that vanishes from the world when used.
    Eatable {
        /// The verb name, usually "eat".
        verb: String,
        /// Printed when eaten.
        use_msg: Option<String>,
    },
    /// Damages a character when used.
    Weapon {
        /// Damage per hit.
        damage: u32,
    },
    /// Calls a phoneable character for a fee.
    Phone {
        /// Cost per call.
        cost: Cents,
        /// Printed when the caller cannot pay.
        cost_msg: String,
    },
    /// Opens an inspection console over the registry.
    Computer,
}

/// Flags and flavor shared by every item.
#[derive(Debug, Clone)]
pub struct ItemState {
    /// Whether `take` is offered.
    pub takeable: bool,
    /// Whether `drop` is offered once held.
    pub droppable: bool,
    /// Concrete flavor.
    pub kind: ItemKind,
}

impl ItemState {
    /// A takeable, droppable item of the given flavor.
    pub fn new(kind: ItemKind) -> Self {
        Self {
            takeable: true,
            droppable: true,
            kind,
        }
    }
}

/// The closed set of entity variants.
#[derive(Debug, Clone)]
pub enum Body {
    /// The registry root.
    World,
    /// A location.
    Room,
    /// A room-like node joining two rooms.
    Door(DoorState),
    /// Something that can be present in a room or held.
    Item(ItemState),
    /// A person or creature; also an item in the sense that it can be present.
    Character(Box<CharacterState>),
}

/// Kind filter used by registry queries. Matching honors the is-a hierarchy:
/// a door is a room, a character is an item, a weapon is a useable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Every entity.
    Any,
    /// Rooms and doors.
    Room,
    /// Doors, hidden or not.
    Door,
    /// Hidden doors only.
    HiddenDoor,
    /// Items and characters.
    Item,
    /// Money.
    Money,
    /// Wearables.
    Wearable,
    /// Useables and their specializations.
    Useable,
    /// Eatables.
    Eatable,
    /// Weapons.
    Weapon,
    /// Phones.
    Phone,
    /// Computers.
    Computer,
    /// Characters.
    Character,
}

impl Kind {
    /// Whether an entity body satisfies this filter.
    pub fn matches(self, body: &Body) -> bool {
        match self {
            Kind::Any => true,
            Kind::Room => matches!(body, Body::Room | Body::Door(_)),
            Kind::Door => matches!(body, Body::Door(_)),
            Kind::HiddenDoor => matches!(body, Body::Door(d) if d.is_hidden()),
            Kind::Item => matches!(body, Body::Item(_) | Body::Character(_)),
            Kind::Character => matches!(body, Body::Character(_)),
            Kind::Money => item_kind(body).is_some_and(|k| matches!(k, ItemKind::Money { .. })),
            Kind::Wearable => {
                item_kind(body).is_some_and(|k| matches!(k, ItemKind::Wearable { .. }))
            }
            Kind::Useable => item_kind(body).is_some_and(|k| {
                matches!(
                    k,
                    ItemKind::Useable { .. }
                        | ItemKind::Eatable { .. }
                        | ItemKind::Weapon { .. }
                        | ItemKind::Phone { .. }
                        | ItemKind::Computer
                )
            }),
            Kind::Eatable => item_kind(body).is_some_and(|k| matches!(k, ItemKind::Eatable { .. })),
            Kind::Weapon => item_kind(body).is_some_and(|k| matches!(k, ItemKind::Weapon { .. })),
            Kind::Phone => item_kind(body).is_some_and(|k| matches!(k, ItemKind::Phone { .. })),
            Kind::Computer => item_kind(body).is_some_and(|k| matches!(k, ItemKind::Computer)),
        }
    }

    /// Parse a kind from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        let kind = match s {
            "any" | "entity" => Kind::Any,
            "room" => Kind::Room,
            "door" => Kind::Door,
            "hidden_door" | "hidden door" => Kind::HiddenDoor,
            "item" => Kind::Item,
            "money" => Kind::Money,
            "wearable" => Kind::Wearable,
            "useable" => Kind::Useable,
            "eatable" => Kind::Eatable,
            "weapon" => Kind::Weapon,
            "phone" => Kind::Phone,
            "computer" => Kind::Computer,
            "character" => Kind::Character,
            _ => return None,
        };
        Some(kind)
    }
}

fn item_kind(body: &Body) -> Option<&ItemKind> {
    match body {
        Body::Item(item) => Some(&item.kind),
        _ => None,
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Any => "entity",
            Kind::Room => "room",
            Kind::Door => "door",
            Kind::HiddenDoor => "hidden door",
            Kind::Item => "item",
            Kind::Money => "money",
            Kind::Wearable => "wearable",
            Kind::Useable => "useable",
            Kind::Eatable => "eatable",
            Kind::Weapon => "weapon",
            Kind::Phone => "phone",
            Kind::Computer => "computer",
            Kind::Character => "character",
        };
        f.write_str(s)
    }
}

/// A node in the world graph: identity, description, edges and verbs.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Name, unique within the registry.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Named, non-owning edges to other entities.
    pub links: Links,
    /// Verbs currently available on this entity.
    pub verbs: VerbTable,
    /// Variant data.
    pub body: Body,
}

impl Entity {
    /// Create an entity with no edges and no verbs.
    pub fn new(name: impl Into<String>, description: impl Into<String>, body: Body) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: description.into(),
            links: Links::new(),
            verbs: VerbTable::new(),
            body,
        }
    }

    /// Register a verb, replacing any handler already under that name.
    pub fn with_verb(mut self, name: impl Into<String>, verb: Verb) -> Self {
        self.verbs.add(name, verb);
        self
    }

    /// Whether the entity satisfies a kind filter.
    pub fn is(&self, kind: Kind) -> bool {
        kind.matches(&self.body)
    }

    /// Door state, if this is a door.
    pub fn as_door(&self) -> Option<&DoorState> {
        match &self.body {
            Body::Door(door) => Some(door),
            _ => None,
        }
    }

    /// Mutable door state, if this is a door.
    pub fn as_door_mut(&mut self) -> Option<&mut DoorState> {
        match &mut self.body {
            Body::Door(door) => Some(door),
            _ => None,
        }
    }

    /// Item state, if this is a plain item (not a character).
    pub fn as_item(&self) -> Option<&ItemState> {
        match &self.body {
            Body::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Mutable item state.
    pub fn as_item_mut(&mut self) -> Option<&mut ItemState> {
        match &mut self.body {
            Body::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Character state, if this is a character.
    pub fn as_character(&self) -> Option<&CharacterState> {
        match &self.body {
            Body::Character(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable character state.
    pub fn as_character_mut(&mut self) -> Option<&mut CharacterState> {
        match &mut self.body {
            Body::Character(c) => Some(c),
            _ => None,
        }
    }

    /// Characters are never takeable.
    pub fn is_takeable(&self) -> bool {
        self.as_item().is_some_and(|i| i.takeable)
    }

    /// Characters are never droppable.
    pub fn is_droppable(&self) -> bool {
        self.as_item().is_some_and(|i| i.droppable)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {}", self.name.to_uppercase(), self.description)
    }
}
