//! Containment and adjacency queries over the world graph.
//!
//! Room → room edges are symmetric (both sides link each other). Room → item
//! edges are one-directional presence links.

use std::collections::BTreeMap;

use crate::entity::{Entity, EntityId, Kind};
use crate::error::{AdvError, AdvResult};
use crate::world::World;

impl World {
    /// Link two room-like entities to each other. A side that is already
    /// linked is left as is.
    pub fn link_room(&mut self, a: EntityId, b: EntityId) -> AdvResult<()> {
        self.expect_room(a)?;
        self.expect_room(b)?;
        for (from, to) in [(a, b), (b, a)] {
            match self.link(from, to, false) {
                Ok(()) | Err(AdvError::LinkConflict(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Make `item` present in `room`.
    pub fn add_item(&mut self, room: EntityId, item: EntityId) -> AdvResult<()> {
        self.expect_room(room)?;
        if !self.entity(item)?.is(Kind::Item) {
            return Err(AdvError::WrongKind {
                name: self.name_of(item)?.to_string(),
                expected: Kind::Item,
            });
        }
        self.link(room, item, false)
    }

    /// Items and characters present in `room`.
    pub fn items_in(&self, room: EntityId, takeable_only: bool) -> AdvResult<Vec<EntityId>> {
        Ok(self
            .linked_entities(room)?
            .filter(|e| e.is(Kind::Item))
            .filter(|e| !takeable_only || e.is_takeable())
            .map(|e| e.id)
            .collect())
    }

    /// Rooms and doors reachable in one step from `room`. Hidden doors whose
    /// guard is currently false are left out unless `include_hidden` is set.
    pub fn rooms_from(&self, room: EntityId, include_hidden: bool) -> AdvResult<Vec<EntityId>> {
        Ok(self
            .linked_entities(room)?
            .filter(|e| e.is(Kind::Room))
            .filter(|e| include_hidden || self.is_revealed(e))
            .map(|e| e.id)
            .collect())
    }

    /// Doors attached to `room`. Hidden doors whose guard is currently false
    /// are left out unless `include_hidden` is set.
    pub fn doors_from(&self, room: EntityId, include_hidden: bool) -> AdvResult<Vec<EntityId>> {
        Ok(self
            .linked_entities(room)?
            .filter(|e| e.is(Kind::Door))
            .filter(|e| include_hidden || self.is_revealed(e))
            .map(|e| e.id)
            .collect())
    }

    /// The room on the other side of `door` when coming from `from`.
    pub fn door_other(&self, door: EntityId, from: EntityId) -> AdvResult<EntityId> {
        let entity = self.entity(door)?;
        entity
            .as_door()
            .map(|d| d.other(from))
            .ok_or_else(|| AdvError::WrongKind {
                name: entity.name.clone(),
                expected: Kind::Door,
            })
    }

    /// Whether a hidden door's guard currently holds. Anything else is always revealed.
    pub fn is_revealed(&self, entity: &Entity) -> bool {
        entity
            .as_door()
            .and_then(|d| d.guard.as_ref())
            .is_none_or(|guard| guard.holds(self))
    }

    /// Every verb offered in `room` and by `actor`'s inventory, grouped by
    /// verb name. Hidden doors with a false guard offer nothing.
    pub fn actions_at(
        &self,
        room: EntityId,
        actor: EntityId,
    ) -> AdvResult<BTreeMap<String, Vec<EntityId>>> {
        let mut actions: BTreeMap<String, Vec<EntityId>> = BTreeMap::new();
        let present = self.linked_entities(room)?.filter(|e| self.is_revealed(e));
        let held = self
            .character(actor)?
            .inventory
            .ids()
            .into_iter()
            .filter_map(|id| self.entity(id).ok());

        for entity in present.chain(held) {
            for verb in entity.verbs.names() {
                let ids = actions.entry(verb.to_string()).or_default();
                if !ids.contains(&entity.id) {
                    ids.push(entity.id);
                }
            }
        }
        Ok(actions)
    }

    fn linked_entities(&self, from: EntityId) -> AdvResult<impl Iterator<Item = &Entity>> {
        let ids = self.entity(from)?.links.ids();
        Ok(ids.into_iter().filter_map(move |id| self.entity(id).ok()))
    }

    fn expect_room(&self, id: EntityId) -> AdvResult<()> {
        let entity = self.entity(id)?;
        if entity.is(Kind::Room) {
            Ok(())
        } else {
            Err(AdvError::WrongKind {
                name: entity.name.clone(),
                expected: Kind::Room,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Body, Guard};
    use crate::items;

    fn room(world: &mut World, name: &str) -> EntityId {
        world.spawn(Entity::new(name, "", Body::Room)).unwrap()
    }

    #[test]
    fn link_room_is_symmetric_and_idempotent() {
        let mut world = World::default();
        let kitchen = room(&mut world, "kitchen");
        let hallway = room(&mut world, "hallway");

        world.link_room(kitchen, hallway).unwrap();
        world.link_room(kitchen, hallway).unwrap();
        world.link_room(hallway, kitchen).unwrap();

        assert_eq!(world.rooms_from(kitchen, false).unwrap(), vec![hallway]);
        assert_eq!(world.rooms_from(hallway, false).unwrap(), vec![kitchen]);
    }

    #[test]
    fn doors_from_hides_unrevealed_doors() {
        let mut world = World::default();
        let a = room(&mut world, "a");
        let b = room(&mut world, "b");
        let gate = world.add_door("gate", a, b, false, None).unwrap();
        let hatch = world
            .add_hidden_door("hatch", a, b, false, None, Guard::new(|_| false))
            .unwrap();

        assert_eq!(world.doors_from(a, false).unwrap(), vec![gate]);
        assert_eq!(world.doors_from(a, true).unwrap(), vec![gate, hatch]);
        assert_eq!(world.doors_from(b, false).unwrap(), vec![gate]);
        assert!(world.doors_from(gate, false).unwrap().is_empty());
    }

    #[test]
    fn link_room_rejects_items() {
        let mut world = World::default();
        let kitchen = room(&mut world, "kitchen");
        let rock = world.spawn(items::plain("rock", "")).unwrap();
        assert!(matches!(
            world.link_room(kitchen, rock),
            Err(AdvError::WrongKind { .. })
        ));
    }

    #[test]
    fn add_item_is_one_directional() {
        let mut world = World::default();
        let kitchen = room(&mut world, "kitchen");
        let rock = world.spawn(items::plain("rock", "")).unwrap();
        world.add_item(kitchen, rock).unwrap();

        assert_eq!(world.items_in(kitchen, false).unwrap(), vec![rock]);
        assert!(world.entity(rock).unwrap().links.is_empty());
        assert!(world.rooms_from(kitchen, false).unwrap().is_empty());
    }

    #[test]
    fn takeable_filter() {
        let mut world = World::default();
        let kitchen = room(&mut world, "kitchen");
        let rock = world.spawn(items::plain("rock", "")).unwrap();
        let stove = world.spawn(items::fixture("stove", "")).unwrap();
        world.add_item(kitchen, rock).unwrap();
        world.add_item(kitchen, stove).unwrap();

        assert_eq!(world.items_in(kitchen, true).unwrap(), vec![rock]);
        assert_eq!(world.items_in(kitchen, false).unwrap().len(), 2);
    }

    #[test]
    fn actions_group_by_verb() {
        let mut world = World::default();
        let kitchen = room(&mut world, "kitchen");
        let rock = world.spawn(items::plain("rock", "")).unwrap();
        let stick = world.spawn(items::plain("stick", "")).unwrap();
        world.add_item(kitchen, rock).unwrap();
        world.add_item(kitchen, stick).unwrap();
        let hero = world
            .spawn(crate::character::player(
                "hero",
                "",
                crate::character::CharacterState::new(),
            ))
            .unwrap();
        world.move_character(hero, kitchen).unwrap();

        let actions = world.actions_at(kitchen, hero).unwrap();
        assert_eq!(actions["take"], vec![rock, stick]);
        assert_eq!(actions["look"].len(), 2);
        assert!(!actions.contains_key("drop"));
    }
}
