//! Rooms, doors and hidden doors, and the verbs that move the player around.

use crate::entity::{Body, DoorState, Entity, EntityId, Guard, Kind};
use crate::error::{AdvError, AdvResult};
use crate::game::{Game, GameEvent};
use crate::verb::{Call, Outcome, Verb};
use crate::world::World;

/// A plain room with a `go` verb.
pub fn room(name: &str, description: &str) -> Entity {
    Entity::new(name, description, Body::Room).with_verb("go", Verb::new(go))
}

impl World {
    /// Create a door joining `a` and `b`, linked symmetrically to both.
    ///
    /// A locked door offers `unlock`; an unlocked one offers `lock` when it
    /// has a key.
    pub fn add_door(
        &mut self,
        name: &str,
        a: EntityId,
        b: EntityId,
        locked: bool,
        key: Option<EntityId>,
    ) -> AdvResult<EntityId> {
        self.spawn_door(name, a, b, locked, key, None)
    }

    /// Create a door that stays out of sight until `guard` holds.
    pub fn add_hidden_door(
        &mut self,
        name: &str,
        a: EntityId,
        b: EntityId,
        locked: bool,
        key: Option<EntityId>,
        guard: Guard,
    ) -> AdvResult<EntityId> {
        self.spawn_door(name, a, b, locked, key, Some(guard))
    }

    fn spawn_door(
        &mut self,
        name: &str,
        a: EntityId,
        b: EntityId,
        locked: bool,
        key: Option<EntityId>,
        guard: Option<Guard>,
    ) -> AdvResult<EntityId> {
        let description = format!("Door between {} and {}", self.name_of(a)?, self.name_of(b)?);
        let state = DoorState {
            sides: [a, b],
            locked,
            key,
            guard,
        };
        let mut door = Entity::new(name, description, Body::Door(state))
            .with_verb("go", Verb::new(go_through));
        if locked {
            door.verbs.add("unlock", Verb::new(unlock));
        } else if key.is_some() {
            door.verbs.add("lock", Verb::new(lock));
        }

        let id = self.spawn(door)?;
        self.link_room(id, a)?;
        self.link_room(id, b)?;
        Ok(id)
    }

    fn door_state(&self, id: EntityId) -> AdvResult<&DoorState> {
        let entity = self.entity(id)?;
        entity.as_door().ok_or_else(|| AdvError::WrongKind {
            name: entity.name.clone(),
            expected: Kind::Door,
        })
    }
}

impl Game {
    /// Move `who` into `room`. When it is the player, wanderers get a turn and
    /// the new room is announced.
    pub fn enter(&mut self, who: EntityId, room: EntityId) -> AdvResult<()> {
        self.world.move_character(who, room)?;
        self.record(GameEvent::Moved {
            who: self.world.name_of(who)?.to_string(),
            to: self.world.name_of(room)?.to_string(),
        });
        if who == self.player() {
            self.stir_watchers();
            self.announce_room()?;
        }
        Ok(())
    }
}

/// Walk into a neighboring room.
pub fn go(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    if !game.world.is_adjacent(player, call.entity) {
        return Err(AdvError::Unauthorized(
            "You can't get there from here.".to_string(),
        ));
    }
    game.enter(player, call.entity)?;
    Ok(Outcome::changed())
}

/// Pass through a door to its other side.
pub fn go_through(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    let door = game.world.door_state(call.entity)?;
    if door.guard.as_ref().is_some_and(|g| !g.holds(&game.world)) {
        return Err(AdvError::Unauthorized(
            "The door is hidden and cannot be accessed yet.".to_string(),
        ));
    }
    if door.locked {
        return Err(AdvError::Unauthorized("That door is locked.".to_string()));
    }
    if !game.world.in_room(player, call.entity) {
        return Err(AdvError::Unauthorized("That door isn't here".to_string()));
    }

    let here = game.world.current_room(player)?;
    let there = game.world.door_other(call.entity, here)?;
    game.enter(player, there)?;
    Ok(Outcome::changed())
}

/// Unlock a door with its key.
pub fn unlock(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let door = check_key(game, call.entity, false)?;
    set_locked(game, call.entity, false)?;
    game.say("Door unlocked");
    game.record(GameEvent::Unlocked { door });
    Ok(Outcome::changed())
}

/// Lock a door with its key.
pub fn lock(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let door = check_key(game, call.entity, true)?;
    set_locked(game, call.entity, true)?;
    game.say("Door locked");
    game.record(GameEvent::Locked { door });
    Ok(Outcome::changed())
}

/// Validate a lock or unlock attempt and return the door's name.
fn check_key(game: &Game, door: EntityId, locking: bool) -> AdvResult<String> {
    let player = game.player();
    let state = game.world.door_state(door)?;
    if !game.world.is_adjacent(player, door) {
        return Err(AdvError::Unauthorized("That door isn't here".to_string()));
    }
    if state.locked == locking {
        let msg = if locking {
            "This door is already locked"
        } else {
            "This door is already unlocked"
        };
        return Err(AdvError::Unauthorized(msg.to_string()));
    }
    if !state.key.is_some_and(|key| game.world.holds(player, key)) {
        let msg = if locking {
            "You don't have the key to lock this door"
        } else {
            "You don't have the key to unlock this door"
        };
        return Err(AdvError::Unauthorized(msg.to_string()));
    }
    Ok(game.world.name_of(door)?.to_string())
}

fn set_locked(game: &mut Game, door: EntityId, locked: bool) -> AdvResult<()> {
    let entity = game.world.entity_mut(door)?;
    if let Some(state) = entity.as_door_mut() {
        state.locked = locked;
    }
    if locked {
        entity.verbs.remove("lock");
        entity.verbs.add("unlock", Verb::new(unlock));
    } else {
        entity.verbs.remove("unlock");
        entity.verbs.add("lock", Verb::new(lock));
    }
    tracing::debug!(door = %entity.name, locked, "door toggled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterState, player};
    use crate::config::GameConfig;
    use crate::game::Transcript;
    use crate::items;
    use crate::verb::Dispatch;

    struct House {
        game: Game,
        out: Transcript,
        hero: EntityId,
        kitchen: EntityId,
        hallway: EntityId,
        garden: EntityId,
        key: EntityId,
        door: EntityId,
    }

    // kitchen <-> hallway, hallway -[front door, locked]- garden, key in kitchen
    fn house() -> House {
        let mut world = World::default();
        let kitchen = world.spawn(room("kitchen", "Smells of soup.")).unwrap();
        let hallway = world.spawn(room("hallway", "Long.")).unwrap();
        let garden = world.spawn(room("garden", "Green.")).unwrap();
        world.link_room(kitchen, hallway).unwrap();
        let key = world.spawn(items::plain("key", "Brass.")).unwrap();
        world.add_item(kitchen, key).unwrap();
        let door = world
            .add_door("front door", hallway, garden, true, Some(key))
            .unwrap();
        let hero = world
            .spawn(player("hero", "", CharacterState::new()))
            .unwrap();
        world.move_character(hero, kitchen).unwrap();

        let out = Transcript::new();
        let game = Game::new(world, hero, GameConfig::default()).with_output(out.clone());
        House {
            game,
            out,
            hero,
            kitchen,
            hallway,
            garden,
            key,
            door,
        }
    }

    #[test]
    fn door_describes_its_sides() {
        let h = house();
        let door = h.game.world.entity(h.door).unwrap();
        assert_eq!(door.description, "Door between hallway and garden");
        assert!(door.verbs.contains("unlock"));
        assert!(!door.verbs.contains("lock"));
    }

    #[test]
    fn key_scenario() {
        let mut h = house();

        h.game.dispatch(h.door, "go", None);
        assert!(h.out.contains("That door is locked."));
        assert_eq!(h.game.world.current_room(h.hero).unwrap(), h.kitchen);

        h.game.dispatch(h.key, "take", None);
        h.game.dispatch(h.hallway, "go", None);
        assert_eq!(h.game.world.current_room(h.hero).unwrap(), h.hallway);

        h.game.dispatch(h.door, "unlock", None);
        assert!(h.out.contains("Door unlocked"));
        let verbs = &h.game.world.entity(h.door).unwrap().verbs;
        assert!(verbs.contains("lock"));
        assert!(!verbs.contains("unlock"));

        h.game.dispatch(h.door, "go", None);
        assert_eq!(h.game.world.current_room(h.hero).unwrap(), h.garden);
        assert!(h.game.world.entity(h.garden).unwrap().links.contains("hero"));
        assert!(!h.game.world.entity(h.hallway).unwrap().links.contains("hero"));
    }

    #[test]
    fn unlock_without_key_is_refused() {
        let mut h = house();
        h.game.dispatch(h.hallway, "go", None);
        h.game.dispatch(h.door, "unlock", None);
        assert!(h.out.contains("You don't have the key to unlock this door"));
        assert!(h.game.world.door_state(h.door).unwrap().locked);
    }

    #[test]
    fn unlock_from_another_room_is_refused() {
        let mut h = house();
        h.game.dispatch(h.key, "take", None);
        h.game.dispatch(h.door, "unlock", None);
        assert!(h.out.contains("That door isn't here"));
        assert!(h.game.world.door_state(h.door).unwrap().locked);
    }

    #[test]
    fn relocking_swaps_verbs_back() {
        let mut h = house();
        h.game.dispatch(h.key, "take", None);
        h.game.dispatch(h.hallway, "go", None);
        h.game.dispatch(h.door, "unlock", None);
        h.game.dispatch(h.door, "lock", None);

        let door = h.game.world.entity(h.door).unwrap();
        assert!(door.as_door().unwrap().locked);
        assert!(door.verbs.contains("unlock"));
        assert!(!door.verbs.contains("lock"));
    }

    #[test]
    fn go_to_a_room_that_is_not_next_door() {
        let mut h = house();
        match h.game.dispatch(h.garden, "go", None) {
            Dispatch::Handled(outcome) => assert!(!outcome.state_changed),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.game.world.current_room(h.hero).unwrap(), h.kitchen);
    }

    #[test]
    fn hidden_door_appears_when_its_guard_holds() {
        let mut h = house();
        let cellar = h.game.world.spawn(room("cellar", "Dark.")).unwrap();
        let hatch = h
            .game
            .world
            .add_hidden_door(
                "hatch",
                h.kitchen,
                cellar,
                false,
                None,
                Guard::new(|world| {
                    world
                        .lookup("hero")
                        .and_then(|hero| world.character(hero).map(|c| c.inventory.len()))
                        .is_ok_and(|held| held > 0)
                }),
            )
            .unwrap();

        assert!(!h.game.world.rooms_from(h.kitchen, false).unwrap().contains(&hatch));
        assert!(h.game.world.rooms_from(h.kitchen, true).unwrap().contains(&hatch));
        h.game.dispatch(hatch, "go", None);
        assert!(h.out.contains("The door is hidden and cannot be accessed yet."));
        assert_eq!(h.game.world.current_room(h.hero).unwrap(), h.kitchen);

        h.game.dispatch(h.key, "take", None);
        assert!(h.game.world.rooms_from(h.kitchen, false).unwrap().contains(&hatch));
        h.game.dispatch(hatch, "go", None);
        assert_eq!(h.game.world.current_room(h.hero).unwrap(), cellar);
    }

    #[test]
    fn moving_announces_the_new_room() {
        let mut h = house();
        h.game.dispatch(h.hallway, "go", None);
        assert!(h.out.contains("You are in: HALLWAY -- Long."));
        assert!(h.out.contains("The rooms next door: [kitchen, front door]"));
    }
}
