//! Characters that roam while the player moves.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::entity::{Body, EntityId};
use crate::error::AdvResult;
use crate::game::Game;
use crate::world::World;

impl World {
    /// Have `watcher` react whenever `watched` enters a room.
    pub fn add_watcher(&mut self, watched: EntityId, watcher: EntityId) -> AdvResult<()> {
        self.character(watcher)?;
        let watchers = &mut self.character_mut(watched)?.watchers;
        if !watchers.contains(&watcher) {
            watchers.push(watcher);
        }
        Ok(())
    }
}

impl Game {
    /// Give every wanderer watching the player a chance to move to a random
    /// neighboring room. Doors are never chosen.
    pub fn stir_watchers(&mut self) {
        let chance = self.config().wander_chance;
        if chance.is_nan() || chance <= 0.0 {
            return;
        }
        let chance = chance.min(1.0);
        let watchers = match self.world.character(self.player()) {
            Ok(c) => c.watchers.clone(),
            Err(_) => return,
        };

        for watcher in watchers {
            let Ok(state) = self.world.character(watcher) else {
                continue;
            };
            if !state.wanders || !state.is_alive() {
                continue;
            }
            let Some(here) = state.current_room else {
                continue;
            };
            let rooms: Vec<EntityId> = self
                .world
                .rooms_from(here, false)
                .unwrap_or_default()
                .into_iter()
                .filter(|id| {
                    self.world
                        .entity(*id)
                        .is_ok_and(|e| matches!(e.body, Body::Room))
                })
                .collect();

            if !self.rng.random_bool(chance) {
                continue;
            }
            let Some(&to) = rooms.choose(&mut self.rng) else {
                continue;
            };
            match self.world.move_character(watcher, to) {
                Ok(_) => tracing::debug!(%watcher, %to, "wandered"),
                Err(err) => tracing::debug!(%watcher, error = %err, "could not wander"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterState, npc, player};
    use crate::config::GameConfig;
    use crate::rooms::room;

    fn town(chance: f64) -> (Game, EntityId, EntityId, [EntityId; 3]) {
        let mut world = World::default();
        let square = world.spawn(room("square", "")).unwrap();
        let market = world.spawn(room("market", "")).unwrap();
        let chapel = world.spawn(room("chapel", "")).unwrap();
        world.link_room(square, market).unwrap();
        world.link_room(square, chapel).unwrap();
        world
            .add_door("gate", market, chapel, true, None)
            .unwrap();

        let hero = world
            .spawn(player("hero", "", CharacterState::new()))
            .unwrap();
        let dog = world
            .spawn(npc("dog", "", CharacterState::new().wandering()))
            .unwrap();
        world.move_character(hero, square).unwrap();
        world.move_character(dog, market).unwrap();
        world.add_watcher(hero, dog).unwrap();

        let config = GameConfig::default().with_wander_chance(chance);
        (Game::new(world, hero, config), hero, dog, [square, market, chapel])
    }

    #[test]
    fn wanderer_moves_to_a_plain_room() {
        let (mut game, _, dog, [square, market, _]) = town(1.0);
        game.stir_watchers();
        // From the market the only plain neighbor is the square; the gate is a door.
        assert_eq!(game.world.current_room(dog).unwrap(), square);
        assert!(!game.world.entity(market).unwrap().links.contains("dog"));
    }

    #[test]
    fn zero_chance_never_moves() {
        let (mut game, _, dog, [_, market, _]) = town(0.0);
        for _ in 0..20 {
            game.stir_watchers();
        }
        assert_eq!(game.world.current_room(dog).unwrap(), market);
    }

    #[test]
    fn same_seed_same_walk() {
        let walk = || {
            let (mut game, _, dog, _) = town(0.5);
            (0..10)
                .map(|_| {
                    game.stir_watchers();
                    let room = game.world.current_room(dog).unwrap();
                    game.world.name_of(room).unwrap().to_string()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(walk(), walk());
    }

    #[test]
    fn watchers_are_not_duplicated() {
        let (mut game, hero, dog, _) = town(1.0);
        game.world.add_watcher(hero, dog).unwrap();
        assert_eq!(game.world.character(hero).unwrap().watchers, vec![dog]);
    }
}
