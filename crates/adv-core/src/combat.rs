//! Health and retaliation.
//!
//! Damage scales with the attacker's remaining health. A hurt character that
//! has attack strength hits back once; a counter-attack never provokes another.

use crate::entity::EntityId;
use crate::error::AdvResult;
use crate::game::{Game, GameEvent};
use crate::verb::{Call, Outcome};

/// Damage dealt by a character at `health` of `max_health` with `strength`.
pub fn scaled_damage(strength: u32, health: u32, max_health: u32) -> u32 {
    if max_health == 0 {
        return 0;
    }
    let ratio = f64::from(health.min(max_health)) / f64::from(max_health);
    (f64::from(strength) * ratio).round() as u32
}

/// The player attacks the character this verb is registered on.
pub fn attack_verb(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    attack(game, player, call.entity, true)?;
    Ok(Outcome::changed())
}

/// `attacker` hits `target` for damage scaled by the attacker's health.
pub fn attack(
    game: &mut Game,
    attacker: EntityId,
    target: EntityId,
    retaliate: bool,
) -> AdvResult<()> {
    let name = game.world.name_of(attacker)?.to_string();
    let target_name = game.world.name_of(target)?.to_string();
    let state = game.world.character(attacker)?;
    let damage = scaled_damage(state.attack_strength, state.health, state.max_health);
    let msg = state
        .attack_msg
        .clone()
        .unwrap_or_else(|| format!("{name} attacks {target_name}!"));
    game.world.character(target)?;

    game.say(msg);
    tracing::debug!(attacker = %name, target = %target_name, damage, "attack");
    take_damage(game, target, damage, Some(attacker), retaliate)
}

/// Apply damage to `target`. At zero health the target dies; otherwise it
/// counter-attacks `attacker` if allowed and able.
pub fn take_damage(
    game: &mut Game,
    target: EntityId,
    amount: u32,
    attacker: Option<EntityId>,
    retaliate: bool,
) -> AdvResult<()> {
    let name = game.world.name_of(target)?.to_string();
    let state = game.world.character_mut(target)?;
    state.health = state.health.saturating_sub(amount);
    let (percent, alive, strength) = (
        state.health_percent(),
        state.is_alive(),
        state.attack_strength,
    );
    let hurt = state.damage_msg.clone();

    if let Some(msg) = hurt {
        game.say(msg);
    }
    game.say(format!("{name} is at {percent}% health."));

    if !alive {
        return die(game, target);
    }
    if let Some(attacker) = attacker {
        let attacker_alive = game.world.character(attacker).is_ok_and(|c| c.is_alive());
        if retaliate && strength > 0 && attacker_alive {
            attack(game, target, attacker, false)?;
        }
    }
    Ok(())
}

/// Remove a dead character from play. The controlled player dying ends the game.
pub fn die(game: &mut Game, who: EntityId) -> AdvResult<()> {
    let name = game.world.name_of(who)?.to_string();
    if let Ok(room) = game.world.current_room(who) {
        let _ = game.world.unlink(room, &name);
    }
    let everyone: Vec<EntityId> = game.world.all_entities().iter().map(|e| e.id).collect();
    for id in everyone {
        if let Ok(character) = game.world.character_mut(id) {
            character.watchers.retain(|w| *w != who);
        }
    }

    let is_player = who == game.player();
    game.purge(&name);
    game.say(format!("{name} has died."));
    tracing::info!(who = %name, "died");
    game.record(GameEvent::Died { who: name });
    if is_player {
        tracing::info!("game over");
        game.say("GAME OVER");
        game.record(GameEvent::GameOver);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterState, npc, player};
    use crate::config::GameConfig;
    use crate::game::Transcript;
    use crate::rooms::room;
    use crate::world::World;

    fn arena(hero: CharacterState, foe: CharacterState) -> (Game, Transcript, EntityId, EntityId) {
        let mut world = World::default();
        let pit = world.spawn(room("pit", "")).unwrap();
        let hero = world.spawn(player("hero", "", hero)).unwrap();
        let troll = world.spawn(npc("troll", "", foe)).unwrap();
        world.move_character(hero, pit).unwrap();
        world.move_character(troll, pit).unwrap();
        let out = Transcript::new();
        let game = Game::new(world, hero, GameConfig::default()).with_output(out.clone());
        (game, out, hero, troll)
    }

    #[test]
    fn damage_scales_with_health() {
        assert_eq!(scaled_damage(4, 10, 10), 4);
        assert_eq!(scaled_damage(4, 5, 10), 2);
        assert_eq!(scaled_damage(4, 0, 10), 0);
        assert_eq!(scaled_damage(3, 1, 0), 0);
    }

    #[test]
    fn attack_at_full_health_deals_full_strength() {
        let (mut game, _, _, troll) = arena(
            CharacterState::new().with_attack(3),
            CharacterState::new().with_health(10),
        );
        game.dispatch(troll, "attack", None);
        assert_eq!(game.world.character(troll).unwrap().health, 7);
    }

    #[test]
    fn retaliation_happens_once() {
        let (mut game, out, hero, troll) = arena(
            CharacterState::new().with_health(20).with_attack(2),
            CharacterState::new().with_health(20).with_attack(2),
        );
        game.dispatch(troll, "attack", None);

        assert_eq!(game.world.character(troll).unwrap().health, 18);
        assert_eq!(game.world.character(hero).unwrap().health, 18);
        let attacks = out
            .lines()
            .iter()
            .filter(|l| l.ends_with("attacks hero!") || l.ends_with("attacks troll!"))
            .count();
        assert_eq!(attacks, 2);
    }

    #[test]
    fn health_saturates_and_death_purges() {
        let (mut game, out, hero, troll) = arena(
            CharacterState::new().with_attack(50),
            CharacterState::new().with_health(3).with_attack(5),
        );
        game.dispatch(troll, "attack", None);

        assert!(out.contains("troll is at 0% health."));
        assert!(out.contains("troll has died."));
        assert!(!game.world.contains(troll));
        assert!(game.world.find("troll").is_none());
        assert_eq!(game.world.character(hero).unwrap().health, 10);
        assert!(!game.is_over());
        assert!(game.events().contains(&GameEvent::Died { who: "troll".into() }));
    }

    #[test]
    fn player_death_ends_the_game() {
        let (mut game, out, hero, troll) = arena(
            CharacterState::new().with_health(1).with_attack(1),
            CharacterState::new().with_health(10).with_attack(5),
        );
        game.dispatch(troll, "attack", None);

        assert!(game.is_over());
        assert!(out.contains("GAME OVER"));
        assert!(!game.world.contains(hero));
    }
}
