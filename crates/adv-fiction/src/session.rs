//! Play sessions: turn typed lines into dispatched verbs.

use std::collections::BTreeMap;

use adv_core::{
    AdvError, Cents, Dispatch, EntityId, Game, GameEvent, Kind, OutputSink, Tee, Transcript,
    game::list,
};
use serde::Serialize;

use crate::error::{FictionError, FictionResult};
use crate::parser::{Command, canonical_verb, parse_command, resolve_entity, suggest_entities};

/// Commands handled by the session itself rather than by entities.
const BUILTINS: &[&str] = &["look", "inventory", "where", "help", "quit"];

/// Verbs worth prompting for even when nothing here offers them.
const COMMON_VERBS: &[&str] = &[
    "take", "drop", "go", "use", "talk", "eat", "wear", "remove", "lock", "unlock", "attack",
];

/// How many "did you mean" names to offer.
const SUGGESTION_LIMIT: usize = 3;

/// What a command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Everything the engine said while handling the command.
    pub message: String,
    /// Whether the world changed.
    pub state_changed: bool,
}

/// A read-only view of where the player is, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    /// Room name.
    pub name: String,
    /// Room description.
    pub description: String,
    /// Items and characters present, excluding the player.
    pub items: Vec<String>,
    /// Visible neighboring rooms and doors.
    pub exits: Vec<String>,
    /// Names of carried items.
    pub inventory: Vec<String>,
    /// Names of worn items.
    pub wearing: Vec<String>,
    /// Balance.
    pub money: Cents,
    /// Current health.
    pub health: u32,
    /// Health at full strength.
    pub max_health: u32,
    /// Verb → names of entities offering it.
    pub actions: BTreeMap<String, Vec<String>>,
}

/// An interactive session over one game.
pub struct Session {
    game: Game,
    transcript: Transcript,
    quit: bool,
}

impl Session {
    /// Wrap a game. Engine output is collected into each [`Reply`].
    pub fn new(mut game: Game) -> Self {
        let transcript = Transcript::new();
        game.set_output(transcript.clone());
        Self {
            game,
            transcript,
            quit: false,
        }
    }

    /// Wrap a game, also sending engine output to `live` as it happens.
    pub fn with_live_output(mut game: Game, live: impl OutputSink + 'static) -> Self {
        let transcript = Transcript::new();
        game.set_output(Tee(transcript.clone(), live));
        Self {
            game,
            transcript,
            quit: false,
        }
    }

    /// The game being played.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Mutable access to the game.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Whether the player asked to quit.
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// Whether play has ended, by quitting or by death.
    pub fn is_finished(&self) -> bool {
        self.quit || self.game.is_over()
    }

    /// Announce the starting room.
    pub fn start(&mut self) -> Reply {
        self.run(|session| {
            session.game.announce_room()?;
            Ok(false)
        })
    }

    /// Process one line of player input.
    pub fn process(&mut self, input: &str) -> Reply {
        if self.is_finished() {
            return Reply {
                message: "The game is over.".to_string(),
                state_changed: false,
            };
        }
        let input = input.trim();
        tracing::debug!(input, "command");

        if let Some(room) = self.adjacent_room_named(input) {
            let name = self.game.world.name_of(room).map(str::to_string);
            if let Ok(name) = name {
                return self.resolve_and_dispatch("go", &name, None);
            }
        }

        match parse_command(input) {
            Command::Look { target: None } | Command::Where => self.run(|session| {
                session.game.announce_room()?;
                Ok(false)
            }),
            Command::Look {
                target: Some(target),
            } => self.resolve_and_dispatch("look", &target, None),
            Command::Inventory => self.run(|session| {
                session.inventory()?;
                Ok(false)
            }),
            Command::Help => self.run(|session| {
                let text = session.help()?;
                session.game.say(text);
                Ok(false)
            }),
            Command::Quit => {
                self.quit = true;
                self.run(|session| {
                    session.game.say("Goodbye!");
                    Ok(false)
                })
            }
            Command::Act {
                verb,
                target,
                argument,
            } => self.resolve_and_dispatch(&verb, &target, argument),
            Command::Incomplete { verb } => self.run(|session| {
                if session.known_verb(&verb) {
                    session.game.say(format!("What do you want to {verb}?"));
                    Ok(false)
                } else {
                    Err(FictionError::UnknownCommand(verb))
                }
            }),
        }
    }

    /// Resolve `target`, check the player can reach it, and dispatch `verb` on it.
    pub fn resolve_and_dispatch(
        &mut self,
        verb: &str,
        target: &str,
        argument: Option<String>,
    ) -> Reply {
        let verb = canonical_verb(verb);
        self.run(|session| {
            let id = session.locate(target)?;
            match session.game.dispatch(id, &verb, argument) {
                Dispatch::Handled(outcome) => Ok(outcome.state_changed),
                Dispatch::UnknownVerb => Err(FictionError::UnknownCommand(verb.clone())),
                Dispatch::Fault(err) => {
                    let name = session
                        .game
                        .world
                        .name_of(id)
                        .map(str::to_string)
                        .unwrap_or_else(|_| target.to_string());
                    let reason = match err {
                        AdvError::HandlerFault { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    session.game.say(format!(
                        "Something went wrong trying to {verb} the {name}: {reason}"
                    ));
                    Ok(false)
                }
            }
        })
    }

    /// A snapshot of the player's surroundings.
    pub fn snapshot(&self) -> FictionResult<RoomSnapshot> {
        let world = &self.game.world;
        let player = self.game.player();
        let state = world
            .character(player)
            .map_err(|_| FictionError::PlayerNotFound(player))?;
        let room = world.current_room(player)?;
        let here = world.entity(room)?;
        let items = world
            .names_of(&world.items_in(room, false)?)
            .into_iter()
            .filter(|n| Some(n.as_str()) != world.name_of(player).ok())
            .collect();
        let actions = world
            .actions_at(room, player)?
            .into_iter()
            .map(|(verb, ids)| (verb, world.names_of(&ids)))
            .collect();

        Ok(RoomSnapshot {
            name: here.name.clone(),
            description: here.description.clone(),
            items,
            exits: world.names_of(&world.rooms_from(room, false)?),
            inventory: state.inventory.names(),
            wearing: state.wearing.keys().cloned().collect(),
            money: state.money,
            health: state.health,
            max_health: state.max_health,
            actions,
        })
    }

    /// Look a name up in the registry, restricted to `kind`.
    pub fn registry_lookup(&self, name: &str, kind: Kind) -> FictionResult<EntityId> {
        Ok(self.game.world.get(name, kind)?)
    }

    /// Remove an entity from everywhere. Returns whether anything was removed.
    pub fn registry_purge(&mut self, name: &str) -> bool {
        self.game.purge(name)
    }

    /// Completions for a partially typed line.
    pub fn complete(&self, line: &str) -> Vec<String> {
        let Ok(actions) = self.available_actions() else {
            return Vec::new();
        };
        let lower = line.trim_start().to_lowercase();

        match lower.split_once(' ') {
            None => {
                let mut verbs: Vec<String> = BUILTINS
                    .iter()
                    .map(|v| v.to_string())
                    .chain(actions.keys().cloned())
                    .filter(|v| v.starts_with(&lower))
                    .collect();
                verbs.sort();
                verbs.dedup();
                verbs
            }
            Some((typed, partial)) => {
                let verb = canonical_verb(typed);
                let partial = partial.trim_start();
                let Some(ids) = actions.get(&verb) else {
                    return Vec::new();
                };
                self.game
                    .world
                    .names_of(ids)
                    .into_iter()
                    .filter(|name| name.to_lowercase().starts_with(partial))
                    .map(|name| format!("{typed} {name}"))
                    .collect()
            }
        }
    }

    /// Help text listing built-ins and what can be done right now.
    pub fn help(&self) -> FictionResult<String> {
        let mut output = String::from("Commands:\n");
        output.push_str("  look / l            Look around\n");
        output.push_str("  look <thing>        Examine something\n");
        output.push_str("  inventory / i       List what you carry\n");
        output.push_str("  where               Show where you are\n");
        output.push_str("  <verb> <thing>      Do something (take rock, go hallway)\n");
        output.push_str("  use <thing> on <x>  Use something on someone\n");
        output.push_str("  quit                Leave the game\n");

        let actions = self.available_actions()?;
        if !actions.is_empty() {
            output.push_str("\nYou could:\n");
            for (verb, ids) in &actions {
                let names = self.game.world.names_of(ids);
                output.push_str(&format!("  {verb} {}\n", list(&names)));
            }
        }
        Ok(output.trim_end().to_string())
    }

    /// Events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.game.drain_events()
    }

    fn run(&mut self, body: impl FnOnce(&mut Self) -> FictionResult<bool>) -> Reply {
        let state_changed = match body(self) {
            Ok(changed) => changed,
            Err(err) => {
                if let FictionError::Core(core) = &err {
                    if !core.is_recoverable() {
                        tracing::warn!(error = %core, "engine error");
                    }
                }
                self.game.say(err.player_message());
                false
            }
        };
        Reply {
            message: self.transcript.drain().join("\n"),
            state_changed,
        }
    }

    fn locate(&self, target: &str) -> FictionResult<EntityId> {
        let world = &self.game.world;
        let id = resolve_entity(world, target).ok_or_else(|| FictionError::NotFound {
            name: target.to_string(),
            suggestions: suggest_entities(
                world,
                target,
                self.game.config().fuzzy_threshold,
                SUGGESTION_LIMIT,
            ),
        })?;
        if world.can_see(self.game.player(), id) {
            Ok(id)
        } else {
            Err(FictionError::NotHere(target.to_string()))
        }
    }

    fn adjacent_room_named(&self, input: &str) -> Option<EntityId> {
        if input.is_empty() {
            return None;
        }
        let world = &self.game.world;
        let id = resolve_entity(world, input)?;
        let plain_room = world.entity(id).is_ok_and(|e| e.is(Kind::Room) && !e.is(Kind::Door));
        (plain_room && world.is_adjacent(self.game.player(), id)).then_some(id)
    }

    fn available_actions(&self) -> FictionResult<BTreeMap<String, Vec<EntityId>>> {
        let world = &self.game.world;
        let player = self.game.player();
        let room = world.current_room(player)?;
        Ok(world.actions_at(room, player)?)
    }

    fn known_verb(&self, verb: &str) -> bool {
        COMMON_VERBS.contains(&verb)
            || self
                .available_actions()
                .is_ok_and(|actions| actions.contains_key(verb))
    }

    fn inventory(&mut self) -> FictionResult<()> {
        let player = self.game.player();
        let state = self
            .game
            .world
            .character(player)
            .map_err(|_| FictionError::PlayerNotFound(player))?;
        let held = state.inventory.names();
        let worn: Vec<String> = state.wearing.keys().cloned().collect();
        let text = format!(
            "You are carrying: {}\nWearing: {}\nMoney: {}\nHealth: {}%",
            list(&held),
            list(&worn),
            state.money,
            state.health_percent(),
        );
        self.game.say(text);
        Ok(())
    }
}
