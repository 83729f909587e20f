//! The explicit game context: world, controlled player, I/O collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::chat::{ChatBackend, Silent};
use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::error::{AdvError, AdvResult};
use crate::verb::{Call, Dispatch};
use crate::world::World;

/// Where engine-initiated text goes.
pub trait OutputSink {
    /// Deliver one message.
    fn emit(&mut self, text: &str);
}

impl<F: FnMut(&str)> OutputSink for F {
    fn emit(&mut self, text: &str) {
        self(text)
    }
}

/// Prints every message on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects messages in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every collected line.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    /// Copy of the collected lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Whether any collected line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl OutputSink for Transcript {
    fn emit(&mut self, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

/// Sends each message to two sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: OutputSink, B: OutputSink> OutputSink for Tee<A, B> {
    fn emit(&mut self, text: &str) {
        self.0.emit(text);
        self.1.emit(text);
    }
}

/// A blocking source of follow-up answers (target selection, conversation).
pub trait InputSource {
    /// Show `prompt` and block for one line. `None` when no more input exists.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Never has anything to say.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        None
    }
}

/// Replays prepared answers in order.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
}

impl ScriptedInput {
    /// Answers to hand out, first to last.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.answers.pop_front()
    }
}

/// Things that happened, recorded for front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A character changed rooms.
    Moved {
        /// Who moved.
        who: String,
        /// Where they arrived.
        to: String,
    },
    /// A character picked something up.
    Took {
        /// Who took it.
        who: String,
        /// What was taken.
        item: String,
    },
    /// A character put something down.
    Dropped {
        /// Who dropped it.
        who: String,
        /// What was dropped.
        item: String,
    },
    /// A door was unlocked.
    Unlocked {
        /// The door.
        door: String,
    },
    /// A door was locked.
    Locked {
        /// The door.
        door: String,
    },
    /// An entity was purged from the world.
    Purged {
        /// Its name.
        name: String,
    },
    /// A character died.
    Died {
        /// Who died.
        who: String,
    },
    /// The controlled player died.
    GameOver,
}

/// One game instance: a world, the character being controlled, and the
/// collaborators the engine talks through.
pub struct Game {
    /// The world graph.
    pub world: World,
    player: EntityId,
    config: GameConfig,
    output: Box<dyn OutputSink>,
    input: Box<dyn InputSource>,
    chat: Box<dyn ChatBackend>,
    pub(crate) rng: StdRng,
    pub(crate) bulletins: Vec<String>,
    events: Vec<GameEvent>,
    over: bool,
}

impl Game {
    /// Create a game controlling `player`. Output is discarded and input is
    /// empty until collaborators are attached.
    pub fn new(world: World, player: EntityId, config: GameConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            world,
            player,
            config,
            output: Box::new(|_: &str| {}),
            input: Box::new(NoInput),
            chat: Box::new(Silent),
            rng,
            bulletins: Vec::new(),
            events: Vec::new(),
            over: false,
        }
    }

    /// Attach an output sink.
    pub fn with_output(mut self, output: impl OutputSink + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Attach an input source.
    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Attach a conversation backend.
    pub fn with_chat(mut self, chat: impl ChatBackend + 'static) -> Self {
        self.chat = Box::new(chat);
        self
    }

    /// Replace the output sink.
    pub fn set_output(&mut self, output: impl OutputSink + 'static) {
        self.output = Box::new(output);
    }

    /// Replace the input source.
    pub fn set_input(&mut self, input: impl InputSource + 'static) {
        self.input = Box::new(input);
    }

    /// The controlled character.
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Whether the controlled player has died.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take the recorded events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Bulletins published so far.
    pub fn bulletins(&self) -> &[String] {
        &self.bulletins
    }

    pub(crate) fn record(&mut self, event: GameEvent) {
        if event == GameEvent::GameOver {
            self.over = true;
        }
        self.events.push(event);
    }

    pub(crate) fn chat_mut(&mut self) -> &mut dyn ChatBackend {
        self.chat.as_mut()
    }

    /// Send a message to the output sink.
    pub fn say(&mut self, text: impl AsRef<str>) {
        self.output.emit(text.as_ref());
    }

    /// Block on the input source for one answer.
    pub fn ask(&mut self, prompt: &str) -> AdvResult<String> {
        self.say(prompt);
        self.input
            .read_line(prompt)
            .map(|line| line.trim().to_string())
            .ok_or(AdvError::InputClosed)
    }

    /// Run the handler registered for `verb` on `target`.
    ///
    /// Recoverable handler errors are reported through the output sink and
    /// count as handled with no state change; anything else becomes a fault
    /// wrapped as [`AdvError::HandlerFault`].
    pub fn dispatch(&mut self, target: EntityId, verb: &str, argument: Option<String>) -> Dispatch {
        let handler = match self.world.entity(target) {
            Ok(entity) => entity.verbs.get(verb),
            Err(err) => return Dispatch::Fault(err),
        };
        let Some(handler) = handler else {
            return Dispatch::UnknownVerb;
        };

        tracing::debug!(verb, %target, "dispatch");
        let call = Call {
            entity: target,
            argument,
        };
        match handler.invoke(self, &call) {
            Ok(outcome) => Dispatch::Handled(outcome),
            Err(err) if err.is_recoverable() => {
                self.say(err.to_string());
                Dispatch::Handled(Default::default())
            }
            Err(err) => {
                let target = self
                    .world
                    .name_of(target)
                    .map(str::to_string)
                    .unwrap_or_else(|_| target.to_string());
                tracing::warn!(verb, %target, error = %err, "handler fault");
                let reason = match err {
                    AdvError::HandlerFault { reason, .. } => reason,
                    other => other.to_string(),
                };
                Dispatch::Fault(AdvError::HandlerFault {
                    verb: verb.to_string(),
                    target,
                    reason,
                })
            }
        }
    }

    /// Print where the player is, what is here, and where they can go.
    pub fn announce_room(&mut self) -> AdvResult<()> {
        let room = self.world.current_room(self.player)?;
        let player_name = self.world.name_of(self.player)?.to_string();
        let items: Vec<String> = self
            .world
            .names_of(&self.world.items_in(room, false)?)
            .into_iter()
            .filter(|name| *name != player_name)
            .collect();
        let rooms = self.world.names_of(&self.world.rooms_from(room, false)?);
        let here = self.world.entity(room)?;
        let text = format!(
            "You are in: {} -- {}\nIn this room, there are: {}\nThe rooms next door: {}",
            here.name.to_uppercase(),
            here.description,
            list(&items),
            list(&rooms),
        );
        self.say(text);
        Ok(())
    }

    /// Purge an entity by name and record it.
    pub fn purge(&mut self, name: &str) -> bool {
        let removed = self.world.purge(name);
        if removed {
            self.record(GameEvent::Purged {
                name: name.to_string(),
            });
        }
        removed
    }
}

/// Render names as `[a, b, c]`, or `nothing` when empty.
pub fn list(names: &[String]) -> String {
    if names.is_empty() {
        "nothing".to_string()
    } else {
        format!("[{}]", names.join(", "))
    }
}
