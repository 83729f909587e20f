//! Conversations with characters, in person or over the phone.
//!
//! Text generation sits behind [`ChatBackend`]. A conversation alternates
//! backend replies with player input and stops after a hang-up word from
//! either side, when input runs out, or after `conversation_turns` replies.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Kind};
use crate::error::{AdvError, AdvResult};
use crate::game::Game;
use crate::verb::{Call, Outcome};
use crate::world::World;

/// Default extra instructions for phone calls.
pub const PHONE_PROMPT: &str = "The user is calling you on the phone, and you answer in an \
                                amusing way. Don't worry about sounds or actions, just \
                                generate the words.";

/// Who said something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Background the character should know about.
    System,
    /// The player.
    User,
    /// The character.
    Assistant,
}

/// One line of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker.
    pub role: Role,
    /// What was said.
    pub content: String,
}

impl ChatMessage {
    /// A line of the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// How a character talks, and what it remembers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Persona {
    /// Standing instructions for the character.
    pub prompt: String,
    /// Extra instructions on the phone. `None` means the character cannot be called.
    pub phone_prompt: Option<String>,
    /// Face-to-face conversation so far.
    pub history: Vec<ChatMessage>,
    /// Phone conversation so far.
    pub phone_history: Vec<ChatMessage>,
}

impl Persona {
    /// A phoneable persona with the default phone manner.
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            phone_prompt: Some(PHONE_PROMPT.to_string()),
            ..Self::default()
        }
    }

    /// Replace the phone instructions.
    pub fn with_phone_prompt(mut self, phone_prompt: &str) -> Self {
        self.phone_prompt = Some(phone_prompt.to_string());
        self
    }

    /// Make the character unreachable by phone.
    pub fn unlisted(mut self) -> Self {
        self.phone_prompt = None;
        self
    }

    /// Whether the character can be called.
    pub fn is_phoneable(&self) -> bool {
        self.phone_prompt.is_some()
    }

    fn instructions(&self, phone: bool) -> String {
        match (&self.phone_prompt, phone) {
            (Some(extra), true) => format!("{} {extra}", self.prompt),
            _ => self.prompt.clone(),
        }
    }

    fn notify_news(&mut self, bulletin: &str) {
        let note = ChatMessage::new(Role::System, format!("News: {bulletin}"));
        self.history.push(note.clone());
        self.phone_history.push(note);
    }
}

/// A text-generation service.
pub trait ChatBackend {
    /// Produce `speaker`'s next line given its instructions and the history.
    fn reply(
        &mut self,
        speaker: &str,
        instructions: &str,
        history: &[ChatMessage],
    ) -> AdvResult<String>;
}

/// No backend configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ChatBackend for Silent {
    fn reply(&mut self, _: &str, _: &str, _: &[ChatMessage]) -> AdvResult<String> {
        Err(AdvError::Chat("nobody is listening".to_string()))
    }
}

/// Offline backend that plays back prepared lines, then says goodbye.
#[derive(Debug, Clone)]
pub struct CannedChat {
    lines: Vec<String>,
    next: usize,
}

impl Default for CannedChat {
    fn default() -> Self {
        Self::new([
            "Oh, it's you. What do you want?",
            "Fascinating. Truly.",
            "Well, I have things to do. Bye!",
        ])
    }
}

impl CannedChat {
    /// Lines to hand out, first to last.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl ChatBackend for CannedChat {
    fn reply(&mut self, speaker: &str, _: &str, history: &[ChatMessage]) -> AdvResult<String> {
        if history.last().is_some_and(|m| m.content == "phone rings") {
            return Ok(format!("Hello, {speaker} speaking."));
        }
        let line = self
            .lines
            .get(self.next)
            .cloned()
            .unwrap_or_else(|| "Bye!".to_string());
        self.next += 1;
        Ok(line)
    }
}

/// Characters that can be reached by phone, in registry order.
pub fn phoneable(world: &World) -> Vec<EntityId> {
    world
        .get_all(Kind::Character)
        .into_iter()
        .filter(|e| {
            e.as_character()
                .and_then(|c| c.persona.as_ref())
                .is_some_and(Persona::is_phoneable)
        })
        .map(|e| e.id)
        .collect()
}

/// `talk` verb: chat face to face. An argument becomes the opening line.
pub fn talk_verb(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    converse(game, call.entity, false, call.argument.clone())?;
    Ok(Outcome::unchanged())
}

/// Run one bounded conversation with `who`.
pub fn converse(
    game: &mut Game,
    who: EntityId,
    phone: bool,
    opening: Option<String>,
) -> AdvResult<()> {
    let name = game.world.name_of(who)?.to_string();
    let Some(persona) = game.world.character(who)?.persona.clone() else {
        return Err(AdvError::Unauthorized(format!("{name} has nothing to say.")));
    };
    if phone && !persona.is_phoneable() {
        return Err(AdvError::Unauthorized(
            "You can't call that character.".to_string(),
        ));
    }
    let instructions = persona.instructions(phone);
    let mut history = if phone {
        persona.phone_history
    } else {
        persona.history
    };

    let opening = match (phone, opening) {
        (true, _) => "phone rings".to_string(),
        (false, Some(line)) => line,
        (false, None) => game.ask("(input): ")?,
    };
    let mut last_input = opening.clone();
    history.push(ChatMessage::new(Role::User, opening));

    let turns = game.config().conversation_turns;
    for _ in 0..turns {
        if !phone && game.config().is_hangup(&last_input) {
            break;
        }
        let reply = match game.chat_mut().reply(&name, &instructions, &history) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(who = %name, error = %err, "chat backend failed");
                store_history(game, who, phone, history)?;
                return Err(err);
            }
        };
        game.say(format!("{name}: {reply}"));
        history.push(ChatMessage::new(Role::Assistant, reply.clone()));
        if game.config().is_hangup(&reply) {
            break;
        }

        last_input = match game.ask("(input): ") {
            Ok(line) => line,
            Err(AdvError::InputClosed) => break,
            Err(err) => return Err(err),
        };
        history.push(ChatMessage::new(Role::User, last_input.clone()));
        if game.config().is_hangup(&last_input) {
            break;
        }
    }

    store_history(game, who, phone, history)?;
    if !phone {
        game.announce_room()?;
    }
    Ok(())
}

fn store_history(
    game: &mut Game,
    who: EntityId,
    phone: bool,
    history: Vec<ChatMessage>,
) -> AdvResult<()> {
    if let Some(persona) = game.world.character_mut(who)?.persona.as_mut() {
        if phone {
            persona.phone_history = history;
        } else {
            persona.history = history;
        }
    }
    Ok(())
}

impl Game {
    /// Publish a news bulletin. Every character with a persona hears about it.
    pub fn publish(&mut self, bulletin: &str) {
        self.bulletins.push(bulletin.to_string());
        let talkers: Vec<EntityId> = self
            .world
            .get_all(Kind::Character)
            .iter()
            .map(|e| e.id)
            .collect();
        for id in talkers {
            if let Ok(c) = self.world.character_mut(id) {
                if let Some(persona) = c.persona.as_mut() {
                    persona.notify_news(bulletin);
                }
            }
        }
        tracing::info!(bulletin, "news published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterState, npc, player};
    use crate::config::GameConfig;
    use crate::entity::Cents;
    use crate::game::{ScriptedInput, Transcript};
    use crate::items;
    use crate::rooms::room;

    fn parlor(lines: &[&str], input: &[&str]) -> (Game, Transcript, EntityId, EntityId) {
        let mut world = World::default();
        let parlor = world.spawn(room("parlor", "Cozy.")).unwrap();
        let hero = world
            .spawn(player(
                "hero",
                "",
                CharacterState::new().with_money(Cents(100)),
            ))
            .unwrap();
        let gran = world
            .spawn(npc(
                "gran",
                "Knits.",
                CharacterState::new().with_persona(Persona::new("You are Gran.")),
            ))
            .unwrap();
        world.move_character(hero, parlor).unwrap();
        world.move_character(gran, parlor).unwrap();
        let out = Transcript::new();
        let game = Game::new(world, hero, GameConfig::default())
            .with_output(out.clone())
            .with_input(ScriptedInput::new(input.iter().copied()))
            .with_chat(CannedChat::new(lines.iter().copied()));
        (game, out, hero, parlor)
    }

    #[test]
    fn talk_ends_when_the_character_hangs_up() {
        let (mut game, out, _, _) = parlor(&["Hello dear.", "Bye now!"], &["hi", "how are you"]);
        let gran = game.world.lookup("gran").unwrap();
        game.dispatch(gran, "talk", None);

        assert!(out.contains("gran: Hello dear."));
        assert!(out.contains("gran: Bye now!"));
        assert!(out.contains("You are in: PARLOR"));
        let history = &game.world.character(gran).unwrap().persona.as_ref().unwrap().history;
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn talk_ends_when_the_player_says_bye() {
        let (mut game, out, _, _) = parlor(&["One.", "Two.", "Three."], &["hi", "ok bye"]);
        let gran = game.world.lookup("gran").unwrap();
        game.dispatch(gran, "talk", None);

        assert!(out.contains("gran: One."));
        assert!(!out.contains("gran: Two."));
    }

    #[test]
    fn conversation_is_bounded() {
        let lines = ["more"; 20];
        let input = ["go on"; 20];
        let (game, out, hero, _) = parlor(&lines, &input);
        let mut game = Game::new(
            game.world,
            hero,
            GameConfig::default().with_conversation_turns(3),
        )
        .with_output(out.clone())
        .with_input(ScriptedInput::new(input))
        .with_chat(CannedChat::new(lines));
        let gran = game.world.lookup("gran").unwrap();
        game.dispatch(gran, "talk", None);

        let replies = out.lines().iter().filter(|l| l.starts_with("gran:")).count();
        assert_eq!(replies, 3);
    }

    #[test]
    fn phone_call_spends_and_rings() {
        let (mut game, out, hero, parlor) = parlor(&["Bye, dear."], &[]);
        let phone = game
            .world
            .spawn(items::phone("phone", "Rotary.", Cents(25), "No service"))
            .unwrap();
        game.world.add_item(parlor, phone).unwrap();

        game.dispatch(phone, "use", Some("gran".into()));
        assert!(out.contains("gran: Hello, gran speaking."));
        assert!(out.contains("*Thank you, call again.*"));
        assert_eq!(game.world.character(hero).unwrap().money, Cents(75));
    }

    #[test]
    fn unlisted_characters_cannot_be_called() {
        let mut world = World::default();
        world
            .spawn(npc(
                "hermit",
                "",
                CharacterState::new().with_persona(Persona::new("Go away.").unlisted()),
            ))
            .unwrap();
        world
            .spawn(npc(
                "gran",
                "",
                CharacterState::new().with_persona(Persona::new("Hi.")),
            ))
            .unwrap();
        let names = world.names_of(&phoneable(&world));
        assert_eq!(names, ["gran"]);
    }

    #[test]
    fn news_reaches_personas() {
        let (mut game, _, _, _) = parlor(&[], &[]);
        game.publish("The mayor resigned.");
        let gran = game.world.lookup("gran").unwrap();
        let persona = game.world.character(gran).unwrap().persona.clone().unwrap();
        assert_eq!(persona.history[0].content, "News: The mayor resigned.");
        assert_eq!(game.bulletins(), ["The mayor resigned."]);
    }

    #[test]
    fn silent_backend_fails_softly() {
        let (game, out, hero, _) = parlor(&[], &["hello"]);
        let mut game = Game::new(game.world, hero, GameConfig::default())
            .with_output(out.clone())
            .with_input(ScriptedInput::new(["hello"]));
        let gran = game.world.lookup("gran").unwrap();
        game.dispatch(gran, "talk", None);
        assert!(out.contains("nobody is listening"));
    }
}
