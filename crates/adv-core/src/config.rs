//! Configuration for a game instance.

use serde::{Deserialize, Serialize};

use crate::character::DEFAULT_CAPACITY;

/// Tunables for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed for reproducible wandering.
    pub seed: u64,
    /// Inventory slots for the player.
    pub max_items: usize,
    /// Starting health of the player.
    pub player_health: u32,
    /// Attack strength of the player.
    pub player_attack: u32,
    /// Upper bound on exchanges in a single conversation.
    pub conversation_turns: usize,
    /// Words that end a conversation when either side says them.
    pub hangup_words: Vec<String>,
    /// Chance (0.0-1.0) that a wanderer moves when the player enters a room.
    pub wander_chance: f64,
    /// Minimum similarity for "did you mean" suggestions.
    pub fuzzy_threshold: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_items: DEFAULT_CAPACITY,
            player_health: 10,
            player_attack: 2,
            conversation_turns: 8,
            hangup_words: vec!["bye".into(), "*hangs up*".into(), "*click*".into()],
            wander_chance: 0.5,
            fuzzy_threshold: 0.8,
        }
    }
}

impl GameConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the player's inventory capacity.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the player's starting health (at least 1).
    pub fn with_player_health(mut self, health: u32) -> Self {
        self.player_health = health.max(1);
        self
    }

    /// Set the player's attack strength.
    pub fn with_player_attack(mut self, attack: u32) -> Self {
        self.player_attack = attack;
        self
    }

    /// Set the conversation bound.
    pub fn with_conversation_turns(mut self, turns: usize) -> Self {
        self.conversation_turns = turns;
        self
    }

    /// Set the wander chance (clamped to 0.0-1.0).
    pub fn with_wander_chance(mut self, chance: f64) -> Self {
        self.wander_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Whether `text` contains a hang-up word.
    pub fn is_hangup(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.hangup_words.iter().any(|w| text.contains(w.as_str()))
    }
}
