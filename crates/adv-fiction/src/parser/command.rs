//! Command parsing for player input.
//!
//! The first word is the verb; the rest names the target. Verbs are open
//! ended (any verb an entity registers can be typed), so only synonyms and
//! built-ins are known here.

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look around, or at something.
    Look {
        /// Optional thing to examine.
        target: Option<String>,
    },
    /// List what the player carries.
    Inventory,
    /// Show the current room again.
    Where,
    /// Show help.
    Help,
    /// Leave the game.
    Quit,
    /// Dispatch `verb` on the entity named `target`.
    Act {
        /// Canonical verb name.
        verb: String,
        /// Target entity name.
        target: String,
        /// Indirect object ("on the troll", "about the weather").
        argument: Option<String>,
    },
    /// A verb with nothing to act on.
    Incomplete {
        /// Canonical verb name.
        verb: String,
    },
}

/// Verb synonyms for command parsing.
const TAKE_VERBS: &[&str] = &["take", "get", "grab", "pick"];
const GO_VERBS: &[&str] = &["go", "walk", "enter", "move"];
const LOOK_VERBS: &[&str] = &["look", "l", "examine", "x", "inspect"];
const TALK_VERBS: &[&str] = &["talk", "speak", "chat"];
const INVENTORY_VERBS: &[&str] = &["inventory", "inv", "i"];
const WHERE_VERBS: &[&str] = &["where", "whereami"];
const HELP_VERBS: &[&str] = &["help", "h", "?"];
const QUIT_VERBS: &[&str] = &["quit", "q"];

/// Words that introduce an indirect object.
const ARGUMENT_WORDS: &[&str] = &["on", "with", "at", "about"];

/// Map a typed verb to the name handlers are registered under.
pub fn canonical_verb(word: &str) -> String {
    let word = word.to_lowercase();
    let canonical = if TAKE_VERBS.contains(&word.as_str()) {
        "take"
    } else if GO_VERBS.contains(&word.as_str()) {
        "go"
    } else if LOOK_VERBS.contains(&word.as_str()) {
        "look"
    } else if TALK_VERBS.contains(&word.as_str()) {
        "talk"
    } else {
        return word;
    };
    canonical.to_string()
}

/// Parse a player input string into a command.
pub fn parse_command(input: &str) -> Command {
    let words: Vec<&str> = input.split_whitespace().collect();
    let Some((first, rest)) = words.split_first() else {
        return Command::Look { target: None };
    };
    let first = first.to_lowercase();

    if rest.is_empty() {
        if INVENTORY_VERBS.contains(&first.as_str()) {
            return Command::Inventory;
        }
        if WHERE_VERBS.contains(&first.as_str()) {
            return Command::Where;
        }
        if HELP_VERBS.contains(&first.as_str()) {
            return Command::Help;
        }
        if QUIT_VERBS.contains(&first.as_str()) {
            return Command::Quit;
        }
    }

    let verb = canonical_verb(&first);
    let rest = skip_particles(&verb, rest);

    if verb == "look" && rest.is_empty() {
        return Command::Look { target: None };
    }
    if rest.is_empty() {
        return Command::Incomplete { verb };
    }

    let (target, argument) = split_argument(rest);
    if verb == "look" && argument.is_none() {
        return Command::Look {
            target: Some(target),
        };
    }
    Command::Act {
        verb,
        target,
        argument,
    }
}

/// Drop "up" after "pick", "to"/"with" after "talk", "at" after "look".
fn skip_particles<'a>(verb: &str, rest: &'a [&'a str]) -> &'a [&'a str] {
    let skip = match (verb, rest.first()) {
        ("take", Some(w)) => w.eq_ignore_ascii_case("up"),
        ("talk", Some(w)) => w.eq_ignore_ascii_case("to") || w.eq_ignore_ascii_case("with"),
        ("look", Some(w)) => w.eq_ignore_ascii_case("at"),
        _ => false,
    };
    if skip { &rest[1..] } else { rest }
}

fn split_argument(rest: &[&str]) -> (String, Option<String>) {
    let split = rest
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, w)| ARGUMENT_WORDS.iter().any(|a| w.eq_ignore_ascii_case(a)))
        .map(|(i, _)| i);

    match split {
        Some(pos) => {
            let argument = rest[pos + 1..].join(" ");
            (
                rest[..pos].join(" "),
                (!argument.is_empty()).then_some(argument),
            )
        }
        None => (rest.join(" "), None),
    }
}
