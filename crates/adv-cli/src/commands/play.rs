//! Interactive play over stdin.

use std::io::{self, Write};

use adv_core::{GameConfig, InputSource, StdoutSink};
use adv_fiction::Session;
use colored::Colorize;

/// Answers engine questions (who to call, what to say) from stdin.
struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

pub fn run(config: GameConfig, quiet: bool) -> Result<(), String> {
    if quiet {
        colored::control::set_override(false);
    }
    let seed = config.seed;
    let mut game = crate::demo::build(config).map_err(|e| format!("failed to build world: {e}"))?;
    game.set_input(StdinInput);
    let mut session = Session::with_live_output(game, StdoutSink);

    if !quiet {
        println!("  {} the demo house", "Entering".bold());
        println!("  Seed: {seed}");
        println!("  Type 'help' for commands, 'quit' to exit.\n");
    }
    session.start();

    let mut line = String::new();
    while !session.is_finished() {
        if !quiet {
            print!("{} ", ">".green().bold());
            io::stdout().flush().map_err(|e| e.to_string())?;
        }

        line.clear();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        session.process(input);
        if !quiet {
            println!();
        }
    }

    if session.game().is_over() && !quiet {
        println!("{}", "Thanks for playing.".dimmed());
    }
    Ok(())
}
