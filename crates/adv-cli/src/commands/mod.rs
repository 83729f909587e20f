pub mod list;
pub mod play;
pub mod snapshot;

use adv_core::GameConfig;
use adv_fiction::Session;

/// Build the demo world into a session whose output is collected per reply.
fn quiet_session(config: GameConfig) -> Result<Session, String> {
    let game = crate::demo::build(config).map_err(|e| format!("failed to build world: {e}"))?;
    Ok(Session::new(game))
}
