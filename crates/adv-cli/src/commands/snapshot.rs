use adv_core::GameConfig;

pub fn run(config: GameConfig, commands: &[String]) -> Result<(), String> {
    let mut session = super::quiet_session(config)?;

    for command in commands {
        let reply = session.process(command);
        if !reply.message.is_empty() {
            eprintln!("{}", reply.message);
        }
    }

    let snapshot = session.snapshot().map_err(|e| e.player_message())?;
    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
