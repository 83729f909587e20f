use adv_core::{Entity, GameConfig, Kind};
use comfy_table::{ContentArrangement, Table};

/// Most specific first.
const LABELS: &[Kind] = &[
    Kind::HiddenDoor,
    Kind::Door,
    Kind::Room,
    Kind::Character,
    Kind::Money,
    Kind::Wearable,
    Kind::Eatable,
    Kind::Weapon,
    Kind::Phone,
    Kind::Computer,
    Kind::Useable,
    Kind::Item,
];

pub fn run(config: GameConfig, kind: Option<&str>) -> Result<(), String> {
    let filter = match kind {
        Some(name) => Kind::parse(&name.to_lowercase())
            .ok_or_else(|| format!("unknown kind: \"{name}\""))?,
        None => Kind::Any,
    };
    let session = super::quiet_session(config)?;
    let results = session.game().world.get_all(filter);

    if results.is_empty() {
        println!("  No entities found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Kind", "Description"]);

    for entity in &results {
        let desc = if entity.description.chars().count() > 60 {
            let cut: String = entity.description.chars().take(57).collect();
            format!("{cut}...")
        } else if entity.description.is_empty() {
            "-".to_string()
        } else {
            entity.description.clone()
        };
        table.add_row(vec![entity.name.clone(), label(entity), desc]);
    }

    println!("{table}");
    println!();
    println!("  {} entities", results.len());

    Ok(())
}

fn label(entity: &Entity) -> String {
    LABELS
        .iter()
        .find(|k| entity.is(**k))
        .map(|k| k.to_string())
        .unwrap_or_else(|| "entity".to_string())
}
