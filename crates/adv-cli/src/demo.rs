//! The built-in demo house.
//!
//! Built in loader order: rooms, items in rooms, doors, characters.

use adv_core::character::{CharacterState, npc, npc_with_verb, player};
use adv_core::{
    AdvResult, CannedChat, Cents, Game, GameConfig, Guard, Outcome, Persona, Verb, World, items,
    rooms,
};

const GRAN_LINES: &[&str] = &[
    "Ahoy there, dearie.",
    "The cellar gets damp this time of year.",
    "Mind the troll in the garden. Bye now!",
];

pub fn build(config: GameConfig) -> AdvResult<Game> {
    let mut world = World::new("house", "A small house with a garden.");

    let kitchen = world.spawn(rooms::room("kitchen", "A cramped kitchen. Something smells good."))?;
    let hallway = world.spawn(rooms::room("hallway", "A long hallway with a creaky floor."))?;
    let garden = world.spawn(rooms::room("garden", "An overgrown garden behind the house."))?;
    let cellar = world.spawn(rooms::room("cellar", "A damp cellar lit by one bulb."))?;
    world.link_room(kitchen, hallway)?;

    let radio = items::useable(
        "radio",
        "A crackling kitchen radio.",
        "listen",
        Some("The radio crackles: the river has flooded the east road."),
        Some(Verb::new(|game, _| {
            game.publish("The river has flooded the east road.");
            Ok(Outcome::unchanged())
        })),
    );
    let placements = [
        (kitchen, items::plain("key", "A brass key.")),
        (kitchen, items::eatable("hot dog", "Still warm.", "eat", "Yummy!")),
        (kitchen, items::money("quarters", "Three quarters.", Cents(75))),
        (
            kitchen,
            items::phone("phone", "A wall phone.", Cents(50), "Calls cost fifty cents."),
        ),
        (kitchen, radio),
        (
            hallway,
            items::wearable(
                "hat",
                "A silly hat.",
                "You put on the hat.",
                "You take off the hat.",
            ),
        ),
        (hallway, items::computer("computer", "An old beige computer.")),
        (garden, items::plain("rock", "A mossy rock.")),
        (garden, items::weapon("sword", "A rusty sword.", 4)),
    ];
    for (room, item) in placements {
        let id = world.spawn(item)?;
        world.add_item(room, id)?;
    }

    let key = world.lookup("key")?;
    world.add_door("front door", hallway, garden, true, Some(key))?;
    world.add_hidden_door(
        "trapdoor",
        garden,
        cellar,
        false,
        None,
        Guard::new(move |w: &World| w.linked(garden, "rock").is_err()),
    )?;

    let hero = world.spawn(player(
        "hero",
        "That's you.",
        CharacterState::new()
            .with_capacity(config.max_items)
            .with_health(config.player_health)
            .with_attack(config.player_attack),
    ))?;
    world.move_character(hero, kitchen)?;

    let troll = world.spawn(npc(
        "troll",
        "A grumpy garden troll.",
        CharacterState::new()
            .with_health(8)
            .with_attack(1)
            .with_messages("The troll howls.", "The troll swings its club!"),
    ))?;
    world.move_character(troll, garden)?;

    let walker = world.spawn(npc_with_verb(
        "walker",
        "Just walking around.",
        CharacterState::new().wandering(),
        "greet",
        "Hi!",
    ))?;
    world.move_character(walker, hallway)?;
    world.add_watcher(hero, walker)?;

    let gran = world.spawn(npc(
        "gran",
        "Your grandmother, knitting in the dark.",
        CharacterState::new().with_persona(
            Persona::new("You are Gran, a retired sailor who lives in the cellar.")
                .with_phone_prompt("You are Gran, answering the phone."),
        ),
    ))?;
    world.move_character(gran, cellar)?;

    tracing::debug!(entities = world.entity_count(), "demo world built");
    Ok(Game::new(world, hero, config).with_chat(CannedChat::new(GRAN_LINES.iter().copied())))
}
