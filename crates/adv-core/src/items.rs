//! Item constructors and the verb handlers that drive their state machines.
//!
//! Every handler acts on behalf of the controlled player. Soft failures are
//! returned as recoverable errors and never leave a transition half done.

use crate::chat;
use crate::combat;
use crate::entity::{Body, Cents, Entity, EntityId, ItemKind, ItemState, Kind};
use crate::error::{AdvError, AdvResult};
use crate::game::{Game, GameEvent, list};
use crate::verb::{Call, Outcome, Verb};
use crate::world::World;

/// Maximum number of commands accepted by one computer session.
pub const CONSOLE_LIMIT: usize = 32;

fn item(name: &str, description: &str, state: ItemState) -> Entity {
    let takeable = state.takeable;
    let entity =
        Entity::new(name, description, Body::Item(state)).with_verb("look", Verb::new(look));
    if takeable {
        entity.with_verb("take", Verb::new(take))
    } else {
        entity
    }
}

/// An ordinary item: look, take, drop.
pub fn plain(name: &str, description: &str) -> Entity {
    item(name, description, ItemState::new(ItemKind::Plain))
}

/// Something that stays where it is: look only.
pub fn fixture(name: &str, description: &str) -> Entity {
    item(name, description, immobile(ItemKind::Plain))
}

/// Money lying around. Taking it credits the balance instead of using a slot.
pub fn money(name: &str, description: &str, amount: Cents) -> Entity {
    let state = ItemState {
        droppable: false,
        ..ItemState::new(ItemKind::Money { amount })
    };
    Entity::new(name, description, Body::Item(state))
        .with_verb("look", Verb::new(look))
        .with_verb("take", Verb::new(take_money))
}

/// Clothing: can be worn straight off the floor and removed again.
pub fn wearable(name: &str, description: &str, wear_msg: &str, remove_msg: &str) -> Entity {
    let kind = ItemKind::Wearable {
        wear_msg: wear_msg.to_string(),
        remove_msg: remove_msg.to_string(),
    };
    item(name, description, ItemState::new(kind)).with_verb("wear", Verb::new(wear))
}

/// An item exposing a custom verb, with an optional message and effect.
pub fn useable(
    name: &str,
    description: &str,
    verb: &str,
    use_msg: Option<&str>,
    effect: Option<Verb>,
) -> Entity {
    let kind = ItemKind::Useable {
        verb: verb.to_string(),
        use_msg: use_msg.map(str::to_string),
        effect,
    };
    item(name, description, ItemState::new(kind)).with_verb(verb, Verb::new(use_item))
}

/// Food and the like: used once, then gone from the world.
pub fn eatable(name: &str, description: &str, verb: &str, use_msg: &str) -> Entity {
    let kind = ItemKind::Eatable {
        verb: verb.to_string(),
        use_msg: Some(use_msg.to_string()),
    };
    item(name, description, ItemState::new(kind)).with_verb(verb, Verb::new(eat))
}

/// A weapon: `use` hurts a character in the same room.
pub fn weapon(name: &str, description: &str, damage: u32) -> Entity {
    item(name, description, ItemState::new(ItemKind::Weapon { damage }))
        .with_verb("use", Verb::new(strike))
}

/// A fixed pay phone.
pub fn phone(name: &str, description: &str, cost: Cents, cost_msg: &str) -> Entity {
    let kind = ItemKind::Phone {
        cost,
        cost_msg: cost_msg.to_string(),
    };
    item(name, description, immobile(kind)).with_verb("use", Verb::new(call))
}

/// A fixed computer terminal.
pub fn computer(name: &str, description: &str) -> Entity {
    item(name, description, immobile(ItemKind::Computer)).with_verb("use", Verb::new(console))
}

fn immobile(kind: ItemKind) -> ItemState {
    ItemState {
        takeable: false,
        droppable: false,
        kind,
    }
}

impl World {
    /// Move `item` from the room `who` is in to `who`'s inventory.
    pub fn take_item(&mut self, who: EntityId, item: EntityId) -> AdvResult<()> {
        if !self.in_room(who, item) {
            return Err(AdvError::Unauthorized(
                "That item is not in this room!".to_string(),
            ));
        }
        let name = self.name_of(item)?.to_string();
        let inventory = &self.character(who)?.inventory;
        if inventory.is_full() {
            return Err(AdvError::CapacityExceeded(inventory.capacity()));
        }

        let room = self.current_room(who)?;
        self.unlink(room, &name)?;
        if let Err(err) = self.character_mut(who)?.inventory.insert(&name, item) {
            self.entity_mut(room)?.links.insert(&name, item, true)?;
            return Err(err);
        }
        Ok(())
    }

    /// Move `item` from `who`'s inventory into the room they are in.
    pub fn drop_item(&mut self, who: EntityId, item: EntityId) -> AdvResult<()> {
        if !self.holds(who, item) {
            return Err(AdvError::Unauthorized(
                "You don't have that item, dingus".to_string(),
            ));
        }
        if !self.entity(item)?.is_droppable() {
            return Err(AdvError::Unauthorized(
                "That item is not droppable, guess you're stuck with it.".to_string(),
            ));
        }
        let name = self.name_of(item)?.to_string();
        let room = self.current_room(who)?;
        self.entity_mut(room)?.links.insert(&name, item, false)?;
        self.character_mut(who)?.inventory.remove(&name);
        Ok(())
    }

    fn item_state(&self, id: EntityId) -> AdvResult<&ItemState> {
        let entity = self.entity(id)?;
        entity.as_item().ok_or_else(|| AdvError::WrongKind {
            name: entity.name.clone(),
            expected: Kind::Item,
        })
    }

    fn item_state_mut(&mut self, id: EntityId) -> AdvResult<&mut ItemState> {
        let entity = self.entity_mut(id)?;
        let name = entity.name.clone();
        entity.as_item_mut().ok_or(AdvError::WrongKind {
            name,
            expected: Kind::Item,
        })
    }
}

/// Print an entity and the verbs it currently offers.
pub fn look(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let entity = game.world.entity(call.entity)?;
    let verbs: Vec<String> = entity.verbs.names().map(str::to_string).collect();
    let mut text = format!("{entity}\nActions: {}", list(&verbs));
    if let Some(c) = entity.as_character() {
        text.push_str(&format!("\nHealth: {}%", c.health_percent()));
    }
    game.say(text);
    Ok(Outcome::unchanged())
}

/// Pick an item up: room → inventory, `take` swapped for `drop`.
pub fn take(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    game.world.take_item(player, call.entity)?;
    after_take(&mut game.world, call.entity)?;
    record_take(game, call.entity)?;
    look(game, call)?;
    Ok(Outcome::changed())
}

/// Put an item down: inventory → room, `drop` swapped for `take`.
pub fn drop(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    game.world.drop_item(player, call.entity)?;

    let entity = game.world.entity_mut(call.entity)?;
    entity.verbs.remove("drop");
    if entity.is_takeable() {
        entity.verbs.add("take", Verb::new(take));
    }
    let (who, item) = (
        game.world.name_of(player)?.to_string(),
        game.world.name_of(call.entity)?.to_string(),
    );
    tracing::debug!(%who, %item, "dropped");
    game.record(GameEvent::Dropped { who, item });
    game.announce_room()?;
    Ok(Outcome::changed())
}

fn after_take(world: &mut World, item: EntityId) -> AdvResult<()> {
    let entity = world.entity_mut(item)?;
    entity.verbs.remove("take");
    if entity.is_droppable() {
        entity.verbs.add("drop", Verb::new(drop));
    }
    Ok(())
}

fn record_take(game: &mut Game, item: EntityId) -> AdvResult<()> {
    let who = game.world.name_of(game.player())?.to_string();
    let item = game.world.name_of(item)?.to_string();
    tracing::debug!(%who, %item, "took");
    game.record(GameEvent::Took { who, item });
    Ok(())
}

/// Scoop up money: leaves the room, credits the balance.
pub fn take_money(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    if !game.world.in_room(player, call.entity) {
        return Err(AdvError::Unauthorized(
            "That item is not in this room!".to_string(),
        ));
    }
    let amount = match game.world.item_state(call.entity)?.kind {
        ItemKind::Money { amount } => amount,
        _ => Cents(0),
    };
    let name = game.world.name_of(call.entity)?.to_string();
    let room = game.world.current_room(player)?;
    game.world.unlink(room, &name)?;
    game.world.entity_mut(call.entity)?.verbs.remove("take");
    let balance = game.world.earn(player, amount)?;

    record_take(game, call.entity)?;
    game.say(format!("You pick up {amount}. You now have {balance}."));
    game.announce_room()?;
    Ok(Outcome::changed())
}

/// Put on a wearable, picking it up first if it is lying in the room.
pub fn wear(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    let item = call.entity;
    if game.world.in_room(player, item) {
        game.world.take_item(player, item)?;
        after_take(&mut game.world, item)?;
        record_take(game, item)?;
    }
    if !game.world.holds(player, item) {
        return Err(AdvError::Unauthorized(
            "You don't have that item, dingus".to_string(),
        ));
    }

    let wear_msg = match &game.world.item_state(item)?.kind {
        ItemKind::Wearable { wear_msg, .. } => wear_msg.clone(),
        _ => String::new(),
    };
    let name = game.world.name_of(item)?.to_string();
    game.world.character_mut(player)?.wearing.insert(name, item);
    game.world.item_state_mut(item)?.droppable = false;
    let verbs = &mut game.world.entity_mut(item)?.verbs;
    verbs.remove("drop");
    verbs.remove("wear");
    verbs.add("remove", Verb::new(remove));

    game.say(wear_msg);
    Ok(Outcome::changed())
}

/// Take off a worn item; it becomes droppable again.
pub fn remove(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let player = game.player();
    let item = call.entity;
    let name = game.world.name_of(item)?.to_string();
    if game
        .world
        .character_mut(player)?
        .wearing
        .remove(&name)
        .is_none()
    {
        return Err(AdvError::Unauthorized("You aren't wearing that.".to_string()));
    }

    let remove_msg = match &game.world.item_state(item)?.kind {
        ItemKind::Wearable { remove_msg, .. } => remove_msg.clone(),
        _ => String::new(),
    };
    game.world.item_state_mut(item)?.droppable = true;
    let verbs = &mut game.world.entity_mut(item)?.verbs;
    verbs.remove("remove");
    verbs.add("drop", Verb::new(drop));
    verbs.add("wear", Verb::new(wear));

    game.say(remove_msg);
    Ok(Outcome::changed())
}

/// Run a useable's message and effect.
pub fn use_item(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let (use_msg, effect) = match &game.world.item_state(call.entity)?.kind {
        ItemKind::Useable {
            use_msg, effect, ..
        } => (use_msg.clone(), effect.clone()),
        _ => (None, None),
    };
    if let Some(msg) = use_msg {
        game.say(msg);
    }
    match effect {
        Some(effect) => effect.invoke(game, call),
        None => Ok(Outcome::unchanged()),
    }
}

/// Consume an eatable: message, out of the inventory, purged from the world.
pub fn eat(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let use_msg = match &game.world.item_state(call.entity)?.kind {
        ItemKind::Eatable { use_msg, .. } => use_msg.clone(),
        _ => None,
    };
    if let Some(msg) = use_msg {
        game.say(msg);
    }
    let name = game.world.name_of(call.entity)?.to_string();
    let player = game.player();
    game.world.character_mut(player)?.forget(&name);
    game.purge(&name);
    Ok(Outcome::changed())
}

/// Hit a character in the room with a weapon.
pub fn strike(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let damage = match game.world.item_state(call.entity)?.kind {
        ItemKind::Weapon { damage } => damage,
        _ => 0,
    };
    let player = game.player();
    let target = match &call.argument {
        Some(name) => name.clone(),
        None => {
            let room = game.world.current_room(player)?;
            let ids: Vec<EntityId> = game
                .world
                .items_in(room, false)?
                .into_iter()
                .filter(|id| *id != player)
                .filter(|id| game.world.entity(*id).is_ok_and(|e| e.is(Kind::Character)))
                .collect();
            let names = game.world.names_of(&ids);
            game.ask(&format!("Who do you want to hit? {}", list(&names)))?
        }
    };

    let target = game
        .world
        .find(&target)
        .filter(|id| *id != player)
        .filter(|id| game.world.entity(*id).is_ok_and(|e| e.is(Kind::Character)))
        .ok_or_else(|| {
            AdvError::Unauthorized("You can only use this weapon on a character.".to_string())
        })?;
    if !game.world.in_room(player, target) {
        return Err(AdvError::Unauthorized("They aren't here.".to_string()));
    }

    combat::take_damage(game, target, damage, Some(player), true)?;
    Ok(Outcome::changed())
}

/// Place a paid call to a phoneable character.
pub fn call(game: &mut Game, call: &Call) -> AdvResult<Outcome> {
    let (cost, cost_msg) = match &game.world.item_state(call.entity)?.kind {
        ItemKind::Phone { cost, cost_msg } => (*cost, cost_msg.clone()),
        _ => (Cents(0), String::new()),
    };
    game.say(format!("This phone costs {cost} to use."));

    let callees = chat::phoneable(&game.world);
    let callee = match &call.argument {
        Some(name) => name.clone(),
        None => {
            let names = game.world.names_of(&callees);
            game.ask(&format!("Who you gonna call? {}", list(&names)))?
        }
    };
    let callee = callees
        .into_iter()
        .find(|id| {
            game.world
                .name_of(*id)
                .is_ok_and(|n| n.eq_ignore_ascii_case(&callee))
        })
        .ok_or_else(|| AdvError::Unauthorized("You can't call them.".to_string()))?;

    let player = game.player();
    if let Err(err) = game.world.spend(player, cost) {
        game.say(err.to_string());
        return Err(AdvError::Unauthorized(cost_msg));
    }
    game.say(format!("{cost} spent."));
    game.say("**RINGING**");
    if let Err(err) = chat::converse(game, callee, true, None) {
        game.world.earn(player, cost)?;
        game.say(format!("{cost} refunded."));
        return Err(err);
    }
    game.say("*Thank you, call again.*");
    game.announce_room()?;
    Ok(Outcome::changed())
}

/// A small read-only console over the registry.
pub fn console(game: &mut Game, _call: &Call) -> AdvResult<Outcome> {
    game.say(
        "You sit down in front of the computer, and with a flick of your hand, \
         the console comes to life...",
    );
    game.say("Type a name to inspect it, `ls` to list everything, `exit` to leave.");

    for _ in 0..CONSOLE_LIMIT {
        let line = match game.ask("> ") {
            Ok(line) => line,
            Err(AdvError::InputClosed) => break,
            Err(err) => return Err(err),
        };
        match line.as_str() {
            "" => continue,
            "exit" | "quit" => break,
            "ls" | "list" => {
                let names: Vec<String> = game
                    .world
                    .all_entities()
                    .iter()
                    .map(|e| e.name.clone())
                    .collect();
                game.say(names.join("\n"));
            }
            name => {
                let text = match game.world.find(name).map(|id| game.world.entity(id)) {
                    Some(Ok(entity)) => entity.to_string(),
                    _ => format!("No record of \"{name}\"."),
                };
                game.say(text);
            }
        }
    }

    game.announce_room()?;
    Ok(Outcome::unchanged())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterState, player};
    use crate::config::GameConfig;
    use crate::game::{ScriptedInput, Transcript};
    use crate::rooms::room;
    use crate::verb::Dispatch;

    struct Fixture {
        game: Game,
        out: Transcript,
        hero: EntityId,
        kitchen: EntityId,
    }

    fn fixture(capacity: usize) -> Fixture {
        let mut world = World::default();
        let kitchen = world.spawn(room("kitchen", "A kitchen.")).unwrap();
        let hero = world
            .spawn(player(
                "hero",
                "",
                CharacterState::new().with_capacity(capacity),
            ))
            .unwrap();
        world.move_character(hero, kitchen).unwrap();
        let out = Transcript::new();
        let game = Game::new(world, hero, GameConfig::default()).with_output(out.clone());
        Fixture {
            game,
            out,
            hero,
            kitchen,
        }
    }

    fn place(f: &mut Fixture, entity: Entity) -> EntityId {
        let id = f.game.world.spawn(entity).unwrap();
        f.game.world.add_item(f.kitchen, id).unwrap();
        id
    }

    fn verbs(f: &Fixture, id: EntityId) -> Vec<String> {
        f.game
            .world
            .entity(id)
            .unwrap()
            .verbs
            .names()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn take_then_drop_restores_state() {
        let mut f = fixture(5);
        let rock = place(&mut f, plain("rock", "A rock."));

        f.game.dispatch(rock, "take", None);
        assert!(f.game.world.holds(f.hero, rock));
        assert!(!f.game.world.in_room(f.hero, rock));
        assert_eq!(verbs(&f, rock), ["drop", "look"]);

        f.game.dispatch(rock, "drop", None);
        assert!(!f.game.world.holds(f.hero, rock));
        assert!(f.game.world.in_room(f.hero, rock));
        assert_eq!(verbs(&f, rock), ["look", "take"]);
    }

    #[test]
    fn take_at_capacity_changes_nothing() {
        let mut f = fixture(1);
        let rock = place(&mut f, plain("rock", ""));
        let stick = place(&mut f, plain("stick", ""));

        f.game.dispatch(rock, "take", None);
        match f.game.dispatch(stick, "take", None) {
            Dispatch::Handled(outcome) => assert!(!outcome.state_changed),
            other => panic!("unexpected {other:?}"),
        }
        assert!(f.out.contains("You already have 1 items, buddy."));
        assert!(f.game.world.in_room(f.hero, stick));
        assert!(f.game.world.entity(stick).unwrap().verbs.contains("take"));
    }

    #[test]
    fn money_credits_balance_without_a_slot() {
        let mut f = fixture(0);
        let quarters = place(&mut f, money("quarters", "Shiny.", Cents(75)));

        f.game.dispatch(quarters, "take", None);
        let hero = f.game.world.character(f.hero).unwrap();
        assert_eq!(hero.money, Cents(75));
        assert!(hero.inventory.is_empty());
        assert!(!f.game.world.in_room(f.hero, quarters));
    }

    #[test]
    fn worn_hat_cannot_be_dropped_until_removed() {
        let mut f = fixture(5);
        let hat = place(
            &mut f,
            wearable("hat", "Silly.", "You put on the hat.", "You took off the hat."),
        );

        f.game.dispatch(hat, "wear", None);
        assert!(f.game.world.holds(f.hero, hat));
        assert!(f.game.world.character(f.hero).unwrap().wearing.contains_key("hat"));
        assert_eq!(verbs(&f, hat), ["look", "remove"]);
        assert!(matches!(
            f.game.dispatch(hat, "drop", None),
            Dispatch::UnknownVerb
        ));

        f.game.dispatch(hat, "remove", None);
        assert_eq!(verbs(&f, hat), ["drop", "look", "wear"]);
        f.game.dispatch(hat, "drop", None);
        assert!(f.game.world.in_room(f.hero, hat));
    }

    #[test]
    fn drop_refused_when_not_droppable() {
        let mut f = fixture(5);
        let hat = place(&mut f, wearable("hat", "", "on", "off"));
        f.game.dispatch(hat, "wear", None);
        let result = drop(&mut f.game, &Call::on(hat));
        assert!(matches!(result, Err(AdvError::Unauthorized(msg)) if msg.contains("not droppable")));
    }

    #[test]
    fn eating_purges_from_the_world() {
        let mut f = fixture(5);
        let hotdog = place(&mut f, eatable("hot dog", "", "eat", "Yummy!"));
        f.game.dispatch(hotdog, "take", None);
        f.game.dispatch(hotdog, "eat", None);

        assert!(f.out.contains("Yummy!"));
        assert!(!f.game.world.contains(hotdog));
        assert!(f.game.world.character(f.hero).unwrap().inventory.is_empty());
        assert!(f.game.world.find("hot dog").is_none());
    }

    #[test]
    fn useable_runs_message_and_effect() {
        let mut f = fixture(5);
        let book = place(
            &mut f,
            useable(
                "book",
                "",
                "read",
                Some("It is a thriller."),
                Some(Verb::new(|game, _| {
                    game.say("You feel smarter.");
                    Ok(Outcome::changed())
                })),
            ),
        );
        f.game.dispatch(book, "read", None);
        assert!(f.out.contains("It is a thriller."));
        assert!(f.out.contains("You feel smarter."));
    }

    #[test]
    fn weapon_hurts_the_named_target() {
        let mut f = fixture(5);
        let sword = place(&mut f, weapon("sword", "", 3));
        let troll = f
            .game
            .world
            .spawn(crate::character::npc("troll", "", CharacterState::new().with_health(10)))
            .unwrap();
        f.game.world.move_character(troll, f.kitchen).unwrap();

        f.game.dispatch(sword, "use", Some("troll".into()));
        assert_eq!(f.game.world.character(troll).unwrap().health, 7);
    }

    #[test]
    fn weapon_prompts_for_a_target() {
        let mut f = fixture(5);
        let sword = place(&mut f, weapon("sword", "", 3));
        let troll = f
            .game
            .world
            .spawn(crate::character::npc("troll", "", CharacterState::new()))
            .unwrap();
        f.game.world.move_character(troll, f.kitchen).unwrap();
        f.game.set_input(ScriptedInput::new(["troll"]));

        f.game.dispatch(sword, "use", None);
        assert!(f.out.contains("Who do you want to hit? [troll]"));
        assert!(f.game.world.character(troll).unwrap().health < 10);
    }

    #[test]
    fn phone_without_money_fails_softly() {
        let mut f = fixture(5);
        let phone = place(&mut f, phone("phone", "", Cents(25), "No service"));
        f.game
            .world
            .spawn(crate::character::npc(
                "ma",
                "",
                CharacterState::new().with_persona(chat::Persona::new("You are Ma.")),
            ))
            .unwrap();

        f.game.dispatch(phone, "use", Some("ma".into()));
        assert!(f.out.contains("You don't have that kind of money, peasant."));
        assert!(f.out.contains("No service"));
        assert_eq!(f.game.world.character(f.hero).unwrap().money, Cents(0));
    }

    #[test]
    fn dead_line_refunds_the_call() {
        let mut f = fixture(5);
        let phone = place(&mut f, phone("phone", "", Cents(25), "No service"));
        f.game
            .world
            .spawn(crate::character::npc(
                "ma",
                "",
                CharacterState::new().with_persona(chat::Persona::new("You are Ma.")),
            ))
            .unwrap();
        f.game.world.earn(f.hero, Cents(100)).unwrap();

        match f.game.dispatch(phone, "use", Some("ma".into())) {
            Dispatch::Handled(outcome) => assert!(!outcome.state_changed),
            other => panic!("expected handled, got {other:?}"),
        }
        assert!(f.out.contains("**RINGING**"));
        assert!(f.out.contains("nobody is listening"));
        assert!(f.out.contains("$0.25 refunded."));
        assert_eq!(f.game.world.character(f.hero).unwrap().money, Cents(100));
    }

    #[test]
    fn console_lists_and_inspects() {
        let mut f = fixture(5);
        let pc = place(&mut f, computer("computer", "Beige."));
        f.game
            .set_input(ScriptedInput::new(["ls", "kitchen", "nonsense", "exit"]));

        f.game.dispatch(pc, "use", None);
        assert!(f.out.contains("KITCHEN -- A kitchen."));
        assert!(f.out.contains("No record of \"nonsense\"."));
        assert!(f.out.contains("You are in: KITCHEN"));
    }
}
