//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use puzzle_forge::cards::BuffRequirement;
use puzzle_forge::{
    apply, BoardSide, CardDefinition, CardId, CardInstance, CardLibrary, CardType, Effect, GameState, Keyword,
};

/// A few cards in their JSON interchange form.
pub const CARDS_JSON: &str = r#"[
    {
        "id": "iron_golem",
        "name": "Iron Golem",
        "type": "creature",
        "cost": 3,
        "keywords": ["guard"],
        "stats": { "power": 3 }
    },
    {
        "id": "spark",
        "name": "Spark",
        "type": "spell",
        "cost": 1,
        "effects": [{ "type": "damage", "amount": 2, "chain_amount": 4 }]
    },
    {
        "id": "fireball",
        "name": "Fireball",
        "type": "spell",
        "cost": 2,
        "effects": [{ "type": "damage", "amount": 5 }]
    }
]"#;

/// Route `log` output through the test harness; `RUST_LOG` picks the level.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Library mixing JSON-loaded and builder-made definitions.
pub fn library() -> CardLibrary {
    init_logging();
    let parsed: Vec<CardDefinition> = serde_json::from_str(CARDS_JSON).expect("fixture cards parse");
    let mut library = CardLibrary::from_definitions(parsed);
    for def in [
        CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(2),
        CardDefinition::new("cultist", "Cultist", CardType::Creature, 1)
            .with_power(1)
            .with_keyword(Keyword::Sacrifice)
            .with_effect(Effect::Buff {
                amount: 4,
                requires: Some(BuffRequirement::SacrificeSelf),
            }),
        CardDefinition::new("lancer", "Lancer", CardType::Creature, 3)
            .with_power(5)
            .with_keyword(Keyword::Pierce),
        CardDefinition::new("bomber", "Bomber", CardType::Creature, 2)
            .with_power(2)
            .with_effect(Effect::DeathDamageAllEnemies { amount: 2 }),
        CardDefinition::new("vulture", "Vulture", CardType::Creature, 1)
            .with_power(1)
            .with_keyword(Keyword::Scavenger),
        CardDefinition::new("doom", "Doom", CardType::Mod, 1).with_effect(Effect::DeathAfterAttack),
        CardDefinition::new("swap", "Swap", CardType::Spell, 1).with_effect(Effect::SwapPositions),
    ] {
        let _ = library.register(def);
    }
    library
}

/// Hand, spell and creature cards only; keeps generation fast.
pub fn generator_library() -> CardLibrary {
    init_logging();
    CardLibrary::from_definitions([
        CardDefinition::new("spark", "Spark", CardType::Spell, 1).with_effect(Effect::Damage {
            amount: 2,
            chain_amount: None,
        }),
        CardDefinition::new("fireball", "Fireball", CardType::Spell, 2).with_effect(Effect::Damage {
            amount: 5,
            chain_amount: None,
        }),
        CardDefinition::new("grunt", "Grunt", CardType::Creature, 1).with_power(2),
        CardDefinition::new("lancer", "Lancer", CardType::Creature, 3)
            .with_power(5)
            .with_keyword(Keyword::Pierce),
    ])
}

pub fn hand(cards: &[&str]) -> im::Vector<CardId> {
    cards.iter().map(|card| CardId::new(*card)).collect()
}

pub fn unit(library: &CardLibrary, card: &str) -> CardInstance {
    let def = library.get(card).expect("fixture card exists");
    CardInstance::from_definition(def, "")
}

/// Cultist and lancer in hand against a guarded boss at 6 health.
pub fn lethal_state(library: &CardLibrary) -> GameState {
    let mut state = GameState::default();
    state.player.mana = 5;
    state.player.hand = hand(&["cultist", "lancer"]);
    state.opponent.health = 6;
    state.opponent.board.push_back(unit(library, "iron_golem"));
    state.target_rounds = Some(1);
    state.normalize()
}

/// A mixed position with several legal moves of every kind.
pub fn busy_state(library: &CardLibrary) -> GameState {
    let mut state = GameState::default();
    state.player.mana = 5;
    state.player.hand = hand(&["spark", "grunt", "cultist", "fireball"]);
    state.player.board.push_back(unit(library, "vulture"));
    state.player.board.push_back(unit(library, "bomber"));
    state.opponent.health = 12;
    state.opponent.board.push_back(unit(library, "grunt"));
    state.opponent.board.push_back(unit(library, "iron_golem"));
    state.target_rounds = Some(2);
    state.mana_per_round = 2;
    state.normalize()
}

/// Mods, swaps and sacrifices all on the table at once.
pub fn tactics_state(library: &CardLibrary) -> GameState {
    let mut state = GameState::default();
    state.player.mana = 4;
    state.player.hand = hand(&["swap", "doom", "spark", "cultist"]);
    state.player.board.push_back(unit(library, "grunt"));
    state.player.board.push_back(unit(library, "vulture"));
    state.player.board.push_back(unit(library, "lancer"));
    state.opponent.health = 15;
    state.opponent.board.push_back(unit(library, "grunt"));
    state.opponent.board.push_back(unit(library, "iron_golem"));
    state.target_rounds = Some(3);
    state.mana_per_round = 1;
    state.normalize()
}

/// Uid of the board unit at `index`.
pub fn uid(state: &GameState, side: BoardSide, index: usize) -> String {
    state.board(side)[index].uid.clone()
}

/// Replay `line` from `state`, panicking on the first rejected action.
pub fn replay(state: &GameState, line: &[puzzle_forge::Action], library: &CardLibrary) -> GameState {
    line.iter().fold(state.clone(), |current, action| {
        apply(&current, action, library).unwrap_or_else(|err| panic!("{action:?} rejected: {err}"))
    })
}
