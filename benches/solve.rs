//! Benchmarks for the solver and the generator.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use puzzle_forge::cards::BuffRequirement;
use puzzle_forge::{
    generate_puzzle, legal_actions, solve, CardDefinition, CardId, CardInstance, CardLibrary, CardType, Effect,
    GameState, GenerateConfig, Keyword, SearchConfig,
};

fn library() -> CardLibrary {
    CardLibrary::from_definitions([
        CardDefinition::new("spark", "Spark", CardType::Spell, 1).with_effect(Effect::Damage {
            amount: 2,
            chain_amount: Some(4),
        }),
        CardDefinition::new("fireball", "Fireball", CardType::Spell, 2).with_effect(Effect::Damage {
            amount: 5,
            chain_amount: None,
        }),
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
        CardDefinition::new("golem", "Iron Golem", CardType::Creature, 3)
            .with_power(3)
            .with_keyword(Keyword::Guard),
    ])
}

fn position(hand: &[&str], rounds: u32) -> GameState {
    let lib = library();
    let mut state = GameState::default();
    state.player.mana = 6;
    state.mana_per_round = 2;
    state.player.hand = hand.iter().map(|card| CardId::new(*card)).collect();
    state.opponent.health = 14;
    for card in ["golem", "grunt"] {
        if let Some(def) = lib.get(card) {
            state.opponent.board.push_back(CardInstance::from_definition(def, ""));
        }
    }
    state.target_rounds = Some(rounds);
    state.normalize()
}

/// Full solves of growing hands.
fn benchmark_solve(c: &mut Criterion) {
    let lib = library();
    let hands: [&[&str]; 3] = [
        &["spark", "cultist", "lancer"],
        &["spark", "spark", "cultist", "lancer"],
        &["spark", "fireball", "grunt", "cultist", "lancer"],
    ];

    let mut group = c.benchmark_group("Solve");
    for hand in hands {
        for rounds in [1, 2] {
            let state = position(hand, rounds);
            group.bench_with_input(
                BenchmarkId::new(format!("hand{}", hand.len()), rounds),
                &state,
                |b, state| {
                    b.iter(|| solve(black_box(state), &lib, SearchConfig::default().with_max_nodes(200_000)));
                },
            );
        }
    }
    group.finish();
}

fn benchmark_legal_actions(c: &mut Criterion) {
    let lib = library();
    let state = position(&["spark", "fireball", "grunt", "cultist", "lancer"], 1);
    c.bench_function("legal_actions", |b| {
        b.iter(|| black_box(legal_actions(black_box(&state), &lib)));
    });
}

fn benchmark_generate(c: &mut Criterion) {
    let lib = library();
    let mut group = c.benchmark_group("Generate");
    group.sample_size(20);
    for seed in [1_u32, 2, 3] {
        let config = GenerateConfig::default().with_seed(seed).with_max_solutions(0);
        group.bench_with_input(BenchmarkId::new("seed", seed), &config, |b, config| {
            b.iter(|| generate_puzzle(&lib, black_box(config)));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_solve, benchmark_legal_actions, benchmark_generate);
criterion_main!(benches);
