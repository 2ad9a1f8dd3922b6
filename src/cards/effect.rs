//! Effect vocabulary carried by card definitions.
//!
//! Every effect kind is one variant of [`Effect`], so the rules engine
//! matches on them exhaustively. The wire form is a JSON object tagged by
//! `type` (e.g. `{"type": "damage", "amount": 3}`); auxiliary fields that
//! only restate the variant (`stat`, `applies_to`) are accepted and ignored.
//!
//! ## Where each effect is read
//!
//! - **Play time**: damage, damage_all, poison_allies, purge_mods,
//!   grant_keyword_allies, borrow_enemy, swap_positions, execute_threshold,
//!   repeat_last_spell (spells); buff, shield, grant_keyword (mods);
//!   devour_ally, enter_tired, requires_ready_ally, play_tire_allies,
//!   summon_enemy_broodling (creatures)
//! - **Combat**: aura (effects), death_after_attack / no_attack (mods)
//! - **Death resolution**: death_damage_boss / death_heal_boss (mods),
//!   death_damage_all_enemies (creatures), death_counter (effects)
//! - **End of round**: end_buff, end_self_buff, end_adjacent_buff,
//!   end_mana, end_damage_boss, end_clone_boss_on_mass_death
//! - **Activation**: activate_damage, activate_mana, sacrifice buff

use serde::{Deserialize, Serialize};

use super::definition::Keyword;

const fn one() -> i32 {
    1
}

const fn two() -> i32 {
    2
}

/// Precondition attached to a buff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffRequirement {
    /// Only usable by sacrificing the source creature.
    SacrificeSelf,
}

/// A single card effect.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Damage one target; `chain_amount` replaces `amount` once a card was
    /// already played this round.
    Damage {
        amount: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chain_amount: Option<i32>,
    },
    /// Damage every unit on both boards.
    DamageAll { amount: i32 },
    /// Add poison to every friendly creature.
    PoisonAllies { amount: i32 },
    /// Remove all mods from a creature and undo their buffs.
    PurgeMods,
    /// Grant a keyword to every friendly creature.
    GrantKeywordAllies { keyword: Keyword },
    /// Take an enemy creature until end of round.
    BorrowEnemy {
        #[serde(default = "two")]
        return_multiplier: i32,
    },
    /// Swap two creatures on the same board and tire them.
    SwapPositions,
    /// Kill every creature at or above `threshold` power.
    ExecuteThreshold {
        threshold: i32,
        #[serde(default)]
        mana_gain: i32,
    },
    /// Re-cast the previous spell for an extra mana surcharge.
    RepeatLastSpell {
        #[serde(default = "one")]
        surcharge: i32,
    },

    /// Power change on the target (mods) or sacrifice-buff (creatures).
    Buff {
        amount: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requires: Option<BuffRequirement>,
    },
    /// Shield charges (mods).
    Shield {
        #[serde(default = "one")]
        amount: i32,
    },
    /// Grant a keyword to the target (mods).
    GrantKeyword { keyword: Keyword },
    /// Carrier cannot attack.
    NoAttack,
    /// Carrier buffs its board neighbours while it stands.
    AnchoredAura {
        #[serde(default = "one")]
        amount: i32,
    },
    /// Carrier dies after attacking.
    DeathAfterAttack,

    /// Bonus attack power for friendly attackers.
    Aura { amount: i32 },
    /// Untired friendly creatures gain power at end of round.
    EndBuff { amount: i32 },
    /// The creature itself changes power at end of round.
    EndSelfBuff { amount: i32 },
    /// Carrier's board neighbours gain power at end of round (flank).
    EndAdjacentBuff { amount: i32 },
    /// Mana change at end of round.
    EndMana { amount: i32 },
    /// Damage the boss at end of round.
    EndDamageBoss { amount: i32 },
    /// Clone the strongest boss creature when enough units died this round.
    EndCloneBossOnMassDeath { amount: i32 },

    /// Damage the boss when the carrier dies.
    DeathDamageBoss { amount: i32 },
    /// Heal the boss when the carrier dies.
    DeathHealBoss { amount: i32 },
    /// Splash every creature on the opposing board on death.
    DeathDamageAllEnemies { amount: i32 },
    /// Counter grows per death.
    DeathCounter {
        #[serde(default = "one")]
        amount: i32,
    },
    /// Counter grows per spell or mod cast.
    CastCounter {
        #[serde(default = "one")]
        amount: i32,
    },
    /// Spend `threshold` counters to deal `amount` damage.
    ActivateDamage { amount: i32, threshold: i32 },
    /// Convert all counters to mana, consuming the permanent.
    ActivateMana,
    /// Mana refund whenever a mod is played.
    ManaOnMod { amount: i32 },

    /// Creature eats a friendly creature and adds its power.
    DevourAlly,
    /// Creature enters tired.
    EnterTired,
    /// Creature needs an untired ally already on board.
    RequiresReadyAlly,
    /// Playing the creature tires the whole board.
    PlayTireAllies,
    /// Put Broodlings on the enemy board.
    SummonEnemyBroodling {
        #[serde(default = "one")]
        amount: i32,
    },
}

impl Effect {
    /// True for mod effects that would hurt the boss's own side (death
    /// damage to the boss) or hand its units `pierce`.
    #[must_use]
    pub fn is_unfair_on_boss(&self) -> bool {
        matches!(
            self,
            Effect::DeathDamageBoss { .. }
                | Effect::GrantKeyword {
                    keyword: Keyword::Pierce
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_round_trip_defaults() {
        let shield: Effect = serde_json::from_str(r#"{"type":"shield"}"#).unwrap();
        assert_eq!(shield, Effect::Shield { amount: 1 });

        let borrow: Effect = serde_json::from_str(r#"{"type":"borrow_enemy"}"#).unwrap();
        assert_eq!(borrow, Effect::BorrowEnemy { return_multiplier: 2 });

        let unit: Effect = serde_json::from_str(r#"{"type":"death_after_attack"}"#).unwrap();
        assert_eq!(unit, Effect::DeathAfterAttack);
    }

    #[test]
    fn test_buff_with_requirement() {
        let json = r#"{"type":"buff","stat":"power","amount":4,"requires":"sacrifice_self"}"#;
        let buff: Effect = serde_json::from_str(json).unwrap();
        assert_eq!(
            buff,
            Effect::Buff {
                amount: 4,
                requires: Some(BuffRequirement::SacrificeSelf)
            }
        );
    }

    #[test]
    fn test_unfair_on_boss() {
        assert!(Effect::DeathDamageBoss { amount: 2 }.is_unfair_on_boss());
        assert!(Effect::GrantKeyword { keyword: Keyword::Pierce }.is_unfair_on_boss());
        assert!(!Effect::GrantKeyword { keyword: Keyword::Guard }.is_unfair_on_boss());
        assert!(!Effect::Shield { amount: 1 }.is_unfair_on_boss());
    }
}
