//! Experience, level-ups, and stat-point spending.
//!
//! Reducers here take a character snapshot and return the next
//! snapshot; the caller decides when the result becomes the character's
//! state of record.

use crate::error::Rejection;
use crate::world::{Character, StatKind};
use serde::{Deserialize, Serialize};

/// Stat points granted per level gained.
pub const POINTS_PER_LEVEL: u32 = 5;

/// What an experience award did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpAward {
    pub exp_gained: u64,
    pub levels_gained: u32,
    pub new_level: u32,
    pub stat_points_awarded: u32,
}

/// Grant experience, resolving as many level-ups as the total covers.
///
/// Each threshold crossing carries the overflow into the next level,
/// and the threshold grows by half after every crossing. Any level gain
/// fully restores HP and MP.
pub fn award_exp(character: &Character, amount: u64) -> (Character, ExpAward) {
    let mut next = character.clone();
    next.experience += amount;
    // A stored snapshot could carry a zero threshold, which would make
    // the loop below spin forever.
    next.exp_to_next_level = next.exp_to_next_level.max(1);

    let mut levels_gained = 0u32;
    while next.experience >= next.exp_to_next_level {
        next.experience -= next.exp_to_next_level;
        next.exp_to_next_level = next.exp_to_next_level * 3 / 2;
        next.level += 1;
        next.stat_points += POINTS_PER_LEVEL;
        levels_gained += 1;
    }

    if levels_gained > 0 {
        next.recompute_max_vitals();
        next.hp = next.max_hp;
        next.mp = next.max_mp;
        tracing::info!(
            character = %next.name,
            level = next.level,
            levels_gained,
            "level up"
        );
    }

    let report = ExpAward {
        exp_gained: amount,
        levels_gained,
        new_level: next.level,
        stat_points_awarded: levels_gained * POINTS_PER_LEVEL,
    };
    (next, report)
}

/// Spend stat points on base stats. The whole allocation is checked
/// against the available pool before anything is applied; a short pool
/// rejects the entire request.
///
/// Raising vitality or intelligence raises the matching maximum vital,
/// and the current vital grows by the same delta so spending points
/// never costs the character standing HP or MP.
pub fn allocate_stat_points(
    character: &Character,
    allocations: &[(StatKind, u32)],
) -> Result<Character, Rejection> {
    let needed: u32 = allocations.iter().map(|(_, n)| n).sum();
    if needed > character.stat_points {
        return Err(Rejection::NotEnoughStatPoints {
            needed,
            available: character.stat_points,
        });
    }

    let mut next = character.clone();
    next.stat_points -= needed;
    for (kind, points) in allocations {
        next.base_stats.add(*kind, *points);
    }

    let old_max_hp = next.max_hp;
    let old_max_mp = next.max_mp;
    next.recompute_max_vitals();
    next.hp += next.max_hp - old_max_hp;
    next.mp += next.max_mp - old_max_mp;
    next.clamp_vitals();

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CharacterClass, BASE_EXP_TO_LEVEL};

    fn hero() -> Character {
        Character::new("Brannik", CharacterClass::Warrior)
    }

    #[test]
    fn test_exp_below_threshold_no_level() {
        let (next, report) = award_exp(&hero(), 99);
        assert_eq!(next.level, 1);
        assert_eq!(next.experience, 99);
        assert_eq!(report.levels_gained, 0);
        assert_eq!(report.stat_points_awarded, 0);
    }

    #[test]
    fn test_single_level_with_overflow() {
        let (next, report) = award_exp(&hero(), 130);
        assert_eq!(next.level, 2);
        assert_eq!(next.experience, 30);
        assert_eq!(next.exp_to_next_level, BASE_EXP_TO_LEVEL * 3 / 2);
        assert_eq!(report.levels_gained, 1);
        assert_eq!(next.stat_points, 5);
    }

    #[test]
    fn test_multi_level_in_one_award() {
        // 100 to reach level 2, then 150 to reach level 3.
        let (next, report) = award_exp(&hero(), 260);
        assert_eq!(next.level, 3);
        assert_eq!(next.experience, 10);
        assert_eq!(next.exp_to_next_level, 225);
        assert_eq!(report.levels_gained, 2);
        assert_eq!(next.stat_points, 10);
    }

    #[test]
    fn test_zero_threshold_from_stored_snapshot() {
        // A hand-edited or corrupt save could carry a zero threshold.
        let mut stale = hero();
        stale.exp_to_next_level = 0;
        let (next, award) = award_exp(&stale, 3);
        assert_eq!(award.levels_gained, 3);
        assert_eq!(next.experience, 0);
        assert!(next.exp_to_next_level >= 1);
    }

    #[test]
    fn test_level_up_restores_vitals() {
        let mut wounded = hero();
        wounded.hp = 3;
        wounded.mp = 1;
        let (next, _) = award_exp(&wounded, 100);
        assert_eq!(next.hp, next.max_hp);
        assert_eq!(next.mp, next.max_mp);
    }

    #[test]
    fn test_allocation_rejected_when_short() {
        let base = hero();
        let err = allocate_stat_points(&base, &[(StatKind::Strength, 3)]).unwrap_err();
        assert_eq!(
            err,
            Rejection::NotEnoughStatPoints {
                needed: 3,
                available: 0
            }
        );
    }

    #[test]
    fn test_allocation_atomic() {
        let (leveled, _) = award_exp(&hero(), 100);
        // 5 available; asking for 6 total must leave everything untouched.
        let err = allocate_stat_points(
            &leveled,
            &[(StatKind::Strength, 4), (StatKind::Vitality, 2)],
        )
        .unwrap_err();
        assert!(matches!(err, Rejection::NotEnoughStatPoints { .. }));
    }

    #[test]
    fn test_vitality_allocation_grows_hp() {
        let (leveled, _) = award_exp(&hero(), 100);
        let next = allocate_stat_points(&leveled, &[(StatKind::Vitality, 2)]).unwrap();
        assert_eq!(next.base_stats.vitality, 9);
        assert_eq!(next.max_hp, 90);
        assert_eq!(next.hp, 90);
        assert_eq!(next.stat_points, 3);
    }

    #[test]
    fn test_intelligence_allocation_grows_mp() {
        let (leveled, _) = award_exp(&hero(), 100);
        let before_mp = leveled.mp;
        let next = allocate_stat_points(&leveled, &[(StatKind::Intelligence, 5)]).unwrap();
        assert_eq!(next.max_mp, leveled.max_mp + 25);
        assert_eq!(next.mp, before_mp + 25);
    }
}
