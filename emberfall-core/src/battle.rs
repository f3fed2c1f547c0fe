//! Turn-based battle resolution.
//!
//! A battle is a snapshot of one encounter: the monster's remaining HP,
//! the turn counter, live skill cooldowns, and a terminal phase once it
//! ends. `take_turn` is the reducer: it consumes the current character
//! and battle snapshots plus one player action and returns the next
//! snapshots along with the events that happened, already resolved to
//! numbers. Nothing here talks to the narrator or the store.

use crate::catalog::{Catalog, ConsumableEffect, ItemKind, MonsterDef, SkillDef, SkillEffect, SkillKind};
use crate::error::Rejection;
use crate::loot;
use crate::progression::{self, ExpAward};
use crate::quest;
use crate::rolls;
use crate::stats::{self, EffectiveStats};
use crate::world::{Character, ItemStack};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum effective attack for the basic strike, so an untrained
/// character still threatens a wolf.
const BASE_STRIKE_FLOOR: u32 = 3;

/// Where the encounter stands. Every phase except `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    Active,
    Victory,
    Defeat,
    Fled,
}

/// One encounter in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub monster_id: String,
    pub monster_hp: i32,
    pub monster_max_hp: i32,
    pub turn: u32,
    pub phase: BattlePhase,
    /// Remaining cooldown turns per skill id, this encounter only.
    pub cooldowns: HashMap<String, u32>,
}

/// What the player chose to do this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Attack,
    Skill(String),
    UseItem(String),
    Flee,
}

/// One resolved happening, in order, for the narrator and the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    PlayerAttack {
        damage: i32,
    },
    SkillDamage {
        skill_id: String,
        damage: i32,
    },
    SkillHeal {
        skill_id: String,
        amount: i32,
    },
    ItemUsed {
        item_id: String,
        effect: ConsumableEffect,
    },
    MonsterAttack {
        damage: i32,
    },
    Victory {
        exp: ExpAward,
        gold: u64,
        drops: Vec<ItemStack>,
    },
    Defeat {
        gold_lost: u64,
    },
    Fled,
}

/// Everything one turn produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub events: Vec<BattleEvent>,
    pub phase: BattlePhase,
}

/// Open an encounter against a catalog monster. Rejected if the
/// monster is unknown or the character is already down.
pub fn start_battle(
    character: &Character,
    catalog: &Catalog,
    monster_id: &str,
) -> Result<Battle, Rejection> {
    let monster = catalog
        .monster(monster_id)
        .ok_or_else(|| Rejection::UnknownMonster(monster_id.to_string()))?;
    if !character.is_alive() {
        return Err(Rejection::CharacterDefeated);
    }
    tracing::debug!(character = %character.name, monster = monster_id, "battle started");
    Ok(Battle {
        monster_id: monster.id.clone(),
        monster_hp: monster.max_hp,
        monster_max_hp: monster.max_hp,
        turn: 0,
        phase: BattlePhase::Active,
        cooldowns: HashMap::new(),
    })
}

/// Resolve one full turn: the player's action, then the monster's
/// counter if both sides are still standing. Rejections leave both
/// snapshots untouched.
pub fn take_turn<R: Rng>(
    character: &Character,
    battle: &Battle,
    catalog: &Catalog,
    rng: &mut R,
    action: PlayerAction,
) -> Result<(Character, Battle, TurnReport), Rejection> {
    if battle.phase != BattlePhase::Active {
        return Err(Rejection::BattleAlreadyOver);
    }
    let monster = catalog
        .monster(&battle.monster_id)
        .ok_or_else(|| Rejection::UnknownMonster(battle.monster_id.clone()))?;

    let mut next = character.clone();
    let mut state = battle.clone();
    let mut events = Vec::new();
    let player_stats = stats::effective_stats(character, catalog);

    match action {
        PlayerAction::Attack => {
            let damage = basic_attack_damage(rng, &player_stats);
            state.monster_hp -= damage;
            events.push(BattleEvent::PlayerAttack { damage });
        }
        PlayerAction::Skill(skill_id) => {
            let skill = validate_skill(&next, &state, catalog, &skill_id)?;
            next.mp -= skill.mp_cost;
            match skill.effect {
                SkillEffect::Damage { min, max } => {
                    let damage = skill_damage(rng, skill, &player_stats, min, max);
                    state.monster_hp -= damage;
                    events.push(BattleEvent::SkillDamage {
                        skill_id: skill.id.clone(),
                        damage,
                    });
                }
                SkillEffect::Heal { min, max } => {
                    let amount =
                        rolls::uniform(rng, min, max) as i32 + player_stats.magic_power as i32;
                    next.hp = (next.hp + amount).min(next.max_hp);
                    events.push(BattleEvent::SkillHeal {
                        skill_id: skill.id.clone(),
                        amount,
                    });
                }
            }
            if skill.cooldown_turns > 0 {
                state.cooldowns.insert(skill.id.clone(), skill.cooldown_turns);
            }
        }
        PlayerAction::UseItem(item_id) => {
            let (consumed, effect) = consume_item(&next, catalog, &item_id)?;
            next = consumed;
            events.push(BattleEvent::ItemUsed { item_id, effect });
        }
        PlayerAction::Flee => {
            state.phase = BattlePhase::Fled;
            events.push(BattleEvent::Fled);
            return Ok((
                next,
                state,
                TurnReport {
                    events,
                    phase: BattlePhase::Fled,
                },
            ));
        }
    }

    if state.monster_hp <= 0 {
        state.monster_hp = 0;
        state.phase = BattlePhase::Victory;
        resolve_victory(&mut next, catalog, monster, rng, &mut events);
    } else {
        let damage = monster_attack_damage(rng, monster, &player_stats);
        next.hp -= damage;
        events.push(BattleEvent::MonsterAttack { damage });
        if next.hp <= 0 {
            state.phase = BattlePhase::Defeat;
            resolve_defeat(&mut next, &mut events);
        }
    }

    state.turn += 1;
    tick_cooldowns(&mut state);

    let phase = state.phase;
    Ok((next, state, TurnReport { events, phase }))
}

/// Spend one consumable from the inventory and apply it, in or out of
/// combat. Returns the effect applied alongside the next snapshot.
pub fn consume_item(
    character: &Character,
    catalog: &Catalog,
    item_id: &str,
) -> Result<(Character, ConsumableEffect), Rejection> {
    let item = catalog
        .item(item_id)
        .ok_or_else(|| Rejection::UnknownItem(item_id.to_string()))?;
    let ItemKind::Consumable { effect } = &item.kind else {
        return Err(Rejection::ItemNotUsable(item_id.to_string()));
    };
    let effect = *effect;
    if !character.has_item(item_id) {
        return Err(Rejection::ItemNotOwned(item_id.to_string()));
    }

    let mut next = character.clone();
    next.remove_item(item_id, 1);
    match effect {
        ConsumableEffect::RestoreHp(amount) => {
            next.hp = (next.hp + amount).min(next.max_hp);
        }
        ConsumableEffect::RestoreMp(amount) => {
            next.mp = (next.mp + amount).min(next.max_mp);
        }
    }
    Ok((next, effect))
}

fn validate_skill<'a>(
    character: &Character,
    battle: &Battle,
    catalog: &'a Catalog,
    skill_id: &str,
) -> Result<&'a SkillDef, Rejection> {
    let skill = catalog
        .skill(skill_id)
        .ok_or_else(|| Rejection::UnknownSkill(skill_id.to_string()))?;
    if !character.knows_skill(skill_id) {
        return Err(Rejection::SkillNotKnown(skill_id.to_string()));
    }
    if let Some(required) = skill.class_restriction {
        if character.class != required {
            return Err(Rejection::WrongClass {
                skill: skill_id.to_string(),
                required,
            });
        }
    }
    if character.level < skill.required_level {
        return Err(Rejection::LevelTooLow {
            required: skill.required_level,
            current: character.level,
        });
    }
    if battle.cooldowns.get(skill_id).copied().unwrap_or(0) > 0 {
        return Err(Rejection::SkillOnCooldown(skill_id.to_string()));
    }
    if character.mp < skill.mp_cost {
        return Err(Rejection::NotEnoughMp {
            needed: skill.mp_cost,
            available: character.mp,
        });
    }
    Ok(skill)
}

// Player damage lands in full; monster defense only tempers the
// counter-attack.
fn basic_attack_damage<R: Rng>(rng: &mut R, player: &EffectiveStats) -> i32 {
    (rolls::uniform(rng, 0, 4) + player.attack.max(BASE_STRIKE_FLOOR)) as i32
}

fn skill_damage<R: Rng>(
    rng: &mut R,
    skill: &SkillDef,
    player: &EffectiveStats,
    min: u32,
    max: u32,
) -> i32 {
    let scaling = match skill.kind {
        SkillKind::Physical => player.attack,
        SkillKind::Elemental => player.magic_power,
    };
    (rolls::uniform(rng, min, max) + scaling) as i32
}

fn monster_attack_damage<R: Rng>(
    rng: &mut R,
    monster: &MonsterDef,
    player: &EffectiveStats,
) -> i32 {
    let raw = rolls::uniform(rng, 0, 2) + monster.attack;
    (raw.saturating_sub(player.defense)).max(1) as i32
}

fn resolve_victory<R: Rng>(
    character: &mut Character,
    catalog: &Catalog,
    monster: &MonsterDef,
    rng: &mut R,
    events: &mut Vec<BattleEvent>,
) {
    let gold = loot::resolve_gold(rng, monster);
    let drops = loot::resolve_drops(rng, monster);

    character.gold += gold;
    for stack in &drops {
        let stackable = catalog.is_stackable(&stack.item_id);
        character.add_item(&stack.item_id, stack.quantity, stackable);
    }
    *character = quest::record_kill(character, catalog, &monster.id);
    *character = quest::record_items_acquired(character, catalog, &drops);

    let (leveled, exp) = progression::award_exp(character, monster.exp_reward);
    *character = leveled;

    tracing::debug!(
        character = %character.name,
        monster = %monster.id,
        gold,
        exp = exp.exp_gained,
        "battle won"
    );
    events.push(BattleEvent::Victory { exp, gold, drops });
}

fn resolve_defeat(character: &mut Character, events: &mut Vec<BattleEvent>) {
    let gold_lost = character.gold / 10;
    character.gold -= gold_lost;
    character.hp = 1;
    tracing::debug!(character = %character.name, gold_lost, "battle lost");
    events.push(BattleEvent::Defeat { gold_lost });
}

fn tick_cooldowns(battle: &mut Battle) {
    battle.cooldowns.retain(|_, remaining| {
        *remaining -= 1;
        *remaining > 0
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rolls::seeded;
    use crate::world::CharacterClass;

    fn setup() -> (Character, Catalog) {
        (
            Character::new("Brannik", CharacterClass::Warrior),
            Catalog::standard(),
        )
    }

    #[test]
    fn test_start_battle_unknown_monster() {
        let (hero, catalog) = setup();
        assert_eq!(
            start_battle(&hero, &catalog, "tarrasque").unwrap_err(),
            Rejection::UnknownMonster("tarrasque".into())
        );
    }

    #[test]
    fn test_start_battle_snapshot() {
        let (hero, catalog) = setup();
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        assert_eq!(battle.monster_hp, 20);
        assert_eq!(battle.phase, BattlePhase::Active);
        assert_eq!(battle.turn, 0);
    }

    #[test]
    fn test_attack_damages_and_counter_lands() {
        let (hero, catalog) = setup();
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let (next, state, report) =
            take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Attack).unwrap();

        assert!(state.monster_hp < battle.monster_hp);
        assert!(next.hp < hero.hp);
        assert_eq!(state.turn, 1);
        assert!(matches!(report.events[0], BattleEvent::PlayerAttack { damage } if damage >= 1));
        assert!(matches!(report.events[1], BattleEvent::MonsterAttack { damage } if damage >= 1));
    }

    #[test]
    fn test_basic_attack_formula() {
        // attack 10 vs 20 HP: one hit lands 10..=14, leaving 6..=10.
        let (mut hero, catalog) = setup();
        hero.base_stats.strength = 16; // 16/2 + rusty sword's 2 = 10
        hero.hp = 1000;
        hero.max_hp = 1000;
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(4);
        for _ in 0..50 {
            let (_, state, _) =
                take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Attack).unwrap();
            assert!((6..=10).contains(&state.monster_hp));
        }
    }

    #[test]
    fn test_skill_gated_by_level() {
        let (mut hero, catalog) = setup();
        hero.known_skills.push("crushing_blow".into());
        hero.mp = 100;
        hero.max_mp = 100;
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(4);
        let err = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("crushing_blow".into()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Rejection::LevelTooLow {
                required: 3,
                current: 1
            }
        );
    }

    #[test]
    fn test_skill_gated_by_class() {
        let catalog = Catalog::standard();
        let mut mage = Character::new("Sylvette", CharacterClass::Mage);
        mage.known_skills.push("crushing_blow".into());
        mage.level = 3;
        mage.mp = 100;
        mage.max_mp = 100;
        let battle = start_battle(&mage, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(4);
        let err = take_turn(
            &mage,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("crushing_blow".into()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Rejection::WrongClass {
                skill: "crushing_blow".into(),
                required: CharacterClass::Warrior,
            }
        );
    }

    #[test]
    fn test_rejection_leaves_snapshots_untouched() {
        let (hero, catalog) = setup();
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let err = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("meteor_swarm".into()),
        )
        .unwrap_err();
        assert_eq!(err, Rejection::UnknownSkill("meteor_swarm".into()));
    }

    #[test]
    fn test_skill_requires_mp() {
        let (mut hero, catalog) = setup();
        hero.mp = 2; // power_strike costs 5
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let err = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("power_strike".into()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Rejection::NotEnoughMp {
                needed: 5,
                available: 2
            }
        );
    }

    #[test]
    fn test_skill_debits_mp_and_unknown_to_character() {
        let (hero, catalog) = setup();
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let (next, _, report) = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("power_strike".into()),
        )
        .unwrap();
        assert_eq!(next.mp, hero.mp - 5);
        assert!(matches!(
            &report.events[0],
            BattleEvent::SkillDamage { skill_id, damage } if skill_id == "power_strike" && *damage >= 1
        ));
    }

    #[test]
    fn test_unknown_skill_not_learned() {
        let (hero, catalog) = setup();
        // ember_bolt exists but a warrior has not learned it.
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let err = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("ember_bolt".into()),
        )
        .unwrap_err();
        assert_eq!(err, Rejection::SkillNotKnown("ember_bolt".into()));
    }

    #[test]
    fn test_cooldown_blocks_then_clears() {
        let (mut hero, catalog) = setup();
        hero.known_skills.push("crushing_blow".into());
        hero.level = 3;
        hero.mp = 100;
        hero.hp = 1000;
        hero.max_hp = 1000;
        hero.max_mp = 100;
        let mut battle = start_battle(&hero, &catalog, "ridge_bear").unwrap();
        let mut rng = seeded(2);

        let (next, state, _) = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("crushing_blow".into()),
        )
        .unwrap();
        // Two-turn cooldown: one turn has elapsed, one remains.
        assert_eq!(state.cooldowns.get("crushing_blow"), Some(&1));
        let err = take_turn(
            &next,
            &state,
            &catalog,
            &mut rng,
            PlayerAction::Skill("crushing_blow".into()),
        )
        .unwrap_err();
        assert_eq!(err, Rejection::SkillOnCooldown("crushing_blow".into()));

        let (next2, state2, _) =
            take_turn(&next, &state, &catalog, &mut rng, PlayerAction::Attack).unwrap();
        assert!(state2.cooldowns.is_empty());
        battle = state2;
        let again = take_turn(
            &next2,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::Skill("crushing_blow".into()),
        );
        assert!(again.is_ok());
    }

    #[test]
    fn test_item_use_consumes_turn() {
        let (mut hero, catalog) = setup();
        hero.hp = 30;
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let (next, _, report) = take_turn(
            &hero,
            &battle,
            &catalog,
            &mut rng,
            PlayerAction::UseItem("minor_healing_potion".into()),
        )
        .unwrap();
        assert_eq!(next.count_of("minor_healing_potion"), 1);
        // Healed 25, then took the wolf's counter.
        assert!(next.hp > 30);
        assert!(matches!(report.events[1], BattleEvent::MonsterAttack { .. }));
    }

    #[test]
    fn test_flee_skips_counter() {
        let (hero, catalog) = setup();
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let mut rng = seeded(11);
        let (next, state, report) =
            take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Flee).unwrap();
        assert_eq!(state.phase, BattlePhase::Fled);
        assert_eq!(next.hp, hero.hp);
        assert_eq!(report.events, vec![BattleEvent::Fled]);
    }

    #[test]
    fn test_terminal_battle_rejects_actions() {
        let (hero, catalog) = setup();
        let mut battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        battle.phase = BattlePhase::Fled;
        let mut rng = seeded(11);
        assert_eq!(
            take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Attack).unwrap_err(),
            Rejection::BattleAlreadyOver
        );
    }

    #[test]
    fn test_victory_awards_everything() {
        let (mut hero, catalog) = setup();
        hero = quest::accept_quest(&hero, &catalog, "wolf_cull").unwrap();
        let mut battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        battle.monster_hp = 1;
        let mut rng = seeded(11);
        let (next, state, report) =
            take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Attack).unwrap();

        assert_eq!(state.phase, BattlePhase::Victory);
        assert_eq!(state.monster_hp, 0);
        assert!(next.gold > hero.gold);
        assert_eq!(next.experience, 25);
        assert_eq!(next.active_quest("wolf_cull").unwrap().progress, vec![1]);
        let last = report.events.last().unwrap();
        assert!(matches!(last, BattleEvent::Victory { exp, .. } if exp.exp_gained == 25));
    }

    #[test]
    fn test_victory_drops_progress_collect_quests() {
        use crate::catalog::{DropEntry, ObjectiveDef, QuestDef};

        let mut catalog = Catalog::standard();
        catalog.add_monster(
            MonsterDef::new("molting_wolf", "Molting Wolf", 1, 1, 1, 0, 5)
                .with_drop(DropEntry::new("wolf_pelt", 1.0, 1, 1)),
        );
        catalog.add_quest(
            QuestDef::new("one_good_pelt", "One Good Pelt")
                .with_objective(ObjectiveDef::collect("wolf_pelt", 1)),
        );

        let hero = Character::new("Brannik", CharacterClass::Warrior);
        let hero = quest::accept_quest(&hero, &catalog, "one_good_pelt").unwrap();
        let battle = start_battle(&hero, &catalog, "molting_wolf").unwrap();
        let mut rng = seeded(11);
        let (next, state, _) =
            take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Attack).unwrap();

        assert_eq!(state.phase, BattlePhase::Victory);
        let active = next.active_quest("one_good_pelt").unwrap();
        assert_eq!(active.progress, vec![1]);
        assert_eq!(active.status, crate::world::QuestStatus::ReadyToComplete);
    }

    #[test]
    fn test_defeat_penalty() {
        let (mut hero, catalog) = setup();
        hero.hp = 1;
        hero.gold = 95;
        let battle = start_battle(&hero, &catalog, "ridge_bear").unwrap();
        let mut rng = seeded(11);
        let (next, state, report) =
            take_turn(&hero, &battle, &catalog, &mut rng, PlayerAction::Attack).unwrap();

        assert_eq!(state.phase, BattlePhase::Defeat);
        assert_eq!(next.hp, 1);
        assert_eq!(next.gold, 95 - 9);
        assert!(matches!(
            report.events.last().unwrap(),
            BattleEvent::Defeat { gold_lost: 9 }
        ));
    }

    #[test]
    fn test_seeded_battle_replays_identically() {
        let (hero, catalog) = setup();
        let battle = start_battle(&hero, &catalog, "wolf_pup").unwrap();
        let run = |seed| {
            let mut rng = seeded(seed);
            let mut c = hero.clone();
            let mut b = battle.clone();
            let mut reports = Vec::new();
            while b.phase == BattlePhase::Active {
                let (nc, nb, r) =
                    take_turn(&c, &b, &catalog, &mut rng, PlayerAction::Attack).unwrap();
                c = nc;
                b = nb;
                reports.push(r);
            }
            (c, b, reports)
        };
        assert_eq!(run(33), run(33));
    }
}
