//! Quest acceptance, objective progress, and completion.
//!
//! Progress is event-driven and monotonic: kills and item acquisitions
//! increment their matching counters, capped at the objective's
//! requirement, and a quest that reaches `ReadyToComplete` stays there.
//! What the character later does with the items does not rewind a
//! counter, and turn-in grants the reward bundle without taking
//! anything back.

use crate::catalog::{Catalog, ObjectiveKind, QuestDef};
use crate::error::Rejection;
use crate::world::{ActiveQuest, Character, ItemStack, QuestStatus};
use serde::{Deserialize, Serialize};

/// What completing a quest granted. Experience is reported rather than
/// applied so the caller can route it through the level-up path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestCompletion {
    pub quest_id: String,
    pub exp: u64,
    pub gold: u64,
    pub items: Vec<ItemStack>,
}

/// Take on a quest. Rejected if the quest is unknown, already active,
/// already completed, or gated above the character's level.
pub fn accept_quest(
    character: &Character,
    catalog: &Catalog,
    quest_id: &str,
) -> Result<Character, Rejection> {
    let def = catalog
        .quest(quest_id)
        .ok_or_else(|| Rejection::UnknownQuest(quest_id.to_string()))?;
    if character.active_quest(quest_id).is_some() {
        return Err(Rejection::QuestAlreadyActive(quest_id.to_string()));
    }
    if character.has_completed_quest(quest_id) {
        return Err(Rejection::QuestAlreadyCompleted(quest_id.to_string()));
    }
    if character.level < def.required_level {
        return Err(Rejection::LevelTooLow {
            required: def.required_level,
            current: character.level,
        });
    }

    let mut next = character.clone();
    let mut active = ActiveQuest::new(quest_id, def.objectives.len());
    promote_if_met(&mut active, def);
    next.active_quests.push(active);
    Ok(next)
}

/// Credit a kill to every active quest hunting this monster. Quests
/// already ready to turn in are left alone.
pub fn record_kill(character: &Character, catalog: &Catalog, monster_id: &str) -> Character {
    let mut next = character.clone();
    for active in &mut next.active_quests {
        if active.status == QuestStatus::ReadyToComplete {
            continue;
        }
        let Some(def) = catalog.quest(&active.quest_id) else {
            continue;
        };
        for (i, objective) in def.objectives.iter().enumerate() {
            if objective.kind == ObjectiveKind::Kill && objective.target_id == monster_id {
                let slot = &mut active.progress[i];
                *slot = (*slot + 1).min(objective.count);
            }
        }
        promote_if_met(active, def);
    }
    next
}

/// Credit newly obtained items to every active quest collecting them.
/// Counters only ever grow, capped at each objective's requirement.
pub fn record_items_acquired(
    character: &Character,
    catalog: &Catalog,
    acquired: &[ItemStack],
) -> Character {
    let mut next = character.clone();
    for active in &mut next.active_quests {
        let Some(def) = catalog.quest(&active.quest_id) else {
            continue;
        };
        for (i, objective) in def.objectives.iter().enumerate() {
            if objective.kind != ObjectiveKind::Collect {
                continue;
            }
            let gained: u32 = acquired
                .iter()
                .filter(|stack| stack.item_id == objective.target_id)
                .map(|stack| stack.quantity)
                .sum();
            if gained > 0 {
                let slot = &mut active.progress[i];
                *slot = (*slot + gained).min(objective.count);
            }
        }
        promote_if_met(active, def);
    }
    next
}

// Promotion is one-way: a ready quest never falls back to in-progress.
fn promote_if_met(active: &mut ActiveQuest, def: &QuestDef) {
    if objectives_met(def, &active.progress) {
        active.status = QuestStatus::ReadyToComplete;
    }
}

fn objectives_met(def: &QuestDef, progress: &[u32]) -> bool {
    def.objectives
        .iter()
        .zip(progress)
        .all(|(objective, done)| *done >= objective.count)
}

/// Turn in a quest. Requires every objective met. The reward bundle's
/// gold and items are applied here, experience is returned for the
/// caller to award; collected items stay with the character.
pub fn complete_quest(
    character: &Character,
    catalog: &Catalog,
    quest_id: &str,
) -> Result<(Character, QuestCompletion), Rejection> {
    let def = catalog
        .quest(quest_id)
        .ok_or_else(|| Rejection::UnknownQuest(quest_id.to_string()))?;
    let active = character
        .active_quest(quest_id)
        .ok_or_else(|| Rejection::QuestNotActive(quest_id.to_string()))?;
    if active.status != QuestStatus::ReadyToComplete {
        return Err(Rejection::QuestNotReady(quest_id.to_string()));
    }

    let mut next = character.clone();
    next.active_quests.retain(|q| q.quest_id != quest_id);
    next.completed_quests.push(quest_id.to_string());
    next.gold += def.reward.gold;
    for stack in &def.reward.items {
        let stackable = catalog.is_stackable(&stack.item_id);
        next.add_item(&stack.item_id, stack.quantity, stackable);
    }

    tracing::info!(character = %next.name, quest = quest_id, "quest completed");

    let completion = QuestCompletion {
        quest_id: quest_id.to_string(),
        exp: def.reward.exp,
        gold: def.reward.gold,
        items: def.reward.items.clone(),
    };
    Ok((next, completion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::CharacterClass;

    fn hero() -> Character {
        Character::new("Brannik", CharacterClass::Warrior)
    }

    #[test]
    fn test_accept_and_reject_paths() {
        let catalog = Catalog::standard();
        let base = hero();

        let with_quest = accept_quest(&base, &catalog, "wolf_cull").unwrap();
        assert!(with_quest.active_quest("wolf_cull").is_some());

        assert_eq!(
            accept_quest(&with_quest, &catalog, "wolf_cull").unwrap_err(),
            Rejection::QuestAlreadyActive("wolf_cull".into())
        );
        assert_eq!(
            accept_quest(&base, &catalog, "dragon_hunt").unwrap_err(),
            Rejection::UnknownQuest("dragon_hunt".into())
        );
        assert_eq!(
            accept_quest(&base, &catalog, "goblin_trouble").unwrap_err(),
            Rejection::LevelTooLow {
                required: 2,
                current: 1
            }
        );
    }

    #[test]
    fn test_kill_progress_caps_and_readies() {
        let catalog = Catalog::standard();
        let mut c = accept_quest(&hero(), &catalog, "wolf_cull").unwrap();
        for _ in 0..12 {
            c = record_kill(&c, &catalog, "wolf_pup");
        }
        let active = c.active_quest("wolf_cull").unwrap();
        assert_eq!(active.progress, vec![10]);
        assert_eq!(active.status, QuestStatus::ReadyToComplete);
    }

    #[test]
    fn test_unrelated_kill_does_not_progress() {
        let catalog = Catalog::standard();
        let c = accept_quest(&hero(), &catalog, "wolf_cull").unwrap();
        let c = record_kill(&c, &catalog, "bog_slime");
        assert_eq!(c.active_quest("wolf_cull").unwrap().progress, vec![0]);
    }

    #[test]
    fn test_collect_progress_counts_acquisitions_only() {
        let catalog = Catalog::standard();
        let pelts = |n| vec![ItemStack::new("wolf_pelt", n)];

        // Pelts owned before accepting do not count.
        let mut base = hero();
        base.add_item("wolf_pelt", 5, true);
        let c = accept_quest(&base, &catalog, "pelts_for_the_tanner").unwrap();
        assert_eq!(c.active_quest("pelts_for_the_tanner").unwrap().progress, vec![0]);

        let c = record_items_acquired(&c, &catalog, &pelts(3));
        assert_eq!(c.active_quest("pelts_for_the_tanner").unwrap().progress, vec![3]);

        // Capped at the requirement, and ready once met.
        let mut c = record_items_acquired(&c, &catalog, &pelts(4));
        let active = c.active_quest("pelts_for_the_tanner").unwrap();
        assert_eq!(active.progress, vec![5]);
        assert_eq!(active.status, QuestStatus::ReadyToComplete);

        // Losing every pelt neither rewinds the counter nor the status.
        let owned = c.count_of("wolf_pelt");
        assert!(c.remove_item("wolf_pelt", owned));
        let active = c.active_quest("pelts_for_the_tanner").unwrap();
        assert_eq!(active.progress, vec![5]);
        assert_eq!(active.status, QuestStatus::ReadyToComplete);
    }

    #[test]
    fn test_complete_requires_ready() {
        let catalog = Catalog::standard();
        let c = accept_quest(&hero(), &catalog, "wolf_cull").unwrap();
        assert_eq!(
            complete_quest(&c, &catalog, "wolf_cull").unwrap_err(),
            Rejection::QuestNotReady("wolf_cull".into())
        );
        assert_eq!(
            complete_quest(&c, &catalog, "pelts_for_the_tanner").unwrap_err(),
            Rejection::QuestNotActive("pelts_for_the_tanner".into())
        );
    }

    #[test]
    fn test_complete_rewards_and_keeps_items() {
        let catalog = Catalog::standard();
        let mut c = accept_quest(&hero(), &catalog, "pelts_for_the_tanner").unwrap();
        c.add_item("wolf_pelt", 6, true);
        let c = record_items_acquired(&c, &catalog, &[ItemStack::new("wolf_pelt", 6)]);

        let gold_before = c.gold;
        let (done, completion) = complete_quest(&c, &catalog, "pelts_for_the_tanner").unwrap();
        assert_eq!(done.count_of("wolf_pelt"), 6);
        assert_eq!(done.gold, gold_before + 50);
        assert!(done.has_item("leather_jerkin"));
        assert!(done.has_completed_quest("pelts_for_the_tanner"));
        assert!(done.active_quest("pelts_for_the_tanner").is_none());
        assert_eq!(completion.exp, 60);

        // A completed quest cannot be taken again.
        assert_eq!(
            accept_quest(&done, &catalog, "pelts_for_the_tanner").unwrap_err(),
            Rejection::QuestAlreadyCompleted("pelts_for_the_tanner".into())
        );
    }
}
