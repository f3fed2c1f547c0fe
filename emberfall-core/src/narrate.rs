//! Narration: turning resolved game facts into prose.
//!
//! The rules core finishes first and its numbers are final; the
//! narrator only retells them. If the model call fails, the plain fact
//! recap stands in so play never blocks on the network.

use crate::battle::{BattleEvent, TurnReport};
use crate::catalog::ConsumableEffect;
use crate::progression::ExpAward;
use crate::quest::QuestCompletion;
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = include_str!("prompts/narrator_base.txt");

/// Turns a fact recap into prose. Implementations must not alter the
/// facts; the caller treats the reply as flavor only.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, facts: &str) -> Result<String, narrator::Error>;
}

/// Narrator backed by the live messages API.
pub struct LiveNarrator {
    client: narrator::Client,
}

impl LiveNarrator {
    pub fn new(client: narrator::Client) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, narrator::Error> {
        Ok(Self::new(narrator::Client::from_env()?))
    }
}

#[async_trait]
impl Narrator for LiveNarrator {
    async fn narrate(&self, facts: &str) -> Result<String, narrator::Error> {
        let request = narrator::Request::prompt(facts)
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(200);
        let response = self.client.complete(request).await?;
        Ok(response.text)
    }
}

/// Narrate, or fall back to the fact recap itself when the narrator
/// fails. Game state was already committed; only the prose degrades.
pub async fn narrate_or_fallback(narrator: &dyn Narrator, facts: &str) -> String {
    match narrator.narrate(facts).await {
        Ok(prose) => prose,
        Err(e) => {
            tracing::warn!(error = %e, "narration failed, using plain recap");
            facts.to_string()
        }
    }
}

// ============================================================================
// Fact rendering
// ============================================================================

/// Render one battle turn as a fact list.
pub fn battle_turn_facts(character_name: &str, monster_name: &str, report: &TurnReport) -> String {
    let mut lines = vec![format!("{character_name} fights a {monster_name}.")];
    for event in &report.events {
        lines.push(match event {
            BattleEvent::PlayerAttack { damage } => {
                format!("{character_name} strikes the {monster_name} for {damage} damage.")
            }
            BattleEvent::SkillDamage { skill_id, damage } => {
                format!(
                    "{character_name} uses {} on the {monster_name} for {damage} damage.",
                    skill_name(skill_id)
                )
            }
            BattleEvent::SkillHeal { skill_id, amount } => {
                format!(
                    "{character_name} uses {} and recovers {amount} health.",
                    skill_name(skill_id)
                )
            }
            BattleEvent::ItemUsed { item_id, effect } => match effect {
                ConsumableEffect::RestoreHp(n) => {
                    format!("{character_name} uses a {} and recovers {n} health.", item_name(item_id))
                }
                ConsumableEffect::RestoreMp(n) => {
                    format!("{character_name} uses a {} and recovers {n} energy.", item_name(item_id))
                }
            },
            BattleEvent::MonsterAttack { damage } => {
                format!("The {monster_name} hits back for {damage} damage.")
            }
            BattleEvent::Victory { exp, gold, drops } => {
                let mut line = format!(
                    "The {monster_name} is slain. {character_name} gains {} experience and {gold} gold.",
                    exp.exp_gained
                );
                if !drops.is_empty() {
                    let listed: Vec<String> = drops
                        .iter()
                        .map(|d| format!("{} x{}", item_name(&d.item_id), d.quantity))
                        .collect();
                    line.push_str(&format!(" Loot: {}.", listed.join(", ")));
                }
                if exp.levels_gained > 0 {
                    line.push_str(&format!(
                        " {character_name} reaches level {}.",
                        exp.new_level
                    ));
                }
                line
            }
            BattleEvent::Defeat { gold_lost } => {
                format!(
                    "{character_name} falls, losing {gold_lost} gold, and barely crawls away alive."
                )
            }
            BattleEvent::Fled => format!("{character_name} flees the {monster_name}."),
        });
    }
    lines.join("\n")
}

/// Render a quest acceptance as a fact list.
pub fn quest_accept_facts(character_name: &str, quest_name: &str, giver: &str) -> String {
    if giver.is_empty() {
        format!("{character_name} takes on the quest \"{quest_name}\".")
    } else {
        format!("{character_name} accepts the quest \"{quest_name}\" from {giver}.")
    }
}

/// Render a quest turn-in as a fact list.
pub fn quest_complete_facts(
    character_name: &str,
    quest_name: &str,
    completion: &QuestCompletion,
    exp: &ExpAward,
) -> String {
    let mut line = format!(
        "{character_name} completes the quest \"{quest_name}\" and receives {} experience and {} gold.",
        completion.exp, completion.gold
    );
    if !completion.items.is_empty() {
        let listed: Vec<String> = completion
            .items
            .iter()
            .map(|d| format!("{} x{}", item_name(&d.item_id), d.quantity))
            .collect();
        line.push_str(&format!(" Rewards: {}.", listed.join(", ")));
    }
    if exp.levels_gained > 0 {
        line.push_str(&format!(" {character_name} reaches level {}.", exp.new_level));
    }
    line
}

// Ids are snake_case; titles read better in prose.
fn skill_name(id: &str) -> String {
    titlecase(id)
}

fn item_name(id: &str) -> String {
    titlecase(id)
}

fn titlecase(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
