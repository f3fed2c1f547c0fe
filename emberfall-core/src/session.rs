//! A play session for one character.
//!
//! The session owns the mutation gateway, the encounter in progress,
//! and the RNG, and drives the fixed loop every action follows: check
//! the rules, commit the resulting snapshot, then narrate. Rules come
//! first and their numbers are final; a narrator failure degrades the
//! prose, never the state.

use crate::battle::{self, Battle, BattlePhase, PlayerAction, TurnReport};
use crate::catalog::Catalog;
use crate::error::{EngineError, Rejection};
use crate::gateway::MutationGateway;
use crate::narrate::{self, Narrator};
use crate::progression::{self, ExpAward};
use crate::quest::{self, QuestCompletion};
use crate::stats;
use crate::store::CharacterStore;
use crate::world::{Character, CharacterClass, CharacterId, StatKind};
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::watch;

/// Session tuning. The default draws RNG state from the OS; tests pass
/// a seed to replay exact outcomes.
#[derive(Default)]
pub struct SessionConfig {
    seed: Option<u64>,
    catalog: Option<Catalog>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

pub struct GameSession {
    catalog: Catalog,
    gateway: MutationGateway,
    narrator: Box<dyn Narrator>,
    rng: StdRng,
    battle: Option<Battle>,
}

impl GameSession {
    /// Open a session around an existing character.
    pub fn new(
        store: Arc<dyn CharacterStore>,
        narrator: Box<dyn Narrator>,
        character: Character,
        config: SessionConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => crate::rolls::seeded(seed),
            None => crate::rolls::from_entropy(),
        };
        Self {
            catalog: config.catalog.unwrap_or_else(Catalog::standard),
            gateway: MutationGateway::new(store, character),
            narrator,
            rng,
            battle: None,
        }
    }

    /// Create a fresh character and open a session around it. The
    /// newborn snapshot is persisted before this returns.
    pub async fn create(
        store: Arc<dyn CharacterStore>,
        narrator: Box<dyn Narrator>,
        name: impl Into<String>,
        class: CharacterClass,
        config: SessionConfig,
    ) -> Self {
        let character = Character::new(name, class);
        let session = Self::new(store, narrator, character, config);
        session.gateway.commit(session.gateway.snapshot()).await;
        session
    }

    /// Open a session around a character loaded from the store.
    pub async fn load(
        store: Arc<dyn CharacterStore>,
        narrator: Box<dyn Narrator>,
        id: CharacterId,
        config: SessionConfig,
    ) -> Result<Self, EngineError> {
        let character = store.load(id).await?;
        Ok(Self::new(store, narrator, character, config))
    }

    /// The character's current state of record.
    pub fn character(&self) -> Character {
        self.gateway.snapshot()
    }

    /// Watch committed character snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Character> {
        self.gateway.subscribe()
    }

    /// The encounter in progress, if any.
    pub fn current_battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Begin an encounter. Rejected while another one is underway.
    pub async fn start_battle(&mut self, monster_id: &str) -> Result<String, EngineError> {
        if self.battle.is_some() {
            return Err(Rejection::BattleInProgress.into());
        }
        let character = self.gateway.snapshot();
        let battle = battle::start_battle(&character, &self.catalog, monster_id)?;
        let monster = self
            .catalog
            .monster(monster_id)
            .ok_or_else(|| Rejection::UnknownMonster(monster_id.to_string()))?;

        let facts = if monster.description.is_empty() {
            format!("{} encounters a {}.", character.name, monster.name)
        } else {
            format!(
                "{} encounters a {}. {}",
                character.name, monster.name, monster.description
            )
        };
        self.battle = Some(battle);
        Ok(narrate::narrate_or_fallback(self.narrator.as_ref(), &facts).await)
    }

    /// Resolve one battle turn. On a terminal phase the encounter is
    /// closed and the committed character already carries the outcome.
    pub async fn battle_action(
        &mut self,
        action: PlayerAction,
    ) -> Result<(TurnReport, String), EngineError> {
        let battle = self.battle.as_ref().ok_or(Rejection::NoActiveBattle)?;
        let character = self.gateway.snapshot();
        let monster_name = self
            .catalog
            .monster(&battle.monster_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| battle.monster_id.clone());

        let (next, state, report) =
            battle::take_turn(&character, battle, &self.catalog, &mut self.rng, action)?;
        self.gateway.commit(next).await;
        if state.phase == BattlePhase::Active {
            self.battle = Some(state);
        } else {
            self.battle = None;
        }

        let facts = narrate::battle_turn_facts(&self.character().name, &monster_name, &report);
        let prose = narrate::narrate_or_fallback(self.narrator.as_ref(), &facts).await;
        Ok((report, prose))
    }

    /// Run from the current encounter.
    pub async fn flee(&mut self) -> Result<(TurnReport, String), EngineError> {
        self.battle_action(PlayerAction::Flee).await
    }

    // ========================================================================
    // Quests
    // ========================================================================

    pub async fn accept_quest(&mut self, quest_id: &str) -> Result<String, EngineError> {
        let character = self.gateway.snapshot();
        let next = quest::accept_quest(&character, &self.catalog, quest_id)?;
        self.gateway.commit(next).await;

        // Lookup cannot fail past acceptance.
        let (name, giver) = self
            .catalog
            .quest(quest_id)
            .map(|q| (q.name.clone(), q.giver.clone()))
            .unwrap_or_default();
        let facts = narrate::quest_accept_facts(&character.name, &name, &giver);
        Ok(narrate::narrate_or_fallback(self.narrator.as_ref(), &facts).await)
    }

    pub async fn complete_quest(
        &mut self,
        quest_id: &str,
    ) -> Result<(QuestCompletion, ExpAward, String), EngineError> {
        let character = self.gateway.snapshot();
        let (turned_in, completion) = quest::complete_quest(&character, &self.catalog, quest_id)?;
        let (next, exp) = progression::award_exp(&turned_in, completion.exp);
        self.gateway.commit(next).await;

        let name = self
            .catalog
            .quest(quest_id)
            .map(|q| q.name.clone())
            .unwrap_or_default();
        let facts = narrate::quest_complete_facts(&character.name, &name, &completion, &exp);
        let prose = narrate::narrate_or_fallback(self.narrator.as_ref(), &facts).await;
        Ok((completion, exp, prose))
    }

    // ========================================================================
    // Inventory and stats
    // ========================================================================

    /// Use a consumable outside of combat. During an encounter item use
    /// goes through `battle_action` and costs the turn.
    pub async fn use_item(&mut self, item_id: &str) -> Result<String, EngineError> {
        if self.battle.is_some() {
            return Err(Rejection::BattleInProgress.into());
        }
        let character = self.gateway.snapshot();
        let (next, effect) = battle::consume_item(&character, &self.catalog, item_id)?;
        self.gateway.commit(next).await;

        let item_name = self
            .catalog
            .item(item_id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| item_id.to_string());
        let facts = match effect {
            crate::catalog::ConsumableEffect::RestoreHp(n) => {
                format!("{} drinks a {item_name} and recovers {n} health.", character.name)
            }
            crate::catalog::ConsumableEffect::RestoreMp(n) => {
                format!("{} drinks a {item_name} and recovers {n} energy.", character.name)
            }
        };
        Ok(narrate::narrate_or_fallback(self.narrator.as_ref(), &facts).await)
    }

    pub async fn equip_item(&mut self, item_id: &str) -> Result<String, EngineError> {
        let character = self.gateway.snapshot();
        let next = stats::equip_item(&character, &self.catalog, item_id)?;
        self.gateway.commit(next).await;

        let item_name = self
            .catalog
            .item(item_id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| item_id.to_string());
        let facts = format!("{} equips the {item_name}.", character.name);
        Ok(narrate::narrate_or_fallback(self.narrator.as_ref(), &facts).await)
    }

    /// Spend banked stat points. Returns the committed snapshot.
    pub async fn allocate_stat_points(
        &mut self,
        allocations: &[(StatKind, u32)],
    ) -> Result<Character, EngineError> {
        let character = self.gateway.snapshot();
        let next = progression::allocate_stat_points(&character, allocations)?;
        self.gateway.commit(next).await;
        Ok(self.gateway.snapshot())
    }
}
