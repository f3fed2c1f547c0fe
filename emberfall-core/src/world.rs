//! Shared data model: the character record and everything embedded in it.
//!
//! Every engine component takes a `Character` snapshot and returns a new
//! one; nothing mutates a shared record in place across flows. The only
//! component allowed to commit a snapshot is the mutation gateway.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Base stats
// ============================================================================

/// The four allocatable base stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Strength,
    Dexterity,
    Intelligence,
    Vitality,
}

impl StatKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Strength => "strength",
            StatKind::Dexterity => "dexterity",
            StatKind::Intelligence => "intelligence",
            StatKind::Vitality => "vitality",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base stats before equipment bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub vitality: u32,
}

impl BaseStats {
    pub fn new(strength: u32, dexterity: u32, intelligence: u32, vitality: u32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
            vitality,
        }
    }

    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Strength => self.strength,
            StatKind::Dexterity => self.dexterity,
            StatKind::Intelligence => self.intelligence,
            StatKind::Vitality => self.vitality,
        }
    }

    pub fn add(&mut self, stat: StatKind, amount: u32) {
        match stat {
            StatKind::Strength => self.strength += amount,
            StatKind::Dexterity => self.dexterity += amount,
            StatKind::Intelligence => self.intelligence += amount,
            StatKind::Vitality => self.vitality += amount,
        }
    }
}

// ============================================================================
// Equipment and inventory
// ============================================================================

/// Equipment slots. At most one item per slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Accessory,
}

impl EquipSlot {
    pub fn name(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Helmet => "helmet",
            EquipSlot::Boots => "boots",
            EquipSlot::Accessory => "accessory",
        }
    }
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One inventory entry: an item id plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

// ============================================================================
// Quests (active state; definitions live in the catalog)
// ============================================================================

/// Status of a quest the character has accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    InProgress,
    ReadyToComplete,
}

/// A quest in the character's log, with per-objective progress counters.
///
/// `progress` is parallel to the quest definition's objective list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuest {
    pub quest_id: String,
    pub progress: Vec<u32>,
    pub status: QuestStatus,
}

impl ActiveQuest {
    pub fn new(quest_id: impl Into<String>, objective_count: usize) -> Self {
        Self {
            quest_id: quest_id.into(),
            progress: vec![0; objective_count],
            status: QuestStatus::InProgress,
        }
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Playable classes. Each derives starting stats, skills, and kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Rogue,
    Mage,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Mage => "Mage",
        }
    }

    pub fn starting_stats(&self) -> BaseStats {
        match self {
            CharacterClass::Warrior => BaseStats::new(8, 5, 3, 7),
            CharacterClass::Rogue => BaseStats::new(6, 8, 4, 5),
            CharacterClass::Mage => BaseStats::new(3, 4, 9, 4),
        }
    }

    pub fn starting_skills(&self) -> Vec<String> {
        let skills: &[&str] = match self {
            CharacterClass::Warrior => &["power_strike"],
            CharacterClass::Rogue => &["quick_slash"],
            CharacterClass::Mage => &["ember_bolt", "mend_wounds"],
        };
        skills.iter().map(|s| s.to_string()).collect()
    }

    /// Starting weapon, placed directly in the weapon slot.
    pub fn starting_weapon(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "rusty_sword",
            CharacterClass::Rogue => "worn_dagger",
            CharacterClass::Mage => "gnarled_staff",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Character
// ============================================================================

/// Experience required to reach level 2.
pub const BASE_EXP_TO_LEVEL: u64 = 100;

/// The persistent character record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub class: CharacterClass,

    // Progression
    pub level: u32,
    pub experience: u64,
    pub exp_to_next_level: u64,
    pub stat_points: u32,

    // Vitals
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,

    // Wealth and stats
    pub gold: u64,
    pub base_stats: BaseStats,

    // Gear
    pub equipment: BTreeMap<EquipSlot, String>,
    pub inventory: Vec<ItemStack>,

    // Abilities and quests
    pub known_skills: Vec<String>,
    pub active_quests: Vec<ActiveQuest>,
    pub completed_quests: Vec<String>,

    pub location_id: String,
}

impl Character {
    /// Create a level-1 character with the class-derived starting kit.
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        let base_stats = class.starting_stats();
        let max_hp = (base_stats.vitality * 10) as i32;
        let max_mp = (base_stats.intelligence * 5) as i32;

        let mut equipment = BTreeMap::new();
        equipment.insert(EquipSlot::Weapon, class.starting_weapon().to_string());

        Self {
            id: CharacterId::new(),
            name: name.into(),
            class,
            level: 1,
            experience: 0,
            exp_to_next_level: BASE_EXP_TO_LEVEL,
            stat_points: 0,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            gold: 50,
            base_stats,
            equipment,
            inventory: vec![ItemStack::new("minor_healing_potion", 2)],
            known_skills: class.starting_skills(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            location_id: "village_of_emberfall".to_string(),
        }
    }

    /// Recompute max vitals from base stats, clamping current values.
    pub fn recompute_max_vitals(&mut self) {
        self.max_hp = (self.base_stats.vitality * 10) as i32;
        self.max_mp = (self.base_stats.intelligence * 5) as i32;
        self.clamp_vitals();
    }

    /// Clamp hp/mp into `[0, max]`.
    pub fn clamp_vitals(&mut self) {
        self.hp = self.hp.clamp(0, self.max_hp);
        self.mp = self.mp.clamp(0, self.max_mp);
    }

    /// Check the vitals invariant. Assertion helpers use this.
    pub fn vitals_valid(&self) -> bool {
        (0..=self.max_hp).contains(&self.hp) && (0..=self.max_mp).contains(&self.mp)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Add items to the inventory.
    ///
    /// Stackable items increment an existing stack; non-stackable items are
    /// appended as a separate entry per call. Callers decide stackability
    /// from the item's catalog definition.
    pub fn add_item(&mut self, item_id: &str, quantity: u32, stackable: bool) {
        if quantity == 0 {
            return;
        }
        if stackable {
            if let Some(existing) = self.inventory.iter_mut().find(|s| s.item_id == item_id) {
                existing.quantity += quantity;
                return;
            }
        }
        self.inventory.push(ItemStack::new(item_id, quantity));
    }

    /// Remove items from the inventory. Returns false (and leaves the
    /// inventory untouched) when the character does not hold enough.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(idx) = self.inventory.iter().position(|s| s.item_id == item_id) else {
            return false;
        };
        if self.inventory[idx].quantity < quantity {
            return false;
        }
        self.inventory[idx].quantity -= quantity;
        if self.inventory[idx].quantity == 0 {
            self.inventory.remove(idx);
        }
        true
    }

    /// Total quantity held of an item, across stacks.
    pub fn count_of(&self, item_id: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.count_of(item_id) > 0
    }

    pub fn knows_skill(&self, skill_id: &str) -> bool {
        self.known_skills.iter().any(|s| s == skill_id)
    }

    /// Find an accepted quest by id.
    pub fn active_quest(&self, quest_id: &str) -> Option<&ActiveQuest> {
        self.active_quests.iter().find(|q| q.quest_id == quest_id)
    }

    pub fn has_completed_quest(&self, quest_id: &str) -> bool {
        self.completed_quests.iter().any(|q| q == quest_id)
    }
}
