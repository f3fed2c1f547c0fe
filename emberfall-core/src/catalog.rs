//! Read-only catalog data: monsters, items, skills, and quests keyed by id.
//!
//! Definitions are immutable at play time. The engine treats a missing id
//! as "skip" in aggregation contexts (e.g. a stale equipment reference)
//! and as a rejection in direct-invocation contexts (e.g. casting an
//! unknown skill), so lookups here only ever return `Option`.

use crate::world::{CharacterClass, EquipSlot, ItemStack};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Items
// ============================================================================

/// Additive combat-stat bonuses granted by a piece of equipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonuses {
    pub attack: u32,
    pub defense: u32,
    pub magic_power: u32,
}

/// Effect of a consumable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    RestoreHp(i32),
    RestoreMp(i32),
}

/// Material sub-types, used by gathering and recipes.
///
/// These are explicit tags, not substrings of the item id: loot and
/// gathering logic dispatch on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    Ore,
    Fish,
    Herb,
    Ingredient,
}

/// What kind of item this is, with kind-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Equipment {
        slot: EquipSlot,
        bonuses: StatBonuses,
    },
    Consumable {
        effect: ConsumableEffect,
    },
    Material {
        kind: MaterialKind,
    },
}

/// An item definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
}

impl ItemDef {
    pub fn equipment(id: impl Into<String>, name: impl Into<String>, slot: EquipSlot) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Equipment {
                slot,
                bonuses: StatBonuses::default(),
            },
        }
    }

    pub fn consumable(
        id: impl Into<String>,
        name: impl Into<String>,
        effect: ConsumableEffect,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Consumable { effect },
        }
    }

    pub fn material(id: impl Into<String>, name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Material { kind },
        }
    }

    pub fn with_attack(mut self, attack: u32) -> Self {
        if let ItemKind::Equipment { bonuses, .. } = &mut self.kind {
            bonuses.attack = attack;
        }
        self
    }

    pub fn with_defense(mut self, defense: u32) -> Self {
        if let ItemKind::Equipment { bonuses, .. } = &mut self.kind {
            bonuses.defense = defense;
        }
        self
    }

    pub fn with_magic_power(mut self, magic_power: u32) -> Self {
        if let ItemKind::Equipment { bonuses, .. } = &mut self.kind {
            bonuses.magic_power = magic_power;
        }
        self
    }

    /// Equipment never stacks; consumables and materials do.
    pub fn is_stackable(&self) -> bool {
        !matches!(self.kind, ItemKind::Equipment { .. })
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Damage delivery of a skill: physical adds attack, elemental adds
/// magic power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    Physical,
    Elemental,
}

/// What the skill does when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillEffect {
    Damage { min: u32, max: u32 },
    Heal { min: u32, max: u32 },
}

/// A skill definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    pub effect: SkillEffect,
    pub mp_cost: i32,
    pub cooldown_turns: u32,
    pub required_level: u32,
    pub class_restriction: Option<CharacterClass>,
}

impl SkillDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: SkillKind,
        effect: SkillEffect,
        mp_cost: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            effect,
            mp_cost,
            cooldown_turns: 0,
            required_level: 1,
            class_restriction: None,
        }
    }

    pub fn with_cooldown(mut self, turns: u32) -> Self {
        self.cooldown_turns = turns;
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }

    pub fn restricted_to(mut self, class: CharacterClass) -> Self {
        self.class_restriction = Some(class);
        self
    }
}

// ============================================================================
// Monsters
// ============================================================================

/// One possible drop: independent chance, quantity range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub item_id: String,
    pub chance: f64,
    pub min_quantity: u32,
    pub max_quantity: u32,
}

impl DropEntry {
    pub fn new(item_id: impl Into<String>, chance: f64, min_quantity: u32, max_quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            chance,
            min_quantity,
            max_quantity,
        }
    }
}

/// A monster definition. Battle instances copy `max_hp` into a
/// per-encounter current HP and never mutate the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDef {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub max_hp: i32,
    pub attack: u32,
    pub defense: u32,
    pub exp_reward: u64,
    pub drop_table: Vec<DropEntry>,
    pub description: String,
}

impl MonsterDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u32,
        max_hp: i32,
        attack: u32,
        defense: u32,
        exp_reward: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            max_hp,
            attack,
            defense,
            exp_reward,
            drop_table: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_drop(mut self, entry: DropEntry) -> Self {
        self.drop_table.push(entry);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// ============================================================================
// Quests
// ============================================================================

/// The two measurable objective kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    Kill,
    Collect,
}

/// One quest objective: kill or collect `count` of `target_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDef {
    pub kind: ObjectiveKind,
    pub target_id: String,
    pub count: u32,
}

impl ObjectiveDef {
    pub fn kill(target_id: impl Into<String>, count: u32) -> Self {
        Self {
            kind: ObjectiveKind::Kill,
            target_id: target_id.into(),
            count,
        }
    }

    pub fn collect(target_id: impl Into<String>, count: u32) -> Self {
        Self {
            kind: ObjectiveKind::Collect,
            target_id: target_id.into(),
            count,
        }
    }
}

/// Quest completion rewards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBundle {
    pub exp: u64,
    pub gold: u64,
    pub items: Vec<ItemStack>,
}

/// A quest definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub objectives: Vec<ObjectiveDef>,
    pub reward: RewardBundle,
    pub giver: String,
    pub required_level: u32,
}

impl QuestDef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            objectives: Vec::new(),
            reward: RewardBundle::default(),
            giver: String::new(),
            required_level: 1,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveDef) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn with_reward(mut self, reward: RewardBundle) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_giver(mut self, giver: impl Into<String>) -> Self {
        self.giver = giver.into();
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// All read-only game data, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    monsters: HashMap<String, MonsterDef>,
    items: HashMap<String, ItemDef>,
    skills: HashMap<String, SkillDef>,
    quests: HashMap<String, QuestDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in content set.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn add_monster(&mut self, monster: MonsterDef) -> &mut Self {
        self.monsters.insert(monster.id.clone(), monster);
        self
    }

    pub fn add_item(&mut self, item: ItemDef) -> &mut Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn add_skill(&mut self, skill: SkillDef) -> &mut Self {
        self.skills.insert(skill.id.clone(), skill);
        self
    }

    pub fn add_quest(&mut self, quest: QuestDef) -> &mut Self {
        self.quests.insert(quest.id.clone(), quest);
        self
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterDef> {
        self.monsters.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skills.get(id)
    }

    pub fn quest(&self, id: &str) -> Option<&QuestDef> {
        self.quests.get(id)
    }

    /// Stackability of an item id; unknown ids default to stackable.
    pub fn is_stackable(&self, item_id: &str) -> bool {
        self.item(item_id).map(|i| i.is_stackable()).unwrap_or(true)
    }
}

lazy_static::lazy_static! {
    static ref STANDARD: Catalog = {
        let mut c = Catalog::new();

        // Weapons
        c.add_item(
            ItemDef::equipment("rusty_sword", "Rusty Sword", EquipSlot::Weapon)
                .with_attack(2)
        );
        c.add_item(
            ItemDef::equipment("worn_dagger", "Worn Dagger", EquipSlot::Weapon)
                .with_attack(1)
        );
        c.add_item(
            ItemDef::equipment("gnarled_staff", "Gnarled Staff", EquipSlot::Weapon)
                .with_magic_power(2)
        );
        c.add_item(
            ItemDef::equipment("iron_sword", "Iron Sword", EquipSlot::Weapon)
                .with_attack(5)
        );

        // Armor and trinkets
        c.add_item(
            ItemDef::equipment("leather_jerkin", "Leather Jerkin", EquipSlot::Armor)
                .with_defense(3)
        );
        c.add_item(
            ItemDef::equipment("iron_helm", "Iron Helm", EquipSlot::Helmet)
                .with_defense(2)
        );
        c.add_item(
            ItemDef::equipment("traveler_boots", "Traveler's Boots", EquipSlot::Boots)
                .with_defense(1)
        );
        c.add_item(
            ItemDef::equipment("ember_pendant", "Ember Pendant", EquipSlot::Accessory)
                .with_magic_power(3)
        );

        // Consumables
        c.add_item(
            ItemDef::consumable(
                "minor_healing_potion",
                "Minor Healing Potion",
                ConsumableEffect::RestoreHp(25),
            )
        );
        c.add_item(
            ItemDef::consumable(
                "minor_mana_potion",
                "Minor Mana Potion",
                ConsumableEffect::RestoreMp(15),
            )
        );

        // Materials
        c.add_item(ItemDef::material("wolf_pelt", "Wolf Pelt", MaterialKind::Ingredient));
        c.add_item(ItemDef::material("wolf_fang", "Wolf Fang", MaterialKind::Ingredient));
        c.add_item(ItemDef::material("goblin_ear", "Goblin Ear", MaterialKind::Ingredient));
        c.add_item(ItemDef::material("slime_gel", "Slime Gel", MaterialKind::Ingredient));
        c.add_item(ItemDef::material("copper_ore", "Copper Ore", MaterialKind::Ore));
        c.add_item(ItemDef::material("river_trout", "River Trout", MaterialKind::Fish));
        c.add_item(ItemDef::material("moonleaf", "Moonleaf", MaterialKind::Herb));

        // Skills
        c.add_skill(
            SkillDef::new(
                "power_strike",
                "Power Strike",
                SkillKind::Physical,
                SkillEffect::Damage { min: 6, max: 10 },
                5,
            ),
        );
        c.add_skill(
            SkillDef::new(
                "quick_slash",
                "Quick Slash",
                SkillKind::Physical,
                SkillEffect::Damage { min: 4, max: 8 },
                3,
            ),
        );
        c.add_skill(
            SkillDef::new(
                "ember_bolt",
                "Ember Bolt",
                SkillKind::Elemental,
                SkillEffect::Damage { min: 5, max: 9 },
                4,
            ),
        );
        c.add_skill(
            SkillDef::new(
                "mend_wounds",
                "Mend Wounds",
                SkillKind::Elemental,
                SkillEffect::Heal { min: 6, max: 10 },
                5,
            ),
        );
        c.add_skill(
            SkillDef::new(
                "crushing_blow",
                "Crushing Blow",
                SkillKind::Physical,
                SkillEffect::Damage { min: 12, max: 18 },
                10,
            )
            .with_cooldown(2)
            .with_required_level(3)
            .restricted_to(CharacterClass::Warrior),
        );

        // Monsters
        c.add_monster(
            MonsterDef::new("wolf_pup", "Wolf Pup", 1, 20, 4, 1, 25)
                .with_drop(DropEntry::new("wolf_pelt", 0.6, 1, 2))
                .with_drop(DropEntry::new("wolf_fang", 0.25, 1, 1))
                .with_description("A scrawny young wolf, bolder than it is strong."),
        );
        c.add_monster(
            MonsterDef::new("forest_goblin", "Forest Goblin", 2, 35, 7, 2, 40)
                .with_drop(DropEntry::new("goblin_ear", 0.8, 1, 1))
                .with_drop(DropEntry::new("minor_healing_potion", 0.15, 1, 1))
                .with_description("A wiry goblin scout clutching a crude spear."),
        );
        c.add_monster(
            MonsterDef::new("bog_slime", "Bog Slime", 2, 30, 5, 4, 35)
                .with_drop(DropEntry::new("slime_gel", 0.9, 1, 3))
                .with_description("A quivering mound of acrid jelly."),
        );
        c.add_monster(
            MonsterDef::new("ridge_bear", "Ridge Bear", 4, 80, 12, 5, 110)
                .with_drop(DropEntry::new("wolf_pelt", 0.4, 1, 2))
                .with_drop(DropEntry::new("iron_sword", 0.05, 1, 1))
                .with_description("A hulking bear that prowls the high passes."),
        );

        // Quests
        c.add_quest(
            QuestDef::new("wolf_cull", "Thinning the Pack")
                .with_description("Wolf pups are harrying the village flocks. Cull ten of them.")
                .with_objective(ObjectiveDef::kill("wolf_pup", 10))
                .with_reward(RewardBundle {
                    exp: 120,
                    gold: 75,
                    items: vec![ItemStack::new("minor_healing_potion", 2)],
                })
                .with_giver("Shepherd Aldric"),
        );
        c.add_quest(
            QuestDef::new("pelts_for_the_tanner", "Pelts for the Tanner")
                .with_description("The tanner will pay well for five clean wolf pelts.")
                .with_objective(ObjectiveDef::collect("wolf_pelt", 5))
                .with_reward(RewardBundle {
                    exp: 60,
                    gold: 50,
                    items: vec![ItemStack::new("leather_jerkin", 1)],
                })
                .with_giver("Tanner Maude"),
        );
        c.add_quest(
            QuestDef::new("goblin_trouble", "Goblin Trouble")
                .with_description("Goblin scouts have been spotted near the mill. Drive them off and bring proof.")
                .with_objective(ObjectiveDef::kill("forest_goblin", 5))
                .with_objective(ObjectiveDef::collect("goblin_ear", 3))
                .with_reward(RewardBundle {
                    exp: 200,
                    gold: 120,
                    items: vec![ItemStack::new("iron_helm", 1)],
                })
                .with_giver("Miller Jorun")
                .with_required_level(2),
        );

        c
    };
}
