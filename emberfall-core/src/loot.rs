//! Loot resolution for a defeated monster: each drop table entry rolls
//! independently, and gold scales with the monster's level.

use crate::catalog::MonsterDef;
use crate::rolls;
use crate::world::ItemStack;
use rand::Rng;

/// Roll the monster's drop table. Every entry gets its own chance
/// check; entries that pass roll a quantity in their range. Order
/// follows the table so a seeded generator replays the same haul.
pub fn resolve_drops<R: Rng>(rng: &mut R, monster: &MonsterDef) -> Vec<ItemStack> {
    let mut drops = Vec::new();
    for entry in &monster.drop_table {
        if !rolls::check(rng, entry.chance) {
            continue;
        }
        let quantity = rolls::uniform(rng, entry.min_quantity, entry.max_quantity);
        if quantity > 0 {
            drops.push(ItemStack::new(entry.item_id.clone(), quantity));
        }
    }
    drops
}

/// Gold for a kill: a flat `level * 5` plus a roll in `0..level * 10`.
pub fn resolve_gold<R: Rng>(rng: &mut R, monster: &MonsterDef) -> u64 {
    let level = monster.level as u64;
    let variable = if level == 0 {
        0
    } else {
        rolls::uniform(rng, 0, (level * 10 - 1) as u32) as u64
    };
    level * 5 + variable
}
