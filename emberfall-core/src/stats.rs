//! Effective combat stats: base-stat derivations plus additive
//! equipment bonuses. Pure functions over a character snapshot and the
//! catalog; nothing here mutates anything.

use crate::catalog::{Catalog, ItemKind};
use crate::error::Rejection;
use crate::world::Character;
use serde::{Deserialize, Serialize};

/// The derived numbers combat actually uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveStats {
    pub attack: u32,
    pub defense: u32,
    pub magic_power: u32,
}

/// Compute a character's effective stats.
///
/// Base derivations use integer division: attack = strength / 2,
/// defense = vitality / 3, magic power = intelligence / 2. Every
/// equipped item's bonuses are added on top. An equipped id missing
/// from the catalog contributes nothing rather than failing the whole
/// aggregation.
pub fn effective_stats(character: &Character, catalog: &Catalog) -> EffectiveStats {
    let base = &character.base_stats;
    let mut stats = EffectiveStats {
        attack: base.strength / 2,
        defense: base.vitality / 3,
        magic_power: base.intelligence / 2,
    };

    for item_id in character.equipment.values() {
        let Some(item) = catalog.item(item_id) else {
            continue;
        };
        if let ItemKind::Equipment { bonuses, .. } = &item.kind {
            stats.attack += bonuses.attack;
            stats.defense += bonuses.defense;
            stats.magic_power += bonuses.magic_power;
        }
    }

    stats
}

/// Equip a piece of gear from the inventory. Whatever occupied the
/// slot goes back into the inventory, so gear is never lost by
/// swapping.
pub fn equip_item(
    character: &Character,
    catalog: &Catalog,
    item_id: &str,
) -> Result<Character, Rejection> {
    let item = catalog
        .item(item_id)
        .ok_or_else(|| Rejection::UnknownItem(item_id.to_string()))?;
    let ItemKind::Equipment { slot, .. } = &item.kind else {
        return Err(Rejection::ItemNotUsable(item_id.to_string()));
    };
    if !character.has_item(item_id) {
        return Err(Rejection::ItemNotOwned(item_id.to_string()));
    }

    let mut next = character.clone();
    next.remove_item(item_id, 1);
    if let Some(previous) = next.equipment.insert(*slot, item_id.to_string()) {
        let stackable = catalog.is_stackable(&previous);
        next.add_item(&previous, 1, stackable);
    }
    Ok(next)
}
