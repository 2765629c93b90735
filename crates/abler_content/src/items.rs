//! The item catalogue.

use abler_core::math::Fixed;
use abler_core::prelude::{Item, Stat};
use abler_core::rng::CombatRng;

use crate::error::{ContentError, Result};

/// Catalogue keys, in shop order.
const ITEM_KEYS: [&str; 10] = [
    "sword", "staff", "armor", "cloak", "boots", "ring", "amulet", "axe", "orb", "shield",
];

/// Every item key.
#[must_use]
pub fn all_items() -> &'static [&'static str] {
    &ITEM_KEYS
}

/// Build an item by key, ignoring case.
///
/// # Errors
///
/// [`ContentError::UnknownItem`] if the key is not in the catalogue.
pub fn create_item(name: &str) -> Result<Item> {
    let bonus = |n: i32| Fixed::from_num(n);
    let item = match name.trim().to_lowercase().as_str() {
        "sword" => Item::new("Sword", "+10 Attack Damage", 30).with_stat(Stat::AttackDamage, bonus(10)),
        "staff" => Item::new("Staff", "+15 Intelligence", 30).with_stat(Stat::Intelligence, bonus(15)),
        "armor" => Item::new("Armor", "+15 Armor", 30).with_stat(Stat::Armor, bonus(15)),
        "cloak" => Item::new("Cloak", "+15 Magic Resist", 30).with_stat(Stat::MagicResist, bonus(15)),
        "boots" => Item::new("Boots", "+20% Attack Speed", 25).with_stat(Stat::AttackSpeed, bonus(20)),
        "ring" => Item::new("Ring", "+2 Mana Regen", 35).with_stat(Stat::ManaRegen, bonus(2)),
        "amulet" => Item::new("Amulet", "+30 Max HP, +2 HP Regen", 35)
            .with_stat(Stat::MaxHp, bonus(30))
            .with_stat(Stat::HpRegen, bonus(2)),
        "axe" => Item::new("Axe", "+15 Strength", 30).with_stat(Stat::Strength, bonus(15)),
        "orb" => Item::new("Orb", "+10 Intelligence", 40).with_stat(Stat::Intelligence, bonus(10)),
        "shield" => Item::new("Shield", "+10 Armor, +10 MR", 45)
            .with_stat(Stat::Armor, bonus(10))
            .with_stat(Stat::MagicResist, bonus(10)),
        _ => return Err(ContentError::UnknownItem(name.to_string())),
    };
    Ok(item)
}

/// Draw `count` distinct items for a shop.
#[must_use]
pub fn item_shop(rng: &mut CombatRng, count: usize) -> Vec<Item> {
    let mut pool: Vec<&str> = ITEM_KEYS.to_vec();
    let mut shop = Vec::with_capacity(count.min(pool.len()));
    while shop.len() < count && !pool.is_empty() {
        let key = pool.swap_remove(rng.next_below(pool.len()));
        if let Ok(item) = create_item(key) {
            shop.push(item);
        }
    }
    shop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_builds() {
        for key in all_items() {
            assert!(create_item(key).is_ok(), "{key}");
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        let item = create_item("SHIELD").unwrap();
        assert_eq!(item.name, "Shield");
        assert_eq!(item.cost, 45);
        assert_eq!(item.bonus(Stat::Armor), Fixed::from_num(10));
        assert_eq!(item.bonus(Stat::MagicResist), Fixed::from_num(10));
    }

    #[test]
    fn test_unknown_item() {
        assert_eq!(
            create_item("wand").unwrap_err(),
            ContentError::UnknownItem("wand".to_string())
        );
    }

    #[test]
    fn test_shop_is_distinct_and_seeded() {
        let first = item_shop(&mut CombatRng::new(9), 5);
        let second = item_shop(&mut CombatRng::new(9), 5);
        let names: Vec<_> = first.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, second.iter().map(|i| i.name.clone()).collect::<Vec<_>>());

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);

        assert_eq!(item_shop(&mut CombatRng::new(1), 50).len(), 10);
    }
}
