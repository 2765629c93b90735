//! Equipment: permanent stat bonuses with an optional event reaction.

use crate::math::Fixed;
use crate::skill::Reaction;
use crate::stats::{Stat, StatDelta};

/// Most items a single unit may carry.
pub const MAX_ITEMS: usize = 3;

/// An equippable item.
#[derive(Debug, Clone)]
pub struct Item {
    /// Display name.
    pub name: String,
    /// Short tooltip text.
    pub description: String,
    /// Shop price in gold.
    pub cost: u32,
    /// Stat changes while equipped.
    pub stats: Vec<StatDelta>,
    /// Event reaction while equipped.
    pub reaction: Option<Reaction>,
}

impl Item {
    /// An item with no bonuses yet.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, cost: u32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cost,
            stats: Vec::new(),
            reaction: None,
        }
    }

    /// Add a stat bonus.
    #[must_use]
    pub fn with_stat(mut self, stat: Stat, amount: Fixed) -> Self {
        self.stats.push((stat, amount));
        self
    }

    /// Attach an event reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reaction = Some(reaction);
        self
    }

    /// Bonus this item grants to one stat.
    #[must_use]
    pub fn bonus(&self, stat: Stat) -> Fixed {
        self.stats
            .iter()
            .filter(|(s, _)| *s == stat)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_sums_matching_stats() {
        let item = Item::new("Shield", "", 45)
            .with_stat(Stat::Armor, Fixed::from_num(10))
            .with_stat(Stat::MagicResist, Fixed::from_num(10));
        assert_eq!(item.bonus(Stat::Armor), Fixed::from_num(10));
        assert_eq!(item.bonus(Stat::AttackDamage), Fixed::ZERO);
    }
}
