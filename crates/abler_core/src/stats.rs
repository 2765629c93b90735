//! Unit stat blocks and the deltas items and status effects apply to them.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_decimal, Fixed};

/// One modifiable stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Maximum hit points.
    MaxHp,
    /// Hit points regenerated per second.
    HpRegen,
    /// Mana added to the spell per second.
    ManaRegen,
    /// Physical power; scales basic attacks.
    Strength,
    /// Magical power; scales spells.
    Intelligence,
    /// Physical defense.
    Armor,
    /// Magical defense.
    MagicResist,
    /// Base basic-attack damage.
    AttackDamage,
    /// Basic-attack reach in cells.
    AttackRange,
    /// Percentage attack-speed bonus.
    AttackSpeed,
    /// Cells per second while walking.
    MoveSpeed,
}

/// A signed change to one stat.
pub type StatDelta = (Stat, Fixed);

/// Combat stats of a unit. Current hit points live on the unit itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Maximum hit points.
    #[serde(with = "fixed_decimal")]
    pub max_hp: Fixed,
    /// Hit points regenerated per second.
    #[serde(with = "fixed_decimal")]
    pub hp_regen: Fixed,
    /// Spell mana gained per second.
    #[serde(with = "fixed_decimal")]
    pub mana_regen: Fixed,
    /// Physical power.
    #[serde(with = "fixed_decimal")]
    pub strength: Fixed,
    /// Magical power.
    #[serde(with = "fixed_decimal")]
    pub intelligence: Fixed,
    /// Physical defense.
    #[serde(with = "fixed_decimal")]
    pub armor: Fixed,
    /// Magical defense.
    #[serde(with = "fixed_decimal")]
    pub magic_resist: Fixed,
    /// Base basic-attack damage.
    #[serde(with = "fixed_decimal")]
    pub attack_damage: Fixed,
    /// Basic-attack reach in cells (Chebyshev).
    #[serde(with = "fixed_decimal")]
    pub attack_range: Fixed,
    /// Percentage attack-speed bonus.
    #[serde(with = "fixed_decimal")]
    pub attack_speed: Fixed,
    /// Seconds between attacks before attack speed.
    #[serde(with = "fixed_decimal")]
    pub base_attack_time: Fixed,
    /// Cells per second while walking.
    #[serde(with = "fixed_decimal")]
    pub move_speed: Fixed,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_hp: Fixed::from_num(100),
            hp_regen: Fixed::ONE,
            mana_regen: Fixed::ZERO,
            strength: Fixed::ZERO,
            intelligence: Fixed::ZERO,
            armor: Fixed::ZERO,
            magic_resist: Fixed::ZERO,
            attack_damage: Fixed::from_num(10),
            attack_range: Fixed::ONE,
            attack_speed: Fixed::ZERO,
            base_attack_time: Fixed::ONE,
            move_speed: Fixed::from_num(2),
        }
    }
}

impl Stats {
    /// Current value of a stat.
    #[must_use]
    pub fn get(&self, stat: Stat) -> Fixed {
        match stat {
            Stat::MaxHp => self.max_hp,
            Stat::HpRegen => self.hp_regen,
            Stat::ManaRegen => self.mana_regen,
            Stat::Strength => self.strength,
            Stat::Intelligence => self.intelligence,
            Stat::Armor => self.armor,
            Stat::MagicResist => self.magic_resist,
            Stat::AttackDamage => self.attack_damage,
            Stat::AttackRange => self.attack_range,
            Stat::AttackSpeed => self.attack_speed,
            Stat::MoveSpeed => self.move_speed,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut Fixed {
        match stat {
            Stat::MaxHp => &mut self.max_hp,
            Stat::HpRegen => &mut self.hp_regen,
            Stat::ManaRegen => &mut self.mana_regen,
            Stat::Strength => &mut self.strength,
            Stat::Intelligence => &mut self.intelligence,
            Stat::Armor => &mut self.armor,
            Stat::MagicResist => &mut self.magic_resist,
            Stat::AttackDamage => &mut self.attack_damage,
            Stat::AttackRange => &mut self.attack_range,
            Stat::AttackSpeed => &mut self.attack_speed,
            Stat::MoveSpeed => &mut self.move_speed,
        }
    }

    /// Add a signed amount to a stat.
    pub fn add(&mut self, stat: Stat, amount: Fixed) {
        *self.slot(stat) += amount;
    }

    /// Add every delta.
    pub fn apply_all(&mut self, deltas: &[StatDelta]) {
        for &(stat, amount) in deltas {
            self.add(stat, amount);
        }
    }

    /// Subtract every delta, undoing [`Stats::apply_all`].
    pub fn revert_all(&mut self, deltas: &[StatDelta]) {
        for &(stat, amount) in deltas {
            self.add(stat, -amount);
        }
    }

    /// Attack range as whole cells.
    #[must_use]
    pub fn range_cells(&self) -> i32 {
        self.attack_range.to_num()
    }
}
