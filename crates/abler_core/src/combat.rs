//! Damage types and the formulas that turn raw numbers into hit point loss.
//!
//! This module implements:
//! - Hyperbolic mitigation `100 / (100 + defense)`
//! - Strength-scaled basic attack damage
//! - Attack-speed scaled attack intervals

use serde::{Deserialize, Serialize};

use crate::math::Fixed;
use crate::stats::Stats;

/// Category of incoming damage. Each has its own mitigation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DamageType {
    /// Reduced by armor.
    #[default]
    Physical,
    /// Reduced by magic resist.
    Magical,
    /// Never reduced.
    True,
}

impl DamageType {
    /// Lowercase label used in narration.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DamageType::Physical => "physical",
            DamageType::Magical => "magical",
            DamageType::True => "true",
        }
    }

    /// Multiplier applied to incoming damage of this type.
    ///
    /// # Example
    ///
    /// ```
    /// use abler_core::combat::DamageType;
    /// use abler_core::math::Fixed;
    /// use abler_core::stats::Stats;
    ///
    /// let stats = Stats { armor: Fixed::from_num(100), ..Stats::default() };
    /// assert_eq!(DamageType::Physical.mitigation(&stats), Fixed::from_num(0.5));
    /// assert_eq!(DamageType::True.mitigation(&stats), Fixed::ONE);
    /// ```
    #[must_use]
    pub fn mitigation(self, defender: &Stats) -> Fixed {
        let defense = match self {
            DamageType::Physical => defender.armor,
            DamageType::Magical => defender.magic_resist,
            DamageType::True => return Fixed::ONE,
        };
        mitigation_factor(defense)
    }
}

/// `100 / (100 + defense)`, clamped so negative defense never amplifies
/// damage past double.
#[must_use]
pub fn mitigation_factor(defense: Fixed) -> Fixed {
    let hundred = Fixed::from_num(100);
    let denominator = (hundred + defense).max(Fixed::from_num(50));
    hundred / denominator
}

/// Damage after mitigation for the given defender.
#[must_use]
pub fn mitigated_damage(amount: Fixed, damage_type: DamageType, defender: &Stats) -> Fixed {
    amount * damage_type.mitigation(defender)
}

/// Basic attack damage: `attack_damage * (1 + strength / 100)`.
#[must_use]
pub fn basic_attack_damage(attacker: &Stats) -> Fixed {
    attacker.attack_damage * scaling(attacker.strength)
}

/// `1 + power / 100`, the multiplier a power stat adds to an ability.
#[must_use]
pub fn scaling(power: Fixed) -> Fixed {
    Fixed::ONE + power / Fixed::from_num(100)
}

/// Seconds between basic attacks: `base_attack_time / (1 + attack_speed / 100)`.
#[must_use]
pub fn attack_interval(attacker: &Stats) -> Fixed {
    let divisor = scaling(attacker.attack_speed).max(Fixed::from_num(0.01));
    attacker.base_attack_time / divisor
}
