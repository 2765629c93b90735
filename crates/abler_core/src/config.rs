//! Tunable engine constants.
//!
//! The defaults reproduce the balance the content was authored against.
//! Overrides are loaded from RON so designers can tweak timings without
//! rebuilding.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::{fixed_decimal, Fixed};

/// Engine-wide combat settings.
///
/// # Example
///
/// ```
/// use abler_core::config::CombatConfig;
///
/// let config = CombatConfig::from_ron_str("(width: 8, height: 8)").unwrap();
/// assert_eq!(config.width, 8);
/// assert_eq!(config.combat_log_capacity, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// Simulated seconds after which the driver force-ends combat.
    #[serde(with = "fixed_decimal")]
    pub max_combat_time: Fixed,
    /// Seconds a dead unit lingers on its cell before removal.
    #[serde(with = "fixed_decimal")]
    pub death_duration: Fixed,
    /// Cells per second for basic ranged attacks.
    #[serde(with = "fixed_decimal")]
    pub projectile_speed: Fixed,
    /// Distance under which a projectile counts as landed.
    #[serde(with = "fixed_decimal")]
    pub landing_epsilon: Fixed,
    /// Flat mana granted to the spell per basic attack.
    #[serde(with = "fixed_decimal")]
    pub attack_mana: Fixed,
    /// Fraction of pre-mitigation damage converted to mana for the victim.
    #[serde(with = "fixed_decimal")]
    pub damage_mana_fraction: Fixed,
    /// Lifetime of visual markers in seconds.
    #[serde(with = "fixed_decimal")]
    pub visual_effect_decay: Fixed,
    /// Lifetime of floating text in seconds.
    #[serde(with = "fixed_decimal")]
    pub floater_lifetime: Fixed,
    /// Number of narration lines kept.
    pub combat_log_capacity: usize,
    /// Seed for the board's deterministic RNG.
    pub seed: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            max_combat_time: Fixed::from_num(60),
            death_duration: Fixed::from_num(0.8),
            projectile_speed: Fixed::from_num(15),
            landing_epsilon: Fixed::from_num(0.3),
            attack_mana: Fixed::from_num(10),
            damage_mana_fraction: Fixed::from_num(0.02),
            visual_effect_decay: Fixed::ONE,
            floater_lifetime: Fixed::from_num(2),
            combat_log_capacity: 20,
            seed: 0,
        }
    }
}

impl CombatConfig {
    /// Parse a config from RON text. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed RON and
    /// [`ConfigError::Invalid`] when the board has no cells or a duration
    /// is not positive.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "board must have at least one cell, got {}x{}",
                self.width, self.height
            )));
        }
        let positive = [
            ("max_combat_time", self.max_combat_time),
            ("death_duration", self.death_duration),
            ("projectile_speed", self.projectile_speed),
            ("landing_epsilon", self.landing_epsilon),
            ("visual_effect_decay", self.visual_effect_decay),
            ("floater_lifetime", self.floater_lifetime),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value <= Fixed::ZERO) {
            return Err(ConfigError::Invalid(format!("{field} must be positive")));
        }
        if self.combat_log_capacity == 0 {
            return Err(ConfigError::Invalid("combat_log_capacity must be positive".into()));
        }
        Ok(())
    }

    /// Same settings with a different RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Same settings with a different board size.
    #[must_use]
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CombatConfig::default();
        assert_eq!((config.width, config.height), (10, 10));
        assert_eq!(config.max_combat_time, Fixed::from_num(60));
        assert_eq!(config.projectile_speed, Fixed::from_num(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = CombatConfig::from_ron_str("(width: 8, height: 8, death_duration: 0.5)").unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.death_duration, Fixed::from_num(0.5));
        assert_eq!(config.attack_mana, Fixed::from_num(10));
    }

    #[test]
    fn test_rejects_empty_board() {
        let result = CombatConfig::from_ron_str("(width: 0)");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_non_positive_timings() {
        for text in [
            "(death_duration: 0.0)",
            "(death_duration: -1.0)",
            "(landing_epsilon: 0.0)",
            "(visual_effect_decay: 0.0)",
            "(floater_lifetime: -0.5)",
            "(projectile_speed: 0.0)",
        ] {
            let result = CombatConfig::from_ron_str(text);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{text} was accepted");
        }
    }

    #[test]
    fn test_error_names_the_field() {
        let Err(ConfigError::Invalid(message)) = CombatConfig::from_ron_str("(death_duration: 0.0)") else {
            panic!("zero death duration accepted");
        };
        assert!(message.contains("death_duration"));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let result = CombatConfig::from_ron_str("(width: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
