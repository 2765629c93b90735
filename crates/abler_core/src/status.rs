//! Timed modifiers and periodic effects attached to a single unit.
//!
//! A status effect is plain data: which stats it shifts, what it does
//! on each tick, and optionally how it reacts to events. The unit owns
//! its effects and the board drives their ticks.

use crate::combat::DamageType;
use crate::math::{frames_to_seconds, Fixed};
use crate::skill::Reaction;
use crate::stats::{Stat, StatDelta, Stats};
use crate::unit::UnitId;

/// Tick interval used when an effect does not specify one.
pub const DEFAULT_TICK_INTERVAL: Fixed = Fixed::lit("0.5");

/// What happens each time the tick timer crosses the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEffect {
    /// Damage the carrier.
    Damage {
        /// Pre-mitigation amount per tick.
        amount: Fixed,
        /// Damage category.
        damage_type: DamageType,
    },
    /// Heal the carrier.
    Heal {
        /// Amount per tick.
        amount: Fixed,
    },
}

/// A stat change requested by an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatModifier {
    /// Add a fixed amount.
    Flat(Stat, Fixed),
    /// Multiply the stat's value at attach time. The resulting delta is
    /// recorded so detaching restores the stat exactly.
    Scale(Stat, Fixed),
}

/// A timed effect on one unit.
#[derive(Debug, Clone)]
pub struct StatusEffect {
    /// Display name, also used to detect an effect already being present.
    pub name: String,
    /// Total lifetime in seconds.
    pub duration: Fixed,
    /// Seconds between periodic ticks.
    pub tick_interval: Fixed,
    /// Periodic behaviour, if any.
    pub on_tick: Option<TickEffect>,
    /// Stat changes applied on attach and reverted on detach.
    pub modifiers: Vec<StatModifier>,
    /// Event reaction while attached.
    pub reaction: Option<Reaction>,
    /// Unit that applied the effect.
    pub source: Option<UnitId>,
    remaining: Fixed,
    tick_timer: Fixed,
    applied: Vec<StatDelta>,
    unit: Option<UnitId>,
}

impl StatusEffect {
    /// An effect that does nothing but exist for `duration` seconds.
    #[must_use]
    pub fn new(name: impl Into<String>, duration: Fixed) -> Self {
        Self {
            name: name.into(),
            duration,
            tick_interval: DEFAULT_TICK_INTERVAL,
            on_tick: None,
            modifiers: Vec::new(),
            reaction: None,
            source: None,
            remaining: duration,
            tick_timer: Fixed::ZERO,
            applied: Vec::new(),
            unit: None,
        }
    }

    /// Add periodic behaviour.
    #[must_use]
    pub fn with_tick(mut self, interval: Fixed, effect: TickEffect) -> Self {
        self.tick_interval = interval;
        self.on_tick = Some(effect);
        self
    }

    /// Add a stat modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: StatModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Attach an event reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reaction = Some(reaction);
        self
    }

    /// Record who applied the effect.
    #[must_use]
    pub fn with_source(mut self, source: UnitId) -> Self {
        self.source = Some(source);
        self
    }

    /// Periodic damage.
    #[must_use]
    pub fn damage_over_time(
        name: impl Into<String>,
        duration: Fixed,
        interval: Fixed,
        amount: Fixed,
        damage_type: DamageType,
    ) -> Self {
        Self::new(name, duration).with_tick(interval, TickEffect::Damage { amount, damage_type })
    }

    /// Periodic healing.
    #[must_use]
    pub fn heal_over_time(
        name: impl Into<String>,
        duration: Fixed,
        interval: Fixed,
        amount: Fixed,
    ) -> Self {
        Self::new(name, duration).with_tick(interval, TickEffect::Heal { amount })
    }

    /// Flat stat changes for a while.
    #[must_use]
    pub fn stat_modifier(name: impl Into<String>, duration: Fixed, deltas: &[StatDelta]) -> Self {
        deltas.iter().fold(Self::new(name, duration), |effect, &(stat, amount)| {
            effect.with_modifier(StatModifier::Flat(stat, amount))
        })
    }

    /// 5 magical damage every 5 frames for 5 seconds.
    #[must_use]
    pub fn poison() -> Self {
        Self::damage_over_time(
            "Poison",
            Fixed::from_num(5),
            frames_to_seconds(5),
            Fixed::from_num(5),
            DamageType::Magical,
        )
    }

    /// 3 healing every 5 frames for 5 seconds.
    #[must_use]
    pub fn regeneration() -> Self {
        Self::heal_over_time("Regeneration", Fixed::from_num(5), frames_to_seconds(5), Fixed::from_num(3))
    }

    /// -25 strength and intelligence for 3 seconds.
    #[must_use]
    pub fn weakness() -> Self {
        Self::stat_modifier(
            "Weakness",
            Fixed::from_num(3),
            &[(Stat::Strength, Fixed::from_num(-25)), (Stat::Intelligence, Fixed::from_num(-25))],
        )
    }

    /// Doubles armor and magic resist for 4 seconds.
    #[must_use]
    pub fn protection() -> Self {
        Self::new("Protection", Fixed::from_num(4))
            .with_modifier(StatModifier::Scale(Stat::Armor, Fixed::from_num(2)))
            .with_modifier(StatModifier::Scale(Stat::MagicResist, Fixed::from_num(2)))
    }

    /// Attach to `unit`, shifting its stats.
    pub fn apply(&mut self, unit: UnitId, stats: &mut Stats) {
        if self.unit.is_some() {
            return;
        }
        self.unit = Some(unit);
        self.applied.clear();
        for modifier in &self.modifiers {
            let delta = match *modifier {
                StatModifier::Flat(stat, amount) => (stat, amount),
                StatModifier::Scale(stat, factor) => (stat, stats.get(stat) * (factor - Fixed::ONE)),
            };
            stats.add(delta.0, delta.1);
            self.applied.push(delta);
        }
    }

    /// Detach, restoring exactly the deltas applied on attach.
    pub fn remove(&mut self, stats: &mut Stats) {
        if self.unit.is_none() {
            return;
        }
        stats.revert_all(&self.applied);
        self.applied.clear();
        self.unit = None;
    }

    /// Age the effect and return how many periodic ticks fired.
    ///
    /// A large `dt` can fire several ticks at once, including on the
    /// frame the effect expires.
    pub fn advance(&mut self, dt: Fixed) -> u32 {
        self.remaining = (self.remaining - dt).max(Fixed::ZERO);
        if self.on_tick.is_none() || self.tick_interval <= Fixed::ZERO {
            return 0;
        }
        self.tick_timer += dt;
        let mut fired = 0;
        while self.tick_timer >= self.tick_interval {
            self.tick_timer -= self.tick_interval;
            fired += 1;
        }
        fired
    }

    /// Whether the effect has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= Fixed::ZERO
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> Fixed {
        self.remaining
    }

    /// Progress toward the next tick.
    #[must_use]
    pub fn tick_timer(&self) -> Fixed {
        self.tick_timer
    }

    /// Unit the effect is attached to.
    #[must_use]
    pub fn unit(&self) -> Option<UnitId> {
        self.unit
    }

    pub(crate) fn rebind(&mut self, unit: UnitId) {
        if self.unit.is_some() {
            self.unit = Some(unit);
        }
    }

    /// Deltas currently applied to the carrier's stats.
    #[must_use]
    pub fn applied(&self) -> &[StatDelta] {
        &self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval_is_half_second() {
        assert_eq!(DEFAULT_TICK_INTERVAL, Fixed::from_num(0.5));
        assert_eq!(StatusEffect::new("x", Fixed::ONE).tick_interval, Fixed::from_num(0.5));
    }

    #[test]
    fn test_large_dt_fires_multiple_ticks_on_final_frame() {
        let mut effect = StatusEffect::damage_over_time(
            "Burn",
            Fixed::ONE,
            Fixed::from_num(0.25),
            Fixed::from_num(2),
            DamageType::Magical,
        );
        let fired = effect.advance(Fixed::ONE);
        assert_eq!(fired, 4);
        assert!(effect.is_expired());
        assert_eq!(effect.tick_timer(), Fixed::ZERO);
    }

    #[test]
    fn test_ticks_accumulate_across_frames() {
        let mut effect = StatusEffect::heal_over_time("Mend", Fixed::from_num(3), Fixed::ONE, Fixed::ONE);
        assert_eq!(effect.advance(Fixed::from_num(0.6)), 0);
        assert_eq!(effect.advance(Fixed::from_num(0.6)), 1);
        assert!(!effect.is_expired());
    }

    #[test]
    fn test_no_tick_without_periodic_effect() {
        let mut effect = StatusEffect::weakness();
        assert_eq!(effect.advance(Fixed::from_num(2)), 0);
    }

    #[test]
    fn test_flat_modifier_symmetry() {
        let original = Stats {
            strength: Fixed::from_num(10),
            ..Stats::default()
        };
        let mut stats = original.clone();
        let mut effect = StatusEffect::weakness();
        effect.apply(UnitId(1), &mut stats);
        assert_eq!(stats.strength, Fixed::from_num(-15));
        assert_eq!(effect.unit(), Some(UnitId(1)));
        effect.remove(&mut stats);
        assert_eq!(stats, original);
        assert_eq!(effect.unit(), None);
    }

    #[test]
    fn test_scale_modifier_reverts_exactly_after_base_changes() {
        let mut stats = Stats {
            armor: Fixed::from_num(20),
            magic_resist: Fixed::from_num(10),
            ..Stats::default()
        };
        let mut effect = StatusEffect::protection();
        effect.apply(UnitId(2), &mut stats);
        assert_eq!(stats.armor, Fixed::from_num(40));
        assert_eq!(stats.magic_resist, Fixed::from_num(20));

        // An item equipped while protected must survive the detach.
        stats.armor += Fixed::from_num(15);
        effect.remove(&mut stats);
        assert_eq!(stats.armor, Fixed::from_num(35));
        assert_eq!(stats.magic_resist, Fixed::from_num(10));
    }

    #[test]
    fn test_double_apply_is_ignored() {
        let mut stats = Stats::default();
        let mut effect = StatusEffect::weakness();
        effect.apply(UnitId(1), &mut stats);
        effect.apply(UnitId(1), &mut stats);
        assert_eq!(stats.strength, Fixed::from_num(-25));
    }
}
