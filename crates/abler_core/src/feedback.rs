//! Presentation hints produced by the simulation.
//!
//! The engine never draws anything, but it owns the lifetimes of these
//! records so they age out identically on every run.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::combat::DamageType;
use crate::math::Fixed;

/// An RGB colour hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Physical damage numbers, hit flashes.
    pub const WHITE: Self = Self(255, 255, 255);
    /// Magical damage numbers.
    pub const LIGHT_BLUE: Self = Self(173, 216, 230);
    /// Other damage numbers and cast announcements.
    pub const YELLOW: Self = Self(255, 255, 0);
    /// Casting flash.
    pub const PURPLE: Self = Self(128, 0, 255);
    /// Death flash.
    pub const RED: Self = Self(255, 0, 0);
    /// Heal numbers.
    pub const GREEN: Self = Self(0, 255, 0);

    /// Colour used for a damage number of the given type.
    #[must_use]
    pub const fn for_damage(damage_type: DamageType) -> Self {
        match damage_type {
            DamageType::Physical => Self::WHITE,
            DamageType::Magical => Self::LIGHT_BLUE,
            DamageType::True => Self::YELLOW,
        }
    }
}

/// Kinds of transient tile markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualEffectKind {
    /// Burning ground.
    Fire,
    /// Necromantic energy.
    Dark,
    /// Electric arc.
    Lightning,
    /// Frost.
    Ice,
    /// Holy light.
    Holy,
    /// Toxic cloud.
    Poison,
    /// Blood splash.
    Blood,
    /// Arcane sparkle.
    Arcane,
}

/// A fading marker on one board cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualEffect {
    /// Marker kind.
    pub kind: VisualEffectKind,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    remaining: Fixed,
    lifetime: Fixed,
}

impl VisualEffect {
    /// A fresh marker that lives for `lifetime` seconds.
    #[must_use]
    pub fn new(kind: VisualEffectKind, x: i32, y: i32, lifetime: Fixed) -> Self {
        Self {
            kind,
            x,
            y,
            remaining: lifetime,
            lifetime,
        }
    }

    /// Age the marker. Returns `false` once it has faded.
    pub fn advance(&mut self, dt: Fixed) -> bool {
        self.remaining = (self.remaining - dt).max(Fixed::ZERO);
        self.remaining > Fixed::ZERO
    }

    /// Remaining seconds.
    #[must_use]
    pub fn remaining(&self) -> Fixed {
        self.remaining
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub fn alpha(&self) -> Fixed {
        if self.lifetime <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        self.remaining / self.lifetime
    }
}

/// A rising text label, such as a damage number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextFloater {
    /// Column it started on.
    pub x: i32,
    /// Row it started on.
    pub y: i32,
    /// Displayed text.
    pub text: String,
    /// Text colour.
    pub color: Rgb,
    remaining: Fixed,
    lifetime: Fixed,
}

impl TextFloater {
    /// A new floater living for `lifetime` seconds.
    #[must_use]
    pub fn new(x: i32, y: i32, text: impl Into<String>, color: Rgb, lifetime: Fixed) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            color,
            remaining: lifetime,
            lifetime,
        }
    }

    /// Age the floater. Returns `false` once it has expired.
    pub fn advance(&mut self, dt: Fixed) -> bool {
        self.remaining = (self.remaining - dt).max(Fixed::ZERO);
        self.remaining > Fixed::ZERO
    }

    /// Seconds left to live.
    #[must_use]
    pub fn remaining(&self) -> Fixed {
        self.remaining
    }

    /// How far the label has drifted upward, in cells (one cell per lifetime).
    #[must_use]
    pub fn rise(&self) -> Fixed {
        if self.lifetime <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        Fixed::ONE - self.remaining / self.lifetime
    }
}

/// Bounded narration of what happened in combat, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombatLog {
    capacity: usize,
    messages: VecDeque<String>,
}

impl CombatLog {
    /// Empty log holding at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a line, evicting the oldest past capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message.into());
    }

    /// All retained lines, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Most recent line.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = CombatLog::new(3);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        let lines: Vec<_> = log.messages().collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(log.last(), Some("line 4"));
    }

    #[test]
    fn test_visual_effect_fades() {
        let mut effect = VisualEffect::new(VisualEffectKind::Fire, 1, 1, Fixed::ONE);
        assert!(effect.advance(Fixed::from_num(0.5)));
        assert_eq!(effect.alpha(), Fixed::from_num(0.5));
        assert!(!effect.advance(Fixed::from_num(0.5)));
        assert_eq!(effect.remaining(), Fixed::ZERO);
    }

    #[test]
    fn test_floater_rises_as_it_ages() {
        let mut floater = TextFloater::new(0, 0, "12", Rgb::WHITE, Fixed::from_num(2));
        assert_eq!(floater.rise(), Fixed::ZERO);
        floater.advance(Fixed::ONE);
        assert_eq!(floater.rise(), Fixed::from_num(0.5));
    }

    #[test]
    fn test_damage_colours() {
        assert_eq!(Rgb::for_damage(DamageType::Physical), Rgb::WHITE);
        assert_eq!(Rgb::for_damage(DamageType::Magical), Rgb::LIGHT_BLUE);
        assert_eq!(Rgb::for_damage(DamageType::True), Rgb::YELLOW);
    }
}
