//! # Abler Core
//!
//! Deterministic combat engine for a grid autobattler.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (the board owns a seeded RNG)
//! - No floating-point math (uses fixed-point)
//!
//! Two teams placed on a [`board::Board`] fight frame by frame: units walk,
//! attack, cast spells, trigger passive reactions, fire projectiles and
//! carry status effects until one side is gone or time runs out.
//!
//! ## Crate Structure
//!
//! - [`board`] - Grid placement, spatial queries, pathfinding, event bus
//! - [`behavior`] - Per-unit state machine, damage, healing and death
//! - [`unit`] - The unit type and its cosmetic state
//! - [`skill`] - Active spells, passives, auras and event reactions
//! - [`status`] - Timed status effects
//! - [`projectile`] - Projectiles in flight
//! - [`driver`] - Fixed-step combat driver and outcome
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod behavior;
pub mod board;
pub mod combat;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod feedback;
pub mod item;
pub mod math;
pub mod projectile;
pub mod rng;
pub mod skill;
pub mod stats;
pub mod status;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::board::{Board, Corpse};
    pub use crate::combat::DamageType;
    pub use crate::config::CombatConfig;
    pub use crate::driver::{CombatDriver, CombatOutcome, CombatReport, EndReason};
    pub use crate::error::{BoardError, ConfigError, Result};
    pub use crate::events::{DeathRecord, GameEvent};
    pub use crate::feedback::{Rgb, VisualEffectKind};
    pub use crate::item::Item;
    pub use crate::math::{Fixed, Vec2Fixed, FRAME_TIME};
    pub use crate::projectile::{Projectile, ProjectileTarget};
    pub use crate::skill::{Aura, AuraEffect, CastEffect, Reaction, Skill, SkillId, SummonUpgrade, TargetTeam};
    pub use crate::stats::{Stat, StatDelta, Stats};
    pub use crate::status::{StatModifier, StatusEffect, TickEffect};
    pub use crate::unit::{Team, Unit, UnitId, UnitKind, UnitState};
}
