//! Events broadcast over the board's event bus.
//!
//! Every event is recorded on the board (drained by `Board::advance`)
//! and offered to the reactions carried by living units' spells,
//! passives, items and status effects, in roster order.

use serde::{Deserialize, Serialize};

use crate::combat::DamageType;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::skill::SkillId;
use crate::unit::{Team, UnitId, UnitKind};

/// Snapshot of a unit taken at the moment it died.
///
/// Reactions use it instead of the live unit, which may already be
/// gone by the time a later listener looks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeathRecord {
    /// The dying unit.
    pub unit: UnitId,
    /// Its team.
    pub team: Team,
    /// Its archetype.
    pub kind: UnitKind,
    /// Whether it was summoned during combat.
    pub summoned: bool,
    /// Who summoned it, if anyone.
    pub summoner: Option<UnitId>,
    /// Column it died on.
    pub x: i32,
    /// Row it died on.
    pub y: i32,
    /// Its maximum hit points.
    #[serde(with = "fixed_serde")]
    pub max_hp: Fixed,
}

/// Everything the engine announces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// A unit was placed on the board.
    UnitAdded {
        /// The new unit.
        unit: UnitId,
    },
    /// A unit left the board.
    UnitRemoved {
        /// The removed unit.
        unit: UnitId,
    },
    /// A basic attack was made.
    UnitAttack {
        /// Attacker.
        attacker: UnitId,
        /// Target.
        target: UnitId,
        /// Pre-mitigation damage.
        #[serde(with = "fixed_serde")]
        damage: Fixed,
    },
    /// A unit lost hit points.
    DamageTaken {
        /// Victim.
        unit: UnitId,
        /// Damage after mitigation.
        #[serde(with = "fixed_serde")]
        amount: Fixed,
        /// Damage category.
        damage_type: DamageType,
        /// Who dealt it, if known.
        source: Option<UnitId>,
    },
    /// A unit regained hit points through a heal (not regeneration).
    UnitHealed {
        /// Healed unit.
        unit: UnitId,
        /// Amount actually restored.
        #[serde(with = "fixed_serde")]
        amount: Fixed,
        /// Healer, if known.
        source: Option<UnitId>,
    },
    /// A unit's hit points reached zero.
    UnitDeath {
        /// Dying unit.
        unit: UnitId,
        /// Killer, if known.
        killer: Option<UnitId>,
    },
    /// Same moment as [`GameEvent::UnitDeath`], carrying a snapshot for reactions.
    Death {
        /// Snapshot of the dying unit.
        dying: DeathRecord,
        /// Killer, if known.
        killer: Option<UnitId>,
    },
    /// A unit started casting its spell.
    SpellCast {
        /// Caster.
        caster: UnitId,
        /// Spell being cast.
        skill: SkillId,
    },
    /// A cast completed and its effect was executed.
    SpellResolved {
        /// Caster.
        caster: UnitId,
        /// Spell that resolved.
        skill: SkillId,
    },
    /// A skill brought a new unit onto the board.
    MinionSummoned {
        /// Unit that owns the summon.
        summoner: UnitId,
        /// The summoned unit.
        minion: UnitId,
    },
    /// A projectile landed on a unit.
    ProjectileHit {
        /// Unit that fired it.
        source: UnitId,
        /// Unit it landed on.
        target: UnitId,
    },
    /// An area projectile exploded.
    AoeExplosion {
        /// Unit that fired it.
        source: UnitId,
        /// Explosion centre.
        center: Vec2Fixed,
        /// Explosion radius in cells.
        radius: i32,
    },
}

impl GameEvent {
    /// Snake-case name of the event kind, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            GameEvent::UnitAdded { .. } => "unit_added",
            GameEvent::UnitRemoved { .. } => "unit_removed",
            GameEvent::UnitAttack { .. } => "unit_attack",
            GameEvent::DamageTaken { .. } => "damage_taken",
            GameEvent::UnitHealed { .. } => "unit_healed",
            GameEvent::UnitDeath { .. } => "unit_death",
            GameEvent::Death { .. } => "death",
            GameEvent::SpellCast { .. } => "spell_cast",
            GameEvent::SpellResolved { .. } => "spell_resolved",
            GameEvent::MinionSummoned { .. } => "minion_summoned",
            GameEvent::ProjectileHit { .. } => "projectile_hit",
            GameEvent::AoeExplosion { .. } => "aoe_explosion",
        }
    }

    /// The death snapshot if this is a [`GameEvent::Death`].
    #[must_use]
    pub fn death(&self) -> Option<&DeathRecord> {
        match self {
            GameEvent::Death { dying, .. } => Some(dying),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let record = DeathRecord {
            unit: UnitId(1),
            team: Team::Enemy,
            kind: UnitKind::Skeleton,
            summoned: false,
            summoner: None,
            x: 0,
            y: 0,
            max_hp: Fixed::from_num(40),
        };
        let a = GameEvent::UnitDeath { unit: UnitId(1), killer: None };
        let b = GameEvent::Death { dying: record.clone(), killer: None };
        assert_ne!(a.name(), b.name());
        assert!(a.death().is_none());
        assert_eq!(b.death(), Some(&record));
    }
}
