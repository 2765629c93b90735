//! Test fixtures and helpers.
//!
//! Unit builders and pre-populated boards for consistent testing.

use abler_core::board::Board;
use abler_core::config::CombatConfig;
use abler_core::math::Fixed;
use abler_core::skill::Skill;
use abler_core::stats::Stats;
use abler_core::unit::{Team, Unit, UnitId, UnitKind};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Builder for test units with readable stat overrides.
#[derive(Debug, Clone)]
pub struct UnitBuilder {
    name: String,
    kind: UnitKind,
    stats: Stats,
    spell: Option<Skill>,
    passives: Vec<Skill>,
}

impl UnitBuilder {
    /// A unit with default stats and no regeneration.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: UnitKind::Summoned,
            stats: Stats {
                hp_regen: Fixed::ZERO,
                ..Stats::default()
            },
            spell: None,
            passives: Vec::new(),
        }
    }

    /// Set the archetype tag.
    #[must_use]
    pub fn kind(mut self, kind: UnitKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set max hp.
    #[must_use]
    pub fn hp(mut self, hp: i32) -> Self {
        self.stats.max_hp = fixed(hp);
        self
    }

    /// Set attack damage.
    #[must_use]
    pub fn damage(mut self, damage: i32) -> Self {
        self.stats.attack_damage = fixed(damage);
        self
    }

    /// Set attack range in cells.
    #[must_use]
    pub fn range(mut self, range: i32) -> Self {
        self.stats.attack_range = fixed(range);
        self
    }

    /// Set armor.
    #[must_use]
    pub fn armor(mut self, armor: i32) -> Self {
        self.stats.armor = fixed(armor);
        self
    }

    /// Set magic resist.
    #[must_use]
    pub fn magic_resist(mut self, magic_resist: i32) -> Self {
        self.stats.magic_resist = fixed(magic_resist);
        self
    }

    /// Set hp regenerated per second.
    #[must_use]
    pub fn regen(mut self, per_second: i32) -> Self {
        self.stats.hp_regen = fixed(per_second);
        self
    }

    /// Set move speed in cells per second.
    #[must_use]
    pub fn move_speed(mut self, cells_per_second: i32) -> Self {
        self.stats.move_speed = fixed(cells_per_second);
        self
    }

    /// Equip an active spell.
    #[must_use]
    pub fn spell(mut self, spell: Skill) -> Self {
        self.spell = Some(spell);
        self
    }

    /// Attach a passive.
    #[must_use]
    pub fn passive(mut self, passive: Skill) -> Self {
        self.passives.push(passive);
        self
    }

    /// Finish the unit.
    #[must_use]
    pub fn build(self) -> Unit {
        let mut unit = Unit::new(self.name, self.kind, self.stats);
        if let Some(spell) = self.spell {
            unit = unit.with_spell(spell);
        }
        for passive in self.passives {
            unit = unit.with_passive(passive);
        }
        unit
    }
}

/// Melee fighter with the given attack damage.
#[must_use]
pub fn melee(name: &str, damage: i32) -> Unit {
    UnitBuilder::new(name).damage(damage).build()
}

/// Ranged fighter with the given attack damage and range.
#[must_use]
pub fn ranged(name: &str, damage: i32, range: i32) -> Unit {
    UnitBuilder::new(name).damage(damage).range(range).build()
}

/// A unit that never deals damage.
#[must_use]
pub fn dummy(name: &str, hp: i32) -> Unit {
    UnitBuilder::new(name).hp(hp).damage(0).build()
}

/// Place a unit, panicking on failure (for tests only).
///
/// # Panics
///
/// Panics if the cell is invalid or occupied.
pub fn place(board: &mut Board, unit: Unit, x: i32, y: i32, team: Team) -> UnitId {
    match board.add(unit, x, y, team) {
        Ok(id) => id,
        Err(err) => panic!("failed to place unit at ({x}, {y}): {err}"),
    }
}

/// A seeded 10x10 board.
#[must_use]
pub fn seeded_board(seed: u64) -> Board {
    Board::new(CombatConfig::default().with_seed(seed))
}

/// Four melee and ranged units a side facing each other across the board.
#[must_use]
pub fn skirmish(seed: u64) -> Board {
    let mut board = seeded_board(seed);
    for row in 0..4 {
        let y = row * 2 + 1;
        let (player, enemy) = if row % 2 == 0 {
            (melee("Guard", 12 + row), melee("Raider", 11 + row))
        } else {
            (ranged("Archer", 8 + row, 4), ranged("Slinger", 9 + row, 3))
        };
        place(&mut board, player, 1, y, Team::Player);
        place(&mut board, enemy, 8, y, Team::Enemy);
    }
    board
}
