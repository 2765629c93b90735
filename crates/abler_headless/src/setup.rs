//! Match setup loading.
//!
//! A setup names the player's army, where each unit stands and what it
//! carries, plus the combat config every round runs under.

use std::path::Path;

use abler_content::prelude::{create_item, create_skill, create_unit, parse_kind};
use abler_core::prelude::{CombatConfig, SkillId, Unit, UnitKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// One owned unit and its home cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruit {
    /// Archetype.
    pub kind: UnitKind,
    /// Home column.
    pub x: i32,
    /// Home row.
    pub y: i32,
    /// Item catalogue keys, at most three are equipped.
    #[serde(default)]
    pub items: Vec<String>,
    /// Learned passives.
    #[serde(default)]
    pub passives: Vec<SkillId>,
}

impl Recruit {
    /// A bare recruit with no items or passives.
    #[must_use]
    pub fn new(kind: UnitKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            items: Vec::new(),
            passives: Vec::new(),
        }
    }

    /// Build the unit with its loadout.
    ///
    /// Items past the slot limit and duplicate passives are skipped with
    /// a warning.
    pub fn build(&self) -> Result<Unit> {
        let mut unit = create_unit(self.kind)?;
        for key in &self.items {
            if !unit.add_item(create_item(key)?) {
                warn!(unit = %unit.name, item = %key, "item slots full, skipping");
            }
        }
        for &passive in &self.passives {
            if !unit.add_passive_skill(create_skill(passive)?) {
                warn!(unit = %unit.name, ?passive, "passive already learned, skipping");
            }
        }
        Ok(unit)
    }
}

/// Everything needed to start a match.
///
/// # Example RON
///
/// ```ron
/// (
///     name: "necro rush",
///     config: (max_combat_time: 45.0),
///     army: [
///         (kind: Necromancer, x: 1, y: 3, passives: [undead_horde, bone_sabers]),
///         (kind: Paladin, x: 1, y: 5, items: ["shield"]),
///     ],
///     max_rounds: 10,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSetup {
    /// Label carried into results.
    pub name: String,
    /// Combat config. Its seed is replaced per match.
    pub config: CombatConfig,
    /// The player's units.
    pub army: Vec<Recruit>,
    /// Round cap, 0 plays until the match is over.
    pub max_rounds: u32,
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            config: CombatConfig::default(),
            army: army_from_kinds(&UnitKind::PLAYABLE, &CombatConfig::default()),
            max_rounds: 0,
        }
    }
}

impl MatchSetup {
    /// Load a setup from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a setup from RON text and validate its config.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let setup: Self = ron::from_str(text)?;
        setup.config.validate()?;
        Ok(setup)
    }

    /// Replace the army with archetype tags such as `"paladin"`, laid out
    /// in the player's half.
    pub fn with_army_tags<S: AsRef<str>>(mut self, tags: &[S]) -> Result<Self> {
        let kinds = tags
            .iter()
            .map(|tag| parse_kind(tag.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.army = army_from_kinds(&kinds, &self.config);
        Ok(self)
    }
}

/// Default home cells: pairs of columns at the left edge, filling downward
/// from row 3 in steps of two. When a pair runs out of rows the next
/// pair further right is used.
#[must_use]
pub fn army_from_kinds(kinds: &[UnitKind], config: &CombatConfig) -> Vec<Recruit> {
    let rows = usize::try_from((config.height - 2) / 2).unwrap_or(0).max(1);
    kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let pair = (i / (2 * rows)) as i32;
            let x = 1 - (i % 2) as i32 + pair * 2;
            let y = 3 + ((i / 2) % rows) as i32 * 2;
            Recruit::new(kind, x.min(config.width - 1), y.min(config.height - 1).max(0))
        })
        .collect()
}
