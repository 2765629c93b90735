//! Unit archetype templates.
//!
//! Stat blocks are data: `data/units.ron` is embedded at build time and
//! parsed once. A template turns into a fresh [`Unit`] with its default
//! spell installed.

use std::collections::HashSet;
use std::sync::OnceLock;

use abler_core::prelude::{SkillId, Stats, Unit, UnitKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ContentError, Result};
use crate::skills::create_skill;

const BUILTIN_UNITS: &str = include_str!("../data/units.ron");

/// Shop price of a passive when an archetype does not list one.
pub const DEFAULT_PASSIVE_COST: u32 = 30;

/// A passive an archetype may buy, with its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveOffer {
    /// Which passive.
    pub skill: SkillId,
    /// Gold price.
    pub cost: u32,
}

/// Data-driven archetype definition.
///
/// # Example RON
///
/// ```ron
/// (
///     kind: Paladin,
///     name: "Paladin",
///     cost: 50,
///     spell: Some(holy_aura),
///     stats: (max_hp: 150.0, attack_damage: 15.0, armor: 20.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Archetype tag.
    pub kind: UnitKind,
    /// Display name.
    pub name: String,
    /// Gold price, zero for summons.
    #[serde(default)]
    pub cost: u32,
    /// Default spell.
    #[serde(default)]
    pub spell: Option<SkillId>,
    /// Passives this archetype may learn.
    #[serde(default)]
    pub passives: Vec<PassiveOffer>,
    /// Stat block.
    pub stats: Stats,
}

impl UnitTemplate {
    /// Build a fresh unit from this template.
    ///
    /// # Errors
    ///
    /// Fails if the default spell cannot be built.
    pub fn instantiate(&self) -> Result<Unit> {
        let mut unit = Unit::new(self.name.clone(), self.kind, self.stats.clone());
        if let Some(spell) = self.spell {
            unit.set_spell(create_skill(spell)?);
        }
        Ok(unit)
    }

    /// Price of a passive for this archetype.
    #[must_use]
    pub fn passive_cost(&self, skill: SkillId) -> u32 {
        self.passives
            .iter()
            .find(|offer| offer.skill == skill)
            .map_or(DEFAULT_PASSIVE_COST, |offer| offer.cost)
    }
}

/// Every known archetype template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCatalog {
    templates: Vec<UnitTemplate>,
}

impl UnitCatalog {
    /// Parse and validate a list of templates.
    ///
    /// # Errors
    ///
    /// [`ContentError::Parse`] on malformed RON, [`ContentError::Invalid`]
    /// on a duplicate archetype or a template with no hit points.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let templates: Vec<UnitTemplate> = ron::from_str(source)?;
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.kind) {
                return Err(ContentError::Invalid(format!(
                    "duplicate template for {}",
                    template.kind.label()
                )));
            }
            if template.stats.max_hp <= abler_core::math::Fixed::ZERO {
                return Err(ContentError::Invalid(format!("{} has no hit points", template.name)));
            }
        }
        debug!(templates = templates.len(), "unit catalog loaded");
        Ok(Self { templates })
    }

    /// The catalogue embedded in this crate.
    ///
    /// # Errors
    ///
    /// Only if the embedded data is broken.
    pub fn builtin() -> Result<&'static UnitCatalog> {
        static CATALOG: OnceLock<Result<UnitCatalog>> = OnceLock::new();
        CATALOG
            .get_or_init(|| Self::from_ron_str(BUILTIN_UNITS))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Template for an archetype.
    #[must_use]
    pub fn get(&self, kind: UnitKind) -> Option<&UnitTemplate> {
        self.templates.iter().find(|t| t.kind == kind)
    }

    /// Every template, in file order.
    #[must_use]
    pub fn templates(&self) -> &[UnitTemplate] {
        &self.templates
    }

    /// Build a unit of this archetype.
    ///
    /// # Errors
    ///
    /// [`ContentError::UnknownArchetype`] if there is no template.
    pub fn create(&self, kind: UnitKind) -> Result<Unit> {
        self.get(kind)
            .ok_or_else(|| ContentError::UnknownArchetype(kind.label().to_string()))?
            .instantiate()
    }
}

/// Build a unit of this archetype from the built-in catalogue.
///
/// # Errors
///
/// [`ContentError::UnknownArchetype`] if the archetype has no template.
pub fn create_unit(kind: UnitKind) -> Result<Unit> {
    UnitCatalog::builtin()?.create(kind)
}

/// Build a unit from a tag such as `"necromancer"` or `"Bone Fragment"`.
///
/// # Errors
///
/// [`ContentError::UnknownArchetype`] if the tag names no archetype.
pub fn create_unit_by_tag(tag: &str) -> Result<Unit> {
    create_unit(parse_kind(tag)?)
}

/// Resolve an archetype tag, ignoring case, spaces and underscores.
///
/// # Errors
///
/// [`ContentError::UnknownArchetype`] if nothing matches.
pub fn parse_kind(tag: &str) -> Result<UnitKind> {
    let wanted = normalize(tag);
    [
        UnitKind::Necromancer,
        UnitKind::Paladin,
        UnitKind::Pyromancer,
        UnitKind::Berserker,
        UnitKind::Skeleton,
        UnitKind::BoneFragment,
    ]
    .into_iter()
    .find(|kind| normalize(kind.label()) == wanted)
    .ok_or_else(|| ContentError::UnknownArchetype(tag.to_string()))
}

fn normalize(tag: &str) -> String {
    tag.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Archetypes a player can buy.
#[must_use]
pub fn available_units() -> &'static [UnitKind] {
    &UnitKind::PLAYABLE
}

/// Gold price of an archetype, 0 if it has no template.
#[must_use]
pub fn unit_cost(kind: UnitKind) -> u32 {
    UnitCatalog::builtin()
        .ok()
        .and_then(|catalog| catalog.get(kind))
        .map_or(0, |template| template.cost)
}

/// Passives an archetype may learn.
#[must_use]
pub fn available_passives(kind: UnitKind) -> Vec<SkillId> {
    UnitCatalog::builtin()
        .ok()
        .and_then(|catalog| catalog.get(kind))
        .map(|template| template.passives.iter().map(|offer| offer.skill).collect())
        .unwrap_or_default()
}
