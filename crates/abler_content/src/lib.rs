//! # Abler Content
//!
//! Content factories for the combat engine.
//!
//! Every factory returns a fully initialised, board-independent object:
//! - [`units`] - Archetype templates loaded from embedded RON
//! - [`skills`] - The spell and passive catalogue
//! - [`items`] - The item catalogue

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod items;
pub mod skills;
pub mod units;

pub use error::{ContentError, Result};
pub use items::create_item;
pub use skills::create_skill;
pub use units::create_unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ContentError, Result};
    pub use crate::items::{all_items, create_item, item_shop};
    pub use crate::skills::{create_skill, create_skill_by_name, skill_key};
    pub use crate::units::{
        available_passives, available_units, create_unit, create_unit_by_tag, parse_kind, unit_cost, PassiveOffer,
        UnitCatalog, UnitTemplate,
    };
}
