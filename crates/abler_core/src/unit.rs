//! The unit: stats, equipment, skills and the timers its state machine runs on.
//!
//! A `Unit` is plain data. Everything that needs to look at the rest of
//! the board (attacking, casting, moving, dying) lives on
//! [`Board`](crate::board::Board) and takes a [`UnitId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::feedback::Rgb;
use crate::item::{Item, MAX_ITEMS};
use crate::math::{Fixed, Vec2Fixed};
use crate::skill::{Reaction, Skill, SkillId};
use crate::stats::Stats;
use crate::status::StatusEffect;

/// Board-scoped unit identifier. `UnitId(0)` means "not placed yet".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The human player's side.
    #[default]
    Player,
    /// The generated opposition.
    Enemy,
}

impl Team {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Team::Player => "player",
            Team::Enemy => "enemy",
        }
    }
}

/// Archetype tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Summoner of skeletons.
    Necromancer,
    /// Durable healer.
    Paladin,
    /// Area caster.
    Pyromancer,
    /// Melee bruiser.
    Berserker,
    /// Necromancer summon.
    Skeleton,
    /// What is left of a skeleton.
    BoneFragment,
    /// Any other unit created mid-combat.
    Summoned,
}

impl UnitKind {
    /// Archetypes a player can buy.
    pub const PLAYABLE: [UnitKind; 4] = [
        UnitKind::Necromancer,
        UnitKind::Paladin,
        UnitKind::Pyromancer,
        UnitKind::Berserker,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            UnitKind::Necromancer => "Necromancer",
            UnitKind::Paladin => "Paladin",
            UnitKind::Pyromancer => "Pyromancer",
            UnitKind::Berserker => "Berserker",
            UnitKind::Skeleton => "Skeleton",
            UnitKind::BoneFragment => "Bone Fragment",
            UnitKind::Summoned => "Summoned",
        }
    }

    /// Whether this kind can be bought in the shop.
    #[must_use]
    pub fn is_playable(self) -> bool {
        Self::PLAYABLE.contains(&self)
    }
}

/// Behaviour state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitState {
    /// Deciding what to do.
    #[default]
    Idle,
    /// Stepping to the next cell.
    Walking,
    /// Just swung; back to idle next frame.
    Attacking,
    /// Committed to a spell.
    Casting,
}

impl UnitState {
    /// Uppercase label for displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            UnitState::Idle => "IDLE",
            UnitState::Walking => "WALKING",
            UnitState::Attacking => "ATTACKING",
            UnitState::Casting => "CASTING",
        }
    }
}

/// Timers that only drive presentation, but still age deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cosmetics {
    /// Seconds of tint left.
    pub flash_timer: Fixed,
    /// Length of the current tint.
    pub flash_duration: Fixed,
    /// Tint colour.
    pub flash_color: Option<Rgb>,
    /// Seconds of attack lunge left.
    pub bump_timer: Fixed,
    /// Lunge offset.
    pub bump_direction: Vec2Fixed,
    /// Seconds of cast hop left.
    pub cast_jump_timer: Fixed,
}

impl Cosmetics {
    /// Start a tint.
    pub fn flash(&mut self, color: Rgb, duration: Fixed) {
        self.flash_color = Some(color);
        self.flash_timer = duration;
        self.flash_duration = duration;
    }

    /// Age every timer by `dt`, dropping the tint when it ends.
    pub fn advance(&mut self, dt: Fixed) {
        if self.flash_timer > Fixed::ZERO {
            self.flash_timer = (self.flash_timer - dt).max(Fixed::ZERO);
            if self.flash_timer == Fixed::ZERO {
                self.flash_color = None;
            }
        }
        if self.bump_timer > Fixed::ZERO {
            self.bump_timer = (self.bump_timer - dt).max(Fixed::ZERO);
        }
        if self.cast_jump_timer > Fixed::ZERO {
            self.cast_jump_timer = (self.cast_jump_timer - dt).max(Fixed::ZERO);
        }
    }
}

/// Handle to one reaction a unit carries, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Listener {
    Spell,
    Passive(usize),
    Item(usize),
    Status(usize),
}

/// A combatant.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Display name.
    pub name: String,
    /// Archetype.
    pub kind: UnitKind,
    /// Combat stats.
    pub stats: Stats,
    pub(crate) id: UnitId,
    pub(crate) team: Team,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) home: (i32, i32),
    pub(crate) hp: Fixed,
    pub(crate) spell: Option<Skill>,
    pub(crate) passives: Vec<Skill>,
    pub(crate) items: Vec<Item>,
    pub(crate) status_effects: Vec<StatusEffect>,
    pub(crate) state: UnitState,
    pub(crate) target: Option<UnitId>,
    pub(crate) attack_timer: Fixed,
    pub(crate) move_timer: Fixed,
    pub(crate) cast_timer: Fixed,
    pub(crate) cast_time: Fixed,
    pub(crate) death_timer: Fixed,
    pub(crate) summoned: bool,
    pub(crate) summoner: Option<UnitId>,
    pub(crate) cosmetics: Cosmetics,
}

impl Unit {
    /// A fresh unit at full health, not yet on any board.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: UnitKind, stats: Stats) -> Self {
        let hp = stats.max_hp;
        Self {
            name: name.into(),
            kind,
            stats,
            id: UnitId::default(),
            team: Team::default(),
            x: 0,
            y: 0,
            home: (0, 0),
            hp,
            spell: None,
            passives: Vec::new(),
            items: Vec::new(),
            status_effects: Vec::new(),
            state: UnitState::Idle,
            target: None,
            attack_timer: Fixed::ZERO,
            move_timer: Fixed::ZERO,
            cast_timer: Fixed::ZERO,
            cast_time: Fixed::ZERO,
            death_timer: Fixed::ZERO,
            summoned: false,
            summoner: None,
            cosmetics: Cosmetics::default(),
        }
    }

    /// Builder form of [`Unit::set_spell`].
    #[must_use]
    pub fn with_spell(mut self, spell: Skill) -> Self {
        self.set_spell(spell);
        self
    }

    /// Builder form of [`Unit::add_passive_skill`].
    #[must_use]
    pub fn with_passive(mut self, passive: Skill) -> Self {
        self.add_passive_skill(passive);
        self
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Board id, `UnitId(0)` before placement.
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Team, assigned on placement.
    #[must_use]
    pub fn team(&self) -> Team {
        self.team
    }

    /// Current cell.
    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Cell recorded when last placed, where the unit returns between rounds.
    #[must_use]
    pub fn home(&self) -> (i32, i32) {
        self.home
    }

    /// Current hit points.
    #[must_use]
    pub fn hp(&self) -> Fixed {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub fn max_hp(&self) -> Fixed {
        self.stats.max_hp
    }

    /// Set hit points, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: Fixed) {
        self.hp = hp.clamp(Fixed::ZERO, self.stats.max_hp.max(Fixed::ZERO));
    }

    /// Whether hit points are above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > Fixed::ZERO
    }

    /// `hp / max_hp`, for health bars.
    #[must_use]
    pub fn hp_ratio(&self) -> Fixed {
        if self.stats.max_hp <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        self.hp / self.stats.max_hp
    }

    /// Spell mana fill in `[0, 1]`; zero without a spell.
    #[must_use]
    pub fn mana_ratio(&self) -> Fixed {
        match &self.spell {
            Some(spell) if spell.mana_cost > Fixed::ZERO => spell.current_mana() / spell.mana_cost,
            _ => Fixed::ZERO,
        }
    }

    /// Behaviour state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.state
    }

    /// Current attack target.
    #[must_use]
    pub fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Seconds until the next basic attack is allowed.
    #[must_use]
    pub fn attack_timer(&self) -> Fixed {
        self.attack_timer
    }

    /// Seconds left in the current step.
    #[must_use]
    pub fn move_timer(&self) -> Fixed {
        self.move_timer
    }

    /// Seconds left in the current cast.
    #[must_use]
    pub fn cast_timer(&self) -> Fixed {
        self.cast_timer
    }

    /// Seconds left before a dead unit leaves the board.
    #[must_use]
    pub fn death_timer(&self) -> Fixed {
        self.death_timer
    }

    /// Presentation timers.
    #[must_use]
    pub fn cosmetics(&self) -> &Cosmetics {
        &self.cosmetics
    }

    /// Whether the unit was brought in by a skill mid-combat.
    #[must_use]
    pub fn is_summoned(&self) -> bool {
        self.summoned
    }

    /// Unit that summoned this one.
    #[must_use]
    pub fn summoner(&self) -> Option<UnitId> {
        self.summoner
    }

    /// Active spell.
    #[must_use]
    pub fn spell(&self) -> Option<&Skill> {
        self.spell.as_ref()
    }

    /// Mutable active spell.
    pub fn spell_mut(&mut self) -> Option<&mut Skill> {
        self.spell.as_mut()
    }

    /// Passive skills in install order.
    #[must_use]
    pub fn passives(&self) -> &[Skill] {
        &self.passives
    }

    /// Equipped items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Active status effects.
    #[must_use]
    pub fn status_effects(&self) -> &[StatusEffect] {
        &self.status_effects
    }

    // ------------------------------------------------------------------
    // Loadout
    // ------------------------------------------------------------------

    /// Install the active spell, replacing any previous one, with empty mana.
    pub fn set_spell(&mut self, mut spell: Skill) {
        spell.bind(self.id);
        spell.reset();
        self.spell = Some(spell);
    }

    /// Install a passive. Returns `false` if one with the same id is present.
    pub fn add_passive_skill(&mut self, mut passive: Skill) -> bool {
        if self.has_passive(passive.id) {
            return false;
        }
        passive.bind(self.id);
        self.passives.push(passive);
        true
    }

    /// Whether a passive with this id is installed.
    #[must_use]
    pub fn has_passive(&self, id: SkillId) -> bool {
        self.passives.iter().any(|passive| passive.id == id)
    }

    /// Equip an item. Returns `false` when all slots are full.
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.items.len() >= MAX_ITEMS {
            return false;
        }
        self.stats.apply_all(&item.stats);
        self.items.push(item);
        true
    }

    /// Unequip the item at `index`, reverting its bonuses.
    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.stats.revert_all(&item.stats);
        self.set_hp(self.hp);
        Some(item)
    }

    /// Attach a status effect, applying its stat changes.
    pub fn add_status_effect(&mut self, mut effect: StatusEffect) {
        effect.apply(self.id, &mut self.stats);
        self.status_effects.push(effect);
        self.set_hp(self.hp);
    }

    /// Detach the status effect at `index`, reverting its stat changes.
    pub fn remove_status_effect(&mut self, index: usize) -> Option<StatusEffect> {
        if index >= self.status_effects.len() {
            return None;
        }
        let mut effect = self.status_effects.remove(index);
        effect.remove(&mut self.stats);
        self.set_hp(self.hp);
        Some(effect)
    }

    /// Whether an effect with this name is attached.
    #[must_use]
    pub fn has_status(&self, name: &str) -> bool {
        self.status_effects.iter().any(|effect| effect.name == name)
    }

    /// Whether the active spell has enough mana to be cast.
    #[must_use]
    pub fn can_cast(&self) -> bool {
        self.is_alive()
            && self
                .spell
                .as_ref()
                .is_some_and(|spell| !spell.is_passive && spell.cast.is_some() && spell.is_ready())
    }

    /// Restore the unit to its start-of-round state.
    ///
    /// Every transient timer is zeroed, including the death timer; a
    /// stale one would remove the unit during the next round.
    pub fn reset(&mut self) {
        while let Some(mut effect) = self.status_effects.pop() {
            effect.remove(&mut self.stats);
        }
        self.hp = self.stats.max_hp;
        if let Some(spell) = &mut self.spell {
            spell.reset();
        }
        for passive in &mut self.passives {
            passive.reset();
        }

        self.target = None;
        self.state = UnitState::Idle;
        self.attack_timer = Fixed::ZERO;
        self.move_timer = Fixed::ZERO;
        self.cast_timer = Fixed::ZERO;
        self.cast_time = Fixed::ZERO;
        self.death_timer = Fixed::ZERO;
        self.cosmetics = Cosmetics::default();
    }

    // ------------------------------------------------------------------
    // Crate internals
    // ------------------------------------------------------------------

    /// Give the unit its board id and point every back-reference at it.
    pub(crate) fn bind(&mut self, id: UnitId) {
        self.id = id;
        if let Some(spell) = &mut self.spell {
            spell.bind(id);
        }
        for passive in &mut self.passives {
            passive.bind(id);
        }
        for effect in &mut self.status_effects {
            effect.rebind(id);
        }
    }

    /// Add hit points up to the maximum, returning the amount restored.
    pub(crate) fn restore(&mut self, amount: Fixed) -> Fixed {
        if amount <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        let before = self.hp;
        self.set_hp(self.hp + amount);
        self.hp - before
    }

    /// Add mana to the spell unless it is mid-cast.
    pub(crate) fn gain_mana(&mut self, amount: Fixed) {
        if self.state == UnitState::Casting {
            return;
        }
        if let Some(spell) = &mut self.spell {
            spell.add_mana(amount);
        }
    }

    /// Every reaction the unit carries, in dispatch order.
    pub(crate) fn listeners(&self) -> Vec<Listener> {
        let mut listeners = Vec::new();
        if self.spell.as_ref().is_some_and(|s| s.reaction.is_some()) {
            listeners.push(Listener::Spell);
        }
        listeners.extend(
            self.passives
                .iter()
                .enumerate()
                .filter(|(_, p)| p.reaction.is_some())
                .map(|(i, _)| Listener::Passive(i)),
        );
        listeners.extend(
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.reaction.is_some())
                .map(|(i, _)| Listener::Item(i)),
        );
        listeners.extend(
            self.status_effects
                .iter()
                .enumerate()
                .filter(|(_, effect)| effect.reaction.is_some())
                .map(|(i, _)| Listener::Status(i)),
        );
        listeners
    }

    /// The reaction behind a listener handle, if it still exists.
    pub(crate) fn reaction(&self, listener: Listener) -> Option<&Reaction> {
        match listener {
            Listener::Spell => self.spell.as_ref()?.reaction.as_ref(),
            Listener::Passive(i) => self.passives.get(i)?.reaction.as_ref(),
            Listener::Item(i) => self.items.get(i)?.reaction.as_ref(),
            Listener::Status(i) => self.status_effects.get(i)?.reaction.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{CastEffect, Skill, SkillId};
    use crate::stats::Stat;

    fn grunt() -> Unit {
        Unit::new("Grunt", UnitKind::Berserker, Stats::default())
    }

    fn spell(cost: i32) -> Skill {
        Skill::active(SkillId::Bloodlust, "Test", "", Fixed::ONE, Fixed::from_num(cost), 1).with_cast(
            CastEffect::SelfBuff {
                status: StatusEffect::weakness(),
            },
        )
    }

    #[test]
    fn test_new_unit_is_full_health() {
        let unit = grunt();
        assert!(unit.is_alive());
        assert_eq!(unit.hp(), Fixed::from_num(100));
        assert_eq!(unit.hp_ratio(), Fixed::ONE);
        assert_eq!(unit.state(), UnitState::Idle);
    }

    #[test]
    fn test_set_hp_clamps() {
        let mut unit = grunt();
        unit.set_hp(Fixed::from_num(500));
        assert_eq!(unit.hp(), Fixed::from_num(100));
        unit.set_hp(Fixed::from_num(-5));
        assert_eq!(unit.hp(), Fixed::ZERO);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_item_slots_are_limited() {
        let mut unit = grunt();
        for _ in 0..MAX_ITEMS {
            assert!(unit.add_item(Item::new("Axe", "", 30).with_stat(Stat::Strength, Fixed::from_num(15))));
        }
        assert!(!unit.add_item(Item::new("Axe", "", 30)));
        assert_eq!(unit.stats.strength, Fixed::from_num(45));

        let removed = unit.remove_item(0).unwrap();
        assert_eq!(removed.name, "Axe");
        assert_eq!(unit.stats.strength, Fixed::from_num(30));
        assert!(unit.remove_item(7).is_none());
    }

    #[test]
    fn test_removing_max_hp_item_clamps_hp() {
        let mut unit = grunt();
        unit.add_item(Item::new("Amulet", "", 35).with_stat(Stat::MaxHp, Fixed::from_num(30)));
        unit.set_hp(Fixed::from_num(130));
        unit.remove_item(0);
        assert_eq!(unit.hp(), Fixed::from_num(100));
    }

    #[test]
    fn test_duplicate_passive_rejected() {
        let mut unit = grunt();
        assert!(unit.add_passive_skill(Skill::passive(SkillId::BoneSabers, "Bone Sabers", "")));
        assert!(!unit.add_passive_skill(Skill::passive(SkillId::BoneSabers, "Bone Sabers", "")));
        assert!(unit.has_passive(SkillId::BoneSabers));
        assert!(!unit.has_passive(SkillId::Hunger));
    }

    #[test]
    fn test_can_cast_needs_full_mana() {
        let mut unit = grunt().with_spell(spell(100));
        assert!(!unit.can_cast());
        for _ in 0..9 {
            unit.gain_mana(Fixed::from_num(10));
        }
        assert!(!unit.can_cast());
        unit.gain_mana(Fixed::from_num(10));
        assert!(unit.can_cast());
    }

    #[test]
    fn test_no_mana_while_casting() {
        let mut unit = grunt().with_spell(spell(100));
        unit.state = UnitState::Casting;
        unit.gain_mana(Fixed::from_num(50));
        assert_eq!(unit.mana_ratio(), Fixed::ZERO);
    }

    #[test]
    fn test_reset_mid_death_revives_and_zeroes_timers() {
        let mut unit = grunt().with_spell(spell(100));
        unit.add_status_effect(StatusEffect::weakness());
        unit.gain_mana(Fixed::from_num(40));
        unit.hp = Fixed::ZERO;
        unit.death_timer = Fixed::from_num(0.5);
        unit.attack_timer = Fixed::from_num(0.3);
        unit.move_timer = Fixed::from_num(0.2);
        unit.cast_timer = Fixed::from_num(0.1);
        unit.state = UnitState::Casting;
        unit.target = Some(UnitId(9));
        unit.cosmetics.flash(Rgb::RED, Fixed::from_num(0.5));
        unit.cosmetics.bump_timer = Fixed::from_num(0.3);

        unit.reset();

        assert!(unit.is_alive());
        assert_eq!(unit.hp(), unit.max_hp());
        assert_eq!(unit.death_timer(), Fixed::ZERO);
        assert_eq!(unit.attack_timer(), Fixed::ZERO);
        assert_eq!(unit.move_timer(), Fixed::ZERO);
        assert_eq!(unit.cast_timer(), Fixed::ZERO);
        assert_eq!(unit.cosmetics(), &Cosmetics::default());
        assert_eq!(unit.state(), UnitState::Idle);
        assert_eq!(unit.target(), None);
        assert_eq!(unit.mana_ratio(), Fixed::ZERO);
        assert!(unit.status_effects().is_empty());
        assert_eq!(unit.stats.strength, Fixed::ZERO);
    }

    #[test]
    fn test_cosmetics_age_out() {
        let mut cosmetics = Cosmetics::default();
        cosmetics.flash(Rgb::WHITE, Fixed::from_num(0.2));
        cosmetics.advance(Fixed::from_num(0.1));
        assert_eq!(cosmetics.flash_color, Some(Rgb::WHITE));
        cosmetics.advance(Fixed::from_num(0.2));
        assert_eq!(cosmetics.flash_timer, Fixed::ZERO);
        assert_eq!(cosmetics.flash_color, None);
    }
}
