//! Active spells, passive skills and the reactions they carry.
//!
//! A [`Skill`] is data plus a set of optional capabilities: a cast
//! effect, a periodic aura, an event reaction, a summon upgrade. The
//! board executes whichever capabilities a skill declares; nothing is
//! probed at runtime.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{Board, DIRECTIONS};
use crate::combat::{scaling, DamageType};
use crate::events::{DeathRecord, GameEvent};
use crate::feedback::VisualEffectKind;
use crate::math::{chebyshev, Fixed, Vec2Fixed};
use crate::projectile::Projectile;
use crate::status::StatusEffect;
use crate::unit::{Team, Unit, UnitId, UnitKind};

/// Closed set of skill identities, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    /// Necromancer spell.
    SummonSkeleton,
    /// Paladin healing aura.
    HolyAura,
    /// Pyromancer area spell.
    Fireball,
    /// Berserker self-buff.
    Bloodlust,
    /// Spell granted to skeletons by Hunger.
    LifeDrain,
    /// Summons gain Life Drain.
    Hunger,
    /// Dying skeletons fire shards.
    BoneShards,
    /// Summon two skeletons per cast.
    UndeadHorde,
    /// Summons gain Fire Aura.
    BurningBones,
    /// Aura granted to skeletons by Burning Bones.
    FireAura,
    /// Enemy deaths chill a neighbour.
    GraveChill,
    /// Dying skeletons leave a fragment.
    BoneFragments,
    /// Summons hit harder.
    BoneSabers,
}

/// Which side a targeting query looks at, relative to the caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetTeam {
    /// The opposing roster.
    Enemies,
    /// The caster's roster, including the caster.
    Allies,
    /// Everyone.
    Any,
}

impl TargetTeam {
    fn matches(self, caster: Team, other: Team) -> bool {
        match self {
            TargetTeam::Enemies => caster != other,
            TargetTeam::Allies => caster == other,
            TargetTeam::Any => true,
        }
    }
}

/// What a spell does when its cast completes.
#[derive(Debug, Clone)]
pub enum CastEffect {
    /// Bring copies of a unit onto the board next to the caster.
    Summon {
        /// Unit cloned for each summon.
        prototype: Box<Unit>,
        /// Cast only while the caster has fewer living summons of this kind.
        max_active: usize,
    },
    /// Lob an exploding projectile at the first enemy in range.
    AreaProjectile {
        /// Base damage, scaled by the caster's intelligence.
        damage: Fixed,
        /// Damage category.
        damage_type: DamageType,
        /// Explosion radius in cells.
        radius: i32,
        /// Flight speed in cells per second.
        speed: Fixed,
    },
    /// Put a status effect on the caster, unless it already has one by that name.
    SelfBuff {
        /// Effect to apply.
        status: StatusEffect,
    },
    /// Damage the first enemy in range and heal for part of what was dealt.
    Drain {
        /// Damage before mitigation.
        damage: Fixed,
        /// Damage category.
        damage_type: DamageType,
        /// Fraction of dealt damage returned as healing.
        heal_fraction: Fixed,
    },
}

/// What an aura does each pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuraEffect {
    /// Heal allies in range.
    HealAllies,
    /// Damage enemies in range.
    DamageEnemies(DamageType),
}

/// A periodic effect around the skill's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aura {
    /// Heal or damage.
    pub effect: AuraEffect,
    /// Amount per pulse.
    pub amount: Fixed,
    /// Reach in cells.
    pub radius: i32,
    /// Seconds between pulses.
    pub interval: Fixed,
    /// Marker dropped on each affected cell.
    pub marker: Option<VisualEffectKind>,
    timer: Fixed,
}

impl Aura {
    /// A new aura with an empty pulse timer.
    #[must_use]
    pub fn new(effect: AuraEffect, amount: Fixed, radius: i32, interval: Fixed) -> Self {
        Self {
            effect,
            amount,
            radius,
            interval,
            marker: None,
            timer: Fixed::ZERO,
        }
    }

    /// Drop a marker on affected cells.
    #[must_use]
    pub fn with_marker(mut self, marker: VisualEffectKind) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Advance the timer and return how many pulses are due.
    fn advance(&mut self, dt: Fixed) -> u32 {
        if self.interval <= Fixed::ZERO {
            return 0;
        }
        self.timer += dt;
        let mut pulses = 0;
        while self.timer >= self.interval {
            self.timer -= self.interval;
            pulses += 1;
        }
        pulses
    }
}

/// An event reaction carried by a skill, item or status effect.
#[derive(Debug, Clone)]
pub enum Reaction {
    /// When one of the owner's summoned skeletons dies, it fires shards
    /// at the nearest enemies.
    BoneShards {
        /// Damage per shard.
        damage: Fixed,
        /// How many enemies are targeted.
        max_targets: usize,
        /// Search range from the dead skeleton.
        range: i32,
        /// Shard speed.
        speed: Fixed,
    },
    /// When an enemy of the owner dies, a random unit of its team near
    /// the corpse takes a fraction of its max hp as magical damage.
    GraveChill {
        /// Search radius around the corpse.
        radius: i32,
        /// Fraction of the dead unit's max hp dealt.
        max_hp_fraction: Fixed,
    },
    /// When one of the owner's summoned skeletons dies, a fragment takes
    /// the nearest free cell.
    BoneFragments {
        /// Unit cloned for each fragment.
        fragment: Box<Unit>,
    },
}

impl Reaction {
    /// Whether this reaction cares about the event at all.
    #[must_use]
    pub fn listens_to(&self, event: &GameEvent) -> bool {
        matches!(event, GameEvent::Death { .. })
    }
}

/// How a passive changes the units its owner summons.
#[derive(Debug, Clone)]
pub enum SummonUpgrade {
    /// Additional summons per cast.
    ExtraSummons(usize),
    /// Flat attack damage on each summon.
    BonusAttackDamage(Fixed),
    /// Summons get this spell.
    GrantSpell(Box<Skill>),
    /// Summons get this passive.
    GrantPassive(Box<Skill>),
}

impl SummonUpgrade {
    fn apply(&self, minion: &mut Unit) {
        match self {
            SummonUpgrade::ExtraSummons(_) => {}
            SummonUpgrade::BonusAttackDamage(amount) => minion.stats.attack_damage += *amount,
            SummonUpgrade::GrantSpell(spell) => minion.set_spell(spell.as_ref().clone()),
            SummonUpgrade::GrantPassive(passive) => {
                minion.add_passive_skill(passive.as_ref().clone());
            }
        }
    }
}

/// An active spell or a passive skill.
#[derive(Debug, Clone)]
pub struct Skill {
    /// Identity.
    pub id: SkillId,
    /// Display name.
    pub name: String,
    /// Tooltip text.
    pub description: String,
    /// Passives never cast.
    pub is_passive: bool,
    /// Seconds the caster is committed.
    pub cast_time: Fixed,
    /// Mana needed to cast.
    pub mana_cost: Fixed,
    /// Targeting range in cells.
    pub range: i32,
    /// Effect on cast completion.
    pub cast: Option<CastEffect>,
    /// Periodic effect while attached.
    pub aura: Option<Aura>,
    /// Event reaction while attached.
    pub reaction: Option<Reaction>,
    /// Change applied to the owner's summons.
    pub upgrade: Option<SummonUpgrade>,
    current_mana: Fixed,
    owner: Option<UnitId>,
}

impl Skill {
    /// An active spell with no effect attached yet.
    #[must_use]
    pub fn active(
        id: SkillId,
        name: impl Into<String>,
        description: impl Into<String>,
        cast_time: Fixed,
        mana_cost: Fixed,
        range: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            is_passive: false,
            cast_time,
            mana_cost,
            range,
            cast: None,
            aura: None,
            reaction: None,
            upgrade: None,
            current_mana: Fixed::ZERO,
            owner: None,
        }
    }

    /// A passive: no cast time, no mana.
    #[must_use]
    pub fn passive(id: SkillId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            is_passive: true,
            ..Self::active(id, name, description, Fixed::ZERO, Fixed::ZERO, 0)
        }
    }

    /// Set the cast effect.
    #[must_use]
    pub fn with_cast(mut self, cast: CastEffect) -> Self {
        self.cast = Some(cast);
        self
    }

    /// Set the aura.
    #[must_use]
    pub fn with_aura(mut self, aura: Aura) -> Self {
        self.aura = Some(aura);
        self
    }

    /// Set the event reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reaction = Some(reaction);
        self
    }

    /// Set the summon upgrade.
    #[must_use]
    pub fn with_upgrade(mut self, upgrade: SummonUpgrade) -> Self {
        self.upgrade = Some(upgrade);
        self
    }

    /// Mana stored so far.
    #[must_use]
    pub fn current_mana(&self) -> Fixed {
        self.current_mana
    }

    /// Add mana, capped at the cost.
    pub fn add_mana(&mut self, amount: Fixed) {
        if self.current_mana < self.mana_cost {
            self.current_mana = (self.current_mana + amount).min(self.mana_cost);
        }
    }

    /// Whether enough mana is stored.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.current_mana >= self.mana_cost
    }

    /// Unit the skill is installed on.
    #[must_use]
    pub fn owner(&self) -> Option<UnitId> {
        self.owner
    }

    /// Empty the mana pool and restart any aura.
    pub fn reset(&mut self) {
        self.current_mana = Fixed::ZERO;
        if let Some(aura) = &mut self.aura {
            aura.timer = Fixed::ZERO;
        }
    }

    pub(crate) fn bind(&mut self, owner: UnitId) {
        self.owner = Some(owner);
    }

    pub(crate) fn spend_mana(&mut self) {
        self.current_mana = Fixed::ZERO;
    }
}

// ----------------------------------------------------------------------------
// Board-side execution
// ----------------------------------------------------------------------------

impl Board {
    /// Living units within `max_range` of the caster on the requested side,
    /// in roster order.
    #[must_use]
    pub fn valid_targets(&self, caster: UnitId, team: TargetTeam, max_range: i32) -> Vec<UnitId> {
        let Some(unit) = self.unit(caster) else {
            return Vec::new();
        };
        self.targets_in_area(caster, unit.position(), max_range, team)
    }

    /// Living units within `radius` of `center` on the requested side
    /// relative to the caster, in roster order.
    #[must_use]
    pub fn targets_in_area(
        &self,
        caster: UnitId,
        center: (i32, i32),
        radius: i32,
        team: TargetTeam,
    ) -> Vec<UnitId> {
        let Some(side) = self.unit(caster).map(Unit::team) else {
            return Vec::new();
        };
        self.all_units()
            .into_iter()
            .filter_map(|id| self.unit(id))
            .filter(|u| u.is_alive() && team.matches(side, u.team()))
            .filter(|u| chebyshev(center, u.position()) <= radius)
            .map(Unit::id)
            .collect()
    }

    /// First free cell around `(x, y)` in the fixed direction order.
    #[must_use]
    pub fn find_summon_position(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        DIRECTIONS
            .iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .find(|&(nx, ny)| self.is_free(nx, ny))
    }

    /// Place `minion` on the summoner's team, marked as summoned by them.
    ///
    /// Returns `None` if the summoner is gone or the cell is unusable.
    pub fn summon_minion(&mut self, summoner: UnitId, mut minion: Unit, x: i32, y: i32) -> Option<UnitId> {
        let team = self.unit(summoner)?.team();
        minion.summoned = true;
        minion.summoner = Some(summoner);
        match self.add(minion, x, y, team) {
            Ok(id) => {
                debug!(summoner = %summoner, minion = %id, x, y, "minion summoned");
                self.raise_event(GameEvent::MinionSummoned { summoner, minion: id });
                Some(id)
            }
            Err(err) => {
                warn!(summoner = %summoner, %err, "summon failed");
                None
            }
        }
    }

    /// Living units on the board summoned by `summoner` with this kind.
    #[must_use]
    pub fn living_summons(&self, summoner: UnitId, kind: UnitKind) -> usize {
        self.all_units()
            .into_iter()
            .filter_map(|id| self.unit(id))
            .filter(|u| u.is_alive() && u.kind == kind && u.summoner == Some(summoner))
            .count()
    }

    /// The spell's own readiness predicate.
    #[must_use]
    pub fn should_cast(&self, caster: UnitId) -> bool {
        let Some(unit) = self.unit(caster) else {
            return false;
        };
        let Some(spell) = unit.spell() else {
            return false;
        };
        match &spell.cast {
            None => false,
            Some(CastEffect::Summon { prototype, max_active }) => {
                self.living_summons(caster, prototype.kind) < *max_active
            }
            Some(CastEffect::AreaProjectile { .. } | CastEffect::Drain { .. }) => {
                !self.valid_targets(caster, TargetTeam::Enemies, spell.range).is_empty()
            }
            Some(CastEffect::SelfBuff { status }) => !unit.has_status(&status.name),
        }
    }

    /// Run the caster's spell effect.
    pub(crate) fn execute_spell(&mut self, caster: UnitId) {
        let Some(unit) = self.unit(caster) else {
            return;
        };
        let Some(spell) = unit.spell() else {
            return;
        };
        let Some(effect) = spell.cast.clone() else {
            return;
        };
        let range = spell.range;
        let intelligence = unit.stats.intelligence;

        match effect {
            CastEffect::Summon { prototype, .. } => self.cast_summon(caster, &prototype),
            CastEffect::AreaProjectile {
                damage,
                damage_type,
                radius,
                speed,
            } => {
                let Some(target) = self.valid_targets(caster, TargetTeam::Enemies, range).first().copied() else {
                    return;
                };
                let (Some(source), Some(victim)) = (self.unit(caster), self.unit(target)) else {
                    return;
                };
                let (tx, ty) = victim.position();
                let projectile = Projectile::area(source, Vec2Fixed::from_cell(tx, ty), radius, speed)
                    .with_damage(damage * scaling(intelligence), damage_type);
                self.add_projectile(projectile);
            }
            CastEffect::SelfBuff { status } => {
                self.add_status_effect(caster, status.with_source(caster));
            }
            CastEffect::Drain {
                damage,
                damage_type,
                heal_fraction,
            } => {
                let Some(target) = self.valid_targets(caster, TargetTeam::Enemies, range).first().copied() else {
                    return;
                };
                let dealt = self.take_damage(target, damage, damage_type, Some(caster)).unwrap_or(Fixed::ZERO);
                if dealt > Fixed::ZERO {
                    self.heal(caster, dealt * heal_fraction, Some(caster));
                }
            }
        }
    }

    fn cast_summon(&mut self, caster: UnitId, prototype: &Unit) {
        let Some(unit) = self.unit(caster) else {
            return;
        };
        let upgrades: Vec<SummonUpgrade> = unit.passives().iter().filter_map(|p| p.upgrade.clone()).collect();
        let count = 1 + upgrades
            .iter()
            .map(|upgrade| match upgrade {
                SummonUpgrade::ExtraSummons(extra) => *extra,
                _ => 0,
            })
            .sum::<usize>();
        let (cx, cy) = unit.position();

        for _ in 0..count {
            let Some((x, y)) = self.find_summon_position(cx, cy) else {
                warn!(unit = %caster, "no free cell to summon into");
                break;
            };
            let mut minion = prototype.clone();
            for upgrade in &upgrades {
                upgrade.apply(&mut minion);
            }
            if self.summon_minion(caster, minion, x, y).is_some() {
                self.add_visual_effect(VisualEffectKind::Dark, x, y);
            }
        }
    }

    /// Pulse every aura on the unit's spell and passives that is due.
    pub(crate) fn advance_skills(&mut self, id: UnitId, dt: Fixed) {
        let mut due: Vec<(Aura, u32)> = Vec::new();
        {
            let Some(unit) = self.units.get_mut(&id) else {
                return;
            };
            let skills = unit.spell.iter_mut().chain(unit.passives.iter_mut());
            for skill in skills {
                if let Some(aura) = &mut skill.aura {
                    let pulses = aura.advance(dt);
                    if pulses > 0 {
                        due.push((aura.clone(), pulses));
                    }
                }
            }
        }

        for (aura, pulses) in due {
            for _ in 0..pulses {
                if !self.is_alive(id) {
                    return;
                }
                self.pulse_aura(id, &aura);
            }
        }
    }

    fn pulse_aura(&mut self, owner: UnitId, aura: &Aura) {
        let side = match aura.effect {
            AuraEffect::HealAllies => TargetTeam::Allies,
            AuraEffect::DamageEnemies(_) => TargetTeam::Enemies,
        };
        for target in self.valid_targets(owner, side, aura.radius) {
            match aura.effect {
                AuraEffect::HealAllies => {
                    self.heal(target, aura.amount, Some(owner));
                }
                AuraEffect::DamageEnemies(damage_type) => {
                    self.take_damage(target, aura.amount, damage_type, Some(owner));
                }
            }
            if let (Some(marker), Some(unit)) = (aura.marker, self.unit(target)) {
                let (x, y) = unit.position();
                self.add_visual_effect(marker, x, y);
            }
        }
    }

    /// Run one reaction for its owner. No-op if the owner is dead or gone.
    pub(crate) fn react(&mut self, owner: UnitId, reaction: &Reaction, event: &GameEvent) {
        let Some(owner_team) = self.unit(owner).filter(|u| u.is_alive()).map(Unit::team) else {
            return;
        };
        let Some(dying) = event.death() else {
            return;
        };

        match reaction {
            Reaction::BoneShards {
                damage,
                max_targets,
                range,
                speed,
            } => {
                if is_own_skeleton(dying, owner) {
                    self.fire_bone_shards(dying, *damage, *max_targets, *range, *speed);
                }
            }
            Reaction::GraveChill { radius, max_hp_fraction } => {
                if dying.team != owner_team {
                    self.grave_chill(owner, dying, *radius, *max_hp_fraction);
                }
            }
            Reaction::BoneFragments { fragment } => {
                if is_own_skeleton(dying, owner) {
                    self.spawn_fragment(owner, dying, fragment);
                }
            }
        }
    }

    fn fire_bone_shards(&mut self, skeleton: &DeathRecord, damage: Fixed, max_targets: usize, range: i32, speed: Fixed) {
        let origin = (skeleton.x, skeleton.y);
        let mut targets: Vec<(i32, UnitId)> = self
            .units_in_range(skeleton.x, skeleton.y, range, Some(skeleton.team.opponent()))
            .into_iter()
            .filter_map(|id| self.unit(id).map(|u| (chebyshev(origin, u.position()), id)))
            .collect();
        targets.sort_by_key(|(distance, _)| *distance);

        for (_, target) in targets.into_iter().take(max_targets) {
            let projectile = Projectile::new(
                skeleton.unit,
                skeleton.team,
                Vec2Fixed::from_cell(skeleton.x, skeleton.y),
                target,
                speed,
            )
            .with_damage(damage, DamageType::Physical);
            self.add_projectile(projectile);
        }
        debug!(unit = %skeleton.unit, "bone shards fired");
    }

    fn grave_chill(&mut self, owner: UnitId, dying: &DeathRecord, radius: i32, fraction: Fixed) {
        let candidates: Vec<UnitId> = self
            .units_in_range(dying.x, dying.y, radius, Some(dying.team))
            .into_iter()
            .filter(|id| *id != dying.unit)
            .collect();
        let Some(&target) = self.rng.choose(&candidates) else {
            return;
        };
        self.take_damage(target, dying.max_hp * fraction, DamageType::Magical, Some(owner));
        if let Some(unit) = self.unit(target) {
            let (x, y) = unit.position();
            self.add_visual_effect(VisualEffectKind::Ice, x, y);
        }
    }

    fn spawn_fragment(&mut self, owner: UnitId, skeleton: &DeathRecord, fragment: &Unit) {
        let cell = if self.is_free(skeleton.x, skeleton.y) {
            Some((skeleton.x, skeleton.y))
        } else {
            self.find_summon_position(skeleton.x, skeleton.y)
        };
        let Some((x, y)) = cell else {
            warn!(unit = %skeleton.unit, "no free cell for bone fragment");
            return;
        };
        let summoner = skeleton.summoner.unwrap_or(owner);
        self.summon_minion(summoner, fragment.clone(), x, y);
    }
}

fn is_own_skeleton(dying: &DeathRecord, owner: UnitId) -> bool {
    dying.kind == UnitKind::Skeleton && dying.summoned && dying.summoner == Some(owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mana_caps_at_cost() {
        let mut skill = Skill::active(SkillId::Fireball, "Fireball", "", Fixed::ONE, Fixed::from_num(100), 6);
        skill.add_mana(Fixed::from_num(70));
        skill.add_mana(Fixed::from_num(70));
        assert_eq!(skill.current_mana(), Fixed::from_num(100));
        assert!(skill.is_ready());
        skill.spend_mana();
        assert!(!skill.is_ready());
    }

    #[test]
    fn test_passive_has_no_cost() {
        let skill = Skill::passive(SkillId::Hunger, "Hunger", "");
        assert!(skill.is_passive);
        assert_eq!(skill.mana_cost, Fixed::ZERO);
        assert_eq!(skill.cast_time, Fixed::ZERO);
    }

    #[test]
    fn test_aura_pulses_on_interval() {
        let mut aura = Aura::new(AuraEffect::HealAllies, Fixed::from_num(3), 2, Fixed::ONE);
        assert_eq!(aura.advance(Fixed::from_num(0.75)), 0);
        assert_eq!(aura.advance(Fixed::from_num(0.75)), 1);
        assert_eq!(aura.advance(Fixed::from_num(2)), 2);
    }

    #[test]
    fn test_reset_restarts_aura_and_mana() {
        let mut skill = Skill::active(SkillId::HolyAura, "Holy Aura", "", Fixed::ZERO, Fixed::ZERO, 2)
            .with_aura(Aura::new(AuraEffect::HealAllies, Fixed::from_num(3), 2, Fixed::ONE));
        if let Some(aura) = &mut skill.aura {
            aura.advance(Fixed::from_num(0.5));
        }
        skill.reset();
        assert_eq!(skill.aura.as_ref().map(|a| a.timer), Some(Fixed::ZERO));
    }

    #[test]
    fn test_target_team_matching() {
        assert!(TargetTeam::Enemies.matches(Team::Player, Team::Enemy));
        assert!(!TargetTeam::Enemies.matches(Team::Player, Team::Player));
        assert!(TargetTeam::Allies.matches(Team::Enemy, Team::Enemy));
        assert!(TargetTeam::Any.matches(Team::Enemy, Team::Player));
    }
}
