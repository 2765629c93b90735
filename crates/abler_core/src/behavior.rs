//! The per-unit state machine and the actions it takes.
//!
//! Each frame a living unit regenerates, ticks its skills and status
//! effects, finishes whatever multi-frame action it was in, and then, if
//! idle and off cooldown, picks exactly one of: cast, attack, step.

use tracing::debug;

use crate::board::{Board, Corpse};
use crate::combat::{attack_interval, basic_attack_damage, mitigated_damage, DamageType};
use crate::events::{DeathRecord, GameEvent};
use crate::feedback::Rgb;
use crate::math::{chebyshev, Fixed, Vec2Fixed};
use crate::projectile::Projectile;
use crate::status::{StatusEffect, TickEffect};
use crate::unit::{UnitId, UnitState};

const HIT_FLASH: Fixed = Fixed::lit("0.2");
const BUMP_TIME: Fixed = Fixed::lit("0.3");
const BUMP_REACH: Fixed = Fixed::lit("0.6");

impl Board {
    /// Run one frame of a unit's behaviour.
    pub(crate) fn advance_unit(&mut self, id: UnitId, dt: Fixed) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        unit.cosmetics.advance(dt);

        if unit.death_timer > Fixed::ZERO {
            unit.death_timer = (unit.death_timer - dt).max(Fixed::ZERO);
            if unit.death_timer == Fixed::ZERO {
                self.remove(id);
            }
            return;
        }
        if !unit.is_alive() {
            return;
        }

        let regen = unit.stats.hp_regen * dt;
        unit.restore(regen);
        let mana = unit.stats.mana_regen * dt;
        unit.gain_mana(mana);
        unit.attack_timer = (unit.attack_timer - dt).max(Fixed::ZERO);

        self.advance_skills(id, dt);
        self.advance_status_effects(id, dt);

        let Some(unit) = self.units.get_mut(&id).filter(|u| u.is_alive()) else {
            return;
        };
        match unit.state {
            UnitState::Casting => {
                unit.cast_timer += dt;
                if unit.cast_timer >= unit.cast_time {
                    self.finish_cast(id);
                }
            }
            UnitState::Attacking => unit.state = UnitState::Idle,
            UnitState::Walking => {
                unit.move_timer = (unit.move_timer - dt).max(Fixed::ZERO);
                if unit.move_timer == Fixed::ZERO {
                    unit.state = UnitState::Idle;
                }
            }
            UnitState::Idle => {}
        }

        if self.units.get(&id).is_some_and(|u| u.is_alive() && u.state == UnitState::Idle) {
            self.decide(id);
        }
    }

    /// Idle decision: cast, else attack, else step toward the nearest enemy.
    fn decide(&mut self, id: UnitId) {
        let Some(unit) = self.unit(id) else {
            return;
        };
        if unit.attack_timer > Fixed::ZERO {
            return;
        }
        let current_target = unit.target;

        if self.try_cast_spell(id) {
            return;
        }

        if let Some(target) = current_target {
            if self.can_attack(id, target) {
                self.attack(id, target);
                return;
            }
        }

        let Some(team) = self.unit(id).map(|u| u.team()) else {
            return;
        };
        let in_range = self
            .roster(team.opponent())
            .iter()
            .copied()
            .find(|&enemy| self.can_attack(id, enemy));
        match in_range {
            Some(enemy) => self.attack(id, enemy),
            None => {
                if let Some(nearest) = self.nearest_enemy(id) {
                    self.move_towards(id, nearest);
                }
            }
        }
    }

    /// Whether `attacker` could hit `target` right now.
    #[must_use]
    pub fn can_attack(&self, attacker: UnitId, target: UnitId) -> bool {
        let (Some(a), Some(t)) = (self.unit(attacker), self.unit(target)) else {
            return false;
        };
        a.is_alive()
            && t.is_alive()
            && a.team() != t.team()
            && chebyshev(a.position(), t.position()) <= a.stats.range_cells()
    }

    /// Perform a basic attack. Adjacent targets take damage directly;
    /// anything farther gets a projectile.
    pub fn attack(&mut self, attacker: UnitId, target: UnitId) {
        let (Some(a), Some(t)) = (self.unit(attacker), self.unit(target)) else {
            return;
        };
        let damage = basic_attack_damage(&a.stats);
        let cooldown = attack_interval(&a.stats);
        let distance = chebyshev(a.position(), t.position());
        let (ax, ay) = a.position();
        let (tx, ty) = t.position();
        let attack_mana = self.config.attack_mana;
        let projectile = (distance > 1).then(|| {
            Projectile::from_unit(a, target, self.config.projectile_speed).with_damage(damage, DamageType::Physical)
        });

        if let Some(unit) = self.units.get_mut(&attacker) {
            unit.target = Some(target);
            unit.state = UnitState::Attacking;
            unit.attack_timer = cooldown;
            unit.gain_mana(attack_mana);
            unit.cosmetics.bump_timer = BUMP_TIME;
            unit.cosmetics.bump_direction = Vec2Fixed::new(
                Fixed::from_num((tx - ax).signum()) * BUMP_REACH,
                Fixed::from_num((ty - ay).signum()) * BUMP_REACH,
            );
        }
        debug!(attacker = %attacker, target = %target, distance, "attack");

        match projectile {
            Some(projectile) => self.add_projectile(projectile),
            None => {
                self.take_damage(target, damage, DamageType::Physical, Some(attacker));
            }
        }

        self.raise_event(GameEvent::UnitAttack {
            attacker,
            target,
            damage,
        });
    }

    /// Cast the spell if it is affordable and its predicate agrees.
    pub fn try_cast_spell(&mut self, id: UnitId) -> bool {
        let can_cast = self
            .unit(id)
            .is_some_and(|u| u.state == UnitState::Idle && u.can_cast());
        if !can_cast || !self.should_cast(id) {
            return false;
        }
        self.begin_cast(id)
    }

    fn begin_cast(&mut self, id: UnitId) -> bool {
        let Some(unit) = self.units.get_mut(&id) else {
            return false;
        };
        let Some((skill, name, cast_time)) = unit.spell.as_ref().map(|s| (s.id, s.name.clone(), s.cast_time)) else {
            return false;
        };
        unit.state = UnitState::Casting;
        unit.cast_timer = Fixed::ZERO;
        unit.cast_time = cast_time;
        unit.cosmetics.flash(Rgb::PURPLE, cast_time);
        let (x, y) = unit.position();
        let caster_name = unit.name.clone();

        debug!(unit = %id, spell = %name, "cast started");
        self.add_floater(x, y, format!("Casting {name}..."), Rgb::PURPLE);
        self.log.push(format!("{caster_name} begins casting {name}"));
        self.raise_event(GameEvent::SpellCast { caster: id, skill });
        true
    }

    fn finish_cast(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let Some((skill, name)) = unit.spell.as_ref().map(|s| (s.id, s.name.clone())) else {
            unit.state = UnitState::Idle;
            return;
        };
        unit.cosmetics.cast_jump_timer = BUMP_TIME;
        let (x, y) = unit.position();
        let caster_name = unit.name.clone();

        debug!(unit = %id, spell = %name, "cast resolved");
        self.add_floater(x, y, format!("Casts {name}!"), Rgb::PURPLE);
        self.log.push(format!("{caster_name} casts {name}!"));
        self.execute_spell(id);

        if let Some(unit) = self.units.get_mut(&id) {
            if let Some(spell) = &mut unit.spell {
                spell.spend_mana();
            }
            unit.state = UnitState::Idle;
            unit.cast_timer = Fixed::ZERO;
        }
        self.raise_event(GameEvent::SpellResolved { caster: id, skill });
    }

    /// Take one step along the shortest path toward `target`.
    pub fn move_towards(&mut self, id: UnitId, target: UnitId) {
        let (Some(unit), Some(goal)) = (self.unit(id), self.unit(target)) else {
            return;
        };
        if unit.state != UnitState::Idle {
            return;
        }
        let move_speed = unit.stats.move_speed;
        let path = self.find_path(unit.position(), goal.position());
        let Some(&(nx, ny)) = path.get(1) else {
            return;
        };
        if self.move_unit(id, nx, ny).is_err() {
            return;
        }
        if let Some(unit) = self.units.get_mut(&id) {
            unit.state = UnitState::Walking;
            unit.move_timer = if move_speed > Fixed::ZERO {
                Fixed::ONE / move_speed
            } else {
                Fixed::ONE
            };
        }
    }

    /// Apply damage after mitigation. Returns the damage dealt, or `None`
    /// if the target was dead or gone.
    pub fn take_damage(
        &mut self,
        target: UnitId,
        amount: Fixed,
        damage_type: DamageType,
        source: Option<UnitId>,
    ) -> Option<Fixed> {
        let mana_fraction = self.config.damage_mana_fraction;
        let source_name = source
            .and_then(|s| self.unit(s))
            .map_or_else(|| "Unknown".to_string(), |u| u.name.clone());
        let unit = self.units.get_mut(&target).filter(|u| u.is_alive())?;

        unit.gain_mana(amount * mana_fraction);
        let dealt = mitigated_damage(amount, damage_type, &unit.stats);
        unit.hp -= dealt;
        unit.cosmetics.flash(Rgb::WHITE, HIT_FLASH);
        let died = unit.hp <= Fixed::ZERO;
        if died {
            unit.hp = Fixed::ZERO;
        }
        let (x, y) = unit.position();
        let victim_name = unit.name.clone();

        let whole: i64 = dealt.to_num();
        self.add_floater(x, y, whole.to_string(), Rgb::for_damage(damage_type));
        self.log.push(format!(
            "{source_name} dealt {whole} {} damage to {victim_name}",
            damage_type.label()
        ));
        self.raise_event(GameEvent::DamageTaken {
            unit: target,
            amount: dealt,
            damage_type,
            source,
        });

        if died {
            self.die(target, source);
        }
        Some(dealt)
    }

    /// Heal up to max hp. Returns the amount actually restored, or `None`
    /// if the target was dead or gone.
    pub fn heal(&mut self, target: UnitId, amount: Fixed, source: Option<UnitId>) -> Option<Fixed> {
        let unit = self.units.get_mut(&target).filter(|u| u.is_alive())?;
        let healed = unit.restore(amount);
        if healed > Fixed::ZERO {
            let (x, y) = unit.position();
            let whole: i64 = healed.to_num();
            self.add_floater(x, y, format!("+{whole}"), Rgb::GREEN);
        }
        self.raise_event(GameEvent::UnitHealed {
            unit: target,
            amount: healed,
            source,
        });
        Some(healed)
    }

    /// Start the death window, leave a corpse and announce the death.
    pub fn die(&mut self, id: UnitId, killer: Option<UnitId>) {
        let death_duration = self.config.death_duration;
        let killer_name = killer
            .and_then(|k| self.unit(k))
            .map_or_else(|| "Unknown".to_string(), |u| u.name.clone());
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        if unit.death_timer > Fixed::ZERO {
            return;
        }
        unit.hp = Fixed::ZERO;
        unit.death_timer = death_duration;
        unit.state = UnitState::Idle;
        unit.cosmetics.flash(Rgb::RED, death_duration);

        let record = DeathRecord {
            unit: id,
            team: unit.team(),
            kind: unit.kind,
            summoned: unit.summoned,
            summoner: unit.summoner,
            x: unit.x,
            y: unit.y,
            max_hp: unit.max_hp(),
        };
        let corpse = Corpse::of(unit);
        let name = unit.name.clone();

        debug!(unit = %id, killer = ?killer, "unit died");
        self.log.push(format!("{name} is slain by {killer_name}"));
        self.add_corpse(corpse);
        self.raise_event(GameEvent::UnitDeath { unit: id, killer });
        self.raise_event(GameEvent::Death { dying: record, killer });
    }

    /// Attach a status effect to a unit on the board.
    pub fn add_status_effect(&mut self, target: UnitId, effect: StatusEffect) {
        if let Some(unit) = self.units.get_mut(&target) {
            debug!(unit = %target, effect = %effect.name, "status applied");
            unit.add_status_effect(effect);
        }
    }

    /// Tick every status effect on the unit, then sweep out expired ones.
    fn advance_status_effects(&mut self, id: UnitId, dt: Fixed) {
        let count = self.unit(id).map_or(0, |u| u.status_effects.len());
        'effects: for index in 0..count {
            let Some(effect) = self.units.get_mut(&id).and_then(|u| u.status_effects.get_mut(index)) else {
                break;
            };
            let fired = effect.advance(dt);
            let (tick, source) = (effect.on_tick, effect.source);
            let Some(tick) = tick else {
                continue;
            };
            for _ in 0..fired {
                if !self.is_alive(id) {
                    break 'effects;
                }
                match tick {
                    TickEffect::Damage { amount, damage_type } => {
                        self.take_damage(id, amount, damage_type, source);
                    }
                    TickEffect::Heal { amount } => {
                        self.heal(id, amount, source);
                    }
                }
            }
        }

        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        while let Some(index) = unit.status_effects.iter().position(StatusEffect::is_expired) {
            if let Some(effect) = unit.remove_status_effect(index) {
                tracing::trace!(unit = %id, effect = %effect.name, "status expired");
            }
        }
    }
}
