//! Projectiles in flight and how they land.

use tracing::trace;

use crate::board::Board;
use crate::combat::DamageType;
use crate::events::GameEvent;
use crate::feedback::VisualEffectKind;
use crate::math::{Fixed, Vec2Fixed};
use crate::status::StatusEffect;
use crate::unit::{Team, Unit, UnitId};

/// Custom landing behaviour replacing the default damage payload.
pub type HitCallback = fn(&mut Board, &Projectile, UnitId);

/// Where a projectile is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileTarget {
    /// A unit, followed to its current cell every frame.
    Unit(UnitId),
    /// A fixed point that explodes on arrival.
    Point {
        /// Aim point.
        at: Vec2Fixed,
        /// Explosion radius in cells.
        radius: i32,
    },
}

/// A moving shot owned by the board until it resolves.
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Unit that fired it.
    pub source: UnitId,
    /// Team of the unit that fired it.
    pub team: Team,
    /// Destination.
    pub target: ProjectileTarget,
    /// Cells per second.
    pub speed: Fixed,
    /// Current position.
    pub position: Vec2Fixed,
    /// Damage applied on landing.
    pub damage: Fixed,
    /// Damage category.
    pub damage_type: DamageType,
    /// Keep flying after the first landing.
    pub piercing: bool,
    /// Retarget to the nearest enemy when the target dies.
    pub homing: bool,
    /// Effects applied to every unit hit.
    pub effects: Vec<StatusEffect>,
    /// Replaces the default damage payload when set.
    pub on_hit: Option<HitCallback>,
    hit_units: Vec<UnitId>,
    done: bool,
}

impl Projectile {
    /// A shot from `origin` at a unit.
    #[must_use]
    pub fn new(source: UnitId, team: Team, origin: Vec2Fixed, target: UnitId, speed: Fixed) -> Self {
        Self {
            source,
            team,
            target: ProjectileTarget::Unit(target),
            speed,
            position: origin,
            damage: Fixed::ZERO,
            damage_type: DamageType::Physical,
            piercing: false,
            homing: false,
            effects: Vec::new(),
            on_hit: None,
            hit_units: Vec::new(),
            done: false,
        }
    }

    /// A shot from a unit's cell at another unit.
    #[must_use]
    pub fn from_unit(source: &Unit, target: UnitId, speed: Fixed) -> Self {
        let (x, y) = source.position();
        Self::new(source.id(), source.team(), Vec2Fixed::from_cell(x, y), target, speed)
    }

    /// An exploding shot from a unit's cell at a fixed point.
    #[must_use]
    pub fn area(source: &Unit, at: Vec2Fixed, radius: i32, speed: Fixed) -> Self {
        let (x, y) = source.position();
        Self {
            target: ProjectileTarget::Point { at, radius },
            ..Self::new(source.id(), source.team(), Vec2Fixed::from_cell(x, y), source.id(), speed)
        }
    }

    /// Set the damage payload.
    #[must_use]
    pub fn with_damage(mut self, damage: Fixed, damage_type: DamageType) -> Self {
        self.damage = damage;
        self.damage_type = damage_type;
        self
    }

    /// Apply a status effect to whatever it hits.
    #[must_use]
    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Replace the default payload.
    #[must_use]
    pub fn with_on_hit(mut self, callback: HitCallback) -> Self {
        self.on_hit = Some(callback);
        self
    }

    /// Keep flying after landing.
    ///
    /// A piercing shot aimed at a unit stays on that unit after the first
    /// landing without hitting it again. It resolves once the target dies,
    /// or moves on to the next enemy when it is also homing.
    #[must_use]
    pub fn piercing(mut self) -> Self {
        self.piercing = true;
        self
    }

    /// Retarget when the target dies.
    #[must_use]
    pub fn homing(mut self) -> Self {
        self.homing = true;
        self
    }

    /// Whether it has resolved and will be removed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Units this projectile has already landed on.
    #[must_use]
    pub fn hit_units(&self) -> &[UnitId] {
        &self.hit_units
    }

    /// Move up to `speed * dt` toward `destination`.
    fn step_toward(&mut self, destination: Vec2Fixed, dt: Fixed) {
        let offset = destination - self.position;
        let distance = offset.length();
        let travel = self.speed * dt;
        if travel >= distance {
            self.position = destination;
        } else {
            self.position = self.position + offset.normalize().scale(travel);
        }
    }
}

impl Board {
    /// Put a projectile in flight.
    pub fn add_projectile(&mut self, projectile: Projectile) {
        trace!(source = %projectile.source, "projectile added");
        self.projectiles.push(projectile);
    }

    /// Advance every projectile, dropping the resolved ones.
    ///
    /// Projectiles spawned while landing join the flight list after this
    /// pass and first move on the next frame.
    pub(crate) fn advance_projectiles(&mut self, dt: Fixed) {
        let mut in_flight = std::mem::take(&mut self.projectiles);
        for projectile in &mut in_flight {
            if !projectile.done {
                self.step_projectile(projectile, dt);
            }
        }
        in_flight.retain(|p| !p.done);
        in_flight.append(&mut self.projectiles);
        self.projectiles = in_flight;
    }

    fn step_projectile(&mut self, projectile: &mut Projectile, dt: Fixed) {
        match projectile.target {
            ProjectileTarget::Unit(target) => self.step_unit_shot(projectile, target, dt),
            ProjectileTarget::Point { at, radius } => {
                if projectile.position.distance(at) < self.config.landing_epsilon {
                    self.explode(projectile, at, radius);
                    projectile.done = true;
                } else {
                    projectile.step_toward(at, dt);
                }
            }
        }
    }

    fn step_unit_shot(&mut self, projectile: &mut Projectile, mut target: UnitId, dt: Fixed) {
        if !self.is_alive(target) {
            if !projectile.homing {
                projectile.done = true;
                return;
            }
            let origin = self
                .unit(projectile.source)
                .map_or_else(|| projectile.position.cell(), Unit::position);
            match self.nearest_enemy_of(projectile.team, origin) {
                Some(next) => {
                    target = next;
                    projectile.target = ProjectileTarget::Unit(next);
                }
                None => {
                    projectile.done = true;
                    return;
                }
            }
        }

        let Some((tx, ty)) = self.unit(target).map(Unit::position) else {
            projectile.done = true;
            return;
        };
        let destination = Vec2Fixed::from_cell(tx, ty);
        if projectile.position.distance(destination) < self.config.landing_epsilon {
            self.land(projectile, target);
            if !projectile.piercing {
                projectile.done = true;
            }
            return;
        }
        projectile.step_toward(destination, dt);
    }

    /// Apply a projectile's payload to one unit, at most once per projectile.
    fn land(&mut self, projectile: &mut Projectile, target: UnitId) {
        if projectile.hit_units.contains(&target) {
            return;
        }
        projectile.hit_units.push(target);
        trace!(source = %projectile.source, target = %target, "projectile landed");

        if let Some(callback) = projectile.on_hit {
            callback(self, projectile, target);
        } else {
            if projectile.damage > Fixed::ZERO {
                self.take_damage(target, projectile.damage, projectile.damage_type, Some(projectile.source));
            }
            for effect in &projectile.effects {
                if self.is_alive(target) {
                    self.add_status_effect(target, effect.clone().with_source(projectile.source));
                }
            }
        }
        self.raise_event(GameEvent::ProjectileHit {
            source: projectile.source,
            target,
        });
    }

    fn explode(&mut self, projectile: &mut Projectile, at: Vec2Fixed, radius: i32) {
        let (cx, cy) = at.cell();
        let radius_sq = radius * radius;
        let within = |x: i32, y: i32| (x - cx) * (x - cx) + (y - cy) * (y - cy) <= radius_sq;

        let victims: Vec<UnitId> = self
            .units_in_range(cx, cy, radius, Some(projectile.team.opponent()))
            .into_iter()
            .filter(|id| self.unit(*id).is_some_and(|u| within(u.x, u.y)))
            .collect();
        for victim in victims {
            self.land(projectile, victim);
        }

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (x, y) = (cx + dx, cy + dy);
                if within(x, y) && self.is_valid_position(x, y) {
                    self.add_visual_effect(VisualEffectKind::Fire, x, y);
                }
            }
        }

        self.raise_event(GameEvent::AoeExplosion {
            source: projectile.source,
            center: at,
            radius,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stats;
    use crate::unit::UnitKind;

    fn post(name: &str) -> Unit {
        Unit::new(
            name,
            UnitKind::Summoned,
            Stats {
                hp_regen: Fixed::ZERO,
                ..Stats::default()
            },
        )
    }

    fn shot(board: &Board, source: UnitId, target: UnitId) -> Projectile {
        let source = board.unit(source).unwrap();
        Projectile::from_unit(source, target, Fixed::from_num(4)).with_damage(Fixed::from_num(30), DamageType::True)
    }

    fn fly(board: &mut Board, frames: usize) {
        for _ in 0..frames {
            board.advance_projectiles(Fixed::from_num(0.25));
        }
    }

    fn hits(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::ProjectileHit { .. })).count()
    }

    #[test]
    fn test_step_toward_stops_at_destination() {
        let mut projectile = Projectile::new(UnitId(1), Team::Player, Vec2Fixed::ZERO, UnitId(2), Fixed::from_num(15));
        let destination = Vec2Fixed::from_cell(1, 0);
        projectile.step_toward(destination, Fixed::ONE);
        assert_eq!(projectile.position, destination);
    }

    #[test]
    fn test_step_toward_moves_speed_times_dt() {
        let mut projectile = Projectile::new(UnitId(1), Team::Player, Vec2Fixed::ZERO, UnitId(2), Fixed::from_num(2));
        projectile.step_toward(Vec2Fixed::from_cell(10, 0), Fixed::from_num(0.5));
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!((projectile.position.x - Fixed::ONE).abs() < epsilon);
        assert_eq!(projectile.position.y, Fixed::ZERO);
    }

    #[test]
    fn test_builders() {
        let projectile = Projectile::new(UnitId(1), Team::Enemy, Vec2Fixed::ZERO, UnitId(2), Fixed::ONE)
            .with_damage(Fixed::from_num(15), DamageType::Magical)
            .with_effect(StatusEffect::poison())
            .piercing()
            .homing();
        assert!(projectile.piercing && projectile.homing);
        assert_eq!(projectile.effects.len(), 1);
        assert_eq!(projectile.damage_type, DamageType::Magical);
        assert!(!projectile.is_done());
    }

    #[test]
    fn test_shot_vanishes_when_target_is_gone() {
        let mut board = Board::default();
        let archer = board.add(post("Archer"), 0, 0, Team::Player).unwrap();
        let target = board.add(post("Target"), 5, 0, Team::Enemy).unwrap();
        let bystander = board.add(post("Bystander"), 6, 0, Team::Enemy).unwrap();
        board.add_projectile(shot(&board, archer, target));

        fly(&mut board, 1);
        assert_eq!(board.projectiles().len(), 1);
        board.remove(target);
        board.take_events();

        fly(&mut board, 8);
        assert!(board.projectiles().is_empty());
        assert_eq!(board.unit(bystander).unwrap().hp(), Fixed::from_num(100));
        assert_eq!(hits(&board.take_events()), 0);
    }

    #[test]
    fn test_homing_shot_picks_nearest_enemy_of_its_team() {
        let mut board = Board::default();
        let archer = board.add(post("Archer"), 0, 0, Team::Player).unwrap();
        board.add(post("Ally"), 1, 1, Team::Player).unwrap();
        let target = board.add(post("Target"), 5, 0, Team::Enemy).unwrap();
        let near = board.add(post("Near"), 2, 2, Team::Enemy).unwrap();
        let far = board.add(post("Far"), 8, 0, Team::Enemy).unwrap();
        board.add_projectile(shot(&board, archer, target).homing());

        board.die(target, None);
        fly(&mut board, 1);
        assert_eq!(board.projectiles()[0].target, ProjectileTarget::Unit(near));

        fly(&mut board, 10);
        assert!(board.projectiles().is_empty());
        assert_eq!(board.unit(near).unwrap().hp(), Fixed::from_num(70));
        assert_eq!(board.unit(far).unwrap().hp(), Fixed::from_num(100));
    }

    #[test]
    fn test_piercing_shot_lands_once_per_unit() {
        let mut board = Board::default();
        let archer = board.add(post("Archer"), 0, 0, Team::Player).unwrap();
        let target = board.add(post("Target"), 1, 0, Team::Enemy).unwrap();
        board.add_projectile(shot(&board, archer, target).piercing());
        board.take_events();

        fly(&mut board, 12);
        assert_eq!(board.unit(target).unwrap().hp(), Fixed::from_num(70));
        assert_eq!(hits(&board.take_events()), 1);
        assert_eq!(board.projectiles().len(), 1);
        assert_eq!(board.projectiles()[0].hit_units(), &[target]);

        board.die(target, None);
        fly(&mut board, 1);
        assert!(board.projectiles().is_empty());
    }

    #[test]
    fn test_status_payload_records_its_source() {
        let mut board = Board::default();
        let archer = board.add(post("Archer"), 0, 0, Team::Player).unwrap();
        let target = board.add(post("Target"), 1, 0, Team::Enemy).unwrap();
        board.add_projectile(shot(&board, archer, target).with_effect(StatusEffect::poison()));

        fly(&mut board, 3);
        let effects = board.unit(target).unwrap().status_effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].source, Some(archer));
    }

    #[test]
    fn test_area_shot_explodes_after_source_dies() {
        let mut board = Board::default();
        let caster = board.add(post("Caster"), 0, 0, Team::Player).unwrap();
        let victim = board.add(post("Victim"), 4, 0, Team::Enemy).unwrap();
        let projectile = Projectile::area(board.unit(caster).unwrap(), Vec2Fixed::from_cell(4, 0), 1, Fixed::from_num(8))
            .with_damage(Fixed::from_num(20), DamageType::True);
        board.add_projectile(projectile);

        fly(&mut board, 1);
        board.remove(caster);
        board.take_events();
        fly(&mut board, 4);

        assert!(board.projectiles().is_empty());
        assert_eq!(board.unit(victim).unwrap().hp(), Fixed::from_num(80));
        let events = board.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::AoeExplosion { source, radius: 1, .. } if *source == caster)));
    }
}
