//! End-to-end combat scenarios driven through `Board::advance`.

use abler_core::prelude::*;
use abler_test_utils::fixtures::{dummy, fixed, fixed_f, melee, place, ranged, UnitBuilder};

// =============================================================================
// Melee and ranged
// =============================================================================

#[test]
fn melee_unit_kills_adjacent_enemy() {
    let mut board = Board::default();
    let hero = place(&mut board, melee("Hero", 20), 0, 0, Team::Player);
    let target = place(&mut board, dummy("Target", 100), 1, 0, Team::Enemy);

    let mut removed_at = None;
    for tick in 0..600 {
        let events = board.advance(FRAME_TIME);
        let timer = board.unit(hero).map(Unit::attack_timer).unwrap_or_default();
        assert!(timer >= Fixed::ZERO, "attack timer went negative at tick {tick}");
        if events.contains(&GameEvent::UnitRemoved { unit: target }) {
            removed_at = Some(tick);
            break;
        }
    }

    let tick = removed_at.expect("target was never removed");
    assert!(tick < 400, "took {tick} ticks");
    assert!(board.unit(target).is_none());
    assert!(board.unit_at(1, 0).is_none());
    assert!(board.unit(hero).is_some_and(Unit::is_alive));
}

#[test]
fn adjacent_attack_is_direct_and_distant_attack_is_a_projectile() {
    let mut board = Board::default();
    let archer = place(&mut board, ranged("Archer", 10, 2), 0, 0, Team::Player);
    let near = place(&mut board, dummy("Near", 100), 1, 0, Team::Enemy);
    let far = place(&mut board, dummy("Far", 100), 2, 2, Team::Enemy);

    board.attack(archer, near);
    assert!(board.projectiles().is_empty());
    assert_eq!(board.unit(near).unwrap().hp(), fixed(90));

    board.attack(archer, far);
    assert_eq!(board.projectiles().len(), 1);
    assert_eq!(board.unit(far).unwrap().hp(), fixed(100));

    let mut landed = false;
    for _ in 0..30 {
        let events = board.advance(FRAME_TIME);
        if events.iter().any(|e| matches!(e, GameEvent::ProjectileHit { target, .. } if *target == far)) {
            landed = true;
            break;
        }
    }
    assert!(landed);
    assert_eq!(board.unit(far).unwrap().hp(), fixed(90));
}

#[test]
fn ranged_unit_does_not_chase_when_another_enemy_is_in_range() {
    let mut board = Board::default();
    let archer = place(&mut board, ranged("Archer", 1, 3), 0, 0, Team::Player);
    let runner = place(&mut board, dummy("Runner", 100), 3, 0, Team::Enemy);
    place(&mut board, UnitBuilder::new("Post").damage(0).range(9).build(), 0, 3, Team::Enemy);

    board.advance(FRAME_TIME);
    assert_eq!(board.unit(archer).unwrap().target(), Some(runner));

    board.move_unit(runner, 9, 9).unwrap();
    for _ in 0..120 {
        board.advance(FRAME_TIME);
    }
    assert_eq!(board.unit(archer).unwrap().position(), (0, 0));
}

// =============================================================================
// Damage, healing and death
// =============================================================================

#[test]
fn mitigation_matches_armor_formula() {
    let mut board = Board::default();
    let bare = place(&mut board, dummy("Bare", 200), 0, 0, Team::Enemy);
    let plated = place(&mut board, UnitBuilder::new("Plated").hp(200).armor(100).build(), 2, 0, Team::Enemy);

    board.take_damage(bare, fixed(100), DamageType::Physical, None);
    board.take_damage(plated, fixed(100), DamageType::Physical, None);
    assert_eq!(board.unit(bare).unwrap().hp(), fixed(100));
    assert_eq!(board.unit(plated).unwrap().hp(), fixed(150));

    board.take_damage(plated, fixed(10), DamageType::True, None);
    assert_eq!(board.unit(plated).unwrap().hp(), fixed(140));
}

#[test]
fn reset_revives_a_dying_unit() {
    let mut board = Board::default();
    let id = place(&mut board, melee("Hero", 10), 0, 0, Team::Player);
    board.take_damage(id, fixed(1000), DamageType::True, None);
    assert!(board.unit(id).unwrap().death_timer() > Fixed::ZERO);

    let unit = board.unit_mut(id).unwrap();
    unit.reset();
    assert!(unit.is_alive());
    assert_eq!(unit.hp(), unit.max_hp());
    assert_eq!(unit.death_timer(), Fixed::ZERO);
    assert_eq!(unit.attack_timer(), Fixed::ZERO);
    assert_eq!(unit.move_timer(), Fixed::ZERO);
    assert_eq!(unit.cast_timer(), Fixed::ZERO);
    assert_eq!(unit.cosmetics().flash_timer, Fixed::ZERO);
    assert_eq!(unit.state(), UnitState::Idle);
}

#[test]
fn death_emits_both_death_events_with_snapshot() {
    let mut board = Board::default();
    let killer = place(&mut board, melee("Killer", 10), 0, 0, Team::Player);
    let victim = place(&mut board, dummy("Victim", 80), 4, 5, Team::Enemy);
    board.take_events();

    board.take_damage(victim, fixed(500), DamageType::Physical, Some(killer));
    let events = board.take_events();
    assert!(events.contains(&GameEvent::UnitDeath {
        unit: victim,
        killer: Some(killer)
    }));
    let record = events.iter().find_map(GameEvent::death).expect("death event");
    assert_eq!(record.unit, victim);
    assert_eq!((record.x, record.y), (4, 5));
    assert_eq!(record.team, Team::Enemy);
    assert_eq!(record.max_hp, fixed(80));

    let corpses = board.corpses_in_area(4, 4, 1);
    assert_eq!(corpses.len(), 1);
    assert_eq!(corpses[0].name, "Victim");
}

// =============================================================================
// Mana
// =============================================================================

#[test]
fn ten_attacks_fill_a_hundred_mana_spell() {
    let spell = Skill::active(SkillId::Bloodlust, "Bloodlust", "", fixed_f(0.5), fixed(100), 0).with_cast(
        CastEffect::SelfBuff {
            status: StatusEffect::stat_modifier("Bloodlust", fixed(3), &[(Stat::AttackSpeed, fixed(50))]),
        },
    );
    let mut board = Board::default();
    let hero = place(&mut board, UnitBuilder::new("Hero").spell(spell).build(), 0, 0, Team::Player);
    let target = place(&mut board, dummy("Target", 10_000), 1, 0, Team::Enemy);

    for _ in 0..9 {
        board.attack(hero, target);
    }
    assert!(!board.unit(hero).unwrap().can_cast());
    board.attack(hero, target);
    assert!(board.unit(hero).unwrap().can_cast());
}

// =============================================================================
// Passive reactions
// =============================================================================

#[test]
fn grave_chill_fires_once_per_enemy_death_and_ignores_allies() {
    let chill = Skill::passive(SkillId::GraveChill, "Grave Chill", "").with_reaction(Reaction::GraveChill {
        radius: 3,
        max_hp_fraction: fixed_f(0.05),
    });
    let mut board = Board::default();
    let owner = place(&mut board, UnitBuilder::new("Owner").passive(chill).build(), 0, 0, Team::Player);
    let ally = place(&mut board, dummy("Ally", 100), 5, 7, Team::Player);
    let first = place(&mut board, dummy("First", 100), 5, 5, Team::Enemy);
    let second = place(&mut board, dummy("Second", 100), 6, 5, Team::Enemy);
    board.take_events();

    let chilled = |events: &[GameEvent]| {
        events
            .iter()
            .filter(|e| {
                matches!(e, GameEvent::DamageTaken { source: Some(s), damage_type: DamageType::Magical, .. } if *s == owner)
            })
            .count()
    };

    board.take_damage(first, fixed(1000), DamageType::True, None);
    assert_eq!(chilled(board.take_events().as_slice()), 1);
    let hp = board.unit(second).unwrap().hp();
    assert!((hp - fixed(95)).abs() < fixed_f(0.001), "hp was {hp}");

    board.take_damage(ally, fixed(1000), DamageType::True, None);
    assert_eq!(chilled(board.take_events().as_slice()), 0);
}

#[test]
fn dead_owner_does_not_react() {
    let chill = Skill::passive(SkillId::GraveChill, "Grave Chill", "").with_reaction(Reaction::GraveChill {
        radius: 3,
        max_hp_fraction: fixed_f(0.05),
    });
    let mut board = Board::default();
    let owner = place(&mut board, UnitBuilder::new("Owner").passive(chill).build(), 0, 0, Team::Player);
    let first = place(&mut board, dummy("First", 100), 5, 5, Team::Enemy);
    let second = place(&mut board, dummy("Second", 100), 6, 5, Team::Enemy);

    board.take_damage(owner, fixed(1000), DamageType::True, None);
    board.take_damage(first, fixed(1000), DamageType::True, None);
    assert_eq!(board.unit(second).unwrap().hp(), fixed(100));
}

// =============================================================================
// Status effects
// =============================================================================

#[test]
fn large_step_fires_several_ticks_before_expiry() {
    let mut board = Board::default();
    let id = place(&mut board, dummy("Patient", 100), 0, 0, Team::Player);
    board.unit_mut(id).unwrap().set_hp(fixed(50));
    board.add_status_effect(id, StatusEffect::heal_over_time("Mend", fixed(2), fixed_f(0.5), fixed(4)));

    board.advance(fixed(2));
    let unit = board.unit(id).unwrap();
    assert_eq!(unit.hp(), fixed(66));
    assert!(unit.status_effects().is_empty());
}

#[test]
fn stat_modifiers_are_reverted_on_expiry() {
    let mut board = Board::default();
    let id = place(&mut board, UnitBuilder::new("Knight").armor(20).build(), 0, 0, Team::Player);
    board.add_status_effect(id, StatusEffect::protection());
    assert_eq!(board.unit(id).unwrap().stats.armor, fixed(40));

    for _ in 0..5 {
        board.advance(fixed(1));
    }
    let unit = board.unit(id).unwrap();
    assert_eq!(unit.stats.armor, fixed(20));
    assert!(!unit.has_status("Protection"));
}

// =============================================================================
// Projectile payloads
// =============================================================================

fn shield_instead_of_damage(board: &mut Board, projectile: &Projectile, target: UnitId) {
    board.add_status_effect(target, StatusEffect::protection().with_source(projectile.source));
}

#[test]
fn hit_callback_replaces_default_damage() {
    let mut board = Board::default();
    let caster = place(&mut board, dummy("Caster", 100), 0, 0, Team::Player);
    let target = place(&mut board, dummy("Target", 100), 3, 0, Team::Enemy);
    assert!(board.pending_events().contains(&GameEvent::UnitAdded { unit: target }));
    board.take_events();
    assert!(board.pending_events().is_empty());

    let shot = Projectile::from_unit(board.unit(caster).unwrap(), target, fixed(15))
        .with_damage(fixed(50), DamageType::Physical)
        .with_on_hit(shield_instead_of_damage);
    board.add_projectile(shot);

    let mut landed = false;
    for _ in 0..60 {
        let events = board.advance(FRAME_TIME);
        if events.contains(&GameEvent::ProjectileHit { source: caster, target }) {
            landed = true;
            break;
        }
    }
    assert!(landed);
    let unit = board.unit(target).unwrap();
    assert_eq!(unit.hp(), fixed(100));
    assert!(unit.has_status("Protection"));
    assert!(board.projectiles().is_empty());
}
