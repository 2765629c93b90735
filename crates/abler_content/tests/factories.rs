//! Content factories feeding a real board.

use abler_content::prelude::*;
use abler_core::prelude::*;
use abler_test_utils::fixtures::{fixed, place};

#[test]
fn archetypes_match_their_stat_blocks() {
    let cases = [
        (UnitKind::Necromancer, 80, 8, 4, SkillId::SummonSkeleton),
        (UnitKind::Paladin, 150, 15, 1, SkillId::HolyAura),
        (UnitKind::Pyromancer, 70, 6, 5, SkillId::Fireball),
        (UnitKind::Berserker, 120, 20, 1, SkillId::Bloodlust),
    ];
    for (kind, hp, damage, range, spell) in cases {
        let unit = create_unit(kind).unwrap();
        assert_eq!(unit.kind, kind);
        assert_eq!(unit.max_hp(), fixed(hp), "{kind:?}");
        assert_eq!(unit.stats.attack_damage, fixed(damage), "{kind:?}");
        assert_eq!(unit.stats.range_cells(), range, "{kind:?}");
        assert_eq!(unit.spell().map(|s| s.id), Some(spell), "{kind:?}");
        assert_eq!(unit.spell().map(Skill::current_mana), Some(Fixed::ZERO));
    }
}

#[test]
fn created_units_are_board_independent() {
    let first = create_unit(UnitKind::Paladin).unwrap();
    let second = create_unit(UnitKind::Paladin).unwrap();
    assert_eq!(first.id(), UnitId::default());
    assert_eq!(first.stats, second.stats);

    let mut board = Board::default();
    let a = place(&mut board, first, 0, 0, Team::Player);
    let b = place(&mut board, second, 1, 0, Team::Player);
    assert_ne!(a, b);
    assert_eq!(board.unit(a).unwrap().spell().and_then(Skill::owner), Some(a));
}

#[test]
fn unknown_tags_are_errors() {
    assert!(matches!(create_unit_by_tag("lich"), Err(ContentError::UnknownArchetype(_))));
    assert!(matches!(create_skill_by_name("raise dead"), Err(ContentError::UnknownSkill(_))));
    assert!(matches!(create_item("crown"), Err(ContentError::UnknownItem(_))));
}

#[test]
fn items_apply_and_revert_on_a_unit() {
    let mut unit = create_unit(UnitKind::Berserker).unwrap();
    assert!(unit.add_item(create_item("sword").unwrap()));
    assert!(unit.add_item(create_item("amulet").unwrap()));
    assert!(unit.add_item(create_item("boots").unwrap()));
    assert!(!unit.add_item(create_item("axe").unwrap()));

    assert_eq!(unit.stats.attack_damage, fixed(30));
    assert_eq!(unit.max_hp(), fixed(150));
    assert_eq!(unit.stats.attack_speed, fixed(40));

    unit.remove_item(0);
    assert_eq!(unit.stats.attack_damage, fixed(20));
    assert_eq!(unit.items().len(), 2);
}

#[test]
fn necromancer_with_upgrades_summons_empowered_skeletons() {
    let mut necro = create_unit(UnitKind::Necromancer).unwrap();
    for passive in ["undead_horde", "bone_sabers", "burning_bones", "hunger"] {
        assert!(necro.add_passive_skill(create_skill_by_name(passive).unwrap()));
    }
    assert!(!necro.add_passive_skill(create_skill(SkillId::Hunger).unwrap()));
    necro.spell_mut().unwrap().add_mana(fixed(100));

    let mut board = Board::default();
    let id = place(&mut board, necro, 4, 4, Team::Player);
    place(&mut board, create_unit(UnitKind::Paladin).unwrap(), 9, 9, Team::Enemy);

    let mut resolved = false;
    for _ in 0..120 {
        let events = board.advance(FRAME_TIME);
        if events.iter().any(|e| matches!(e, GameEvent::SpellResolved { caster, .. } if *caster == id)) {
            resolved = true;
            break;
        }
    }
    assert!(resolved);

    let skeletons: Vec<&Unit> = board.iter_units().filter(|u| u.kind == UnitKind::Skeleton).collect();
    assert_eq!(skeletons.len(), 2);
    for skeleton in skeletons {
        assert_eq!(skeleton.stats.attack_damage, fixed(13));
        assert!(skeleton.has_passive(SkillId::FireAura));
        assert_eq!(skeleton.spell().map(|s| s.id), Some(SkillId::LifeDrain));
        assert_eq!(skeleton.summoner(), Some(id));
    }
}

#[test]
fn four_archetype_battle_reaches_an_outcome() {
    let mut board = Board::new(CombatConfig::default().with_seed(11));
    for (i, kind) in UnitKind::PLAYABLE.into_iter().enumerate() {
        let y = i32::try_from(i).unwrap() * 2 + 1;
        place(&mut board, create_unit(kind).unwrap(), 1, y, Team::Player);
        place(&mut board, create_unit(kind).unwrap(), 8, y, Team::Enemy);
    }
    let report = CombatDriver::new(&board).run(&mut board);
    assert!(report.elapsed <= board.config().max_combat_time + FRAME_TIME);
    assert!(board.occupancy_is_consistent());
}

#[test]
fn shop_prices_come_from_the_catalog() {
    for &kind in available_units() {
        assert_eq!(unit_cost(kind), 50, "{kind:?}");
    }
    assert_eq!(unit_cost(UnitKind::Skeleton), 0);
    assert_eq!(unit_cost(UnitKind::Summoned), 0);
    assert!(available_passives(UnitKind::Necromancer).contains(&SkillId::GraveChill));
}
