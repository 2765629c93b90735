//! The skill catalogue.
//!
//! Every [`SkillId`] maps to one fully configured [`Skill`]. Summon
//! skills pull their minions from the unit catalogue.

use abler_core::math::Fixed;
use abler_core::prelude::{
    Aura, AuraEffect, CastEffect, DamageType, Reaction, Skill, SkillId, Stat, StatusEffect, SummonUpgrade, UnitKind,
    VisualEffectKind,
};

use crate::error::{ContentError, Result};
use crate::units::create_unit;

/// Every skill in the catalogue.
pub const ALL_SKILLS: [SkillId; 13] = [
    SkillId::SummonSkeleton,
    SkillId::HolyAura,
    SkillId::Fireball,
    SkillId::Bloodlust,
    SkillId::LifeDrain,
    SkillId::Hunger,
    SkillId::BoneShards,
    SkillId::UndeadHorde,
    SkillId::BurningBones,
    SkillId::FireAura,
    SkillId::GraveChill,
    SkillId::BoneFragments,
    SkillId::BoneSabers,
];

fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

fn tenths(n: i32) -> Fixed {
    Fixed::from_num(n) / Fixed::from_num(10)
}

/// Build a skill.
///
/// # Errors
///
/// Fails only if a skill needs a unit template that cannot be built.
pub fn create_skill(id: SkillId) -> Result<Skill> {
    let skill = match id {
        SkillId::SummonSkeleton => Skill::active(
            id,
            "Summon Skeleton",
            "Summons a skeleton warrior to fight for you",
            fixed(1),
            fixed(100),
            0,
        )
        .with_cast(CastEffect::Summon {
            prototype: Box::new(create_unit(UnitKind::Skeleton)?),
            max_active: 3,
        }),
        SkillId::HolyAura => Skill::active(
            id,
            "Holy Aura",
            "Heals nearby allies for 3 HP every second",
            Fixed::ZERO,
            Fixed::ZERO,
            2,
        )
        .with_aura(Aura::new(AuraEffect::HealAllies, fixed(3), 2, fixed(1)).with_marker(VisualEffectKind::Holy)),
        SkillId::Fireball => Skill::active(
            id,
            "Fireball",
            "Launches an explosive fireball at the nearest enemy",
            tenths(8),
            fixed(100),
            6,
        )
        .with_cast(CastEffect::AreaProjectile {
            damage: fixed(40),
            damage_type: DamageType::Magical,
            radius: 2,
            speed: fixed(8),
        }),
        SkillId::Bloodlust => Skill::active(
            id,
            "Bloodlust",
            "Increases attack speed by 50% for 3 seconds",
            tenths(5),
            fixed(100),
            0,
        )
        .with_cast(CastEffect::SelfBuff {
            status: StatusEffect::stat_modifier("Bloodlust", fixed(3), &[(Stat::AttackSpeed, fixed(50))]),
        }),
        SkillId::LifeDrain => Skill::active(id, "Life Drain", "Drains life from enemies", fixed(1), fixed(50), 4)
            .with_cast(CastEffect::Drain {
                damage: fixed(12),
                damage_type: DamageType::Magical,
                heal_fraction: tenths(5),
            }),
        SkillId::Hunger => Skill::passive(id, "Hunger", "Summoned skeletons gain a ranged life drain spell")
            .with_upgrade(SummonUpgrade::GrantSpell(Box::new(create_skill(SkillId::LifeDrain)?))),
        SkillId::BoneShards => Skill::passive(
            id,
            "Bone Shards",
            "On death, summoned skeletons shoot bone shards at the 3 nearest enemies",
        )
        .with_reaction(Reaction::BoneShards {
            damage: fixed(15),
            max_targets: 3,
            range: 8,
            speed: fixed(12),
        }),
        SkillId::UndeadHorde => Skill::passive(id, "Undead Horde", "Summons 2 skeletons instead of 1")
            .with_upgrade(SummonUpgrade::ExtraSummons(1)),
        SkillId::BurningBones => Skill::passive(
            id,
            "Burning Bones",
            "Summoned Skeletons have a radius 2 fire damage aura",
        )
        .with_upgrade(SummonUpgrade::GrantPassive(Box::new(create_skill(SkillId::FireAura)?))),
        SkillId::FireAura => Skill::passive(id, "Fire Aura", "Deals fire damage to nearby enemies").with_aura(
            Aura::new(AuraEffect::DamageEnemies(DamageType::Magical), fixed(8), 2, fixed(1))
                .with_marker(VisualEffectKind::Fire),
        ),
        SkillId::GraveChill => Skill::passive(
            id,
            "Grave Chill",
            "When an enemy unit dies, deal ice damage equal to 5% of its max hp to a random nearby enemy",
        )
        .with_reaction(Reaction::GraveChill {
            radius: 3,
            max_hp_fraction: fixed(5) / fixed(100),
        }),
        SkillId::BoneFragments => Skill::passive(
            id,
            "Bone Fragments",
            "Summoned Skeletons spawn bone fragments on death, which are smaller undead minions",
        )
        .with_reaction(Reaction::BoneFragments {
            fragment: Box::new(create_unit(UnitKind::BoneFragment)?),
        }),
        SkillId::BoneSabers => Skill::passive(id, "Bone Sabers", "Skeletons melee damage is increased")
            .with_upgrade(SummonUpgrade::BonusAttackDamage(fixed(5))),
    };
    Ok(skill)
}

/// Snake-case key of a skill, as used in data files.
#[must_use]
pub fn skill_key(id: SkillId) -> &'static str {
    match id {
        SkillId::SummonSkeleton => "summon_skeleton",
        SkillId::HolyAura => "holy_aura",
        SkillId::Fireball => "fireball",
        SkillId::Bloodlust => "bloodlust",
        SkillId::LifeDrain => "life_drain",
        SkillId::Hunger => "hunger",
        SkillId::BoneShards => "bone_shards",
        SkillId::UndeadHorde => "undead_horde",
        SkillId::BurningBones => "burning_bones",
        SkillId::FireAura => "fire_aura",
        SkillId::GraveChill => "grave_chill",
        SkillId::BoneFragments => "bone_fragments",
        SkillId::BoneSabers => "bone_sabers",
    }
}

/// Build a skill from its key or display name, e.g. `"Bone Shards"`.
///
/// # Errors
///
/// [`ContentError::UnknownSkill`] if nothing matches.
pub fn create_skill_by_name(name: &str) -> Result<Skill> {
    let key = name.trim().to_lowercase().replace([' ', '-'], "_");
    let id = ALL_SKILLS
        .into_iter()
        .find(|id| skill_key(*id) == key)
        .ok_or_else(|| ContentError::UnknownSkill(name.to_string()))?;
    create_skill(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_skill_builds_with_its_id() {
        for id in ALL_SKILLS {
            let skill = create_skill(id).unwrap();
            assert_eq!(skill.id, id);
        }
    }

    #[test]
    fn test_passives_have_no_cast() {
        for id in [SkillId::Hunger, SkillId::BoneShards, SkillId::GraveChill, SkillId::FireAura] {
            let skill = create_skill(id).unwrap();
            assert!(skill.is_passive);
            assert!(skill.cast.is_none());
        }
    }

    #[test]
    fn test_summon_uses_skeleton_template() {
        let skill = create_skill(SkillId::SummonSkeleton).unwrap();
        match skill.cast {
            Some(CastEffect::Summon { prototype, max_active }) => {
                assert_eq!(prototype.kind, UnitKind::Skeleton);
                assert_eq!(prototype.max_hp(), fixed(40));
                assert_eq!(max_active, 3);
            }
            other => panic!("unexpected cast: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_by_name_normalizes() {
        assert_eq!(create_skill_by_name("Bone Shards").unwrap().id, SkillId::BoneShards);
        assert_eq!(create_skill_by_name("summon_skeleton").unwrap().id, SkillId::SummonSkeleton);
        assert_eq!(create_skill_by_name("LIFE DRAIN").unwrap().id, SkillId::LifeDrain);
        assert_eq!(
            create_skill_by_name("meteor").unwrap_err(),
            ContentError::UnknownSkill("meteor".to_string())
        );
    }

    #[test]
    fn test_keys_match_serde_names() {
        for id in ALL_SKILLS {
            let encoded = ron::to_string(&id).unwrap();
            assert_eq!(encoded, skill_key(id));
        }
    }
}
