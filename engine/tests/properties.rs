use proptest::prelude::*;
use wavebound_engine::combatant::mitigated_damage;
use wavebound_engine::skill::execute;
use wavebound_engine::{
    BaseStats, Combatant, CombatantId, EffectSpec, Scaling, Skill, StatusEffect, StatusKind,
    TargetType,
};

fn any_kind() -> impl Strategy<Value = StatusKind> {
    prop_oneof![
        Just(StatusKind::Buff),
        Just(StatusKind::Debuff),
        Just(StatusKind::Shield),
    ]
}

fn combatant(attack: i32, defense: i32) -> Combatant {
    Combatant::new(
        "Subject",
        BaseStats {
            max_hp: 500,
            max_mana: 100,
            attack,
            defense,
            speed: 5,
        },
        vec![],
        50,
    )
}

proptest! {
    #[test]
    fn damage_is_at_least_one(amount in -1000i32..100_000, defense in -50i32..10_000) {
        prop_assert!(mitigated_damage(amount, defense) >= 1);
    }

    #[test]
    fn hp_stays_in_bounds(hits in proptest::collection::vec(0i32..400, 0..20), heal in 0i32..1000) {
        let mut c = combatant(10, 10);
        for h in hits {
            c.apply_damage(h);
            prop_assert!(c.hp >= 0 && c.hp <= c.base.max_hp);
        }
        c.heal(heal);
        prop_assert!(c.hp >= 0 && c.hp <= c.base.max_hp);
        prop_assert_eq!(c.is_alive(), c.hp > 0);
    }

    #[test]
    fn recompute_is_idempotent(
        attack in 0i32..300,
        defense in 0i32..300,
        effects in proptest::collection::vec((any_kind(), 0i32..80, 1u32..5), 0..6),
    ) {
        let mut c = combatant(attack, defense);
        for (kind, magnitude, duration) in effects {
            c.add_effect(StatusEffect::new(kind, magnitude, duration));
        }
        c.recompute_stats();
        let first = (c.attack, c.defense, c.speed);
        c.recompute_stats();
        prop_assert_eq!(first, (c.attack, c.defense, c.speed));
        prop_assert!(c.attack >= 0 && c.defense >= 0);
    }

    #[test]
    fn cooldown_stays_within_declared_bounds(cooldown in 0u32..6, ticks in 0usize..10) {
        let skill = Skill::new(
            "Pulse",
            TargetType::AllEnemies,
            vec![EffectSpec::Damage { power: Scaling::flat(1.0) }],
        )
        .with_cost(0, cooldown);
        let mut party = vec![Combatant::new(
            "Caster",
            BaseStats { max_hp: 100, max_mana: 0, attack: 5, defense: 0, speed: 1 },
            vec![skill],
            30,
        )];
        let mut enemies: Vec<Combatant> = Vec::new();
        execute(CombatantId::party(0), 0, &[], &mut party, &mut enemies);
        prop_assert_eq!(party[0].skills[0].current_cooldown, cooldown);
        for _ in 0..ticks {
            party[0].tick_cooldowns();
            prop_assert!(party[0].skills[0].current_cooldown <= cooldown);
        }
        prop_assert_eq!(
            party[0].skills[0].current_cooldown,
            cooldown.saturating_sub(ticks as u32)
        );
    }

    #[test]
    fn sync_to_level_twice_is_a_no_op(target in 0u32..80) {
        let mut c = combatant(10, 5);
        c.sync_to_level(target);
        let level = c.level;
        let base = c.base;
        prop_assert_eq!(c.sync_to_level(target), 0);
        prop_assert_eq!(c.level, level);
        prop_assert_eq!(c.base, base);
        prop_assert!(c.level >= 1 && c.level <= c.max_level);
    }
}
