use wavebound_engine::combatant::{mitigated_damage, PARTY_MAX_LEVEL};
use wavebound_engine::skill::execute;
use wavebound_engine::{BaseStats, Combatant, CombatantId, Skill, StatusEffect, StatusKind};

fn stats(max_hp: i32, max_mana: i32, attack: i32, defense: i32) -> BaseStats {
    BaseStats {
        max_hp,
        max_mana,
        attack,
        defense,
        speed: 3,
    }
}

#[test]
fn basic_kill_scenario_hits_for_142() {
    let mut party = vec![Combatant::new(
        "Hero",
        stats(500, 50, 150, 10),
        vec![Skill::basic_attack()],
        PARTY_MAX_LEVEL,
    )];
    let mut enemies = vec![Combatant::new("Dummy", stats(1000, 0, 10, 20), vec![], 50)];

    let report = execute(
        CombatantId::party(0),
        0,
        &[CombatantId::enemy(0)],
        &mut party,
        &mut enemies,
    );

    assert_eq!(report.deltas.len(), 1);
    assert_eq!(report.deltas[0].hp_delta, -142);
    assert_eq!(enemies[0].hp, 858);
    assert!(!report.deltas[0].defeated);
}

#[test]
fn damage_never_drops_below_one() {
    assert_eq!(mitigated_damage(5, 100), 1);
    assert_eq!(mitigated_damage(-40, 0), 1);
    assert_eq!(mitigated_damage(100, 0), 100);
    // round(25 * 0.4) = 10
    assert_eq!(mitigated_damage(100, 25), 90);
}

#[test]
fn lethal_damage_kills_and_stays_dead() {
    let mut c = Combatant::new("Slime", stats(10, 0, 1, 0), vec![], 50);
    assert_eq!(c.apply_damage(100), 10);
    assert_eq!(c.hp, 0);
    assert!(!c.is_alive());

    assert_eq!(c.heal(50), 0);
    assert_eq!(c.hp, 0);
    assert!(!c.is_alive());
    assert_eq!(c.apply_damage(5), 0);
}

#[test]
fn heal_and_mana_clamp_to_max() {
    let mut c = Combatant::new("Cleric", stats(100, 60, 10, 0), vec![], PARTY_MAX_LEVEL);
    c.apply_damage(30);
    assert_eq!(c.hp, 70);
    assert_eq!(c.heal(50), 30);
    assert_eq!(c.hp, 100);

    c.spend_mana(45);
    assert_eq!(c.mana, 15);
    assert_eq!(c.restore_mana(100), 45);
    assert_eq!(c.mana, 60);

    c.spend_mana(500);
    assert_eq!(c.mana, 0);
}

#[test]
fn level_up_adds_fixed_gains_and_refills() {
    let mut c = Combatant::new(
        "Knight",
        BaseStats {
            max_hp: 100,
            max_mana: 50,
            attack: 10,
            defense: 5,
            speed: 3,
        },
        vec![],
        PARTY_MAX_LEVEL,
    );
    c.apply_damage(40);
    c.spend_mana(20);

    assert!(c.level_up());
    assert_eq!(c.level, 2);
    assert_eq!(c.base.max_hp, 155);
    assert_eq!(c.base.max_mana, 90);
    assert_eq!(c.base.attack, 19);
    assert_eq!(c.base.defense, 12);
    assert_eq!(c.base.speed, 4);
    assert_eq!(c.hp, 155);
    assert_eq!(c.mana, 90);
    assert_eq!(c.attack, 19);
}

#[test]
fn level_up_at_cap_is_a_no_op() {
    let mut c = Combatant::new("Capped", stats(100, 0, 10, 5), vec![], 1);
    assert!(!c.level_up());
    assert_eq!(c.level, 1);
    assert_eq!(c.base.max_hp, 100);
}

#[test]
fn sync_to_level_is_a_no_op_the_second_time() {
    let mut c = Combatant::new("Knight", stats(100, 0, 10, 5), vec![], PARTY_MAX_LEVEL);
    assert_eq!(c.sync_to_level(5), 4);
    let snapshot = (c.level, c.base, c.hp);
    assert_eq!(c.sync_to_level(5), 0);
    assert_eq!((c.level, c.base, c.hp), snapshot);

    // never lowers the level, clamps to the cap
    assert_eq!(c.sync_to_level(2), 0);
    assert_eq!(c.level, 5);
    c.sync_to_level(99);
    assert_eq!(c.level, PARTY_MAX_LEVEL);
}

#[test]
fn stat_multiplier_rescales_and_refills() {
    let mut c = Combatant::new(
        "Goblin",
        BaseStats {
            max_hp: 100,
            max_mana: 50,
            attack: 10,
            defense: 5,
            speed: 3,
        },
        vec![],
        50,
    );
    c.apply_damage(20);
    c.apply_stat_multiplier(1.5, 2.0, 1.2, 1.1);

    assert_eq!(c.base.max_hp, 150);
    assert_eq!(c.base.max_mana, 100);
    assert_eq!(c.base.attack, 12);
    assert_eq!(c.base.defense, 6);
    assert_eq!(c.hp, 150);
    assert_eq!(c.mana, 100);
    assert_eq!(c.attack, 12);
    assert_eq!(c.speed, 3);
}

#[test]
fn recompute_folds_effects_from_base_and_is_idempotent() {
    let mut c = Combatant::new("Mage", stats(100, 0, 50, 20), vec![], PARTY_MAX_LEVEL);
    c.add_effect(StatusEffect::new(StatusKind::Buff, 10, 2));
    c.add_effect(StatusEffect::new(StatusKind::Debuff, 4, 2));
    c.add_effect(StatusEffect::new(StatusKind::Shield, 5, 1));

    c.recompute_stats();
    assert_eq!((c.attack, c.defense), (56, 35));
    c.recompute_stats();
    assert_eq!((c.attack, c.defense), (56, 35));
}

#[test]
fn heavy_debuff_floors_attack_at_zero() {
    let mut c = Combatant::new("Imp", stats(100, 0, 10, 0), vec![], 50);
    c.add_effect(StatusEffect::new(StatusKind::Debuff, 25, 2));
    c.recompute_stats();
    assert_eq!(c.attack, 0);
}

#[test]
fn zero_duration_effects_are_ignored() {
    let mut c = Combatant::new("Imp", stats(100, 0, 10, 0), vec![], 50);
    c.add_effect(StatusEffect::new(StatusKind::Buff, 25, 0));
    assert!(c.effects.is_empty());
}
