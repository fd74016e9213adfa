use wavebound_engine::skill::{execute, living, resolve_targets};
use wavebound_engine::{
    BaseStats, BattleRng, Combatant, CombatantId, EffectSpec, Scaling, Side, Skill, StatusKind,
    TargetType,
};

fn body(name: &str, max_hp: i32, max_mana: i32, attack: i32, skills: Vec<Skill>) -> Combatant {
    Combatant::new(
        name,
        BaseStats {
            max_hp,
            max_mana,
            attack,
            defense: 0,
            speed: 5,
        },
        skills,
        50,
    )
}

fn strike(target: TargetType, cost: i32, cooldown: u32) -> Skill {
    Skill::new(
        "Strike",
        target,
        vec![EffectSpec::Damage {
            power: Scaling::flat(1.0),
        }],
    )
    .with_cost(cost, cooldown)
}

#[test]
fn cost_and_cooldown_gate_usability() {
    let mut party = vec![body("Mage", 100, 15, 10, vec![strike(TargetType::SingleEnemy, 10, 2)])];
    let mut enemies = vec![body("Dummy", 500, 0, 1, vec![])];
    assert!(party[0].skills[0].can_use(&party[0]));

    execute(CombatantId::party(0), 0, &[CombatantId::enemy(0)], &mut party, &mut enemies);
    assert_eq!(party[0].mana, 5);
    assert_eq!(party[0].skills[0].current_cooldown, 2);
    assert!(!party[0].skills[0].can_use(&party[0]));

    party[0].tick_cooldowns();
    assert_eq!(party[0].skills[0].current_cooldown, 1);
    party[0].tick_cooldowns();
    party[0].tick_cooldowns();
    assert_eq!(party[0].skills[0].current_cooldown, 0);
    // cooldown is clear but mana is still short
    assert!(!party[0].skills[0].can_use(&party[0]));
    assert_eq!(party[0].first_usable_skill(), None);
}

#[test]
fn empty_target_list_still_pays_once() {
    let mut party = vec![body("Mage", 100, 30, 10, vec![strike(TargetType::AllEnemies, 12, 1)])];
    let mut enemies: Vec<Combatant> = Vec::new();

    let report = execute(CombatantId::party(0), 0, &[], &mut party, &mut enemies);
    assert!(report.deltas.is_empty());
    assert_eq!(report.skill_name, "Strike");
    assert_eq!(party[0].mana, 18);
    assert_eq!(party[0].skills[0].current_cooldown, 1);
}

#[test]
fn area_skill_pays_once_and_hits_every_target() {
    let mut party = vec![body("Mage", 100, 30, 40, vec![strike(TargetType::AllEnemies, 10, 0)])];
    let mut enemies = vec![
        body("A", 100, 0, 1, vec![]),
        body("B", 100, 0, 1, vec![]),
        body("C", 100, 0, 1, vec![]),
    ];
    let mut rng = BattleRng::from_seed(0);

    let targets = resolve_targets(
        TargetType::AllEnemies,
        CombatantId::party(0),
        &party,
        &enemies,
        &mut rng,
    );
    let report = execute(CombatantId::party(0), 0, &targets, &mut party, &mut enemies);
    assert_eq!(party[0].mana, 20);
    assert_eq!(report.deltas.len(), 3);
    assert!(enemies.iter().all(|e| e.hp == 60));
}

#[test]
fn self_target_resolves_to_the_caster() {
    let party = vec![body("Knight", 100, 0, 10, vec![]), body("Cleric", 100, 0, 10, vec![])];
    let enemies = vec![body("Wolf", 100, 0, 10, vec![])];
    let mut rng = BattleRng::from_seed(7);

    let caster = CombatantId::party(1);
    assert_eq!(
        resolve_targets(TargetType::SelfTarget, caster, &party, &enemies, &mut rng),
        vec![caster]
    );
    // from the enemy side, allies and foes swap
    assert_eq!(
        resolve_targets(TargetType::AllEnemies, CombatantId::enemy(0), &party, &enemies, &mut rng),
        vec![CombatantId::party(0), CombatantId::party(1)]
    );
}

#[test]
fn random_pick_skips_dead_combatants() {
    let party = vec![body("Ranger", 100, 0, 10, vec![])];
    let mut enemies = vec![
        body("Dead", 10, 0, 1, vec![]),
        body("Left", 100, 0, 1, vec![]),
        body("Right", 100, 0, 1, vec![]),
    ];
    enemies[0].apply_damage(999);
    assert_eq!(
        living(Side::Enemy, &party, &enemies),
        vec![CombatantId::enemy(1), CombatantId::enemy(2)]
    );

    let mut rng = BattleRng::from_scripted(vec![1, 0]);
    let first = resolve_targets(TargetType::RandomEnemy, CombatantId::party(0), &party, &enemies, &mut rng);
    let second = resolve_targets(TargetType::RandomEnemy, CombatantId::party(0), &party, &enemies, &mut rng);
    assert_eq!(first, vec![CombatantId::enemy(2)]);
    assert_eq!(second, vec![CombatantId::enemy(1)]);

    enemies[1].apply_damage(999);
    enemies[2].apply_damage(999);
    assert!(resolve_targets(TargetType::RandomEnemy, CombatantId::party(0), &party, &enemies, &mut rng).is_empty());
}

#[test]
fn scaling_grows_linearly_past_level_one() {
    let s = Scaling {
        base: 1.0,
        per_level: 0.1,
    };
    assert_eq!(s.at(0), 1.0);
    assert_eq!(s.at(1), 1.0);
    assert!((s.at(5) - 1.4).abs() < 1e-9);
    assert_eq!(Scaling::flat(2.5).at(30), 2.5);
}

#[test]
fn drain_heals_the_caster_by_ratio_of_damage_dealt() {
    let drain = Skill::new(
        "Siphon",
        TargetType::SingleEnemy,
        vec![EffectSpec::Drain {
            power: Scaling::flat(1.0),
            ratio: 0.5,
        }],
    );
    let mut party = vec![body("Warlock", 200, 0, 100, vec![drain])];
    party[0].apply_damage(100);
    let mut enemies = vec![body("Ghoul", 500, 0, 1, vec![])];

    let report = execute(CombatantId::party(0), 0, &[CombatantId::enemy(0)], &mut party, &mut enemies);
    assert_eq!(enemies[0].hp, 400);
    assert_eq!(party[0].hp, 150);
    assert_eq!(report.deltas.len(), 2);
    assert_eq!(report.deltas[1].target, CombatantId::party(0));
    assert_eq!(report.deltas[1].hp_delta, 50);
}

#[test]
fn heal_scales_with_caster_max_hp() {
    let mend = Skill::new(
        "Mend",
        TargetType::SingleAlly,
        vec![EffectSpec::Heal {
            power: Scaling::flat(0.25),
        }],
    );
    let mut party = vec![body("Cleric", 200, 0, 10, vec![mend]), body("Knight", 300, 0, 10, vec![])];
    party[1].apply_damage(80);
    let mut enemies: Vec<Combatant> = Vec::new();

    let report = execute(CombatantId::party(0), 0, &[CombatantId::party(1)], &mut party, &mut enemies);
    assert_eq!(report.deltas[0].hp_delta, 50);
    assert_eq!(party[1].hp, 270);
}

#[test]
fn status_applies_immediately_and_is_reported() {
    let rally = Skill::new(
        "Rally",
        TargetType::SelfTarget,
        vec![EffectSpec::Status {
            status: StatusKind::Buff,
            magnitude: 10,
            duration: 2,
        }],
    );
    let mut party = vec![body("Knight", 100, 0, 30, vec![rally])];
    let mut enemies: Vec<Combatant> = Vec::new();

    let report = execute(CombatantId::party(0), 0, &[CombatantId::party(0)], &mut party, &mut enemies);
    assert_eq!(report.deltas[0].statuses, vec![StatusKind::Buff]);
    assert_eq!(party[0].attack, 40);
    assert_eq!(party[0].defense, 10);
}

#[test]
fn effects_skip_dead_targets_but_cost_is_paid() {
    let mut party = vec![body("Mage", 100, 20, 50, vec![strike(TargetType::SingleEnemy, 5, 0)])];
    let mut enemies = vec![body("Corpse", 10, 0, 1, vec![])];
    enemies[0].apply_damage(999);

    let report = execute(CombatantId::party(0), 0, &[CombatantId::enemy(0)], &mut party, &mut enemies);
    assert_eq!(party[0].mana, 15);
    assert_eq!(report.deltas[0].hp_delta, 0);
    assert!(report.deltas[0].defeated);
}

#[test]
fn effect_specs_parse_from_yaml() {
    let yaml = r#"
name: Leech
mana_cost: 8
cooldown: 1
target: random_enemy
effects:
  - kind: drain
    power: { base: 0.8, per_level: 0.02 }
    ratio: 0.5
  - kind: status
    status: debuff
    magnitude: 4
    duration: 2
"#;
    let skill: Skill = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(skill.mana_cost, 8);
    assert_eq!(skill.current_cooldown, 0);
    assert_eq!(skill.target, TargetType::RandomEnemy);
    assert_eq!(skill.effects.len(), 2);

    let own: Skill = serde_yaml::from_str("name: Guard\ntarget: self\n").unwrap();
    assert_eq!(own.target, TargetType::SelfTarget);
    assert!(own.effects.is_empty());
}
