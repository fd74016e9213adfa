use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, CombatantId, Side};
use crate::events::{ActionReport, TargetDelta};
use crate::status::{StatusEffect, StatusKind};
use crate::BattleRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[serde(rename = "self")]
    SelfTarget,
    SingleEnemy,
    SingleAlly,
    AllEnemies,
    AllAllies,
    RandomEnemy,
    RandomAlly,
}

/// Level-scaled coefficient: `base + per_level * max(0, level - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub base: f64,
    #[serde(default)]
    pub per_level: f64,
}

impl Scaling {
    pub const fn flat(base: f64) -> Self {
        Self {
            base,
            per_level: 0.0,
        }
    }

    pub fn at(&self, level: u32) -> f64 {
        self.base + self.per_level * f64::from(level.saturating_sub(1))
    }
}

/// One step of a skill's effect, applied to each resolved target in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSpec {
    /// Damage equal to `power` times the caster's current attack.
    Damage { power: Scaling },
    /// Healing equal to `power` times the caster's max HP.
    Heal { power: Scaling },
    Status {
        status: StatusKind,
        magnitude: i32,
        duration: u32,
    },
    RestoreMana { amount: i32 },
    /// Damage like `Damage`, then heal the caster by `ratio` of what landed.
    Drain { power: Scaling, ratio: f64 },
}

/// Caster numbers read once, before any effect lands.
#[derive(Debug, Clone, Copy)]
struct CasterSnapshot {
    attack: i32,
    max_hp: i32,
    level: u32,
}

impl CasterSnapshot {
    fn of(c: &Combatant) -> Self {
        Self {
            attack: c.attack,
            max_hp: c.base.max_hp,
            level: c.level,
        }
    }

    fn of_attack(&self, power: &Scaling) -> i32 {
        (f64::from(self.attack) * power.at(self.level)).round() as i32
    }

    fn of_max_hp(&self, power: &Scaling) -> i32 {
        (f64::from(self.max_hp) * power.at(self.level)).round() as i32
    }
}

impl EffectSpec {
    /// Returns HP the caster drains back from this target.
    fn apply(&self, caster: &CasterSnapshot, target: &mut Combatant, delta: &mut TargetDelta) -> i32 {
        if !target.is_alive() {
            return 0;
        }
        match self {
            EffectSpec::Damage { power } => {
                delta.hp_delta -= target.apply_damage(caster.of_attack(power));
                0
            }
            EffectSpec::Heal { power } => {
                delta.hp_delta += target.heal(caster.of_max_hp(power));
                0
            }
            EffectSpec::Status {
                status,
                magnitude,
                duration,
            } => {
                target.add_effect(StatusEffect::new(*status, *magnitude, *duration));
                target.recompute_stats();
                delta.statuses.push(*status);
                0
            }
            EffectSpec::RestoreMana { amount } => {
                delta.mana_delta += target.restore_mana(*amount);
                0
            }
            EffectSpec::Drain { power, ratio } => {
                let dealt = target.apply_damage(caster.of_attack(power));
                delta.hp_delta -= dealt;
                (f64::from(dealt) * ratio.max(0.0)).round() as i32
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub mana_cost: i32,
    /// Rounds the skill stays locked after use.
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default, skip_serializing)]
    pub current_cooldown: u32,
    pub target: TargetType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

impl Skill {
    pub fn new(name: impl Into<String>, target: TargetType, effects: Vec<EffectSpec>) -> Self {
        Self {
            name: name.into(),
            mana_cost: 0,
            cooldown: 0,
            current_cooldown: 0,
            target,
            description: String::new(),
            effects,
        }
    }

    pub fn with_cost(mut self, mana_cost: i32, cooldown: u32) -> Self {
        self.mana_cost = mana_cost;
        self.cooldown = cooldown;
        self
    }

    /// Zero-cost single-target strike used whenever content leaves a
    /// combatant without skills.
    pub fn basic_attack() -> Self {
        let mut skill = Self::new(
            "Attack",
            TargetType::SingleEnemy,
            vec![EffectSpec::Damage {
                power: Scaling::flat(1.0),
            }],
        );
        skill.description = "A plain weapon strike.".to_string();
        skill
    }

    pub fn can_use(&self, caster: &Combatant) -> bool {
        self.current_cooldown == 0 && caster.mana >= self.mana_cost
    }

    pub fn reduce_cooldown(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }

    pub fn reset_cooldown(&mut self) {
        self.current_cooldown = self.cooldown;
    }
}

fn roster<'r>(side: Side, party: &'r [Combatant], enemies: &'r [Combatant]) -> &'r [Combatant] {
    match side {
        Side::Party => party,
        Side::Enemy => enemies,
    }
}

fn roster_mut<'r>(
    side: Side,
    party: &'r mut [Combatant],
    enemies: &'r mut [Combatant],
) -> &'r mut [Combatant] {
    match side {
        Side::Party => party,
        Side::Enemy => enemies,
    }
}

/// Living members of one side, in roster order.
pub fn living(side: Side, party: &[Combatant], enemies: &[Combatant]) -> Vec<CombatantId> {
    roster(side, party, enemies)
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive())
        .map(|(index, _)| CombatantId { side, index })
        .collect()
}

/// Turn a declared target policy into concrete targets. Dead combatants are
/// never returned; an empty result means the skill has nothing to act on.
pub fn resolve_targets(
    target: TargetType,
    caster: CombatantId,
    party: &[Combatant],
    enemies: &[Combatant],
    rng: &mut BattleRng,
) -> Vec<CombatantId> {
    let allies = caster.side;
    let foes = caster.side.opposite();
    match target {
        TargetType::SelfTarget => vec![caster],
        TargetType::AllAllies => living(allies, party, enemies),
        TargetType::AllEnemies => living(foes, party, enemies),
        TargetType::SingleAlly | TargetType::RandomAlly => pick_one(living(allies, party, enemies), rng),
        TargetType::SingleEnemy | TargetType::RandomEnemy => pick_one(living(foes, party, enemies), rng),
    }
}

fn pick_one(candidates: Vec<CombatantId>, rng: &mut BattleRng) -> Vec<CombatantId> {
    if candidates.is_empty() {
        return candidates;
    }
    vec![candidates[rng.pick(candidates.len())]]
}

/// Commit a skill: pay its mana cost once, restart its cooldown, then apply its
/// effects to every target. Usability is the caller's concern; an empty or
/// all-dead target list still pays the cost.
pub fn execute(
    caster: CombatantId,
    skill_index: usize,
    targets: &[CombatantId],
    party: &mut [Combatant],
    enemies: &mut [Combatant],
) -> ActionReport {
    let Some(actor) = roster_mut(caster.side, party, enemies).get_mut(caster.index) else {
        return ActionReport::new(caster, String::new(), String::new());
    };
    let Some(skill) = actor.skills.get_mut(skill_index) else {
        return ActionReport::new(caster, actor.name.clone(), String::new());
    };
    skill.reset_cooldown();
    let cost = skill.mana_cost;
    let skill_name = skill.name.clone();
    let effects = skill.effects.clone();
    actor.spend_mana(cost);
    let snapshot = CasterSnapshot::of(actor);
    let mut report = ActionReport::new(caster, actor.name.clone(), skill_name);

    let mut drained = 0;
    for &id in targets {
        let Some(target) = roster_mut(id.side, party, enemies).get_mut(id.index) else {
            continue;
        };
        let mut delta = TargetDelta::new(id, &target.name);
        for effect in &effects {
            drained += effect.apply(&snapshot, target, &mut delta);
        }
        delta.defeated = !target.is_alive();
        report.deltas.push(delta);
    }

    if drained > 0 {
        if let Some(actor) = roster_mut(caster.side, party, enemies).get_mut(caster.index) {
            let mut delta = TargetDelta::new(caster, &actor.name);
            delta.hp_delta = actor.heal(drained);
            report.deltas.push(delta);
        }
    }
    report
}
