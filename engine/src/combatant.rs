use serde::{Deserialize, Serialize};

use crate::skill::Skill;
use crate::status::{fold_modifiers, tick_effects, StatusEffect};

pub const PARTY_MAX_LEVEL: u32 = 30;
pub const ENEMY_MAX_LEVEL: u32 = 50;

/// Fraction of current defense subtracted from every incoming hit.
const DEFENSE_MITIGATION: f64 = 0.4;

/// Stat deltas granted by a single level-up.
pub const LEVEL_UP_GAINS: BaseStats = BaseStats {
    max_hp: 55,
    max_mana: 40,
    attack: 9,
    defense: 7,
    speed: 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Party,
    Enemy,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Party => Side::Enemy,
            Side::Enemy => Side::Party,
        }
    }
}

/// Position of a combatant in one of the two battle rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId {
    pub side: Side,
    pub index: usize,
}

impl CombatantId {
    pub fn party(index: usize) -> Self {
        Self {
            side: Side::Party,
            index,
        }
    }

    pub fn enemy(index: usize) -> Self {
        Self {
            side: Side::Enemy,
            index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BaseStats {
    pub max_hp: i32,
    pub max_mana: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

/// A party member or enemy: base stats, working stats, skills and effects.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub name: String,
    pub base: BaseStats,
    pub hp: i32,
    pub mana: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub level: u32,
    pub max_level: u32,
    /// Priority order for automatic skill selection.
    pub skills: Vec<Skill>,
    pub effects: Vec<StatusEffect>,
    alive: bool,
}

impl Combatant {
    pub fn new(name: impl Into<String>, base: BaseStats, skills: Vec<Skill>, max_level: u32) -> Self {
        Self {
            name: name.into(),
            base,
            hp: base.max_hp,
            mana: base.max_mana,
            attack: base.attack,
            defense: base.defense,
            speed: base.speed,
            level: 1,
            max_level: max_level.max(1),
            skills,
            effects: Vec::new(),
            alive: base.max_hp > 0,
        }
    }

    /// Once false, stays false: nothing in the engine resurrects.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mitigate by defense, floor at 1, and subtract from HP.
    /// Returns the HP actually removed; 0 only if the target was already dead.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        if !self.alive {
            return 0;
        }
        let effective = mitigated_damage(amount, self.defense);
        let before = self.hp;
        self.hp = (self.hp - effective).max(0);
        if self.hp == 0 {
            self.alive = false;
        }
        before - self.hp
    }

    /// Returns the HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.alive || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).clamp(0, self.base.max_hp);
        self.hp - before
    }

    /// Returns the mana actually restored.
    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        if !self.alive || amount <= 0 {
            return 0;
        }
        let before = self.mana;
        self.mana = (self.mana + amount).clamp(0, self.base.max_mana);
        self.mana - before
    }

    pub fn spend_mana(&mut self, amount: i32) {
        self.mana = (self.mana - amount.max(0)).max(0);
    }

    /// Returns false when already at the level cap.
    pub fn level_up(&mut self) -> bool {
        if self.level >= self.max_level {
            return false;
        }
        self.level += 1;
        self.base.max_hp += LEVEL_UP_GAINS.max_hp;
        self.base.max_mana += LEVEL_UP_GAINS.max_mana;
        self.base.attack += LEVEL_UP_GAINS.attack;
        self.base.defense += LEVEL_UP_GAINS.defense;
        self.base.speed += LEVEL_UP_GAINS.speed;
        self.hp = self.base.max_hp;
        self.mana = self.base.max_mana;
        self.attack = self.base.attack;
        self.defense = self.base.defense;
        self.speed = self.base.speed;
        true
    }

    /// Level up until `target` (clamped to `1..=max_level`) is reached.
    /// Never lowers the level. Returns the number of levels gained.
    pub fn sync_to_level(&mut self, target: u32) -> u32 {
        let target = target.clamp(1, self.max_level);
        let mut gained = 0;
        while self.level < target && self.level_up() {
            gained += 1;
        }
        gained
    }

    /// One-shot difficulty rescale of max HP/mana and base attack/defense.
    /// Refills HP and mana to the new maxima.
    pub fn apply_stat_multiplier(&mut self, hp_mult: f64, mana_mult: f64, atk_mult: f64, def_mult: f64) {
        self.base.max_hp = scale(self.base.max_hp, hp_mult).max(1);
        self.base.max_mana = scale(self.base.max_mana, mana_mult);
        self.base.attack = scale(self.base.attack, atk_mult);
        self.base.defense = scale(self.base.defense, def_mult);
        if self.alive {
            self.hp = self.base.max_hp;
            self.mana = self.base.max_mana;
        }
        self.recompute_stats();
    }

    /// Reset working attack/defense/speed to base, then fold in every active
    /// effect. Idempotent.
    pub fn recompute_stats(&mut self) {
        let mods = fold_modifiers(&self.effects);
        self.attack = (self.base.attack + mods.attack).max(0);
        self.defense = (self.base.defense + mods.defense).max(0);
        self.speed = self.base.speed;
    }

    pub fn add_effect(&mut self, effect: StatusEffect) {
        if effect.remaining > 0 {
            self.effects.push(effect);
        }
    }

    /// Returns the effects that expired this tick.
    pub fn tick_effects(&mut self) -> Vec<StatusEffect> {
        tick_effects(&mut self.effects)
    }

    pub fn tick_cooldowns(&mut self) {
        for skill in &mut self.skills {
            skill.reduce_cooldown();
        }
    }

    /// Index of the first skill that is currently usable.
    pub fn first_usable_skill(&self) -> Option<usize> {
        self.skills.iter().position(|s| s.can_use(self))
    }
}

/// `max(1, amount - round(defense * 0.4))`.
pub fn mitigated_damage(amount: i32, defense: i32) -> i32 {
    let reduction = (f64::from(defense.max(0)) * DEFENSE_MITIGATION).round() as i32;
    amount.saturating_sub(reduction).max(1)
}

fn scale(value: i32, mult: f64) -> i32 {
    (f64::from(value) * mult.max(0.0)).round() as i32
}
