use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Buff,
    Debuff,
    Shield,
}

/// A timed modifier currently active on a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub magnitude: i32,
    /// Rounds left, counting the round the effect was applied in.
    pub remaining: u32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, magnitude: i32, duration: u32) -> Self {
        Self {
            kind,
            magnitude,
            remaining: duration,
        }
    }
}

/// Net attack/defense adjustment of a set of active effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatModifiers {
    pub attack: i32,
    pub defense: i32,
}

/// Buffs raise attack and defense, debuffs lower attack only, shields raise
/// defense only.
pub fn fold_modifiers(effects: &[StatusEffect]) -> StatModifiers {
    effects
        .iter()
        .fold(StatModifiers::default(), |mut acc, e| {
            match e.kind {
                StatusKind::Buff => {
                    acc.attack += e.magnitude;
                    acc.defense += e.magnitude;
                }
                StatusKind::Debuff => acc.attack -= e.magnitude,
                StatusKind::Shield => acc.defense += e.magnitude,
            }
            acc
        })
}

/// Decrement every effect by one round and drop the ones that ran out.
/// Returns the expired effects in their original order.
pub fn tick_effects(effects: &mut Vec<StatusEffect>) -> Vec<StatusEffect> {
    let mut expired = Vec::new();
    effects.retain_mut(|e| {
        e.remaining = e.remaining.saturating_sub(1);
        if e.remaining == 0 {
            expired.push(*e);
            false
        } else {
            true
        }
    });
    expired
}
