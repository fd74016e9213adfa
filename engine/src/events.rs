//! Everything the battle core hands to a presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::progression::Unlock;
use crate::status::StatusKind;

/// What one skill did to one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDelta {
    pub target: CombatantId,
    pub name: String,
    /// Negative for damage, positive for healing.
    pub hp_delta: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub mana_delta: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusKind>,
    pub defeated: bool,
}

impl TargetDelta {
    pub fn new(target: CombatantId, name: &str) -> Self {
        Self {
            target,
            name: name.to_string(),
            hp_delta: 0,
            mana_delta: 0,
            statuses: Vec::new(),
            defeated: false,
        }
    }
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

/// One resolved action: who acted, with what, and the per-target result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    pub actor: CombatantId,
    pub actor_name: String,
    pub skill_name: String,
    pub deltas: Vec<TargetDelta>,
}

impl ActionReport {
    pub fn new(actor: CombatantId, actor_name: String, skill_name: String) -> Self {
        Self {
            actor,
            actor_name,
            skill_name,
            deltas: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory {
        exp_earned: u64,
        leveled_up: bool,
        new_level: u32,
        world_unlocks: Vec<Unlock>,
    },
    Defeat,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BattleEvent {
    WaveStarted {
        wave_number: u32,
        wave_count: u32,
        boss: bool,
        enemies: Vec<String>,
    },
    Action(ActionReport),
    TurnSkipped { actor: CombatantId, name: String },
    WaveCleared { wave_number: u32 },
    RoundEnded { round: u32 },
    Finished(BattleOutcome),
}

impl BattleEvent {
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"kind":"error","error":"{e}"}}"#))
    }
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::WaveStarted {
                wave_number,
                wave_count,
                boss,
                enemies,
            } => write!(
                f,
                "[WAVE] {}/{}{} → {}",
                wave_number,
                wave_count,
                if *boss { " (BOSS)" } else { "" },
                enemies.join(", ")
            ),
            BattleEvent::Action(report) => {
                write!(f, "[ACT][{}] {}", report.actor_name, report.skill_name)?;
                if report.deltas.is_empty() {
                    return write!(f, " → no target");
                }
                for (i, d) in report.deltas.iter().enumerate() {
                    write!(f, "{} {} {:+}", if i == 0 { " →" } else { "," }, d.name, d.hp_delta)?;
                    for s in &d.statuses {
                        write!(f, " +{:?}", s)?;
                    }
                    if d.defeated {
                        write!(f, " (defeated)")?;
                    }
                }
                Ok(())
            }
            BattleEvent::TurnSkipped { name, .. } => write!(f, "[SKIP][{}] turn skipped", name),
            BattleEvent::WaveCleared { wave_number } => write!(f, "[CLEAR] wave {}", wave_number),
            BattleEvent::RoundEnded { round } => write!(f, "[ROUND] {} ends", round),
            BattleEvent::Finished(outcome) => match outcome {
                BattleOutcome::Victory {
                    exp_earned,
                    new_level,
                    world_unlocks,
                    ..
                } => {
                    write!(f, "[END] victory exp={} level={}", exp_earned, new_level)?;
                    if !world_unlocks.is_empty() {
                        write!(f, " unlocks={:?}", world_unlocks)?;
                    }
                    Ok(())
                }
                BattleOutcome::Defeat => write!(f, "[END] defeat"),
                BattleOutcome::Abandoned => write!(f, "[END] abandoned"),
            },
        }
    }
}
