use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::battle::{Battle, BattleRules, Phase, PlayerCommand, TurnProgress};
use crate::content::ContentCatalog;
use crate::events::{BattleEvent, BattleOutcome};
use crate::progression::ProgressionLedger;
use crate::skill::TargetType;
use crate::BattleRng;

const DEFAULT_MAX_ROUNDS: u32 = 200;

fn default_world() -> u8 {
    1
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationConfig {
    #[serde(default = "default_world")]
    pub world: u8,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub rules: BattleRules,
    /// Rounds after which the autopilot abandons the battle.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: default_world(),
            seed: 0,
            rules: BattleRules::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationResult {
    pub outcome: BattleOutcome,
    /// Rounds in which a turn was taken; a round-cap abandon does not count
    /// the round it never started.
    pub rounds: u32,
    pub waves_cleared: u32,
    pub wave_count: u32,
    pub survivors: usize,
    pub log: Vec<String>,
    #[serde(skip)]
    pub events: Vec<BattleEvent>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationSummary {
    pub samples: u32,
    pub victories: u32,
    pub defeats: u32,
    pub abandoned: u32,
    pub avg_rounds: f64,
    pub avg_waves_cleared: f64,
}

/// Party autopilot: first usable skill in list order; single-enemy skills go
/// at the first living enemy.
pub fn autopilot_command(battle: &Battle<'_>) -> Option<PlayerCommand> {
    let actor = battle.current_actor()?;
    let member = &battle.party()[actor.index];
    let skill_index = member.first_usable_skill()?;
    let target = match member.skills[skill_index].target {
        TargetType::SingleEnemy => Some(battle.enemies().iter().position(|e| e.is_alive())?),
        _ => None,
    };
    Some(PlayerCommand {
        skill_index,
        target,
    })
}

/// Run one battle to completion with the party on autopilot. A victory
/// updates `ledger`.
pub fn simulate_battle(
    catalog: &ContentCatalog,
    cfg: &SimulationConfig,
    ledger: &mut ProgressionLedger,
) -> Result<SimulationResult> {
    let world = catalog
        .world(cfg.world)
        .ok_or_else(|| anyhow!("world {} not found in content", cfg.world))?;
    let party = catalog.build_party(ledger);
    let mut battle = Battle::start(world, party, ledger, BattleRng::from_seed(cfg.seed), cfg.rules)
        .with_context(|| format!("cannot start world {}", cfg.world))?;

    while !battle.is_finished() {
        if battle.round() > cfg.max_rounds {
            battle.abandon()?;
            break;
        }
        match battle.phase() {
            Phase::AwaitingPlayerAction { .. } => match autopilot_command(&battle) {
                Some(cmd) => match battle.submit_player_action(cmd)? {
                    TurnProgress::Resolved(_) => {}
                    TurnProgress::AwaitingTarget { .. } => {
                        battle.cancel_target_selection()?;
                        battle.pass_turn()?;
                    }
                },
                None => battle.pass_turn()?,
            },
            Phase::PlayerTargetSelection { .. } => battle.cancel_target_selection()?,
            Phase::EnemyActionPhase { .. } => {
                battle.resolve_enemy_phase();
            }
            // RoundEndTick never outlives the call that enters it
            Phase::RoundEndTick | Phase::Finished => break,
        }
    }

    let outcome = battle
        .outcome()
        .cloned()
        .ok_or_else(|| anyhow!("battle stopped without an outcome"))?;
    let waves_cleared = match outcome {
        BattleOutcome::Victory { .. } => battle.wave_count() as u32,
        _ => battle.wave_number().saturating_sub(1),
    };
    let events = battle.take_events();
    Ok(SimulationResult {
        outcome,
        rounds: battle.rounds_played(),
        waves_cleared,
        wave_count: battle.wave_count() as u32,
        survivors: battle.party().iter().filter(|c| c.is_alive()).count(),
        log: events.iter().map(ToString::to_string).collect(),
        events,
    })
}

/// Run `samples` battles on consecutive seeds, each against a copy of
/// `ledger`; the caller's ledger is left untouched.
pub fn simulate_many(
    catalog: &ContentCatalog,
    cfg: &SimulationConfig,
    ledger: &ProgressionLedger,
    samples: u32,
) -> Result<SimulationSummary> {
    let mut summary = SimulationSummary {
        samples,
        ..Default::default()
    };
    let mut rounds_total = 0u64;
    let mut waves_total = 0u64;
    for i in 0..samples {
        let trial = SimulationConfig {
            seed: cfg.seed.wrapping_add(u64::from(i)),
            ..cfg.clone()
        };
        let mut scratch = ledger.clone();
        let res = simulate_battle(catalog, &trial, &mut scratch)?;
        match res.outcome {
            BattleOutcome::Victory { .. } => summary.victories += 1,
            BattleOutcome::Defeat => summary.defeats += 1,
            BattleOutcome::Abandoned => summary.abandoned += 1,
        }
        rounds_total += u64::from(res.rounds);
        waves_total += u64::from(res.waves_cleared);
    }
    if samples > 0 {
        summary.avg_rounds = rounds_total as f64 / f64::from(samples);
        summary.avg_waves_cleared = waves_total as f64 / f64::from(samples);
    }
    Ok(summary)
}
