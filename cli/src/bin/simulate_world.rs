use clap::Parser;
use serde::Serialize;
use wavebound_engine::api::{simulate_many, SimulationConfig, SimulationSummary};
use wavebound_engine::{BattleRules, ContentCatalog, EnemyFallback, ProgressionLedger};

#[derive(Parser)]
#[command(name = "simulate-world")]
#[command(about = "Monte Carlo sim: many autopilot battles against one world")]
struct Args {
    /// World to fight
    #[arg(long, default_value_t = 1)]
    world: u8,

    /// Number of trials
    #[arg(long, default_value_t = 200)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Player level the party is built at
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Treat worlds 1..=N as already cleared (unlocks apply)
    #[arg(long, default_value_t = 0)]
    cleared_through: u8,

    /// Safety cap on rounds per trial
    #[arg(long, default_value_t = 200)]
    max_rounds: u32,

    /// Enemies with no usable skill cast their first skill anyway
    #[arg(long, default_value_t = false)]
    legacy_enemy_ai: bool,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    world: u8,
    level: u32,
    summary: &'a SimulationSummary,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let catalog = ContentCatalog::builtin()?;

    let mut ledger = ProgressionLedger::at_level(args.level);
    for world in 1..=args.cleared_through {
        ledger.record_clear(world);
        ledger.apply_world_unlocks(world);
    }

    let cfg = SimulationConfig {
        world: args.world,
        seed: args.seed,
        rules: BattleRules {
            enemy_fallback: if args.legacy_enemy_ai {
                EnemyFallback::ForceFirstSkill
            } else {
                EnemyFallback::SkipTurn
            },
        },
        max_rounds: args.max_rounds,
    };
    let summary = simulate_many(&catalog, &cfg, &ledger, args.trials)?;

    if args.json {
        let report = Report {
            world: args.world,
            level: ledger.level,
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let trials_f = f64::from(summary.samples.max(1));
    println!("simulate-world results");
    println!("----------------------");
    println!("world:              {}", args.world);
    println!("party level:        {}", ledger.level);
    println!("trials:             {}", summary.samples);
    println!();
    println!("victory rate:       {:.1}%", f64::from(summary.victories) / trials_f * 100.0);
    println!("defeat rate:        {:.1}%", f64::from(summary.defeats) / trials_f * 100.0);
    println!("abandoned:          {}", summary.abandoned);
    println!("avg rounds:         {:.2}", summary.avg_rounds);
    println!("avg waves cleared:  {:.2}", summary.avg_waves_cleared);

    Ok(())
}
