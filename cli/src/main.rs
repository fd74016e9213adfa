use anyhow::Context;
use clap::{Parser, Subcommand};
use encoding_rs::Encoding;
use std::{fs, path::Path, path::PathBuf};
use wavebound_engine::api::{simulate_battle, SimulationConfig};
use wavebound_engine::progression::world_requirement;
use wavebound_engine::{BattleRng, BattleRules, ContentCatalog, EnemyFallback, ProgressionLedger};

#[derive(Subcommand)]
enum Cmd {
    /// List worlds with their level requirement and lock state
    Worlds {
        /// Ledger JSON to check lock state against (fresh ledger if omitted)
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Print the encounter plan a seed produces for a world
    Plan {
        #[arg(long, default_value_t = 1)]
        world: u8,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Run one battle with the party on autopilot
    Simulate {
        #[arg(long, default_value_t = 1)]
        world: u8,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Ledger JSON to read progress from (fresh ledger if omitted or missing)
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Write the updated ledger back to --ledger
        #[arg(long, default_value_t = false)]
        save: bool,
        /// Enemies with no usable skill cast their first skill anyway
        #[arg(long, default_value_t = false)]
        legacy_enemy_ai: bool,
        /// Abandon the battle after this many rounds
        #[arg(long, default_value_t = 200)]
        max_rounds: u32,
        /// Emit one JSON event per line instead of the text log
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show a ledger
    Ledger {
        #[arg(long)]
        ledger: PathBuf,
    },
}

#[derive(Parser)]
#[command(name = "wavebound")]
#[command(about = "Wavebound battle engine harness")]
struct Cli {
    /// Directory holding heroes.yaml and worlds.yaml (built-ins if omitted)
    #[arg(long, global = true)]
    content: Option<PathBuf>,
    /// Log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn load_catalog(dir: Option<&Path>) -> anyhow::Result<ContentCatalog> {
    match dir {
        Some(dir) => {
            let heroes = read_text_auto(&dir.join("heroes.yaml"))
                .with_context(|| format!("failed to read heroes.yaml in {}", dir.display()))?;
            let worlds = read_text_auto(&dir.join("worlds.yaml"))
                .with_context(|| format!("failed to read worlds.yaml in {}", dir.display()))?;
            ContentCatalog::from_yaml_strs(&heroes, &worlds)
        }
        None => ContentCatalog::builtin(),
    }
}

fn load_ledger(path: Option<&Path>) -> anyhow::Result<ProgressionLedger> {
    match path {
        Some(p) if p.exists() => {
            let text = read_text_auto(p)?;
            serde_json::from_str(&text).with_context(|| format!("failed to parse ledger: {}", p.display()))
        }
        _ => Ok(ProgressionLedger::default()),
    }
}

fn save_ledger(path: &Path, ledger: &ProgressionLedger) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    fs::write(path, json).with_context(|| format!("failed to write ledger: {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let catalog = load_catalog(cli.content.as_deref())?;

    match cli.cmd {
        Cmd::Worlds { ledger } => {
            let ledger = load_ledger(ledger.as_deref())?;
            for world in catalog.worlds.values() {
                let required = world_requirement(world.id)
                    .map_or_else(|| "-".to_string(), |lvl| lvl.to_string());
                let state = if ledger.is_cleared(world.id) {
                    "cleared"
                } else if ledger.can_enter_world(world.id) {
                    "open"
                } else {
                    "locked"
                };
                println!(
                    "{} {:<16} req Lv{:<3} waves={:<3} {}",
                    world.id, world.name, required, world.wave_count, state
                );
            }
        }
        Cmd::Plan { world, seed } => {
            let config = catalog
                .world(world)
                .ok_or_else(|| anyhow::anyhow!("world {} not found", world))?;
            let mut rng = BattleRng::from_seed(seed);
            let plan = config.build_plan(&mut rng);
            println!("World {}: {}", config.id, config.name);
            for wave in &plan.waves {
                let roster = wave
                    .enemies
                    .iter()
                    .map(|e| format!("{} Lv{} HP {} ATK {}", e.name, e.level, e.base.max_hp, e.base.attack))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "Wave {}{}: {}",
                    wave.wave_number,
                    if wave.is_boss { " (BOSS)" } else { "" },
                    roster
                );
            }
        }
        Cmd::Simulate {
            world,
            seed,
            ledger: ledger_path,
            save,
            legacy_enemy_ai,
            max_rounds,
            json,
        } => {
            let mut ledger = load_ledger(ledger_path.as_deref())?;
            let cfg = SimulationConfig {
                world,
                seed,
                rules: BattleRules {
                    enemy_fallback: if legacy_enemy_ai {
                        EnemyFallback::ForceFirstSkill
                    } else {
                        EnemyFallback::SkipTurn
                    },
                },
                max_rounds,
            };
            let res = simulate_battle(&catalog, &cfg, &mut ledger)?;
            if json {
                for event in &res.events {
                    println!("{}", event.to_json_line());
                }
            } else {
                for line in &res.log {
                    println!("{}", line);
                }
                println!(
                    "rounds={} waves_cleared={}/{} survivors={}",
                    res.rounds, res.waves_cleared, res.wave_count, res.survivors
                );
            }
            if save {
                let path = ledger_path
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("--save needs --ledger"))?;
                save_ledger(path, &ledger)?;
            }
        }
        Cmd::Ledger { ledger } => {
            let ledger = load_ledger(Some(&ledger))?;
            println!("{}", serde_json::to_string_pretty(&ledger)?);
        }
    }
    Ok(())
}
