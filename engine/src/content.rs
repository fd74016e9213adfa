use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combatant::{BaseStats, Combatant, ENEMY_MAX_LEVEL, PARTY_MAX_LEVEL};
use crate::encounter::WorldConfig;
use crate::progression::{ProgressionLedger, Unlock};
use crate::skill::{EffectSpec, Scaling, Skill, TargetType};

const BUILTIN_HEROES: &str = include_str!("../content/heroes.yaml");
const BUILTIN_WORLDS: &str = include_str!("../content/worlds.yaml");

/// Stat block and skill list a combatant is spawned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub name: String,
    pub stats: BaseStats,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl CombatantTemplate {
    /// Stand-in for a world whose minion pool is empty.
    pub fn fallback_minion() -> Self {
        Self {
            name: "Shade".to_string(),
            stats: BaseStats {
                max_hp: 100,
                max_mana: 0,
                attack: 20,
                defense: 5,
                speed: 5,
            },
            skills: vec![Skill::new(
                "Claw",
                TargetType::RandomEnemy,
                vec![EffectSpec::Damage {
                    power: Scaling::flat(1.0),
                }],
            )],
        }
    }

    pub fn spawn_enemy(&self) -> Combatant {
        self.spawn(ENEMY_MAX_LEVEL)
    }

    pub fn spawn_hero(&self) -> Combatant {
        self.spawn(PARTY_MAX_LEVEL)
    }

    fn spawn(&self, max_level: u32) -> Combatant {
        let skills = if self.skills.is_empty() {
            warn!(combatant = %self.name, "template has no skills; using a basic attack");
            vec![Skill::basic_attack()]
        } else {
            self.skills.clone()
        };
        Combatant::new(self.name.clone(), self.stats, skills, max_level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroTemplate {
    #[serde(flatten)]
    pub template: CombatantTemplate,
    /// Unlock the hero is gated behind, if any.
    #[serde(default)]
    pub requires: Option<Unlock>,
}

#[derive(Debug, Deserialize)]
struct HeroesFile {
    heroes: Vec<HeroTemplate>,
}

#[derive(Debug, Deserialize)]
struct WorldsFile {
    worlds: Vec<WorldConfig>,
}

/// Hero roster and world definitions.
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    pub heroes: Vec<HeroTemplate>,
    pub worlds: IndexMap<u8, WorldConfig>,
}

impl ContentCatalog {
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_strs(BUILTIN_HEROES, BUILTIN_WORLDS).context("built-in content is malformed")
    }

    pub fn from_yaml_strs(heroes: &str, worlds: &str) -> Result<Self> {
        let heroes: HeroesFile = serde_yaml::from_str(heroes).context("failed to parse heroes YAML")?;
        let worlds: WorldsFile = serde_yaml::from_str(worlds).context("failed to parse worlds YAML")?;
        Self::assemble(heroes.heroes, worlds.worlds)
    }

    fn assemble(heroes: Vec<HeroTemplate>, worlds: Vec<WorldConfig>) -> Result<Self> {
        if heroes.is_empty() {
            bail!("content defines no heroes");
        }
        let mut by_id = IndexMap::with_capacity(worlds.len());
        for world in worlds {
            let id = world.id;
            if by_id.insert(id, world).is_some() {
                bail!("world {} is defined twice", id);
            }
        }
        Ok(Self {
            heroes,
            worlds: by_id,
        })
    }

    pub fn world(&self, id: u8) -> Option<&WorldConfig> {
        self.worlds.get(&id)
    }

    /// Fresh party for the ledger's current level. Gated heroes join only once
    /// their unlock is held.
    pub fn build_party(&self, ledger: &ProgressionLedger) -> Vec<Combatant> {
        let level = ledger.level.min(PARTY_MAX_LEVEL);
        self.heroes
            .iter()
            .filter(|h| h.requires.is_none_or(|u| ledger.has_unlock(u)))
            .map(|h| {
                let mut hero = h.template.spawn_hero();
                hero.sync_to_level(level);
                hero
            })
            .collect()
    }
}
