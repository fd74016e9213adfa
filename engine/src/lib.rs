use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod battle;
pub mod combatant;
pub mod content;
pub mod encounter;
pub mod error;
pub mod events;
pub mod progression;
pub mod skill;
pub mod status;

pub use battle::{Battle, BattleRules, EnemyFallback, Phase, PlayerCommand, TurnProgress};
pub use combatant::{BaseStats, Combatant, CombatantId, Side};
pub use content::{CombatantTemplate, ContentCatalog, HeroTemplate};
pub use encounter::{EncounterPlan, WaveEncounter, WorldConfig};
pub use error::{ActionError, BattleError};
pub use events::{ActionReport, BattleEvent, BattleOutcome, TargetDelta};
pub use progression::{ProgressionLedger, Unlock};
pub use skill::{EffectSpec, Scaling, Skill, TargetType};
pub use status::{StatusEffect, StatusKind};

/// Injected source of every random decision made during a battle.
///
/// `Seeded` draws from ChaCha8 so a whole battle replays from one seed;
/// `Scripted` replays fixed picks (each reduced modulo the requested range) and
/// falls back to the low end of the range once exhausted.
pub struct BattleRng {
    source: Source,
}

enum Source {
    Seeded(ChaCha8Rng),
    Scripted(VecDeque<usize>),
}

impl BattleRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn from_scripted(picks: Vec<usize>) -> Self {
        Self {
            source: Source::Scripted(picks.into()),
        }
    }

    /// Uniform index in `0..len`. `len` of 0 or 1 always yields 0.
    pub fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0..len),
            Source::Scripted(picks) => picks.pop_front().map_or(0, |p| p % len),
        }
    }

    /// Uniform value in `lo..=hi`.
    pub fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        lo + self.pick(hi - lo + 1)
    }
}
