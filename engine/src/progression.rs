use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const MAX_PLAYER_LEVEL: u32 = 50;
pub const WORLD_COUNT: u8 = 5;
pub const STARTING_EXPERIENCE_TO_NEXT: u64 = 100;

/// Player level needed to enter worlds 1..=5.
const WORLD_LEVEL_REQUIREMENTS: [u32; WORLD_COUNT as usize] = [1, 5, 10, 15, 20];

/// Clearing this world unlocks the bonus ally.
const BONUS_ALLY_WORLD: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unlock {
    BonusAlly,
}

/// Persistent player progress. Only a won battle mutates it, and level and the
/// cleared-world set never go backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionLedger {
    pub level: u32,
    pub experience: u64,
    pub experience_to_next: u64,
    pub cleared_worlds: BTreeSet<u8>,
    pub unlocks: BTreeSet<Unlock>,
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next: STARTING_EXPERIENCE_TO_NEXT,
            cleared_worlds: BTreeSet::new(),
            unlocks: BTreeSet::new(),
        }
    }
}

/// Required player level for a world, or `None` for an unknown world id.
pub fn world_requirement(world: u8) -> Option<u32> {
    let idx = usize::from(world).checked_sub(1)?;
    WORLD_LEVEL_REQUIREMENTS.get(idx).copied()
}

/// `150 + 120*(world-1) + 40*final_wave_enemies + 50*wave_count`.
pub fn victory_experience(world: u8, final_wave_enemies: usize, wave_count: usize) -> u64 {
    150 + 120 * u64::from(world.saturating_sub(1)) + 40 * final_wave_enemies as u64 + 50 * wave_count as u64
}

/// `round(next * 1.25 + 50)`.
pub fn next_threshold(current: u64) -> u64 {
    (current as f64 * 1.25 + 50.0).round() as u64
}

impl ProgressionLedger {
    pub fn at_level(level: u32) -> Self {
        Self {
            level: level.clamp(1, MAX_PLAYER_LEVEL),
            ..Self::default()
        }
    }

    pub fn world_requirement(&self, world: u8) -> Option<u32> {
        world_requirement(world)
    }

    /// Level requirement met and, past world 1, the previous world cleared.
    pub fn can_enter_world(&self, world: u8) -> bool {
        let Some(required) = world_requirement(world) else {
            return false;
        };
        self.level >= required && (world == 1 || self.is_cleared(world - 1))
    }

    pub fn is_cleared(&self, world: u8) -> bool {
        self.cleared_worlds.contains(&world)
    }

    pub fn has_unlock(&self, unlock: Unlock) -> bool {
        self.unlocks.contains(&unlock)
    }

    /// Returns true when the world was not cleared before.
    pub fn record_clear(&mut self, world: u8) -> bool {
        self.cleared_worlds.insert(world)
    }

    /// Grant whatever clearing `world` unlocks; returns only new unlocks.
    pub fn apply_world_unlocks(&mut self, world: u8) -> Vec<Unlock> {
        let mut granted = Vec::new();
        if world == BONUS_ALLY_WORLD && self.unlocks.insert(Unlock::BonusAlly) {
            granted.push(Unlock::BonusAlly);
        }
        granted
    }

    /// Add experience and process every level-up it pays for.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u64) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.level < MAX_PLAYER_LEVEL && self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.level += 1;
            self.experience_to_next = next_threshold(self.experience_to_next);
            gained += 1;
        }
        gained
    }
}
