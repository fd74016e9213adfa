use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combatant::{Combatant, ENEMY_MAX_LEVEL};
use crate::content::CombatantTemplate;
use crate::BattleRng;

const MINION_COUNT: (usize, usize) = (2, 5);
const BOSS_SUPPORT_COUNT: (usize, usize) = (1, 2);
const BOSS_SUPPORT_LEVEL_BONUS: u32 = 2;
const BOSS_SUPPORT_MULTIPLIER: f64 = 1.25;
const MINION_DIFFICULTY_PER_WAVE: f64 = 0.05;
const WAVE_SCALAR_PER_WAVE: f64 = 0.07;
const BOSS_WAVE_SCALAR_BONUS: f64 = 0.25;
const ROSTER_LEVEL_STEP: u32 = 2;

/// Extra multipliers for the last enemy of a scaled roster.
const ANCHOR_HP_BONUS: f64 = 0.3;
const ANCHOR_ATK_BONUS: f64 = 0.25;
const ANCHOR_DEF_BONUS: f64 = 0.2;

fn default_wave_count() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub id: u8,
    pub name: String,
    pub base_level: u32,
    pub multiplier: f64,
    #[serde(default = "default_wave_count")]
    pub wave_count: u32,
    pub boss_level: u32,
    pub boss_multiplier: f64,
    #[serde(default)]
    pub minions: Vec<CombatantTemplate>,
    pub boss: CombatantTemplate,
}

#[derive(Debug, Clone)]
pub struct WaveEncounter {
    pub wave_number: u32,
    pub is_boss: bool,
    pub enemies: Vec<Combatant>,
}

#[derive(Debug, Clone)]
pub struct EncounterPlan {
    pub world: u8,
    pub waves: Vec<WaveEncounter>,
}

/// `1 + (wave - 1) * 0.05`, baked into each minion at spawn.
pub fn minion_difficulty(wave_number: u32) -> f64 {
    1.0 + f64::from(wave_number.saturating_sub(1)) * MINION_DIFFICULTY_PER_WAVE
}

/// `1 + (wave - 1) * 0.07`, plus 0.25 on boss waves.
pub fn wave_scalar(wave_number: u32, is_boss: bool) -> f64 {
    let scalar = 1.0 + f64::from(wave_number.saturating_sub(1)) * WAVE_SCALAR_PER_WAVE;
    if is_boss {
        scalar + BOSS_WAVE_SCALAR_BONUS
    } else {
        scalar
    }
}

impl WorldConfig {
    fn draw_minion(&self, rng: &mut BattleRng) -> Combatant {
        if self.minions.is_empty() {
            warn!(world = self.id, "minion pool is empty; substituting a default minion");
            return CombatantTemplate::fallback_minion().spawn_enemy();
        }
        self.minions[rng.pick(self.minions.len())].spawn_enemy()
    }

    fn minion_wave(&self, wave_number: u32, rng: &mut BattleRng) -> Vec<Combatant> {
        let count = rng.range_inclusive(MINION_COUNT.0, MINION_COUNT.1);
        let level = self.base_level + wave_number / 2;
        let difficulty = minion_difficulty(wave_number);
        (0..count)
            .map(|_| {
                let mut minion = self.draw_minion(rng);
                minion.sync_to_level(level);
                minion.apply_stat_multiplier(difficulty, difficulty, difficulty, difficulty);
                minion
            })
            .collect()
    }

    /// Supporting minions first, the boss last.
    fn boss_wave(&self, rng: &mut BattleRng) -> Vec<Combatant> {
        let support = rng.range_inclusive(BOSS_SUPPORT_COUNT.0, BOSS_SUPPORT_COUNT.1);
        let mut roster: Vec<Combatant> = (0..support)
            .map(|_| {
                let mut minion = self.draw_minion(rng);
                minion.sync_to_level(self.base_level + BOSS_SUPPORT_LEVEL_BONUS);
                let m = BOSS_SUPPORT_MULTIPLIER;
                minion.apply_stat_multiplier(m, m, m, m);
                minion
            })
            .collect();
        roster.push(self.spawn_boss());
        roster
    }

    fn spawn_boss(&self) -> Combatant {
        let mut boss = self.boss.spawn_enemy();
        boss.sync_to_level(self.boss_level);
        let m = self.boss_multiplier;
        boss.apply_stat_multiplier(m, m, m, m);
        boss
    }

    /// Make sure `plan` ends in a boss wave with a living enemy. A plan with no
    /// waves gets one, and a final roster with nobody alive is replaced by this
    /// world's boss. Returns true when the plan had to be patched.
    pub fn ensure_boss_wave(&self, plan: &mut EncounterPlan) -> bool {
        let mut patched = false;
        if plan.waves.is_empty() {
            warn!(world = self.id, "encounter plan has no waves; adding a boss wave");
            plan.waves.push(WaveEncounter {
                wave_number: 1,
                is_boss: true,
                enemies: Vec::new(),
            });
            patched = true;
        }
        let Some(last) = plan.waves.last_mut() else {
            return patched;
        };
        if !last.enemies.iter().any(Combatant::is_alive) {
            warn!(
                world = self.id,
                wave = last.wave_number,
                "final wave has no living enemy; substituting the world boss"
            );
            last.enemies = vec![self.spawn_boss()];
            patched = true;
        }
        last.is_boss = true;
        patched
    }

    /// Ordered waves for this world; the last one is always the boss wave.
    pub fn build_plan(&self, rng: &mut BattleRng) -> EncounterPlan {
        let wave_count = self.wave_count.max(1);
        let waves = (1..=wave_count)
            .map(|wave_number| {
                let is_boss = wave_number == wave_count;
                let enemies = if is_boss {
                    self.boss_wave(rng)
                } else {
                    self.minion_wave(wave_number, rng)
                };
                WaveEncounter {
                    wave_number,
                    is_boss,
                    enemies,
                }
            })
            .collect();
        EncounterPlan {
            world: self.id,
            waves,
        }
    }

    /// Re-level and re-multiply a wave that is becoming active. Must run exactly
    /// once per activation; a second call scales the wave again.
    pub fn apply_enemy_scaling(&self, enemies: &mut [Combatant], wave_number: u32, is_boss: bool) {
        let mult = self.multiplier * wave_scalar(wave_number, is_boss);
        let last = enemies.len().saturating_sub(1);
        for (i, enemy) in enemies.iter_mut().enumerate() {
            let level = (self.base_level + i as u32 * ROSTER_LEVEL_STEP).min(ENEMY_MAX_LEVEL);
            enemy.sync_to_level(level);
            if i == last {
                enemy.apply_stat_multiplier(
                    mult + ANCHOR_HP_BONUS,
                    mult,
                    mult + ANCHOR_ATK_BONUS,
                    mult + ANCHOR_DEF_BONUS,
                );
            } else {
                enemy.apply_stat_multiplier(mult, mult, mult, mult);
            }
        }
    }
}
