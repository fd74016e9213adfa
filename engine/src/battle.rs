//! Turn-by-turn battle state machine.
//!
//! A round is every living party member acting in roster order, then every
//! living enemy, then one status/cooldown tick. Terminal conditions are checked
//! after each individual action.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combatant::{Combatant, CombatantId};
use crate::encounter::{EncounterPlan, WorldConfig};
use crate::error::{ActionError, BattleError};
use crate::events::{ActionReport, BattleEvent, BattleOutcome};
use crate::progression::{victory_experience, ProgressionLedger};
use crate::skill::{execute, resolve_targets, TargetType};
use crate::BattleRng;

/// What an enemy does when none of its skills is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyFallback {
    /// The enemy loses its turn.
    #[default]
    SkipTurn,
    /// Legacy behaviour: cast the first skill anyway, bypassing cooldown and
    /// paying whatever mana is left.
    ForceFirstSkill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    pub enemy_fallback: EnemyFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPlayerAction { member: usize },
    PlayerTargetSelection { member: usize, skill_index: usize },
    EnemyActionPhase { next: usize },
    /// Transient: held only while the round-end tick runs inside the call
    /// that finishes the enemy phase. Never observable between calls.
    RoundEndTick,
    Finished,
}

/// A party member's choice for the current turn. `target` is an enemy roster
/// index and only matters for single-enemy skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub skill_index: usize,
    #[serde(default)]
    pub target: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnProgress {
    Resolved(ActionReport),
    /// The skill needs a chosen enemy; call `select_target`.
    AwaitingTarget { skill_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Continue,
    WaveAdvanced,
    Finished,
}

pub struct Battle<'a> {
    world: WorldConfig,
    plan: EncounterPlan,
    wave_index: usize,
    party: Vec<Combatant>,
    enemies: Vec<Combatant>,
    phase: Phase,
    round: u32,
    /// Whether anything happened in the current round yet.
    round_in_progress: bool,
    rng: BattleRng,
    rules: BattleRules,
    ledger: &'a mut ProgressionLedger,
    outcome: Option<BattleOutcome>,
    events: Vec<BattleEvent>,
}

impl<'a> Battle<'a> {
    /// Build the world's encounter plan and open wave 1 with the first living
    /// party member to act.
    pub fn start(
        world: &WorldConfig,
        party: Vec<Combatant>,
        ledger: &'a mut ProgressionLedger,
        mut rng: BattleRng,
        rules: BattleRules,
    ) -> Result<Self, BattleError> {
        check_entry(world, ledger)?;
        let plan = world.build_plan(&mut rng);
        Self::from_plan(world, plan, party, ledger, rng, rules)
    }

    /// Like `start`, but fights a plan the caller already built. Waves are
    /// still scaled for `world` as they activate. A plan that would end without
    /// a living enemy to beat gets the world's boss as its final wave.
    pub fn from_plan(
        world: &WorldConfig,
        mut plan: EncounterPlan,
        party: Vec<Combatant>,
        ledger: &'a mut ProgressionLedger,
        rng: BattleRng,
        rules: BattleRules,
    ) -> Result<Self, BattleError> {
        check_entry(world, ledger)?;
        world.ensure_boss_wave(&mut plan);
        info!(
            world = world.id,
            waves = plan.waves.len(),
            party = party.len(),
            "battle started"
        );
        let mut battle = Self {
            world: world.clone(),
            plan,
            wave_index: 0,
            party,
            enemies: Vec::new(),
            phase: Phase::RoundEndTick,
            round: 1,
            round_in_progress: false,
            rng,
            rules,
            ledger,
            outcome: None,
            events: Vec::new(),
        };
        battle.activate_wave(0);
        if battle.check_battle_end() != Check::Finished {
            battle.resume_player_phase();
        }
        Ok(battle)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of the round currently being played, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Rounds in which at least one turn was taken. A battle that ended at a
    /// round boundary does not count the round it never started.
    pub fn rounds_played(&self) -> u32 {
        self.round - 1 + u32::from(self.round_in_progress)
    }

    pub fn party(&self) -> &[Combatant] {
        &self.party
    }

    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    pub fn wave_number(&self) -> u32 {
        self.plan.waves.get(self.wave_index).map_or(0, |w| w.wave_number)
    }

    pub fn wave_count(&self) -> usize {
        self.plan.waves.len()
    }

    pub fn is_boss_wave(&self) -> bool {
        self.plan.waves.get(self.wave_index).is_some_and(|w| w.is_boss)
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Party member whose turn it is, if any.
    pub fn current_actor(&self) -> Option<CombatantId> {
        match self.phase {
            Phase::AwaitingPlayerAction { member } | Phase::PlayerTargetSelection { member, .. } => {
                Some(CombatantId::party(member))
            }
            _ => None,
        }
    }

    /// Play the current party member's turn.
    pub fn submit_player_action(&mut self, cmd: PlayerCommand) -> Result<TurnProgress, ActionError> {
        let member = self.player_turn()?;
        let target = self.validate_skill(member, cmd.skill_index)?;
        if target == TargetType::SingleEnemy {
            return match cmd.target {
                None => {
                    self.phase = Phase::PlayerTargetSelection {
                        member,
                        skill_index: cmd.skill_index,
                    };
                    Ok(TurnProgress::AwaitingTarget {
                        skill_index: cmd.skill_index,
                    })
                }
                Some(index) => {
                    let target = self.validate_enemy_target(index)?;
                    Ok(TurnProgress::Resolved(self.player_commit(member, cmd.skill_index, &[target])))
                }
            };
        }
        let actor = CombatantId::party(member);
        let targets = resolve_targets(target, actor, &self.party, &self.enemies, &mut self.rng);
        if targets.is_empty() {
            return Err(ActionError::NoTargets {
                skill: self.party[member].skills[cmd.skill_index].name.clone(),
            });
        }
        Ok(TurnProgress::Resolved(self.player_commit(member, cmd.skill_index, &targets)))
    }

    /// Finish a pending single-enemy skill against enemy slot `index`.
    pub fn select_target(&mut self, index: usize) -> Result<ActionReport, ActionError> {
        let (member, skill_index) = match self.phase {
            Phase::PlayerTargetSelection { member, skill_index } => (member, skill_index),
            Phase::Finished => return Err(ActionError::BattleOver),
            _ => return Err(ActionError::NoTargetPending),
        };
        self.validate_skill(member, skill_index)?;
        let target = self.validate_enemy_target(index)?;
        Ok(self.player_commit(member, skill_index, &[target]))
    }

    /// Drop a pending single-enemy skill and go back to skill choice.
    pub fn cancel_target_selection(&mut self) -> Result<(), ActionError> {
        match self.phase {
            Phase::PlayerTargetSelection { member, .. } => {
                self.phase = Phase::AwaitingPlayerAction { member };
                Ok(())
            }
            Phase::Finished => Err(ActionError::BattleOver),
            _ => Err(ActionError::NoTargetPending),
        }
    }

    /// Give up the current party member's turn.
    pub fn pass_turn(&mut self) -> Result<(), ActionError> {
        let member = self.player_turn()?;
        debug!(member = %self.party[member].name, "turn passed");
        self.round_in_progress = true;
        self.events.push(BattleEvent::TurnSkipped {
            actor: CombatantId::party(member),
            name: self.party[member].name.clone(),
        });
        self.advance_player(member);
        Ok(())
    }

    /// Resolve the next living enemy's turn. Returns `None` once the enemy
    /// phase is over (the round-end tick has then already run) or when it is
    /// not the enemy phase.
    pub fn next_enemy_action(&mut self) -> Option<ActionReport> {
        loop {
            let Phase::EnemyActionPhase { next } = self.phase else {
                return None;
            };
            let Some(idx) = (next..self.enemies.len()).find(|&i| self.enemies[i].is_alive()) else {
                self.end_round();
                return None;
            };
            self.phase = Phase::EnemyActionPhase { next: idx + 1 };
            let actor = CombatantId::enemy(idx);

            let Some(skill_index) = self.choose_enemy_skill(idx) else {
                debug!(enemy = %self.enemies[idx].name, "no usable skill; turn skipped");
                self.round_in_progress = true;
                self.events.push(BattleEvent::TurnSkipped {
                    actor,
                    name: self.enemies[idx].name.clone(),
                });
                continue;
            };
            let target = self.enemies[idx].skills[skill_index].target;
            let targets = resolve_targets(target, actor, &self.party, &self.enemies, &mut self.rng);
            let (report, check) = self.commit(actor, skill_index, &targets);
            if check == Check::WaveAdvanced {
                self.resume_player_phase();
            }
            return Some(report);
        }
    }

    /// Run every remaining enemy turn of this round.
    pub fn resolve_enemy_phase(&mut self) -> Vec<ActionReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.next_enemy_action() {
            reports.push(report);
        }
        reports
    }

    /// End the battle without a result. No progression changes.
    pub fn abandon(&mut self) -> Result<&BattleOutcome, ActionError> {
        if self.is_finished() {
            return Err(ActionError::BattleOver);
        }
        info!(world = self.world.id, round = self.round, "battle abandoned");
        Ok(self.finish(BattleOutcome::Abandoned))
    }

    fn player_turn(&self) -> Result<usize, ActionError> {
        match self.phase {
            Phase::AwaitingPlayerAction { member } | Phase::PlayerTargetSelection { member, .. } => {
                Ok(member)
            }
            Phase::Finished => Err(ActionError::BattleOver),
            _ => Err(ActionError::NotPlayerTurn),
        }
    }

    fn validate_skill(&self, member: usize, skill_index: usize) -> Result<TargetType, ActionError> {
        let caster = &self.party[member];
        let skill = caster
            .skills
            .get(skill_index)
            .ok_or(ActionError::UnknownSkill { index: skill_index })?;
        if skill.current_cooldown > 0 {
            return Err(ActionError::OnCooldown {
                skill: skill.name.clone(),
                remaining: skill.current_cooldown,
            });
        }
        if !skill.can_use(caster) {
            return Err(ActionError::InsufficientMana {
                skill: skill.name.clone(),
                needed: skill.mana_cost,
                available: caster.mana,
            });
        }
        Ok(skill.target)
    }

    fn validate_enemy_target(&self, index: usize) -> Result<CombatantId, ActionError> {
        match self.enemies.get(index) {
            Some(enemy) if enemy.is_alive() => Ok(CombatantId::enemy(index)),
            _ => Err(ActionError::InvalidTarget { index }),
        }
    }

    fn player_commit(&mut self, member: usize, skill_index: usize, targets: &[CombatantId]) -> ActionReport {
        let (report, check) = self.commit(CombatantId::party(member), skill_index, targets);
        match check {
            Check::Finished => {}
            Check::WaveAdvanced => self.resume_player_phase(),
            Check::Continue => self.advance_player(member),
        }
        report
    }

    fn commit(&mut self, actor: CombatantId, skill_index: usize, targets: &[CombatantId]) -> (ActionReport, Check) {
        let report = execute(actor, skill_index, targets, &mut self.party, &mut self.enemies);
        self.round_in_progress = true;
        debug!(
            actor = %report.actor_name,
            skill = %report.skill_name,
            targets = report.deltas.len(),
            "action resolved"
        );
        self.events.push(BattleEvent::Action(report.clone()));
        let check = self.check_battle_end();
        (report, check)
    }

    fn advance_player(&mut self, member: usize) {
        self.phase = match (member + 1..self.party.len()).find(|&i| self.party[i].is_alive()) {
            Some(next) => Phase::AwaitingPlayerAction { member: next },
            None => Phase::EnemyActionPhase { next: 0 },
        };
    }

    fn resume_player_phase(&mut self) {
        if self.is_finished() {
            return;
        }
        self.phase = match self.party.iter().position(Combatant::is_alive) {
            Some(member) => Phase::AwaitingPlayerAction { member },
            None => Phase::EnemyActionPhase { next: 0 },
        };
    }

    fn choose_enemy_skill(&self, idx: usize) -> Option<usize> {
        let enemy = &self.enemies[idx];
        enemy.first_usable_skill().or_else(|| match self.rules.enemy_fallback {
            EnemyFallback::SkipTurn => None,
            EnemyFallback::ForceFirstSkill => (!enemy.skills.is_empty()).then_some(0),
        })
    }

    fn end_round(&mut self) {
        self.phase = Phase::RoundEndTick;
        for c in self.party.iter_mut().chain(self.enemies.iter_mut()) {
            if c.is_alive() {
                c.tick_effects();
                c.tick_cooldowns();
            }
        }
        for c in self.party.iter_mut().chain(self.enemies.iter_mut()) {
            c.recompute_stats();
        }
        debug!(round = self.round, "round ended");
        self.events.push(BattleEvent::RoundEnded { round: self.round });
        self.round += 1;
        self.round_in_progress = false;
        self.resume_player_phase();
    }

    fn activate_wave(&mut self, index: usize) {
        self.wave_index = index;
        let wave_count = self.plan.waves.len() as u32;
        let Some(wave) = self.plan.waves.get_mut(index) else {
            return;
        };
        let (wave_number, boss) = (wave.wave_number, wave.is_boss);
        let mut enemies = std::mem::take(&mut wave.enemies);
        self.world.apply_enemy_scaling(&mut enemies, wave_number, boss);
        info!(
            world = self.world.id,
            wave = wave_number,
            boss,
            enemies = enemies.len(),
            "wave started"
        );
        self.events.push(BattleEvent::WaveStarted {
            wave_number,
            wave_count,
            boss,
            enemies: enemies
                .iter()
                .map(|e| format!("{} Lv{}", e.name, e.level))
                .collect(),
        });
        self.enemies = enemies;
    }

    fn check_battle_end(&mut self) -> Check {
        if self.is_finished() {
            return Check::Finished;
        }
        if !self.party.iter().any(Combatant::is_alive) {
            self.finish(BattleOutcome::Defeat);
            return Check::Finished;
        }
        if self.enemies.iter().any(Combatant::is_alive) {
            return Check::Continue;
        }
        loop {
            self.events.push(BattleEvent::WaveCleared {
                wave_number: self.wave_number(),
            });
            if self.wave_index + 1 >= self.plan.waves.len() {
                self.finish_victory();
                return Check::Finished;
            }
            self.activate_wave(self.wave_index + 1);
            if self.enemies.iter().any(Combatant::is_alive) {
                return Check::WaveAdvanced;
            }
        }
    }

    fn finish_victory(&mut self) {
        let world = self.world.id;
        let exp_earned = victory_experience(world, self.enemies.len(), self.plan.waves.len());
        self.ledger.record_clear(world);
        let world_unlocks = self.ledger.apply_world_unlocks(world);
        let levels = self.ledger.add_experience(exp_earned);
        self.finish(BattleOutcome::Victory {
            exp_earned,
            leveled_up: levels > 0,
            new_level: self.ledger.level,
            world_unlocks,
        });
    }

    fn finish(&mut self, outcome: BattleOutcome) -> &BattleOutcome {
        info!(world = self.world.id, round = self.round, outcome = ?outcome, "battle finished");
        self.phase = Phase::Finished;
        self.events.push(BattleEvent::Finished(outcome.clone()));
        self.outcome.insert(outcome)
    }
}

fn check_entry(world: &WorldConfig, ledger: &ProgressionLedger) -> Result<(), BattleError> {
    if ledger.can_enter_world(world.id) {
        return Ok(());
    }
    let required_level = ledger
        .world_requirement(world.id)
        .ok_or(BattleError::UnknownWorld { world: world.id })?;
    Err(BattleError::WorldLocked {
        world: world.id,
        required_level,
    })
}
