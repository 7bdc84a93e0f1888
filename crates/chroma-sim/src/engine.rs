//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the [`SimulationContext`], applies queued player
//! commands at tick boundaries, runs the systems in a fixed order, and
//! produces a `GameStateSnapshot` per tick. It is headless and fully
//! deterministic for a given seed and command sequence.

use std::collections::VecDeque;

use chroma_core::commands::PlayerCommand;
use chroma_core::config::GameConfig;
use chroma_core::constants::DEFAULT_SEED;
use chroma_core::enums::{GameOutcome, GamePhase};
use chroma_core::error::{ConfigError, SimError};
use chroma_core::events::{AudioCue, DomainEvent, RejectReason};
use chroma_core::state::GameStateSnapshot;
use chroma_core::types::SimTime;

use crate::collision;
use crate::context::SimulationContext;
use crate::formation::FormationPlanner;
use crate::persistence::{self, PersistenceGateway};
use crate::systems;
use crate::towers;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub config: GameConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            config: GameConfig::default(),
        }
    }
}

pub struct SimulationEngine {
    config: GameConfig,
    ctx: SimulationContext,
    planner: FormationPlanner,
    time: SimTime,
    command_queue: VecDeque<PlayerCommand>,
    persistence: Option<Box<dyn PersistenceGateway + Send>>,
}

impl SimulationEngine {
    /// Validate the config and build a fresh game. Invalid config is fatal.
    pub fn new(sim: SimConfig) -> Result<Self, ConfigError> {
        sim.config.validate()?;
        let planner = FormationPlanner::from_config(&sim.config.formations)?;
        let ctx = SimulationContext::new(&sim.config, sim.seed);
        Ok(Self {
            config: sim.config,
            ctx,
            planner,
            time: SimTime::default(),
            command_queue: VecDeque::new(),
            persistence: None,
        })
    }

    /// Attach a save slot and resume from it if it holds a live game.
    pub fn with_persistence(mut self, gateway: Box<dyn PersistenceGateway + Send>) -> Self {
        if let Some(save) = gateway.load() {
            persistence::restore(&mut self.ctx, &self.config, &save);
        }
        self.persistence = Some(gateway);
        self
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by `dt` seconds and return the resulting snapshot.
    pub fn tick(&mut self, dt: f64) -> Result<GameStateSnapshot, SimError> {
        self.process_commands();

        if !self.ctx.is_game_over() {
            self.run_systems(dt)?;
            self.time.advance(dt);
        }

        let drained = self.ctx.bus.drain();
        Ok(systems::snapshot::build_snapshot(
            &self.ctx,
            &self.config,
            &self.time,
            drained,
        ))
    }

    pub fn phase(&self) -> GamePhase {
        self.ctx.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view of the full simulation state.
    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    #[cfg(test)]
    pub(crate) fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.ctx
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        if self.ctx.is_game_over() && command != PlayerCommand::Restart {
            self.ctx.bus.reject(RejectReason::GameOver, None);
            return;
        }
        match command {
            PlayerCommand::StartWave => return self.start_wave(),
            PlayerCommand::Restart => return self.restart(),
            _ => {}
        }

        let config = &self.config;
        let ctx = &mut self.ctx;
        let changed = match command {
            PlayerCommand::PlaceTower { cell, color } => towers::place(ctx, config, cell, color),
            PlayerCommand::SwitchColor { tower } => towers::switch_color(ctx, config, tower),
            PlayerCommand::SelectForMerge { tower } => matches!(
                towers::select_for_merge(ctx, config, tower),
                towers::MergeSelection::Merged { .. }
            ),
            PlayerCommand::UpgradeTower { tower } => towers::upgrade(ctx, config, tower),
            PlayerCommand::RemoveTower { tower } => towers::remove(ctx, tower),
            PlayerCommand::MergeAll => towers::merge_all(ctx, config) > 0,
            PlayerCommand::ToggleMergeMode => {
                towers::toggle_merge_mode(ctx);
                false
            }
            PlayerCommand::ToggleUpgradeMode => {
                towers::toggle_upgrade_mode(ctx);
                false
            }
            PlayerCommand::StartWave | PlayerCommand::Restart => false,
        };
        if changed {
            self.autosave();
        }
    }

    fn start_wave(&mut self) {
        if self.ctx.wave_in_progress() {
            self.ctx.bus.reject(RejectReason::WaveInProgress, None);
            return;
        }
        let wave = self.ctx.ledger.wave;
        self.ctx.modes.reset();
        let spawn_events = self
            .ctx
            .waves
            .begin(wave, &self.config, &self.planner, &mut self.ctx.rng);
        self.ctx.phase = GamePhase::WaveActive;
        self.ctx
            .bus
            .publish(DomainEvent::WaveStarted { wave, spawn_events });
        tracing::info!(
            wave,
            spawn_events,
            planned = self.ctx.waves.planned(),
            "wave started"
        );
    }

    fn restart(&mut self) {
        self.ctx.reset(&self.config);
        self.time = SimTime::default();
        self.retire_save();
        tracing::info!(best_score = self.ctx.ledger.best_score, "game restarted");
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) -> Result<(), SimError> {
        let config = &self.config;
        let ctx = &mut self.ctx;

        // 1. Tower cooldowns
        systems::targeting::tick_cooldowns(ctx.store.world_mut(), dt);
        // 2. Wave spawning
        ctx.waves
            .spawn_due(dt, ctx.ledger.wave, &mut ctx.store, config, &mut ctx.rng)?;
        // 3. Enemy movement + defended boundary
        systems::movement::move_enemies(ctx.store.world_mut(), dt);
        if systems::movement::check_base_hits(&mut ctx.store, &mut ctx.ledger, &mut ctx.bus, config) {
            ctx.store.flush();
            self.end_game(GameOutcome::Defeat);
            return Ok(());
        }
        // 4. Targeting + fire (railgun resolves here)
        systems::targeting::run(&mut ctx.store, &mut ctx.ledger, &mut ctx.bus, config, &mut ctx.rng);
        // 5. Projectile movement + hits
        systems::movement::move_projectiles(ctx.store.world_mut(), dt);
        collision::resolve_projectiles(&mut ctx.store, &mut ctx.ledger, &mut ctx.bus, config);
        // 6. Beam fade + out-of-bounds projectiles
        systems::cleanup::age_beams(&mut ctx.store, dt);
        systems::cleanup::discard_out_of_bounds(&mut ctx.store, &ctx.bounds);
        // 7. Flush removals
        ctx.store.flush();
        // 8. Wave completion
        if ctx.waves.is_complete(ctx.store.enemy_count()) {
            self.complete_wave();
        }
        Ok(())
    }

    /// Pay out the wave clear reward and advance. Runs once per wave:
    /// the scheduler is finished before anything else can observe it.
    fn complete_wave(&mut self) {
        let ctx = &mut self.ctx;
        ctx.waves.finish();
        let wave = ctx.ledger.wave;
        let energy_reward = ctx.ledger.wave_clear_reward(&self.config);
        ctx.ledger.credit(energy_reward);
        ctx.ledger.add_score(self.config.scoring.wave_clear as i64);
        ctx.bus.publish(DomainEvent::WaveCompleted { wave, energy_reward });
        if energy_reward > 0 {
            ctx.bus.publish(DomainEvent::EnergyGained { amount: energy_reward });
        }
        ctx.bus.cue(AudioCue::WaveCleared);
        tracing::info!(wave, energy_reward, score = ctx.ledger.score, "wave completed");

        // Restored saves may already sit past the cap.
        if self.config.player.max_waves.is_some_and(|max| wave >= max) {
            self.end_game(GameOutcome::Victory);
            return;
        }
        ctx.ledger.wave += 1;
        ctx.phase = GamePhase::Build;
        self.autosave();
    }

    fn end_game(&mut self, outcome: GameOutcome) {
        let ctx = &mut self.ctx;
        ctx.waves.finish();
        ctx.modes.reset();
        ctx.phase = GamePhase::GameOver(outcome);
        ctx.bus.publish(DomainEvent::GameOver {
            outcome,
            wave: ctx.ledger.wave,
            score: ctx.ledger.score,
        });
        tracing::info!(?outcome, wave = ctx.ledger.wave, score = ctx.ledger.score, "game over");
        self.retire_save();
    }

    fn autosave(&self) {
        if let Some(gateway) = &self.persistence {
            gateway.save(&persistence::capture(&self.ctx));
        }
    }

    /// Drop the resumable run but keep the best score in the slot.
    fn retire_save(&self) {
        let Some(gateway) = &self.persistence else {
            return;
        };
        let save = persistence::capture_best_score(&self.ctx);
        if save.best_score == 0 {
            gateway.clear();
        } else {
            gateway.save(&save);
        }
    }
}
