//! Game loop thread: runs the simulation engine at a fixed timestep.
//!
//! The engine is moved into the thread, so it has a single owner. Commands
//! arrive via an `mpsc` channel and are applied at the next tick boundary.
//! The latest snapshot is stored in shared state for synchronous polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chroma_core::constants::{DT, TICK_RATE};
use chroma_core::enums::GamePhase;
use chroma_core::state::GameStateSnapshot;
use chroma_sim::SimulationEngine;

use crate::autoplay::Autopilot;
use crate::error::AppError;
use crate::state::{GameLoopCommand, LoopHandle};

/// Nominal wall-clock duration of one tick.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

#[derive(Debug, Clone, Default)]
pub struct LoopOptions {
    /// Pace ticks to wall-clock time instead of running flat out.
    pub realtime: bool,
    /// Stop after this many ticks even if the game is still running.
    pub max_ticks: Option<u64>,
    /// Let the built-in autopilot play between waves.
    pub autopilot: Option<Autopilot>,
}

/// How a loop run ended.
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub ticks: u64,
    pub final_snapshot: Option<GameStateSnapshot>,
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(engine: SimulationEngine, options: LoopOptions) -> Result<LoopHandle, AppError> {
    let (command_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_snapshot);

    let thread = std::thread::Builder::new()
        .name("chroma-game-loop".into())
        .spawn(move || run_game_loop(engine, options, cmd_rx, &shared))
        .map_err(AppError::Spawn)?;

    Ok(LoopHandle {
        command_tx,
        latest_snapshot,
        thread,
    })
}

/// The game loop. Runs until shutdown, channel disconnect, game over or the
/// tick limit.
fn run_game_loop(
    mut engine: SimulationEngine,
    mut options: LoopOptions,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) -> Result<LoopReport, AppError> {
    let mut next_tick_time = Instant::now();
    let mut ticks = 0u64;
    let mut last: Option<GameStateSnapshot> = None;

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => return Ok(report(ticks, last)),
                Err(mpsc::TryRecvError::Empty) => break,
                // Headless runs drop the sender right away; keep going.
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }

        // 2. Autopilot decides from the previous snapshot
        if let (Some(pilot), Some(snapshot)) = (options.autopilot.as_mut(), last.as_ref()) {
            engine.queue_commands(pilot.decide(snapshot));
        }

        // 3. Advance one tick
        let snapshot = engine.tick(DT)?;
        ticks += 1;

        // 4. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot.clone());
        }
        let finished = matches!(snapshot.phase, GamePhase::GameOver(_));
        last = Some(snapshot);

        if finished || options.max_ticks.is_some_and(|limit| ticks >= limit) {
            return Ok(report(ticks, last));
        }

        // 5. Sleep until next tick
        if options.realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind, reset to avoid a catch-up spiral
                next_tick_time = now;
            }
        }
    }
}

fn report(ticks: u64, final_snapshot: Option<GameStateSnapshot>) -> LoopReport {
    tracing::debug!(ticks, "game loop stopped");
    LoopReport { ticks, final_snapshot }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::commands::PlayerCommand;
    use chroma_core::enums::{Row, TowerColor};
    use chroma_core::types::CellId;
    use chroma_sim::SimConfig;

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::PlayerCommand(PlayerCommand::StartWave))
            .unwrap();
        tx.send(GameLoopCommand::PlayerCommand(PlayerCommand::MergeAll))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            GameLoopCommand::PlayerCommand(PlayerCommand::StartWave)
        ));
        assert!(matches!(
            commands[1],
            GameLoopCommand::PlayerCommand(PlayerCommand::MergeAll)
        ));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_tick_duration_constant() {
        // 60Hz = 16.666ms per tick
        let expected_nanos = 1_000_000_000u64 / 60;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }

    #[test]
    fn test_loop_stops_at_tick_limit() {
        let engine = SimulationEngine::new(SimConfig::default()).unwrap();
        let options = LoopOptions {
            max_ticks: Some(30),
            ..Default::default()
        };
        let handle = spawn_game_loop(engine, options).unwrap();
        let report = handle.join().unwrap();

        assert_eq!(report.ticks, 30);
        let snapshot = report.final_snapshot.unwrap();
        assert_eq!(snapshot.time.tick, 30);
        assert_eq!(snapshot.phase, GamePhase::Build);
    }

    #[test]
    fn test_commands_reach_engine() {
        let engine = SimulationEngine::new(SimConfig::default()).unwrap();
        let options = LoopOptions {
            max_ticks: Some(5),
            ..Default::default()
        };
        let (command_tx, cmd_rx) = mpsc::channel();
        command_tx
            .send(GameLoopCommand::PlayerCommand(PlayerCommand::PlaceTower {
                cell: CellId::new(Row::Top, 0),
                color: TowerColor::Red,
            }))
            .unwrap();
        let shared = Mutex::new(None);

        let report = run_game_loop(engine, options, cmd_rx, &shared).unwrap();

        let snapshot = report.final_snapshot.unwrap();
        assert_eq!(snapshot.towers.len(), 1);
        assert!(shared.lock().unwrap().is_some());
    }

    #[test]
    fn test_shutdown_before_first_tick() {
        let engine = SimulationEngine::new(SimConfig::default()).unwrap();
        let (command_tx, cmd_rx) = mpsc::channel();
        command_tx.send(GameLoopCommand::Shutdown).unwrap();
        let shared = Mutex::new(None);

        let report = run_game_loop(engine, LoopOptions::default(), cmd_rx, &shared).unwrap();

        assert_eq!(report.ticks, 0);
        assert!(report.final_snapshot.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
        engine.queue_command(PlayerCommand::StartWave);
        for _ in 0..120 {
            engine.tick(DT).unwrap();
        }
        let snapshot = engine.tick(DT).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"enemies\""));
    }
}
