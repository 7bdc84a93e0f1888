//! Engine-level tests: tick order, wave lifecycle, economy, persistence, determinism.

use glam::DVec2;

use chroma_core::commands::PlayerCommand;
use chroma_core::config::GameConfig;
use chroma_core::constants::{DT, SAVE_VERSION};
use chroma_core::enums::*;
use chroma_core::error::{ConfigError, SimError};
use chroma_core::events::{DomainEvent, Feedback, RejectReason};
use chroma_core::save::SaveSnapshot;
use chroma_core::state::GameStateSnapshot;
use chroma_core::types::CellId;

use crate::collision;
use crate::engine::{SimConfig, SimulationEngine};
use crate::persistence::{MemoryStore, PersistenceGateway};
use crate::store::EnemySpawn;

/// One red standard enemy per wave.
fn single_enemy_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.formations.definitions = "# Solo | difficulty=1\nstandard @0 color=red\n".into();
    config.formations.wave_difficulty = vec![1.0];
    config.formations.endless_difficulty.base = Some(1.0);
    config.formations.endless_difficulty.growth = 0.0;
    config
}

fn engine_with(config: GameConfig) -> SimulationEngine {
    SimulationEngine::new(SimConfig { seed: 9, config }).unwrap()
}

fn cell(s: &str) -> CellId {
    s.parse().unwrap()
}

fn kill_all_enemies(engine: &mut SimulationEngine) {
    let config = engine.config().clone();
    let ctx = engine.context_mut();
    for enemy in ctx.store.live_enemies() {
        collision::apply_damage(
            &mut ctx.store,
            &mut ctx.ledger,
            &mut ctx.bus,
            &config,
            enemy.entity,
            1.0e9,
            TowerColor::Red,
        );
    }
}

fn rejected(snap: &GameStateSnapshot, reason: RejectReason) -> bool {
    snap.feedback
        .iter()
        .any(|Feedback::Rejected { reason: r, .. }| *r == reason)
}

fn count_events(snaps: &[GameStateSnapshot], pred: impl Fn(&DomainEvent) -> bool) -> usize {
    snaps.iter().flat_map(|s| s.events.iter()).filter(|e| pred(e)).count()
}

// ---- Construction ----

#[test]
fn test_invalid_config_is_refused() {
    let mut config = GameConfig::default();
    config.towers.damage_by_level = vec![1.0];
    let err = SimulationEngine::new(SimConfig { seed: 1, config }).err().unwrap();
    assert!(matches!(err, ConfigError::TableLength { .. }));

    let mut config = GameConfig::default();
    config.formations.definitions = "# A\ndragon @0\n".into();
    let err = SimulationEngine::new(SimConfig { seed: 1, config }).err().unwrap();
    assert!(matches!(err, ConfigError::Formation { line: 2, .. }));
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let commands = [
        PlayerCommand::PlaceTower {
            cell: cell("top:1"),
            color: TowerColor::Red,
        },
        PlayerCommand::PlaceTower {
            cell: cell("top:2"),
            color: TowerColor::Blue,
        },
        PlayerCommand::PlaceTower {
            cell: cell("bottom:3"),
            color: TowerColor::Red,
        },
        PlayerCommand::StartWave,
    ];
    let mut a = SimulationEngine::new(SimConfig::default()).unwrap();
    let mut b = SimulationEngine::new(SimConfig::default()).unwrap();
    a.queue_commands(commands.clone());
    b.queue_commands(commands);

    for _ in 0..900 {
        let snap_a = serde_json::to_string(&a.tick(DT).unwrap()).unwrap();
        let snap_b = serde_json::to_string(&b.tick(DT).unwrap()).unwrap();
        assert_eq!(snap_a, snap_b, "snapshots diverged with the same seed");
    }
}

// ---- Wave lifecycle ----

#[test]
fn test_wave_completes_exactly_once() {
    let mut engine = engine_with(single_enemy_config());
    engine.queue_command(PlayerCommand::StartWave);
    let first = engine.tick(DT).unwrap();
    assert_eq!(first.phase, GamePhase::WaveActive);
    assert_eq!(first.wave.spawned, 1);
    assert_eq!(first.enemies.len(), 1);
    assert!(first
        .events
        .contains(&DomainEvent::WaveStarted { wave: 1, spawn_events: 1 }));

    kill_all_enemies(&mut engine);
    let mut snaps = vec![engine.tick(DT).unwrap()];
    for _ in 0..30 {
        snaps.push(engine.tick(DT).unwrap());
    }

    assert_eq!(
        count_events(&snaps, |e| matches!(e, DomainEvent::WaveCompleted { .. })),
        1
    );
    assert!(snaps[0].events.contains(&DomainEvent::WaveCompleted {
        wave: 1,
        energy_reward: 20
    }));
    let last = snaps.last().unwrap();
    assert_eq!(last.phase, GamePhase::Build);
    assert_eq!(last.wave.number, 2);
    assert!(!last.wave.in_progress);
    assert_eq!(last.economy.energy, 480 + 3 + 20);
    assert_eq!(last.economy.score, 10 + 150);
}

#[test]
fn test_start_wave_rejected_while_active_and_modes_locked() {
    let mut engine = engine_with(single_enemy_config());
    engine.queue_commands([PlayerCommand::ToggleMergeMode, PlayerCommand::StartWave]);
    let snap = engine.tick(DT).unwrap();
    assert_eq!(snap.mode, PlacementMode::Idle, "wave start forces idle");

    engine.queue_commands([PlayerCommand::StartWave, PlayerCommand::ToggleUpgradeMode]);
    let snap = engine.tick(DT).unwrap();
    assert!(rejected(&snap, RejectReason::WaveInProgress));
    assert_eq!(snap.mode, PlacementMode::Idle);
    assert_eq!(
        snap.feedback.len(),
        2,
        "both the second start and the toggle are refused"
    );
}

#[test]
fn test_legacy_schedule_when_no_templates() {
    let mut config = GameConfig::default();
    config.formations.definitions = String::new();
    let mut engine = engine_with(config);
    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick(DT).unwrap();
    assert!(!snap.wave.planned);
    assert_eq!(snap.wave.total, 13);
    assert!(snap
        .events
        .contains(&DomainEvent::WaveStarted { wave: 1, spawn_events: 13 }));
}

#[test]
fn test_planned_wave_uses_formations() {
    let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick(DT).unwrap();
    assert!(snap.wave.planned);
    assert!(snap.wave.total > 0);
}

#[test]
fn test_missing_spawn_schedule_is_fatal() {
    let mut engine = engine_with(single_enemy_config());
    engine.context_mut().waves.force_in_progress_without_timeline();
    let err = engine.tick(DT).unwrap_err();
    assert!(matches!(err, SimError::MissingSpawnSchedule { wave: 1 }));
}

// ---- Base hits / game over ----

#[test]
fn test_base_hit_ends_game_on_last_life() {
    let mut config = single_enemy_config();
    config.player.initial_lives = 1;
    let mut engine = engine_with(config);
    engine.queue_command(PlayerCommand::StartWave);

    let mut snaps = Vec::new();
    for _ in 0..1_200 {
        let snap = engine.tick(DT).unwrap();
        let over = matches!(snap.phase, GamePhase::GameOver(_));
        snaps.push(snap);
        if over {
            break;
        }
    }
    assert_eq!(engine.phase(), GamePhase::GameOver(GameOutcome::Defeat));
    assert_eq!(
        count_events(&snaps, |e| *e == DomainEvent::BaseHit { lives_remaining: 0 }),
        1
    );
    assert_eq!(
        count_events(&snaps, |e| matches!(
            e,
            DomainEvent::GameOver {
                outcome: GameOutcome::Defeat,
                ..
            }
        )),
        1
    );
    // Enemy needs (1100 - 40 + 600) / 180 s to reach the base.
    let elapsed = engine.time().elapsed_secs;
    assert!(elapsed > 9.0 && elapsed < 9.5, "elapsed {elapsed}");

    engine.queue_command(PlayerCommand::PlaceTower {
        cell: cell("top:0"),
        color: TowerColor::Red,
    });
    let snap = engine.tick(DT).unwrap();
    assert!(rejected(&snap, RejectReason::GameOver));
    assert!(snap.towers.is_empty());
    let frozen = snap.time.tick;
    assert_eq!(engine.tick(DT).unwrap().time.tick, frozen, "time stops after game over");
}

#[test]
fn test_victory_after_last_wave_keeps_only_best_score() {
    let mut config = single_enemy_config();
    config.player.max_waves = Some(1);
    let slot = MemoryStore::new();
    let mut engine = engine_with(config).with_persistence(Box::new(slot.clone()));

    engine.queue_commands([
        PlayerCommand::PlaceTower {
            cell: cell("top:0"),
            color: TowerColor::Red,
        },
        PlayerCommand::StartWave,
    ]);
    engine.tick(DT).unwrap();
    assert!(slot.contents().is_some(), "placement autosaves");

    kill_all_enemies(&mut engine);
    let snap = engine.tick(DT).unwrap();
    assert_eq!(snap.phase, GamePhase::GameOver(GameOutcome::Victory));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        DomainEvent::GameOver {
            outcome: GameOutcome::Victory,
            wave: 1,
            ..
        }
    )));

    let saved = slot.load().unwrap();
    assert_eq!(saved.lives, 0, "nothing left to resume");
    assert!(saved.towers.is_empty());
    assert_eq!(saved.best_score, snap.economy.score);
}

#[test]
fn test_wave_clear_reward_is_reported_as_energy_gain() {
    let mut engine = engine_with(single_enemy_config());
    engine.queue_command(PlayerCommand::StartWave);
    engine.tick(DT).unwrap();
    kill_all_enemies(&mut engine);
    let snap = engine.tick(DT).unwrap();

    let reward = snap
        .events
        .iter()
        .find_map(|e| match e {
            DomainEvent::WaveCompleted { energy_reward, .. } => Some(*energy_reward),
            _ => None,
        })
        .unwrap();
    assert!(reward > 0);
    assert!(snap.events.contains(&DomainEvent::EnergyGained { amount: reward }));
}

#[test]
fn test_best_score_survives_defeat() {
    let mut config = single_enemy_config();
    config.player.initial_lives = 1;
    let slot = MemoryStore::new();
    let mut engine = engine_with(config.clone()).with_persistence(Box::new(slot.clone()));

    engine.queue_command(PlayerCommand::StartWave);
    engine.tick(DT).unwrap();
    kill_all_enemies(&mut engine);
    let snap = engine.tick(DT).unwrap();
    assert_eq!(snap.economy.score, 160);
    assert_eq!(snap.wave.number, 2);

    // Wave 2 goes undefended.
    engine.queue_command(PlayerCommand::StartWave);
    for _ in 0..1_200 {
        if matches!(engine.tick(DT).unwrap().phase, GamePhase::GameOver(_)) {
            break;
        }
    }
    assert_eq!(engine.phase(), GamePhase::GameOver(GameOutcome::Defeat));

    let reopened = engine_with(config).with_persistence(Box::new(slot.clone()));
    let ledger = &reopened.context().ledger;
    assert_eq!(ledger.best_score, 160);
    assert_eq!(ledger.score, 0);
    assert_eq!(ledger.wave, 1);
    assert_eq!(ledger.lives, 1);
}

#[test]
fn test_restored_wave_past_cap_still_ends_in_victory() {
    let mut config = single_enemy_config();
    config.player.max_waves = Some(2);
    let slot = MemoryStore::new();
    let save = SaveSnapshot {
        version: SAVE_VERSION,
        lives: 3,
        energy: 100,
        wave: 5,
        score: 40,
        best_score: 40,
        towers: Vec::new(),
    };
    slot.set_contents(save.to_json());

    let mut engine = engine_with(config).with_persistence(Box::new(slot.clone()));
    assert_eq!(engine.context().ledger.wave, 5);
    engine.queue_command(PlayerCommand::StartWave);
    engine.tick(DT).unwrap();
    kill_all_enemies(&mut engine);
    let snap = engine.tick(DT).unwrap();

    assert_eq!(snap.phase, GamePhase::GameOver(GameOutcome::Victory));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        DomainEvent::GameOver {
            outcome: GameOutcome::Victory,
            wave: 5,
            ..
        }
    )));
}

#[test]
fn test_restart_keeps_best_score() {
    let mut engine = engine_with(single_enemy_config());
    engine.queue_commands([
        PlayerCommand::PlaceTower {
            cell: cell("bottom:0"),
            color: TowerColor::Blue,
        },
        PlayerCommand::StartWave,
    ]);
    engine.tick(DT).unwrap();
    kill_all_enemies(&mut engine);
    let snap = engine.tick(DT).unwrap();
    assert_eq!(snap.economy.score, 160);

    engine.queue_command(PlayerCommand::Restart);
    let snap = engine.tick(DT).unwrap();
    assert_eq!(snap.economy.score, 0);
    assert_eq!(snap.economy.best_score, 160);
    assert_eq!(snap.economy.energy, 480);
    assert_eq!(snap.wave.number, 1);
    assert!(snap.towers.is_empty());
    assert!(snap.cells.iter().all(|c| c.tower.is_none()));
}

// ---- Combat ----

#[test]
fn test_railgun_tower_fires_through_targeting() {
    let config = GameConfig::default();
    let mut engine = engine_with(config.clone());
    engine.queue_command(PlayerCommand::PlaceTower {
        cell: cell("top:0"),
        color: TowerColor::Red,
    });
    engine.tick(DT).unwrap();

    let ctx = engine.context_mut();
    let id = ctx.grid.tower_at(cell("top:0")).unwrap();
    ctx.store
        .with_tower_mut(id, |t| t.set_level(5, &config.towers, &config.projectiles));
    let origin = ctx.grid.cell(cell("top:0")).unwrap().center();
    for dx in [100.0, 200.0] {
        ctx.store.spawn_enemy(EnemySpawn {
            center: origin + DVec2::new(dx, 0.0),
            velocity: DVec2::ZERO,
            hp: 1_000.0,
            archetype: EnemyArchetype::Standard,
            color: TowerColor::Red,
            spawn_group: 0,
            half_extents: DVec2::splat(40.0),
        });
    }

    let snap = engine.tick(DT).unwrap();
    assert_eq!(snap.beams.len(), 1);
    assert!(snap.projectiles.is_empty());
    assert!(snap.enemies.iter().all(|e| e.health == 970.0), "beam pierces both");
    assert!((snap.beams[0].length - 224.0).abs() < 1e-9);
    assert_eq!(snap.towers[0].weapon, WeaponVariant::Railgun);
    assert_eq!(snap.towers[0].reload, 1.0);

    // Beam fades after its lifetime.
    for _ in 0..10 {
        engine.tick(DT).unwrap();
    }
    assert!(engine.tick(DT).unwrap().beams.is_empty());
}

#[test]
fn test_towers_kill_enemies_during_a_wave() {
    let mut config = GameConfig::default();
    config.player.initial_energy = 5_000;
    let mut engine = engine_with(config);
    for row in ["top", "bottom"] {
        for i in 0..6 {
            let color = if i % 2 == 0 { TowerColor::Red } else { TowerColor::Blue };
            engine.queue_command(PlayerCommand::PlaceTower {
                cell: cell(&format!("{row}:{i}")),
                color,
            });
        }
    }
    engine.queue_command(PlayerCommand::StartWave);

    let mut snaps = Vec::new();
    for _ in 0..3_000 {
        let snap = engine.tick(DT).unwrap();
        let done = snap.phase != GamePhase::WaveActive;
        snaps.push(snap);
        if done {
            break;
        }
    }
    assert_eq!(snaps[0].towers.len(), 12);
    assert!(count_events(&snaps, |e| matches!(e, DomainEvent::EnemyKilled { .. })) > 0);
    assert!(snaps.iter().any(|s| !s.audio.is_empty()));
}

// ---- Persistence ----

#[test]
fn test_save_restores_into_new_engine() {
    let slot = MemoryStore::new();
    let mut engine = engine_with(GameConfig::default()).with_persistence(Box::new(slot.clone()));
    engine.queue_commands([
        PlayerCommand::PlaceTower {
            cell: cell("top:3"),
            color: TowerColor::Blue,
        },
        PlayerCommand::PlaceTower {
            cell: cell("top:4"),
            color: TowerColor::Blue,
        },
        PlayerCommand::ToggleMergeMode,
    ]);
    engine.tick(DT).unwrap();
    let ids = engine.context().store.tower_ids();
    engine.queue_commands([
        PlayerCommand::SelectForMerge { tower: ids[0] },
        PlayerCommand::SelectForMerge { tower: ids[1] },
    ]);
    engine.tick(DT).unwrap();

    let saved = slot.load().unwrap();
    assert_eq!(saved.energy, 240);
    assert_eq!(saved.towers.len(), 1);
    assert_eq!(saved.towers[0].level, 2);

    let restored = engine_with(GameConfig::default()).with_persistence(Box::new(slot.clone()));
    let ctx = restored.context();
    assert_eq!(ctx.ledger.energy, 240);
    let id = ctx.grid.tower_at(cell("top:3")).unwrap();
    assert_eq!(ctx.store.tower(id).unwrap().level, 2);
    assert!(ctx.grid.tower_at(cell("top:4")).is_none());
}
