//! Snapshot system: builds a complete GameStateSnapshot from the context.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use chroma_core::components::*;
use chroma_core::config::GameConfig;
use chroma_core::events::{AudioCue, DomainEvent, Feedback};
use chroma_core::state::*;
use chroma_core::types::{Position, SimTime, Velocity};

use crate::context::SimulationContext;
use crate::grid::TowerGrid;
use crate::towers;

/// Build a complete GameStateSnapshot. `events`, `audio`, and `feedback`
/// are whatever the bus collected since the last snapshot.
pub fn build_snapshot(
    ctx: &SimulationContext,
    config: &GameConfig,
    time: &SimTime,
    (events, audio, feedback): (Vec<DomainEvent>, Vec<AudioCue>, Vec<Feedback>),
) -> GameStateSnapshot {
    let world = ctx.store.world();
    GameStateSnapshot {
        time: *time,
        phase: ctx.phase,
        mode: ctx.modes.mode,
        merge_anchor: ctx.modes.anchor,
        economy: EconomyView {
            lives: ctx.ledger.lives,
            energy: ctx.ledger.energy,
            score: ctx.ledger.score,
            best_score: ctx.ledger.best_score,
            energy_multiplier: ctx.ledger.energy_multiplier(config),
        },
        wave: WaveView {
            number: ctx.ledger.wave,
            in_progress: ctx.waves.in_progress(),
            spawned: ctx.waves.spawned(),
            total: ctx.waves.total(),
            enemies_alive: ctx.store.live_enemies().len() as u32,
            planned: ctx.waves.planned(),
            upgrades_unlocked: ctx.ledger.wave >= config.upgrade.min_wave,
        },
        cells: build_cells(&ctx.grid),
        towers: build_towers(world),
        enemies: build_enemies(world),
        projectiles: build_projectiles(world),
        beams: world.query::<&Beam>().iter().map(|(_, b)| *b).collect(),
        merge_hints: towers::merge_hints(ctx),
        events,
        audio,
        feedback,
    }
}

fn build_cells(grid: &TowerGrid) -> Vec<CellView> {
    grid.cells()
        .iter()
        .map(|c| CellView {
            id: c.id,
            origin: c.origin,
            size: c.size,
            tower: c.tower,
        })
        .collect()
}

fn build_towers(world: &World) -> Vec<TowerView> {
    let mut towers: Vec<TowerView> = world
        .query::<(&Position, &Tower)>()
        .iter()
        .map(|(_, (pos, t))| TowerView {
            id: t.id,
            cell: t.cell,
            position: pos.0,
            color: t.color,
            level: t.level,
            range: t.stats.range,
            weapon: t.stats.weapon,
            reload: if t.stats.fire_interval_secs > 0.0 {
                (t.cooldown_secs / t.stats.fire_interval_secs).clamp(0.0, 1.0)
            } else {
                0.0
            },
        })
        .collect();

    towers.sort_by_key(|t| t.id);
    towers
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&Position, &Health, &EnemyInfo)>()
        .iter()
        .map(|(_, (pos, hp, info))| EnemyView {
            serial: info.serial,
            archetype: info.archetype,
            color: info.color,
            position: pos.0,
            half_extents: info.half_extents,
            health: hp.current,
            max_health: hp.max,
        })
        .collect();

    enemies.sort_by_key(|e| e.serial);
    enemies
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<(&Position, &Velocity, &Projectile)>()
        .iter()
        .map(|(_, (pos, vel, p))| ProjectileView {
            kind: p.kind,
            color: p.color,
            position: pos.0,
            velocity: vel.0,
            radius: p.hit_radius,
        })
        .collect()
}
