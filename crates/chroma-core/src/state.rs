//! Game state snapshot: the complete visible state handed to a renderer each tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::components::{Beam, ProjectileKind};
use crate::enums::*;
use crate::events::{AudioCue, DomainEvent, Feedback};
use crate::types::{CellId, SimTime, TowerId};

/// Read-only view of the simulation after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub mode: PlacementMode,
    /// First tower picked while merge-selecting.
    pub merge_anchor: Option<TowerId>,
    pub economy: EconomyView,
    pub wave: WaveView,
    pub cells: Vec<CellView>,
    pub towers: Vec<TowerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub beams: Vec<Beam>,
    pub merge_hints: Vec<MergeHint>,
    /// Domain events published since the previous snapshot.
    pub events: Vec<DomainEvent>,
    pub audio: Vec<AudioCue>,
    pub feedback: Vec<Feedback>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomyView {
    pub lives: u32,
    pub energy: u32,
    pub score: u64,
    pub best_score: u64,
    /// Current energy multiplier for kills and wave clears.
    pub energy_multiplier: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    /// Wave being fought, or the next wave while building.
    pub number: u32,
    pub in_progress: bool,
    /// Spawn events materialized so far.
    pub spawned: u32,
    /// Spawn events in the wave.
    pub total: u32,
    pub enemies_alive: u32,
    /// True when the current wave came from the formation planner.
    pub planned: bool,
    pub upgrades_unlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellView {
    pub id: CellId,
    /// Top-left corner.
    pub origin: DVec2,
    pub size: DVec2,
    pub tower: Option<TowerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: TowerId,
    pub cell: CellId,
    pub position: DVec2,
    pub color: TowerColor,
    pub level: u8,
    pub range: f64,
    pub weapon: WeaponVariant,
    /// 0.0 = ready to fire, 1.0 = just fired.
    pub reload: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub serial: u64,
    pub archetype: EnemyArchetype,
    pub color: TowerColor,
    pub position: DVec2,
    pub half_extents: DVec2,
    pub health: f64,
    pub max_health: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub kind: ProjectileKind,
    pub color: TowerColor,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
}

/// Two adjacent towers that can be merged right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeHint {
    pub anchor: TowerId,
    pub partner: TowerId,
    pub color: TowerColor,
}
