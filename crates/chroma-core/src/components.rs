//! ECS components for hecs entities.
//!
//! Components are plain data. The few methods here only keep a component's
//! own fields consistent; game logic lives in the simulation systems.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::{ProjectileConfig, TowerConfig};
use crate::constants::{MAX_TOWER_LEVEL, MIN_TOWER_LEVEL};
use crate::enums::*;
use crate::types::{CellId, TowerId};

/// Damageable hit points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn new(max: f64) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount` and return the damage actually dealt.
    /// Health never drops below zero.
    pub fn apply_damage(&mut self, amount: f64) -> f64 {
        let dealt = amount.max(0.0).min(self.current);
        self.current -= dealt;
        dealt
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Enemy identity and body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyInfo {
    /// Monotonic spawn order. Lower serial = spawned earlier.
    pub serial: u64,
    pub archetype: EnemyArchetype,
    pub color: TowerColor,
    /// Index of the spawn event that produced this enemy.
    pub spawn_group: u32,
    pub half_extents: DVec2,
}

/// Derived combat stats for a tower at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    pub range: f64,
    pub damage: f64,
    pub fire_interval_secs: f64,
    pub weapon: WeaponVariant,
    /// Radius of a standard projectile fired at this level.
    pub projectile_radius: f64,
}

impl TowerStats {
    pub fn for_level(level: u8, towers: &TowerConfig, projectiles: &ProjectileConfig) -> Self {
        let level = level.clamp(MIN_TOWER_LEVEL, MAX_TOWER_LEVEL);
        let idx = usize::from(level - 1);
        let steps = f64::from(level - 1);
        let range =
            towers.base_range * (1.0 + towers.range_per_level * steps) * towers.range_bonus_multiplier;
        let damage = towers.damage_by_level.get(idx).copied().unwrap_or(0.0);
        let fire_interval_secs = towers.fire_interval_ms.get(idx).copied().unwrap_or(1000.0) / 1000.0;
        let radius_level = level.min(crate::constants::PROJECTILE_RADIUS_LEVEL_CAP);
        let projectile_radius =
            projectiles.base_radius + projectiles.radius_per_level * f64::from(radius_level - 1);
        Self {
            range,
            damage,
            fire_interval_secs,
            weapon: WeaponVariant::for_level(level),
            projectile_radius,
        }
    }
}

/// Tower state. Position is stored as a separate [`crate::types::Position`] component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: TowerId,
    pub color: TowerColor,
    pub level: u8,
    pub stats: TowerStats,
    /// Seconds until the tower may fire again. Ready at <= 0.
    pub cooldown_secs: f64,
    pub cell: CellId,
}

impl Tower {
    pub fn new(
        id: TowerId,
        cell: CellId,
        color: TowerColor,
        level: u8,
        towers: &TowerConfig,
        projectiles: &ProjectileConfig,
    ) -> Self {
        let level = level.clamp(MIN_TOWER_LEVEL, MAX_TOWER_LEVEL);
        Self {
            id,
            color,
            level,
            stats: TowerStats::for_level(level, towers, projectiles),
            cooldown_secs: 0.0,
            cell,
        }
    }

    /// Raise the level and recompute stats. Levels never decrease.
    pub fn set_level(&mut self, level: u8, towers: &TowerConfig, projectiles: &ProjectileConfig) {
        let level = level.clamp(self.level, MAX_TOWER_LEVEL);
        self.level = level;
        self.stats = TowerStats::for_level(level, towers, projectiles);
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_TOWER_LEVEL
    }
}

/// Traveling projectile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ProjectileKind {
    Standard,
    MinigunBullet,
    Rocket { explosion_radius: f64 },
}

/// Traveling projectile. Moves with its `Velocity` component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub damage: f64,
    pub color: TowerColor,
    pub hit_radius: f64,
}

/// Railgun beam. Damage is applied at fire time; the beam only lingers for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub origin: DVec2,
    pub angle: f64,
    pub length: f64,
    pub color: TowerColor,
    pub remaining_secs: f64,
}
