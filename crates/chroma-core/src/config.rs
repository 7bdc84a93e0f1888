//! Balance configuration.
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs to list
//! the values it overrides. `Default` is the authored balance.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TOWER_LEVEL;
use crate::error::ConfigError;

/// Complete game configuration, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub projectiles: ProjectileConfig,
    pub towers: TowerConfig,
    pub weapons: WeaponConfig,
    pub upgrade: UpgradeConfig,
    pub enemies: EnemyConfig,
    pub waves: WavesConfig,
    pub formations: FormationConfig,
    pub scoring: ScoringConfig,
    pub world: WorldConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every value the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = usize::from(MAX_TOWER_LEVEL);

        let p = &self.player;
        ensure_range("player.color_min_difference", p.color_min_difference, 0.0, 1.0)?;
        ensure_non_negative("player.tank_kill_energy_multiplier", p.tank_kill_energy_multiplier)?;
        ensure_non_negative("player.kill_energy_scaling.base_bonus", p.kill_energy_scaling.base_bonus)?;
        if let Some(max) = p.kill_energy_scaling.max_bonus {
            ensure_finite("player.kill_energy_scaling.max_bonus", max)?;
        }
        for (i, bp) in p.kill_energy_scaling.breakpoints.iter().enumerate() {
            ensure_finite(format!("player.kill_energy_scaling.breakpoints[{i}].bonus"), bp.bonus)?;
        }
        if p.max_waves == Some(0) {
            return Err(ConfigError::invalid("player.max_waves", "must be at least 1"));
        }

        let pr = &self.projectiles;
        ensure_positive("projectiles.speed", pr.speed)?;
        ensure_non_negative("projectiles.base_radius", pr.base_radius)?;
        ensure_non_negative("projectiles.radius_per_level", pr.radius_per_level)?;
        ensure_range("projectiles.color_mismatch_multiplier", pr.color_mismatch_multiplier, 0.0, 1.0)?;

        let t = &self.towers;
        ensure_positive("towers.base_range", t.base_range)?;
        ensure_non_negative("towers.range_per_level", t.range_per_level)?;
        ensure_positive("towers.range_bonus_multiplier", t.range_bonus_multiplier)?;
        ensure_len("towers.fire_interval_ms", t.fire_interval_ms.len(), levels)?;
        ensure_len("towers.damage_by_level", t.damage_by_level.len(), levels)?;
        for (i, ms) in t.fire_interval_ms.iter().enumerate() {
            ensure_positive(format!("towers.fire_interval_ms[{i}]"), *ms)?;
        }
        for (i, dmg) in t.damage_by_level.iter().enumerate() {
            ensure_non_negative(format!("towers.damage_by_level[{i}]"), *dmg)?;
        }

        ensure_len("upgrade.cost_by_level", self.upgrade.cost_by_level.len(), levels - 1)?;

        let w = &self.weapons;
        if w.minigun.burst_count == 0 {
            return Err(ConfigError::invalid("weapons.minigun.burst_count", "must be at least 1"));
        }
        ensure_non_negative("weapons.minigun.spread", w.minigun.spread)?;
        ensure_positive("weapons.minigun.speed_factor", w.minigun.speed_factor)?;
        ensure_non_negative("weapons.minigun.radius_factor", w.minigun.radius_factor)?;
        ensure_positive("weapons.railgun.beam_length", w.railgun.beam_length)?;
        ensure_positive("weapons.railgun.hit_threshold", w.railgun.hit_threshold)?;
        ensure_non_negative("weapons.railgun.end_padding", w.railgun.end_padding)?;
        ensure_non_negative("weapons.railgun.beam_lifetime", w.railgun.beam_lifetime)?;
        ensure_positive("weapons.rocket.speed", w.rocket.speed)?;
        ensure_non_negative("weapons.rocket.hit_radius", w.rocket.hit_radius)?;
        ensure_non_negative("weapons.rocket.explosion_radius", w.rocket.explosion_radius)?;

        let e = &self.enemies;
        ensure_positive("enemies.dimensions.x", e.dimensions.x)?;
        ensure_positive("enemies.dimensions.y", e.dimensions.y)?;
        ensure_positive("enemies.speed_multiplier", e.speed_multiplier)?;
        for (name, a) in [("standard", &e.standard), ("tank", &e.tank), ("swarm", &e.swarm)] {
            ensure_positive(format!("enemies.{name}.hp_multiplier"), a.hp_multiplier)?;
            ensure_finite(format!("enemies.{name}.speed.x"), a.speed.x)?;
            ensure_finite(format!("enemies.{name}.speed.y"), a.speed.y)?;
            ensure_non_negative(format!("enemies.{name}.spacing"), a.spacing)?;
            if a.group_size == 0 {
                return Err(ConfigError::invalid(
                    format!("enemies.{name}.group_size"),
                    "must be at least 1",
                ));
            }
        }

        let wv = &self.waves;
        if wv.schedule.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        for (i, entry) in wv.schedule.iter().enumerate() {
            ensure_positive(format!("waves.schedule[{i}].interval"), entry.interval)?;
        }
        if wv.enemy_hp_by_wave.is_empty() {
            return Err(ConfigError::invalid("waves.enemy_hp_by_wave", "must not be empty"));
        }
        for (i, hp) in wv.enemy_hp_by_wave.iter().enumerate() {
            ensure_positive(format!("waves.enemy_hp_by_wave[{i}]"), *hp)?;
        }
        ensure_positive("waves.difficulty_multiplier", wv.difficulty_multiplier)?;
        ensure_positive("waves.endless.hp_growth", wv.endless.hp_growth)?;
        ensure_positive("waves.endless.interval_factor", wv.endless.interval_factor)?;
        ensure_positive("waves.endless.min_interval", wv.endless.min_interval)?;

        let f = &self.formations;
        ensure_non_negative("formations.formation_gap", f.formation_gap)?;
        ensure_non_negative("formations.minimum_weight", f.minimum_weight)?;
        for (i, d) in f.wave_difficulty.iter().enumerate() {
            ensure_non_negative(format!("formations.wave_difficulty[{i}]"), *d)?;
        }
        ensure_finite("formations.endless_difficulty.growth", f.endless_difficulty.growth)?;

        let g = &self.world.grid;
        ensure_positive("world.grid.cell_size.x", g.cell_size.x)?;
        ensure_positive("world.grid.cell_size.y", g.cell_size.y)?;
        for (name, offsets) in [("top_offsets", &g.top_offsets), ("bottom_offsets", &g.bottom_offsets)] {
            if offsets.is_empty() || offsets.len() > usize::from(u8::MAX) {
                return Err(ConfigError::invalid(
                    format!("world.grid.{name}"),
                    "must have between 1 and 255 cells",
                ));
            }
        }
        ensure_non_negative("world.bounds_min_margin", self.world.bounds_min_margin)?;

        Ok(())
    }
}

fn ensure_finite(field: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not finite")))
    }
}

fn ensure_positive(field: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be > 0")))
    }
}

fn ensure_non_negative(field: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be >= 0")))
    }
}

fn ensure_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be within [{min}, {max}]")))
    }
}

fn ensure_len(field: &'static str, found: usize, expected: usize) -> Result<(), ConfigError> {
    if found == expected {
        Ok(())
    } else {
        Err(ConfigError::TableLength {
            field,
            expected,
            found,
        })
    }
}

// --- Player & economy ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub initial_lives: u32,
    pub initial_energy: u32,
    pub tower_cost: u32,
    pub switch_cost: u32,
    /// Clearing this wave wins the game. `None` plays endlessly.
    pub max_waves: Option<u32>,
    pub energy_per_kill: u32,
    pub tank_kill_energy_multiplier: f64,
    pub energy_per_wave: u32,
    /// Minimum gap between the two endpoints of a wave's color curve.
    pub color_min_difference: f64,
    pub kill_energy_scaling: EnergyScalingConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_lives: 5,
            initial_energy: 480,
            tower_cost: 120,
            switch_cost: 0,
            max_waves: None,
            energy_per_kill: 3,
            tank_kill_energy_multiplier: 2.0,
            energy_per_wave: 20,
            color_min_difference: 0.35,
            kill_energy_scaling: EnergyScalingConfig::default(),
        }
    }
}

/// Piecewise-linear energy bonus curve over wave number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyScalingConfig {
    pub base_wave: u32,
    pub base_bonus: f64,
    pub max_bonus: Option<f64>,
    pub breakpoints: Vec<EnergyBreakpoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakpoint {
    pub wave: u32,
    pub bonus: f64,
}

impl Default for EnergyScalingConfig {
    fn default() -> Self {
        Self {
            base_wave: 1,
            base_bonus: 0.0,
            max_bonus: Some(1.0),
            breakpoints: vec![
                EnergyBreakpoint { wave: 10, bonus: 0.3 },
                EnergyBreakpoint { wave: 20, bonus: 0.6 },
                EnergyBreakpoint { wave: 30, bonus: 1.0 },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub per_kill: u64,
    pub wave_clear: u64,
    pub base_hit_penalty: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            per_kill: 10,
            wave_clear: 150,
            base_hit_penalty: 25,
        }
    }
}

// --- Towers & weapons ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f64,
    pub base_radius: f64,
    pub radius_per_level: f64,
    /// Damage scale when projectile and enemy colors differ.
    pub color_mismatch_multiplier: f64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 700.0,
            base_radius: 18.0,
            radius_per_level: 5.0,
            color_mismatch_multiplier: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    pub base_range: f64,
    pub range_per_level: f64,
    pub range_bonus_multiplier: f64,
    /// Per-level fire interval in milliseconds, index = level - 1.
    pub fire_interval_ms: Vec<f64>,
    /// Per-level damage, index = level - 1.
    pub damage_by_level: Vec<f64>,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            base_range: 140.0,
            range_per_level: 0.2,
            range_bonus_multiplier: 1.3,
            fire_interval_ms: vec![500.0, 200.0, 60.0, 120.0, 1050.0, 1000.0],
            damage_by_level: vec![8.333333333333334, 6.0, 2.6, 6.8, 30.0, 84.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// First wave on which paid upgrades are allowed.
    pub min_wave: u32,
    /// Cost to go from level `i + 1` to `i + 2`.
    pub cost_by_level: Vec<u32>,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            min_wave: 10,
            cost_by_level: vec![100, 120, 160, 220, 300],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub minigun: MinigunConfig,
    pub railgun: RailgunConfig,
    pub rocket: RocketConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinigunConfig {
    pub burst_count: u32,
    /// Maximum angular jitter either side of the aim line (radians).
    pub spread: f64,
    pub speed_factor: f64,
    pub radius_factor: f64,
}

impl Default for MinigunConfig {
    fn default() -> Self {
        Self {
            burst_count: 5,
            spread: 0.06,
            speed_factor: 1.6,
            radius_factor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RailgunConfig {
    pub beam_length: f64,
    /// Fraction of an enemy's half diagonal the beam must pass within.
    pub hit_threshold: f64,
    pub end_padding: f64,
    pub beam_lifetime: f64,
}

impl Default for RailgunConfig {
    fn default() -> Self {
        Self {
            beam_length: 1400.0,
            hit_threshold: 0.75,
            end_padding: 24.0,
            beam_lifetime: 0.12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    pub speed: f64,
    pub hit_radius: f64,
    pub explosion_radius: f64,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            speed: 320.0,
            hit_radius: 14.0,
            explosion_radius: 90.0,
        }
    }
}

// --- Enemies ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub default_spawn: DVec2,
    /// Full width and height of every enemy body.
    pub dimensions: DVec2,
    pub speed_multiplier: f64,
    pub standard: ArchetypeConfig,
    pub tank: ArchetypeConfig,
    pub swarm: ArchetypeConfig,
}

impl EnemyConfig {
    pub fn archetype(&self, archetype: crate::enums::EnemyArchetype) -> &ArchetypeConfig {
        use crate::enums::EnemyArchetype::*;
        match archetype {
            Standard => &self.standard,
            Tank => &self.tank,
            Swarm => &self.swarm,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            default_spawn: DVec2::new(-600.0, 600.0),
            dimensions: DVec2::new(80.0, 80.0),
            speed_multiplier: 0.9,
            standard: ArchetypeConfig {
                hp_multiplier: 10.0,
                speed: DVec2::new(200.0, 0.0),
                group_size: 1,
                spacing: 0.0,
            },
            tank: ArchetypeConfig {
                hp_multiplier: 35.7,
                speed: DVec2::new(100.0, 0.0),
                group_size: 1,
                spacing: 0.0,
            },
            swarm: ArchetypeConfig {
                hp_multiplier: 10.0,
                speed: DVec2::new(200.0, 0.0),
                group_size: 3,
                spacing: 40.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Multiplier over the wave's base hp scalar.
    pub hp_multiplier: f64,
    pub speed: DVec2,
    /// Enemies produced by one spawn event unless a formation overrides it.
    #[serde(default = "default_group_size")]
    pub group_size: u32,
    #[serde(default)]
    pub spacing: f64,
}

fn default_group_size() -> u32 {
    1
}

// --- Waves ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WavesConfig {
    pub schedule: Vec<WaveScheduleEntry>,
    pub enemy_hp_by_wave: Vec<f64>,
    pub endless: EndlessWaveConfig,
    /// Scales every difficulty budget. Must be finite and > 0.
    pub difficulty_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveScheduleEntry {
    /// Seconds between legacy spawn slots.
    pub interval: f64,
    pub tanks_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndlessWaveConfig {
    pub hp_growth: f64,
    pub interval_factor: f64,
    pub min_interval: f64,
    pub tanks_increment: u32,
}

impl Default for EndlessWaveConfig {
    fn default() -> Self {
        Self {
            hp_growth: 1.2,
            interval_factor: 0.94,
            min_interval: 0.45,
            tanks_increment: 2,
        }
    }
}

impl Default for WavesConfig {
    fn default() -> Self {
        const TANKS: [u32; 20] = [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4];
        let schedule = TANKS
            .iter()
            .enumerate()
            .map(|(i, &tanks_count)| WaveScheduleEntry {
                interval: 0.67 + 0.003 * i as f64,
                tanks_count,
            })
            .collect();
        Self {
            schedule,
            enemy_hp_by_wave: vec![
                1.34, 1.64, 1.94, 2.24, 2.53, 2.83, 3.13, 3.43, 3.73, 4.03, 4.32, 4.62, 4.92, 5.02,
                5.12, 5.22, 5.35, 5.55, 5.75, 6.0,
            ],
            endless: EndlessWaveConfig::default(),
            difficulty_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Default pause between consecutive templates (seconds).
    pub formation_gap: f64,
    /// Weight used when a probability expression is non-finite or <= 0.
    pub minimum_weight: f64,
    /// Authored difficulty budget per wave, index = wave - 1.
    pub wave_difficulty: Vec<f64>,
    pub endless_difficulty: EndlessDifficultyConfig,
    /// Formation templates in the block mini-language.
    pub definitions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndlessDifficultyConfig {
    /// Defaults to the wave after the authored list.
    pub start_wave: Option<u32>,
    /// Defaults to the last authored difficulty.
    pub base: Option<f64>,
    pub growth: f64,
    pub max: Option<f64>,
}

impl Default for EndlessDifficultyConfig {
    fn default() -> Self {
        Self {
            start_wave: Some(21),
            base: Some(24.0),
            growth: 2.4,
            max: Some(160.0),
        }
    }
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            formation_gap: 0.85,
            minimum_weight: 0.02,
            wave_difficulty: vec![
                13.0, 13.0, 14.0, 14.0, 15.0, 15.0, 16.0, 16.0, 17.0, 17.0, 18.0, 18.0, 19.0, 19.0,
                20.0, 20.0, 21.0, 21.0, 22.0, 22.0,
            ],
            endless_difficulty: EndlessDifficultyConfig::default(),
            definitions: DEFAULT_FORMATIONS.to_string(),
        }
    }
}

const DEFAULT_FORMATIONS: &str = r"
# Solo Scout | difficulty=1 | probability=Math.max(0.6, 1.4 - 0.05 * wave) | minWave=1
swarm @0 y=600 color=red
swarm @0.35 y=650 color=blue
---
# Twin Harass | difficulty=2 | probability=Math.max(0.4, 0.7 + 0.06 * (wave - 1)) | minWave=1
swarm @0 y=560 color=blue
swarm @0.6 y=640 color=red
swarm @1 y=600 color=blue
---
# Triple Column | difficulty=3 | probability=0.9 + 0.05 * (wave - 1) | minWave=2
swarm @0 y=520 color=red
swarm @0.5 y=600 color=blue
swarm @1 y=680 color=red
swarm @1.4 y=560 color=blue
---
# Tank Spearhead | difficulty=3 | probability=Math.max(0.15, 0.15 + 0.05 * Math.max(0, wave - 3)) | minWave=3
tank @0 y=590 color=blue
swarm @0.5 y=540 color=red
swarm @1 y=640 color=blue
swarm @1.4 y=600 color=red
---
# Escort Column | difficulty=4 | probability=Math.max(0.1, 0.1 + 0.05 * Math.max(0, wave - 5)) | minWave=4
swarm @0 y=620 color=red
tank @0.7 y=580 color=blue
swarm @1.4 y=560 color=red
swarm @2.1 y=600 color=blue
swarm @2.7 y=640 color=red
---
# Heavy Vanguard | difficulty=4 | probability=Math.max(0.05, 0.045 * Math.max(0, wave - 7)) | minWave=5
tank @0 y=600 color=red
tank @0.9 y=580 color=blue
swarm @1.6 y=640 color=red
swarm @2.3 y=560 color=blue
swarm @3 y=600 color=red
---
# Swarm Wave | difficulty=5 | probability=0.4 + 0.05 * Math.max(0, wave - 1) | minWave=2
swarm @0 y=500 color=blue
swarm @0.4 y=550 color=red
swarm @0.8 y=600 color=blue
swarm @1.2 y=650 color=red
swarm @1.6 y=700 color=blue
swarm @2 y=580 color=red
---
# Mixed Barrage | difficulty=6 | probability=Math.max(0.02, 0.04 + 0.05 * Math.max(0, wave - 9)) | minWave=6
swarm @0 y=540 color=red
tank @0.6 y=590 color=blue
swarm @1.2 y=640 color=red
tank @1.8 y=610 color=blue
swarm @2.4 y=560 color=red
swarm @3 y=520 color=blue
tank @3.6 y=600 color=red
---
# Offset Sweep | difficulty=4 | probability=Math.max(0.25, 0.35 + 0.03 * Math.max(0, wave - 2)) | minWave=3
swarm @0 y=520 color=red
swarm @0.35 y=600 color=blue
swarm @0.7 y=680 color=red
swarm @1.05 y=740 color=blue
---
# Staggered Flood | difficulty=5 | probability=Math.max(0.18, 0.28 + 0.04 * Math.max(0, wave - 4)) | minWave=4
swarm @0 y=520 color=blue
swarm @0.2 y=560 color=red
swarm @0.4 y=600 color=blue
swarm @0.6 y=640 color=red
swarm @0.8 y=680 color=blue
swarm @1 y=720 color=red
---
# Tank Phalanx | difficulty=6 | probability=Math.max(0.08, 0.02 * Math.max(0, wave - 5)) | minWave=6
tank @0 y=600 color=red
swarm @0.5 y=560 color=blue
tank @1 y=620 color=blue
swarm @1.5 y=580 color=red
tank @2 y=640 color=red
---
# Spiral Crush | difficulty=7 | probability=Math.max(0.05, 0.02 * Math.max(0, wave - 7)) | minWave=7
swarm @0 y=520 color=red
swarm @0.3 y=560 color=blue
swarm @0.6 y=600 color=red
swarm @0.9 y=640 color=blue
swarm @1.2 y=680 color=red
swarm @1.5 y=720 color=blue
swarm @1.8 y=760 color=red
---
# Warfront Saturation | difficulty=9 | probability=Math.max(0.04, 0.01 * Math.max(0, wave - 9)) | minWave=9
swarm @0 y=520 color=red
swarm @0.15 y=560 color=blue
tank @0.3 y=600 color=red
swarm @0.45 y=640 color=blue
swarm @0.6 y=680 color=red
tank @0.75 y=620 color=blue
swarm @0.9 y=660 color=red
swarm @1.05 y=700 color=blue
swarm @1.2 y=740 color=red
tank @1.35 y=760 color=red
";

// --- World ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Logical playfield height. Enemies below it are discarded.
    pub height: f64,
    pub base: BaseConfig,
    pub bounds_min_margin: f64,
    /// Bounds margin is at least this many times the largest projectile radius.
    pub projectile_radius_factor: f64,
    pub grid: GridConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            height: 960.0,
            base: BaseConfig::default(),
            bounds_min_margin: 40.0,
            projectile_radius_factor: 2.0,
            grid: GridConfig::default(),
        }
    }
}

/// The defended base. Its left edge is the boundary enemies must not cross.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            x: 1100.0,
            y: 490.0,
            width: 160.0,
            height: 160.0,
        }
    }
}

/// Two rows of cells, each laid out as `origin + offset[i]` (top-left corner).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: DVec2,
    pub top_origin: DVec2,
    pub bottom_origin: DVec2,
    pub top_offsets: Vec<DVec2>,
    pub bottom_offsets: Vec<DVec2>,
}

impl Default for GridConfig {
    fn default() -> Self {
        let v = |x: f64, y: f64| DVec2::new(x, y);
        Self {
            cell_size: v(120.0, 160.0),
            top_origin: v(-300.0, 400.0),
            bottom_origin: v(-210.0, 680.0),
            top_offsets: vec![
                v(0.0, 0.0),
                v(210.0, 30.0),
                v(420.0, 50.0),
                v(600.0, 52.0),
                v(750.0, 40.0),
                v(910.0, 18.0),
            ],
            bottom_offsets: vec![
                v(0.0, 0.0),
                v(190.0, -35.0),
                v(380.0, -45.0),
                v(600.0, -45.0),
                v(750.0, -25.0),
                v(910.0, 0.0),
            ],
        }
    }
}
