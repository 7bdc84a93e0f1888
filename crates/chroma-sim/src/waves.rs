//! Wave scheduling: per-wave settings, the spawn timeline, and enemy materialization.

use glam::DVec2;
use rand::Rng;

use chroma_core::config::GameConfig;
use chroma_core::constants::COLOR_CURVE_MAX_ATTEMPTS;
use chroma_core::enums::{EnemyArchetype, TowerColor};
use chroma_core::error::SimError;

use crate::formation::{ColorSpec, FormationEvent, FormationPlanner};
use crate::store::{EnemySpawn, EntityStore};
use crate::tank_schedule::select_burst_positions;

/// Resolved tuning for one wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSettings {
    pub wave: u32,
    /// Formation budget, and the slot count on the legacy path.
    pub difficulty: u32,
    /// Base hit points before archetype multipliers.
    pub hp_scalar: f64,
    pub tanks_count: u32,
    /// Seconds between legacy spawn slots.
    pub spawn_interval: f64,
}

/// Difficulty budget for `wave`, including endless growth and the global multiplier.
pub fn resolve_difficulty(config: &GameConfig, wave: u32) -> u32 {
    let wave = wave.max(1);
    let authored = &config.formations.wave_difficulty;
    let last = authored.last().copied().unwrap_or(0.0);

    let raw = match authored.get(wave as usize - 1) {
        Some(value) => *value,
        None => {
            let endless = &config.formations.endless_difficulty;
            let start = endless.start_wave.unwrap_or(authored.len() as u32 + 1);
            if wave < start {
                last
            } else {
                let base = endless.base.unwrap_or(last);
                let computed = base + endless.growth * f64::from(wave - start);
                computed
                    .round()
                    .max(0.0)
                    .min(endless.max.unwrap_or(f64::INFINITY))
            }
        }
    };
    (raw * config.waves.difficulty_multiplier).round().max(0.0) as u32
}

pub fn resolve_wave_settings(config: &GameConfig, wave: u32) -> WaveSettings {
    let wave = wave.max(1);
    let waves = &config.waves;

    let (spawn_interval, tanks_count) = match waves.schedule.get(wave as usize - 1) {
        Some(entry) => (entry.interval, entry.tanks_count),
        None => {
            let (len, last) = (waves.schedule.len() as u32, waves.schedule.last());
            let extra = wave.saturating_sub(len);
            let (interval, tanks) = last.map(|e| (e.interval, e.tanks_count)).unwrap_or((1.0, 0));
            let interval = (interval * waves.endless.interval_factor.powi(extra as i32))
                .max(waves.endless.min_interval);
            (interval, tanks + waves.endless.tanks_increment * extra)
        }
    };

    let hp = &waves.enemy_hp_by_wave;
    let hp_scalar = match hp.get(wave as usize - 1) {
        Some(value) => *value,
        None => {
            let extra = wave.saturating_sub(hp.len() as u32);
            hp.last().copied().unwrap_or(1.0) * waves.endless.hp_growth.powi(extra as i32)
        }
    };

    WaveSettings {
        wave,
        difficulty: resolve_difficulty(config, wave),
        hp_scalar,
        tanks_count,
        spawn_interval,
    }
}

/// Flat schedule used when no formation plan exists: `difficulty` slots, one
/// every `spawn_interval`, with burst-sampled slots promoted to tanks.
pub fn legacy_events<R: Rng + ?Sized>(settings: &WaveSettings, rng: &mut R) -> Vec<FormationEvent> {
    let tanks = select_burst_positions(rng, settings.difficulty, settings.tanks_count);
    (1..=settings.difficulty)
        .map(|slot| FormationEvent {
            time: f64::from(slot - 1) * settings.spawn_interval,
            archetype: if tanks.binary_search(&slot).is_ok() {
                EnemyArchetype::Tank
            } else {
                EnemyArchetype::Swarm
            },
            color: ColorSpec::Auto,
            x: None,
            y: None,
            group: None,
            spacing: None,
            offsets: Vec::new(),
            formation_id: "legacy".to_string(),
        })
        .collect()
}

/// Per-wave probability of red, interpolated over spawn progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCurve {
    pub start: f64,
    pub end: f64,
}

impl ColorCurve {
    /// Draw endpoints uniformly until they differ by more than `min_difference`.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, min_difference: f64) -> Self {
        for _ in 0..COLOR_CURVE_MAX_ATTEMPTS {
            let (start, end) = (rng.gen::<f64>(), rng.gen::<f64>());
            if (start - end).abs() > min_difference {
                return Self { start, end };
            }
        }
        Self { start: 0.0, end: 1.0 }
    }

    pub fn probability(&self, spawned: u32, total: u32) -> f64 {
        let progress = if total > 1 {
            f64::from(spawned) / f64::from(total - 1)
        } else {
            1.0
        };
        self.start + (self.end - self.start) * progress
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R, spawned: u32, total: u32) -> TowerColor {
        if rng.gen::<f64>() < self.probability(spawned, total) {
            TowerColor::Red
        } else {
            TowerColor::Blue
        }
    }
}

#[derive(Debug, Clone)]
struct SpawnTimeline {
    events: Vec<FormationEvent>,
    cursor: usize,
}

/// Drives the active wave's spawn timeline.
#[derive(Debug, Clone, Default)]
pub struct WaveScheduler {
    in_progress: bool,
    timeline: Option<SpawnTimeline>,
    settings: Option<WaveSettings>,
    curve: Option<ColorCurve>,
    elapsed: f64,
    spawned: u32,
    total: u32,
    planned: bool,
}

impl WaveScheduler {
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether the active wave came from the formation planner.
    pub fn planned(&self) -> bool {
        self.planned
    }

    pub fn settings(&self) -> Option<&WaveSettings> {
        self.settings.as_ref()
    }

    /// Build the timeline for `wave`. A non-empty formation plan takes
    /// precedence; otherwise the legacy flat schedule is used.
    pub fn begin<R: Rng + ?Sized>(
        &mut self,
        wave: u32,
        config: &GameConfig,
        planner: &FormationPlanner,
        rng: &mut R,
    ) -> u32 {
        let settings = resolve_wave_settings(config, wave);
        let plan = planner
            .plan_wave(wave, settings.difficulty, rng)
            .filter(|p| !p.events.is_empty());
        let (events, planned) = match plan {
            Some(plan) => (plan.events, true),
            None => (legacy_events(&settings, rng), false),
        };

        self.curve = Some(ColorCurve::sample(rng, config.player.color_min_difference));
        self.total = events.len() as u32;
        self.spawned = 0;
        self.elapsed = 0.0;
        self.planned = planned;
        self.settings = Some(settings);
        self.timeline = Some(SpawnTimeline { events, cursor: 0 });
        self.in_progress = true;
        self.total
    }

    /// Advance wave time and spawn every event that has come due.
    /// Returns the number of events materialized this call.
    pub fn spawn_due<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        wave: u32,
        store: &mut EntityStore,
        config: &GameConfig,
        rng: &mut R,
    ) -> Result<u32, SimError> {
        if !self.in_progress {
            return Ok(0);
        }
        let (Some(timeline), Some(settings)) = (self.timeline.as_mut(), self.settings) else {
            return Err(SimError::MissingSpawnSchedule { wave });
        };
        let curve = self.curve.unwrap_or(ColorCurve { start: 0.5, end: 0.5 });

        self.elapsed += dt;
        let mut count = 0;
        while let Some(event) = timeline.events.get(timeline.cursor) {
            if event.time > self.elapsed {
                break;
            }
            materialize(
                event,
                self.spawned,
                self.total,
                &settings,
                &curve,
                store,
                config,
                rng,
            );
            timeline.cursor += 1;
            self.spawned += 1;
            count += 1;
        }
        Ok(count)
    }

    /// All events spawned and no enemy left alive.
    pub fn is_complete(&self, live_enemies: usize) -> bool {
        self.in_progress && self.spawned == self.total && live_enemies == 0
    }

    pub fn finish(&mut self) {
        *self = Self::default();
    }

    #[cfg(test)]
    pub(crate) fn force_in_progress_without_timeline(&mut self) {
        self.in_progress = true;
        self.timeline = None;
    }
}

#[allow(clippy::too_many_arguments)]
fn materialize<R: Rng + ?Sized>(
    event: &FormationEvent,
    spawn_group: u32,
    total: u32,
    settings: &WaveSettings,
    curve: &ColorCurve,
    store: &mut EntityStore,
    config: &GameConfig,
    rng: &mut R,
) {
    let enemies = &config.enemies;
    let archetype = enemies.archetype(event.archetype);
    let count = event.group.unwrap_or(if event.offsets.is_empty() {
        archetype.group_size
    } else {
        event.offsets.len() as u32
    });
    let spacing = event.spacing.unwrap_or(archetype.spacing);
    let center_base = f64::from(count.saturating_sub(1)) / 2.0;
    let hp = (settings.hp_scalar * archetype.hp_multiplier).floor().max(1.0);
    let velocity = archetype.speed * enemies.speed_multiplier;
    let anchor = DVec2::new(
        event.x.unwrap_or(enemies.default_spawn.x),
        event.y.unwrap_or(enemies.default_spawn.y),
    );

    for i in 0..count {
        let offset = event
            .offsets
            .get(i as usize)
            .copied()
            .unwrap_or((f64::from(i) - center_base) * spacing);
        let color = match event.color {
            ColorSpec::Fixed(color) => color,
            ColorSpec::Auto => curve.pick(rng, spawn_group, total),
        };
        store.spawn_enemy(EnemySpawn {
            center: anchor + DVec2::new(0.0, offset),
            velocity,
            hp,
            archetype: event.archetype,
            color,
            spawn_group,
            half_extents: enemies.dimensions * 0.5,
        });
    }
}
