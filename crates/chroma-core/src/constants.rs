//! Simulation constants and tuning parameters.
//!
//! Balance data (costs, damage tables, wave schedules) lives in
//! [`crate::config::GameConfig`]; these are structural limits that the
//! rest of the code relies on.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Default RNG seed for headless runs.
pub const DEFAULT_SEED: u64 = 42;

// --- Towers ---

/// Level of a freshly placed tower.
pub const MIN_TOWER_LEVEL: u8 = 1;

/// Highest reachable tower level.
pub const MAX_TOWER_LEVEL: u8 = 6;

/// Projectile radius stops growing past this level.
pub const PROJECTILE_RADIUS_LEVEL_CAP: u8 = 3;

// --- Weapons ---

/// Fraction of an enemy's largest side added to a rocket's explosion radius.
pub const ROCKET_SPLASH_SIZE_FACTOR: f64 = 0.35;

// --- Waves ---

/// Upper bound on template selections while planning one wave.
pub const FORMATION_ITERATION_LIMIT: usize = 200;

/// Rejection-sampling attempts for the color curve before forcing a gap.
pub const COLOR_CURVE_MAX_ATTEMPTS: u32 = 64;

// --- Persistence ---

/// Save schema version understood by this build.
pub const SAVE_VERSION: u32 = 1;

pub const MAX_SAVED_LIVES: u32 = 99;
pub const MAX_SAVED_ENERGY: u32 = 9_999;
pub const MAX_SAVED_SCORE: u64 = 9_999_999;
pub const MAX_SAVED_WAVE: u32 = 9_999;
