//! Persisted progress.
//!
//! Saves are written in camelCase JSON. Loading is lenient: out-of-range
//! numbers are clamped and malformed tower entries are dropped, but a save
//! with an unknown version is discarded entirely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::TowerColor;
use crate::types::CellId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub version: u32,
    pub lives: u32,
    pub energy: u32,
    /// Next wave to be fought.
    pub wave: u32,
    pub score: u64,
    pub best_score: u64,
    pub towers: Vec<TowerSave>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerSave {
    pub cell_id: CellId,
    pub color: TowerColor,
    pub level: u8,
}

/// Untrusted on-disk shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSave {
    version: Option<f64>,
    lives: Option<f64>,
    energy: Option<f64>,
    wave: Option<f64>,
    score: Option<f64>,
    best_score: Option<f64>,
    towers: Vec<RawTowerSave>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTowerSave {
    cell_id: Option<String>,
    color: Option<String>,
    level: Option<f64>,
}

fn clamp_number(value: Option<f64>, min: f64, max: f64, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.floor().clamp(min, max),
        _ => fallback,
    }
}

impl SaveSnapshot {
    /// Parse a save, clamping every field into its legal range.
    ///
    /// Returns `None` for unparsable JSON or an unknown version. `max_wave`
    /// caps the restored wave number (the configured wave limit, if any).
    pub fn from_json(json: &str, max_wave: Option<u32>) -> Option<Self> {
        let raw: RawSave = serde_json::from_str(json).ok()?;
        if raw.version != Some(f64::from(SAVE_VERSION)) {
            return None;
        }

        let wave_cap = f64::from(max_wave.unwrap_or(MAX_SAVED_WAVE).clamp(1, MAX_SAVED_WAVE));
        let score_cap = MAX_SAVED_SCORE as f64;
        let score = clamp_number(raw.score, 0.0, score_cap, 0.0) as u64;
        let best_score = (clamp_number(raw.best_score, 0.0, score_cap, 0.0) as u64).max(score);

        let mut seen = HashSet::new();
        let towers = raw
            .towers
            .into_iter()
            .filter_map(|t| {
                let cell_id: CellId = t.cell_id?.parse().ok()?;
                let color = TowerColor::parse(&t.color?)?;
                let level = clamp_number(
                    t.level,
                    f64::from(MIN_TOWER_LEVEL),
                    f64::from(MAX_TOWER_LEVEL),
                    f64::from(MIN_TOWER_LEVEL),
                ) as u8;
                seen.insert(cell_id).then_some(TowerSave {
                    cell_id,
                    color,
                    level,
                })
            })
            .collect();

        Some(Self {
            version: SAVE_VERSION,
            lives: clamp_number(raw.lives, 0.0, f64::from(MAX_SAVED_LIVES), 0.0) as u32,
            energy: clamp_number(raw.energy, 0.0, f64::from(MAX_SAVED_ENERGY), 0.0) as u32,
            wave: clamp_number(raw.wave, 1.0, wave_cap, 1.0) as u32,
            score,
            best_score,
            towers,
        })
    }

    pub fn to_json(&self) -> String {
        // Plain data with string map keys only; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
