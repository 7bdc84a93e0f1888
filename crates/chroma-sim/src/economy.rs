//! Economy ledger: lives, energy, score, and the wave energy multiplier.

use chroma_core::config::{EnergyScalingConfig, GameConfig};
use chroma_core::enums::EnemyArchetype;

/// Energy bonus multiplier for `wave`: `1 + bonus`, where the bonus is
/// interpolated piecewise-linearly between breakpoints, held after the last
/// one, and capped at `max_bonus`.
pub fn wave_energy_multiplier(scaling: &EnergyScalingConfig, wave: u32) -> f64 {
    let wave = f64::from(wave.max(1));
    let base_wave = f64::from(scaling.base_wave.max(1));

    let bonus = if wave <= base_wave {
        scaling.base_bonus
    } else {
        let mut breakpoints = scaling.breakpoints.clone();
        breakpoints.sort_by_key(|bp| bp.wave);

        let mut prev_wave = base_wave;
        let mut prev_bonus = scaling.base_bonus;
        let mut result = None;
        for bp in &breakpoints {
            let target = prev_wave.max(f64::from(bp.wave.max(1)));
            if wave <= target {
                let span = (target - prev_wave).max(1.0);
                let progress = ((wave - prev_wave) / span).clamp(0.0, 1.0);
                result = Some(prev_bonus + (bp.bonus - prev_bonus) * progress);
                break;
            }
            prev_wave = target;
            prev_bonus = bp.bonus;
        }
        result.unwrap_or(prev_bonus)
    };

    let capped = match scaling.max_bonus {
        Some(max) => bonus.min(max),
        None => bonus,
    };
    1.0 + capped
}

#[derive(Debug, Clone, PartialEq)]
pub struct EconomyLedger {
    pub lives: u32,
    pub energy: u32,
    pub score: u64,
    pub best_score: u64,
    /// Wave currently being fought, or the next one while building.
    pub wave: u32,
}

impl EconomyLedger {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            lives: config.player.initial_lives,
            energy: config.player.initial_energy,
            score: 0,
            best_score: 0,
            wave: 1,
        }
    }

    pub fn credit(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount);
    }

    /// Debit `amount` if affordable.
    pub fn try_debit(&mut self, amount: u32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        true
    }

    /// Adjust score by a signed delta. Score never goes below zero and the
    /// best score only ever rises.
    pub fn add_score(&mut self, delta: i64) {
        self.score = if delta >= 0 {
            self.score.saturating_add(delta.unsigned_abs())
        } else {
            self.score.saturating_sub(delta.unsigned_abs())
        };
        self.best_score = self.best_score.max(self.score);
    }

    /// Remove one life and return how many remain.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn energy_multiplier(&self, config: &GameConfig) -> f64 {
        wave_energy_multiplier(&config.player.kill_energy_scaling, self.wave)
    }

    /// Energy for killing one enemy of `archetype` on the current wave.
    pub fn kill_reward(&self, archetype: EnemyArchetype, config: &GameConfig) -> u32 {
        let archetype_mult = match archetype {
            EnemyArchetype::Tank => config.player.tank_kill_energy_multiplier,
            EnemyArchetype::Standard | EnemyArchetype::Swarm => 1.0,
        };
        let reward =
            f64::from(config.player.energy_per_kill) * self.energy_multiplier(config) * archetype_mult;
        reward.round().max(0.0) as u32
    }

    /// Energy for clearing the current wave.
    pub fn wave_clear_reward(&self, config: &GameConfig) -> u32 {
        let reward = f64::from(config.player.energy_per_wave) * self.energy_multiplier(config);
        reward.round().max(0.0) as u32
    }
}
