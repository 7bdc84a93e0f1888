//! Fills a wave's difficulty budget with weighted random formation templates.

use rand::Rng;

use chroma_core::config::FormationConfig;
use chroma_core::constants::FORMATION_ITERATION_LIMIT;
use chroma_core::enums::EnemyArchetype;
use chroma_core::error::ConfigError;

use super::parser::{parse_definitions, ColorSpec, FormationTemplate};

/// A timed spawn instruction. One event may produce several enemies.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationEvent {
    /// Seconds after wave start.
    pub time: f64,
    pub archetype: EnemyArchetype,
    pub color: ColorSpec,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub group: Option<u32>,
    pub spacing: Option<f64>,
    pub offsets: Vec<f64>,
    pub formation_id: String,
}

#[derive(Debug, Clone)]
pub struct WavePlan {
    pub wave: u32,
    /// Sorted by time, then formation id.
    pub events: Vec<FormationEvent>,
    pub total_enemies: u32,
    pub spent_difficulty: u32,
    pub remaining_difficulty: u32,
}

#[derive(Debug, Clone)]
pub struct FormationPlanner {
    templates: Vec<FormationTemplate>,
    formation_gap: f64,
    minimum_weight: f64,
}

impl FormationPlanner {
    pub fn new(templates: Vec<FormationTemplate>, formation_gap: f64, minimum_weight: f64) -> Self {
        Self {
            templates,
            formation_gap,
            minimum_weight,
        }
    }

    pub fn from_config(config: &FormationConfig) -> Result<Self, ConfigError> {
        let templates = parse_definitions(&config.definitions)?;
        tracing::debug!(count = templates.len(), "formation templates loaded");
        Ok(Self::new(templates, config.formation_gap, config.minimum_weight))
    }

    pub fn templates(&self) -> &[FormationTemplate] {
        &self.templates
    }

    /// Selection weight of a template on `wave`.
    pub fn weight(&self, template: &FormationTemplate, wave: u32) -> f64 {
        let Some(expr) = &template.probability else {
            return 1.0;
        };
        let value = expr.eval(f64::from(wave));
        if value.is_finite() && value > 0.0 {
            value
        } else {
            self.minimum_weight
        }
    }

    /// Plan a wave against `budget`. Returns `None` when nothing could be selected.
    pub fn plan_wave<R: Rng + ?Sized>(&self, wave: u32, budget: u32, rng: &mut R) -> Option<WavePlan> {
        if budget == 0 || self.templates.is_empty() {
            return None;
        }

        let mut remaining = budget;
        let mut selections: Vec<&FormationTemplate> = Vec::new();
        for _ in 0..FORMATION_ITERATION_LIMIT {
            if remaining == 0 {
                break;
            }
            let candidates: Vec<&FormationTemplate> = self
                .templates
                .iter()
                .filter(|t| t.difficulty <= remaining && wave >= t.min_wave)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let weights: Vec<f64> = candidates.iter().map(|t| self.weight(t, wave)).collect();
            let chosen = candidates[weighted_index(&weights, rng)];
            remaining -= chosen.difficulty;
            selections.push(chosen);
        }
        if selections.is_empty() {
            return None;
        }

        let mut events = Vec::new();
        let mut cursor = 0.0;
        for template in &selections {
            for member in &template.members {
                events.push(FormationEvent {
                    time: cursor + member.time.max(0.0),
                    archetype: member.archetype,
                    color: member.color,
                    x: member.x,
                    y: member.y,
                    group: member.group,
                    spacing: member.spacing,
                    offsets: member.offsets.clone(),
                    formation_id: template.id.clone(),
                });
            }
            let gap = template.gap.unwrap_or(self.formation_gap).max(0.0);
            cursor += template.duration() + gap;
        }
        events.sort_by(|a, b| {
            a.time
                .total_cmp(&b.time)
                .then_with(|| a.formation_id.cmp(&b.formation_id))
        });

        let spent_difficulty = selections.iter().map(|t| t.difficulty).sum();
        tracing::debug!(
            wave,
            budget,
            spent_difficulty,
            templates = selections.len(),
            events = events.len(),
            "wave planned"
        );
        Some(WavePlan {
            wave,
            total_enemies: events.len() as u32,
            events,
            spent_difficulty,
            remaining_difficulty: remaining,
        })
    }
}

/// Weighted random index. Falls back to a uniform pick when no weight is positive.
fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let clean = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
    let total: f64 = weights.iter().copied().map(clean).sum();
    let last = weights.len().saturating_sub(1);
    if total <= 0.0 {
        let idx = (rng.gen::<f64>() * weights.len() as f64).floor() as usize;
        return idx.min(last);
    }
    let mut roll = rng.gen::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        roll -= clean(w);
        if roll <= 0.0 {
            return i;
        }
    }
    last
}
