//! Save-game persistence.
//!
//! Failures never interrupt play: they are logged and reported as `false`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chroma_core::config::GameConfig;
use chroma_core::constants::SAVE_VERSION;
use chroma_core::save::{SaveSnapshot, TowerSave};

use crate::context::SimulationContext;

pub trait PersistenceGateway {
    fn load(&self) -> Option<SaveSnapshot>;
    fn save(&self, snapshot: &SaveSnapshot) -> bool;
    fn clear(&self) -> bool;
}

/// One pretty-printed JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    max_wave: Option<u32>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_wave: None,
        }
    }

    /// Cap restored wave numbers at the configured wave limit.
    pub fn with_max_wave(mut self, max_wave: Option<u32>) -> Self {
        self.max_wave = max_wave;
        self
    }
}

impl PersistenceGateway for JsonFileStore {
    fn load(&self) -> Option<SaveSnapshot> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read save");
                return None;
            }
        };
        let snapshot = SaveSnapshot::from_json(&text, self.max_wave);
        if snapshot.is_none() {
            tracing::warn!(path = %self.path.display(), "discarding unreadable save");
        }
        snapshot
    }

    fn save(&self, snapshot: &SaveSnapshot) -> bool {
        match std::fs::write(&self.path, snapshot.to_json()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to write save");
                false
            }
        }
    }

    fn clear(&self) -> bool {
        match std::fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clear save");
                false
            }
        }
    }
}

/// In-memory save slot. Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently held, if any.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    /// Replace the slot with raw JSON, as if another session had written it.
    pub fn set_contents(&self, json: impl Into<String>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(json.into());
        }
    }
}

impl PersistenceGateway for MemoryStore {
    fn load(&self) -> Option<SaveSnapshot> {
        self.contents()
            .and_then(|json| SaveSnapshot::from_json(&json, None))
    }

    fn save(&self, snapshot: &SaveSnapshot) -> bool {
        match self.slot.lock() {
            Ok(mut slot) => {
                *slot = Some(snapshot.to_json());
                true
            }
            Err(_) => {
                tracing::warn!("memory save slot poisoned");
                false
            }
        }
    }

    fn clear(&self) -> bool {
        match self.slot.lock() {
            Ok(mut slot) => {
                *slot = None;
                true
            }
            Err(_) => false,
        }
    }
}

/// Snapshot the persistent part of the game.
pub fn capture(ctx: &SimulationContext) -> SaveSnapshot {
    let towers = ctx
        .grid
        .cells()
        .iter()
        .filter_map(|cell| {
            let tower = ctx.store.tower(cell.tower?)?;
            Some(TowerSave {
                cell_id: cell.id,
                color: tower.color,
                level: tower.level,
            })
        })
        .collect();
    SaveSnapshot {
        version: SAVE_VERSION,
        lives: ctx.ledger.lives,
        energy: ctx.ledger.energy,
        wave: ctx.ledger.wave,
        score: ctx.ledger.score,
        best_score: ctx.ledger.best_score.max(ctx.ledger.score),
        towers,
    }
}

/// Save written once a run is over: no run to resume, only the best score.
pub fn capture_best_score(ctx: &SimulationContext) -> SaveSnapshot {
    SaveSnapshot {
        version: SAVE_VERSION,
        lives: 0,
        energy: 0,
        wave: 1,
        score: 0,
        best_score: ctx.ledger.best_score.max(ctx.ledger.score),
        towers: Vec::new(),
    }
}

/// Apply a loaded save to a freshly built context. The best score is always
/// taken; the run itself is ignored when it has no lives left. Towers on
/// unknown or already-occupied cells are skipped. Returns whether the run
/// was resumed.
pub fn restore(ctx: &mut SimulationContext, config: &GameConfig, save: &SaveSnapshot) -> bool {
    ctx.ledger.best_score = ctx.ledger.best_score.max(save.best_score).max(save.score);
    if save.lives == 0 {
        return false;
    }
    ctx.ledger.lives = save.lives;
    ctx.ledger.energy = save.energy;
    ctx.ledger.wave = save.wave.max(1);
    ctx.ledger.score = save.score;

    for entry in &save.towers {
        let Some(cell) = ctx.grid.cell(entry.cell_id) else {
            continue;
        };
        if cell.occupied() {
            continue;
        }
        let center = cell.center();
        let id = ctx
            .store
            .spawn_tower(entry.cell_id, center, entry.color, entry.level, config);
        ctx.grid.bind(entry.cell_id, id);
    }
    tracing::info!(
        wave = ctx.ledger.wave,
        towers = ctx.store.tower_ids().len(),
        "save restored"
    );
    true
}
