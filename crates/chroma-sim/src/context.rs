//! SimulationContext: everything the per-tick systems mutate, in one place.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use chroma_core::config::GameConfig;
use chroma_core::enums::GamePhase;
use chroma_core::types::Bounds;

use crate::bus::EventBus;
use crate::economy::EconomyLedger;
use crate::grid::TowerGrid;
use crate::store::EntityStore;
use crate::towers::ModeState;
use crate::waves::WaveScheduler;

pub struct SimulationContext {
    pub store: EntityStore,
    pub grid: TowerGrid,
    pub ledger: EconomyLedger,
    pub waves: WaveScheduler,
    pub modes: ModeState,
    pub bus: EventBus,
    pub rng: ChaCha8Rng,
    pub phase: GamePhase,
    pub bounds: Bounds,
}

impl SimulationContext {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let grid = TowerGrid::new(&config.world.grid);
        let bounds = grid.world_bounds(config);
        Self {
            store: EntityStore::new(),
            grid,
            ledger: EconomyLedger::new(config),
            waves: WaveScheduler::default(),
            modes: ModeState::default(),
            bus: EventBus::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: GamePhase::Build,
            bounds,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver(_))
    }

    pub fn wave_in_progress(&self) -> bool {
        self.waves.in_progress()
    }

    /// Start a fresh run. Best score, id counters, and the RNG stream carry over.
    pub fn reset(&mut self, config: &GameConfig) {
        let best_score = self.ledger.best_score.max(self.ledger.score);
        self.store.clear();
        self.grid.clear();
        self.ledger = EconomyLedger::new(config);
        self.ledger.best_score = best_score;
        self.waves.finish();
        self.modes.reset();
        self.phase = GamePhase::Build;
    }
}
