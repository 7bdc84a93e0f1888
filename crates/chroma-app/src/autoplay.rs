//! A simple build-phase policy for unattended runs.
//!
//! Between waves the autopilot merges whatever can be merged, fills empty
//! cells while energy allows, then starts the next wave. It never acts
//! during a wave.

use chroma_core::commands::PlayerCommand;
use chroma_core::enums::{GamePhase, TowerColor};
use chroma_core::state::GameStateSnapshot;

#[derive(Debug, Clone)]
pub struct Autopilot {
    tower_cost: u32,
    next_color: TowerColor,
}

impl Autopilot {
    pub fn new(tower_cost: u32) -> Self {
        Self {
            tower_cost,
            next_color: TowerColor::Red,
        }
    }

    /// Commands to queue for the next tick, given the last snapshot.
    pub fn decide(&mut self, snapshot: &GameStateSnapshot) -> Vec<PlayerCommand> {
        if snapshot.phase != GamePhase::Build {
            return Vec::new();
        }

        let mut commands = Vec::new();
        if !snapshot.merge_hints.is_empty() {
            commands.push(PlayerCommand::MergeAll);
        }

        let mut energy = snapshot.economy.energy;
        for cell in snapshot.cells.iter().filter(|c| c.tower.is_none()) {
            if energy < self.tower_cost {
                break;
            }
            energy -= self.tower_cost;
            commands.push(PlayerCommand::PlaceTower {
                cell: cell.id,
                color: self.next_color,
            });
            self.next_color = self.next_color.flipped();
        }

        commands.push(PlayerCommand::StartWave);
        tracing::debug!(
            wave = snapshot.wave.number,
            commands = commands.len(),
            "autopilot build turn"
        );
        commands
    }
}
