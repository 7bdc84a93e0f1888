//! Simulation engine for CHROMA DEFENSE.
//!
//! Owns the hecs world through the [`context::SimulationContext`], runs the
//! per-tick systems in a fixed order, and produces snapshots for a frontend.

pub mod bus;
pub mod collision;
pub mod context;
pub mod economy;
pub mod engine;
pub mod formation;
pub mod grid;
pub mod persistence;
pub mod store;
pub mod systems;
pub mod tank_schedule;
pub mod towers;
pub mod waves;
pub mod weapons;

pub use chroma_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
