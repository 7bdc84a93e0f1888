//! CHROMA DEFENSE headless driver.
//!
//! Wires the simulation engine to a fixed-timestep game loop thread, a
//! command channel, and an optional autopilot for unattended runs.

pub mod autoplay;
pub mod error;
pub mod game_loop;
pub mod state;

pub use chroma_core as core;
