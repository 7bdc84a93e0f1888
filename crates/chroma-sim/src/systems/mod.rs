//! Per-tick systems.
//!
//! Systems are free functions over the parts of the simulation they touch.
//! They hold no state of their own.

pub mod cleanup;
pub mod movement;
pub mod snapshot;
pub mod targeting;
