//! Core types and definitions for the CHROMA DEFENSE simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, components, configuration, commands, events, render snapshots,
//! the save schema, and error types. It contains no simulation logic.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod save;
pub mod state;
pub mod types;
