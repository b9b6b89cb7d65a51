//! Agar.io-style cell simulation
//!
//! A deterministic fixed-timestep game field (players made of circular
//! cells that eat food and each other, split and merge) driven by a
//! background session scheduler with pause/resume/stop control.
//!
//! # Features
//!
//! - `records` - Ranked high-score table persisted as JSON (enabled by default)
//! - `parallel_physics` - Integrate player positions in parallel with rayon (enabled by default)

pub mod config;
pub mod util;
pub mod game;

// Feature-gated modules (enabled by default)
#[cfg(feature = "records")]
pub mod records;
