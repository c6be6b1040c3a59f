//! # Lander - evolving lunar-lander pilots
//!
//! A headless 2D lander simulation whose ships are flown by NEAT genomes
//! from `lander-neat`, plus the generational training loop around it.

pub mod collision;
pub mod config;
pub mod headless;
pub mod level;
pub mod pilot;
pub mod ship;

pub use config::LanderConfig;
pub use level::{Level, LevelConfig};
pub use ship::{Ship, ShipParams};

// Re-export the genome crate for convenience
pub use lander_neat as neat;
