//! Headless training environment for lander evolution
//!
//! This module provides infrastructure for evolving pilots offline without GUI:
//! - Episodes that fly one genome over one level
//! - Fitness functions to score a flight
//! - A generational training loop with elitism

mod episode;
mod fitness;
mod training_env;

pub use episode::{Contact, Episode, EpisodeEnd, EpisodeLimits, check_contact, run_episode};
pub use fitness::{FitnessFunction, LandingFitness, SurvivalFitness, fitness_by_name};
pub use training_env::{Champion, TrainingConfig, TrainingEnv, TrainingStats};
