//! Lander configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `lander.ron` in the working directory (if exists), or an explicit file
//! 3. Environment variables prefixed with `LANDER_`
//!
//! Example environment variable: `LANDER_TRAINING__GENERATIONS=200`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use lander_neat::MutationRates;
use serde::{Deserialize, Serialize};

use crate::headless::TrainingConfig;
use crate::level::LevelConfig;
use crate::ship::ShipParams;

/// Main lander configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LanderConfig {
    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub mutation: MutationRates,

    #[serde(default)]
    pub level: LevelConfig,

    #[serde(default)]
    pub ship: ShipParams,
}

impl LanderConfig {
    /// Load configuration from defaults, a RON file and the environment
    ///
    /// With `path` set the file must exist; otherwise `lander.ron` is read
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// `LANDER_` variables, `__` between nested keys
    fn environment() -> Environment {
        Environment::with_prefix("LANDER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("lander")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .add_source(
                Config::try_from(&LanderConfig::default())
                    .context("Failed to serialize default configuration")?,
            )
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (LANDER_TRAINING__SEED, etc.)
            .add_source(environment);

        let config = builder.build().context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config
            .mutation
            .validate()
            .context("Invalid mutation rates in configuration")?;
        Ok(config)
    }
}
