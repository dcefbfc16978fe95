//! ConfigLoader facade composing the config sources.

use super::sources;
use super::PartfsConfig;
use config::{Config, ConfigError};
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    /// Precedence: global file (lowest) -> explicit file -> environment (highest).
    pub fn load(file: Option<&Path>) -> Result<PartfsConfig, ConfigError> {
        let builder = sources::add_global_file(Config::builder())?;
        let builder = match file {
            Some(path) => sources::add_file(builder, path)?,
            None => builder,
        };
        let builder = sources::add_environment(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file only, without global or env sources.
    pub fn load_from_file(path: &Path) -> Result<PartfsConfig, ConfigError> {
        let builder = sources::add_file(Config::builder(), path)?;
        builder.build()?.try_deserialize()
    }
}
