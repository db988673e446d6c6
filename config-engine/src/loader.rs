use crate::error::Result;
use crate::settings::DirectoryConfig;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use tracing::debug;

pub const ENV_PREFIX: &str = "DIRECTORY_";

/// Layers defaults, an optional YAML file, then `DIRECTORY_*` variables.
///
/// Nested keys use `__`, e.g. `DIRECTORY_DATABASE__URL`. A missing file is
/// not an error.
pub fn layered(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(DirectoryConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn load(path: Option<&Path>) -> Result<DirectoryConfig> {
    let config: DirectoryConfig = layered(path).extract()?;
    config.validate()?;
    debug!(backend = ?config.storage.backend, "Configuration loaded");
    Ok(config)
}
