mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, Environment, File};

use crate::utils::Result;

pub use settings::{BrokerSettings, LogSettings, ServerSettings, Settings};

/// Default location of the optional settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Prefix for environment overrides, e.g. `FANHUB_BROKER__CHANNEL=events`.
pub const ENV_PREFIX: &str = "FANHUB";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> Result<Settings> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Loads the configuration from `path` (any format `config` understands,
/// extension optional) layered under environment variables, then fills
/// whatever is still missing from `Settings::default()`.
pub fn load_config_from(path: &str) -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;
