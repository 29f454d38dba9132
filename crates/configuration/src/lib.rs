use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, DcfSettings, IndicatorSettings, LoggingSettings, MarketSettings, OutputSettings,
};

/// The file read when no explicit path is given. It is optional.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `FINSCOPE_DCF__TAX_RATE=0.25`.
pub const ENV_PREFIX: &str = "FINSCOPE";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file, then
/// `FINSCOPE_*` environment variables. An explicitly requested file must exist;
/// the default `config.toml` may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}
