//! Runtime configuration
//!
//! Layered with figment, later layers winning:
//! - built-in defaults
//! - a TOML file (`combatd.toml` in the working directory, or `--config`)
//! - `COMBATD_*` environment variables

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Config file looked up when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "combatd.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "COMBATD_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Restore everyone to max HP when combat starts, unless the caller says otherwise
    pub reset_to_full_health: bool,
    /// Fixed seed for initiative rolls
    pub dice_seed: Option<u64>,
    /// Tracing filter used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_to_full_health: true,
            dice_seed: None,
            log_filter: "combatd=info".to_string(),
        }
    }
}

impl Config {
    /// Figment with every layer merged in
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}
