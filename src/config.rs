use serde::{Deserialize, Serialize};
use std::env;

/// Game policy constants. Defaults are the classic table rules: 3 to 12
/// players, a single impostor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub impostor_count: usize,
    /// Pause between the final ballot and the results reveal, so the table
    /// sees the last vote land.
    pub resolve_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 12,
            impostor_count: 1,
            resolve_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = env::var("RUN_ENV").unwrap_or_else(|_| "local".into());

        let builder = ::config::Config::builder()
            .add_source(config::File::with_name("config/default.toml"))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::File::with_name("config/local.toml").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}
