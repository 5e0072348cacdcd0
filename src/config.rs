use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_content_length: usize,
}

impl Config {
    /// Load configuration from `config.toml` (if present) and `LITEBIN_*`
    /// environment variables, on top of the built-in defaults.
    pub fn load() -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("port", 8080)?
            .set_default("database_url", "sqlite://pastes.db?mode=rwc")?
            .set_default("max_content_length", 1024 * 1024)?
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(config::Environment::with_prefix("LITEBIN"))
            .build()
            .context("failed to read config")?
            .try_deserialize()
            .context("failed to deserialize config")
    }
}
