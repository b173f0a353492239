//! Handles settings for the application. Configuration is written in
//! `settings.toml`, every section optional; the `SPENDBOOK_` environment
//! prefix overrides file values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Database {
    /// Path of the sqlite file; `None` means an in-memory database.
    pub path: Option<String>,
}

impl Database {
    pub fn url(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{path}?mode=rwc"),
            None => "sqlite::memory:".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPENDBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
