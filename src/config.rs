use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use time::Date;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Planner windows and the payday cycle.
#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    #[serde(default = "default_days_forward")]
    pub days_forward: u32,
    #[serde(default = "default_days_backward")]
    pub days_backward: u32,
    #[serde(default = "default_payday_anchor")]
    pub payday_anchor: String,
    #[serde(default = "default_payday_period_days")]
    pub payday_period_days: u32,
    #[serde(default = "default_takeout_window_days")]
    pub takeout_window_days: u32,
    #[serde(default = "default_rotation_window_days")]
    pub rotation_window_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            days_forward: default_days_forward(),
            days_backward: default_days_backward(),
            payday_anchor: default_payday_anchor(),
            payday_period_days: default_payday_period_days(),
            takeout_window_days: default_takeout_window_days(),
            rotation_window_days: default_rotation_window_days(),
        }
    }
}

impl PlannerConfig {
    pub fn anchor(&self) -> Result<Date, time::error::Parse> {
        mealdays_shared::parse_date(&self.payday_anchor)
    }
}

fn default_days_forward() -> u32 {
    9
}

fn default_days_backward() -> u32 {
    3
}

fn default_payday_anchor() -> String {
    "2025-09-18".to_string()
}

fn default_payday_period_days() -> u32 {
    14
}

fn default_takeout_window_days() -> u32 {
    7
}

fn default_rotation_window_days() -> u32 {
    3
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy variables (SERVICE_HOST, SERVICE_PORT, DATABASE_URL)
    /// 2. Environment variables (MEALDAYS__DATABASE__URL, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite:meals.db")?
            .set_default("database.max_connections", 5)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEALDAYS")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(host) = env::var("SERVICE_HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(port) = env::var("SERVICE_PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.planner.days_forward == 0 {
            return Err("Planner days_forward must be at least 1".to_string());
        }
        if self.planner.payday_period_days == 0 {
            return Err("Planner payday_period_days must be at least 1".to_string());
        }
        if let Err(err) = self.planner.anchor() {
            return Err(format!(
                "Planner payday_anchor {:?} is not a YYYY-MM-DD date: {err}",
                self.planner.payday_anchor
            ));
        }
        Ok(())
    }
}
