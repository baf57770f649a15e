use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{EnvOverrides, MapConfig};
use crate::errors::{AppError, AppResult};
use crate::services::{
    api_client::{DelayMapApi, HttpDelayMapApi},
    dashboard::Dashboard,
    poller::Poller,
};
use crate::tools::dhall::read_dhall_config;
use crate::tools::i18n::{Language, Translations};
use crate::tools::logger::LoggerConfig;
use crate::tools::prometheus::FleetMetrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logger_cfg: LoggerConfig,
    pub port: u16,
    /// Seconds between polls.
    pub polling_interval: u64,
    /// Seconds before a single backend request is abandoned.
    pub request_timeout: u64,
    pub default_language: String,
    pub map: MapConfig,
}

impl AppConfig {
    pub fn apply_overrides(&mut self, overrides: EnvOverrides) {
        if let Some(api_url) = overrides.api_url {
            self.map.api_url = api_url;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(polling_interval) = overrides.polling_interval {
            self.polling_interval = polling_interval;
        }
        if let Some(level) = overrides.log_level {
            self.logger_cfg.level = level;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.map.validate()?;
        self.language()?;
        if self.polling_interval == 0 {
            return Err(AppError::InvalidConfig(
                "polling_interval must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout == 0 {
            return Err(AppError::InvalidConfig(
                "request_timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn language(&self) -> AppResult<Language> {
        self.default_language.parse()
    }
}

/// Loads the config file (`.json` as JSON, anything else as Dhall), applies
/// environment overrides and validates the result.
pub fn read_config(config_path: &str) -> Result<AppConfig> {
    let mut config = if Path::new(config_path)
        .extension()
        .is_some_and(|ext| ext == "json")
    {
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path))?;
        serde_json::from_str::<AppConfig>(&raw)
            .with_context(|| format!("Failed to parse {}", config_path))?
    } else {
        read_dhall_config(config_path).map_err(|e| anyhow::anyhow!(e))?
    };

    config.apply_overrides(EnvOverrides::from_env()?);
    config.validate()?;
    Ok(config)
}

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    pub poller: Poller,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(app_config: AppConfig, metrics: FleetMetrics) -> AppResult<AppState> {
        let api = HttpDelayMapApi::new(
            app_config.map.api_base_url()?,
            Duration::from_secs(app_config.request_timeout),
        )?;
        info!("Polling DelayMap API at {}", app_config.map.api_url);
        Self::with_api(app_config, Arc::new(api), metrics)
    }

    pub fn with_api(
        app_config: AppConfig,
        api: Arc<dyn DelayMapApi>,
        metrics: FleetMetrics,
    ) -> AppResult<AppState> {
        let translations = Arc::new(Translations::load()?);
        let dashboard = Arc::new(RwLock::new(Dashboard::new(
            app_config.language()?,
            translations,
        )));
        let poller = Poller::new(
            api,
            dashboard.clone(),
            metrics,
            Duration::from_secs(app_config.polling_interval),
        );

        Ok(AppState {
            dashboard,
            poller,
            config: app_config,
        })
    }
}
