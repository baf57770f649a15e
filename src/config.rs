use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{AppError, AppResult};
use crate::models::LatLong;

const OPENRAILWAYMAP_TILES: &str = "http://{s}.tiles.openrailwaymap.org/standard/{z}/{x}/{y}.png";

/// The map settings every deployment must provide. A config missing any of
/// these keys does not load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(rename = "API_URL")]
    pub api_url: String,
    #[serde(rename = "DEFAULT_CENTER_X")]
    pub default_center_x: f64,
    #[serde(rename = "DEFAULT_CENTER_Y")]
    pub default_center_y: f64,
    #[serde(rename = "DEFAULT_ZOOM")]
    pub default_zoom: u8,
    #[serde(rename = "MT_KEY")]
    pub mt_key: String,
}

/// What the browser gets to see of `MapConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicMapConfig {
    pub center: LatLong,
    pub zoom: u8,
    pub tile_url: String,
    pub railway_tile_url: &'static str,
}

impl MapConfig {
    pub fn api_base_url(&self) -> AppResult<Url> {
        Url::parse(&self.api_url)
            .map_err(|e| AppError::InvalidConfig(format!("API_URL {:?}: {}", self.api_url, e)))
    }

    pub fn validate(&self) -> AppResult<()> {
        self.api_base_url()?;
        if self.mt_key.trim().is_empty() {
            return Err(AppError::InvalidConfig("MT_KEY is empty".to_string()));
        }
        if !(-90.0..=90.0).contains(&self.default_center_x) {
            return Err(AppError::InvalidConfig(format!(
                "DEFAULT_CENTER_X {} is not a latitude",
                self.default_center_x
            )));
        }
        if !(-180.0..=180.0).contains(&self.default_center_y) {
            return Err(AppError::InvalidConfig(format!(
                "DEFAULT_CENTER_Y {} is not a longitude",
                self.default_center_y
            )));
        }
        Ok(())
    }

    pub fn public_view(&self) -> PublicMapConfig {
        PublicMapConfig {
            center: LatLong {
                lat: self.default_center_x,
                lon: self.default_center_y,
            },
            zoom: self.default_zoom,
            tile_url: format!(
                "https://api.maptiler.com/maps/basic/{{z}}/{{x}}/{{y}}.png?key={}",
                self.mt_key
            ),
            railway_tile_url: OPENRAILWAYMAP_TILES,
        }
    }
}

/// Deployment overrides read from the environment on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub port: Option<u16>,
    pub polling_interval: Option<u64>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: env::var("DELAYMAP_API_URL").ok(),
            port: env::var("DELAYMAP_PORT")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Failed to parse DELAYMAP_PORT")?,
            polling_interval: env::var("DELAYMAP_POLLING_INTERVAL")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Failed to parse DELAYMAP_POLLING_INTERVAL")?,
            log_level: env::var("DELAYMAP_LOG_LEVEL").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_config() -> MapConfig {
        MapConfig {
            api_url: "https://api.delaymap.example".to_string(),
            default_center_x: 50.85,
            default_center_y: 4.35,
            default_zoom: 8,
            mt_key: "abc123".to_string(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(map_config().validate().is_ok());
    }

    #[test]
    fn rejects_bad_api_url_and_empty_key() {
        let mut config = map_config();
        config.api_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        let mut config = map_config();
        config.mt_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_center() {
        let mut config = map_config();
        config.default_center_x = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_key_fails_to_decode() {
        let json = r#"{"API_URL": "https://x", "DEFAULT_CENTER_X": 50.0,
            "DEFAULT_CENTER_Y": 4.0, "DEFAULT_ZOOM": 8}"#;
        let err = serde_json::from_str::<MapConfig>(json).unwrap_err();
        assert!(err.to_string().contains("MT_KEY"));
    }

    #[test]
    fn public_view_builds_tile_url() {
        let public = map_config().public_view();
        assert_eq!(public.center, LatLong { lat: 50.85, lon: 4.35 });
        assert_eq!(
            public.tile_url,
            "https://api.maptiler.com/maps/basic/{z}/{x}/{y}.png?key=abc123"
        );
    }
}
