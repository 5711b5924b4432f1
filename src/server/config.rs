use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{debug, info};

use crate::map::{MapSettings, Viewport, DEFAULT_MAX_ZOOM};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;
pub const DEFAULT_GEOCODER_URL: &str = "https://us1.locationiq.com/v1";
pub const DEFAULT_DEPLOY_DOMAIN: &str = "repl.co";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "test" => Ok(Self::Development),
            other => Err(format!("unknown environment {other:?}")),
        }
    }
}

/// Deployment coordinates on the managed host, only used for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub slug: String,
    pub owner: String,
    pub domain: String,
}

impl Deployment {
    pub fn display_url(&self) -> String {
        format!("https://{}.{}.{}", self.slug, self.owner, self.domain)
    }
}

/// Process configuration, read once at startup and never mutated
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub maps_api_key: Option<String>,
    pub geocoder_url: String,
    /// Running behind the managed host's TLS-terminating proxy
    pub managed_host: bool,
    pub deployment: Option<Deployment>,
    pub static_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub body_limit: usize,
    pub max_map_zoom: u8,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let deployment = match (var("DEPLOY_SLUG"), var("DEPLOY_OWNER")) {
            (Some(slug), Some(owner)) => Some(Deployment {
                slug,
                owner,
                domain: var("DEPLOY_DOMAIN").unwrap_or_else(|| DEFAULT_DEPLOY_DOMAIN.to_string()),
            }),
            _ => None,
        };

        let config = Self {
            port: try_load(&var, "PORT", DEFAULT_PORT)?,
            environment: try_load(&var, "APP_ENV", Environment::Development)?,
            maps_api_key: var("MAPS_API_KEY"),
            geocoder_url: var("GEOCODER_URL").unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string()),
            managed_host: load_flag(&var, "MANAGED_HOST")?,
            deployment,
            static_dir: var("STATIC_DIR").map_or_else(|| PathBuf::from("dist/public"), PathBuf::from),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
            body_limit: try_load(&var, "BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT)?,
            max_map_zoom: try_load(&var, "MAX_MAP_ZOOM", DEFAULT_MAX_ZOOM)?,
        };

        info!(
            "Config loaded: port={}, environment={:?}, managed_host={}, maps={}",
            config.port,
            config.environment,
            config.managed_host,
            if config.maps_api_key.is_some() { "configured" } else { "missing key" },
        );
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            api_key: self.maps_api_key.clone(),
            geocoder_url: self.geocoder_url.clone(),
            max_zoom: self.max_map_zoom,
            viewport: Viewport::default(),
        }
    }
}

fn try_load<T>(var: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(value) = var(key) else {
        debug!("{key} not set, using default: {default}");
        return Ok(default);
    };

    value.parse().map_err(|error: T::Err| ConfigError::Invalid {
        key,
        value,
        reason: error.to_string(),
    })
}

fn load_flag(var: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = var(key) else {
        return Ok(false);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a boolean flag".to_string(),
        }),
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}
