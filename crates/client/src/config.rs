//! Client configuration.

use std::time::Duration;

use thiserror::Error;

use labstock_inventory::{InventoryKind, PageRequest};
use labstock_observability::{LogConfig, LogFormat};

use crate::discovery::BrowserPrintAdapter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is appended to.
    pub api_url: String,
    /// Bearer token issued at login, if the session has one.
    pub auth_token: Option<String>,
    pub kind: InventoryKind,
    pub page_size: u32,
    /// Quiescence required before typed search input is fetched.
    pub debounce_ms: u64,
    pub print_service_url: String,
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            auth_token: None,
            kind: InventoryKind::default(),
            page_size: PageRequest::DEFAULT_SIZE,
            debounce_ms: 500,
            print_service_url: BrowserPrintAdapter::DEFAULT_URL.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Read `LABSTOCK_*` variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("LABSTOCK_API_URL") {
            config.api_url = url;
        }
        config.auth_token = lookup("LABSTOCK_AUTH_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(kind) = lookup("LABSTOCK_KIND") {
            config.kind = kind.parse().map_err(|e: labstock_core::DomainError| {
                ConfigError::Invalid {
                    var: "LABSTOCK_KIND",
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(size) = lookup("LABSTOCK_PAGE_SIZE") {
            config.page_size = parse_number("LABSTOCK_PAGE_SIZE", &size)?;
            if config.page_size == 0 {
                return Err(ConfigError::Invalid {
                    var: "LABSTOCK_PAGE_SIZE",
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if let Some(ms) = lookup("LABSTOCK_DEBOUNCE_MS") {
            config.debounce_ms = parse_number("LABSTOCK_DEBOUNCE_MS", &ms)?;
        }
        if let Some(url) = lookup("LABSTOCK_PRINT_SERVICE_URL") {
            config.print_service_url = url;
        }
        if let Some(format) = lookup("LABSTOCK_LOG_FORMAT") {
            config.log.format = format
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "LABSTOCK_LOG_FORMAT",
                    reason,
                })?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
