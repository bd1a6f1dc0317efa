//! Prometheus metrics.

use crate::{Error, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// The `[metrics]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether the exporter is installed.
    pub enabled: bool,
    /// Port of the scrape listener.
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

impl MetricsConfig {
    /// Applies `TABLEGRID_METRICS_ENABLED` and `TABLEGRID_METRICS_PORT`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(enabled) = parse_bool_env("TABLEGRID_METRICS_ENABLED") {
            self.enabled = enabled;
        }
        if let Some(port) = std::env::var("TABLEGRID_METRICS_PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.port = port;
        }
        self
    }

    /// Scrape listener address.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}

/// Installs the Prometheus recorder and its scrape listener.
///
/// Returns `false` when metrics are disabled; the `metrics` macros are then
/// no-ops. Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if a recorder is already installed or
/// the listener cannot bind.
pub fn install_prometheus(config: &MetricsConfig) -> Result<bool> {
    if !config.enabled {
        return Ok(false);
    }

    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr())
        .install()
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_recorder_install".to_string(),
            cause: e.to_string(),
        })?;

    tracing::info!(addr = %config.listen_addr(), "Prometheus exporter enabled");
    Ok(true)
}

fn parse_bool_env(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_installs_nothing() {
        assert!(!install_prometheus(&MetricsConfig::default()).unwrap());
    }

    #[test]
    fn test_listen_addr_uses_port() {
        let config = MetricsConfig {
            enabled: true,
            port: 9464,
        };
        assert_eq!(config.listen_addr().port(), 9464);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: MetricsConfig = toml::from_str("enabled = true").unwrap();
        assert!(config.enabled);
        assert_eq!(config.port, 9090);
    }
}
