//! Top-level YAML configuration: one `#[serde(default)]` section per
//! component, merged over in-code defaults. The merge falls naturally out
//! of `serde`'s per-field `#[serde(default)]` rather than a hand-written
//! recursive merge.

use std::path::Path;

use public_transport::matcher::MatchingPolicy;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingSection {
    pub service_alerts_endpoint: String,
    pub trip_updates_endpoint: String,
    pub vehicle_positions_endpoint: String,
    pub monitor_endpoint: String,
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            service_alerts_endpoint: "/gtfs/realtime/service-alerts.pbf".to_owned(),
            trip_updates_endpoint: "/gtfs/realtime/trip-updates.pbf".to_owned(),
            vehicle_positions_endpoint: "/gtfs/realtime/vehicle-positions.pbf".to_owned(),
            monitor_endpoint: "/monitor".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub caching_enabled: bool,
    pub monitor_enabled: bool,
    pub cors_enabled: bool,
    pub mqtt_enabled: bool,
    pub data_review_seconds: i64,
    pub timezone: String,
    pub translation_language: String,
    pub routing: RoutingSection,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            caching_enabled: false,
            monitor_enabled: true,
            cors_enabled: true,
            mqtt_enabled: true,
            data_review_seconds: 7200,
            timezone: "Europe/Berlin".to_owned(),
            translation_language: "de-DE".to_owned(),
            routing: RoutingSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CachingSection {
    pub caching_server_endpoint: Option<String>,
    pub caching_service_alerts_ttl_seconds: u64,
    pub caching_trip_updates_ttl_seconds: u64,
    pub caching_vehicle_positions_ttl_seconds: u64,
}

impl Default for CachingSection {
    fn default() -> Self {
        Self {
            caching_server_endpoint: None,
            caching_service_alerts_ttl_seconds: 60,
            caching_trip_updates_ttl_seconds: 30,
            caching_vehicle_positions_ttl_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppSection,
    pub caching: CachingSection,
    pub matching: MatchingPolicy,
    pub mqtt: Option<mqtt::config::MqttConfig>,
}

impl Config {
    /// Loads and merges a YAML config file over the in-code defaults, or
    /// returns the defaults untouched if `path` is `None`. Every key has a
    /// default, so a config file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_config_file() {
        let config = Config::load(None).expect("defaults always load");
        assert!(config.app.mqtt_enabled);
        assert!(!config.app.caching_enabled);
        assert_eq!(config.caching.caching_trip_updates_ttl_seconds, 30);
        assert!(config.matching.match_against_first_stop_id);
    }

    #[test]
    fn partial_yaml_merges_over_defaults() {
        let yaml = "app:\n  caching_enabled: true\n  timezone: \"Europe/Paris\"\n";
        let config: Config = serde_yaml::from_str(yaml).expect("parses");
        assert!(config.app.caching_enabled);
        assert_eq!(config.app.timezone, "Europe/Paris");
        // Untouched keys keep their defaults.
        assert!(config.app.monitor_enabled);
        assert_eq!(
            config.app.routing.trip_updates_endpoint,
            "/gtfs/realtime/trip-updates.pbf"
        );
    }
}
