//! The HTTP Read API's own slice of configuration (`app.routing.*`,
//! `app.cors_enabled`, `app.monitor_enabled`, `app.timezone`, and the
//! `caching.*` table). Built by the `realtime` binary from the top-level
//! config and handed in as a plain value — this crate never deserializes
//! YAML itself, it just consumes what the lifecycle assembled.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub service_alerts_endpoint: String,
    pub trip_updates_endpoint: String,
    pub vehicle_positions_endpoint: String,
    pub monitor_endpoint: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            service_alerts_endpoint: "/gtfs/realtime/service-alerts.pbf".to_owned(),
            trip_updates_endpoint: "/gtfs/realtime/trip-updates.pbf".to_owned(),
            vehicle_positions_endpoint: "/gtfs/realtime/vehicle-positions.pbf".to_owned(),
            monitor_endpoint: "/monitor".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CachingConfig {
    pub enabled: bool,
    pub service_alerts_ttl: Duration,
    pub trip_updates_ttl: Duration,
    pub vehicle_positions_ttl: Duration,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_alerts_ttl: Duration::from_secs(60),
            trip_updates_ttl: Duration::from_secs(30),
            vehicle_positions_ttl: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind: String,
    pub monitor_enabled: bool,
    pub cors_enabled: bool,
    pub timezone: chrono_tz::Tz,
    /// IETF language tag the stored `ServiceAlert` text is wrapped in when
    /// projected into a `TranslatedString` (`app.translation_language`).
    pub translation_language: String,
    pub routing: RoutingConfig,
    pub caching: CachingConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8030".to_owned(),
            monitor_enabled: true,
            cors_enabled: true,
            timezone: chrono_tz::Europe::Berlin,
            translation_language: "de-DE".to_owned(),
            routing: RoutingConfig::default(),
            caching: CachingConfig::default(),
        }
    }
}
