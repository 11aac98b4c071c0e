//! `mqtt.*` config keys: pub/sub connection plus the subscription list,
//! deserialized as a section of the binary's top-level config.

use serde::Deserialize;

use crate::subscription::SubscriptionConfig;

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "gtfs-realtime-reconciler".to_owned()
}

fn default_keepalive_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client: String,
    #[serde(default = "default_keepalive_seconds")]
    pub keepalive: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionConfig>,
}
