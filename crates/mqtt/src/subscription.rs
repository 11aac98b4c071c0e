//! Subscription configuration (`mqtt.subscriptions[]`): topic filter,
//! entity type, and an optional per-subscription ID mapping.

use gtfs::mapping::{parse_mapping_pairs, IdMapping, MappingParseError};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EntityType {
    #[serde(rename = "gtfsrt-service-alerts")]
    ServiceAlerts,
    #[serde(rename = "gtfsrt-trip-updates")]
    TripUpdates,
    #[serde(rename = "gtfsrt-vehicle-positions")]
    VehiclePositions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    pub topic: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub mapping: Option<RawMapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMapping {
    #[serde(default)]
    pub routes: Option<String>,
    #[serde(default)]
    pub stops: Option<String>,
}

pub struct Subscription {
    pub topic: String,
    pub entity_type: EntityType,
    pub mapping: IdMapping,
}

impl Subscription {
    pub fn from_config(config: SubscriptionConfig) -> Result<Self, MappingParseError> {
        let mut mapping = IdMapping::default();
        if let Some(raw) = config.mapping {
            if let Some(routes) = raw.routes {
                mapping.routes = parse_mapping_pairs(&routes)?;
            }
            if let Some(stops) = raw.stops {
                mapping.stops = parse_mapping_pairs(&stops)?;
            }
        }
        Ok(Subscription {
            topic: config.topic,
            entity_type: config.entity_type,
            mapping,
        })
    }

    /// The first subscription whose topic filter matches `topic` provides
    /// its type and mapping.
    pub fn find_matching<'a>(
        subscriptions: &'a [Subscription],
        topic: &str,
    ) -> Option<&'a Subscription> {
        subscriptions
            .iter()
            .find(|subscription| crate::topic::topic_matches(&subscription.topic, topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_subscription_wins() {
        let subscriptions = vec![
            Subscription {
                topic: "gtfsrt/+/alerts".to_owned(),
                entity_type: EntityType::ServiceAlerts,
                mapping: IdMapping::default(),
            },
            Subscription {
                topic: "gtfsrt/#".to_owned(),
                entity_type: EntityType::TripUpdates,
                mapping: IdMapping::default(),
            },
        ];
        let matched = Subscription::find_matching(&subscriptions, "gtfsrt/agency1/alerts").unwrap();
        assert_eq!(matched.entity_type, EntityType::ServiceAlerts);
    }

    #[test]
    fn no_subscription_matches_an_unrelated_topic() {
        let subscriptions = vec![Subscription {
            topic: "gtfsrt/alerts".to_owned(),
            entity_type: EntityType::ServiceAlerts,
            mapping: IdMapping::default(),
        }];
        assert!(Subscription::find_matching(&subscriptions, "other/topic").is_none());
    }
}
