//! Subscribes to the configured topic list and, for each message,
//! decodes it, maps its IDs, matches it against the nominal index, and
//! enqueues the outcome. Each message runs a fresh matching pass seeded
//! with the current Nominal Index snapshot and the matching
//! subscription's mapping; there is no shared mutable matcher state to
//! contend on.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use public_transport::{
    matcher::{match_service_alert, match_trip_update, match_vehicle_position, MatchingPolicy},
    nominal_index::NominalIndex,
    queue::WriteQueueHandle,
};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};

use crate::{config::MqttConfig, subscription::{EntityType, Subscription}};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("mqtt connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
    #[error("mqtt subscribe error: {0}")]
    Subscribe(#[from] rumqttc::ClientError),
}

/// Builds the client and its subscriptions but does not yet poll the
/// event loop — callers decide how it's driven (e.g. `tokio::spawn`).
pub async fn connect(
    config: &MqttConfig,
    subscriptions: &[Subscription],
) -> Result<(AsyncClient, rumqttc::EventLoop), IntakeError> {
    let mut options = MqttOptions::new(config.client.clone(), config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keepalive));
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username.clone(), password.clone());
    }

    let (client, eventloop) = AsyncClient::new(options, 64);
    for subscription in subscriptions {
        client.subscribe(&subscription.topic, QoS::AtMostOnce).await?;
    }
    Ok((client, eventloop))
}

/// Drives the event loop until the connection closes for good, dispatching
/// every incoming publish to the matcher. Transient connection errors are
/// logged and retried by `eventloop.poll()`'s own reconnect behavior;
/// nothing here needs its own backoff loop.
pub async fn run(
    mut eventloop: rumqttc::EventLoop,
    subscriptions: Vec<Subscription>,
    nominal_index: Arc<ArcSwap<NominalIndex>>,
    queues: WriteQueueHandle,
    policy: MatchingPolicy,
    freshness_max_age_seconds: i64,
    translation_language: String,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                dispatch(
                    &publish.topic,
                    &publish.payload,
                    &subscriptions,
                    &nominal_index,
                    &queues,
                    policy,
                    freshness_max_age_seconds,
                    &translation_language,
                );
            }
            Ok(_) => {}
            Err(why) => {
                tracing::warn!(error = %why, "mqtt event loop error, reconnecting");
            }
        }
    }
}

fn dispatch(
    topic: &str,
    payload: &[u8],
    subscriptions: &[Subscription],
    nominal_index: &Arc<ArcSwap<NominalIndex>>,
    queues: &WriteQueueHandle,
    policy: MatchingPolicy,
    freshness_max_age_seconds: i64,
    translation_language: &str,
) {
    let Some(subscription) = Subscription::find_matching(subscriptions, topic) else {
        tracing::debug!(topic, "no subscription matches this topic, dropping message");
        return;
    };

    let message = match gtfs::realtime::decode(payload) {
        Ok(message) => message,
        Err(why) => {
            tracing::info!(topic, error = %why, "dropping malformed feed message");
            return;
        }
    };

    let now_unix = chrono::Utc::now().timestamp();
    if let Err(why) = gtfs::realtime::check_freshness(&message, now_unix, freshness_max_age_seconds) {
        tracing::warn!(topic, error = %why, "dropping stale feed message");
        return;
    }

    let index = nominal_index.load();

    for entity in &message.entity {
        match subscription.entity_type {
            EntityType::TripUpdates => {
                if let Some(outcome) =
                    match_trip_update(entity, &subscription.mapping, &index, policy, now_unix)
                {
                    queues.enqueue_trip_update(outcome);
                }
            }
            EntityType::ServiceAlerts => {
                if let Some(outcome) = match_service_alert(
                    entity,
                    &subscription.mapping,
                    &index,
                    translation_language,
                    now_unix,
                ) {
                    queues.enqueue_service_alert(outcome);
                }
            }
            EntityType::VehiclePositions => {
                if let Some(outcome) = match_vehicle_position(entity, &subscription.mapping, now_unix) {
                    queues.enqueue_vehicle_position(outcome);
                }
            }
        }
    }
}
