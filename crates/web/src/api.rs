//! Serves the three feed endpoints plus the optional monitor view, each
//! content-negotiated by the `f` query parameter (`pbf` default, `json`
//! explicit; `monitor` additionally defaults to an HTML table). Built with
//! `axum` and `tower_http::trace::TraceLayer`, fronted by
//! `tower_http::cors::CorsLayer` when `app.cors_enabled`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use database::StoreReader;
use prost::Message;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::ResponseCache;
use crate::config::WebConfig;
use crate::feed;

#[derive(Clone)]
pub struct WebState {
    pub reader: Arc<Mutex<StoreReader>>,
    pub config: Arc<WebConfig>,
    pub cache: Option<Arc<ResponseCache>>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    f: Option<String>,
}

impl FormatQuery {
    fn format(&self, default: &str) -> String {
        self.f.clone().unwrap_or_else(|| default.to_owned())
    }
}

const PBF_CONTENT_TYPE: &str = "application/octet-stream";
const JSON_CONTENT_TYPE: &str = "application/json";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub fn router(state: WebState) -> Router {
    let mut router = Router::new()
        .route(&state.config.routing.service_alerts_endpoint, get(service_alerts))
        .route(&state.config.routing.trip_updates_endpoint, get(trip_updates))
        .route(&state.config.routing.vehicle_positions_endpoint, get(vehicle_positions));

    if state.config.monitor_enabled {
        router = router.route(&state.config.routing.monitor_endpoint, get(monitor));
    }

    if state.config.cors_enabled {
        // `*` origins, `GET` only, when `app.cors_enabled` is set.
        router = router.layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET]),
        );
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Looks up `key` in the cache if enabled; on miss, calls `compute` and
/// stores the result before returning it. `compute` is only invoked on a
/// cache miss or when caching is disabled.
fn cached_response(
    state: &WebState,
    key: String,
    ttl: Duration,
    content_type: &'static str,
    compute: impl FnOnce() -> Result<Vec<u8>, StatusCode>,
) -> Response {
    if let Some(cache) = &state.cache {
        if let Some((body, content_type)) = cache.get(&key, ttl) {
            return ([(header::CONTENT_TYPE, content_type)], body).into_response();
        }
        return match compute() {
            Ok(body) => {
                cache.put(key, body.clone(), content_type);
                ([(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            Err(status) => status.into_response(),
        };
    }

    match compute() {
        Ok(body) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn trip_updates(State(state): State<WebState>, Query(query): Query<FormatQuery>) -> Response {
    let format = query.format("pbf");
    let key = format!("{}-{format}", state.config.routing.trip_updates_endpoint);
    let ttl = state.config.caching.trip_updates_ttl;

    cached_response(&state, key, ttl, content_type_for(&format), || {
        let timestamp = now_unix();
        let updates = state
            .reader
            .lock()
            .unwrap()
            .fetch_all_trip_updates()
            .map_err(|why| {
                tracing::error!(error = %why, "failed to fetch trip updates");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        if format == "json" {
            let body = feed::trip_updates_json(updates, timestamp);
            serde_json::to_vec(&body).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            let entities = feed::trip_update_entities(&updates);
            Ok(feed::feed_message(entities, timestamp).encode_to_vec())
        }
    })
}

async fn vehicle_positions(State(state): State<WebState>, Query(query): Query<FormatQuery>) -> Response {
    let format = query.format("pbf");
    let key = format!("{}-{format}", state.config.routing.vehicle_positions_endpoint);
    let ttl = state.config.caching.vehicle_positions_ttl;

    cached_response(&state, key, ttl, content_type_for(&format), || {
        let timestamp = now_unix();
        let positions = state
            .reader
            .lock()
            .unwrap()
            .fetch_all_vehicle_positions()
            .map_err(|why| {
                tracing::error!(error = %why, "failed to fetch vehicle positions");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        if format == "json" {
            let body = feed::vehicle_positions_json(positions, timestamp);
            serde_json::to_vec(&body).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            let entities = feed::vehicle_position_entities(&positions);
            Ok(feed::feed_message(entities, timestamp).encode_to_vec())
        }
    })
}

async fn service_alerts(State(state): State<WebState>, Query(query): Query<FormatQuery>) -> Response {
    let format = query.format("pbf");
    let key = format!("{}-{format}", state.config.routing.service_alerts_endpoint);
    let ttl = state.config.caching.service_alerts_ttl;
    let language = state.config.translation_language.as_str();

    cached_response(&state, key, ttl, content_type_for(&format), || {
        let timestamp = now_unix();
        let alerts = state
            .reader
            .lock()
            .unwrap()
            .fetch_all_service_alerts()
            .map_err(|why| {
                tracing::error!(error = %why, "failed to fetch service alerts");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        if format == "json" {
            let body = feed::service_alerts_json(alerts, timestamp);
            serde_json::to_vec(&body).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            let entities = feed::service_alert_entities(&alerts, language);
            Ok(feed::feed_message(entities, timestamp).encode_to_vec())
        }
    })
}

fn content_type_for(format: &str) -> &'static str {
    if format == "json" {
        JSON_CONTENT_TYPE
    } else {
        PBF_CONTENT_TYPE
    }
}

/// `GET /monitor`: HTML by default, JSON with `?f=json`. Not
/// cached — it is intended as an operator diagnostics view, not a feed
/// consumed at scale, and its rows already reflect the latest flush tick
/// via the reader connection's live read.
async fn monitor(State(state): State<WebState>, Query(query): Query<FormatQuery>) -> Response {
    let format = query.format("html");
    let operation_day = chrono::Utc::now().with_timezone(&state.config.timezone).date_naive();

    let rows = {
        let reader = state.reader.lock().unwrap();
        let calendar = match reader.fetch_calendar() {
            Ok(calendar) => calendar,
            Err(why) => {
                tracing::error!(error = %why, "failed to fetch calendar for monitor");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        let calendar_dates = match reader.fetch_calendar_dates() {
            Ok(calendar_dates) => calendar_dates,
            Err(why) => {
                tracing::error!(error = %why, "failed to fetch calendar dates for monitor");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        let service_ids =
            public_transport::nominal_index::active_service_ids(operation_day, &calendar, &calendar_dates);

        match reader.fetch_monitor_trips(operation_day, &service_ids) {
            Ok(rows) => rows,
            Err(why) => {
                tracing::error!(error = %why, "failed to fetch monitor trips");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    };

    let rows: Vec<feed::MonitorRowJson> = rows.into_iter().map(Into::into).collect();

    if format == "json" {
        match serde_json::to_vec(&MonitorResponse { trips: &rows }) {
            Ok(body) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    } else {
        let html = feed::monitor_html(&rows);
        ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response()
    }
}

#[derive(Serialize)]
struct MonitorResponse<'a> {
    trips: &'a [feed::MonitorRowJson],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> WebState {
        WebState {
            reader: Arc::new(Mutex::new(StoreReader::open_in_memory().expect("open reader"))),
            config: Arc::new(WebConfig::default()),
            cache: None,
        }
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec()
    }

    #[tokio::test]
    async fn trip_updates_defaults_to_pbf() {
        let state = empty_state();
        let response = trip_updates(State(state), Query(FormatQuery { f: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PBF_CONTENT_TYPE
        );

        let bytes = body_bytes(response).await;
        let message = gtfs::realtime::proto::FeedMessage::decode(bytes.as_slice()).expect("decode");
        assert!(message.entity.is_empty());
    }

    #[tokio::test]
    async fn trip_updates_json_format_is_empty_array_on_empty_store() {
        let state = empty_state();
        let response = trip_updates(
            State(state),
            Query(FormatQuery {
                f: Some("json".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );

        let bytes = body_bytes(response).await;
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(body["entity"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn vehicle_positions_handler_returns_pbf_by_default() {
        let state = empty_state();
        let response = vehicle_positions(State(state), Query(FormatQuery { f: None })).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PBF_CONTENT_TYPE
        );
    }

    #[tokio::test]
    async fn monitor_defaults_to_html_table() {
        let state = empty_state();
        let response = monitor(State(state), Query(FormatQuery { f: None })).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            HTML_CONTENT_TYPE
        );

        let bytes = body_bytes(response).await;
        let html = String::from_utf8(bytes).expect("utf8");
        assert!(html.contains("<table"));
    }

    #[test]
    fn router_builds_without_panicking() {
        let _ = router(empty_state());
    }
}
