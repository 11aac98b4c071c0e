use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{RouteId, ServiceId, StopId, TripId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    pub trip_headsign: Option<String>,
    pub direction_id: Option<bool>,
}

/// One stop visit within a `Trip`'s nominal sequence. `stop_sequence` is
/// 1-based and dense within a trip; `(trip_id, stop_sequence)` is unique.
/// `departure_time`/`arrival_time` are offsets from service-day midnight
/// and may legitimately exceed 24h for trips that run past it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTime {
    pub trip_id: TripId,
    pub stop_sequence: u32,
    pub stop_id: StopId,
    #[serde(with = "utility::serde::duration")]
    pub arrival_time: Duration,
    #[serde(with = "utility::serde::duration")]
    pub departure_time: Duration,
}
