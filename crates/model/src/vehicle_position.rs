use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{RouteId, StopId, TripId, VehiclePositionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStopStatus {
    IncomingAt,
    StoppedAt,
    InTransitTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CongestionLevel {
    UnknownCongestionLevel,
    RunningSmoothly,
    StopAndGo,
    Congestion,
    SevereCongestion,
}

/// Ingestion mirrors `TripUpdate` insert/delete handling, minus the
/// `(route_id, start_time)` rebind the matcher does for trip updates.
/// A vehicle position with an unknown `trip_id` is stored as-is rather
/// than dropped, since there is no per-stop sequence to validate it
/// against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePosition {
    pub vehicle_position_id: VehiclePositionId,
    pub trip_id: Option<TripId>,
    pub trip_route_id: Option<RouteId>,
    pub trip_start_date: Option<NaiveDate>,
    pub vehicle_id: Option<String>,
    pub vehicle_label: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bearing: Option<f32>,
    pub speed: Option<f32>,
    pub current_stop_sequence: Option<u32>,
    pub stop_id: Option<StopId>,
    pub current_status: Option<VehicleStopStatus>,
    pub timestamp: Option<i64>,
    pub congestion_level: Option<CongestionLevel>,
    pub last_updated_timestamp: i64,
}
