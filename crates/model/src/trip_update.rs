use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{RouteId, StopId, TripId, TripUpdateId};

/// GTFS-realtime `TripDescriptor.ScheduleRelationship` /
/// `TripUpdate.StopTimeUpdate.ScheduleRelationship`, persisted as the
/// symbolic name (`"SCHEDULED"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleRelationship {
    Scheduled,
    Added,
    Unscheduled,
    Canceled,
    Duplicated,
    Deleted,
    /// `StopTimeUpdate`-only: the vehicle is not expected to stop here.
    Skipped,
    /// `StopTimeUpdate`-only: no further predictions are available past
    /// this point in the trip.
    NoData,
}

impl Default for ScheduleRelationship {
    fn default() -> Self {
        Self::Scheduled
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTimeEvent {
    pub time: Option<i64>,
    pub delay: Option<i32>,
    pub uncertainty: Option<i32>,
}

impl StopTimeEvent {
    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.delay.is_none() && self.uncertainty.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTimeUpdate {
    pub trip_update_id: TripUpdateId,
    pub stop_sequence: u32,
    pub stop_id: Option<StopId>,
    pub arrival: Option<StopTimeEvent>,
    pub departure: Option<StopTimeEvent>,
    pub schedule_relationship: Option<ScheduleRelationship>,
}

/// One reconciled incoming `TripUpdate` entity, plus its stop updates.
/// `trip_id` is either a nominal id for the active day, or the feed's
/// original id after the matcher rebinds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdate {
    pub trip_update_id: TripUpdateId,
    pub trip_id: TripId,
    pub trip_route_id: Option<RouteId>,
    pub trip_direction_id: Option<bool>,
    /// Raw `HH:MM:SS` as carried by the feed; not parsed further since it
    /// is only ever compared against the nominal per-route start-time map.
    pub trip_start_time: Option<String>,
    pub trip_start_date: Option<NaiveDate>,
    pub trip_schedule_relationship: Option<ScheduleRelationship>,
    pub last_updated_timestamp: i64,
    pub stop_time_updates: Vec<StopTimeUpdate>,
}
