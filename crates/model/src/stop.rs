use serde::{Deserialize, Serialize};

use crate::StopId;

/// GTFS `location_type` (stops.txt column of the same name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Stop,
    Station,
    EntranceExit,
    GenericNode,
    BoardingArea,
}

impl Default for LocationType {
    fn default() -> Self {
        Self::Stop
    }
}

/// A nominal stop, loaded once from `stops.txt` and immutable for the
/// lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub stop_id: StopId,
    pub stop_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub parent_station: Option<StopId>,
    pub location_type: LocationType,
}
