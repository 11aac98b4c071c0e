use serde::{Deserialize, Serialize};

use crate::{AgencyId, RouteId};

/// GTFS `route_type` (routes.txt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolleybus,
    Monorail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub route_id: RouteId,
    pub agency_id: Option<AgencyId>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_type: RouteType,
}
