use serde::{Deserialize, Serialize};

use crate::AgencyId;

/// A nominal agency, loaded once from `agency.txt` and immutable for the
/// lifetime of the process. Only the fields the monitor query and the
/// GTFS-realtime `EntitySelector.agency_id` reference need to survive the
/// static load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub agency_id: AgencyId,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
}
