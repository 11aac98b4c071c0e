use serde::{Deserialize, Serialize};

use crate::{AgencyId, RouteId, ServiceAlertId, StopId, TripId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCause {
    UnknownCause,
    OtherCause,
    TechnicalProblem,
    Strike,
    Demonstration,
    Accident,
    Holiday,
    Weather,
    Maintenance,
    Construction,
    PoliceActivity,
    MedicalEmergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertEffect {
    NoService,
    ReducedService,
    SignificantDelays,
    Detour,
    AdditionalService,
    ModifiedService,
    OtherEffect,
    UnknownEffect,
    StopMoved,
    NoEffect,
    AccessibilityIssue,
}

/// Not part of the canonical enum list (severity_level is free-form in the
/// proto). Used as the default symbolic value when a `ServiceAlert` arrives
/// with no severity set.
pub const UNKNOWN_SEVERITY: &str = "UNKNOWN_SEVERITY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertActivePeriod {
    pub service_alert_id: ServiceAlertId,
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
}

/// One `EntitySelector` entry, flattened. A row is only ever persisted if
/// at least one of these fields is non-null after ID mapping and nominal
/// filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertInformedEntity {
    pub service_alert_id: ServiceAlertId,
    pub agency_id: Option<AgencyId>,
    pub route_id: Option<RouteId>,
    pub route_type: Option<i32>,
    pub trip_id: Option<TripId>,
    pub stop_id: Option<StopId>,
}

impl AlertInformedEntity {
    pub fn has_any_reference(&self) -> bool {
        self.agency_id.is_some()
            || self.route_id.is_some()
            || self.route_type.is_some()
            || self.trip_id.is_some()
            || self.stop_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAlert {
    pub service_alert_id: ServiceAlertId,
    pub cause: AlertCause,
    pub effect: AlertEffect,
    pub url: Option<String>,
    pub header_text: Option<String>,
    pub description_text: Option<String>,
    pub tts_header_text: Option<String>,
    pub tts_description_text: Option<String>,
    pub severity_level: String,
    pub last_updated_timestamp: i64,
    pub active_periods: Vec<AlertActivePeriod>,
    pub informed_entities: Vec<AlertInformedEntity>,
}
