//! Projects Store Gateway rows into the GTFS-realtime object shape the
//! HTTP Read API serves: a `FeedMessage` for the binary `.pbf`
//! representation, and an analogous JSON view for `?f=json`. The inverse
//! of `public_transport::matcher`'s proto-to-model conversions, grounded on
//! the same enum tables.

use gtfs::realtime::proto;
use model::alert::{AlertCause, AlertEffect, ServiceAlert, UNKNOWN_SEVERITY};
use model::trip_update::{ScheduleRelationship, TripUpdate};
use model::vehicle_position::{CongestionLevel, VehiclePosition, VehicleStopStatus};
use serde::Serialize;

/// `FeedMessage` header fields are fixed: always a full snapshot, never
/// incremental.
pub fn feed_message(entity: Vec<proto::FeedEntity>, timestamp: i64) -> proto::FeedMessage {
    proto::FeedMessage {
        header: proto::FeedHeader {
            gtfs_realtime_version: "2.0".to_owned(),
            incrementality: Some(proto::feed_header::Incrementality::FullDataset as i32),
            timestamp: Some(timestamp.max(0) as u64),
        },
        entity,
    }
}

/// Entities with zero surviving `stop_time_update`s are omitted.
pub fn trip_update_entities(updates: &[TripUpdate]) -> Vec<proto::FeedEntity> {
    updates
        .iter()
        .filter(|update| !update.stop_time_updates.is_empty())
        .map(|update| proto::FeedEntity {
            id: update.trip_update_id.raw(),
            is_deleted: Some(false),
            trip_update: Some(trip_update_to_proto(update)),
            vehicle: None,
            alert: None,
        })
        .collect()
}

fn trip_update_to_proto(update: &TripUpdate) -> proto::TripUpdate {
    proto::TripUpdate {
        trip: proto::TripDescriptor {
            trip_id: Some(update.trip_id.raw()),
            route_id: update.trip_route_id.as_ref().map(|id| id.raw()),
            direction_id: update.trip_direction_id.map(|d| d as u32),
            start_time: update.trip_start_time.clone(),
            start_date: update.trip_start_date.map(|d| d.format("%Y%m%d").to_string()),
            schedule_relationship: update
                .trip_schedule_relationship
                .map(trip_schedule_relationship_to_proto),
        },
        vehicle: None,
        stop_time_update: update
            .stop_time_updates
            .iter()
            .map(|stop_time_update| proto::trip_update::StopTimeUpdate {
                stop_sequence: Some(stop_time_update.stop_sequence),
                stop_id: stop_time_update.stop_id.as_ref().map(|id| id.raw()),
                arrival: stop_time_update.arrival.map(stop_time_event_to_proto),
                departure: stop_time_update.departure.map(stop_time_event_to_proto),
                schedule_relationship: stop_time_update
                    .schedule_relationship
                    .map(stop_time_schedule_relationship_to_proto),
            })
            .collect(),
        timestamp: Some(update.last_updated_timestamp.max(0) as u64),
    }
}

fn stop_time_event_to_proto(event: model::trip_update::StopTimeEvent) -> proto::trip_update::StopTimeEvent {
    proto::trip_update::StopTimeEvent {
        delay: event.delay,
        time: event.time,
        uncertainty: event.uncertainty,
    }
}

fn trip_schedule_relationship_to_proto(value: ScheduleRelationship) -> i32 {
    use proto::trip_descriptor::ScheduleRelationship as P;
    (match value {
        ScheduleRelationship::Scheduled => P::Scheduled,
        ScheduleRelationship::Added => P::Added,
        ScheduleRelationship::Unscheduled => P::Unscheduled,
        ScheduleRelationship::Canceled => P::Canceled,
        ScheduleRelationship::Duplicated => P::Duplicated,
        ScheduleRelationship::Deleted => P::Deleted,
        // Not valid at the trip-descriptor level; these only ever occur
        // on a `StopTimeUpdate`, never on `update.trip_schedule_relationship`.
        ScheduleRelationship::Skipped | ScheduleRelationship::NoData => P::Scheduled,
    }) as i32
}

fn stop_time_schedule_relationship_to_proto(value: ScheduleRelationship) -> i32 {
    use proto::trip_update::stop_time_update::ScheduleRelationship as P;
    (match value {
        ScheduleRelationship::Scheduled => P::Scheduled,
        ScheduleRelationship::Skipped => P::Skipped,
        ScheduleRelationship::NoData => P::NoData,
        ScheduleRelationship::Unscheduled => P::Unscheduled,
        ScheduleRelationship::Added
        | ScheduleRelationship::Canceled
        | ScheduleRelationship::Duplicated
        | ScheduleRelationship::Deleted => P::Scheduled,
    }) as i32
}

pub fn vehicle_position_entities(positions: &[VehiclePosition]) -> Vec<proto::FeedEntity> {
    positions
        .iter()
        .map(|position| proto::FeedEntity {
            id: position.vehicle_position_id.raw(),
            is_deleted: Some(false),
            trip_update: None,
            vehicle: Some(vehicle_position_to_proto(position)),
            alert: None,
        })
        .collect()
}

fn vehicle_position_to_proto(position: &VehiclePosition) -> proto::VehiclePosition {
    let trip = if position.trip_id.is_some()
        || position.trip_route_id.is_some()
        || position.trip_start_date.is_some()
    {
        Some(proto::TripDescriptor {
            trip_id: position.trip_id.as_ref().map(|id| id.raw()),
            route_id: position.trip_route_id.as_ref().map(|id| id.raw()),
            direction_id: None,
            start_time: None,
            start_date: position.trip_start_date.map(|d| d.format("%Y%m%d").to_string()),
            schedule_relationship: None,
        })
    } else {
        None
    };

    let vehicle = if position.vehicle_id.is_some() || position.vehicle_label.is_some() {
        Some(proto::VehicleDescriptor {
            id: position.vehicle_id.clone(),
            label: position.vehicle_label.clone(),
            license_plate: None,
        })
    } else {
        None
    };

    let position_field = match (position.latitude, position.longitude) {
        (Some(latitude), Some(longitude)) => Some(proto::Position {
            latitude: latitude as f32,
            longitude: longitude as f32,
            bearing: position.bearing,
            odometer: None,
            speed: position.speed,
        }),
        _ => None,
    };

    proto::VehiclePosition {
        trip,
        vehicle,
        position: position_field,
        current_stop_sequence: position.current_stop_sequence,
        stop_id: position.stop_id.as_ref().map(|id| id.raw()),
        current_status: position.current_status.map(vehicle_stop_status_to_proto),
        timestamp: position.timestamp.map(|v| v.max(0) as u64),
        congestion_level: position.congestion_level.map(congestion_level_to_proto),
    }
}

fn vehicle_stop_status_to_proto(value: VehicleStopStatus) -> i32 {
    use proto::vehicle_position::VehicleStopStatus as P;
    (match value {
        VehicleStopStatus::IncomingAt => P::IncomingAt,
        VehicleStopStatus::StoppedAt => P::StoppedAt,
        VehicleStopStatus::InTransitTo => P::InTransitTo,
    }) as i32
}

fn congestion_level_to_proto(value: CongestionLevel) -> i32 {
    use proto::vehicle_position::CongestionLevel as P;
    (match value {
        CongestionLevel::UnknownCongestionLevel => P::UnknownCongestionLevel,
        CongestionLevel::RunningSmoothly => P::RunningSmoothly,
        CongestionLevel::StopAndGo => P::StopAndGo,
        CongestionLevel::Congestion => P::Congestion,
        CongestionLevel::SevereCongestion => P::SevereCongestion,
    }) as i32
}

pub fn service_alert_entities(alerts: &[ServiceAlert], language: &str) -> Vec<proto::FeedEntity> {
    alerts
        .iter()
        .map(|alert| proto::FeedEntity {
            id: alert.service_alert_id.raw(),
            is_deleted: Some(false),
            trip_update: None,
            vehicle: None,
            alert: Some(service_alert_to_proto(alert, language)),
        })
        .collect()
}

fn service_alert_to_proto(alert: &ServiceAlert, language: &str) -> proto::Alert {
    proto::Alert {
        active_period: alert
            .active_periods
            .iter()
            .map(|period| proto::TimeRange {
                start: period.start_timestamp.map(|v| v.max(0) as u64),
                end: period.end_timestamp.map(|v| v.max(0) as u64),
            })
            .collect(),
        informed_entity: alert
            .informed_entities
            .iter()
            .map(|entity| proto::EntitySelector {
                agency_id: entity.agency_id.as_ref().map(|id| id.raw()),
                route_id: entity.route_id.as_ref().map(|id| id.raw()),
                route_type: entity.route_type,
                trip: entity.trip_id.as_ref().map(|id| proto::TripDescriptor {
                    trip_id: Some(id.raw()),
                    route_id: None,
                    direction_id: None,
                    start_time: None,
                    start_date: None,
                    schedule_relationship: None,
                }),
                stop_id: entity.stop_id.as_ref().map(|id| id.raw()),
            })
            .collect(),
        cause: Some(alert_cause_to_proto(alert.cause)),
        effect: Some(alert_effect_to_proto(alert.effect)),
        url: translated(alert.url.as_deref(), language),
        header_text: translated(alert.header_text.as_deref(), language),
        description_text: translated(alert.description_text.as_deref(), language),
        tts_header_text: translated(alert.tts_header_text.as_deref(), language),
        tts_description_text: translated(alert.tts_description_text.as_deref(), language),
        severity_level: Some(severity_level_to_proto(&alert.severity_level)),
    }
}

fn translated(text: Option<&str>, language: &str) -> Option<proto::TranslatedString> {
    text.map(|text| proto::TranslatedString {
        translation: vec![proto::translated_string::Translation {
            text: text.to_owned(),
            language: Some(language.to_owned()),
        }],
    })
}

fn alert_cause_to_proto(value: AlertCause) -> i32 {
    use proto::alert::Cause as P;
    (match value {
        AlertCause::UnknownCause => P::UnknownCause,
        AlertCause::OtherCause => P::OtherCause,
        AlertCause::TechnicalProblem => P::TechnicalProblem,
        AlertCause::Strike => P::Strike,
        AlertCause::Demonstration => P::Demonstration,
        AlertCause::Accident => P::Accident,
        AlertCause::Holiday => P::Holiday,
        AlertCause::Weather => P::Weather,
        AlertCause::Maintenance => P::Maintenance,
        AlertCause::Construction => P::Construction,
        AlertCause::PoliceActivity => P::PoliceActivity,
        AlertCause::MedicalEmergency => P::MedicalEmergency,
    }) as i32
}

fn alert_effect_to_proto(value: AlertEffect) -> i32 {
    use proto::alert::Effect as P;
    (match value {
        AlertEffect::NoService => P::NoService,
        AlertEffect::ReducedService => P::ReducedService,
        AlertEffect::SignificantDelays => P::SignificantDelays,
        AlertEffect::Detour => P::Detour,
        AlertEffect::AdditionalService => P::AdditionalService,
        AlertEffect::ModifiedService => P::ModifiedService,
        AlertEffect::OtherEffect => P::OtherEffect,
        AlertEffect::UnknownEffect => P::UnknownEffect,
        AlertEffect::StopMoved => P::StopMoved,
        AlertEffect::NoEffect => P::NoEffect,
        AlertEffect::AccessibilityIssue => P::AccessibilityIssue,
    }) as i32
}

fn severity_level_to_proto(value: &str) -> i32 {
    use proto::alert::SeverityLevel as P;
    (match value {
        "INFO" => P::Info,
        "WARNING" => P::Warning,
        "SEVERE" => P::Severe,
        _ => P::UnknownSeverity,
    }) as i32
}

// --------------------------------------------------------------- json views

/// The `?f=json` representation: header plus entity array, each entity
/// embedding the store's own model types directly (already `camelCase`
/// and symbolic-enum serialized) rather than a second hand-rolled
/// schema duplicating the wire shape.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMessageJson {
    pub header: FeedHeaderJson,
    pub entity: Vec<FeedEntityJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHeaderJson {
    pub gtfs_realtime_version: &'static str,
    pub incrementality: &'static str,
    pub timestamp: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntityJson {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_update: Option<TripUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehiclePosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<ServiceAlert>,
}

fn header_json(timestamp: i64) -> FeedHeaderJson {
    FeedHeaderJson {
        gtfs_realtime_version: "2.0",
        incrementality: "FULL_DATASET",
        timestamp,
    }
}

pub fn trip_updates_json(updates: Vec<TripUpdate>, timestamp: i64) -> FeedMessageJson {
    let entity = updates
        .into_iter()
        .filter(|update| !update.stop_time_updates.is_empty())
        .map(|update| FeedEntityJson {
            id: update.trip_update_id.raw(),
            trip_update: Some(update),
            vehicle: None,
            alert: None,
        })
        .collect();
    FeedMessageJson {
        header: header_json(timestamp),
        entity,
    }
}

pub fn vehicle_positions_json(positions: Vec<VehiclePosition>, timestamp: i64) -> FeedMessageJson {
    let entity = positions
        .into_iter()
        .map(|position| FeedEntityJson {
            id: position.vehicle_position_id.raw(),
            trip_update: None,
            vehicle: Some(position),
            alert: None,
        })
        .collect();
    FeedMessageJson {
        header: header_json(timestamp),
        entity,
    }
}

pub fn service_alerts_json(alerts: Vec<ServiceAlert>, timestamp: i64) -> FeedMessageJson {
    let entity = alerts
        .into_iter()
        .map(|alert| FeedEntityJson {
            id: alert.service_alert_id.raw(),
            trip_update: None,
            vehicle: None,
            alert: Some(alert),
        })
        .collect();
    FeedMessageJson {
        header: header_json(timestamp),
        entity,
    }
}

/// `/monitor` row, the monitor query projected for both the HTML table
/// and `?f=json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRowJson {
    pub operation_day: chrono::NaiveDate,
    pub agency_id: Option<String>,
    pub route_id: String,
    pub route_short_name: Option<String>,
    pub trip_id: String,
    pub trip_headsign: Option<String>,
    pub direction_id: Option<bool>,
    pub start_stop_id: String,
    pub start_stop_name: Option<String>,
    pub start_time: i64,
    pub realtime_available: bool,
    pub realtime_last_update: Option<i64>,
}

impl From<database::MonitorRow> for MonitorRowJson {
    fn from(row: database::MonitorRow) -> Self {
        Self {
            operation_day: row.operation_day,
            agency_id: row.agency_id,
            route_id: row.route_id,
            route_short_name: row.route_short_name,
            trip_id: row.trip_id,
            trip_headsign: row.trip_headsign,
            direction_id: row.direction_id,
            start_stop_id: row.start_stop_id,
            start_stop_name: row.start_stop_name,
            start_time: row.start_time,
            realtime_available: row.realtime_available,
            realtime_last_update: row.realtime_last_update,
        }
    }
}

/// Renders the monitor rows as a minimal HTML table, the default
/// representation (`?f=json` switches to [`MonitorRowJson`]).
pub fn monitor_html(rows: &[MonitorRowJson]) -> String {
    let mut html = String::from(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>monitor</title></head><body>\
         <table border=\"1\"><thead><tr>\
         <th>route</th><th>trip</th><th>headsign</th><th>start stop</th>\
         <th>start time</th><th>realtime</th><th>last update</th>\
         </tr></thead><tbody>",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(row.route_short_name.as_deref().unwrap_or(&row.route_id)),
            html_escape(&row.trip_id),
            html_escape(row.trip_headsign.as_deref().unwrap_or("")),
            html_escape(row.start_stop_name.as_deref().unwrap_or(&row.start_stop_id)),
            row.start_time,
            row.realtime_available,
            row.realtime_last_update.map(|ts| ts.to_string()).unwrap_or_default(),
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::trip_update::StopTimeEvent;
    use model::{RouteId, StopId, TripId, TripUpdateId};
    use prost::Message;

    fn sample_update() -> TripUpdate {
        TripUpdate {
            trip_update_id: TripUpdateId::new("TU1".to_owned()),
            trip_id: TripId::new("T1".to_owned()),
            trip_route_id: Some(RouteId::new("R1".to_owned())),
            trip_direction_id: Some(true),
            trip_start_time: Some("08:15:00".to_owned()),
            trip_start_date: Some(chrono::NaiveDate::from_ymd_opt(2026, 7, 31).unwrap()),
            trip_schedule_relationship: Some(ScheduleRelationship::Scheduled),
            last_updated_timestamp: 1_700_000_000,
            stop_time_updates: vec![StopTimeUpdate {
                trip_update_id: TripUpdateId::new("TU1".to_owned()),
                stop_sequence: 3,
                stop_id: Some(StopId::new("S1".to_owned())),
                arrival: Some(StopTimeEvent {
                    time: Some(1_700_000_100),
                    delay: Some(60),
                    uncertainty: None,
                }),
                departure: None,
                schedule_relationship: Some(ScheduleRelationship::Scheduled),
            }],
        }
    }

    /// A persisted `TripUpdate` projected to the `FeedMessage` shape and
    /// re-parsed yields the same field values for the documented fields.
    #[test]
    fn trip_update_round_trips_through_feed_message() {
        let update = sample_update();
        let entities = trip_update_entities(std::slice::from_ref(&update));
        let message = feed_message(entities, 1_700_000_200);

        let bytes = message.encode_to_vec();
        let decoded = proto::FeedMessage::decode(bytes.as_slice()).expect("decode");

        assert_eq!(decoded.header.gtfs_realtime_version, "2.0");
        assert_eq!(decoded.header.timestamp, Some(1_700_000_200));
        assert_eq!(decoded.entity.len(), 1);

        let entity = &decoded.entity[0];
        assert_eq!(entity.id, "TU1");
        assert_eq!(entity.is_deleted, Some(false));

        let trip_update = entity.trip_update.as_ref().expect("trip_update present");
        assert_eq!(trip_update.trip.trip_id.as_deref(), Some("T1"));
        assert_eq!(trip_update.trip.route_id.as_deref(), Some("R1"));
        assert_eq!(trip_update.trip.direction_id, Some(1));
        assert_eq!(trip_update.trip.start_time.as_deref(), Some("08:15:00"));
        assert_eq!(trip_update.trip.start_date.as_deref(), Some("20260731"));
        assert_eq!(trip_update.timestamp, Some(1_700_000_000));

        assert_eq!(trip_update.stop_time_update.len(), 1);
        let stop_time_update = &trip_update.stop_time_update[0];
        assert_eq!(stop_time_update.stop_sequence, Some(3));
        assert_eq!(stop_time_update.stop_id.as_deref(), Some("S1"));
        let arrival = stop_time_update.arrival.as_ref().expect("arrival present");
        assert_eq!(arrival.time, Some(1_700_000_100));
        assert_eq!(arrival.delay, Some(60));
    }

    /// Entities with no surviving `stop_time_update`s never reach the feed.
    #[test]
    fn trip_update_with_no_stop_time_updates_is_omitted() {
        let mut update = sample_update();
        update.stop_time_updates.clear();
        let entities = trip_update_entities(&[update]);
        assert!(entities.is_empty());
    }

    #[test]
    fn feed_message_header_is_always_full_dataset() {
        let message = feed_message(Vec::new(), 1_700_000_000);
        assert_eq!(
            message.header.incrementality,
            Some(proto::feed_header::Incrementality::FullDataset as i32)
        );
        assert_eq!(message.header.timestamp, Some(1_700_000_000));
    }
}
