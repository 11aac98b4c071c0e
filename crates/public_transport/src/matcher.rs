//! Reconciles a decoded feed entity against the Nominal Index, producing
//! either an insert or a delete for the write queues. A single malformed
//! entity is dropped and the loop continues rather than aborting the
//! whole feed message, and an alert's informed-entity emptiness check
//! inspects every reference field, not just `route_id` twice over.

use gtfs::realtime::{proto, Alert, EntitySelector, FeedEntity, TripUpdate as ProtoTripUpdate};
use gtfs::mapping::IdMapping;
use model::{
    alert::{AlertActivePeriod, AlertCause, AlertEffect, AlertInformedEntity, ServiceAlert},
    trip_update::{ScheduleRelationship, StopTimeEvent, StopTimeUpdate, TripUpdate},
    vehicle_position::{CongestionLevel, VehicleStopStatus, VehiclePosition},
    RouteId, ServiceAlertId, StopId, TripId, TripUpdateId, VehiclePositionId,
};
use serde::Deserialize;
use utility::id::Id;

use crate::nominal_index::NominalIndex;

/// `matching.*` config keys: flags governing the stop-sequence
/// verification policy.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchingPolicy {
    #[serde(default = "default_true")]
    pub match_against_first_stop_id: bool,
    #[serde(default)]
    pub match_against_stop_ids: bool,
    #[serde(default = "default_true")]
    pub remove_invalid_stop_ids: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatchingPolicy {
    fn default() -> Self {
        Self {
            match_against_first_stop_id: true,
            match_against_stop_ids: false,
            remove_invalid_stop_ids: true,
        }
    }
}

pub enum TripUpdateOutcome {
    Insert(TripUpdate),
    Delete(TripUpdateId),
}

pub enum ServiceAlertOutcome {
    Insert(ServiceAlert),
    Delete(ServiceAlertId),
}

pub enum VehiclePositionOutcome {
    Insert(VehiclePosition),
    Delete(VehiclePositionId),
}

// ------------------------------------------------------------- trip updates

/// Reconciles one `FeedEntity` carrying a `trip_update`. Returns `None`
/// for every drop outcome (absent start_time, unmapped route, no
/// surviving candidate) — callers log at debug level and move on to the
/// next entity rather than aborting the batch.
pub fn match_trip_update(
    entity: &FeedEntity,
    mapping: &IdMapping,
    index: &NominalIndex,
    policy: MatchingPolicy,
    now_unix: i64,
) -> Option<TripUpdateOutcome> {
    let update = entity.trip_update.as_ref()?;
    let is_deleted = entity.is_deleted.unwrap_or(false);

    let mapped_route_id = update.trip.route_id.as_deref().map(|id| mapping.map_route(id).to_owned());
    let mapped_trip_id = update.trip.trip_id.clone();

    let known_trip_id = mapped_trip_id
        .as_deref()
        .filter(|trip_id| index.is_nominal_trip(&TripId::new((*trip_id).to_owned())))
        .map(str::to_owned);

    let resolved_trip_id = match &known_trip_id {
        Some(trip_id) => trip_id.clone(),
        None => {
            let route_id = mapped_route_id.clone()?;
            let start_time = update.trip.start_time.clone()?;
            let candidates = index.candidates_for(&RouteId::new(route_id), &start_time)?;

            let mut accepted = None;
            for candidate in candidates {
                if verify_stop_sequence(update, candidate, index, policy, mapping).is_some() {
                    accepted = Some(candidate.raw());
                    break;
                }
            }
            accepted?
        }
    };

    // §4.1.1 step 2a: a rebind-match also rebinds `entity.id` to the
    // candidate, so the persisted id is the candidate trip_id rather than
    // the original unmatched entity id. The known-trip path leaves
    // `entity.id` untouched.
    let trip_update_id = if known_trip_id.is_some() {
        TripUpdateId::new(entity.id.clone())
    } else {
        TripUpdateId::new(resolved_trip_id.clone())
    };
    if is_deleted {
        return Some(TripUpdateOutcome::Delete(trip_update_id));
    }

    // The known-trip path emits the entity's stop_time_updates unchanged
    // (only ID-mapped); verification and removal only apply to the
    // rebind-by-(route_id, start_time) matching path.
    let stop_time_updates = if known_trip_id.is_some() {
        mapped_stop_time_updates(update, &trip_update_id, mapping)
    } else {
        staged_stop_time_updates(
            update,
            &trip_update_id,
            &TripId::new(resolved_trip_id.clone()),
            index,
            policy,
            mapping,
        )
    };

    let trip_update = TripUpdate {
        trip_update_id,
        trip_id: TripId::new(resolved_trip_id),
        trip_route_id: mapped_route_id.map(RouteId::new),
        trip_direction_id: update.trip.direction_id.map(|d| d == 1),
        trip_start_time: update.trip.start_time.clone(),
        trip_start_date: update
            .trip
            .start_date
            .as_deref()
            .and_then(parse_gtfs_date),
        trip_schedule_relationship: update
            .trip
            .schedule_relationship
            .and_then(proto::trip_descriptor::ScheduleRelationship::from_i32)
            .map(trip_schedule_relationship_from_proto),
        last_updated_timestamp: now_unix,
        stop_time_updates,
    };

    Some(TripUpdateOutcome::Insert(trip_update))
}

/// Runs the stop-sequence verification policy against a single candidate
/// nominal trip, without mutating the entity. Returns `Some(())` if the
/// candidate is accepted as a match.
fn verify_stop_sequence(
    update: &ProtoTripUpdate,
    candidate: &TripId,
    index: &NominalIndex,
    policy: MatchingPolicy,
    mapping: &IdMapping,
) -> Option<()> {
    if !policy.match_against_first_stop_id && !policy.match_against_stop_ids {
        return Some(());
    }

    let nominal_stops = index.intermediate_stops_for(candidate)?;

    for stu in &update.stop_time_update {
        let sequence = stu.stop_sequence.unwrap_or(0);
        if policy.match_against_first_stop_id
            && !policy.match_against_stop_ids
            && !policy.remove_invalid_stop_ids
            && sequence != 1
        {
            continue;
        }

        let Some(actual_stop_id) = stu.stop_id.as_deref().map(|id| mapping.map_stop(id)) else {
            continue;
        };

        let index_in_sequence = sequence.saturating_sub(1) as usize;
        if sequence as usize > nominal_stops.len() {
            return None;
        }
        let nominal_stop_id = &nominal_stops[index_in_sequence.max(0)];
        if nominal_stop_id.raw() != actual_stop_id {
            if policy.match_against_stop_ids {
                return None;
            }
            // `remove_invalid_stop_ids`-only: this single update is dropped
            // later, the candidate itself is still accepted.
        }
    }

    Some(())
}

/// Builds the outgoing `stop_time_update` rows for the accepted candidate,
/// applying the same verification a second time to decide which rows to
/// keep when `remove_invalid_stop_ids` is set. Discarding happens in
/// descending index order so earlier indices stay valid while removing.
/// ID-maps the feed's stop_time_updates without any sequence verification
/// or removal. The known-trip path emits them unchanged.
fn mapped_stop_time_updates(
    update: &ProtoTripUpdate,
    trip_update_id: &TripUpdateId,
    mapping: &IdMapping,
) -> Vec<StopTimeUpdate> {
    update
        .stop_time_update
        .iter()
        .map(|stu| to_stop_time_update(stu, trip_update_id, mapping))
        .collect()
}

fn to_stop_time_update(
    stu: &proto::trip_update::StopTimeUpdate,
    trip_update_id: &TripUpdateId,
    mapping: &IdMapping,
) -> StopTimeUpdate {
    StopTimeUpdate {
        trip_update_id: trip_update_id.clone(),
        stop_sequence: stu.stop_sequence.unwrap_or(0),
        stop_id: stu
            .stop_id
            .as_deref()
            .map(|id| StopId::new(mapping.map_stop(id).to_owned())),
        arrival: stu.arrival.as_ref().map(|event| StopTimeEvent {
            time: event.time,
            delay: event.delay,
            uncertainty: event.uncertainty,
        }),
        departure: stu.departure.as_ref().map(|event| StopTimeEvent {
            time: event.time,
            delay: event.delay,
            uncertainty: event.uncertainty,
        }),
        schedule_relationship: stu
            .schedule_relationship
            .and_then(proto::trip_update::stop_time_update::ScheduleRelationship::from_i32)
            .map(stop_time_schedule_relationship_from_proto),
    }
}

fn staged_stop_time_updates(
    update: &ProtoTripUpdate,
    trip_update_id: &TripUpdateId,
    trip_id: &TripId,
    index: &NominalIndex,
    policy: MatchingPolicy,
    mapping: &IdMapping,
) -> Vec<StopTimeUpdate> {
    let nominal_stops = index.intermediate_stops_for(trip_id);

    let mut rows: Vec<StopTimeUpdate> = update
        .stop_time_update
        .iter()
        .map(|stu| to_stop_time_update(stu, trip_update_id, mapping))
        .collect();

    if !policy.remove_invalid_stop_ids {
        return rows;
    }
    let Some(nominal_stops) = nominal_stops else {
        return rows;
    };

    let mut to_remove = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if policy.match_against_first_stop_id
            && !policy.match_against_stop_ids
            && !policy.remove_invalid_stop_ids
            && row.stop_sequence != 1
        {
            continue;
        }
        let Some(actual_stop_id) = row.stop_id.as_ref() else {
            continue;
        };
        let index_in_sequence = row.stop_sequence.saturating_sub(1) as usize;
        if row.stop_sequence as usize > nominal_stops.len() {
            to_remove.push(i);
            continue;
        }
        if nominal_stops[index_in_sequence].raw() != actual_stop_id.raw() {
            to_remove.push(i);
        }
    }
    for i in to_remove.into_iter().rev() {
        rows.remove(i);
    }
    rows
}

fn parse_gtfs_date(value: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

fn trip_schedule_relationship_from_proto(
    value: proto::trip_descriptor::ScheduleRelationship,
) -> ScheduleRelationship {
    use proto::trip_descriptor::ScheduleRelationship as P;
    match value {
        P::Scheduled => ScheduleRelationship::Scheduled,
        P::Added => ScheduleRelationship::Added,
        P::Unscheduled => ScheduleRelationship::Unscheduled,
        P::Canceled => ScheduleRelationship::Canceled,
        P::Duplicated => ScheduleRelationship::Duplicated,
        P::Deleted => ScheduleRelationship::Deleted,
    }
}

fn stop_time_schedule_relationship_from_proto(
    value: proto::trip_update::stop_time_update::ScheduleRelationship,
) -> ScheduleRelationship {
    use proto::trip_update::stop_time_update::ScheduleRelationship as P;
    match value {
        P::Scheduled => ScheduleRelationship::Scheduled,
        P::Skipped => ScheduleRelationship::Skipped,
        P::NoData => ScheduleRelationship::NoData,
        P::Unscheduled => ScheduleRelationship::Unscheduled,
    }
}

// ------------------------------------------------------------ vehicle positions

/// Vehicle positions carry no stop sequence to verify against, so unlike
/// trip updates there is no rebind-by-`(route_id, start_time)` step: a
/// position with an unrecognized `trip_id` is ID-mapped and stored as-is.
pub fn match_vehicle_position(
    entity: &FeedEntity,
    mapping: &IdMapping,
    now_unix: i64,
) -> Option<VehiclePositionOutcome> {
    let position = entity.vehicle.as_ref()?;
    let vehicle_position_id = VehiclePositionId::new(entity.id.clone());

    if entity.is_deleted.unwrap_or(false) {
        return Some(VehiclePositionOutcome::Delete(vehicle_position_id));
    }

    let trip = position.trip.as_ref();
    let vehicle = position.vehicle.as_ref();

    let vehicle_position = VehiclePosition {
        vehicle_position_id,
        trip_id: trip.and_then(|t| t.trip_id.clone()).map(TripId::new),
        trip_route_id: trip
            .and_then(|t| t.route_id.as_deref())
            .map(|id| RouteId::new(mapping.map_route(id).to_owned())),
        trip_start_date: trip.and_then(|t| t.start_date.as_deref()).and_then(parse_gtfs_date),
        vehicle_id: vehicle.and_then(|v| v.id.clone()),
        vehicle_label: vehicle.and_then(|v| v.label.clone()),
        latitude: position.position.as_ref().map(|p| p.latitude as f64),
        longitude: position.position.as_ref().map(|p| p.longitude as f64),
        bearing: position.position.as_ref().and_then(|p| p.bearing),
        speed: position.position.as_ref().and_then(|p| p.speed),
        current_stop_sequence: position.current_stop_sequence,
        stop_id: position
            .stop_id
            .as_deref()
            .map(|id| StopId::new(mapping.map_stop(id).to_owned())),
        current_status: position
            .current_status
            .and_then(proto::vehicle_position::VehicleStopStatus::from_i32)
            .map(vehicle_stop_status_from_proto),
        timestamp: position.timestamp.map(|v| v as i64),
        congestion_level: position
            .congestion_level
            .and_then(proto::vehicle_position::CongestionLevel::from_i32)
            .map(congestion_level_from_proto),
        last_updated_timestamp: now_unix,
    };

    Some(VehiclePositionOutcome::Insert(vehicle_position))
}

fn vehicle_stop_status_from_proto(value: proto::vehicle_position::VehicleStopStatus) -> VehicleStopStatus {
    use proto::vehicle_position::VehicleStopStatus as P;
    match value {
        P::IncomingAt => VehicleStopStatus::IncomingAt,
        P::StoppedAt => VehicleStopStatus::StoppedAt,
        P::InTransitTo => VehicleStopStatus::InTransitTo,
    }
}

fn congestion_level_from_proto(value: proto::vehicle_position::CongestionLevel) -> CongestionLevel {
    use proto::vehicle_position::CongestionLevel as P;
    match value {
        P::UnknownCongestionLevel => CongestionLevel::UnknownCongestionLevel,
        P::RunningSmoothly => CongestionLevel::RunningSmoothly,
        P::StopAndGo => CongestionLevel::StopAndGo,
        P::Congestion => CongestionLevel::Congestion,
        P::SevereCongestion => CongestionLevel::SevereCongestion,
    }
}

// ------------------------------------------------------------ service alerts

pub fn match_service_alert(
    entity: &FeedEntity,
    mapping: &IdMapping,
    index: &NominalIndex,
    language: &str,
    now_unix: i64,
) -> Option<ServiceAlertOutcome> {
    let alert: &Alert = entity.alert.as_ref()?;
    let service_alert_id = ServiceAlertId::new(entity.id.clone());

    if entity.is_deleted.unwrap_or(false) {
        return Some(ServiceAlertOutcome::Delete(service_alert_id));
    }

    let informed_entities: Vec<AlertInformedEntity> = alert
        .informed_entity
        .iter()
        .map(|selector| map_and_filter_informed_entity(selector, mapping, index, &service_alert_id))
        .filter(AlertInformedEntity::has_any_reference)
        .collect();

    if informed_entities.is_empty() {
        return None;
    }

    let active_periods = alert
        .active_period
        .iter()
        .map(|period| AlertActivePeriod {
            service_alert_id: service_alert_id.clone(),
            start_timestamp: period.start.map(|v| v as i64),
            end_timestamp: period.end.map(|v| v as i64),
        })
        .collect();

    let cause = alert
        .cause
        .and_then(proto::alert::Cause::from_i32)
        .map(alert_cause_from_proto)
        .unwrap_or(AlertCause::UnknownCause);
    let effect = alert
        .effect
        .and_then(proto::alert::Effect::from_i32)
        .map(alert_effect_from_proto)
        .unwrap_or(AlertEffect::UnknownEffect);
    let severity_level = alert
        .severity_level
        .and_then(proto::alert::SeverityLevel::from_i32)
        .map(severity_level_name)
        .unwrap_or_else(|| model::alert::UNKNOWN_SEVERITY.to_owned());

    let service_alert = ServiceAlert {
        service_alert_id,
        cause,
        effect,
        url: gtfs::realtime::extract_translation(alert.url.as_ref(), language).map(str::to_owned),
        header_text: gtfs::realtime::extract_translation(alert.header_text.as_ref(), language)
            .map(str::to_owned),
        description_text: gtfs::realtime::extract_translation(alert.description_text.as_ref(), language)
            .map(str::to_owned),
        tts_header_text: gtfs::realtime::extract_translation(alert.tts_header_text.as_ref(), language)
            .map(str::to_owned),
        tts_description_text: gtfs::realtime::extract_translation(
            alert.tts_description_text.as_ref(),
            language,
        )
        .map(str::to_owned),
        severity_level,
        last_updated_timestamp: now_unix,
        active_periods,
        informed_entities,
    };

    Some(ServiceAlertOutcome::Insert(service_alert))
}

fn map_and_filter_informed_entity(
    selector: &EntitySelector,
    mapping: &IdMapping,
    index: &NominalIndex,
    service_alert_id: &ServiceAlertId,
) -> AlertInformedEntity {
    let route_id = selector
        .route_id
        .as_deref()
        .map(|id| mapping.map_route(id).to_owned())
        .map(RouteId::new)
        .filter(|id| index.is_nominal_route(id));

    let stop_id = selector
        .stop_id
        .as_deref()
        .map(|id| mapping.map_stop(id).to_owned())
        .map(StopId::new)
        .filter(|id| index.is_nominal_stop(id));

    AlertInformedEntity {
        service_alert_id: service_alert_id.clone(),
        agency_id: selector.agency_id.clone().map(Id::new),
        route_id,
        route_type: selector.route_type,
        trip_id: selector
            .trip
            .as_ref()
            .and_then(|trip| trip.trip_id.clone())
            .map(Id::new),
        stop_id,
    }
}

fn alert_cause_from_proto(value: proto::alert::Cause) -> AlertCause {
    use proto::alert::Cause as P;
    match value {
        P::UnknownCause => AlertCause::UnknownCause,
        P::OtherCause => AlertCause::OtherCause,
        P::TechnicalProblem => AlertCause::TechnicalProblem,
        P::Strike => AlertCause::Strike,
        P::Demonstration => AlertCause::Demonstration,
        P::Accident => AlertCause::Accident,
        P::Holiday => AlertCause::Holiday,
        P::Weather => AlertCause::Weather,
        P::Maintenance => AlertCause::Maintenance,
        P::Construction => AlertCause::Construction,
        P::PoliceActivity => AlertCause::PoliceActivity,
        P::MedicalEmergency => AlertCause::MedicalEmergency,
    }
}

fn alert_effect_from_proto(value: proto::alert::Effect) -> AlertEffect {
    use proto::alert::Effect as P;
    match value {
        P::NoService => AlertEffect::NoService,
        P::ReducedService => AlertEffect::ReducedService,
        P::SignificantDelays => AlertEffect::SignificantDelays,
        P::Detour => AlertEffect::Detour,
        P::AdditionalService => AlertEffect::AdditionalService,
        P::ModifiedService => AlertEffect::ModifiedService,
        P::OtherEffect => AlertEffect::OtherEffect,
        P::UnknownEffect => AlertEffect::UnknownEffect,
        P::StopMoved => AlertEffect::StopMoved,
        P::NoEffect => AlertEffect::NoEffect,
        P::AccessibilityIssue => AlertEffect::AccessibilityIssue,
    }
}

/// The feed's `severity_level` enum has no corresponding typed field on
/// [`ServiceAlert`]; it is stored as the same upper-snake name GTFS-realtime
/// documents for the field, not a `{:?}`-derived Rust identifier.
fn severity_level_name(value: proto::alert::SeverityLevel) -> String {
    use proto::alert::SeverityLevel as P;
    match value {
        P::UnknownSeverity => model::alert::UNKNOWN_SEVERITY.to_owned(),
        P::Info => "INFO".to_owned(),
        P::Warning => "WARNING".to_owned(),
        P::Severe => "SEVERE".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs::realtime::proto;
    use std::collections::{HashMap, HashSet};

    fn empty_index(operation_day: chrono::NaiveDate) -> NominalIndex {
        NominalIndex {
            operation_day,
            stop_ids: HashSet::new(),
            route_ids: HashSet::new(),
            trip_ids: HashSet::new(),
            per_route_start_times: HashMap::new(),
            intermediate_stops: HashMap::new(),
        }
    }

    fn day() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2026, 7, 27).unwrap()
    }

    #[test]
    fn known_trip_id_is_emitted_unchanged() {
        let mut index = empty_index(day());
        index.trip_ids.insert(TripId::new("T1".to_owned()));

        let entity = FeedEntity {
            id: "E1".to_owned(),
            is_deleted: Some(false),
            trip_update: Some(ProtoTripUpdate {
                trip: proto::TripDescriptor {
                    trip_id: Some("T1".to_owned()),
                    route_id: None,
                    direction_id: None,
                    start_time: None,
                    start_date: None,
                    schedule_relationship: None,
                },
                vehicle: None,
                stop_time_update: vec![],
                timestamp: None,
            }),
            vehicle: None,
            alert: None,
        };

        let outcome = match_trip_update(
            &entity,
            &IdMapping::default(),
            &index,
            MatchingPolicy::default(),
            1_000,
        );
        assert!(matches!(outcome, Some(TripUpdateOutcome::Insert(u)) if u.trip_id.raw() == "T1"));
    }

    #[test]
    fn missing_start_time_on_unknown_trip_drops_entity() {
        let index = empty_index(day());
        let entity = FeedEntity {
            id: "E1".to_owned(),
            is_deleted: Some(false),
            trip_update: Some(ProtoTripUpdate {
                trip: proto::TripDescriptor {
                    trip_id: Some("UNKNOWN".to_owned()),
                    route_id: Some("R1".to_owned()),
                    direction_id: None,
                    start_time: None,
                    start_date: None,
                    schedule_relationship: None,
                },
                vehicle: None,
                stop_time_update: vec![],
                timestamp: None,
            }),
            vehicle: None,
            alert: None,
        };

        let outcome = match_trip_update(
            &entity,
            &IdMapping::default(),
            &index,
            MatchingPolicy::default(),
            1_000,
        );
        assert!(outcome.is_none());
    }

    fn stop_time_update(sequence: u32, stop_id: &str) -> proto::trip_update::StopTimeUpdate {
        proto::trip_update::StopTimeUpdate {
            stop_sequence: Some(sequence),
            stop_id: Some(stop_id.to_owned()),
            arrival: None,
            departure: None,
            schedule_relationship: None,
        }
    }

    /// Spec §8 scenario 2: a trip_id not in the nominal set is rebound
    /// to the nominal candidate for its (route_id, start_time), and the
    /// persisted row carries the candidate's id for both `trip_id` and
    /// `trip_update_id` — not the original unmatched entity id.
    #[test]
    fn unknown_trip_id_is_rebound_by_route_and_start_time() {
        let mut index = empty_index(day());
        index.trip_ids.insert(TripId::new("T1".to_owned()));
        index.intermediate_stops.insert(
            TripId::new("T1".to_owned()),
            vec![
                StopId::new("S1".to_owned()),
                StopId::new("S2".to_owned()),
                StopId::new("S3".to_owned()),
            ],
        );
        index
            .per_route_start_times
            .entry(RouteId::new("R1".to_owned()))
            .or_default()
            .entry("08:00:00".to_owned())
            .or_default()
            .push(TripId::new("T1".to_owned()));

        let entity = FeedEntity {
            id: "E1".to_owned(),
            is_deleted: Some(false),
            trip_update: Some(ProtoTripUpdate {
                trip: proto::TripDescriptor {
                    trip_id: Some("X".to_owned()),
                    route_id: Some("R1".to_owned()),
                    direction_id: None,
                    start_time: Some("08:00:00".to_owned()),
                    start_date: None,
                    schedule_relationship: None,
                },
                vehicle: None,
                stop_time_update: vec![
                    stop_time_update(1, "S1"),
                    stop_time_update(2, "S2"),
                    stop_time_update(3, "S3"),
                ],
                timestamp: None,
            }),
            vehicle: None,
            alert: None,
        };

        let outcome = match_trip_update(
            &entity,
            &IdMapping::default(),
            &index,
            MatchingPolicy::default(),
            1_000,
        );
        match outcome {
            Some(TripUpdateOutcome::Insert(update)) => {
                assert_eq!(update.trip_id.raw(), "T1");
                assert_eq!(update.trip_update_id.raw(), "T1");
                assert_eq!(update.stop_time_updates.len(), 3);
            }
            _ => panic!("expected an accepted rebind match"),
        }
    }

    #[test]
    fn alert_with_no_surviving_informed_entity_is_discarded() {
        let index = empty_index(day());
        let entity = FeedEntity {
            id: "A1".to_owned(),
            is_deleted: Some(false),
            trip_update: None,
            vehicle: None,
            alert: Some(Alert {
                active_period: vec![],
                informed_entity: vec![EntitySelector {
                    agency_id: None,
                    route_id: Some("UNKNOWN-ROUTE".to_owned()),
                    route_type: None,
                    trip: None,
                    stop_id: None,
                }],
                cause: None,
                effect: None,
                url: None,
                header_text: None,
                description_text: None,
                tts_header_text: None,
                tts_description_text: None,
                severity_level: None,
            }),
        };

        let outcome = match_service_alert(&entity, &IdMapping::default(), &index, "de-DE", 1_000);
        assert!(outcome.is_none());
    }

    #[test]
    fn alert_delete_flag_routes_directly_to_delete() {
        let index = empty_index(day());
        let entity = FeedEntity {
            id: "A1".to_owned(),
            is_deleted: Some(true),
            trip_update: None,
            vehicle: None,
            alert: Some(Alert {
                active_period: vec![],
                informed_entity: vec![],
                cause: None,
                effect: None,
                url: None,
                header_text: None,
                description_text: None,
                tts_header_text: None,
                tts_description_text: None,
                severity_level: None,
            }),
        };

        let outcome = match_service_alert(&entity, &IdMapping::default(), &index, "de-DE", 1_000);
        assert!(matches!(outcome, Some(ServiceAlertOutcome::Delete(_))));
    }
}
