//! Insert/delete/fetch primitives for the six realtime tables.
//! Inserts are upsert-by-replace: the write queue drains an insert by
//! deleting any existing row for the same id first, then inserting fresh
//! child rows, so there is never a stale partial child set left behind.

use duckdb::{params, Connection};
use model::{
    alert::{AlertActivePeriod, AlertCause, AlertEffect, AlertInformedEntity, ServiceAlert},
    trip_update::{ScheduleRelationship, StopTimeEvent, StopTimeUpdate, TripUpdate},
    vehicle_position::{CongestionLevel, VehicleStopStatus, VehiclePosition},
    ServiceAlertId, TripUpdateId, VehiclePositionId,
};
use utility::id::Id;

fn enum_name<E: std::fmt::Debug>(value: &E) -> String {
    format!("{value:?}")
}

// ---------------------------------------------------------------- trip updates

pub fn delete_trip_update(conn: &Connection, id: &TripUpdateId) -> duckdb::Result<()> {
    conn.execute(
        "DELETE FROM realtime_trip_stop_time_updates WHERE trip_update_id = ?",
        params![id.raw()],
    )?;
    conn.execute(
        "DELETE FROM realtime_trip_updates WHERE trip_update_id = ?",
        params![id.raw()],
    )?;
    Ok(())
}

pub fn insert_trip_update(conn: &Connection, update: &TripUpdate) -> duckdb::Result<()> {
    delete_trip_update(conn, &update.trip_update_id)?;

    conn.execute(
        "INSERT INTO realtime_trip_updates
            (trip_update_id, trip_id, trip_route_id, trip_direction_id, trip_start_time,
             trip_start_date, trip_schedule_relationship, last_updated_timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            update.trip_update_id.raw(),
            update.trip_id.raw(),
            update.trip_route_id.as_ref().map(|id| id.raw()),
            update.trip_direction_id,
            update.trip_start_time,
            update
                .trip_start_date
                .map(|d| d.format("%Y%m%d").to_string().parse::<i32>().unwrap_or_default()),
            update.trip_schedule_relationship.as_ref().map(enum_name),
            update.last_updated_timestamp,
        ],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO realtime_trip_stop_time_updates
            (trip_update_id, stop_sequence, stop_id, arrival_time, arrival_delay, arrival_uncertainty,
             departure_time, departure_delay, departure_uncertainty, schedule_relationship)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )?;
    for stu in &update.stop_time_updates {
        let arrival = stu.arrival.unwrap_or_default();
        let departure = stu.departure.unwrap_or_default();
        stmt.execute(params![
            update.trip_update_id.raw(),
            stu.stop_sequence,
            stu.stop_id.as_ref().map(|id| id.raw()),
            arrival.time,
            arrival.delay,
            arrival.uncertainty,
            departure.time,
            departure.delay,
            departure.uncertainty,
            stu.schedule_relationship.as_ref().map(enum_name),
        ])?;
    }
    Ok(())
}

pub fn fetch_all_trip_updates(conn: &Connection) -> duckdb::Result<Vec<TripUpdate>> {
    let mut stmt = conn.prepare(
        "SELECT trip_update_id, trip_id, trip_route_id, trip_direction_id, trip_start_time,
                trip_start_date, trip_schedule_relationship, last_updated_timestamp
         FROM realtime_trip_updates",
    )?;
    let headers: Vec<TripUpdate> = stmt
        .query_map([], |row| {
            let start_date: Option<i32> = row.get(5)?;
            Ok(TripUpdate {
                trip_update_id: Id::new(row.get::<_, String>(0)?),
                trip_id: Id::new(row.get::<_, String>(1)?),
                trip_route_id: row.get::<_, Option<String>>(2)?.map(Id::new),
                trip_direction_id: row.get(3)?,
                trip_start_time: row.get(4)?,
                trip_start_date: start_date.map(|d| {
                    chrono::NaiveDate::parse_from_str(&d.to_string(), "%Y%m%d")
                        .unwrap_or_default()
                }),
                trip_schedule_relationship: row
                    .get::<_, Option<String>>(6)?
                    .and_then(|s| schedule_relationship_from_name(&s)),
                last_updated_timestamp: row.get(7)?,
                stop_time_updates: Vec::new(),
            })
        })?
        .collect::<duckdb::Result<_>>()?;

    let mut result = Vec::with_capacity(headers.len());
    for mut update in headers {
        update.stop_time_updates = fetch_stop_time_updates(conn, &update.trip_update_id)?;
        result.push(update);
    }
    Ok(result)
}

fn fetch_stop_time_updates(
    conn: &Connection,
    trip_update_id: &TripUpdateId,
) -> duckdb::Result<Vec<StopTimeUpdate>> {
    let mut stmt = conn.prepare(
        "SELECT stop_sequence, stop_id, arrival_time, arrival_delay, arrival_uncertainty,
                departure_time, departure_delay, departure_uncertainty, schedule_relationship
         FROM realtime_trip_stop_time_updates
         WHERE trip_update_id = ?
         ORDER BY stop_sequence ASC",
    )?;
    let rows = stmt.query_map(params![trip_update_id.raw()], |row| {
        let arrival = StopTimeEvent {
            time: row.get(2)?,
            delay: row.get(3)?,
            uncertainty: row.get(4)?,
        };
        let departure = StopTimeEvent {
            time: row.get(5)?,
            delay: row.get(6)?,
            uncertainty: row.get(7)?,
        };
        Ok(StopTimeUpdate {
            trip_update_id: trip_update_id.clone(),
            stop_sequence: row.get::<_, i32>(0)? as u32,
            stop_id: row.get::<_, Option<String>>(1)?.map(Id::new),
            arrival: (!arrival.is_empty()).then_some(arrival),
            departure: (!departure.is_empty()).then_some(departure),
            schedule_relationship: row
                .get::<_, Option<String>>(8)?
                .and_then(|s| schedule_relationship_from_name(&s)),
        })
    })?;
    rows.collect()
}

fn schedule_relationship_from_name(name: &str) -> Option<ScheduleRelationship> {
    Some(match name {
        "Scheduled" => ScheduleRelationship::Scheduled,
        "Added" => ScheduleRelationship::Added,
        "Unscheduled" => ScheduleRelationship::Unscheduled,
        "Canceled" => ScheduleRelationship::Canceled,
        "Duplicated" => ScheduleRelationship::Duplicated,
        "Deleted" => ScheduleRelationship::Deleted,
        "Skipped" => ScheduleRelationship::Skipped,
        "NoData" => ScheduleRelationship::NoData,
        _ => return None,
    })
}

// -------------------------------------------------------------- service alerts

pub fn delete_service_alert(conn: &Connection, id: &ServiceAlertId) -> duckdb::Result<()> {
    conn.execute(
        "DELETE FROM realtime_alert_active_periods WHERE service_alert_id = ?",
        params![id.raw()],
    )?;
    conn.execute(
        "DELETE FROM realtime_alert_informed_entities WHERE service_alert_id = ?",
        params![id.raw()],
    )?;
    conn.execute(
        "DELETE FROM realtime_service_alerts WHERE service_alert_id = ?",
        params![id.raw()],
    )?;
    Ok(())
}

pub fn insert_service_alert(conn: &Connection, alert: &ServiceAlert) -> duckdb::Result<()> {
    delete_service_alert(conn, &alert.service_alert_id)?;

    conn.execute(
        "INSERT INTO realtime_service_alerts
            (service_alert_id, cause, effect, url, header_text, description_text,
             tts_header_text, tts_description_text, severity_level, last_updated_timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            alert.service_alert_id.raw(),
            enum_name(&alert.cause),
            enum_name(&alert.effect),
            alert.url,
            alert.header_text,
            alert.description_text,
            alert.tts_header_text,
            alert.tts_description_text,
            alert.severity_level,
            alert.last_updated_timestamp,
        ],
    )?;

    let mut periods = conn.prepare(
        "INSERT INTO realtime_alert_active_periods
            (service_alert_id, start_timestamp, end_timestamp, last_updated_timestamp)
         VALUES (?, ?, ?, ?)",
    )?;
    for period in &alert.active_periods {
        periods.execute(params![
            alert.service_alert_id.raw(),
            period.start_timestamp,
            period.end_timestamp,
            alert.last_updated_timestamp,
        ])?;
    }

    let mut entities = conn.prepare(
        "INSERT INTO realtime_alert_informed_entities
            (service_alert_id, agency_id, route_id, route_type, trip_id, stop_id, last_updated_timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )?;
    for entity in &alert.informed_entities {
        entities.execute(params![
            alert.service_alert_id.raw(),
            entity.agency_id.as_ref().map(|id| id.raw()),
            entity.route_id.as_ref().map(|id| id.raw()),
            entity.route_type,
            entity.trip_id.as_ref().map(|id| id.raw()),
            entity.stop_id.as_ref().map(|id| id.raw()),
            alert.last_updated_timestamp,
        ])?;
    }
    Ok(())
}

pub fn fetch_all_service_alerts(conn: &Connection) -> duckdb::Result<Vec<ServiceAlert>> {
    let mut stmt = conn.prepare(
        "SELECT service_alert_id, cause, effect, url, header_text, description_text,
                tts_header_text, tts_description_text, severity_level, last_updated_timestamp
         FROM realtime_service_alerts",
    )?;
    let headers: Vec<ServiceAlert> = stmt
        .query_map([], |row| {
            Ok(ServiceAlert {
                service_alert_id: Id::new(row.get::<_, String>(0)?),
                cause: alert_cause_from_name(&row.get::<_, String>(1)?),
                effect: alert_effect_from_name(&row.get::<_, String>(2)?),
                url: row.get(3)?,
                header_text: row.get(4)?,
                description_text: row.get(5)?,
                tts_header_text: row.get(6)?,
                tts_description_text: row.get(7)?,
                severity_level: row.get(8)?,
                last_updated_timestamp: row.get(9)?,
                active_periods: Vec::new(),
                informed_entities: Vec::new(),
            })
        })?
        .collect::<duckdb::Result<_>>()?;

    let mut result = Vec::with_capacity(headers.len());
    for mut alert in headers {
        alert.active_periods = fetch_active_periods(conn, &alert.service_alert_id)?;
        alert.informed_entities = fetch_informed_entities(conn, &alert.service_alert_id)?;
        result.push(alert);
    }
    Ok(result)
}

fn fetch_active_periods(
    conn: &Connection,
    service_alert_id: &ServiceAlertId,
) -> duckdb::Result<Vec<AlertActivePeriod>> {
    let mut stmt = conn.prepare(
        "SELECT start_timestamp, end_timestamp FROM realtime_alert_active_periods
         WHERE service_alert_id = ?",
    )?;
    let rows = stmt.query_map(params![service_alert_id.raw()], |row| {
        Ok(AlertActivePeriod {
            service_alert_id: service_alert_id.clone(),
            start_timestamp: row.get(0)?,
            end_timestamp: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn fetch_informed_entities(
    conn: &Connection,
    service_alert_id: &ServiceAlertId,
) -> duckdb::Result<Vec<AlertInformedEntity>> {
    let mut stmt = conn.prepare(
        "SELECT agency_id, route_id, route_type, trip_id, stop_id
         FROM realtime_alert_informed_entities
         WHERE service_alert_id = ?",
    )?;
    let rows = stmt.query_map(params![service_alert_id.raw()], |row| {
        Ok(AlertInformedEntity {
            service_alert_id: service_alert_id.clone(),
            agency_id: row.get::<_, Option<String>>(0)?.map(Id::new),
            route_id: row.get::<_, Option<String>>(1)?.map(Id::new),
            route_type: row.get(2)?,
            trip_id: row.get::<_, Option<String>>(3)?.map(Id::new),
            stop_id: row.get::<_, Option<String>>(4)?.map(Id::new),
        })
    })?;
    rows.collect()
}

fn alert_cause_from_name(name: &str) -> AlertCause {
    match name {
        "OtherCause" => AlertCause::OtherCause,
        "TechnicalProblem" => AlertCause::TechnicalProblem,
        "Strike" => AlertCause::Strike,
        "Demonstration" => AlertCause::Demonstration,
        "Accident" => AlertCause::Accident,
        "Holiday" => AlertCause::Holiday,
        "Weather" => AlertCause::Weather,
        "Maintenance" => AlertCause::Maintenance,
        "Construction" => AlertCause::Construction,
        "PoliceActivity" => AlertCause::PoliceActivity,
        "MedicalEmergency" => AlertCause::MedicalEmergency,
        _ => AlertCause::UnknownCause,
    }
}

fn alert_effect_from_name(name: &str) -> AlertEffect {
    match name {
        "ReducedService" => AlertEffect::ReducedService,
        "SignificantDelays" => AlertEffect::SignificantDelays,
        "Detour" => AlertEffect::Detour,
        "AdditionalService" => AlertEffect::AdditionalService,
        "ModifiedService" => AlertEffect::ModifiedService,
        "OtherEffect" => AlertEffect::OtherEffect,
        "StopMoved" => AlertEffect::StopMoved,
        "NoEffect" => AlertEffect::NoEffect,
        "AccessibilityIssue" => AlertEffect::AccessibilityIssue,
        "NoService" => AlertEffect::NoService,
        _ => AlertEffect::UnknownEffect,
    }
}

// ----------------------------------------------------------- vehicle positions

pub fn delete_vehicle_position(conn: &Connection, id: &VehiclePositionId) -> duckdb::Result<()> {
    conn.execute(
        "DELETE FROM realtime_vehicle_positions WHERE vehicle_position_id = ?",
        params![id.raw()],
    )?;
    Ok(())
}

pub fn insert_vehicle_position(conn: &Connection, position: &VehiclePosition) -> duckdb::Result<()> {
    delete_vehicle_position(conn, &position.vehicle_position_id)?;
    conn.execute(
        "INSERT INTO realtime_vehicle_positions
            (vehicle_position_id, trip_id, trip_route_id, trip_start_date, vehicle_id, vehicle_label,
             position_latitude, position_longitude, position_bearing, position_speed,
             current_stop_sequence, stop_id, current_status, timestamp, congestion_level,
             last_updated_timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            position.vehicle_position_id.raw(),
            position.trip_id.as_ref().map(|id| id.raw()),
            position.trip_route_id.as_ref().map(|id| id.raw()),
            position
                .trip_start_date
                .map(|d| d.format("%Y%m%d").to_string().parse::<i32>().unwrap_or_default()),
            position.vehicle_id,
            position.vehicle_label,
            position.latitude,
            position.longitude,
            position.bearing,
            position.speed,
            position.current_stop_sequence,
            position.stop_id.as_ref().map(|id| id.raw()),
            position.current_status.as_ref().map(enum_name),
            position.timestamp,
            position.congestion_level.as_ref().map(enum_name),
            position.last_updated_timestamp,
        ],
    )?;
    Ok(())
}

pub fn fetch_all_vehicle_positions(conn: &Connection) -> duckdb::Result<Vec<VehiclePosition>> {
    let mut stmt = conn.prepare(
        "SELECT vehicle_position_id, trip_id, trip_route_id, trip_start_date, vehicle_id, vehicle_label,
                position_latitude, position_longitude, position_bearing, position_speed,
                current_stop_sequence, stop_id, current_status, timestamp, congestion_level,
                last_updated_timestamp
         FROM realtime_vehicle_positions",
    )?;
    let rows = stmt.query_map([], |row| {
        let start_date: Option<i32> = row.get(3)?;
        let current_stop_sequence: Option<i32> = row.get(10)?;
        Ok(VehiclePosition {
            vehicle_position_id: Id::new(row.get::<_, String>(0)?),
            trip_id: row.get::<_, Option<String>>(1)?.map(Id::new),
            trip_route_id: row.get::<_, Option<String>>(2)?.map(Id::new),
            trip_start_date: start_date.map(|d| {
                chrono::NaiveDate::parse_from_str(&d.to_string(), "%Y%m%d").unwrap_or_default()
            }),
            vehicle_id: row.get(4)?,
            vehicle_label: row.get(5)?,
            latitude: row.get(6)?,
            longitude: row.get(7)?,
            bearing: row.get(8)?,
            speed: row.get(9)?,
            current_stop_sequence: current_stop_sequence.map(|s| s as u32),
            stop_id: row.get::<_, Option<String>>(11)?.map(Id::new),
            current_status: row
                .get::<_, Option<String>>(12)?
                .and_then(|s| vehicle_stop_status_from_name(&s)),
            timestamp: row.get(13)?,
            congestion_level: row
                .get::<_, Option<String>>(14)?
                .and_then(|s| congestion_level_from_name(&s)),
            last_updated_timestamp: row.get(15)?,
        })
    })?;
    rows.collect()
}

fn vehicle_stop_status_from_name(name: &str) -> Option<VehicleStopStatus> {
    Some(match name {
        "IncomingAt" => VehicleStopStatus::IncomingAt,
        "StoppedAt" => VehicleStopStatus::StoppedAt,
        "InTransitTo" => VehicleStopStatus::InTransitTo,
        _ => return None,
    })
}

fn congestion_level_from_name(name: &str) -> Option<CongestionLevel> {
    Some(match name {
        "RunningSmoothly" => CongestionLevel::RunningSmoothly,
        "StopAndGo" => CongestionLevel::StopAndGo,
        "Congestion" => CongestionLevel::Congestion,
        "SevereCongestion" => CongestionLevel::SevereCongestion,
        "UnknownCongestionLevel" => CongestionLevel::UnknownCongestionLevel,
        _ => return None,
    })
}

// ------------------------------------------------------------------- age-out

/// Deletes rows at or older than `now_unix - max_age_seconds` from every
/// realtime table (a row timestamped exactly at the cutoff does not
/// survive the sweep). Child tables are keyed by the same id and
/// timestamp as their parent, so each table ages out independently
/// rather than cascading.
pub fn age_out(conn: &Connection, now_unix: i64, max_age_seconds: i64) -> duckdb::Result<u64> {
    let cutoff = now_unix - max_age_seconds;
    let mut deleted = 0u64;

    deleted += conn.execute(
        "DELETE FROM realtime_trip_stop_time_updates WHERE trip_update_id IN
            (SELECT trip_update_id FROM realtime_trip_updates WHERE last_updated_timestamp <= ?)",
        params![cutoff],
    )? as u64;
    deleted += conn.execute(
        "DELETE FROM realtime_trip_updates WHERE last_updated_timestamp <= ?",
        params![cutoff],
    )? as u64;

    deleted += conn.execute(
        "DELETE FROM realtime_alert_active_periods WHERE last_updated_timestamp <= ?",
        params![cutoff],
    )? as u64;
    deleted += conn.execute(
        "DELETE FROM realtime_alert_informed_entities WHERE last_updated_timestamp <= ?",
        params![cutoff],
    )? as u64;
    deleted += conn.execute(
        "DELETE FROM realtime_service_alerts WHERE last_updated_timestamp <= ?",
        params![cutoff],
    )? as u64;

    deleted += conn.execute(
        "DELETE FROM realtime_vehicle_positions WHERE last_updated_timestamp <= ?",
        params![cutoff],
    )? as u64;

    Ok(deleted)
}

pub fn clear_all(conn: &Connection) -> duckdb::Result<()> {
    conn.execute_batch(
        "DELETE FROM realtime_trip_stop_time_updates;
         DELETE FROM realtime_trip_updates;
         DELETE FROM realtime_alert_active_periods;
         DELETE FROM realtime_alert_informed_entities;
         DELETE FROM realtime_service_alerts;
         DELETE FROM realtime_vehicle_positions;",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{AgencyId, RouteId, StopId, TripId};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::schema::bootstrap(&conn).unwrap();
        conn
    }

    fn trip_update(id: &str, last_updated_timestamp: i64) -> TripUpdate {
        TripUpdate {
            trip_update_id: TripUpdateId::new(id.to_owned()),
            trip_id: TripId::new("T1".to_owned()),
            trip_route_id: None,
            trip_direction_id: None,
            trip_start_time: None,
            trip_start_date: None,
            trip_schedule_relationship: None,
            last_updated_timestamp,
            stop_time_updates: vec![StopTimeUpdate {
                trip_update_id: TripUpdateId::new(id.to_owned()),
                stop_sequence: 1,
                stop_id: Some(StopId::new("S1".to_owned())),
                arrival: None,
                departure: None,
                schedule_relationship: None,
            }],
        }
    }

    #[test]
    fn age_out_removes_a_row_exactly_at_the_cutoff() {
        let conn = conn();
        insert_trip_update(&conn, &trip_update("TU1", 1_000)).unwrap();

        let removed = age_out(&conn, 1_000 + 60, 60).unwrap();
        assert_eq!(removed, 2, "parent row plus its one stop_time_update child");
        assert!(fetch_all_trip_updates(&conn).unwrap().is_empty());
    }

    #[test]
    fn age_out_keeps_a_row_one_second_inside_the_window() {
        let conn = conn();
        insert_trip_update(&conn, &trip_update("TU1", 1_000)).unwrap();

        let removed = age_out(&conn, 1_000 + 59, 60).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(fetch_all_trip_updates(&conn).unwrap().len(), 1);
    }

    #[test]
    fn inserting_the_same_trip_update_id_twice_upserts_by_replace() {
        let conn = conn();
        insert_trip_update(&conn, &trip_update("TU1", 1_000)).unwrap();
        insert_trip_update(&conn, &trip_update("TU1", 2_000)).unwrap();

        let rows = fetch_all_trip_updates(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_updated_timestamp, 2_000);
        assert_eq!(rows[0].stop_time_updates.len(), 1);
    }

    #[test]
    fn insert_then_delete_trip_update_removes_parent_and_children() {
        let conn = conn();
        let id = TripUpdateId::new("TU1".to_owned());
        insert_trip_update(&conn, &trip_update("TU1", 1_000)).unwrap();

        delete_trip_update(&conn, &id).unwrap();
        assert!(fetch_all_trip_updates(&conn).unwrap().is_empty());
    }

    fn service_alert(id: &str) -> ServiceAlert {
        ServiceAlert {
            service_alert_id: ServiceAlertId::new(id.to_owned()),
            cause: AlertCause::Weather,
            effect: AlertEffect::Detour,
            url: None,
            header_text: Some("delays".to_owned()),
            description_text: None,
            tts_header_text: None,
            tts_description_text: None,
            severity_level: model::alert::UNKNOWN_SEVERITY.to_owned(),
            last_updated_timestamp: 1_000,
            active_periods: vec![AlertActivePeriod {
                service_alert_id: ServiceAlertId::new(id.to_owned()),
                start_timestamp: Some(1_000),
                end_timestamp: None,
            }],
            informed_entities: vec![AlertInformedEntity {
                service_alert_id: ServiceAlertId::new(id.to_owned()),
                agency_id: Some(AgencyId::new("A1".to_owned())),
                route_id: None,
                route_type: None,
                trip_id: None,
                stop_id: None,
            }],
        }
    }

    #[test]
    fn inserting_the_same_service_alert_id_twice_upserts_by_replace() {
        let conn = conn();
        insert_service_alert(&conn, &service_alert("AL1")).unwrap();
        insert_service_alert(&conn, &service_alert("AL1")).unwrap();

        let rows = fetch_all_service_alerts(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].active_periods.len(), 1);
        assert_eq!(rows[0].informed_entities.len(), 1);
    }

    #[test]
    fn delete_service_alert_removes_parent_and_children() {
        let conn = conn();
        let id = ServiceAlertId::new("AL1".to_owned());
        insert_service_alert(&conn, &service_alert("AL1")).unwrap();

        delete_service_alert(&conn, &id).unwrap();
        assert!(fetch_all_service_alerts(&conn).unwrap().is_empty());
    }

    fn vehicle_position(id: &str, last_updated_timestamp: i64) -> VehiclePosition {
        VehiclePosition {
            vehicle_position_id: VehiclePositionId::new(id.to_owned()),
            trip_id: Some(TripId::new("T1".to_owned())),
            trip_route_id: Some(RouteId::new("R1".to_owned())),
            trip_start_date: None,
            vehicle_id: Some("V1".to_owned()),
            vehicle_label: None,
            latitude: Some(54.32),
            longitude: Some(10.14),
            bearing: None,
            speed: None,
            current_stop_sequence: None,
            stop_id: None,
            current_status: None,
            timestamp: None,
            congestion_level: None,
            last_updated_timestamp,
        }
    }

    #[test]
    fn inserting_the_same_vehicle_position_id_twice_upserts_by_replace() {
        let conn = conn();
        insert_vehicle_position(&conn, &vehicle_position("VP1", 1_000)).unwrap();
        insert_vehicle_position(&conn, &vehicle_position("VP1", 2_000)).unwrap();

        let rows = fetch_all_vehicle_positions(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_updated_timestamp, 2_000);
    }

    #[test]
    fn age_out_ages_vehicle_positions_and_alerts_too() {
        let conn = conn();
        insert_vehicle_position(&conn, &vehicle_position("VP1", 1_000)).unwrap();
        insert_service_alert(&conn, &service_alert("AL1")).unwrap();

        age_out(&conn, 1_000 + 60, 60).unwrap();

        assert!(fetch_all_vehicle_positions(&conn).unwrap().is_empty());
        assert!(fetch_all_service_alerts(&conn).unwrap().is_empty());
    }
}
