//! The monitor join query: Trip + Route + first-stop StopTime + Stop,
//! left-joined against `realtime_trip_updates` for the active
//! `service_id`s of a given operation day.

use std::collections::HashSet;

use chrono::NaiveDate;
use duckdb::{params, Connection};
use model::ServiceId;

#[derive(Debug, Clone)]
pub struct MonitorRow {
    pub operation_day: NaiveDate,
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

pub fn fetch_monitor_trips(
    conn: &Connection,
    operation_day: NaiveDate,
    service_ids: &HashSet<ServiceId>,
) -> duckdb::Result<Vec<MonitorRow>> {
    if service_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT r.agency_id, t.route_id, r.route_short_name, t.trip_id, t.trip_headsign,
                t.direction_id, st.stop_id, s.stop_name, st.departure_time,
                ru.trip_update_id IS NOT NULL AS realtime_available,
                ru.last_updated_timestamp
         FROM trips t
         JOIN routes r ON r.route_id = t.route_id
         JOIN stop_times st ON st.trip_id = t.trip_id AND st.stop_sequence = 1
         JOIN stops s ON s.stop_id = st.stop_id
         LEFT JOIN realtime_trip_updates ru ON ru.trip_id = t.trip_id
         WHERE t.service_id IN (SELECT * FROM UNNEST(?))
         ORDER BY st.departure_time ASC",
    )?;
    let ids: Vec<String> = service_ids.iter().map(|id| id.raw()).collect();
    let rows = stmt.query_map(params![ids], |row| {
        Ok(MonitorRow {
            operation_day,
            agency_id: row.get(0)?,
            route_id: row.get(1)?,
            route_short_name: row.get(2)?,
            trip_id: row.get(3)?,
            trip_headsign: row.get(4)?,
            direction_id: row.get(5)?,
            start_stop_id: row.get(6)?,
            start_stop_name: row.get(7)?,
            start_time: row.get(8)?,
            realtime_available: row.get(9)?,
            realtime_last_update: row.get(10)?,
        })
    })?;
    rows.collect()
}
