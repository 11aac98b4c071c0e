//! Queries backing the Nominal Index build.

use std::collections::HashSet;

use chrono::NaiveDate;
use duckdb::Connection;
use model::{
    calendar::{CalendarException, CalendarRule, ExceptionType},
    route::{Route, RouteType},
    stop::{LocationType, Stop},
    trip::{StopTime, Trip},
    RouteId, ServiceId, StopId,
};
use utility::id::Id;

fn parse_yyyymmdd(value: i32) -> NaiveDate {
    NaiveDate::parse_from_str(&value.to_string(), "%Y%m%d").unwrap_or_default()
}

pub fn fetch_calendar(conn: &Connection) -> duckdb::Result<Vec<CalendarRule>> {
    let mut stmt = conn.prepare(
        "SELECT service_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday,
                start_date, end_date
         FROM calendar",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CalendarRule {
            service_id: Id::new(row.get::<_, String>(0)?),
            monday: row.get(1)?,
            tuesday: row.get(2)?,
            wednesday: row.get(3)?,
            thursday: row.get(4)?,
            friday: row.get(5)?,
            saturday: row.get(6)?,
            sunday: row.get(7)?,
            start_date: parse_yyyymmdd(row.get(8)?),
            end_date: parse_yyyymmdd(row.get(9)?),
        })
    })?;
    rows.collect()
}

pub fn fetch_calendar_dates(conn: &Connection) -> duckdb::Result<Vec<CalendarException>> {
    let mut stmt =
        conn.prepare("SELECT service_id, date, exception_type FROM calendar_dates")?;
    let rows = stmt.query_map([], |row| {
        let exception_type: i32 = row.get(2)?;
        Ok(CalendarException {
            service_id: Id::new(row.get::<_, String>(0)?),
            date: parse_yyyymmdd(row.get(1)?),
            exception_type: if exception_type == 1 {
                ExceptionType::Added
            } else {
                ExceptionType::Removed
            },
        })
    })?;
    rows.collect()
}

/// The active-day stop sequence of the nominal trip join, ordered by
/// `stop_sequence`: one row per `(trip, stop)` rather than a nested
/// structure, since the caller (nominal index build) groups it itself.
pub struct NominalStopTimeRow {
    pub trip: Trip,
    pub stop_time: StopTime,
}

pub fn fetch_trips_for_services(
    conn: &Connection,
    service_ids: &HashSet<ServiceId>,
) -> duckdb::Result<Vec<NominalStopTimeRow>> {
    if service_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT t.trip_id, t.route_id, t.service_id, t.trip_headsign, t.direction_id,
                st.stop_sequence, st.stop_id, st.arrival_time, st.departure_time
         FROM trips t
         JOIN stop_times st ON st.trip_id = t.trip_id
         WHERE t.service_id IN (SELECT * FROM UNNEST(?))
         ORDER BY t.trip_id, st.stop_sequence ASC",
    )?;
    let ids: Vec<String> = service_ids.iter().map(|id| id.raw()).collect();
    let rows = stmt.query_map(duckdb::params![ids], |row| {
        let direction_id: Option<bool> = row.get(4)?;
        Ok(NominalStopTimeRow {
            trip: Trip {
                trip_id: Id::new(row.get::<_, String>(0)?),
                route_id: Id::new(row.get::<_, String>(1)?),
                service_id: Id::new(row.get::<_, String>(2)?),
                trip_headsign: row.get(3)?,
                direction_id,
            },
            stop_time: StopTime {
                trip_id: Id::new(row.get::<_, String>(0)?),
                stop_sequence: row.get::<_, i32>(5)? as u32,
                stop_id: Id::new(row.get::<_, String>(6)?),
                arrival_time: chrono::Duration::seconds(row.get(7)?),
                departure_time: chrono::Duration::seconds(row.get(8)?),
            },
        })
    })?;
    rows.collect()
}

pub fn fetch_all_stop_ids(conn: &Connection) -> duckdb::Result<HashSet<StopId>> {
    let mut stmt = conn.prepare("SELECT stop_id FROM stops")?;
    let rows = stmt.query_map([], |row| Ok(Id::new(row.get::<_, String>(0)?)))?;
    rows.collect()
}

pub fn fetch_all_route_ids(conn: &Connection) -> duckdb::Result<HashSet<RouteId>> {
    let mut stmt = conn.prepare("SELECT route_id FROM routes")?;
    let rows = stmt.query_map([], |row| Ok(Id::new(row.get::<_, String>(0)?)))?;
    rows.collect()
}

pub fn fetch_all_stops(conn: &Connection) -> duckdb::Result<Vec<Stop>> {
    let mut stmt =
        conn.prepare("SELECT stop_id, stop_name, stop_lat, stop_lon, parent_station, location_type FROM stops")?;
    let rows = stmt.query_map([], |row| {
        let location_type: i32 = row.get(5)?;
        Ok(Stop {
            stop_id: Id::new(row.get::<_, String>(0)?),
            stop_name: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            parent_station: row.get::<_, Option<String>>(4)?.map(Id::new),
            location_type: location_type_from_i32(location_type),
        })
    })?;
    rows.collect()
}

pub fn fetch_all_routes(conn: &Connection) -> duckdb::Result<Vec<Route>> {
    let mut stmt = conn
        .prepare("SELECT route_id, agency_id, route_short_name, route_long_name, route_type FROM routes")?;
    let rows = stmt.query_map([], |row| {
        let route_type: i32 = row.get(4)?;
        Ok(Route {
            route_id: Id::new(row.get::<_, String>(0)?),
            agency_id: row.get::<_, Option<String>>(1)?.map(Id::new),
            route_short_name: row.get(2)?,
            route_long_name: row.get(3)?,
            route_type: route_type_from_i32(route_type),
        })
    })?;
    rows.collect()
}

fn location_type_from_i32(value: i32) -> LocationType {
    match value {
        1 => LocationType::Station,
        2 => LocationType::EntranceExit,
        3 => LocationType::GenericNode,
        4 => LocationType::BoardingArea,
        _ => LocationType::Stop,
    }
}

fn route_type_from_i32(value: i32) -> RouteType {
    match value {
        0 => RouteType::Tram,
        1 => RouteType::Subway,
        2 => RouteType::Rail,
        3 => RouteType::Bus,
        4 => RouteType::Ferry,
        5 => RouteType::CableTram,
        6 => RouteType::AerialLift,
        7 => RouteType::Funicular,
        11 => RouteType::Trolleybus,
        12 => RouteType::Monorail,
        _ => RouteType::Bus,
    }
}
