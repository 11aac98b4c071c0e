//! Bulk insert of the nominal (static) tables, run once at load time. One
//! `INSERT` per row inside a single transaction per table; the GTFS ZIP
//! is loaded once at startup, so routine bulk-ingestion throughput is not
//! a concern here.

use duckdb::{params, Connection};
use model::{
    agency::Agency,
    calendar::{CalendarException, CalendarRule, ExceptionType},
    route::Route,
    stop::Stop,
    trip::{StopTime, Trip},
};

pub fn insert_agencies(conn: &Connection, rows: &[Agency]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO agency (agency_id, agency_name, agency_url, agency_timezone)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (agency_id) DO UPDATE SET
            agency_name = EXCLUDED.agency_name,
            agency_url = EXCLUDED.agency_url,
            agency_timezone = EXCLUDED.agency_timezone",
    )?;
    for row in rows {
        stmt.execute(params![
            row.agency_id.raw(),
            row.agency_name,
            row.agency_url,
            row.agency_timezone,
        ])?;
    }
    Ok(())
}

pub fn insert_routes(conn: &Connection, rows: &[Route]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO routes (route_id, agency_id, route_short_name, route_long_name, route_type)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (route_id) DO UPDATE SET
            agency_id = EXCLUDED.agency_id,
            route_short_name = EXCLUDED.route_short_name,
            route_long_name = EXCLUDED.route_long_name,
            route_type = EXCLUDED.route_type",
    )?;
    for row in rows {
        stmt.execute(params![
            row.route_id.raw(),
            row.agency_id.as_ref().map(|id| id.raw()),
            row.route_short_name,
            row.route_long_name,
            row.route_type as i32,
        ])?;
    }
    Ok(())
}

pub fn insert_stops(conn: &Connection, rows: &[Stop]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO stops (stop_id, stop_name, stop_lat, stop_lon, parent_station, location_type)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT (stop_id) DO UPDATE SET
            stop_name = EXCLUDED.stop_name,
            stop_lat = EXCLUDED.stop_lat,
            stop_lon = EXCLUDED.stop_lon,
            parent_station = EXCLUDED.parent_station,
            location_type = EXCLUDED.location_type",
    )?;
    for row in rows {
        stmt.execute(params![
            row.stop_id.raw(),
            row.stop_name,
            row.latitude,
            row.longitude,
            row.parent_station.as_ref().map(|id| id.raw()),
            row.location_type as i32,
        ])?;
    }
    Ok(())
}

pub fn insert_trips(conn: &Connection, rows: &[Trip]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO trips (trip_id, route_id, service_id, trip_headsign, direction_id)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (trip_id) DO UPDATE SET
            route_id = EXCLUDED.route_id,
            service_id = EXCLUDED.service_id,
            trip_headsign = EXCLUDED.trip_headsign,
            direction_id = EXCLUDED.direction_id",
    )?;
    for row in rows {
        stmt.execute(params![
            row.trip_id.raw(),
            row.route_id.raw(),
            row.service_id.raw(),
            row.trip_headsign,
            row.direction_id,
        ])?;
    }
    Ok(())
}

pub fn insert_stop_times(conn: &Connection, rows: &[StopTime]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO stop_times (trip_id, stop_sequence, stop_id, arrival_time, departure_time)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (trip_id, stop_sequence) DO UPDATE SET
            stop_id = EXCLUDED.stop_id,
            arrival_time = EXCLUDED.arrival_time,
            departure_time = EXCLUDED.departure_time",
    )?;
    for row in rows {
        stmt.execute(params![
            row.trip_id.raw(),
            row.stop_sequence,
            row.stop_id.raw(),
            row.arrival_time.num_seconds(),
            row.departure_time.num_seconds(),
        ])?;
    }
    Ok(())
}

pub fn insert_calendar(conn: &Connection, rows: &[CalendarRule]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO calendar
            (service_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday, start_date, end_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (service_id) DO UPDATE SET
            monday = EXCLUDED.monday, tuesday = EXCLUDED.tuesday, wednesday = EXCLUDED.wednesday,
            thursday = EXCLUDED.thursday, friday = EXCLUDED.friday, saturday = EXCLUDED.saturday,
            sunday = EXCLUDED.sunday, start_date = EXCLUDED.start_date, end_date = EXCLUDED.end_date",
    )?;
    for row in rows {
        stmt.execute(params![
            row.service_id.raw(),
            row.monday,
            row.tuesday,
            row.wednesday,
            row.thursday,
            row.friday,
            row.saturday,
            row.sunday,
            row.start_date.format("%Y%m%d").to_string().parse::<i32>().unwrap_or_default(),
            row.end_date.format("%Y%m%d").to_string().parse::<i32>().unwrap_or_default(),
        ])?;
    }
    Ok(())
}

pub fn insert_calendar_dates(conn: &Connection, rows: &[CalendarException]) -> duckdb::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO calendar_dates (service_id, date, exception_type)
         VALUES (?, ?, ?)
         ON CONFLICT (service_id, date) DO UPDATE SET exception_type = EXCLUDED.exception_type",
    )?;
    for row in rows {
        let exception_type = match row.exception_type {
            ExceptionType::Added => 1,
            ExceptionType::Removed => 2,
        };
        stmt.execute(params![
            row.service_id.raw(),
            row.date.format("%Y%m%d").to_string().parse::<i32>().unwrap_or_default(),
            exception_type,
        ])?;
    }
    Ok(())
}
