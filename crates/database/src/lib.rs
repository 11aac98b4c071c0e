//! DuckDB-backed persistence for the nominal and realtime tables. Two
//! independent connections are opened against the same store file: a
//! reader used exclusively by HTTP handlers and a writer used exclusively
//! by the Flush Scheduler and the static loader, so a long write tick
//! never blocks a concurrent fetch.

use std::{collections::HashSet, path::Path};

use chrono::NaiveDate;
use duckdb::Connection;
use model::{
    agency::Agency,
    alert::ServiceAlert,
    calendar::{CalendarException, CalendarRule},
    route::Route,
    stop::Stop,
    trip::{StopTime, Trip},
    trip_update::TripUpdate,
    vehicle_position::VehiclePosition,
    RouteId, ServiceAlertId, ServiceId, StopId, TripUpdateId, VehiclePositionId,
};

pub mod queries;
pub mod schema;

pub use queries::monitor::MonitorRow;
pub use queries::nominal::NominalStopTimeRow;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Owns the connection used for all writes: static load and the realtime
/// insert/delete/age-out primitives the Flush Scheduler drains onto.
pub struct StoreWriter {
    conn: Connection,
}

impl StoreWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::bootstrap(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::bootstrap(&conn)?;
        Ok(Self { conn })
    }

    pub fn load_static(
        &self,
        agencies: &[Agency],
        routes: &[Route],
        stops: &[Stop],
        trips: &[Trip],
        stop_times: &[StopTime],
        calendar: &[CalendarRule],
        calendar_dates: &[CalendarException],
    ) -> Result<()> {
        queries::static_data::insert_agencies(&self.conn, agencies)?;
        queries::static_data::insert_routes(&self.conn, routes)?;
        queries::static_data::insert_stops(&self.conn, stops)?;
        queries::static_data::insert_trips(&self.conn, trips)?;
        queries::static_data::insert_stop_times(&self.conn, stop_times)?;
        queries::static_data::insert_calendar(&self.conn, calendar)?;
        queries::static_data::insert_calendar_dates(&self.conn, calendar_dates)?;
        Ok(())
    }

    pub fn clear_realtime_data(&self) -> Result<()> {
        queries::realtime::clear_all(&self.conn)?;
        Ok(())
    }

    pub fn insert_trip_update(&self, update: &TripUpdate) -> Result<()> {
        queries::realtime::insert_trip_update(&self.conn, update)?;
        Ok(())
    }

    pub fn delete_trip_update(&self, id: &TripUpdateId) -> Result<()> {
        queries::realtime::delete_trip_update(&self.conn, id)?;
        Ok(())
    }

    pub fn insert_service_alert(&self, alert: &ServiceAlert) -> Result<()> {
        queries::realtime::insert_service_alert(&self.conn, alert)?;
        Ok(())
    }

    pub fn delete_service_alert(&self, id: &ServiceAlertId) -> Result<()> {
        queries::realtime::delete_service_alert(&self.conn, id)?;
        Ok(())
    }

    pub fn insert_vehicle_position(&self, position: &VehiclePosition) -> Result<()> {
        queries::realtime::insert_vehicle_position(&self.conn, position)?;
        Ok(())
    }

    pub fn delete_vehicle_position(&self, id: &VehiclePositionId) -> Result<()> {
        queries::realtime::delete_vehicle_position(&self.conn, id)?;
        Ok(())
    }

    /// Deletes every realtime row last touched more than `max_age_seconds`
    /// before `now_unix`. Returns the number of rows removed, across all
    /// six realtime tables, for the Flush Scheduler's tick log line.
    pub fn age_out(&self, now_unix: i64, max_age_seconds: i64) -> Result<u64> {
        Ok(queries::realtime::age_out(&self.conn, now_unix, max_age_seconds)?)
    }
}

/// Owns the connection used for all reads: the Nominal Index build at
/// startup and every HTTP handler fetch.
pub struct StoreReader {
    conn: Connection,
}

impl StoreReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::bootstrap(&conn)?;
        Ok(Self { conn })
    }

    pub fn fetch_calendar(&self) -> Result<Vec<CalendarRule>> {
        Ok(queries::nominal::fetch_calendar(&self.conn)?)
    }

    pub fn fetch_calendar_dates(&self) -> Result<Vec<CalendarException>> {
        Ok(queries::nominal::fetch_calendar_dates(&self.conn)?)
    }

    pub fn fetch_trips_for_services(
        &self,
        service_ids: &HashSet<ServiceId>,
    ) -> Result<Vec<NominalStopTimeRow>> {
        Ok(queries::nominal::fetch_trips_for_services(&self.conn, service_ids)?)
    }

    pub fn fetch_all_stop_ids(&self) -> Result<HashSet<StopId>> {
        Ok(queries::nominal::fetch_all_stop_ids(&self.conn)?)
    }

    pub fn fetch_all_route_ids(&self) -> Result<HashSet<RouteId>> {
        Ok(queries::nominal::fetch_all_route_ids(&self.conn)?)
    }

    pub fn fetch_all_stops(&self) -> Result<Vec<Stop>> {
        Ok(queries::nominal::fetch_all_stops(&self.conn)?)
    }

    pub fn fetch_all_routes(&self) -> Result<Vec<Route>> {
        Ok(queries::nominal::fetch_all_routes(&self.conn)?)
    }

    pub fn fetch_all_trip_updates(&self) -> Result<Vec<TripUpdate>> {
        Ok(queries::realtime::fetch_all_trip_updates(&self.conn)?)
    }

    pub fn fetch_all_service_alerts(&self) -> Result<Vec<ServiceAlert>> {
        Ok(queries::realtime::fetch_all_service_alerts(&self.conn)?)
    }

    pub fn fetch_all_vehicle_positions(&self) -> Result<Vec<VehiclePosition>> {
        Ok(queries::realtime::fetch_all_vehicle_positions(&self.conn)?)
    }

    pub fn fetch_monitor_trips(
        &self,
        operation_day: NaiveDate,
        service_ids: &HashSet<ServiceId>,
    ) -> Result<Vec<MonitorRow>> {
        Ok(queries::monitor::fetch_monitor_trips(
            &self.conn,
            operation_day,
            service_ids,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::AgencyId;

    fn sample_agency() -> Agency {
        Agency {
            agency_id: AgencyId::new("A1".to_owned()),
            agency_name: "Test Transit".to_owned(),
            agency_url: "https://example.invalid".to_owned(),
            agency_timezone: "Europe/Berlin".to_owned(),
        }
    }

    #[test]
    fn writer_bootstraps_schema_and_loads_agency() {
        let writer = StoreWriter::open_in_memory().expect("open writer");
        writer
            .load_static(&[sample_agency()], &[], &[], &[], &[], &[], &[])
            .expect("load static");
    }

    #[test]
    fn age_out_removes_old_trip_update() {
        let writer = StoreWriter::open_in_memory().expect("open writer");
        let update = TripUpdate {
            trip_update_id: model::TripUpdateId::new("TU1".to_owned()),
            trip_id: model::TripId::new("T1".to_owned()),
            trip_route_id: None,
            trip_direction_id: None,
            trip_start_time: None,
            trip_start_date: None,
            trip_schedule_relationship: None,
            last_updated_timestamp: 1_000,
            stop_time_updates: Vec::new(),
        };
        writer.insert_trip_update(&update).expect("insert");
        let removed = writer.age_out(10_000, 7_200).expect("age out");
        assert_eq!(removed, 1);
    }
}
