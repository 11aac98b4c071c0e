//! Static GTFS CSV→entity loading, required to get real rows into the
//! Store Gateway for the Nominal Index to build from. Unknown columns are
//! dropped by `csv`'s struct deserialization; missing tables are simply
//! not read by the caller.

use std::io::{Read, Seek};

use chrono::NaiveDate;
use serde::Deserialize;
use utility::id::Id;

use model::{
    agency::Agency,
    calendar::{CalendarException, CalendarRule, ExceptionType},
    route::{Route, RouteType},
    stop::{LocationType, Stop},
    trip::{StopTime, Trip},
};

#[derive(Debug, thiserror::Error)]
pub enum StaticLoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The tables this engine reads out of a static GTFS ZIP (§6: "Unknown
/// columns are dropped... missing tables are skipped"). `shapes.txt`,
/// `feed_info.txt` and `transfers.txt` carry no fields the Nominal Index
/// or the matcher ever reads, so they are not loaded.
#[derive(Debug, Default)]
pub struct StaticBundle {
    pub agencies: Vec<Agency>,
    pub routes: Vec<Route>,
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub calendar: Vec<CalendarRule>,
    pub calendar_dates: Vec<CalendarException>,
}

/// Reads every known CSV table out of a GTFS ZIP bundle, skipping tables
/// whose file is absent from the archive rather than failing the whole
/// load (§6: "missing tables are skipped").
pub fn load_zip(reader: impl Read + Seek) -> Result<StaticBundle, StaticLoadError> {
    let mut archive = zip::ZipArchive::new(reader)?;

    fn read_entry(
        archive: &mut zip::ZipArchive<impl Read + Seek>,
        name: &str,
    ) -> Result<Option<Vec<u8>>, StaticLoadError> {
        match archive.by_name(name) {
            Ok(mut entry) => {
                let mut bytes = Vec::new();
                entry.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(why) => Err(why.into()),
        }
    }

    let mut bundle = StaticBundle::default();
    if let Some(bytes) = read_entry(&mut archive, "agency.txt")? {
        bundle.agencies = load_agencies(bytes.as_slice())?;
    }
    if let Some(bytes) = read_entry(&mut archive, "routes.txt")? {
        bundle.routes = load_routes(bytes.as_slice())?;
    }
    if let Some(bytes) = read_entry(&mut archive, "stops.txt")? {
        bundle.stops = load_stops(bytes.as_slice())?;
    }
    if let Some(bytes) = read_entry(&mut archive, "trips.txt")? {
        bundle.trips = load_trips(bytes.as_slice())?;
    }
    if let Some(bytes) = read_entry(&mut archive, "stop_times.txt")? {
        bundle.stop_times = load_stop_times(bytes.as_slice())?;
    }
    if let Some(bytes) = read_entry(&mut archive, "calendar.txt")? {
        bundle.calendar = load_calendar(bytes.as_slice())?;
    }
    if let Some(bytes) = read_entry(&mut archive, "calendar_dates.txt")? {
        bundle.calendar_dates = load_calendar_dates(bytes.as_slice())?;
    }

    Ok(bundle)
}

#[derive(Deserialize)]
struct AgencyRow {
    #[serde(default)]
    agency_id: Option<String>,
    agency_name: String,
    agency_url: String,
    agency_timezone: String,
}

#[derive(Deserialize)]
struct RouteRow {
    route_id: String,
    agency_id: Option<String>,
    route_short_name: Option<String>,
    route_long_name: Option<String>,
    route_type: u8,
}

fn route_type_from_gtfs(code: u8) -> RouteType {
    match code {
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

#[derive(Deserialize)]
struct StopRow {
    stop_id: String,
    stop_name: Option<String>,
    stop_lat: Option<f64>,
    stop_lon: Option<f64>,
    parent_station: Option<String>,
    #[serde(default)]
    location_type: Option<u8>,
}

fn location_type_from_gtfs(code: Option<u8>) -> LocationType {
    match code {
        Some(1) => LocationType::Station,
        Some(2) => LocationType::EntranceExit,
        Some(3) => LocationType::GenericNode,
        Some(4) => LocationType::BoardingArea,
        _ => LocationType::Stop,
    }
}

#[derive(Deserialize)]
struct TripRow {
    route_id: String,
    service_id: String,
    trip_id: String,
    trip_headsign: Option<String>,
    #[serde(default)]
    direction_id: Option<u8>,
}

#[derive(Deserialize)]
struct StopTimeRow {
    trip_id: String,
    arrival_time: String,
    departure_time: String,
    stop_id: String,
    stop_sequence: u32,
}

#[derive(Deserialize)]
struct CalendarRow {
    service_id: String,
    monday: u8,
    tuesday: u8,
    wednesday: u8,
    thursday: u8,
    friday: u8,
    saturday: u8,
    sunday: u8,
    #[serde(deserialize_with = "utility::serde::date_time::deserialize_yyyymmdd")]
    start_date: NaiveDate,
    #[serde(deserialize_with = "utility::serde::date_time::deserialize_yyyymmdd")]
    end_date: NaiveDate,
}

#[derive(Deserialize)]
struct CalendarDateRow {
    service_id: String,
    #[serde(deserialize_with = "utility::serde::date_time::deserialize_yyyymmdd")]
    date: NaiveDate,
    exception_type: u8,
}

/// `agency_id` is optional in `agency.txt` when the feed has exactly one
/// agency; such rows are given the empty string as their id, matching the
/// implicit single-agency convention every other GTFS table relies on when
/// it omits `agency_id` itself.
pub fn load_agencies(reader: impl Read) -> Result<Vec<Agency>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<AgencyRow>()
        .map(|row| {
            let row = row?;
            Ok(Agency {
                agency_id: Id::new(row.agency_id.unwrap_or_default()),
                agency_name: row.agency_name,
                agency_url: row.agency_url,
                agency_timezone: row.agency_timezone,
            })
        })
        .collect()
}

pub fn load_routes(reader: impl Read) -> Result<Vec<Route>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<RouteRow>()
        .map(|row| {
            let row = row?;
            Ok(Route {
                route_id: Id::new(row.route_id),
                agency_id: row.agency_id.map(Id::new),
                route_short_name: row.route_short_name,
                route_long_name: row.route_long_name,
                route_type: route_type_from_gtfs(row.route_type),
            })
        })
        .collect()
}

pub fn load_stops(reader: impl Read) -> Result<Vec<Stop>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<StopRow>()
        .map(|row| {
            let row = row?;
            Ok(Stop {
                stop_id: Id::new(row.stop_id),
                stop_name: row.stop_name,
                latitude: row.stop_lat,
                longitude: row.stop_lon,
                parent_station: row.parent_station.map(Id::new),
                location_type: location_type_from_gtfs(row.location_type),
            })
        })
        .collect()
}

pub fn load_trips(reader: impl Read) -> Result<Vec<Trip>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<TripRow>()
        .map(|row| {
            let row = row?;
            Ok(Trip {
                trip_id: Id::new(row.trip_id),
                route_id: Id::new(row.route_id),
                service_id: Id::new(row.service_id),
                trip_headsign: row.trip_headsign,
                direction_id: row.direction_id.map(|d| d == 1),
            })
        })
        .collect()
}

pub fn load_stop_times(reader: impl Read) -> Result<Vec<StopTime>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<StopTimeRow>()
        .map(|row| {
            let row = row?;
            Ok(StopTime {
                trip_id: Id::new(row.trip_id),
                stop_sequence: row.stop_sequence,
                stop_id: Id::new(row.stop_id),
                arrival_time: utility::serde::date_time::parse_gtfs_time_of_day(&row.arrival_time)
                    .unwrap_or_default(),
                departure_time: utility::serde::date_time::parse_gtfs_time_of_day(&row.departure_time)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

pub fn load_calendar(reader: impl Read) -> Result<Vec<CalendarRule>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<CalendarRow>()
        .map(|row| {
            let row = row?;
            Ok(CalendarRule {
                service_id: Id::new(row.service_id),
                monday: row.monday == 1,
                tuesday: row.tuesday == 1,
                wednesday: row.wednesday == 1,
                thursday: row.thursday == 1,
                friday: row.friday == 1,
                saturday: row.saturday == 1,
                sunday: row.sunday == 1,
                start_date: row.start_date,
                end_date: row.end_date,
            })
        })
        .collect()
}

pub fn load_calendar_dates(reader: impl Read) -> Result<Vec<CalendarException>, StaticLoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<CalendarDateRow>()
        .map(|row| {
            let row = row?;
            Ok(CalendarException {
                service_id: Id::new(row.service_id),
                date: row.date,
                exception_type: if row.exception_type == 1 {
                    ExceptionType::Added
                } else {
                    ExceptionType::Removed
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_routes_from_csv() {
        let csv = "route_id,agency_id,route_short_name,route_long_name,route_type\nR1,A1,1,Downtown,3\n";
        let routes = load_routes(csv.as_bytes()).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route_id.raw(), "R1");
        assert_eq!(routes[0].route_type, RouteType::Bus);
    }

    #[test]
    fn loads_agency_defaulting_missing_id_to_empty_string() {
        let csv = "agency_name,agency_url,agency_timezone\nTest Transit,https://example.invalid,Europe/Berlin\n";
        let agencies = load_agencies(csv.as_bytes()).unwrap();
        assert_eq!(agencies.len(), 1);
        assert_eq!(agencies[0].agency_id.raw(), "");
    }

    #[test]
    fn loads_stop_times_with_past_midnight_values() {
        let csv = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\nT1,25:03:09,25:05:00,S1,1\n";
        let rows = load_stop_times(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].arrival_time.num_seconds(), 25 * 3600 + 3 * 60 + 9);
    }

    fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
        use std::io::Write;
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn load_zip_reads_present_tables_and_skips_missing_ones() {
        let bytes = build_zip(&[
            (
                "agency.txt",
                "agency_name,agency_url,agency_timezone\nTest Transit,https://example.invalid,Europe/Berlin\n",
            ),
            (
                "routes.txt",
                "route_id,agency_id,route_short_name,route_long_name,route_type\nR1,A1,1,Downtown,3\n",
            ),
        ]);

        let bundle = load_zip(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(bundle.agencies.len(), 1);
        assert_eq!(bundle.routes.len(), 1);
        assert!(bundle.stops.is_empty(), "stops.txt was absent from the bundle");
        assert!(bundle.trips.is_empty(), "trips.txt was absent from the bundle");
    }

    /// Demonstrates the full static-load path §4.8 describes: a GTFS ZIP
    /// parsed by this module, then composed straight into the Store
    /// Gateway's static tables via `StoreWriter::load_static`.
    #[test]
    fn load_zip_output_composes_into_the_store() {
        let bytes = build_zip(&[
            (
                "agency.txt",
                "agency_id,agency_name,agency_url,agency_timezone\nA1,Test Transit,https://example.invalid,Europe/Berlin\n",
            ),
            (
                "routes.txt",
                "route_id,agency_id,route_short_name,route_long_name,route_type\nR1,A1,1,Downtown,3\n",
            ),
        ]);
        let bundle = load_zip(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(bundle.agencies.len(), 1);
        assert_eq!(bundle.routes.len(), 1);

        let writer = database::StoreWriter::open_in_memory().unwrap();
        writer
            .load_static(
                &bundle.agencies,
                &bundle.routes,
                &bundle.stops,
                &bundle.trips,
                &bundle.stop_times,
                &bundle.calendar,
                &bundle.calendar_dates,
            )
            .unwrap();
    }
}
