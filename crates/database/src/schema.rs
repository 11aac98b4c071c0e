//! Store Gateway schema bootstrap: DuckDB table definitions, trimmed to
//! the columns this engine actually reads or writes.

pub const STATIC_TABLES: &[(&str, &str)] = &[
    (
        "agency",
        "CREATE TABLE IF NOT EXISTS agency (
            agency_id       TEXT PRIMARY KEY,
            agency_name     TEXT NOT NULL,
            agency_url      TEXT NOT NULL,
            agency_timezone TEXT NOT NULL
        )",
    ),
    (
        "routes",
        "CREATE TABLE IF NOT EXISTS routes (
            route_id         TEXT PRIMARY KEY,
            agency_id        TEXT,
            route_short_name TEXT,
            route_long_name  TEXT,
            route_type       INTEGER NOT NULL
        )",
    ),
    (
        "stops",
        "CREATE TABLE IF NOT EXISTS stops (
            stop_id        TEXT PRIMARY KEY,
            stop_name      TEXT,
            stop_lat       DOUBLE,
            stop_lon       DOUBLE,
            parent_station TEXT,
            location_type  INTEGER NOT NULL
        )",
    ),
    (
        "trips",
        "CREATE TABLE IF NOT EXISTS trips (
            trip_id       TEXT PRIMARY KEY,
            route_id      TEXT NOT NULL,
            service_id    TEXT NOT NULL,
            trip_headsign TEXT,
            direction_id  BOOLEAN
        )",
    ),
    (
        "stop_times",
        "CREATE TABLE IF NOT EXISTS stop_times (
            trip_id        TEXT NOT NULL,
            stop_sequence  INTEGER NOT NULL,
            stop_id        TEXT NOT NULL,
            arrival_time   BIGINT NOT NULL,
            departure_time BIGINT NOT NULL,
            PRIMARY KEY (trip_id, stop_sequence)
        )",
    ),
    (
        "calendar",
        "CREATE TABLE IF NOT EXISTS calendar (
            service_id TEXT PRIMARY KEY,
            monday     BOOLEAN NOT NULL,
            tuesday    BOOLEAN NOT NULL,
            wednesday  BOOLEAN NOT NULL,
            thursday   BOOLEAN NOT NULL,
            friday     BOOLEAN NOT NULL,
            saturday   BOOLEAN NOT NULL,
            sunday     BOOLEAN NOT NULL,
            start_date INTEGER NOT NULL,
            end_date   INTEGER NOT NULL
        )",
    ),
    (
        "calendar_dates",
        "CREATE TABLE IF NOT EXISTS calendar_dates (
            service_id      TEXT NOT NULL,
            date            INTEGER NOT NULL,
            exception_type  INTEGER NOT NULL,
            PRIMARY KEY (service_id, date)
        )",
    ),
];

pub const REALTIME_TABLES: &[(&str, &str)] = &[
    (
        "realtime_trip_updates",
        "CREATE TABLE IF NOT EXISTS realtime_trip_updates (
            trip_update_id             TEXT PRIMARY KEY,
            trip_id                    TEXT NOT NULL,
            trip_route_id              TEXT,
            trip_direction_id          BOOLEAN,
            trip_start_time            TEXT,
            trip_start_date            INTEGER,
            trip_schedule_relationship TEXT,
            last_updated_timestamp     BIGINT NOT NULL
        )",
    ),
    (
        "realtime_trip_stop_time_updates",
        "CREATE TABLE IF NOT EXISTS realtime_trip_stop_time_updates (
            trip_update_id         TEXT NOT NULL,
            stop_sequence          INTEGER NOT NULL,
            stop_id                TEXT,
            arrival_time           BIGINT,
            arrival_delay          INTEGER,
            arrival_uncertainty    INTEGER,
            departure_time         BIGINT,
            departure_delay        INTEGER,
            departure_uncertainty  INTEGER,
            schedule_relationship  TEXT,
            PRIMARY KEY (trip_update_id, stop_sequence)
        )",
    ),
    (
        "realtime_service_alerts",
        "CREATE TABLE IF NOT EXISTS realtime_service_alerts (
            service_alert_id     TEXT PRIMARY KEY,
            cause                TEXT NOT NULL,
            effect               TEXT NOT NULL,
            url                  TEXT,
            header_text          TEXT,
            description_text     TEXT,
            tts_header_text      TEXT,
            tts_description_text TEXT,
            severity_level       TEXT NOT NULL,
            last_updated_timestamp BIGINT NOT NULL
        )",
    ),
    (
        "realtime_alert_active_periods",
        "CREATE TABLE IF NOT EXISTS realtime_alert_active_periods (
            service_alert_id TEXT NOT NULL,
            start_timestamp  BIGINT,
            end_timestamp    BIGINT,
            last_updated_timestamp BIGINT NOT NULL
        )",
    ),
    (
        "realtime_alert_informed_entities",
        "CREATE TABLE IF NOT EXISTS realtime_alert_informed_entities (
            service_alert_id TEXT NOT NULL,
            agency_id        TEXT,
            route_id         TEXT,
            route_type       INTEGER,
            trip_id          TEXT,
            stop_id          TEXT,
            last_updated_timestamp BIGINT NOT NULL
        )",
    ),
    (
        "realtime_vehicle_positions",
        "CREATE TABLE IF NOT EXISTS realtime_vehicle_positions (
            vehicle_position_id    TEXT PRIMARY KEY,
            trip_id                TEXT,
            trip_route_id          TEXT,
            trip_start_date        INTEGER,
            vehicle_id             TEXT,
            vehicle_label          TEXT,
            position_latitude      DOUBLE,
            position_longitude     DOUBLE,
            position_bearing       REAL,
            position_speed         REAL,
            current_stop_sequence  INTEGER,
            stop_id                TEXT,
            current_status         TEXT,
            timestamp               BIGINT,
            congestion_level        TEXT,
            last_updated_timestamp  BIGINT NOT NULL
        )",
    ),
];

pub fn bootstrap(conn: &duckdb::Connection) -> Result<(), duckdb::Error> {
    for (_, ddl) in STATIC_TABLES.iter().chain(REALTIME_TABLES.iter()) {
        conn.execute_batch(ddl)?;
    }
    Ok(())
}
