//! The set of known stops/routes/trips and the start-time/stop-sequence
//! maps the matcher reconciles incoming feed entities against. Built once
//! per operation day and published behind an [`arc_swap::ArcSwap`] so
//! readers never observe a partially built snapshot.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use database::StoreReader;
use model::{RouteId, ServiceId, StopId, TripId};

/// `route_id → (start_time → ordered candidate trip_ids)`. The start time
/// is the raw `HH:MM:SS` string as it appears in `stop_times.txt`/the
/// feed, never parsed further, since it is only ever compared for
/// equality against the incoming entity's own start time.
pub type StartTimeIndex = HashMap<RouteId, HashMap<String, Vec<TripId>>>;

pub struct NominalIndex {
    pub operation_day: NaiveDate,
    pub stop_ids: HashSet<StopId>,
    pub route_ids: HashSet<RouteId>,
    pub trip_ids: HashSet<TripId>,
    pub per_route_start_times: StartTimeIndex,
    pub intermediate_stops: HashMap<TripId, Vec<StopId>>,
}

impl NominalIndex {
    pub fn is_nominal_trip(&self, trip_id: &TripId) -> bool {
        self.trip_ids.contains(trip_id)
    }

    pub fn is_nominal_route(&self, route_id: &RouteId) -> bool {
        self.route_ids.contains(route_id)
    }

    pub fn is_nominal_stop(&self, stop_id: &StopId) -> bool {
        self.stop_ids.contains(stop_id)
    }

    pub fn candidates_for(&self, route_id: &RouteId, start_time: &str) -> Option<&[TripId]> {
        self.per_route_start_times
            .get(route_id)?
            .get(start_time)
            .map(Vec::as_slice)
    }

    pub fn intermediate_stops_for(&self, trip_id: &TripId) -> Option<&[StopId]> {
        self.intermediate_stops.get(trip_id).map(Vec::as_slice)
    }
}

/// The set of `service_id`s running on `reference`, resolved from the
/// calendar rules plus same-day exceptions. Exposed for the HTTP Read
/// API's monitor query, which needs the same resolution
/// the index build already does, keyed by the day it's asked about rather
/// than the operation day the published snapshot was built for.
pub fn active_service_ids(
    reference: NaiveDate,
    calendar: &[model::calendar::CalendarRule],
    calendar_dates: &[model::calendar::CalendarException],
) -> HashSet<ServiceId> {
    let mut active: HashSet<ServiceId> = calendar
        .iter()
        .filter(|rule| rule.active_on(reference))
        .map(|rule| rule.service_id.clone())
        .collect();

    for exception in calendar_dates {
        if exception.date != reference {
            continue;
        }
        match exception.exception_type {
            model::calendar::ExceptionType::Added => {
                active.insert(exception.service_id.clone());
            }
            model::calendar::ExceptionType::Removed => {
                active.remove(&exception.service_id);
            }
        }
    }

    active
}

/// Builds the index for `operation_day` from the store's nominal tables.
/// `nominal_stop_ids`/`nominal_route_ids` span the entire static store,
/// not just the active day; the trip/start-time/stop-sequence maps are
/// restricted to services active on that day.
pub fn build(reader: &StoreReader, operation_day: NaiveDate) -> database::Result<NominalIndex> {
    let calendar = reader.fetch_calendar()?;
    let calendar_dates = reader.fetch_calendar_dates()?;
    let service_ids = active_service_ids(operation_day, &calendar, &calendar_dates);

    let stop_times = reader.fetch_trips_for_services(&service_ids)?;

    let mut trip_ids = HashSet::new();
    let mut per_route_start_times: StartTimeIndex = HashMap::new();
    let mut intermediate_stops: HashMap<TripId, Vec<StopId>> = HashMap::new();

    for row in &stop_times {
        trip_ids.insert(row.trip.trip_id.clone());
        intermediate_stops
            .entry(row.trip.trip_id.clone())
            .or_default()
            .push(row.stop_time.stop_id.clone());

        if row.stop_time.stop_sequence == 1 {
            let start_time = format_hms(row.stop_time.departure_time);
            per_route_start_times
                .entry(row.trip.route_id.clone())
                .or_default()
                .entry(start_time)
                .or_default()
                .push(row.trip.trip_id.clone());
        }
    }

    let stop_ids = reader.fetch_all_stop_ids()?;
    let route_ids = reader.fetch_all_route_ids()?;

    Ok(NominalIndex {
        operation_day,
        stop_ids,
        route_ids,
        trip_ids,
        per_route_start_times,
        intermediate_stops,
    })
}

/// Formats a stop-sequence-1 departure offset back into the `HH:MM:SS`
/// form the feed's `start_time` field uses, so the two can be compared
/// for equality without parsing the feed's own string.
fn format_hms(offset: chrono::Duration) -> String {
    let total_seconds = offset.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::calendar::{CalendarException, CalendarRule, ExceptionType};

    fn rule(service_id: &str, weekday: NaiveDate) -> CalendarRule {
        CalendarRule {
            service_id: ServiceId::new(service_id.to_owned()),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
            start_date: weekday,
            end_date: weekday,
        }
    }

    #[test]
    fn calendar_exception_added_includes_service_outside_range() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        let calendar = [];
        let calendar_dates = [CalendarException {
            service_id: ServiceId::new("EXTRA".to_owned()),
            date: today,
            exception_type: ExceptionType::Added,
        }];
        let active = active_service_ids(today, &calendar, &calendar_dates);
        assert!(active.contains(&ServiceId::new("EXTRA".to_owned())));
    }

    #[test]
    fn calendar_exception_removed_excludes_service_in_range() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        let calendar = [rule("BASE", today)];
        let calendar_dates = [CalendarException {
            service_id: ServiceId::new("BASE".to_owned()),
            date: today,
            exception_type: ExceptionType::Removed,
        }];
        let active = active_service_ids(today, &calendar, &calendar_dates);
        assert!(!active.contains(&ServiceId::new("BASE".to_owned())));
    }

    #[test]
    fn format_hms_pads_single_digit_components() {
        assert_eq!(format_hms(chrono::Duration::seconds(9 * 60 + 5)), "00:09:05");
    }
}
