//! A fixed-period loop draining the write queues against the writer
//! `duckdb::Connection`. Grounded on `collector::run`'s tick/backoff
//! shape, adapted from "poll a `Collector` trait object" to "drain six
//! queues against one store writer". There is no per-tick state to
//! persist and no restart factory, so the scheduler always resumes after
//! a failed tick rather than restarting or stopping, tracking consecutive
//! failures the way `collector::run` tracks its backoff duration.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use database::StoreWriter;
use tokio::sync::oneshot;
use tokio::time;

use crate::queue::WriteQueues;

#[derive(Debug, Clone, Copy)]
pub struct FlushConfig {
    pub interval: Duration,
    pub max_age_seconds: i64,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            max_age_seconds: 7200,
        }
    }
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub aged_out: u64,
    pub trip_updates_deleted: usize,
    pub trip_updates_inserted: usize,
    pub service_alerts_deleted: usize,
    pub service_alerts_inserted: usize,
    pub vehicle_positions_deleted: usize,
    pub vehicle_positions_inserted: usize,
}

/// Runs one tick's sequence: age-out, then drain-and-apply deletes, then
/// drain-and-apply inserts. Insert drains delete any existing row with
/// the same primary id first (upsert-by-replace),
/// applied parent-then-children by `StoreWriter::insert_*`.
fn tick(
    writer: &StoreWriter,
    queues: &mut WriteQueues,
    config: FlushConfig,
    now_unix: i64,
) -> database::Result<TickReport> {
    let mut report = TickReport::default();
    report.aged_out = writer.age_out(now_unix, config.max_age_seconds)?;

    let drained = queues.drain_all();

    report.trip_updates_deleted = drained.trip_update_deletes.len();
    for id in drained.trip_update_deletes {
        writer.delete_trip_update(&id)?;
    }
    report.service_alerts_deleted = drained.service_alert_deletes.len();
    for id in drained.service_alert_deletes {
        writer.delete_service_alert(&id)?;
    }
    report.vehicle_positions_deleted = drained.vehicle_position_deletes.len();
    for id in drained.vehicle_position_deletes {
        writer.delete_vehicle_position(&id)?;
    }

    report.trip_updates_inserted = drained.trip_update_inserts.len();
    for update in drained.trip_update_inserts {
        writer.insert_trip_update(&update)?;
    }
    report.service_alerts_inserted = drained.service_alert_inserts.len();
    for alert in drained.service_alert_inserts {
        writer.insert_service_alert(&alert)?;
    }
    report.vehicle_positions_inserted = drained.vehicle_position_inserts.len();
    for position in drained.vehicle_position_inserts {
        writer.insert_vehicle_position(&position)?;
    }

    Ok(report)
}

/// Runs the Flush Scheduler until `shutdown` fires, then performs one
/// best-effort final drain before returning. The binary's shutdown path
/// joins this task and relies on that final drain to converge queued
/// writes before the writer connection is dropped.
pub async fn run(
    mut writer: StoreWriter,
    mut queues: WriteQueues,
    config: FlushConfig,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut interval = time::interval(config.interval);
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                run_tick(&mut writer, &mut queues, config, &mut consecutive_failures);
                return;
            }
        }
        run_tick(&mut writer, &mut queues, config, &mut consecutive_failures);
    }
}

fn run_tick(
    writer: &mut StoreWriter,
    queues: &mut WriteQueues,
    config: FlushConfig,
    consecutive_failures: &mut u32,
) {
    let now_unix = chrono::Utc::now().timestamp();
    let result = panic::catch_unwind(AssertUnwindSafe(|| tick(writer, queues, config, now_unix)));

    match result {
        Ok(Ok(report)) => {
            *consecutive_failures = 0;
            tracing::debug!(
                aged_out = report.aged_out,
                trip_updates_deleted = report.trip_updates_deleted,
                trip_updates_inserted = report.trip_updates_inserted,
                service_alerts_deleted = report.service_alerts_deleted,
                service_alerts_inserted = report.service_alerts_inserted,
                vehicle_positions_deleted = report.vehicle_positions_deleted,
                vehicle_positions_inserted = report.vehicle_positions_inserted,
                "flush tick complete"
            );
        }
        Ok(Err(why)) => {
            *consecutive_failures += 1;
            tracing::error!(error = %why, consecutive_failures, "flush tick failed, resuming");
        }
        Err(panic) => {
            *consecutive_failures += 1;
            tracing::error!(?panic, consecutive_failures, "flush tick panicked, resuming");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::TripUpdateOutcome;
    use crate::queue::WriteQueueHandle;
    use model::trip_update::TripUpdate;
    use model::TripUpdateId;

    fn trip_update(id: &str) -> TripUpdate {
        TripUpdate {
            trip_update_id: TripUpdateId::new(id.to_owned()),
            trip_id: model::TripId::new("T1".to_owned()),
            trip_route_id: None,
            trip_direction_id: None,
            trip_start_time: None,
            trip_start_date: None,
            trip_schedule_relationship: None,
            last_updated_timestamp: 1_000,
            stop_time_updates: vec![],
        }
    }

    fn enqueue_insert(handle: &WriteQueueHandle, id: &str) {
        handle.enqueue_trip_update(TripUpdateOutcome::Insert(trip_update(id)));
    }

    #[test]
    fn tick_drains_inserts_into_the_writer() {
        let writer = StoreWriter::open_in_memory().unwrap();
        let (handle, mut queues) = WriteQueues::new();
        enqueue_insert(&handle, "TU1");

        let report = tick(&writer, &mut queues, FlushConfig::default(), 1_000).unwrap();
        assert_eq!(report.trip_updates_inserted, 1);
    }

    #[test]
    fn tick_ages_out_rows_older_than_the_threshold() {
        let writer = StoreWriter::open_in_memory().unwrap();
        let (handle, mut queues) = WriteQueues::new();
        enqueue_insert(&handle, "OLD");
        tick(&writer, &mut queues, FlushConfig::default(), 1_000).unwrap();

        let report = tick(
            &writer,
            &mut queues,
            FlushConfig {
                interval: Duration::from_secs(15),
                max_age_seconds: 60,
            },
            10_000,
        )
        .unwrap();
        assert_eq!(report.aged_out, 1);
    }
}
