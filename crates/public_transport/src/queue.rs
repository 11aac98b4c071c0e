//! Six unbounded FIFO channels staging insert/delete mutations from any
//! number of producer tasks (MQTT intake dispatch, one per message) for
//! the single-consumer Flush Scheduler. Enqueue never blocks and never
//! fails except when the scheduler itself has shut down.

use model::{
    alert::ServiceAlert, trip_update::TripUpdate, vehicle_position::VehiclePosition,
    ServiceAlertId, TripUpdateId, VehiclePositionId,
};
use tokio::sync::mpsc;

use crate::matcher::{ServiceAlertOutcome, TripUpdateOutcome, VehiclePositionOutcome};

/// One end of a single FIFO, held by every producer.
#[derive(Clone)]
pub struct QueueSender<T>(mpsc::UnboundedSender<T>);

impl<T> QueueSender<T> {
    pub fn enqueue(&self, item: T) {
        // An unbounded channel only fails to send once the receiver has
        // dropped, i.e. the scheduler has shut down; there is no further
        // producer-side recovery to attempt, so the item is dropped.
        let _ = self.0.send(item);
    }
}

fn queue<T>() -> (QueueSender<T>, mpsc::UnboundedReceiver<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (QueueSender(sender), receiver)
}

fn drain<T>(receiver: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(item) = receiver.try_recv() {
        items.push(item);
    }
    items
}

/// Producer-side handle: one clonable sender per queue, cheap to clone
/// into each Intake task.
#[derive(Clone)]
pub struct WriteQueueHandle {
    trip_update_insert: QueueSender<TripUpdate>,
    trip_update_delete: QueueSender<TripUpdateId>,
    service_alert_insert: QueueSender<ServiceAlert>,
    service_alert_delete: QueueSender<ServiceAlertId>,
    vehicle_position_insert: QueueSender<VehiclePosition>,
    vehicle_position_delete: QueueSender<VehiclePositionId>,
}

impl WriteQueueHandle {
    pub fn enqueue_trip_update(&self, outcome: TripUpdateOutcome) {
        match outcome {
            TripUpdateOutcome::Insert(update) => self.trip_update_insert.enqueue(update),
            TripUpdateOutcome::Delete(id) => self.trip_update_delete.enqueue(id),
        }
    }

    pub fn enqueue_service_alert(&self, outcome: ServiceAlertOutcome) {
        match outcome {
            ServiceAlertOutcome::Insert(alert) => self.service_alert_insert.enqueue(alert),
            ServiceAlertOutcome::Delete(id) => self.service_alert_delete.enqueue(id),
        }
    }

    pub fn enqueue_vehicle_position(&self, outcome: VehiclePositionOutcome) {
        match outcome {
            VehiclePositionOutcome::Insert(position) => self.vehicle_position_insert.enqueue(position),
            VehiclePositionOutcome::Delete(id) => self.vehicle_position_delete.enqueue(id),
        }
    }
}

/// Consumer-side handle: owned exclusively by the Flush Scheduler.
pub struct WriteQueues {
    trip_update_insert: mpsc::UnboundedReceiver<TripUpdate>,
    trip_update_delete: mpsc::UnboundedReceiver<TripUpdateId>,
    service_alert_insert: mpsc::UnboundedReceiver<ServiceAlert>,
    service_alert_delete: mpsc::UnboundedReceiver<ServiceAlertId>,
    vehicle_position_insert: mpsc::UnboundedReceiver<VehiclePosition>,
    vehicle_position_delete: mpsc::UnboundedReceiver<VehiclePositionId>,
}

/// Everything enqueued since the last tick, split the way the flush tick
/// consumes it: deletes drained and applied before inserts.
pub struct Drained {
    pub trip_update_inserts: Vec<TripUpdate>,
    pub trip_update_deletes: Vec<TripUpdateId>,
    pub service_alert_inserts: Vec<ServiceAlert>,
    pub service_alert_deletes: Vec<ServiceAlertId>,
    pub vehicle_position_inserts: Vec<VehiclePosition>,
    pub vehicle_position_deletes: Vec<VehiclePositionId>,
}

impl WriteQueues {
    pub fn new() -> (WriteQueueHandle, WriteQueues) {
        let (trip_update_insert_tx, trip_update_insert_rx) = queue();
        let (trip_update_delete_tx, trip_update_delete_rx) = queue();
        let (service_alert_insert_tx, service_alert_insert_rx) = queue();
        let (service_alert_delete_tx, service_alert_delete_rx) = queue();
        let (vehicle_position_insert_tx, vehicle_position_insert_rx) = queue();
        let (vehicle_position_delete_tx, vehicle_position_delete_rx) = queue();

        let handle = WriteQueueHandle {
            trip_update_insert: trip_update_insert_tx,
            trip_update_delete: trip_update_delete_tx,
            service_alert_insert: service_alert_insert_tx,
            service_alert_delete: service_alert_delete_tx,
            vehicle_position_insert: vehicle_position_insert_tx,
            vehicle_position_delete: vehicle_position_delete_tx,
        };
        let queues = WriteQueues {
            trip_update_insert: trip_update_insert_rx,
            trip_update_delete: trip_update_delete_rx,
            service_alert_insert: service_alert_insert_rx,
            service_alert_delete: service_alert_delete_rx,
            vehicle_position_insert: vehicle_position_insert_rx,
            vehicle_position_delete: vehicle_position_delete_rx,
        };
        (handle, queues)
    }

    pub fn drain_all(&mut self) -> Drained {
        Drained {
            trip_update_inserts: drain(&mut self.trip_update_insert),
            trip_update_deletes: drain(&mut self.trip_update_delete),
            service_alert_inserts: drain(&mut self.service_alert_insert),
            service_alert_deletes: drain(&mut self.service_alert_delete),
            vehicle_position_inserts: drain(&mut self.vehicle_position_insert),
            vehicle_position_deletes: drain(&mut self.vehicle_position_delete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueued_deletes_drain_in_fifo_order() {
        let (handle, mut queues) = WriteQueues::new();
        handle.enqueue_trip_update(TripUpdateOutcome::Delete(TripUpdateId::new("A".to_owned())));
        handle.enqueue_trip_update(TripUpdateOutcome::Delete(TripUpdateId::new("B".to_owned())));

        let drained = queues.drain_all();
        assert_eq!(drained.trip_update_deletes.len(), 2);
        assert_eq!(drained.trip_update_deletes[0].raw(), "A");
        assert_eq!(drained.trip_update_deletes[1].raw(), "B");
    }

    #[test]
    fn drain_on_empty_queues_returns_nothing() {
        let (_handle, mut queues) = WriteQueues::new();
        let drained = queues.drain_all();
        assert!(drained.trip_update_inserts.is_empty());
        assert!(drained.service_alert_inserts.is_empty());
        assert!(drained.vehicle_position_inserts.is_empty());
    }

    #[test]
    fn inserts_and_deletes_land_on_independent_queues() {
        let (handle, mut queues) = WriteQueues::new();
        handle.enqueue_service_alert(ServiceAlertOutcome::Delete(ServiceAlertId::new(
            "ALERT".to_owned(),
        )));
        let drained = queues.drain_all();
        assert_eq!(drained.service_alert_deletes.len(), 1);
        assert!(drained.service_alert_inserts.is_empty());
    }
}
