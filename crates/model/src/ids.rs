use utility::id::{HasId, Id};

use crate::{
    agency::Agency, alert::ServiceAlert, route::Route, stop::Stop, trip::Trip,
    trip_update::TripUpdate, vehicle_position::VehiclePosition,
};

macro_rules! string_id {
    ($name:ident, $entity:ty) => {
        impl HasId for $entity {
            type IdType = String;
        }
        pub type $name = Id<$entity>;
    };
}

string_id!(StopId, Stop);
string_id!(RouteId, Route);
string_id!(TripId, Trip);
string_id!(ServiceId, ServiceIdMarker);
string_id!(AgencyId, Agency);
string_id!(TripUpdateId, TripUpdate);
string_id!(ServiceAlertId, ServiceAlert);
string_id!(VehiclePositionId, VehiclePosition);

/// `service_id` does not have its own row type of its own in this model
/// (it only ever appears as a foreign key on `Trip`/`CalendarRule`), so it
/// gets a dedicated marker rather than borrowing `Trip`'s id space.
pub struct ServiceIdMarker;
