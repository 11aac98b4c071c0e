pub mod agency;
pub mod alert;
pub mod calendar;
pub mod ids;
pub mod route;
pub mod stop;
pub mod trip;
pub mod trip_update;
pub mod vehicle_position;

pub use ids::*;
