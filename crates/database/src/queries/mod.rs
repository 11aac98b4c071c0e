pub mod monitor;
pub mod nominal;
pub mod realtime;
pub mod static_data;
