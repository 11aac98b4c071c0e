//! Subscribes to the configured MQTT topic list and feeds each message
//! through decode, ID mapping, matching, and the write queues.

pub mod config;
pub mod intake;
pub mod subscription;
pub mod topic;
