pub mod api_client;
pub mod dashboard;
pub mod delay;
pub mod markers;
pub mod poller;
pub mod stats;
