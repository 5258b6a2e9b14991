//! Adapters binding the port traits to concrete backends: the host
//! simulator, the HTTP session API client, and the logging event sink.

pub mod cloud;
pub mod log_sink;
pub mod sim;
