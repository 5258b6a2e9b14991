//! Application core — the kiosk's domain logic, zero I/O.
//!
//! The session state machine lives in [`service`]; all interaction with
//! hardware and the cloud flows through **port traits** defined in
//! [`ports`], keeping this layer fully testable without peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
