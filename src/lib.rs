//! Reverse-vending kiosk controller.
//!
//! The machine accepts beverage containers one at a time: a camera frame
//! is classified by an inference model, the verdict is fused with a scale
//! and a metal sensor, and a pair of servos routes the item into the
//! matching compartment while session counters track the deposit.
//!
//! Layering follows a ports-and-adapters shape:
//!
//! - [`app`] holds the session state machine and the port traits it
//!   consumes; it performs no I/O of its own.
//! - [`vision`] and [`hardware`] are the domain components (frame source,
//!   classifier, bin probe, actuation sequencer), each generic over the
//!   relevant port.
//! - [`adapters`] bind the ports to concrete backends: the host
//!   simulator, the HTTP session API, the logging event sink.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fusion;
pub mod hardware;
pub mod session;
pub mod vision;

pub use error::{Error, Result};
