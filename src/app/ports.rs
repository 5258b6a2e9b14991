//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ KioskService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, the cloud client, event sinks)
//! implement these traits. The [`KioskService`](super::service::KioskService)
//! consumes them via generics, so the domain core never touches hardware
//! directly. The camera and model contracts live next to their components
//! in [`vision`](crate::vision).
//!
//! Fail-open policy at this boundary:
//!
//! - `SensorPort::weight_grams` never fails: a scale fault reads as 0.0 g
//!   (no distinct error flag — observed machine behaviour, kept).
//! - `DistancePort` faults are typed; the probe collapses them into a
//!   flagged zero reading so a broken bin sensor cannot stall the kiosk.
//! - `ActuatorPort` calls are infallible; mechanical faults are logged by
//!   the adapter and swallowed.

use std::time::{Duration, Instant};

use crate::error::{CloudError, ProbeError};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (weight + metal)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Zero the scale's reference point.
    fn tare_scale(&mut self);

    /// Averaged weight over `samples` readings, in grams. Fails open to
    /// 0.0; readings below 0.5 g are reported as 0.0 (load-cell noise).
    fn weight_grams(&mut self, samples: u8) -> f32;

    /// Inductive proximity sensor state.
    fn metal_detected(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (servos + indicator light)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Whether the servo driver board responded at init. When false the
    /// actuation sequencer skips sorting entirely.
    fn servos_available(&self) -> bool;

    /// Command a servo channel to an angle in degrees; `None` releases
    /// holding torque.
    fn set_servo(&mut self, channel: u8, angle: Option<f32>);

    /// Set the whole indicator strip to one colour.
    fn set_lights(&mut self, rgb: (u8, u8, u8));
}

// ───────────────────────────────────────────────────────────────
// Distance sensor port (ultrasonic trigger/echo lines)
// ───────────────────────────────────────────────────────────────

pub trait DistancePort {
    /// Emit the trigger pulse (low → ≥10 µs high → low).
    fn pulse_trigger(&mut self) -> Result<(), ProbeError>;

    /// Block until the echo line reaches `level`, returning the edge
    /// timestamp, or [`ProbeError::Timeout`] once `timeout` elapses.
    fn wait_for_edge(&mut self, level: bool, timeout: Duration) -> Result<Instant, ProbeError>;
}

// ───────────────────────────────────────────────────────────────
// Cloud session API
// ───────────────────────────────────────────────────────────────

/// Identity handed out by the cloud for one deposit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReceipt {
    pub transaction_id: String,
    pub claim_secret: String,
}

/// The machine-facing session API. Network failures must never prevent
/// local operation — the service falls back to offline identifiers.
pub trait SessionApi {
    fn notify_start(&mut self, bin_id: &str) -> Result<StartReceipt, CloudError>;

    fn notify_stop(
        &mut self,
        transaction_id: &str,
        plastic: u32,
        cans: u32,
    ) -> Result<(), CloudError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go (log lines, a UI push channel, telemetry).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
