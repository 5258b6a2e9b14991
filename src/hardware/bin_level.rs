//! Ultrasonic bin-fill measurement (HC-SR04 style trigger/echo timing).
//!
//! One measurement: settle the trigger line, emit the pulse, time the echo
//! rise and fall, convert the round-trip duration to centimetres via the
//! speed of sound. Both edge waits share a single deadline so a wedged
//! echo line can never block the caller for more than the configured
//! timeout.
//!
//! Fail-open contract: every fault path returns a flagged zero reading
//! ([`BinReading::fault`]) — a broken level sensor must not stop the kiosk
//! from operating. The `error` flag lets the UI distinguish a fault from a
//! genuinely empty bin.

use std::thread;
use std::time::{Duration, Instant};

use log::warn;
use serde::Serialize;

use crate::app::ports::DistancePort;
use crate::config::KioskConfig;
use crate::error::ProbeError;

/// Round-trip microphone distance: duration (s) × 17150 ≈ one-way cm.
const ECHO_CM_PER_SEC: f32 = 17_150.0;

// ---------------------------------------------------------------------------
// BinReading
// ---------------------------------------------------------------------------

/// Result of one fill-level poll. `percent` is always within 0–100;
/// `error` marks a measurement that did not complete (distinct from a
/// valid 0 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinReading {
    pub percent: u8,
    pub is_full: bool,
    pub error: bool,
}

impl BinReading {
    /// The fail-open reading: empty, not full, flagged.
    pub fn fault() -> Self {
        Self {
            percent: 0,
            is_full: false,
            error: true,
        }
    }
}

// ---------------------------------------------------------------------------
// BinLevelProbe
// ---------------------------------------------------------------------------

pub struct BinLevelProbe {
    bin_height_cm: f32,
    full_threshold_percent: u8,
    echo_timeout: Duration,
    trigger_settle: Duration,
}

impl BinLevelProbe {
    pub fn new(
        bin_height_cm: f32,
        full_threshold_percent: u8,
        echo_timeout: Duration,
        trigger_settle: Duration,
    ) -> Self {
        Self {
            // Guard the divisor; a zero-height bin is a config mistake.
            bin_height_cm: bin_height_cm.max(1.0),
            full_threshold_percent,
            echo_timeout,
            trigger_settle,
        }
    }

    pub fn from_config(config: &KioskConfig) -> Self {
        Self::new(
            config.bin_height_cm,
            config.bin_full_threshold_percent,
            Duration::from_millis(config.echo_timeout_ms),
            Duration::from_millis(config.trigger_settle_ms),
        )
    }

    /// Perform one measurement. Never blocks longer than the settle delay
    /// plus the echo timeout; never panics the caller.
    pub fn measure(&self, gpio: &mut impl DistancePort) -> BinReading {
        match self.time_echo(gpio) {
            Ok(round_trip) => {
                let distance_cm = round_trip.as_secs_f32() * ECHO_CM_PER_SEC;
                self.reading_for_distance(distance_cm)
            }
            Err(e) => {
                warn!("bin level probe fault: {e}");
                BinReading::fault()
            }
        }
    }

    fn time_echo(&self, gpio: &mut impl DistancePort) -> Result<Duration, ProbeError> {
        thread::sleep(self.trigger_settle);
        gpio.pulse_trigger()?;

        let deadline = Instant::now() + self.echo_timeout;
        let rise = gpio.wait_for_edge(true, remaining(deadline))?;
        let fall = gpio.wait_for_edge(false, remaining(deadline))?;
        Ok(fall.saturating_duration_since(rise))
    }

    /// Convert a one-way distance to a fill reading. Distances clamp to
    /// `[0, bin_height_cm]`: closer than zero is physically impossible
    /// noise (→ 100 %), farther than the bin floor is an open-lid echo
    /// (→ 0 %).
    pub(crate) fn reading_for_distance(&self, distance_cm: f32) -> BinReading {
        let clamped = distance_cm.clamp(0.0, self.bin_height_cm);
        let fill_cm = self.bin_height_cm - clamped;
        let percent = (fill_cm / self.bin_height_cm * 100.0) as u8;
        BinReading {
            percent,
            is_full: percent >= self.full_threshold_percent,
            error: false,
        }
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
