//! Timed servo choreography for routing an item into its compartment.
//!
//! Two servos do the work: the sorter arm swings a chute toward the
//! plastic or can side, then the slapper pushes the item off the staging
//! platform. `Other` items stay on the platform for the user to take back,
//! so no servo moves for them.
//!
//! Every step is a blocking dwell; the sequence is only ever run from the
//! scan path, which is itself synchronous by design (one item at a time).

use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::ActuatorPort;
use crate::config::KioskConfig;
use crate::session::Label;

pub struct ActuationSequencer {
    sorter_channel: u8,
    slapper_channel: u8,
    angle_idle: f32,
    angle_plastic: f32,
    angle_can: f32,
    angle_slap_rest: f32,
    angle_slap_hit: f32,
    sorter_settle: Duration,
    slap_hit: Duration,
    slap_return: Duration,
    sorter_return: Duration,
}

impl ActuationSequencer {
    pub fn from_config(config: &KioskConfig) -> Self {
        Self {
            sorter_channel: config.sorter_channel,
            slapper_channel: config.slapper_channel,
            angle_idle: config.angle_idle,
            angle_plastic: config.angle_plastic,
            angle_can: config.angle_can,
            angle_slap_rest: config.angle_slap_rest,
            angle_slap_hit: config.angle_slap_hit,
            sorter_settle: Duration::from_millis(config.sorter_settle_ms),
            slap_hit: Duration::from_millis(config.slap_hit_ms),
            slap_return: Duration::from_millis(config.slap_return_ms),
            sorter_return: Duration::from_millis(config.sorter_return_ms),
        }
    }

    /// Sorter arm target for a fused label. `Other` has no target; the
    /// item is left on the platform.
    fn target_angle(&self, label: Label) -> Option<f32> {
        match label {
            Label::Plastic => Some(self.angle_plastic),
            Label::Can => Some(self.angle_can),
            Label::Other => None,
        }
    }

    /// Run the full sort sequence for `label`. A missing servo board or an
    /// `Other` label makes this a no-op; faults never propagate to the
    /// scan pipeline.
    pub fn sort(&self, hw: &mut impl ActuatorPort, label: Label) {
        let Some(target) = self.target_angle(label) else {
            debug!("No sort target for {label}, leaving item on platform");
            return;
        };
        if !hw.servos_available() {
            warn!("Servo driver offline, skipping sort for {label}");
            return;
        }

        debug!("Sorting {label}: arm to {target}°");
        hw.set_servo(self.sorter_channel, Some(target));
        thread::sleep(self.sorter_settle);

        hw.set_servo(self.slapper_channel, Some(self.angle_slap_hit));
        thread::sleep(self.slap_hit);
        hw.set_servo(self.slapper_channel, Some(self.angle_slap_rest));
        thread::sleep(self.slap_return);

        hw.set_servo(self.sorter_channel, Some(self.angle_idle));
        thread::sleep(self.sorter_return);

        // Release holding torque so the arms do not buzz between items.
        hw.set_servo(self.sorter_channel, None);
        hw.set_servo(self.slapper_channel, None);
    }

    /// Drive both servos to their rest positions, then release. Used at
    /// boot so the mechanism starts from a known pose.
    pub fn park(&self, hw: &mut impl ActuatorPort) {
        if !hw.servos_available() {
            warn!("Servo driver offline, cannot park");
            return;
        }
        hw.set_servo(self.sorter_channel, Some(self.angle_idle));
        hw.set_servo(self.slapper_channel, Some(self.angle_slap_rest));
        thread::sleep(self.sorter_return);
        hw.set_servo(self.sorter_channel, None);
        hw.set_servo(self.slapper_channel, None);
    }
}
