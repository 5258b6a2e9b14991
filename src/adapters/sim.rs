//! Host simulator: scriptable stand-ins for every peripheral so the full
//! control loop runs on a development machine with no hardware attached.
//!
//! The simulated echo line answers edge waits from the scripted distance,
//! so the probe's timing math runs against the same code path it uses on
//! real GPIO.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::app::ports::{ActuatorPort, DistancePort, SensorPort};
use crate::error::{CameraError, ModelError, ProbeError};
use crate::vision::classifier::InferenceModel;
use crate::vision::frame::Frame;
use crate::vision::source::{CameraDevice, CameraStream};

const ECHO_CM_PER_SEC: f32 = 17_150.0;

// ---------------------------------------------------------------------------
// Sensors + actuators
// ---------------------------------------------------------------------------

/// All non-camera peripherals in one scriptable bundle. Mutate the public
/// fields between commands to stage the next item.
pub struct SimHardware {
    /// Weight currently on the platform, in grams.
    pub weight_g: f32,
    /// Inductive sensor state.
    pub metal: bool,
    /// One-way distance the echo line reports; `None` simulates a lost
    /// echo (timeout).
    pub echo_distance_cm: Option<f32>,
    /// Whether the servo driver board answers.
    pub servos_online: bool,
    pulse_base: Option<Instant>,
}

impl SimHardware {
    pub fn new() -> Self {
        Self {
            weight_g: 0.0,
            metal: false,
            echo_distance_cm: Some(30.0),
            servos_online: true,
            pulse_base: None,
        }
    }
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for SimHardware {
    fn tare_scale(&mut self) {
        debug!("[sim] scale tared");
        self.weight_g = 0.0;
    }

    fn weight_grams(&mut self, _samples: u8) -> f32 {
        // Load-cell noise floor.
        if self.weight_g < 0.5 { 0.0 } else { self.weight_g }
    }

    fn metal_detected(&mut self) -> bool {
        self.metal
    }
}

impl ActuatorPort for SimHardware {
    fn servos_available(&self) -> bool {
        self.servos_online
    }

    fn set_servo(&mut self, channel: u8, angle: Option<f32>) {
        match angle {
            Some(a) => debug!("[sim] servo {channel} -> {a}°"),
            None => debug!("[sim] servo {channel} released"),
        }
    }

    fn set_lights(&mut self, rgb: (u8, u8, u8)) {
        debug!("[sim] lights rgb{rgb:?}");
    }
}

impl DistancePort for SimHardware {
    fn pulse_trigger(&mut self) -> Result<(), ProbeError> {
        self.pulse_base = Some(Instant::now());
        Ok(())
    }

    fn wait_for_edge(&mut self, level: bool, _timeout: Duration) -> Result<Instant, ProbeError> {
        let base = self.pulse_base.ok_or(ProbeError::Gpio)?;
        let cm = self.echo_distance_cm.ok_or(ProbeError::Timeout)?;
        if level {
            Ok(base)
        } else {
            Ok(base + Duration::from_secs_f32(cm / ECHO_CM_PER_SEC))
        }
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Synthesises a gradient frame at a fixed interval. Index `0` opens;
/// every other index reports failure, which exercises the fallback scan in
/// `FrameSource::start`.
pub struct SimCamera {
    pub frame_interval: Duration,
}

impl SimCamera {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            frame_interval: Duration::from_millis(33),
        })
    }
}

impl CameraDevice for SimCamera {
    fn open(&self, index: i32) -> Result<Box<dyn CameraStream>, CameraError> {
        if index == 0 {
            Ok(Box::new(SimStream {
                interval: self.frame_interval,
                tick: 0,
            }))
        } else {
            Err(CameraError::OpenFailed(index))
        }
    }
}

struct SimStream {
    interval: Duration,
    tick: u8,
}

impl CameraStream for SimStream {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        thread::sleep(self.interval);
        self.tick = self.tick.wrapping_add(1);
        let (w, h) = (64u32, 48u32);
        let mut pixels = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                pixels.push((x * 4) as u8);
                pixels.push((y * 5) as u8);
                pixels.push(self.tick);
            }
        }
        Frame::from_raw(w, h, pixels).ok_or(CameraError::ReadFailed)
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Returns a fixed score vector regardless of input. Set `scores` to steer
/// the predicted class.
pub struct SimModel {
    pub scores: Vec<f32>,
}

impl SimModel {
    /// Defaults to predicting plastic under the production label map.
    pub fn new() -> Self {
        Self {
            scores: vec![0.1, 0.1, 0.8],
        }
    }
}

impl Default for SimModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceModel for SimModel {
    fn input_shape(&self) -> (u32, u32) {
        (224, 224)
    }

    fn invoke(&mut self, _input: &[f32]) -> Result<Vec<f32>, ModelError> {
        Ok(self.scores.clone())
    }
}
