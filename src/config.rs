//! System configuration parameters.
//!
//! All tunable parameters for the kiosk: sensing thresholds, the class-index
//! mapping of the loaded model, servo geometry, and step timings. Defaults
//! match the deployed machine; a JSON file can override any of them.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::session::Label;

// ---------------------------------------------------------------------------
// Label map
// ---------------------------------------------------------------------------

/// Maps the model's output indices onto the closed label set. The class
/// ordering is a property of the trained model, not of this controller, so
/// it is configuration rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMap {
    pub can_index: usize,
    pub plastic_index: usize,
}

impl LabelMap {
    /// The label for a winning score index. Indices claimed by neither
    /// class fall through to `Other`.
    pub fn label_for(self, index: usize) -> Label {
        if index == self.can_index {
            Label::Can
        } else if index == self.plastic_index {
            Label::Plastic
        } else {
            Label::Other
        }
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        // Current production model: 0=Can, 1=Other, 2=Plastic.
        Self {
            can_index: 0,
            plastic_index: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Kiosk configuration
// ---------------------------------------------------------------------------

/// Core kiosk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Machine identity reported to the cloud session API.
    pub bin_id: String,

    // --- Camera ---
    /// Device indices tried in order by `FrameSource::start`.
    pub camera_indices: Vec<i32>,
    /// Backoff after a failed frame read (milliseconds).
    pub camera_retry_ms: u64,

    // --- Classifier ---
    /// Model output index mapping.
    pub label_map: LabelMap,
    /// Multiplier applied to 0–255 pixel values before inference
    /// (1.0 = raw floats, 1/255 = normalised).
    pub pixel_norm: f32,

    // --- Scale / fusion ---
    /// Items heavier than this are rejected as `Other` (grams).
    pub weight_limit_g: f32,
    /// Samples averaged per scale read.
    pub weight_samples: u8,

    // --- Bin level probe ---
    /// Distance from the sensor to the bin floor (cm).
    pub bin_height_cm: f32,
    /// Fill percentage at which the bin counts as full.
    pub bin_full_threshold_percent: u8,
    /// Deadline shared by both echo edge waits (milliseconds).
    pub echo_timeout_ms: u64,
    /// Line-settle delay before the trigger pulse (milliseconds).
    pub trigger_settle_ms: u64,

    // --- Servos ---
    pub sorter_channel: u8,
    pub slapper_channel: u8,
    pub angle_idle: f32,
    pub angle_plastic: f32,
    pub angle_can: f32,
    pub angle_slap_rest: f32,
    pub angle_slap_hit: f32,

    // --- Actuation timing (milliseconds) ---
    /// Sorter settle after moving to the target angle.
    pub sorter_settle_ms: u64,
    /// Slapper dwell at the hit angle.
    pub slap_hit_ms: u64,
    /// Slapper return to rest.
    pub slap_return_ms: u64,
    /// Sorter return to idle.
    pub sorter_return_ms: u64,
    /// Item settle before the post-sort weight read.
    pub settle_after_sort_ms: u64,

    // --- Indicator light ---
    /// Flash colour while capturing a frame.
    pub flash_rgb: (u8, u8, u8),
    /// Exposure settle under the flash before the snapshot (milliseconds).
    pub flash_settle_ms: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            bin_id: "BIN_01".to_owned(),

            camera_indices: vec![0, 1, -1],
            camera_retry_ms: 100,

            label_map: LabelMap::default(),
            pixel_norm: 1.0,

            weight_limit_g: 50.0,
            weight_samples: 5,

            bin_height_cm: 30.0,
            bin_full_threshold_percent: 80,
            echo_timeout_ms: 100,
            trigger_settle_ms: 50,

            sorter_channel: 15,
            slapper_channel: 0,
            angle_idle: 60.0,
            angle_plastic: 95.0,
            angle_can: 25.0,
            angle_slap_rest: 65.0,
            angle_slap_hit: 160.0,

            sorter_settle_ms: 500,
            slap_hit_ms: 600,
            slap_return_ms: 400,
            sorter_return_ms: 500,
            settle_after_sort_ms: 500,

            flash_rgb: (255, 150, 255),
            flash_settle_ms: 300,
        }
    }
}

impl KioskConfig {
    /// Load from a JSON file, falling back to defaults when the file is
    /// absent or malformed. A broken config file must not keep the kiosk
    /// from booting.
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(cfg) => {
                    info!("Config loaded from {}", path.display());
                    cfg
                }
                Err(e) => {
                    warn!("Config parse failed ({e}), using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }
}
