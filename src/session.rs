//! Session state shared across the kiosk actions.
//!
//! [`Session`] is the single owned object that the service mutates — the
//! explicit replacement for a process-wide mutable dictionary. It lives for
//! the lifetime of the process and is reset, never destroyed.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// The closed set of item classifications. Every decision in the pipeline
/// (classification, fusion, actuation, counting) operates over exactly
/// these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Plastic,
    Can,
    Other,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plastic => "Plastic",
            Self::Can => "Can",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// The session state machine's states. `ShowResult` loops back to `Idle`
/// via `reset`; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Idle,
    Running,
    ShowResult,
}

// ---------------------------------------------------------------------------
// Per-scan sensor snapshot
// ---------------------------------------------------------------------------

/// Physical readings collected around one scan. Transient: created per
/// scan, discarded after the fused label and item weight are recorded.
#[derive(Debug, Clone, Copy)]
pub struct SensorSnapshot {
    pub weight_before_g: f32,
    pub weight_after_g: f32,
    pub metal_detected: bool,
    pub raw_label: Label,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user-facing kiosk usage cycle, tracked independently of scans.
#[derive(Debug, Clone)]
pub struct Session {
    pub status: SessionStatus,
    pub plastic_count: u32,
    pub can_count: u32,
    pub other_count: u32,
    pub total_weight_g: f32,
    /// `None` until the first completed scan of the current session.
    pub last_item: Option<Label>,
    pub last_weight_g: f32,
    pub transaction_id: Option<String>,
    pub claim_secret: Option<String>,
}

impl Session {
    /// A fresh session in `Idle` with zeroed counters.
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            plastic_count: 0,
            can_count: 0,
            other_count: 0,
            total_weight_g: 0.0,
            last_item: None,
            last_weight_g: 0.0,
            transaction_id: None,
            claim_secret: None,
        }
    }

    /// Enter `Running` with fresh counters and the given transaction
    /// identity. Called by `start` after the bin/camera/cloud steps.
    pub fn begin(&mut self, transaction_id: String, claim_secret: String) {
        self.status = SessionStatus::Running;
        self.plastic_count = 0;
        self.can_count = 0;
        self.other_count = 0;
        self.total_weight_g = 0.0;
        self.last_item = None;
        self.last_weight_g = 0.0;
        self.transaction_id = Some(transaction_id);
        self.claim_secret = Some(claim_secret);
    }

    /// Record one completed scan: bump the matching counter and totals.
    pub fn record(&mut self, label: Label, item_weight_g: f32) {
        match label {
            Label::Plastic => self.plastic_count += 1,
            Label::Can => self.can_count += 1,
            Label::Other => self.other_count += 1,
        }
        self.total_weight_g += item_weight_g;
        self.last_item = Some(label);
        self.last_weight_g = item_weight_g;
    }

    /// Completed scans since the session began.
    pub fn item_count(&self) -> u32 {
        self.plastic_count + self.can_count + self.other_count
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
