//! Events emitted by the kiosk service and the UI-facing state snapshot.

use serde::Serialize;

use crate::session::{Label, SensorSnapshot, Session, SessionStatus};

use super::service::{ScanError, StartRefusal};

// ---------------------------------------------------------------------------
// Domain events
// ---------------------------------------------------------------------------

/// Notable occurrences in the session lifecycle, pushed through an
/// [`EventSink`](super::ports::EventSink). Events are informational; the
/// service never depends on a sink reacting to them.
#[derive(Debug, Clone)]
pub enum AppEvent {
    SessionStarted {
        transaction_id: String,
        /// True when the cloud was unreachable and a local fallback
        /// identity was issued.
        offline: bool,
    },
    StartRefused(StartRefusal),
    ItemScanned {
        snapshot: SensorSnapshot,
        fused: Label,
        item_weight_g: f32,
    },
    ScanFailed(ScanError),
    SessionStopped {
        plastic: u32,
        cans: u32,
        other: u32,
        total_weight_g: f32,
    },
    SessionReset,
}

// ---------------------------------------------------------------------------
// UI state snapshot
// ---------------------------------------------------------------------------

/// Flat view of the machine state for display surfaces. Field names are
/// part of the UI wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub status: SessionStatus,
    pub plastic: u32,
    pub cans: u32,
    pub other: u32,
    pub total_weight: f32,
    /// Label of the last scanned item, or `"Ready"` before the first scan.
    pub last_item: String,
    pub last_weight: f32,
    pub transaction_id: Option<String>,
    pub bin_level: u8,
    pub bin_full: bool,
    pub bin_error: bool,
}

impl StateSnapshot {
    pub fn from_session(
        session: &Session,
        bin_level: u8,
        bin_full: bool,
        bin_error: bool,
    ) -> Self {
        Self {
            status: session.status,
            plastic: session.plastic_count,
            cans: session.can_count,
            other: session.other_count,
            total_weight: session.total_weight_g,
            last_item: session
                .last_item
                .map_or_else(|| "Ready".to_owned(), |l| l.as_str().to_owned()),
            last_weight: session.last_weight_g,
            transaction_id: session.transaction_id.clone(),
            bin_level,
            bin_full,
            bin_error,
        }
    }
}
