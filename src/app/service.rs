//! The kiosk session state machine and scan pipeline.
//!
//! [`KioskService`] owns the domain state (session counters, frame source,
//! classifier, probe, sequencer) and exposes one method per operator
//! command. Hardware and cloud access arrive per call as port trait
//! implementations, so the whole service runs unchanged against real
//! peripherals or test doubles.
//!
//! State machine:
//!
//! ```text
//!   Idle ──start──▶ Running ──stop──▶ ShowResult ──reset──▶ Idle
//!                     │ ▲
//!                     scan (self loop, one item per call)
//! ```
//!
//! `start` on a running session and `stop`/`scan` outside `Running` are
//! rejected without side effects; `reset` is accepted from any state.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use core::fmt;

use log::{info, warn};

use crate::config::KioskConfig;
use crate::fusion;
use crate::hardware::bin_level::BinLevelProbe;
use crate::hardware::sorter::ActuationSequencer;
use crate::session::{Label, SensorSnapshot, Session, SessionStatus};
use crate::vision::classifier::{Classifier, InferenceModel};
use crate::vision::source::FrameSource;

use super::events::{AppEvent, StateSnapshot};
use super::ports::{ActuatorPort, DistancePort, EventSink, SensorPort, SessionApi};

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

/// Why a `start` request was refused. Refusals leave the machine in `Idle`
/// with nothing started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRefusal {
    /// The collection bin is at or above its full threshold.
    BinFull,
    /// No camera device could be opened.
    NoCamera,
}

impl fmt::Display for StartRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinFull => write!(f, "bin is full"),
            Self::NoCamera => write!(f, "camera unavailable"),
        }
    }
}

/// Why a `scan` request did not produce an item. Failed scans never touch
/// the session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// Scans are only valid while a session is running.
    NotRunning,
    /// The frame source produced no frame for this scan.
    NoFrame,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "no session running"),
            Self::NoFrame => write!(f, "no camera frame available"),
        }
    }
}

/// One successfully processed item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOutcome {
    pub label: Label,
    pub item_weight_g: f32,
}

// ---------------------------------------------------------------------------
// KioskService
// ---------------------------------------------------------------------------

pub struct KioskService<M> {
    session: Session,
    config: KioskConfig,
    frames: FrameSource,
    classifier: Classifier<M>,
    probe: BinLevelProbe,
    sequencer: ActuationSequencer,
}

impl<M: InferenceModel> KioskService<M> {
    pub fn new(config: KioskConfig, frames: FrameSource, classifier: Classifier<M>) -> Self {
        let probe = BinLevelProbe::from_config(&config);
        let sequencer = ActuationSequencer::from_config(&config);
        Self {
            session: Session::new(),
            config,
            frames,
            classifier,
            probe,
            sequencer,
        }
    }

    // ── start ──────────────────────────────────────────────────

    /// Begin a deposit session: check bin capacity, bring up the camera,
    /// tare the scale, obtain a transaction identity.
    ///
    /// Calling `start` while already running is a no-op success, so a
    /// double-tap on the start button cannot discard a session in
    /// progress. Cloud failures fall back to an offline transaction
    /// identity rather than refusing the user.
    pub fn start(
        &mut self,
        hw: &mut (impl SensorPort + DistancePort),
        cloud: &mut impl SessionApi,
        sink: &mut impl EventSink,
    ) -> Result<(), StartRefusal> {
        if self.session.status == SessionStatus::Running {
            info!("Start ignored, session already running");
            return Ok(());
        }

        // A probe fault must not lock users out, only a confirmed full
        // bin refuses the session.
        let bin = self.probe.measure(hw);
        if bin.is_full {
            warn!("Start refused, bin at {}%", bin.percent);
            sink.emit(&AppEvent::StartRefused(StartRefusal::BinFull));
            return Err(StartRefusal::BinFull);
        }

        if let Err(e) = self.frames.start() {
            warn!("Start refused, camera failed: {e}");
            sink.emit(&AppEvent::StartRefused(StartRefusal::NoCamera));
            return Err(StartRefusal::NoCamera);
        }

        hw.tare_scale();

        let (receipt, offline) = match cloud.notify_start(&self.config.bin_id) {
            Ok(receipt) => (receipt, false),
            Err(e) => {
                warn!("Cloud start failed ({e}), issuing offline transaction");
                (offline_receipt(), true)
            }
        };

        info!("Session started, transaction {}", receipt.transaction_id);
        let transaction_id = receipt.transaction_id.clone();
        self.session.begin(receipt.transaction_id, receipt.claim_secret);
        sink.emit(&AppEvent::SessionStarted {
            transaction_id,
            offline,
        });
        Ok(())
    }

    // ── scan ───────────────────────────────────────────────────

    /// Process the item on the platform: weigh, photograph under the
    /// flash, classify, fuse with the metal and weight readings, sort,
    /// and record the result.
    pub fn scan(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Result<ScanOutcome, ScanError> {
        if self.session.status != SessionStatus::Running {
            warn!("Scan rejected, no session running");
            return Err(ScanError::NotRunning);
        }

        let weight_before = hw.weight_grams(self.config.weight_samples);
        let metal = hw.metal_detected();

        hw.set_lights(self.config.flash_rgb);
        thread::sleep(Duration::from_millis(self.config.flash_settle_ms));
        let frame = self.frames.snapshot();
        hw.set_lights((0, 0, 0));

        let Some(frame) = frame else {
            warn!("Scan aborted, no frame available");
            sink.emit(&AppEvent::ScanFailed(ScanError::NoFrame));
            return Err(ScanError::NoFrame);
        };

        let raw_label = self.classifier.predict(&frame);
        let fused = fusion::fuse(weight_before, metal, raw_label, self.config.weight_limit_g);
        info!(
            "Scan: raw={raw_label} metal={metal} weight={weight_before:.1}g -> {fused}"
        );

        self.sequencer.sort(hw, fused);
        thread::sleep(Duration::from_millis(self.config.settle_after_sort_ms));

        let weight_after = hw.weight_grams(self.config.weight_samples);
        let item_weight = (weight_before - weight_after).abs();

        self.session.record(fused, item_weight);
        let snapshot = SensorSnapshot {
            weight_before_g: weight_before,
            weight_after_g: weight_after,
            metal_detected: metal,
            raw_label,
        };
        sink.emit(&AppEvent::ItemScanned {
            snapshot,
            fused,
            item_weight_g: item_weight,
        });

        Ok(ScanOutcome {
            label: fused,
            item_weight_g: item_weight,
        })
    }

    // ── stop ───────────────────────────────────────────────────

    /// End the session and report the counts. The camera keeps running
    /// through `ShowResult`; `reset` shuts it down. Cloud failures are
    /// logged, never surfaced to the user, the local tallies are
    /// authoritative for the result screen.
    pub fn stop(&mut self, cloud: &mut impl SessionApi, sink: &mut impl EventSink) {
        if self.session.status != SessionStatus::Running {
            info!("Stop ignored, no session running");
            return;
        }

        self.session.status = SessionStatus::ShowResult;

        if let Some(transaction_id) = self.session.transaction_id.clone() {
            if let Err(e) = cloud.notify_stop(
                &transaction_id,
                self.session.plastic_count,
                self.session.can_count,
            ) {
                warn!("Cloud stop report failed: {e}");
            }
        }

        info!(
            "Session stopped: {} plastic, {} cans, {} other, {:.1}g total",
            self.session.plastic_count,
            self.session.can_count,
            self.session.other_count,
            self.session.total_weight_g
        );
        sink.emit(&AppEvent::SessionStopped {
            plastic: self.session.plastic_count,
            cans: self.session.can_count,
            other: self.session.other_count,
            total_weight_g: self.session.total_weight_g,
        });
    }

    // ── reset ──────────────────────────────────────────────────

    /// Return to `Idle` and release the camera. Accepted from any state;
    /// counters survive until the next `start` so the result screen data
    /// stays queryable.
    pub fn reset(&mut self, sink: &mut impl EventSink) {
        self.session.status = SessionStatus::Idle;
        self.frames.stop();
        info!("Reset to idle");
        sink.emit(&AppEvent::SessionReset);
    }

    // ── queries ────────────────────────────────────────────────

    /// Current machine state plus a fresh bin-level poll.
    pub fn state_snapshot(&mut self, gpio: &mut impl DistancePort) -> StateSnapshot {
        let bin = self.probe.measure(gpio);
        StateSnapshot::from_session(&self.session, bin.percent, bin.is_full, bin.error)
    }

    /// Block until the frame source has delivered at least one frame.
    pub fn await_first_frame(&self, timeout: Duration) -> bool {
        self.frames.wait_for_frame(timeout)
    }

    pub fn camera_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Local transaction identity for sessions begun while the cloud is
/// unreachable, distinguishable by the `OFF-` prefix.
fn offline_receipt() -> super::ports::StartReceipt {
    let unix_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    super::ports::StartReceipt {
        transaction_id: format!("OFF-{unix_secs}"),
        claim_secret: "offline".to_owned(),
    }
}
