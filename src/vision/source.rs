//! Continuous frame acquisition with a single-slot latest-frame buffer.
//!
//! A background worker reads frames from the capture device as fast as the
//! device delivers them and overwrites the shared slot; the control path
//! takes a copy on demand via [`FrameSource::snapshot`]. Only the newest
//! frame ever matters, so the slot is overwrite-on-write / copy-on-read —
//! never a queue. The lock is held only around the slot assignment or the
//! clone, never across device I/O.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::KioskConfig;
use crate::error::CameraError;
use crate::vision::frame::Frame;

// ---------------------------------------------------------------------------
// Capture device contract
// ---------------------------------------------------------------------------

/// Opens capture devices by index. Implementations are expected to be
/// cheap handles (the V4L2 adapter, the simulator); the heavyweight state
/// lives in the stream.
pub trait CameraDevice: Send + Sync {
    fn open(&self, index: i32) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// An open capture stream. Dropping the stream releases the device.
pub trait CameraStream: Send {
    /// Read one frame. Blocks at the device's frame rate.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;
}

// ---------------------------------------------------------------------------
// FrameSource
// ---------------------------------------------------------------------------

/// Owns the capture device and the acquisition worker.
pub struct FrameSource {
    device: Arc<dyn CameraDevice>,
    indices: Vec<i32>,
    read_backoff: Duration,
    slot: Arc<Mutex<Option<Frame>>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FrameSource {
    pub fn new(device: Arc<dyn CameraDevice>, config: &KioskConfig) -> Self {
        Self {
            device,
            indices: config.camera_indices.clone(),
            read_backoff: Duration::from_millis(config.camera_retry_ms),
            slot: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Open the first configured device index that responds and spawn the
    /// acquisition worker. Idempotent: a second call while running is a
    /// no-op returning success. When no index opens, no worker is spawned
    /// and the caller sees [`CameraError::NoDevice`].
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.running.load(Ordering::Acquire) {
            return Ok(());
        }

        let mut stream = None;
        for &index in &self.indices {
            match self.device.open(index) {
                Ok(s) => {
                    info!("camera opened on index {index}");
                    stream = Some(s);
                    break;
                }
                Err(e) => warn!("camera index {index} unavailable: {e}"),
            }
        }
        let Some(stream) = stream else {
            return Err(CameraError::NoDevice);
        };

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let slot = Arc::clone(&self.slot);
        let backoff = self.read_backoff;

        let handle = thread::Builder::new()
            .name("frame-acquire".to_owned())
            .spawn(move || acquisition_loop(stream, &slot, &running, backoff));

        match handle {
            Ok(h) => {
                self.worker = Some(h);
                Ok(())
            }
            Err(e) => {
                warn!("acquisition worker spawn failed: {e}");
                self.running.store(false, Ordering::Release);
                Err(CameraError::SpawnFailed)
            }
        }
    }

    /// Halt the acquisition loop and release the device. Safe to call when
    /// not running.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("acquisition worker panicked during shutdown");
            }
        }
    }

    /// Copy of the most recently acquired frame, or `None` when no frame
    /// has arrived yet. Never blocks on acquisition.
    pub fn snapshot(&self) -> Option<Frame> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Block until the first frame lands or `timeout` elapses. Useful right
    /// after `start` while the device warms up.
    pub fn wait_for_frame(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.snapshot().is_some() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker body: read, publish, repeat. A failed read backs off briefly and
/// retries; it never terminates the loop. The stream is dropped (device
/// released) when the loop exits.
fn acquisition_loop(
    mut stream: Box<dyn CameraStream>,
    slot: &Mutex<Option<Frame>>,
    running: &AtomicBool,
    backoff: Duration,
) {
    while running.load(Ordering::Acquire) {
        match stream.read_frame() {
            Ok(frame) => {
                let mut latest = slot.lock().unwrap_or_else(PoisonError::into_inner);
                *latest = Some(frame);
            }
            Err(e) => {
                debug!("frame read failed ({e}), retrying");
                thread::sleep(backoff);
            }
        }
    }
    debug!("acquisition loop stopped");
}
