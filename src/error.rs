//! Unified error types for the kiosk controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control path's error handling uniform. All variants are `Copy`
//! so they can be cheaply passed around without allocation.
//!
//! Note that most peripheral faults never surface here at all: the kiosk
//! policy is to fail open (scale → 0.0 g, probe → flagged zero reading,
//! classifier → `Other`), so these types mostly travel *inside* a component
//! before being collapsed to a safe default.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Camera device could not be opened or read.
    Camera(CameraError),
    /// Inference model failed to run.
    Model(ModelError),
    /// Ultrasonic bin probe fault.
    Probe(ProbeError),
    /// Cloud session API fault.
    Cloud(CloudError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera(e) => write!(f, "camera: {e}"),
            Self::Model(e) => write!(f, "model: {e}"),
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Cloud(e) => write!(f, "cloud: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Camera errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    /// No configured device index could be opened.
    NoDevice,
    /// A specific index failed to open.
    OpenFailed(i32),
    /// A frame read from an open device failed.
    ReadFailed,
    /// The acquisition worker thread could not be spawned.
    SpawnFailed,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice => write!(f, "no capture device available"),
            Self::OpenFailed(idx) => write!(f, "device index {idx} failed to open"),
            Self::ReadFailed => write!(f, "frame read failed"),
            Self::SpawnFailed => write!(f, "acquisition worker spawn failed"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<CameraError> for Error {
    fn from(e: CameraError) -> Self {
        Self::Camera(e)
    }
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    /// No model is loaded.
    NotLoaded,
    /// The input tensor or declared shape is unusable.
    BadInput(&'static str),
    /// Inference itself failed.
    InferenceFailed,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "model not loaded"),
            Self::BadInput(msg) => write!(f, "bad input: {msg}"),
            Self::InferenceFailed => write!(f, "inference failed"),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

// ---------------------------------------------------------------------------
// Distance probe errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// The echo signal did not reach the expected level within the deadline.
    Timeout,
    /// The underlying GPIO line could not be driven or read.
    Gpio,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "echo timeout"),
            Self::Gpio => write!(f, "GPIO fault"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<ProbeError> for Error {
    fn from(e: ProbeError) -> Self {
        Self::Probe(e)
    }
}

// ---------------------------------------------------------------------------
// Cloud errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudError {
    /// The endpoint could not be reached (DNS, TCP, timeout).
    Unreachable,
    /// The endpoint answered with a non-success status.
    BadStatus(u16),
    /// The response body did not parse into the expected shape.
    BadResponse,
    /// The client itself could not be constructed.
    ClientInit,
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "endpoint unreachable"),
            Self::BadStatus(code) => write!(f, "HTTP status {code}"),
            Self::BadResponse => write!(f, "malformed response"),
            Self::ClientInit => write!(f, "HTTP client init failed"),
        }
    }
}

impl std::error::Error for CloudError {}

impl From<CloudError> for Error {
    fn from(e: CloudError) -> Self {
        Self::Cloud(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
