//! Vision subsystem: frame acquisition and AI classification.
//!
//! [`source::FrameSource`] keeps a single always-fresh frame available to
//! the control path; [`classifier::Classifier`] turns that frame into a
//! [`Label`](crate::session::Label).

pub mod classifier;
pub mod frame;
pub mod source;
