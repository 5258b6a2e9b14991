//! Hardware-facing components that operate over port traits: the
//! ultrasonic bin-fill probe and the sorting actuation sequencer.

pub mod bin_level;
pub mod sorter;
