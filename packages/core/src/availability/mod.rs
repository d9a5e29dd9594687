//! Availability tracking and change detection.
//!
//! The tracker remembers the last observed availability of every location,
//! per provider family. The detector compares a fresh listing against it
//! and reports only the false-to-true transitions.

pub mod detector;
pub mod tracker;


pub use detector::{detect, Detection};
pub use tracker::{AvailabilitySection, AvailabilityTracker};
