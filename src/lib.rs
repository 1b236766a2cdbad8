//! Score engine for recurring performance review cycles.
//!
//! Reconciles manager evaluation and peer feedback into a level-weighted
//! final score, then governs how that score is locked, delivered, and
//! corrected through the adjustment workflow.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
