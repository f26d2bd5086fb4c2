//! Host-side helpers: a generic filter driver and the scaling-mode toggle.

/// Filter negotiation, buffer checks and packet execution.
pub mod runner;
/// Fullscreen scaling-mode cycle.
pub mod scaling;
