//! Deviation zone classification.
//!
//! The zone is derived, never stored: it is recomputed on every evaluation
//! from the current reading and the target. Several independent consumers
//! (controller, event severity selection, operator log lines) key off the
//! same classification, so the thresholds live here and nowhere else.

use hydro_core::Real;
use serde::{Deserialize, Serialize};

/// Absolute error at or below which no correction is attempted.
pub const DEAD_BAND: Real = 0.1;
/// Absolute error at or below which the deviation counts as close.
pub const CLOSE_BAND: Real = 0.3;

/// How far the current process value deviates from target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    /// |error| <= 0.1: within the dead band, leave the loop alone.
    Dead,
    /// 0.1 < |error| <= 0.3: gentle correction.
    Close,
    /// |error| > 0.3: aggressive correction.
    Far,
}

/// Classify the deviation of `current` from `target`.
///
/// Pure and total over finite reals. Boundary values are inclusive at each
/// threshold: an error of exactly 0.1 is `Dead`, exactly 0.3 is `Close`.
pub fn classify_zone(current: Real, target: Real) -> Zone {
    let abs_error = (target - current).abs();
    if abs_error <= DEAD_BAND {
        Zone::Dead
    } else if abs_error <= CLOSE_BAND {
        Zone::Close
    } else {
        Zone::Far
    }
}
