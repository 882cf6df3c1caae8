//! Cadence-gated dosing controller.
//!
//! The controller maps a classified deviation to a bounded corrective dose.
//! Gain sets are selected per zone and carry ki/kd values for wire
//! compatibility with event consumers, but only the proportional term
//! drives the output; the integral and derivative gains are reported,
//! never integrated. This mirrors the deployed firmware behaviour and is
//! kept as-is rather than silently upgraded to a full PID.

use hydro_core::{DoseAction, PumpDirection, Real, MAX_DOSE_ML};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::zone::Zone;

/// Gain set attached to a corrective dose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneGains {
    /// Proportional gain. The only gain that affects the output.
    pub kp: Real,
    /// Integral gain, reported in event metadata only.
    pub ki: Real,
    /// Derivative gain, reported in event metadata only.
    pub kd: Real,
}

impl ZoneGains {
    /// Gain set for a zone. `Dead` has no gains: no correction happens there.
    pub fn for_zone(zone: Zone) -> Option<ZoneGains> {
        match zone {
            Zone::Dead => None,
            Zone::Close => Some(ZoneGains {
                kp: 0.5,
                ki: 0.01,
                kd: 0.1,
            }),
            Zone::Far => Some(ZoneGains {
                kp: 1.0,
                ki: 0.015,
                kd: 0.05,
            }),
        }
    }
}

/// Stateless dosing controller.
///
/// `evaluate` purely computes an intended action; the caller applies it to
/// the process model and records the acceptance time that feeds the next
/// cadence check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseController {
    /// Absolute error at or below which no dose is computed, even outside
    /// the dead-band zone.
    pub min_error: Real,
    /// Smallest dose worth running a pump for (ml). Computed volumes at or
    /// below this are discarded.
    pub min_dose_ml: Real,
    /// Hard ceiling on a single dose (ml).
    pub max_dose_ml: Real,
    /// Scale factor from proportional term to milliliters.
    pub output_scale: Real,
}

impl Default for DoseController {
    fn default() -> Self {
        Self {
            min_error: 0.05,
            min_dose_ml: 0.1,
            max_dose_ml: MAX_DOSE_ML,
            output_scale: 2.0,
        }
    }
}

impl DoseController {
    /// Create a controller with explicit dose limits.
    pub fn new(min_dose_ml: Real, max_dose_ml: Real) -> ControlResult<Self> {
        if min_dose_ml < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "min_dose_ml must be non-negative",
            });
        }
        if max_dose_ml <= min_dose_ml {
            return Err(ControlError::InvalidArg {
                what: "max_dose_ml must exceed min_dose_ml",
            });
        }
        if max_dose_ml > MAX_DOSE_ML {
            return Err(ControlError::InvalidArg {
                what: "max_dose_ml must not exceed pump capacity",
            });
        }
        Ok(Self {
            min_dose_ml,
            max_dose_ml,
            ..Self::default()
        })
    }

    /// Evaluate one control cycle and return the intended dose, if any.
    ///
    /// Returns `None` when:
    /// - the cadence gate is closed (`now_s - last` below `interval_s`);
    ///   a `None` last-correction leaves the gate open, so the first
    ///   correction of a session is not delayed
    /// - the zone is `Dead` or the error is within `min_error`
    /// - the computed volume does not exceed `min_dose_ml`
    ///
    /// Direction follows the sign of `error = target - current`: a reading
    /// below target is raised, a reading above target is lowered.
    pub fn evaluate(
        &self,
        current: Real,
        target: Real,
        zone: Zone,
        now_s: f64,
        last_correction_s: Option<f64>,
        interval_s: f64,
    ) -> Option<DoseAction> {
        if let Some(last) = last_correction_s {
            if now_s - last < interval_s {
                return None;
            }
        }

        let error = target - current;
        if zone == Zone::Dead || error.abs() <= self.min_error {
            return None;
        }

        let gains = ZoneGains::for_zone(zone)?;
        let p_term = gains.kp * error;
        let volume_ml = (p_term.abs() * self.output_scale).min(self.max_dose_ml);
        if volume_ml <= self.min_dose_ml {
            return None;
        }

        let direction = if error > 0.0 {
            PumpDirection::Raise
        } else {
            PumpDirection::Lower
        };
        // Dose limits are checked against pump capacity at construction,
        // so the computed volume always passes validation; a controller
        // built with out-of-capacity limits via struct literal stays quiet
        // rather than emitting an undeliverable dose.
        DoseAction::new(direction, volume_ml).ok()
    }
}

/// Operational band outside of which every reading escalates to a critical
/// event, independent of cadence gating and dead-band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlarmBand {
    pub min: Real,
    pub max: Real,
}

impl Default for AlarmBand {
    fn default() -> Self {
        Self { min: 5.5, max: 7.5 }
    }
}

impl AlarmBand {
    pub fn is_out_of_range(&self, value: Real) -> bool {
        value < self.min || value > self.max
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::zone::classify_zone;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn dose_volume_always_bounded(current in 5.0_f64..9.0, target in 5.0_f64..9.0) {
            let ctrl = DoseController::default();
            let zone = classify_zone(current, target);
            if let Some(action) = ctrl.evaluate(current, target, zone, 0.0, None, 10.0) {
                prop_assert!(action.volume_ml > ctrl.min_dose_ml);
                prop_assert!(action.volume_ml <= ctrl.max_dose_ml);
            }
        }

        #[test]
        fn dead_zone_is_quiet(current in 5.0_f64..9.0) {
            let ctrl = DoseController::default();
            let target = current + 0.05;
            let zone = classify_zone(current, target);
            prop_assert_eq!(zone, Zone::Dead);
            prop_assert_eq!(ctrl.evaluate(current, target, zone, 0.0, None, 10.0), None);
        }
    }
}
