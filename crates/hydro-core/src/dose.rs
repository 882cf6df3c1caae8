//! Dose vocabulary shared between the controller and the process model.

use serde::{Deserialize, Serialize};

use crate::error::{HydroError, HydroResult};
use crate::numeric::Real;

/// Largest single corrective dose the pumps will deliver.
pub const MAX_DOSE_ML: Real = 5.0;

/// Which peristaltic pump a dose drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PumpDirection {
    /// pH-up solution: raises the process value.
    Raise,
    /// pH-down solution: lowers the process value.
    Lower,
}

impl PumpDirection {
    /// Wire identifier of the pump, as the event consumers expect it.
    pub fn pump_id(self) -> &'static str {
        match self {
            PumpDirection::Raise => "ph_up",
            PumpDirection::Lower => "ph_down",
        }
    }
}

/// A single corrective dose. Produced by the controller, consumed by the
/// process model within one evaluation; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseAction {
    pub direction: PumpDirection,
    pub volume_ml: Real,
}

impl DoseAction {
    /// Create a dose action, validating the volume against pump limits.
    pub fn new(direction: PumpDirection, volume_ml: Real) -> HydroResult<Self> {
        if !volume_ml.is_finite() {
            return Err(HydroError::NonFinite {
                what: "dose volume",
                value: volume_ml,
            });
        }
        if !(0.0..=MAX_DOSE_ML).contains(&volume_ml) {
            return Err(HydroError::InvalidArg {
                what: "dose volume must be within [0, 5] ml",
            });
        }
        Ok(Self {
            direction,
            volume_ml,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pump_ids_match_wire_names() {
        assert_eq!(PumpDirection::Raise.pump_id(), "ph_up");
        assert_eq!(PumpDirection::Lower.pump_id(), "ph_down");
    }

    #[test]
    fn dose_volume_validated() {
        assert!(DoseAction::new(PumpDirection::Raise, 1.4).is_ok());
        assert!(DoseAction::new(PumpDirection::Raise, 0.0).is_ok());
        assert!(DoseAction::new(PumpDirection::Raise, 5.0).is_ok());
        assert!(DoseAction::new(PumpDirection::Lower, 5.1).is_err());
        assert!(DoseAction::new(PumpDirection::Lower, -0.1).is_err());
        assert!(DoseAction::new(PumpDirection::Lower, Real::NAN).is_err());
    }
}
