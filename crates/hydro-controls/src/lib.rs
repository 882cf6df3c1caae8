//! Zone-based dosing control for hydroflow.
//!
//! This crate provides the decision half of the closed dosing loop:
//! - Zone classification of the deviation between process value and target
//! - A cadence-gated controller that turns a deviation into a bounded dose
//! - The alarm band that escalates out-of-range readings
//!
//! The controller is stateless and purely computes an intended action;
//! applying the dose and recording the acceptance time belong to the caller.

pub mod controller;
pub mod error;
pub mod zone;

pub use controller::{AlarmBand, DoseController, ZoneGains};
pub use error::{ControlError, ControlResult};
pub use zone::{classify_zone, Zone};
