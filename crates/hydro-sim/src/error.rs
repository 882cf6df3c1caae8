//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while configuring a simulated node.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hydro_controls::ControlError> for SimError {
    fn from(e: hydro_controls::ControlError) -> Self {
        match e {
            hydro_controls::ControlError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}
