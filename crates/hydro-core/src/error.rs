use thiserror::Error;

pub type HydroResult<T> = Result<T, HydroError>;

#[derive(Error, Debug)]
pub enum HydroError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
