//! hydro-core: stable foundation for hydroflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - dose (pump direction + dose action vocabulary)
//! - error (shared error types)

pub mod dose;
pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use dose::*;
pub use error::{HydroError, HydroResult};
pub use numeric::*;
