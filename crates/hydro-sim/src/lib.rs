//! Closed-loop dosing simulation for a pH-regulated hydroponic node.
//!
//! Contains the mock process model (noise + drift + dose impulses, clamped
//! to the pH scale) and the per-node session loop that drives one control
//! cycle per tick. Emission and sleeping are the caller's business; this
//! crate stays pure so sessions are deterministic under seeded randomness.

pub mod error;
pub mod process;
pub mod session;

pub use error::{SimError, SimResult};
pub use process::{ProcessModel, ProcessOptions, VALUE_MAX, VALUE_MIN};
pub use session::{AuxReadings, NodeSession, SessionOptions, TickReport};
