//! Mock pH process model.
//!
//! Simulates a scalar process value subject to Gaussian sensor noise, slow
//! sinusoidal drift and discrete corrective impulses from dosing. The model
//! owns its state; nothing here is global, so any number of simulated nodes
//! can run side by side, each with its own instance and noise source.

use hydro_core::{round2, DoseAction, PumpDirection, Real};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{SimError, SimResult};

/// pH shift produced by one milliliter of dosing solution.
const ML_TO_PH: Real = 0.1;

/// Hard bounds of the simulated pH scale.
pub const VALUE_MIN: Real = 5.0;
pub const VALUE_MAX: Real = 9.0;

/// Tuning knobs for the process model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessOptions {
    /// Starting process value.
    pub initial_value: Real,
    /// Desired process value.
    pub target: Real,
    /// Standard deviation of the per-tick Gaussian sensor noise.
    pub noise_std: Real,
    /// Amplitude scale of the slow sinusoidal drift.
    pub drift_rate: Real,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            initial_value: 7.2,
            target: 6.5,
            noise_std: 0.05,
            drift_rate: 0.001,
        }
    }
}

impl ProcessOptions {
    fn validate(&self) -> SimResult<()> {
        if !(VALUE_MIN..=VALUE_MAX).contains(&self.initial_value) {
            return Err(SimError::NonPhysical {
                what: "initial value outside the pH scale bounds",
            });
        }
        if self.noise_std < 0.0 || !self.noise_std.is_finite() {
            return Err(SimError::InvalidArg {
                what: "noise_std must be finite and non-negative",
            });
        }
        if !self.drift_rate.is_finite() {
            return Err(SimError::InvalidArg {
                what: "drift_rate must be finite",
            });
        }
        Ok(())
    }
}

/// Simulated pH process with injected noise source.
///
/// Deterministic given a seeded rng; `noise_std = 0` and `drift_rate = 0`
/// make the model fully reproducible without touching the rng at all.
#[derive(Debug, Clone)]
pub struct ProcessModel<R: Rng> {
    value: Real,
    target: Real,
    tick: u64,
    noise: Normal<Real>,
    drift_rate: Real,
    rng: R,
}

impl ProcessModel<StdRng> {
    /// Model with a seeded rng, for reproducible runs and tests.
    pub fn seeded(opts: ProcessOptions, seed: u64) -> SimResult<Self> {
        Self::with_rng(opts, StdRng::seed_from_u64(seed))
    }

    /// Model with an entropy-seeded rng.
    pub fn from_entropy(opts: ProcessOptions) -> SimResult<Self> {
        Self::with_rng(opts, StdRng::from_entropy())
    }
}

impl<R: Rng> ProcessModel<R> {
    /// Model over a caller-supplied noise source.
    pub fn with_rng(opts: ProcessOptions, rng: R) -> SimResult<Self> {
        opts.validate()?;
        let noise = Normal::new(0.0, opts.noise_std).map_err(|_| SimError::InvalidArg {
            what: "noise_std must be finite and non-negative",
        })?;
        Ok(Self {
            value: opts.initial_value,
            target: opts.target,
            tick: 0,
            noise,
            drift_rate: opts.drift_rate,
            rng,
        })
    }

    /// Advance the process by one tick and return the reported reading.
    ///
    /// Adds Gaussian noise and sinusoidal drift, clamps to the pH scale,
    /// and increments the tick counter. The returned reading is rounded to
    /// two decimals (sensor reporting precision); internal state keeps full
    /// precision.
    pub fn advance(&mut self) -> Real {
        let noise = self.noise.sample(&mut self.rng);
        let drift = (self.tick as Real * 0.01).sin() * self.drift_rate;
        self.value = (self.value + noise + drift).clamp(VALUE_MIN, VALUE_MAX);
        self.tick += 1;
        round2(self.value)
    }

    /// Apply a corrective dose to the process.
    ///
    /// Raise adds `0.1 pH` per milliliter, lower subtracts. The result is
    /// clamped: the bounds invariant holds for any requested volume.
    pub fn apply_dose(&mut self, action: &DoseAction) {
        let delta = action.volume_ml * ML_TO_PH;
        let next = match action.direction {
            PumpDirection::Raise => self.value + delta,
            PumpDirection::Lower => self.value - delta,
        };
        self.value = next.clamp(VALUE_MIN, VALUE_MAX);
    }

    /// Current process value at full internal precision.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Current reading at sensor reporting precision.
    pub fn reported_value(&self) -> Real {
        round2(self.value)
    }

    pub fn target(&self) -> Real {
        self.target
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
