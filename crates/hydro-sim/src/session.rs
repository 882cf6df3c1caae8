//! Cooperative tick loop for one simulated node.
//!
//! A session owns exactly one process model, one controller and one
//! session-relative clock; it is never shared across concurrent callers.
//! Each `tick` is synchronous: advance the process, classify the
//! deviation, ask the controller for a correction, apply it, and check the
//! alarm band. The caller decides what to do with the resulting report
//! (emit records, log, sleep).

use hydro_controls::{classify_zone, AlarmBand, DoseController, Zone, ZoneGains};
use hydro_core::{DoseAction, Real, MAX_DOSE_ML};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SimResult;
use crate::process::{ProcessModel, ProcessOptions};

/// Options for one simulation session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Identifier the node reports itself as.
    pub node_id: String,
    /// Process model tuning.
    pub process: ProcessOptions,
    /// Minimum seconds between two accepted corrections (cadence gate).
    pub correction_interval_s: f64,
    /// Session clock advance per tick (also the caller's sleep period).
    pub tick_period_s: f64,
    /// Smallest dose worth running a pump for (ml).
    pub min_dose_ml: Real,
    /// Ceiling on a single dose (ml); validated against pump capacity.
    pub max_dose_ml: Real,
    /// Band outside of which every reading escalates.
    pub alarm_band: AlarmBand,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            node_id: "ph_3f0c00".to_owned(),
            process: ProcessOptions::default(),
            correction_interval_s: 10.0,
            tick_period_s: 2.0,
            min_dose_ml: 0.1,
            max_dose_ml: MAX_DOSE_ML,
            alarm_band: AlarmBand::default(),
        }
    }
}

/// Auxiliary simulated readings attached to every telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxReadings {
    pub temperature_c: Real,
    pub voltage: Real,
    pub uptime_s: u64,
    pub heap_free: i64,
}

/// Everything that happened in one tick, for the caller to emit and log.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    /// Session-relative time at which the tick ran.
    pub elapsed_s: f64,
    /// Reported process reading (2-decimal precision).
    pub value: Real,
    pub target: Real,
    pub zone: Zone,
    /// Accepted and already-applied correction, if any.
    pub action: Option<DoseAction>,
    /// Gains behind the accepted correction.
    pub gains: Option<ZoneGains>,
    /// Reading fell outside the alarm band.
    pub out_of_range: bool,
    pub aux: AuxReadings,
}

/// One simulated node's control session.
#[derive(Debug)]
pub struct NodeSession<R: Rng> {
    opts: SessionOptions,
    model: ProcessModel<R>,
    controller: DoseController,
    elapsed_s: f64,
    last_correction_s: Option<f64>,
    ticks: u64,
    aux_rng: StdRng,
}

impl NodeSession<StdRng> {
    /// Session with seeded process noise and auxiliary readings.
    pub fn seeded(opts: SessionOptions, seed: u64) -> SimResult<Self> {
        let model = ProcessModel::seeded(opts.process, seed)?;
        Self::over_model(opts, model, StdRng::seed_from_u64(seed ^ 0x5eed))
    }

    /// Session with entropy-seeded randomness.
    pub fn from_entropy(opts: SessionOptions) -> SimResult<Self> {
        let model = ProcessModel::from_entropy(opts.process)?;
        Self::over_model(opts, model, StdRng::from_entropy())
    }
}

impl<R: Rng> NodeSession<R> {
    fn over_model(opts: SessionOptions, model: ProcessModel<R>, aux_rng: StdRng) -> SimResult<Self> {
        let controller = DoseController::new(opts.min_dose_ml, opts.max_dose_ml)?;
        Ok(Self {
            opts,
            model,
            controller,
            elapsed_s: 0.0,
            last_correction_s: None,
            ticks: 0,
            aux_rng,
        })
    }

    /// Run one synchronous control cycle.
    pub fn tick(&mut self) -> TickReport {
        let target = self.model.target();
        let value = self.model.advance();
        let zone = classify_zone(value, target);

        let action = self.controller.evaluate(
            value,
            target,
            zone,
            self.elapsed_s,
            self.last_correction_s,
            self.opts.correction_interval_s,
        );
        let gains = action.and_then(|_| ZoneGains::for_zone(zone));
        if let Some(action) = &action {
            self.model.apply_dose(action);
            self.last_correction_s = Some(self.elapsed_s);
        }

        // Escalation is independent of the cadence gate and dead-band.
        let out_of_range = self.opts.alarm_band.is_out_of_range(value);

        let report = TickReport {
            tick: self.ticks + 1,
            elapsed_s: self.elapsed_s,
            value,
            target,
            zone,
            action,
            gains,
            out_of_range,
            aux: self.sample_aux(),
        };

        self.ticks += 1;
        self.elapsed_s += self.opts.tick_period_s;
        report
    }

    fn sample_aux(&mut self) -> AuxReadings {
        AuxReadings {
            temperature_c: 25.0 + self.aux_rng.gen_range(-2.0..2.0),
            voltage: 3.3 + self.aux_rng.gen_range(-0.1..0.1),
            uptime_s: self.elapsed_s as u64,
            heap_free: 50_000 + self.aux_rng.gen_range(-5_000..5_000),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.opts
    }

    /// Post-dose process value at full precision.
    pub fn process_value(&self) -> Real {
        self.model.value()
    }
}
