pub mod series;
pub mod summary;

use crate::config::{Config, DosingRegimen};
use crate::dosing::DosingScheduler;
use crate::error::PKResult;
use crate::models::{OneCompartmentModel, PharmacokineticParameters};
use log::{info, debug};

pub use series::*;
pub use summary::*;

/// Mutable state of a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub time: f64,
    pub amount: f64,
}

impl SimulationState {
    /// The loading dose is given as a bolus at time zero.
    pub fn initial(loading_dose: f64) -> Self {
        Self { time: 0.0, amount: loading_dose }
    }
}

pub struct Simulator {
    regimen: DosingRegimen,
    model: OneCompartmentModel,
}

impl Simulator {
    /// Validates the regimen and resolves patient constants; no stepping happens
    /// unless both succeed.
    pub fn new(config: &Config) -> PKResult<Self> {
        config.regimen.validate()?;
        let params = PharmacokineticParameters::resolve(&config.patient)?;
        debug!(
            "Resolved Vd = {:.3} L, CL = {:.3} L/h, ke = {:.5} 1/h, t1/2 = {:.2} h",
            params.distribution_volume, params.clearance, params.ke, params.half_life
        );

        Ok(Self {
            regimen: config.regimen.clone(),
            model: OneCompartmentModel::new(params),
        })
    }

    pub fn parameters(&self) -> &PharmacokineticParameters {
        self.model.parameters()
    }

    pub fn regimen(&self) -> &DosingRegimen {
        &self.regimen
    }

    /// Steps from time zero to the end of treatment, one point per `time_step`.
    ///
    /// For the step starting at `t` the scheduler expires finished infusions,
    /// starts any dose now due, and the summed rate is held constant until
    /// `t + time_step`. All state is local, so identical inputs give
    /// bit-identical output.
    pub fn run(&self) -> TimeSeries {
        let dt = self.regimen.time_step;
        let last_step = self.regimen.last_step();

        let mut scheduler = DosingScheduler::new(&self.regimen);
        let mut state = SimulationState::initial(self.regimen.loading_dose);
        let mut series = TimeSeries::with_capacity(last_step + 1);

        for step in 0..=last_step {
            state.time = step as f64 * dt;

            scheduler.expire(state.time);
            let doses_started = scheduler.schedule(state.time);
            let rate = scheduler.aggregate_rate();

            series.push(TimePoint {
                time: state.time,
                amount: state.amount,
                concentration: self.model.concentration(state.amount),
                infusion_rate: rate,
                doses_started,
            });

            if step < last_step {
                state.amount = self.model.advance(state.amount, rate, dt);
            }
        }

        info!(
            "Simulated {} time points over {} h ({} infusions still running at the end)",
            series.len(),
            state.time,
            scheduler.active_count()
        );
        series
    }
}
