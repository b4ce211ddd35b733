use serde::{Deserialize, Serialize};
use std::path::Path;
use log::warn;
use crate::error::{PKError, PKResult};

/// Relative slack used when checking whether the step evenly divides the interval.
const DIVISIBILITY_TOLERANCE: f64 = 1e-9;

/// Upper bound on recorded time points and on maintenance doses per run.
const MAX_STEPS: f64 = 10_000_000.0;

/// Upper bound on infusions running at once or started within one step.
const MAX_CONCURRENT_INFUSIONS: f64 = 10_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub patient: PatientConfig,
    pub regimen: DosingRegimen,
    #[serde(default)]
    pub therapeutic_band: TherapeuticBand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientConfig {
    pub body_weight: f64,                  // kg
    pub distribution_volume_fraction: f64, // L/kg
    pub renal_clearance: f64,
    #[serde(default)]
    pub clearance_unit: ClearanceUnit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceUnit {
    #[default]
    LPerH,
    MlPerMin,
}

impl ClearanceUnit {
    pub fn to_litres_per_hour(self, value: f64) -> f64 {
        match self {
            ClearanceUnit::LPerH => value,
            ClearanceUnit::MlPerMin => value / 1000.0 * 60.0,
        }
    }
}

/// Loading dose plus a fixed maintenance infusion repeated every `dosing_interval`.
/// Amounts are in mg, durations in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosingRegimen {
    pub loading_dose: f64,
    pub maintenance_dose: f64,
    pub infusion_duration: f64,
    pub dosing_interval: f64,
    pub treatment_duration: f64,
    pub time_step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TherapeuticBand {
    pub lower: f64, // mg/L
    pub upper: f64, // mg/L
}

impl Default for TherapeuticBand {
    fn default() -> Self {
        Self { lower: 15.0, upper: 20.0 }
    }
}

impl TherapeuticBand {
    pub fn contains(&self, concentration: f64) -> bool {
        concentration >= self.lower && concentration <= self.upper
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> PKResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PKResult<()> {
        self.patient.validate()?;
        self.regimen.validate()?;
        self.validate_band()
    }

    fn validate_band(&self) -> PKResult<()> {
        let band = &self.therapeutic_band;
        if !band.lower.is_finite() || !band.upper.is_finite() {
            return Err(PKError::Validation(
                "Therapeutic band bounds must be finite".to_string()
            ));
        }
        if band.lower < 0.0 || band.lower >= band.upper {
            return Err(PKError::Validation(format!(
                "Therapeutic band must satisfy 0 <= lower < upper (got {} - {})",
                band.lower, band.upper
            )));
        }
        Ok(())
    }
}

impl PatientConfig {
    pub fn validate(&self) -> PKResult<()> {
        require_positive("body_weight", self.body_weight, PKError::InvalidParameter)?;
        require_positive(
            "distribution_volume_fraction",
            self.distribution_volume_fraction,
            PKError::InvalidParameter,
        )?;
        require_positive("renal_clearance", self.renal_clearance, PKError::InvalidParameter)
    }

    /// Renal clearance in L/h regardless of the configured unit.
    pub fn clearance_l_per_h(&self) -> f64 {
        self.clearance_unit.to_litres_per_hour(self.renal_clearance)
    }
}

impl DosingRegimen {
    pub fn validate(&self) -> PKResult<()> {
        require_positive("time_step", self.time_step, PKError::InvalidRegimen)?;
        require_positive("infusion_duration", self.infusion_duration, PKError::InvalidRegimen)?;
        require_positive("dosing_interval", self.dosing_interval, PKError::InvalidRegimen)?;
        require_non_negative("treatment_duration", self.treatment_duration)?;
        require_non_negative("loading_dose", self.loading_dose)?;
        require_non_negative("maintenance_dose", self.maintenance_dose)?;
        self.validate_workload()?;

        if self.time_step > self.infusion_duration {
            warn!(
                "time_step {} h exceeds infusion_duration {} h; infusions will be stretched to whole steps",
                self.time_step, self.infusion_duration
            );
        }

        let steps_per_interval = self.dosing_interval / self.time_step;
        if (steps_per_interval - steps_per_interval.round()).abs()
            > DIVISIBILITY_TOLERANCE * steps_per_interval.max(1.0)
        {
            warn!(
                "time_step {} h does not evenly divide dosing_interval {} h; doses start at the nearest step",
                self.time_step, self.dosing_interval
            );
        }

        Ok(())
    }

    /// Keeps the step count and the active infusion set bounded so a run
    /// always terminates without exhausting memory.
    fn validate_workload(&self) -> PKResult<()> {
        let steps = self.treatment_duration / self.time_step;
        if steps > MAX_STEPS {
            return Err(PKError::InvalidRegimen(format!(
                "treatment_duration / time_step = {:e} exceeds {} steps",
                steps, MAX_STEPS
            )));
        }

        let doses = self.treatment_duration / self.dosing_interval;
        if doses > MAX_STEPS {
            return Err(PKError::InvalidRegimen(format!(
                "treatment_duration / dosing_interval = {:e} exceeds {} doses",
                doses, MAX_STEPS
            )));
        }

        let doses_per_step = self.time_step / self.dosing_interval;
        if doses_per_step > MAX_CONCURRENT_INFUSIONS {
            return Err(PKError::InvalidRegimen(format!(
                "time_step / dosing_interval = {:e} exceeds {} doses per step",
                doses_per_step, MAX_CONCURRENT_INFUSIONS
            )));
        }

        let overlapping = self.infusion_duration / self.dosing_interval;
        if overlapping > MAX_CONCURRENT_INFUSIONS {
            return Err(PKError::InvalidRegimen(format!(
                "infusion_duration / dosing_interval = {:e} exceeds {} overlapping infusions",
                overlapping, MAX_CONCURRENT_INFUSIONS
            )));
        }

        Ok(())
    }

    /// Constant input rate of a single maintenance infusion (mg/h).
    pub fn infusion_rate(&self) -> f64 {
        self.maintenance_dose / self.infusion_duration
    }

    /// Index of the last recorded step; time at step `i` is `i * time_step`.
    pub fn last_step(&self) -> usize {
        (self.treatment_duration / self.time_step + DIVISIBILITY_TOLERANCE).floor() as usize
    }
}

fn require_positive(name: &str, value: f64, err: fn(String) -> PKError) -> PKResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(err(format!("{} must be positive and finite (got {})", name, value)));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> PKResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PKError::InvalidRegimen(
            format!("{} must be non-negative and finite (got {})", name, value)
        ));
    }
    Ok(())
}
