pub mod one_compartment;

use crate::config::PatientConfig;
use crate::error::{PKError, PKResult};
use serde::Serialize;

pub use one_compartment::OneCompartmentModel;

/// Patient-specific constants derived once before stepping starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PharmacokineticParameters {
    pub body_weight: f64,         // kg
    pub distribution_volume: f64, // L
    pub clearance: f64,           // L/h
    pub ke: f64,                  // Elimination rate constant (1/h)
    pub half_life: f64,           // h
}

impl PharmacokineticParameters {
    /// Vd = weight * fraction, ke = CL / Vd, t1/2 = ln 2 / ke.
    ///
    /// Fails when any input is non-positive or non-finite, since the
    /// analytic step divides by `ke`.
    pub fn resolve(patient: &PatientConfig) -> PKResult<Self> {
        patient.validate()?;

        let distribution_volume = patient.body_weight * patient.distribution_volume_fraction;
        let clearance = patient.clearance_l_per_h();
        let ke = clearance / distribution_volume;
        if !(ke.is_finite() && ke > 0.0) {
            return Err(PKError::InvalidParameter(
                format!("elimination rate constant must be positive (got {})", ke)
            ));
        }

        Ok(Self {
            body_weight: patient.body_weight,
            distribution_volume,
            clearance,
            ke,
            half_life: std::f64::consts::LN_2 / ke,
        })
    }

    pub fn concentration(&self, amount: f64) -> f64 {
        amount / self.distribution_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClearanceUnit;
    use approx::assert_relative_eq;

    fn patient(body_weight: f64, renal_clearance: f64) -> PatientConfig {
        PatientConfig {
            body_weight,
            distribution_volume_fraction: 0.7,
            renal_clearance,
            clearance_unit: ClearanceUnit::LPerH,
        }
    }

    #[test]
    fn test_resolve_closed_form() {
        let params = PharmacokineticParameters::resolve(&patient(70.0, 1.8)).unwrap();

        assert_relative_eq!(params.distribution_volume, 49.0, epsilon = 1e-12);
        assert_relative_eq!(params.ke, 1.8 / 49.0, epsilon = 1e-15);
        assert_relative_eq!(params.half_life, 2f64.ln() / params.ke, epsilon = 1e-12);
        assert_relative_eq!(params.half_life, 18.869, epsilon = 1e-3);
    }

    #[test]
    fn test_resolve_converts_ml_per_min() {
        let mut input = patient(70.0, 30.0);
        input.clearance_unit = ClearanceUnit::MlPerMin;
        let params = PharmacokineticParameters::resolve(&input).unwrap();

        assert_relative_eq!(params.clearance, 1.8, epsilon = 1e-12);
        assert_relative_eq!(params.ke, 1.8 / 49.0, epsilon = 1e-12);
    }

    #[test]
    fn test_resolve_rejects_non_positive_inputs() {
        for input in [patient(0.0, 1.8), patient(-70.0, 1.8), patient(70.0, 0.0), patient(70.0, f64::INFINITY)] {
            assert!(matches!(
                PharmacokineticParameters::resolve(&input),
                Err(PKError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_concentration() {
        let params = PharmacokineticParameters::resolve(&patient(70.0, 1.8)).unwrap();
        assert_relative_eq!(params.concentration(1500.0), 1500.0 / 49.0, epsilon = 1e-12);
    }
}
