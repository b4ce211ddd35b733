use super::PharmacokineticParameters;

/// One-compartment model with first-order elimination and zero-order input.
#[derive(Debug, Clone)]
pub struct OneCompartmentModel {
    params: PharmacokineticParameters,
}

impl OneCompartmentModel {
    pub fn new(params: PharmacokineticParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &PharmacokineticParameters {
        &self.params
    }

    /// Exact solution of dA/dt = R - ke * A over `dt` with `rate` held constant:
    /// A(t + dt) = A * e^(-ke dt) + (R / ke) * (1 - e^(-ke dt))
    pub fn advance(&self, amount: f64, rate: f64, dt: f64) -> f64 {
        let ke = self.params.ke;
        let decay = (-ke * dt).exp();
        // 1 - e^(-ke dt) without cancellation for small ke * dt
        let accumulated = -(-ke * dt).exp_m1();

        // accumulated / ke tends to dt as ke -> 0, so it stays finite
        amount * decay + rate * (accumulated / ke)
    }

    pub fn concentration(&self, amount: f64) -> f64 {
        self.params.concentration(amount)
    }
}
