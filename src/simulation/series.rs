use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub time: f64,          // h
    pub amount: f64,        // mg in the compartment
    pub concentration: f64, // mg/L
    pub infusion_rate: f64, // mg/h held over the step starting here
    pub doses_started: usize,
}

/// Append-only (time, concentration) record of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}

impl TimeSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, point: TimePoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|p| (p.time, p.concentration))
    }

    pub fn max_concentration(&self) -> f64 {
        self.points.iter()
            .map(|p| p.concentration)
            .fold(0.0, f64::max)
    }

    pub fn min_concentration(&self) -> f64 {
        self.points.iter()
            .map(|p| p.concentration)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    pub fn time_of_max(&self) -> Option<f64> {
        self.points.iter()
            .max_by(|a, b| a.concentration.total_cmp(&b.concentration))
            .map(|p| p.time)
    }

    /// Trapezoidal area under the concentration curve (mg*h/L).
    pub fn auc(&self) -> f64 {
        self.points.windows(2)
            .map(|w| (w[1].time - w[0].time) * (w[0].concentration + w[1].concentration) / 2.0)
            .sum()
    }

    /// Concentration at every time point where a maintenance infusion starts.
    pub fn troughs(&self) -> Vec<f64> {
        self.points.iter()
            .filter(|p| p.doses_started > 0)
            .map(|p| p.concentration)
            .collect()
    }
}
