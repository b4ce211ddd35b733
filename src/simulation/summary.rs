use super::TimeSeries;
use crate::config::TherapeuticBand;
use serde::Serialize;

/// Exposure summary of one run against a therapeutic band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub band: TherapeuticBand,
    pub cmax: f64,
    pub tmax: f64,
    pub cmin: f64,
    pub auc: f64,
    pub fraction_in_band: f64,
    pub fraction_below: f64,
    pub fraction_above: f64,
    pub troughs: Vec<f64>,
}

impl SeriesSummary {
    pub fn from_series(series: &TimeSeries, band: TherapeuticBand) -> Self {
        let count = |pred: &dyn Fn(f64) -> bool| {
            series.pairs().filter(|&(_, c)| pred(c)).count()
        };
        let fraction = |k: usize| {
            if series.is_empty() { 0.0 } else { k as f64 / series.len() as f64 }
        };

        Self {
            band,
            cmax: series.max_concentration(),
            tmax: series.time_of_max().unwrap_or(0.0),
            cmin: series.min_concentration(),
            auc: series.auc(),
            fraction_in_band: fraction(count(&|c: f64| band.contains(c))),
            fraction_below: fraction(count(&|c: f64| c < band.lower)),
            fraction_above: fraction(count(&|c: f64| c > band.upper)),
            troughs: series.troughs(),
        }
    }
}
