use crate::config::DosingRegimen;
use log::debug;

/// Absorbs rounding noise when comparing infusion end times to step times.
const END_TIME_EPSILON: f64 = 1e-9;

/// A maintenance infusion delivering `rate` mg/h over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Infusion {
    pub start: f64,
    pub end: f64,
    pub rate: f64,
}

/// Tracks the infusions currently running and starts a new one whenever a
/// maintenance dose falls due. The loading dose is not an infusion; it seeds
/// the compartment directly.
#[derive(Debug, Clone)]
pub struct DosingScheduler {
    infusion_duration: f64,
    dosing_interval: f64,
    infusion_rate: f64,
    tolerance: f64,
    end_epsilon: f64,
    next_dose_index: u64,
    active: Vec<Infusion>,
}

impl DosingScheduler {
    pub fn new(regimen: &DosingRegimen) -> Self {
        Self {
            infusion_duration: regimen.infusion_duration,
            dosing_interval: regimen.dosing_interval,
            infusion_rate: regimen.infusion_rate(),
            tolerance: regimen.time_step / 2.0,
            end_epsilon: END_TIME_EPSILON * regimen.time_step,
            // The first maintenance dose is due one interval after the loading dose.
            next_dose_index: 1,
            active: Vec::new(),
        }
    }

    /// Removes every infusion whose end time has been reached. Returns how many were removed.
    pub fn expire(&mut self, time: f64) -> usize {
        let before = self.active.len();
        let epsilon = self.end_epsilon;
        self.active.retain(|infusion| {
            let running = infusion.end > time + epsilon;
            if !running {
                debug!("Infusion started at {:.3} h expired at {:.3} h", infusion.start, time);
            }
            running
        });
        before - self.active.len()
    }

    /// Sum of the rates of all active infusions (mg/h).
    pub fn aggregate_rate(&self) -> f64 {
        self.active.iter().map(|infusion| infusion.rate).sum()
    }

    /// Starts an infusion at `time` for every dose due within half a step of it.
    ///
    /// Due times come from `index * dosing_interval` rather than accumulated
    /// additions, so a step size that does not divide the interval shifts a dose
    /// to the nearest step instead of skipping it.
    pub fn schedule(&mut self, time: f64) -> usize {
        let mut started = 0;
        while self.next_due_time() <= time + self.tolerance {
            let infusion = Infusion {
                start: time,
                end: time + self.infusion_duration,
                rate: self.infusion_rate,
            };
            debug!(
                "Maintenance dose #{} (due {:.3} h) infusing {:.3} - {:.3} h at {:.3} mg/h",
                self.next_dose_index,
                self.next_due_time(),
                infusion.start,
                infusion.end,
                infusion.rate
            );
            self.active.push(infusion);
            self.next_dose_index += 1;
            started += 1;
        }
        started
    }

    pub fn next_due_time(&self) -> f64 {
        self.next_dose_index as f64 * self.dosing_interval
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn regimen(infusion_duration: f64, dosing_interval: f64, time_step: f64) -> DosingRegimen {
        DosingRegimen {
            loading_dose: 1500.0,
            maintenance_dose: 1200.0,
            infusion_duration,
            dosing_interval,
            treatment_duration: 168.0,
            time_step,
        }
    }

    fn step(scheduler: &mut DosingScheduler, t: f64) -> f64 {
        scheduler.expire(t);
        scheduler.schedule(t);
        scheduler.aggregate_rate()
    }

    /// Runs the scheduler over the whole treatment, returning (time, rate, active) per step.
    fn run(regimen: &DosingRegimen) -> Vec<(f64, f64, usize)> {
        let mut scheduler = DosingScheduler::new(regimen);
        (0..=regimen.last_step())
            .map(|i| {
                let t = i as f64 * regimen.time_step;
                let rate = step(&mut scheduler, t);
                (t, rate, scheduler.active_count())
            })
            .collect()
    }

    #[test]
    fn test_no_infusion_at_time_zero() {
        let mut scheduler = DosingScheduler::new(&regimen(3.0, 24.0, 0.5));
        assert_eq!(step(&mut scheduler, 0.0), 0.0);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.next_due_time(), 24.0);
    }

    #[test]
    fn test_infusion_active_over_half_open_interval() {
        let regimen = regimen(3.0, 24.0, 0.5);
        for (t, rate, _) in run(&regimen) {
            let in_infusion = (t % 24.0) < 3.0 && t >= 24.0;
            if in_infusion {
                assert_relative_eq!(rate, 400.0, epsilon = 1e-12);
            } else {
                assert_eq!(rate, 0.0, "unexpected input at t = {}", t);
            }
        }
    }

    #[test]
    fn test_expire_removes_infusion_ending_exactly_now() {
        let mut scheduler = DosingScheduler::new(&regimen(3.0, 24.0, 0.5));
        assert_eq!(scheduler.schedule(24.0), 1);
        assert_eq!(scheduler.expire(26.5), 0);
        assert_eq!(scheduler.expire(27.0), 1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_overlapping_infusions_sum() {
        let regimen = regimen(30.0, 24.0, 0.5);
        let steps = run(&regimen);

        let overlapping: Vec<_> = steps.iter().filter(|(_, _, active)| *active == 2).collect();
        assert!(!overlapping.is_empty());
        for (t, rate, _) in overlapping {
            assert_relative_eq!(*rate, 2.0 * 1200.0 / 30.0, epsilon = 1e-12);
            assert!(*t >= 48.0);
        }
        assert!(steps.iter().all(|(_, _, active)| *active <= 2));
    }

    #[test]
    fn test_uneven_step_does_not_skip_doses() {
        // 0.7 h does not divide 24 h; every interval still gets exactly one dose.
        let regimen = regimen(3.0, 24.0, 0.7);
        let mut scheduler = DosingScheduler::new(&regimen);
        let mut starts = Vec::new();
        for i in 0..=regimen.last_step() {
            let t = i as f64 * regimen.time_step;
            scheduler.expire(t);
            if scheduler.schedule(t) > 0 {
                starts.push(t);
            }
        }

        assert_eq!(starts.len(), 7);
        for (k, start) in starts.iter().enumerate() {
            let due = (k + 1) as f64 * 24.0;
            assert!((start - due).abs() <= 0.35 + 1e-9, "dose {} started at {}", k + 1, start);
        }
    }

    #[test]
    fn test_step_larger_than_interval_starts_every_due_dose() {
        let mut scheduler = DosingScheduler::new(&regimen(3.0, 24.0, 30.0));
        assert_eq!(scheduler.schedule(0.0), 0);
        assert_eq!(scheduler.schedule(30.0), 1);
        scheduler.expire(60.0);
        assert_eq!(scheduler.schedule(60.0), 2);
        assert_relative_eq!(scheduler.aggregate_rate(), 800.0, epsilon = 1e-12);
        scheduler.expire(90.0);
        assert_eq!(scheduler.schedule(90.0), 1);
    }
}
