use chrono::{DateTime, Utc};

use crate::executor::DeferredJob;
use crate::predict::{
    build_timeline, next_pass, ElementsSource, GroundStation, NextPass, OrbitPropagator,
    PassInterval, PassWindow, PredictError,
};
use crate::scheduler::{RequestState, ScheduleError};

/// Minutes the action is started ahead of the first visible sample
pub const LEAD_MINUTES: usize = 1;

/// Delay before running the action for a pass starting at `start_index`
pub fn wait_minutes(start_index: usize) -> u32 {
    u32::try_from(start_index.saturating_sub(LEAD_MINUTES)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub pass: PassWindow,
    pub wait_minutes: u32,
}

/// Finds the next pass of a satellite over one ground station and hands the
/// action to a deferred job queue.
pub struct PassScheduler<P, J> {
    station: GroundStation,
    horizon_minutes: u32,
    propagator: P,
    jobs: J,
}

impl<P, J: DeferredJob> PassScheduler<P, J> {
    pub fn new(station: GroundStation, horizon_minutes: u32, propagator: P, jobs: J) -> Self {
        Self {
            station,
            horizon_minutes,
            propagator,
            jobs,
        }
    }

    pub fn station(&self) -> &GroundStation {
        &self.station
    }

    pub fn get_next_pass<E>(
        &self,
        satellite: &str,
        elements: &E,
        now: DateTime<Utc>,
    ) -> Result<PassWindow, ScheduleError>
    where
        P: OrbitPropagator<E>,
    {
        log::debug!("{}: {}", satellite, RequestState::Sampling);
        let timeline = build_timeline(now, self.horizon_minutes);
        let elevations = self
            .propagator
            .elevations(elements, &self.station, &timeline)?;
        if elevations.len() != timeline.len() {
            return Err(PredictError::Misaligned {
                expected: timeline.len(),
                got: elevations.len(),
            }
            .into());
        }

        log::debug!("{}: {}", satellite, RequestState::Detecting);
        let mask: Vec<bool> = elevations.iter().map(|el| *el > 0.0).collect();
        match next_pass(&mask) {
            NextPass::Found(interval) => Ok(resolve_window(
                satellite,
                interval,
                &timeline,
                &elevations,
            )),
            NextPass::NoPassFound => Err(ScheduleError::NoPassFound(satellite.to_string())),
        }
    }

    /// Look up `satellite` and find its next pass without scheduling
    pub fn find_next_pass<S>(
        &self,
        satellite: &str,
        source: &S,
        now: DateTime<Utc>,
    ) -> Result<PassWindow, ScheduleError>
    where
        S: ElementsSource,
        P: OrbitPropagator<S::Elements>,
    {
        log::debug!("{}: {}", satellite, RequestState::Idle);
        let result = self.lookup_and_predict(satellite, source, now);
        if let Err(e) = &result {
            log_terminal(satellite, e.terminal_state());
        }
        result
    }

    pub fn schedule<S>(
        &self,
        satellite: &str,
        source: &S,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<Scheduled, ScheduleError>
    where
        S: ElementsSource,
        P: OrbitPropagator<S::Elements>,
    {
        log::debug!("{}: {}", satellite, RequestState::Idle);
        let result = self.try_schedule(satellite, source, action, now);

        let state = match &result {
            Ok(_) => RequestState::Scheduled,
            Err(e) => e.terminal_state(),
        };
        log_terminal(satellite, state);
        result
    }

    fn lookup_and_predict<S>(
        &self,
        satellite: &str,
        source: &S,
        now: DateTime<Utc>,
    ) -> Result<PassWindow, ScheduleError>
    where
        S: ElementsSource,
        P: OrbitPropagator<S::Elements>,
    {
        let elements = source
            .lookup(satellite)
            .ok_or_else(|| ScheduleError::SatelliteNotFound(satellite.to_string()))?;
        self.get_next_pass(satellite, elements, now)
    }

    fn try_schedule<S>(
        &self,
        satellite: &str,
        source: &S,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<Scheduled, ScheduleError>
    where
        S: ElementsSource,
        P: OrbitPropagator<S::Elements>,
    {
        let pass = self.lookup_and_predict(satellite, source, now)?;
        let wait_minutes = wait_minutes(pass.interval.start);
        log::info!(
            "Next pass of {} at {} (max elevation {:.1} deg), waiting {} minutes",
            satellite,
            pass.aos,
            pass.max_elevation_deg,
            wait_minutes
        );

        self.jobs.schedule_after(wait_minutes, action)?;
        Ok(Scheduled { pass, wait_minutes })
    }
}

fn log_terminal(satellite: &str, state: RequestState) {
    debug_assert!(state.is_terminal());
    log::debug!("{}: {}", satellite, state);
}

fn resolve_window(
    satellite: &str,
    interval: PassInterval,
    timeline: &[DateTime<Utc>],
    elevations: &[f64],
) -> PassWindow {
    let max_elevation_deg = elevations[interval.start..interval.end]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    PassWindow {
        satellite: satellite.to_string(),
        interval,
        aos: timeline[interval.start],
        los: timeline[interval.end],
        duration_minutes: interval.samples(),
        max_elevation_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorError;
    use crate::predict::{iss_entry, Sgp4Propagator};
    use chrono::{Duration, TimeZone};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Elevation profile indexed by minute offset; anything past the end is
    /// below the horizon.
    struct ProfilePropagator {
        calls: Cell<usize>,
    }

    impl ProfilePropagator {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl OrbitPropagator<Vec<f64>> for ProfilePropagator {
        fn elevations(
            &self,
            profile: &Vec<f64>,
            _station: &GroundStation,
            instants: &[DateTime<Utc>],
        ) -> Result<Vec<f64>, PredictError> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..instants.len())
                .map(|i| profile.get(i).copied().unwrap_or(-10.0))
                .collect())
        }
    }

    struct ShortPropagator;

    impl OrbitPropagator<Vec<f64>> for ShortPropagator {
        fn elevations(
            &self,
            profile: &Vec<f64>,
            _station: &GroundStation,
            _instants: &[DateTime<Utc>],
        ) -> Result<Vec<f64>, PredictError> {
            Ok(profile.clone())
        }
    }

    #[derive(Default)]
    struct RecordingJobs {
        calls: RefCell<Vec<(u32, String)>>,
        reject: bool,
    }

    impl DeferredJob for RecordingJobs {
        fn schedule_after(&self, wait_minutes: u32, action: &str) -> Result<(), ExecutorError> {
            self.calls
                .borrow_mut()
                .push((wait_minutes, action.to_string()));
            if self.reject {
                return Err(ExecutorError::Rejected {
                    program: "at".into(),
                    status: "exit status: 1".into(),
                    stderr: "cannot open lockfile".into(),
                });
            }
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 21, 30, 27).unwrap()
    }

    /// Below the horizon except for `pass` minutes starting at `start`
    fn profile(start: usize, pass: usize) -> Vec<f64> {
        (0..1440)
            .map(|i| {
                if i >= start && i < start + pass {
                    5.0 + i as f64 - start as f64
                } else {
                    -20.0
                }
            })
            .collect()
    }

    fn scheduler(
        jobs: RecordingJobs,
    ) -> PassScheduler<ProfilePropagator, RecordingJobs> {
        PassScheduler::new(
            GroundStation::default(),
            1440,
            ProfilePropagator::new(),
            jobs,
        )
    }

    fn source(name: &str, elevations: Vec<f64>) -> HashMap<String, Vec<f64>> {
        HashMap::from([(name.to_string(), elevations)])
    }

    #[test]
    fn wait_leads_the_pass_by_one_minute() {
        assert_eq!(wait_minutes(0), 0);
        assert_eq!(wait_minutes(1), 0);
        assert_eq!(wait_minutes(10), 9);
    }

    #[test]
    fn unknown_satellite_schedules_nothing() {
        let s = scheduler(RecordingJobs::default());
        let err = s
            .schedule("ACRUX-2", &source("ACRUX-1", profile(10, 8)), "python3 pass.py", now())
            .unwrap_err();

        assert!(matches!(err, ScheduleError::SatelliteNotFound(ref name) if name == "ACRUX-2"));
        assert!(s.jobs.calls.borrow().is_empty());
        assert_eq!(s.propagator.calls.get(), 0);
    }

    #[test]
    fn detected_pass_is_scheduled_once() {
        let s = scheduler(RecordingJobs::default());
        let scheduled = s
            .schedule("ACRUX-1", &source("ACRUX-1", profile(10, 8)), "python3 pass.py", now())
            .unwrap();

        assert_eq!(scheduled.wait_minutes, 9);
        assert_eq!(
            *s.jobs.calls.borrow(),
            vec![(9, "python3 pass.py".to_string())]
        );
        assert_eq!(s.propagator.calls.get(), 1);

        let pass = scheduled.pass;
        let minute = Utc.with_ymd_and_hms(2024, 5, 4, 21, 30, 0).unwrap();
        assert_eq!(pass.interval, PassInterval { start: 10, end: 18 });
        assert_eq!(pass.aos, minute + Duration::minutes(10));
        assert_eq!(pass.los, minute + Duration::minutes(18));
        assert_eq!(pass.duration_minutes, 8);
        assert_eq!(pass.max_elevation_deg, 12.0);
    }

    #[test]
    fn pass_in_the_first_minute_runs_immediately() {
        let s = scheduler(RecordingJobs::default());
        let scheduled = s
            .schedule("ACRUX-1", &source("ACRUX-1", profile(1, 5)), "true", now())
            .unwrap();
        assert_eq!(scheduled.wait_minutes, 0);
        assert_eq!(s.jobs.calls.borrow()[0].0, 0);
    }

    #[test]
    fn no_pass_in_horizon_is_reported() {
        let s = scheduler(RecordingJobs::default());
        let err = s
            .schedule("ACRUX-1", &source("ACRUX-1", vec![-1.0; 1440]), "true", now())
            .unwrap_err();

        assert!(matches!(err, ScheduleError::NoPassFound(ref name) if name == "ACRUX-1"));
        assert_eq!(err.terminal_state(), RequestState::NoPassFound);
        assert!(s.jobs.calls.borrow().is_empty());
    }

    #[test]
    fn pass_cut_off_by_the_horizon_is_not_scheduled() {
        let s = scheduler(RecordingJobs::default());
        let err = s
            .schedule("ACRUX-1", &source("ACRUX-1", profile(1435, 30)), "true", now())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NoPassFound(_)));
    }

    #[test]
    fn exactly_zero_elevation_is_not_visible() {
        let s = scheduler(RecordingJobs::default());
        let mut elevations = vec![-3.0; 1440];
        elevations[4] = 0.0;
        elevations[5] = 0.0;
        let err = s.get_next_pass("ACRUX-1", &elevations, now()).unwrap_err();
        assert!(matches!(err, ScheduleError::NoPassFound(_)));
    }

    #[test]
    fn rejected_job_is_a_scheduling_failure() {
        let s = scheduler(RecordingJobs {
            reject: true,
            ..Default::default()
        });
        let err = s
            .schedule("ACRUX-1", &source("ACRUX-1", profile(10, 8)), "true", now())
            .unwrap_err();

        assert!(matches!(err, ScheduleError::Job(_)));
        assert_eq!(err.terminal_state(), RequestState::Failed);
        assert_eq!(s.jobs.calls.borrow().len(), 1);
    }

    #[test]
    fn misaligned_elevations_are_rejected() {
        let s = PassScheduler::new(
            GroundStation::default(),
            1440,
            ShortPropagator,
            RecordingJobs::default(),
        );
        let err = s
            .get_next_pass("ACRUX-1", &profile(10, 8)[..100].to_vec(), now())
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Predict(PredictError::Misaligned {
                expected: 1440,
                got: 100
            })
        ));
    }

    #[test]
    fn find_next_pass_looks_up_without_scheduling() {
        let s = scheduler(RecordingJobs::default());
        let elevations = source("ACRUX-1", profile(42, 6));

        let pass = s.find_next_pass("ACRUX-1", &elevations, now()).unwrap();
        assert_eq!(pass.interval, PassInterval { start: 42, end: 48 });
        assert!(s.jobs.calls.borrow().is_empty());

        let err = s.find_next_pass("ACRUX-9", &elevations, now()).unwrap_err();
        assert!(matches!(err, ScheduleError::SatelliteNotFound(ref name) if name == "ACRUX-9"));
        assert_eq!(s.propagator.calls.get(), 1);
    }

    #[test]
    fn same_now_gives_same_pass() {
        let s = scheduler(RecordingJobs::default());
        let elevations = profile(300, 11);
        let first = s.get_next_pass("ACRUX-1", &elevations, now()).unwrap();
        let second = s.get_next_pass("ACRUX-1", &elevations, now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn schedules_a_real_iss_pass() {
        let s = PassScheduler::new(
            GroundStation::default(),
            1440,
            Sgp4Propagator,
            RecordingJobs::default(),
        );
        let source = HashMap::from([("ISS (ZARYA)".to_string(), iss_entry())]);
        let now = Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap();

        let scheduled = s
            .schedule("ISS (ZARYA)", &source, "python3 track.py", now)
            .unwrap();
        let pass = &scheduled.pass;

        assert!(pass.aos >= now && pass.los > pass.aos);
        assert!(pass.max_elevation_deg > 0.0 && pass.max_elevation_deg <= 90.0);
        // LEO passes from a fixed site last minutes, not hours
        assert!(pass.duration_minutes >= 1 && pass.duration_minutes < 20);
        assert_eq!(
            scheduled.wait_minutes,
            pass.interval.start as u32 - 1
        );
        assert_eq!(s.jobs.calls.borrow().len(), 1);
    }
}
