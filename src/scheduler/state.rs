use strum_macros::Display;

use crate::scheduler::error::ScheduleError;

/// Progress of a single scheduling request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestState {
    Idle,
    Sampling,
    Detecting,
    Scheduled,
    NoPassFound,
    SatelliteNotFound,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RequestState::Idle | RequestState::Sampling | RequestState::Detecting
        )
    }
}

impl ScheduleError {
    pub fn terminal_state(&self) -> RequestState {
        match self {
            ScheduleError::SatelliteNotFound(_) => RequestState::SatelliteNotFound,
            ScheduleError::NoPassFound(_) => RequestState::NoPassFound,
            ScheduleError::Predict(_) | ScheduleError::Job(_) => RequestState::Failed,
        }
    }
}
