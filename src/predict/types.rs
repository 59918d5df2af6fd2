use chrono::{DateTime, Utc};
use serde::Serialize;

/// One contiguous run of visible samples, as indices into the timeline.
/// `start` is the first visible sample and `end` the first one after the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassInterval {
    pub start: usize,
    pub end: usize,
}

impl PassInterval {
    pub fn samples(&self) -> usize {
        self.end - self.start
    }
}

/// Outcome of looking for the next pass in a visibility mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPass {
    Found(PassInterval),
    NoPassFound,
}

/// A detected pass resolved against the sampled timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassWindow {
    pub satellite: String,
    pub interval: PassInterval,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub duration_minutes: usize,
    pub max_elevation_deg: f64,
}
