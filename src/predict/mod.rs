mod error;
mod ground_station;
mod pass_detector;
mod propagation;
mod timeline;
mod tle_loader;
mod types;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_detector::next_pass;
pub use propagation::{look_angles, OrbitPropagator, Sgp4Propagator};
pub use timeline::{build_timeline, DEFAULT_HORIZON_MINUTES, MAX_HORIZON_MINUTES};
pub use tle_loader::{ElementsSource, TleLoader};
pub use types::{NextPass, PassInterval, PassWindow};

#[cfg(test)]
pub use tle_loader::tests::iss_entry;
