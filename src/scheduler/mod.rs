mod error;
mod runner;
mod state;

pub use error::ScheduleError;
pub use runner::PassScheduler;
pub use state::RequestState;
