//! Application services - the operations exposed to the HTTP layer.

mod posts;
mod publication;
mod sweep;

pub use posts::PostService;
pub use publication::PublicationService;
pub use sweep::{SchedulerSweep, SweepConfig, SweepFailure, SweepReport};
