pub mod components;
pub mod metrics;
pub mod service;

pub use components::{DispatchError, DispatchOutcome, JobDispatcher, JobTimer, JobTimings, Reporter};
pub use service::{WorkerService, WorkerServiceBuilder};
