pub mod dispatcher;
mod panic_trace;
pub mod reporter;
pub mod summary;
pub mod timing;

pub use dispatcher::{DispatchError, DispatchOutcome, JobDispatcher};
pub use reporter::Reporter;
pub use summary::summary_line;
pub use timing::{JobTimer, JobTimings};
