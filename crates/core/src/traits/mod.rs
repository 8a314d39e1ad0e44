pub mod diagnostics;
pub mod job_queue;
pub mod operations;

pub use diagnostics::*;
pub use job_queue::*;
pub use operations::*;
