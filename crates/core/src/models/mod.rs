pub mod adjunct;
pub mod diagnostic_event;
pub mod job;
pub mod result_code;
pub mod result_record;

pub use adjunct::Adjunct;
pub use diagnostic_event::DiagnosticEvent;
pub use job::{Job, JobKind, JobMetadata, OPERATION_PULL, OPERATION_PUSH};
pub use result_code::ResultCode;
pub use result_record::ResultRecord;
