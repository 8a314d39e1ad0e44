pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod shutdown;
pub mod traits;

pub use config::{CheckerConfig, MessageQueueType};
pub use errors::*;
pub use models::{
    Adjunct, DiagnosticEvent, Job, JobKind, JobMetadata, ResultCode, ResultRecord,
    OPERATION_PULL, OPERATION_PUSH,
};
pub use shutdown::ShutdownSignal;
pub use traits::{
    Diagnostics, JobQueue, NoopDiagnostics, OperationContext, OperationError, OperationResult,
    Operations, UnimplementedOperations,
};
