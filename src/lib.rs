pub mod app;
pub mod common;
pub mod shutdown;

pub use app::Application;
pub use common::{run_checker, run_with_config};
pub use shutdown::ShutdownManager;

pub use checker_core::{
    JobMetadata, OperationContext, OperationError, OperationResult, Operations, ResultCode,
};
