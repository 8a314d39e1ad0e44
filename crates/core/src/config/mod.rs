pub mod checker_config;

pub use checker_config::{CheckerConfig, MessageQueueType};
