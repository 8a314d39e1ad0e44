pub mod diagnostics;
pub mod in_memory_queue;
pub mod message_queue_factory;
pub mod redis_queue;

pub use diagnostics::HttpDiagnostics;
pub use in_memory_queue::{InMemoryJobQueue, InMemoryQueueConfig};
pub use message_queue_factory::{create_diagnostics, MessageQueueFactory};
pub use redis_queue::{RedisJobQueue, RedisQueueConfig};
