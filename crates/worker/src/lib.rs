//! The Worker Pool: the polling scheduler between `topicforge_storage` and
//! the Batch Processor (`topicforge_service`).

mod pool;

pub use pool::{WorkerPool, WorkerPoolConfig};
