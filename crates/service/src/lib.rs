//! Service layer: the Batch Processor and the Intake Port.
//!
//! Sits between the HTTP edge / Worker Pool and `topicforge_storage` /
//! `topicforge_llm`, owning no state of its own beyond handles to those two.

mod batch_processor;
mod blocking;
mod error;
mod intake_service;

pub use batch_processor::{BatchOutcome, BatchProcessor, PerItemResult};
pub use error::ServiceError;
pub use intake_service::{IntakeService, ProcessingStatus};
