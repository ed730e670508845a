#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::shadow_unrelated, reason = "Shadowing in async blocks is idiomatic")]
#![allow(clippy::cognitive_complexity, reason = "Complex async handlers are inherent")]
#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

mod health;
mod topics;

pub use health::healthz;
pub use topics::{list_topics, processing_status, submit_topics, ListTopicsQuery, SubmitTopicsRequest};
