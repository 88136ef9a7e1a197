pub mod engine;
pub mod report;
pub mod retry;

pub use engine::SyncEngine;
pub use gatesync_core::event::{Event, Op};
pub use report::{ActionOutcome, ActionReport, SyncReport};
pub use retry::RetryPolicy;
