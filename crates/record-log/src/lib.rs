//! Activity log sinks for record lifecycle events.

mod jsonl;
mod memory;

pub use jsonl::JsonlActivityLog;
pub use memory::InMemoryActivityLog;
pub use record_types::{ActivityLog, ActivityLogError, LogEntry, LogListOptions};
