//! Record lifecycle orchestration on top of a record store and activity log.

mod lifecycle;
mod nonce;

pub use lifecycle::{RecordLifecycle, TIMEAGO_SHIFT_HOURS};
pub use nonce::NonceObject;
pub use record_types::*;
