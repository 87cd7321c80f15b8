//! Default collaborator implementations for the record lifecycle.

mod base62;
mod clock;
mod site;
mod timeago;

pub use base62::Base62Encoder;
pub use clock::SystemClock;
#[cfg(feature = "test-util")]
pub use clock::ManualClock;
pub use record_types::{Clock, IdentifierEncoder, RelativeTime, SiteContext};
pub use site::StaticSite;
pub use timeago::TimeAgo;
