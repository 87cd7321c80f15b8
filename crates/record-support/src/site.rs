//! Fixed site context.

use record_types::{SiteContext, SiteContextError, SiteId};

/// Site context that always resolves to the same site, or to none.
#[derive(Debug, Clone, Copy)]
pub struct StaticSite(Option<SiteId>);

impl StaticSite {
    pub fn new(site: SiteId) -> Self {
        Self(Some(site))
    }

    /// A context with no current site; `current` fails.
    pub fn none() -> Self {
        Self(None)
    }
}

impl SiteContext for StaticSite {
    fn current(&self) -> Result<SiteId, SiteContextError> {
        self.0
            .ok_or_else(|| SiteContextError::Unavailable("no site configured".to_string()))
    }
}
