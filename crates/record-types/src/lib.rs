//! Core types and traits for record lifecycle management.
//!
//! `Record<B>` wraps a concrete body `B` with identity, tenancy, audit stamps,
//! and the two workflow axes (approval, publication).

mod dto;
mod geo;
mod lifecycle;
mod record;
mod traits;

pub use dto::*;
pub use geo::*;
pub use lifecycle::*;
pub use record::*;
pub use traits::*;
