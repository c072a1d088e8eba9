//! Data transfer objects for the picture service.
//!
//! These are plain records serialized as JSON via `serde`; none of them is
//! persisted by this service.

pub mod general;
pub mod picture;
