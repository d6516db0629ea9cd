//! Domain logic - pure release rules independent of version control

pub mod status;
pub mod tag;
pub mod version;

pub use status::WorkingCopyStatus;
pub use tag::TagTemplate;
pub use version::{Increment, Version, VersionPolicy};
