//! Publishing released artifacts
//!
//! The release workflow never builds anything itself. Once the release tag
//! exists it hands an [Artifact] description to a [Publisher], which
//! delegates to external tasks:
//! - `executor` - runs the configured publish commands
//! - `artifact` - what is being published, exposed to tasks as environment variables

pub mod artifact;
pub mod executor;

pub use artifact::Artifact;
pub use executor::CommandPublisher;

use crate::error::PublishFailure;

/// Triggers the downstream build/publish action for a tagged release
pub trait Publisher {
    /// Publish `artifact`, blocking until the external task finishes
    fn publish(&self, artifact: &Artifact) -> Result<(), PublishFailure>;
}
