use std::fmt;

/// Non-fatal conditions met during a release run.
/// They are collected on the run and reported to the user at the end.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The remote could not be fetched; ahead/behind counts may be stale
    RemoteRefreshFailed { remote: String, cause: String },
    /// Publishing failed but `failOnPublishNeeded` is off
    PublishFailedNonFatal { tag: String, cause: String },
    /// Every release would get the same tag name
    TagTemplateWithoutVersion { template: String },
    /// The current version had no development suffix, so nothing was rewritten
    VersionUnchanged { version: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::RemoteRefreshFailed { remote, cause } => {
                write!(
                    f,
                    "Could not fetch from remote '{}', using local state: {}",
                    remote, cause
                )
            }
            BoundaryWarning::PublishFailedNonFatal { tag, cause } => {
                write!(
                    f,
                    "Publishing {} failed, continuing because failOnPublishNeeded = false: {}",
                    tag, cause
                )
            }
            BoundaryWarning::TagTemplateWithoutVersion { template } => {
                write!(
                    f,
                    "Tag template '{}' has no $version placeholder",
                    template
                )
            }
            BoundaryWarning::VersionUnchanged { version } => {
                write!(
                    f,
                    "Version {} is already a release version, releasing it as is",
                    version
                )
            }
        }
    }
}
