use std::fmt;

use thiserror::Error;

use crate::release::{ReleaseRun, ReleaseStep, UndoAction};

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid version format: '{input}'")]
    InvalidVersionFormat { input: String },

    #[error("Precondition failed: {0}")]
    Gate(#[from] GateFailure),

    #[error("VCS operation '{operation}' failed: {cause}")]
    VcsOperationFailed { operation: String, cause: String },

    #[error("Push to '{remote}' was only partly accepted: {} pushed, {rejected}", .pushed.join(", "))]
    PartialPush {
        remote: String,
        pushed: Vec<String>,
        rejected: String,
    },

    #[error("Publish failed: {0}")]
    Publish(#[from] PublishFailure),

    #[error("Undo of '{action}' failed: {cause}")]
    RollbackFailed {
        action: String,
        cause: Box<ReleaseError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version file error: {0}")]
    VersionFile(String),

    #[error("Another release is already running for this working copy (lock: {path})")]
    RunInProgress { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    pub fn invalid_version(input: impl Into<String>) -> Self {
        ReleaseError::InvalidVersionFormat {
            input: input.into(),
        }
    }

    /// Create a VCS failure naming the operation that failed
    pub fn vcs(operation: impl Into<String>, cause: impl fmt::Display) -> Self {
        ReleaseError::VcsOperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    pub fn version_file(msg: impl Into<String>) -> Self {
        ReleaseError::VersionFile(msg.into())
    }
}

/// A violated release precondition. Raised before anything is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateFailure {
    #[error("You have uncommitted changes: {}", .files.join(", "))]
    UncommittedChanges { files: Vec<String> },

    #[error("You have unversioned files: {}", .files.join(", "))]
    UnversionedFiles { files: Vec<String> },

    #[error("Current branch is '{actual}' but releases require '{expected}'")]
    WrongBranch { expected: String, actual: String },

    #[error("You have {count} local commit(s) not pushed to the remote")]
    UnpushedCommits { count: usize },

    #[error("You are {count} commit(s) behind the remote, update first")]
    UpdateNeeded { count: usize },
}

/// Failure reported back by the external publish step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    pub task: String,
    pub exit_code: Option<i32>,
    pub output: String,
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' failed", self.task)?;
        if let Some(code) = self.exit_code {
            write!(f, " with exit code {}", code)?;
        }
        write!(f, ": {}", self.output)
    }
}

impl std::error::Error for PublishFailure {}

impl PublishFailure {
    pub fn new(task: impl Into<String>, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        PublishFailure {
            task: task.into(),
            exit_code,
            output: output.into(),
        }
    }
}

/// What happened to the recorded actions after a step failed
#[derive(Debug)]
pub enum RollbackOutcome {
    /// Nothing had been mutated yet
    NotNeeded,
    /// `revertOnFail` is off; these actions were left in place
    Skipped { pending: Vec<UndoAction> },
    Completed { undone: usize },
    /// An undo failed. `pending` lists what is still applied, the failed one first.
    Failed {
        error: ReleaseError,
        pending: Vec<UndoAction>,
    },
    /// The remote already accepted `pushed`; local history was left alone.
    RemoteAhead {
        pushed: Vec<String>,
        pending: Vec<UndoAction>,
    },
}

/// Composite failure of a release run: the failed step, its cause and the
/// outcome of the rollback that followed.
#[derive(Debug)]
pub struct ReleaseFailure {
    pub step: ReleaseStep,
    pub cause: ReleaseError,
    pub rollback: RollbackOutcome,
    pub run: ReleaseRun,
}

impl ReleaseFailure {
    /// True when the working copy was left in a state that needs manual repair
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            self.rollback,
            RollbackOutcome::Failed { .. } | RollbackOutcome::RemoteAhead { .. }
        )
    }
}

fn describe(actions: &[UndoAction]) -> String {
    actions
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Release failed at step {}: {}", self.step, self.cause)?;
        match &self.rollback {
            RollbackOutcome::NotNeeded => write!(f, "; nothing to roll back"),
            RollbackOutcome::Skipped { pending } => write!(
                f,
                "; rollback disabled (revertOnFail = false), left in place: {}",
                describe(pending)
            ),
            RollbackOutcome::Completed { undone } => {
                write!(f, "; rollback succeeded ({} action(s) undone)", undone)
            }
            RollbackOutcome::Failed { error, pending } => write!(
                f,
                "; rollback FAILED: {}; working copy is inconsistent, fix manually: {}",
                error,
                describe(pending)
            ),
            RollbackOutcome::RemoteAhead { pushed, pending } => write!(
                f,
                "; remote already holds {}, rollback skipped; working copy is inconsistent, fix manually: {}",
                pushed.join(", "),
                describe(pending)
            ),
        }
    }
}

impl std::error::Error for ReleaseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_vcs_error_names_operation() {
        let err = ReleaseError::vcs("tag", "reference already exists");
        let msg = err.to_string();
        assert!(msg.contains("'tag'"));
        assert!(msg.contains("reference already exists"));
    }

    #[test]
    fn test_gate_failure_messages() {
        let err: ReleaseError = GateFailure::UncommittedChanges {
            files: vec!["a.txt".to_string(), "b.txt".to_string()],
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Precondition failed: You have uncommitted changes: a.txt, b.txt"
        );

        let branch = GateFailure::WrongBranch {
            expected: "kotlin".to_string(),
            actual: "main".to_string(),
        };
        assert!(branch.to_string().contains("'main'"));
        assert!(branch.to_string().contains("'kotlin'"));
    }

    #[test]
    fn test_publish_failure_display() {
        let failure = PublishFailure::new("./publish.sh", Some(2), "denied");
        assert_eq!(
            failure.to_string(),
            "task './publish.sh' failed with exit code 2: denied"
        );

        let killed = PublishFailure::new("upload", None, "killed");
        assert_eq!(killed.to_string(), "task 'upload' failed: killed");
    }

    #[test]
    fn test_partial_push_names_refs() {
        let err = ReleaseError::PartialPush {
            remote: "origin".to_string(),
            pushed: vec!["refs/heads/main".to_string()],
            rejected: "refs/tags/v1.0 rejected: already exists".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'origin'"));
        assert!(msg.contains("refs/heads/main pushed"));
        assert!(msg.contains("refs/tags/v1.0 rejected"));
    }

    #[test]
    fn test_rollback_failed_wraps_cause() {
        let err = ReleaseError::RollbackFailed {
            action: "delete tag v1.0.0".to_string(),
            cause: Box::new(ReleaseError::vcs("delete_tag", "locked")),
        };
        let msg = err.to_string();
        assert!(msg.contains("delete tag v1.0.0"));
        assert!(msg.contains("locked"));
    }
}
