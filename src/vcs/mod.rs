//! Version control abstraction layer
//!
//! The release workflow talks to version control only through the
//! [VcsAdapter] trait, so one backend implementation can be swapped for
//! another. The concrete implementations are:
//!
//! - [git::Git2Vcs]: git backend built on the `git2` crate
//! - [mock::MockVcs]: in-memory backend for testing
//!
//! # Usage
//!
//! ```rust,no_run
//! # use git_release::vcs::{Git2Vcs, VcsAdapter};
//! # fn example() -> git_release::Result<()> {
//! let vcs = Git2Vcs::open(".", "origin")?;
//! let status = vcs.status()?;
//! println!("on {:?}, {} unpushed", status.current_branch, status.unpushed_commits);
//! # Ok(())
//! # }
//! ```

pub mod git;
pub mod mock;

pub use git::Git2Vcs;
pub use mock::MockVcs;

use crate::domain::WorkingCopyStatus;
use crate::error::Result;
use std::path::PathBuf;

/// Capability set the release workflow needs from a version control system.
///
/// ## Reversibility
///
/// Every mutating call has an inverse the workflow records right after the
/// call succeeds: [commit](VcsAdapter::commit) is undone by
/// [revert_commit](VcsAdapter::revert_commit), [tag](VcsAdapter::tag) by
/// [delete_tag](VcsAdapter::delete_tag). [push](VcsAdapter::push) is the last
/// step of a release and is never undone.
///
/// ## Error Handling
///
/// Implementations report failures as
/// [ReleaseError::VcsOperationFailed](crate::error::ReleaseError::VcsOperationFailed)
/// naming the operation. Timeouts are left to the underlying transport.
pub trait VcsAdapter {
    /// Snapshot of the working copy
    ///
    /// # Returns
    /// * `Ok(WorkingCopyStatus)` - Modified, untracked, branch and upstream state
    /// * `Err` - If the repository cannot be inspected
    fn status(&self) -> Result<WorkingCopyStatus>;

    /// Name of the checked-out branch, `None` on a detached HEAD
    fn current_branch(&self) -> Result<Option<String>>;

    /// Update remote-tracking state so ahead/behind counts are current
    fn refresh_remote(&self) -> Result<()>;

    /// Commit the given files (absolute, or relative to the working copy root) on HEAD
    ///
    /// # Returns
    /// * `Ok(String)` - Identifier of the new commit
    /// * `Err` - If staging or committing fails
    fn commit(&self, message: &str, files: &[PathBuf]) -> Result<String>;

    /// Create tag `name` on HEAD with the given message
    fn tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push the current branch together with the given tags
    fn push(&self, tags: &[String]) -> Result<()>;

    /// Undo commit `id`, which must be HEAD. The committed changes stay in
    /// the working tree.
    fn revert_commit(&self, id: &str) -> Result<()>;

    /// Remove tag `name`
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// File a release run locks for its whole duration, `None` for backends
    /// that need no cross-process exclusion
    fn run_lock_path(&self) -> Option<PathBuf> {
        None
    }
}
