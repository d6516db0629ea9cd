/// Snapshot of the working copy taken right before the release gates run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingCopyStatus {
    /// Tracked files with staged or unstaged modifications
    pub uncommitted_files: Vec<String>,
    /// Files not under version control (ignored files excluded)
    pub unversioned_files: Vec<String>,
    /// `None` when HEAD is detached
    pub current_branch: Option<String>,
    /// Local commits the upstream branch does not have
    pub unpushed_commits: usize,
    /// Upstream commits missing locally
    pub behind_commits: usize,
}

impl WorkingCopyStatus {
    /// A clean working copy on the given branch
    pub fn clean(branch: impl Into<String>) -> Self {
        WorkingCopyStatus {
            current_branch: Some(branch.into()),
            ..Default::default()
        }
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        !self.uncommitted_files.is_empty()
    }

    pub fn has_unversioned_files(&self) -> bool {
        !self.unversioned_files.is_empty()
    }

    pub fn has_unpushed_commits(&self) -> bool {
        self.unpushed_commits > 0
    }
}
