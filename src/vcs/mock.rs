use crate::domain::WorkingCopyStatus;
use crate::error::{ReleaseError, Result};
use crate::vcs::VcsAdapter;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// A commit recorded by [MockVcs]
#[derive(Debug, Clone, PartialEq)]
pub struct MockCommit {
    pub id: String,
    pub message: String,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Default)]
struct MockState {
    status: WorkingCopyStatus,
    /// operation -> first call number (1-based) that fails
    failures: HashMap<String, usize>,
    call_counts: HashMap<String, usize>,
    calls: Vec<String>,
    commits: Vec<MockCommit>,
    tags: Vec<String>,
    pushed: Vec<Vec<String>>,
    reject_tags: bool,
    lock_path: Option<PathBuf>,
    reverted: Vec<String>,
    deleted_tags: Vec<String>,
}

/// Mock version control for testing without a repository
///
/// Records every call and keeps an in-memory commit and tag list, so tests
/// can assert which mutations happened and which were undone.
#[derive(Debug, Default)]
pub struct MockVcs {
    state: RefCell<MockState>,
}

impl MockVcs {
    /// Create a mock reporting the given working-copy status
    pub fn new(status: WorkingCopyStatus) -> Self {
        MockVcs {
            state: RefCell::new(MockState {
                status,
                ..Default::default()
            }),
        }
    }

    /// Make every call of `operation` fail
    pub fn fail_on(self, operation: &str) -> Self {
        self.fail_from(operation, 1)
    }

    /// Make `operation` fail from its `nth` call (1-based) onwards
    pub fn fail_from(self, operation: &str, nth: usize) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert(operation.to_string(), nth);
        self
    }

    /// Make release runs lock `path`
    pub fn with_lock(self, path: impl Into<PathBuf>) -> Self {
        self.state.borrow_mut().lock_path = Some(path.into());
        self
    }

    /// Accept the branch but reject every tag on push
    pub fn reject_tags_on_push(self) -> Self {
        self.state.borrow_mut().reject_tags = true;
        self
    }

    /// Operation names in call order
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Commits currently on the mock branch
    pub fn commits(&self) -> Vec<MockCommit> {
        self.state.borrow().commits.clone()
    }

    /// Tags currently present
    pub fn tags(&self) -> Vec<String> {
        self.state.borrow().tags.clone()
    }

    /// Tag lists of successful pushes
    pub fn pushed(&self) -> Vec<Vec<String>> {
        self.state.borrow().pushed.clone()
    }

    pub fn reverted(&self) -> Vec<String> {
        self.state.borrow().reverted.clone()
    }

    pub fn deleted_tags(&self) -> Vec<String> {
        self.state.borrow().deleted_tags.clone()
    }

    /// True when nothing but read-only calls were made
    pub fn is_untouched(&self) -> bool {
        self.state.borrow().calls.iter().all(|op| {
            matches!(op.as_str(), "status" | "current_branch" | "refresh_remote")
        })
    }

    fn enter(&self, operation: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation.to_string());
        let count = {
            let count = state.call_counts.entry(operation.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        match state.failures.get(operation) {
            Some(&nth) if count >= nth => {
                Err(ReleaseError::vcs(operation, "simulated failure"))
            }
            _ => Ok(()),
        }
    }
}

impl VcsAdapter for MockVcs {
    fn status(&self) -> Result<WorkingCopyStatus> {
        self.enter("status")?;
        Ok(self.state.borrow().status.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        self.enter("current_branch")?;
        Ok(self.state.borrow().status.current_branch.clone())
    }

    fn refresh_remote(&self) -> Result<()> {
        self.enter("refresh_remote")
    }

    fn commit(&self, message: &str, files: &[PathBuf]) -> Result<String> {
        self.enter("commit")?;
        let mut state = self.state.borrow_mut();
        let id = format!("c{}", state.call_counts["commit"]);
        state.commits.push(MockCommit {
            id: id.clone(),
            message: message.to_string(),
            files: files.to_vec(),
        });
        Ok(id)
    }

    fn tag(&self, name: &str, _message: &str) -> Result<()> {
        self.enter("tag")?;
        let mut state = self.state.borrow_mut();
        if state.tags.iter().any(|t| t == name) {
            return Err(ReleaseError::vcs("tag", format!("tag '{}' already exists", name)));
        }
        state.tags.push(name.to_string());
        Ok(())
    }

    fn push(&self, tags: &[String]) -> Result<()> {
        self.enter("push")?;
        let mut state = self.state.borrow_mut();
        if state.reject_tags && !tags.is_empty() {
            let branch = state.status.current_branch.clone().unwrap_or_default();
            return Err(ReleaseError::PartialPush {
                remote: "origin".to_string(),
                pushed: vec![format!("refs/heads/{}", branch)],
                rejected: format!("refs/tags/{} rejected: already exists", tags[0]),
            });
        }
        state.pushed.push(tags.to_vec());
        Ok(())
    }

    fn revert_commit(&self, id: &str) -> Result<()> {
        self.enter("revert_commit")?;
        let mut state = self.state.borrow_mut();
        let is_head = state.commits.last().is_some_and(|head| head.id == id);
        if !is_head {
            return Err(ReleaseError::vcs(
                "revert_commit",
                format!("commit {} is not HEAD", id),
            ));
        }
        state.commits.pop();
        state.reverted.push(id.to_string());
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.enter("delete_tag")?;
        let mut state = self.state.borrow_mut();
        let position = state.tags.iter().position(|t| t == name).ok_or_else(|| {
            ReleaseError::vcs("delete_tag", format!("tag '{}' not found", name))
        })?;
        state.tags.remove(position);
        state.deleted_tags.push(name.to_string());
        Ok(())
    }

    fn run_lock_path(&self) -> Option<PathBuf> {
        self.state.borrow().lock_path.clone()
    }
}
