use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::{ReleaseError, Result};
use crate::vcs::VcsAdapter;

/// Compensating action for a mutation the release already performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Write back the contents the version file had before the release touched it
    RestoreVersionFile { path: PathBuf, contents: String },
    RevertCommit { id: String },
    DeleteTag { name: String },
}

impl UndoAction {
    /// Perform the compensation
    pub fn undo(&self, vcs: &dyn VcsAdapter) -> Result<()> {
        match self {
            UndoAction::RestoreVersionFile { path, contents } => {
                fs::write(path, contents).map_err(|e| {
                    ReleaseError::version_file(format!(
                        "Cannot restore {}: {}",
                        path.display(),
                        e
                    ))
                })
            }
            UndoAction::RevertCommit { id } => vcs.revert_commit(id),
            UndoAction::DeleteTag { name } => vcs.delete_tag(name),
        }
    }
}

impl fmt::Display for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoAction::RestoreVersionFile { path, .. } => {
                write!(f, "restore {}", path.display())
            }
            UndoAction::RevertCommit { id } => write!(f, "revert commit {}", id),
            UndoAction::DeleteTag { name } => write!(f, "delete tag {}", name),
        }
    }
}

/// Ordered log of undo actions, replayed newest first.
///
/// Each mutation records its inverse when it is acquired; a successful run
/// disarms the log so nothing is replayed.
#[derive(Debug, Default)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

impl UndoLog {
    pub fn new() -> Self {
        UndoLog::default()
    }

    pub fn record(&mut self, action: UndoAction) {
        log::debug!("Recorded undo action: {}", action);
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Recorded actions, oldest first
    pub fn actions(&self) -> &[UndoAction] {
        &self.actions
    }

    /// Forget every recorded action; the mutations become permanent
    pub fn disarm(&mut self) {
        self.actions.clear();
    }

    /// Undo the recorded actions in reverse order.
    ///
    /// Stops at the first undo that fails. The log keeps whatever is still
    /// applied.
    ///
    /// # Returns
    /// * `Ok(n)` - All `n` actions were undone
    /// * `Err((error, pending))` - An undo failed; `pending` lists the actions
    ///   still applied, newest (the failed one) first
    pub fn rollback(
        &mut self,
        vcs: &dyn VcsAdapter,
    ) -> std::result::Result<usize, (ReleaseError, Vec<UndoAction>)> {
        let mut undone = 0;
        while let Some(action) = self.actions.pop() {
            log::info!("Rolling back: {}", action);
            if let Err(cause) = action.undo(vcs) {
                let error = ReleaseError::RollbackFailed {
                    action: action.to_string(),
                    cause: Box::new(cause),
                };
                self.actions.push(action);
                let pending = self.actions.iter().rev().cloned().collect();
                return Err((error, pending));
            }
            undone += 1;
        }
        Ok(undone)
    }
}
