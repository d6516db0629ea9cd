//! Release gates evaluated against a working-copy snapshot.

use crate::config::ReleaseConfig;
use crate::domain::WorkingCopyStatus;
use crate::error::GateFailure;
use regex::Regex;

/// Evaluates every enabled gate and reports the first one violated.
///
/// Pure: depends only on `status` and `config`, never touches the working copy.
pub fn check_preconditions(
    status: &WorkingCopyStatus,
    config: &ReleaseConfig,
) -> Result<(), GateFailure> {
    if config.fail_on_commit_needed && status.has_uncommitted_changes() {
        return Err(GateFailure::UncommittedChanges {
            files: status.uncommitted_files.clone(),
        });
    }

    if config.fail_on_unversioned_files && status.has_unversioned_files() {
        return Err(GateFailure::UnversionedFiles {
            files: status.unversioned_files.clone(),
        });
    }

    // No declared branch constraint means nothing to violate.
    if let Some(required) = &config.git.require_branch {
        let on_required = status
            .current_branch
            .as_deref()
            .is_some_and(|branch| branch_matches(required, branch));

        if !on_required {
            return Err(GateFailure::WrongBranch {
                expected: required.clone(),
                actual: status
                    .current_branch
                    .clone()
                    .unwrap_or_else(|| "(detached HEAD)".to_string()),
            });
        }
    }

    if config.fail_on_publish_needed && status.has_unpushed_commits() {
        return Err(GateFailure::UnpushedCommits {
            count: status.unpushed_commits,
        });
    }

    if config.fail_on_update_needed && status.behind_commits > 0 {
        return Err(GateFailure::UpdateNeeded {
            count: status.behind_commits,
        });
    }

    Ok(())
}

/// Whole-name match of `pattern` against `branch`. An invalid pattern
/// matches nothing, the same way `ReleaseConfig::validate` rejects it.
fn branch_matches(pattern: &str, branch: &str) -> bool {
    Regex::new(&format!("^(?:{})$", pattern)).is_ok_and(|re| re.is_match(branch))
}
