use crate::domain::WorkingCopyStatus;
use crate::error::{ReleaseError, Result};
use crate::vcs::VcsAdapter;
use git2::{BranchType, Repository, ResetType, Status, StatusOptions};
use std::path::{Path, PathBuf};

/// Git backend for [VcsAdapter] built on `git2`
pub struct Git2Vcs {
    repo: Repository,
    remote: String,
}

impl Git2Vcs {
    /// Open or discover the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P, remote: impl Into<String>) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| ReleaseError::vcs("open", format!("Not in a git repository: {}", e)))?;
        Ok(Git2Vcs::from_git2(repo, remote))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository, remote: impl Into<String>) -> Self {
        Git2Vcs {
            repo,
            remote: remote.into(),
        }
    }

    /// Root of the working copy
    pub fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| ReleaseError::vcs("open", "bare repositories cannot be released"))
    }

    /// Path of the per-working-copy run lock, inside the `.git` directory
    pub fn lock_path(&self) -> PathBuf {
        self.repo.path().join("release.lock")
    }

    /// Absolute paths are made relative to the working copy root; the index
    /// only accepts relative ones.
    fn relative_to_workdir(&self, file: &Path) -> Result<PathBuf> {
        if file.is_relative() {
            return Ok(file.to_path_buf());
        }
        let workdir = self.workdir()?;
        let canonical_root = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
        let canonical_file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
        canonical_file
            .strip_prefix(&canonical_root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ReleaseError::vcs(
                    "commit",
                    format!("{} is outside the working copy {}", file.display(), workdir.display()),
                )
            })
    }

    fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }

            git2::Cred::default()
        });
        callbacks
    }

    /// Local commits ahead of / behind the upstream of `branch`, (0, 0) without upstream
    fn ahead_behind(&self, branch: &str) -> Result<(usize, usize)> {
        let local = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(|e| ReleaseError::vcs("status", e))?;

        let upstream = match local.upstream() {
            Ok(upstream) => upstream,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok((0, 0)),
            Err(e) => return Err(ReleaseError::vcs("status", e)),
        };

        let (Some(local_oid), Some(upstream_oid)) =
            (local.get().target(), upstream.get().target())
        else {
            return Ok((0, 0));
        };

        self.repo
            .graph_ahead_behind(local_oid, upstream_oid)
            .map_err(|e| ReleaseError::vcs("status", e))
    }
}

impl VcsAdapter for Git2Vcs {
    fn status(&self) -> Result<WorkingCopyStatus> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .map_err(|e| ReleaseError::vcs("status", e))?;

        let mut status = WorkingCopyStatus::default();
        for entry in statuses.iter() {
            let path = entry.path().unwrap_or("(non-utf8 path)").to_string();
            let flags = entry.status();
            if flags.contains(Status::IGNORED) {
                continue;
            }
            if flags.contains(Status::WT_NEW) && !flags.intersects(Status::INDEX_NEW) {
                status.unversioned_files.push(path);
            } else if !flags.is_empty() {
                status.uncommitted_files.push(path);
            }
        }

        status.current_branch = self.current_branch()?;
        if let Some(branch) = &status.current_branch {
            let (ahead, behind) = self.ahead_behind(branch)?;
            status.unpushed_commits = ahead;
            status.behind_commits = behind;
        }

        log::debug!("Working copy status: {:?}", status);
        Ok(status)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            // Unborn branch: HEAD points at a branch with no commits yet
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(ReleaseError::vcs("current_branch", e)),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|s| s.to_string()))
    }

    fn refresh_remote(&self) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(&self.remote)
            .map_err(|e| ReleaseError::vcs("refresh_remote", format!("Remote '{}' not found: {}", self.remote, e)))?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(Self::remote_callbacks());

        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", self.remote);
        remote
            .fetch(&[refspec_heads.as_str()], Some(&mut fetch_options), None)
            .map_err(|e| ReleaseError::vcs("refresh_remote", e))?;

        log::debug!("Fetched remote '{}'", self.remote);
        Ok(())
    }

    fn commit(&self, message: &str, files: &[PathBuf]) -> Result<String> {
        let fail = |e: git2::Error| ReleaseError::vcs("commit", e);

        let mut index = self.repo.index().map_err(fail)?;
        for file in files {
            index.add_path(&self.relative_to_workdir(file)?).map_err(fail)?;
        }
        index.write().map_err(fail)?;

        let tree_id = index.write_tree().map_err(fail)?;
        let tree = self.repo.find_tree(tree_id).map_err(fail)?;
        let parent = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(fail)?;
        let signature = self.repo.signature().map_err(fail)?;

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])
            .map_err(fail)?;

        log::debug!("Created commit {} ({})", oid, message);
        Ok(oid.to_string())
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        let fail = |e: git2::Error| ReleaseError::vcs("tag", e);

        let head = self
            .repo
            .head()
            .and_then(|head| head.peel(git2::ObjectType::Commit))
            .map_err(fail)?;
        let signature = self.repo.signature().map_err(fail)?;

        self.repo
            .tag(name, &head, &signature, message, false)
            .map_err(fail)?;

        log::debug!("Created tag {}", name);
        Ok(())
    }

    fn push(&self, tags: &[String]) -> Result<()> {
        let mut accepted: Vec<String> = Vec::new();
        let mut rejected: Option<String> = None;

        let branch = self
            .current_branch()?
            .ok_or_else(|| ReleaseError::vcs("push", "HEAD is detached, nothing to push"))?;

        let mut remote = self
            .repo
            .find_remote(&self.remote)
            .map_err(|e| ReleaseError::vcs("push", format!("No remote named '{}' found: {}", self.remote, e)))?;

        let mut refspecs = vec![format!("refs/heads/{0}:refs/heads/{0}", branch)];
        refspecs.extend(tags.iter().map(|tag| format!("refs/tags/{0}:refs/tags/{0}", tag)));

        let mut callbacks = Self::remote_callbacks();
        callbacks.push_update_reference(|refname, status| {
            match status {
                Some(status) => rejected = Some(format!("{} rejected: {}", refname, status)),
                None => accepted.push(refname.to_string()),
            }
            Ok(())
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote
            .push(&refspecs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => ReleaseError::vcs("push", format!("Network error: {}", e)),
                _ => ReleaseError::vcs("push", e),
            })?;

        drop(push_options);
        if let Some(reason) = rejected {
            if accepted.is_empty() {
                return Err(ReleaseError::vcs("push", reason));
            }
            return Err(ReleaseError::PartialPush {
                remote: self.remote.clone(),
                pushed: accepted,
                rejected: reason,
            });
        }

        log::debug!("Pushed {} and {} tag(s) to '{}'", branch, tags.len(), self.remote);
        Ok(())
    }

    fn revert_commit(&self, id: &str) -> Result<()> {
        let fail = |e: git2::Error| ReleaseError::vcs("revert_commit", e);

        let oid = git2::Oid::from_str(id).map_err(fail)?;
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(fail)?;
        if head.id() != oid {
            return Err(ReleaseError::vcs(
                "revert_commit",
                format!("HEAD moved to {} since commit {} was created", head.id(), id),
            ));
        }

        let parent = head.parent(0).map_err(fail)?;
        self.repo
            .reset(parent.as_object(), ResetType::Mixed, None)
            .map_err(fail)?;

        log::debug!("Reset HEAD from {} to {}", id, parent.id());
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo
            .tag_delete(name)
            .map_err(|e| ReleaseError::vcs("delete_tag", e))?;
        log::debug!("Deleted tag {}", name);
        Ok(())
    }

    fn run_lock_path(&self) -> Option<PathBuf> {
        Some(self.lock_path())
    }
}
