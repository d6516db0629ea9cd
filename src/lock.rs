//! At most one release run per working copy.
//!
//! The lock is an exclusive advisory lock on a file inside the repository
//! metadata directory. It is held by the [RunLock] value and released when
//! that value is dropped, including on panic unwinding and process exit.

use crate::error::{ReleaseError, Result};
use std::fmt;
#[cfg(not(unix))]
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Guard for the run lock of one working copy
pub struct RunLock {
    path: PathBuf,
    #[cfg(unix)]
    _handle: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _handle: File,
}

impl RunLock {
    /// Take the lock at `path` without waiting
    ///
    /// # Returns
    /// * `Ok(RunLock)` - Lock held until the guard is dropped
    /// * `Err(RunInProgress)` - Another run holds the lock
    /// * `Err(Io)` - The lock file cannot be created
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let handle = Self::lock_file(&path)?;
        log::debug!("Acquired release lock {}", path.display());
        Ok(RunLock {
            path,
            _handle: handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn lock_file(path: &Path) -> Result<nix::fcntl::Flock<File>> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let mut locked = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(locked) => locked,
            Err((_, Errno::EWOULDBLOCK)) => {
                return Err(ReleaseError::RunInProgress {
                    path: path.display().to_string(),
                })
            }
            Err((_, errno)) => return Err(std::io::Error::from(errno).into()),
        };

        // Owner pid, for whoever finds the file while a run is stuck.
        locked.set_len(0)?;
        writeln!(locked, "{}", std::process::id())?;
        Ok(locked)
    }

    #[cfg(not(unix))]
    fn lock_file(path: &Path) -> Result<File> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ReleaseError::RunInProgress {
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        Ok(file)
    }
}

impl fmt::Debug for RunLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLock").field("path", &self.path).finish()
    }
}

// A flocked file is never unlinked; only the create_new marker is removed.
#[cfg(not(unix))]
impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::debug!("Could not remove lock file {}: {}", self.path.display(), e);
        }
    }
}
