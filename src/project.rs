//! Reading and rewriting the version property file (`version=1.2.3-SNAPSHOT`).

use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Property key holding the project version
pub const VERSION_KEY: &str = "version";

/// A properties file holding the project version.
///
/// Rewrites touch only the value of the selected keys; comments, ordering,
/// separators and line endings are preserved.
#[derive(Debug, Clone)]
pub struct VersionFile {
    path: PathBuf,
    contents: String,
}

fn property_regex(key: &str) -> Result<Regex> {
    Regex::new(&format!(
        r"(?mR)^(?P<lead>[ \t]*{}[ \t]*[=:][ \t]*)(?P<value>[^\r\n]*?)(?P<trail>[ \t]*)$",
        regex::escape(key)
    ))
    .map_err(|e| ReleaseError::version_file(format!("Invalid property key '{}': {}", key, e)))
}

impl VersionFile {
    /// Load the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|e| {
            ReleaseError::version_file(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(VersionFile { path, contents })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw contents as last loaded or written
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Value of a property, if present
    pub fn property(&self, key: &str) -> Result<Option<String>> {
        let re = property_regex(key)?;
        Ok(re
            .captures(&self.contents)
            .map(|c| c["value"].to_string()))
    }

    /// The current project version string
    pub fn version(&self) -> Result<String> {
        self.property(VERSION_KEY)?.ok_or_else(|| {
            ReleaseError::version_file(format!(
                "No '{}' property in {}",
                VERSION_KEY,
                self.path.display()
            ))
        })
    }

    /// Replace the value of `version` and every extra key, then write the file.
    ///
    /// Extra keys missing from the file are ignored.
    pub fn write_version(&mut self, version: &str, extra_keys: &[String]) -> Result<()> {
        let mut updated = self.contents.clone();
        let keys = std::iter::once(VERSION_KEY).chain(extra_keys.iter().map(String::as_str));
        for key in keys {
            let re = property_regex(key)?;
            updated = re
                .replace_all(&updated, |caps: &regex::Captures| {
                    format!("{}{}{}", &caps["lead"], version, &caps["trail"])
                })
                .into_owned();
        }

        fs::write(&self.path, &updated).map_err(|e| {
            ReleaseError::version_file(format!("Cannot write {}: {}", self.path.display(), e))
        })?;
        self.contents = updated;
        Ok(())
    }
}
