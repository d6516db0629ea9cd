use crate::domain::tag::DEFAULT_TAG_TEMPLATE;
use crate::domain::version::DEFAULT_SNAPSHOT_SUFFIX;
use crate::domain::{Increment, TagTemplate, VersionPolicy};
use crate::error::{ReleaseError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "release.toml";

/// Represents the complete configuration for a release run.
///
/// Option names follow the camelCase spelling of existing release
/// configurations (`tagTemplate`, `failOnCommitNeeded`, `git.requireBranch`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseConfig {
    pub tag_template: String,
    pub fail_on_commit_needed: bool,
    pub fail_on_unversioned_files: bool,
    pub fail_on_publish_needed: bool,
    pub fail_on_update_needed: bool,
    pub revert_on_fail: bool,
    pub pre_commit_text: String,
    pub pre_tag_commit_message: String,
    pub tag_commit_message: String,
    pub new_version_commit_message: String,
    pub version_property_file: PathBuf,
    /// Extra property keys rewritten alongside `version`
    pub version_properties: Vec<String>,
    pub snapshot_suffix: String,
    pub next_version_increment: Increment,
    /// Shell commands run by the publish step, in order
    pub publish_tasks: Vec<String>,
    /// Used for `$name` in the tag template; defaults to the directory name
    pub project_name: Option<String>,
    pub git: GitConfig,
}

/// Git specific options (`[git]` table)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GitConfig {
    /// Branch name or regular expression the release must run on
    pub require_branch: Option<String>,
    pub push_to_remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            require_branch: None,
            push_to_remote: "origin".to_string(),
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            tag_template: DEFAULT_TAG_TEMPLATE.to_string(),
            fail_on_commit_needed: true,
            fail_on_unversioned_files: true,
            fail_on_publish_needed: true,
            fail_on_update_needed: true,
            revert_on_fail: true,
            pre_commit_text: String::new(),
            pre_tag_commit_message: "[Release] - pre tag commit: ".to_string(),
            tag_commit_message: "[Release] - creating tag: ".to_string(),
            new_version_commit_message: "[Release] - new version commit: ".to_string(),
            version_property_file: PathBuf::from("gradle.properties"),
            version_properties: Vec::new(),
            snapshot_suffix: DEFAULT_SNAPSHOT_SUFFIX.to_string(),
            next_version_increment: Increment::Last,
            publish_tasks: Vec::new(),
            project_name: None,
            git: GitConfig::default(),
        }
    }
}

impl ReleaseConfig {
    pub fn tag_template(&self) -> TagTemplate {
        TagTemplate::new(self.tag_template.clone())
    }

    pub fn version_policy(&self) -> VersionPolicy {
        VersionPolicy::new(self.snapshot_suffix.clone(), self.next_version_increment)
    }

    /// Whether the remote has to be contacted before the gates run
    pub fn needs_remote_state(&self) -> bool {
        self.fail_on_publish_needed || self.fail_on_update_needed
    }

    /// Builds a commit message the way release commits are worded:
    /// optional `preCommitText`, the message prefix, then the quoted subject.
    pub fn commit_message(&self, prefix: &str, subject: &str) -> String {
        let message = format!("{} '{}'.", prefix.trim_end(), subject);
        if self.pre_commit_text.trim().is_empty() {
            message
        } else {
            format!("{} {}", self.pre_commit_text.trim(), message)
        }
    }

    /// Checks values serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        self.tag_template().validate()?;

        if self.snapshot_suffix.is_empty() {
            return Err(ReleaseError::config("snapshotSuffix must not be empty"));
        }

        if self.git.push_to_remote.trim().is_empty() {
            return Err(ReleaseError::config("git.pushToRemote must not be empty"));
        }

        if let Some(pattern) = &self.git.require_branch {
            Regex::new(pattern).map_err(|e| {
                ReleaseError::config(format!("git.requireBranch '{}' is not a valid pattern: {}", pattern, e))
            })?;
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in the project directory
/// 3. `<config dir>/git-release/release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `project_dir` - Directory of the project being released
///
/// # Returns
/// * `Ok(ReleaseConfig)` - Loaded and validated configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, project_dir: &Path) -> Result<ReleaseConfig> {
    let candidate = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = project_dir.join(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                dirs::config_dir()
                    .map(|dir| dir.join("git-release").join(CONFIG_FILE_NAME))
                    .filter(|path| path.exists())
            }
        }
    };

    let config = match candidate {
        Some(path) => {
            log::debug!("Loading release configuration from {}", path.display());
            let content = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            parse_config(&content)?
        }
        None => {
            log::debug!("No release configuration found, using defaults");
            ReleaseConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Parses TOML configuration text
pub fn parse_config(content: &str) -> Result<ReleaseConfig> {
    toml::from_str(content).map_err(|e| ReleaseError::config(e.to_string()))
}
