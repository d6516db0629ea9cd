use std::collections::HashMap;
use std::path::PathBuf;

/// The release being published
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Project name, as used in the tag template
    pub project: String,
    /// Rendered release version
    pub version: String,
    /// Tag that marks this release
    pub tag: String,
    /// Version the working copy moves to afterwards
    pub next_version: String,
    /// Directory the publish tasks run in
    pub project_dir: PathBuf,
}

impl Artifact {
    /// Convert the artifact to environment variables for publish tasks
    ///
    /// Maps fields to RELEASE_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("RELEASE_PROJECT".to_string(), self.project.clone());
        env.insert("RELEASE_VERSION".to_string(), self.version.clone());
        env.insert("RELEASE_TAG".to_string(), self.tag.clone());
        env.insert("RELEASE_NEXT_VERSION".to_string(), self.next_version.clone());

        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_to_env_vars() {
        let artifact = Artifact {
            project: "core".to_string(),
            version: "1.2.3".to_string(),
            tag: "v1.2.3".to_string(),
            next_version: "1.2.4-SNAPSHOT".to_string(),
            project_dir: PathBuf::from("."),
        };

        let env = artifact.to_env_vars();
        assert_eq!(env.len(), 4);
        assert_eq!(env.get("RELEASE_PROJECT"), Some(&"core".to_string()));
        assert_eq!(env.get("RELEASE_VERSION"), Some(&"1.2.3".to_string()));
        assert_eq!(env.get("RELEASE_TAG"), Some(&"v1.2.3".to_string()));
        assert_eq!(
            env.get("RELEASE_NEXT_VERSION"),
            Some(&"1.2.4-SNAPSHOT".to_string())
        );
    }
}
