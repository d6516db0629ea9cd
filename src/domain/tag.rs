use crate::error::{ReleaseError, Result};

/// Default tag naming pattern
pub const DEFAULT_TAG_TEMPLATE: &str = "v$version";

const VERSION_PLACEHOLDERS: [&str; 2] = ["${version}", "$version"];
const NAME_PLACEHOLDERS: [&str; 2] = ["${name}", "$name"];

/// Tag naming template (e.g., "v$version", "${name}-release-${version}")
///
/// Placeholders use the `$version` / `${version}` syntax of existing
/// release configurations; `$name` expands to the project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTemplate {
    pub template: String,
}

impl Default for TagTemplate {
    fn default() -> Self {
        TagTemplate::new(DEFAULT_TAG_TEMPLATE)
    }
}

impl TagTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        TagTemplate {
            template: template.into(),
        }
    }

    /// Format a tag name from a rendered version and the project name
    /// Example: template="v$version", version="1.2.3" -> "v1.2.3"
    pub fn render(&self, version: &str, project_name: &str) -> String {
        // Braced forms first so "${version}" is not split by the bare form.
        let mut tag = self.template.clone();
        for placeholder in VERSION_PLACEHOLDERS {
            tag = tag.replace(placeholder, version);
        }
        for placeholder in NAME_PLACEHOLDERS {
            tag = tag.replace(placeholder, project_name);
        }
        tag
    }

    /// Whether the template mentions the version at all
    pub fn has_version_placeholder(&self) -> bool {
        VERSION_PLACEHOLDERS
            .iter()
            .any(|placeholder| self.template.contains(placeholder))
    }

    pub fn validate(&self) -> Result<()> {
        if self.template.trim().is_empty() {
            return Err(ReleaseError::config("tagTemplate must not be empty"));
        }
        Ok(())
    }
}
