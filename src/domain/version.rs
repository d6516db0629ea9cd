use crate::error::{ReleaseError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Suffix marking a development version when nothing else is configured
pub const DEFAULT_SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^((?:0|[1-9][0-9]*)(?:\.(?:0|[1-9][0-9]*))*)(?:-([0-9A-Za-z][0-9A-Za-z.\-]*))?$")
            .expect("version grammar is a valid regex")
    })
}

/// Project version: numeric components, optional qualifier and the
/// development flag.
///
/// `1.2.3-beta-SNAPSHOT` has components `[1, 2, 3]`, qualifier `beta` and is
/// a development version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub components: Vec<u64>,
    pub qualifier: Option<String>,
    pub development: bool,
}

impl Version {
    pub fn new(components: Vec<u64>) -> Self {
        Version {
            components,
            qualifier: None,
            development: false,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn as_development(mut self) -> Self {
        self.development = true;
        self
    }

    fn render_with(&self, suffix: &str) -> String {
        let mut out = self
            .components
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        if let Some(qualifier) = &self.qualifier {
            out.push('-');
            out.push_str(qualifier);
        }
        if self.development {
            out.push_str(suffix);
        }
        out
    }

    fn sort_key(&self) -> (&[u64], bool, Option<&str>, bool) {
        (
            &self.components,
            self.qualifier.is_none(),
            self.qualifier.as_deref(),
            !self.development,
        )
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(DEFAULT_SNAPSHOT_SUFFIX))
    }
}

/// Which component is bumped when moving to the next development version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Increment {
    Major,
    Minor,
    Patch,
    /// The lowest component, whatever its position
    #[default]
    Last,
}

impl Increment {
    fn index(self, len: usize) -> usize {
        let last = len.saturating_sub(1);
        match self {
            Increment::Major => 0,
            Increment::Minor => 1.min(last),
            Increment::Patch => 2.min(last),
            Increment::Last => last,
        }
    }
}

/// Parses, renders and advances versions according to the configured
/// development suffix and increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPolicy {
    snapshot_suffix: String,
    increment: Increment,
}

impl Default for VersionPolicy {
    fn default() -> Self {
        VersionPolicy::new(DEFAULT_SNAPSHOT_SUFFIX, Increment::Last)
    }
}

impl VersionPolicy {
    pub fn new(snapshot_suffix: impl Into<String>, increment: Increment) -> Self {
        VersionPolicy {
            snapshot_suffix: snapshot_suffix.into(),
            increment,
        }
    }

    pub fn snapshot_suffix(&self) -> &str {
        &self.snapshot_suffix
    }

    /// Parse a version string such as `1.2.3-SNAPSHOT` or `2.0-rc.1`.
    ///
    /// # Returns
    /// * `Ok(Version)` - Parsed version
    /// * `Err(InvalidVersionFormat)` - If the string does not follow the grammar
    pub fn parse(&self, raw: &str) -> Result<Version> {
        let (body, development) = match raw.strip_suffix(self.snapshot_suffix.as_str()) {
            Some(body) if !self.snapshot_suffix.is_empty() => (body, true),
            _ => (raw, false),
        };
        // A qualifier that itself ends in the suffix would survive to_release.
        if !self.snapshot_suffix.is_empty() && body.ends_with(self.snapshot_suffix.as_str()) {
            return Err(ReleaseError::invalid_version(raw));
        }

        let captures = version_regex()
            .captures(body)
            .ok_or_else(|| ReleaseError::invalid_version(raw))?;

        let components = captures[1]
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| ReleaseError::invalid_version(raw))?;

        Ok(Version {
            components,
            qualifier: captures.get(2).map(|m| m.as_str().to_string()),
            development,
        })
    }

    /// Strip the development qualifier
    pub fn to_release(&self, version: &Version) -> Version {
        Version {
            development: false,
            ..version.clone()
        }
    }

    /// Bump the configured component, zero the ones below it and mark the
    /// result as a development version.
    ///
    /// Fails with `InvalidVersionFormat` when the bumped component is already
    /// at its maximum.
    pub fn to_next_development(&self, version: &Version) -> Result<Version> {
        let mut next = version.clone();
        if next.components.is_empty() {
            next.components.push(0);
        }
        let index = self.increment.index(next.components.len());
        next.components[index] = next.components[index]
            .checked_add(1)
            .ok_or_else(|| ReleaseError::invalid_version(self.render(version)))?;
        for component in next.components.iter_mut().skip(index + 1) {
            *component = 0;
        }
        next.development = true;
        Ok(next)
    }

    pub fn render(&self, version: &Version) -> String {
        version.render_with(&self.snapshot_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> VersionPolicy {
        VersionPolicy::default()
    }

    #[test]
    fn test_version_parse() {
        let v = policy().parse("1.2.3-SNAPSHOT").unwrap();
        assert_eq!(v.components, vec![1, 2, 3]);
        assert_eq!(v.qualifier, None);
        assert!(v.development);
    }

    #[test]
    fn test_version_parse_with_qualifier() {
        let v = policy().parse("2.0-rc.1-SNAPSHOT").unwrap();
        assert_eq!(v.components, vec![2, 0]);
        assert_eq!(v.qualifier.as_deref(), Some("rc.1"));
        assert!(v.development);
    }

    #[test]
    fn test_version_parse_invalid() {
        for raw in ["", "v1.2.3", "1..2", "1.2.", "01.2", "1.2.3 ", "-SNAPSHOT", "1.x", "1.2-"] {
            let err = policy().parse(raw).unwrap_err();
            assert!(
                matches!(err, ReleaseError::InvalidVersionFormat { .. }),
                "expected InvalidVersionFormat for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_render_parse_round_trip() {
        let p = policy();
        for raw in ["1", "0.1.0", "1.2.3-SNAPSHOT", "10.20.30.40", "3.0-beta-2", "1.0-rc.1-SNAPSHOT"] {
            assert_eq!(p.render(&p.parse(raw).unwrap()), raw);
        }
    }

    #[test]
    fn test_custom_suffix() {
        let p = VersionPolicy::new(".dev", Increment::Last);
        let v = p.parse("1.4.dev").unwrap();
        assert!(v.development);
        assert_eq!(p.render(&v), "1.4.dev");
        assert!(!p.parse("1.4-SNAPSHOT").unwrap().development);
    }

    #[test]
    fn test_to_release_strips_development_only() {
        let p = policy();
        let release = p.to_release(&p.parse("1.2.3-beta-SNAPSHOT").unwrap());
        assert_eq!(p.render(&release), "1.2.3-beta");
        assert_eq!(p.to_release(&release), release);
    }

    #[test]
    fn test_next_development_default_bumps_last() {
        let p = policy();
        let release = p.to_release(&p.parse("1.2.3-SNAPSHOT").unwrap());
        assert_eq!(p.render(&p.to_next_development(&release).unwrap()), "1.2.4-SNAPSHOT");

        let two = p.parse("4.9").unwrap();
        assert_eq!(p.render(&p.to_next_development(&two).unwrap()), "4.10-SNAPSHOT");
    }

    #[test]
    fn test_next_development_with_increment() {
        let v = Version::new(vec![1, 2, 3]);
        let major = VersionPolicy::new(DEFAULT_SNAPSHOT_SUFFIX, Increment::Major);
        let minor = VersionPolicy::new(DEFAULT_SNAPSHOT_SUFFIX, Increment::Minor);
        assert_eq!(major.render(&major.to_next_development(&v).unwrap()), "2.0.0-SNAPSHOT");
        assert_eq!(minor.render(&minor.to_next_development(&v).unwrap()), "1.3.0-SNAPSHOT");
    }

    #[test]
    fn test_patch_increment_on_short_version_bumps_lowest() {
        let p = VersionPolicy::new(DEFAULT_SNAPSHOT_SUFFIX, Increment::Patch);
        let v = Version::new(vec![1, 2]);
        assert_eq!(p.render(&p.to_next_development(&v).unwrap()), "1.3-SNAPSHOT");
    }

    #[test]
    fn test_release_is_idempotent_after_next() {
        let p = policy();
        for raw in ["1.2.3-SNAPSHOT", "0.9", "7-alpha-SNAPSHOT"] {
            let v = p.parse(raw).unwrap();
            let once = p.to_release(&p.to_next_development(&p.to_release(&v)).unwrap());
            assert_eq!(p.to_release(&once), once);
            assert!(!once.development);
        }
    }

    #[test]
    fn test_parse_rejects_doubled_suffix() {
        let p = policy();
        for raw in ["1.0-SNAPSHOT-SNAPSHOT", "2.1-rc-SNAPSHOT-SNAPSHOT"] {
            assert!(matches!(
                p.parse(raw),
                Err(ReleaseError::InvalidVersionFormat { .. })
            ));
        }

        let custom = VersionPolicy::new(".dev", Increment::Last);
        assert!(custom.parse("1.4-x.dev.dev").is_err());
    }

    #[test]
    fn test_release_never_renders_with_suffix() {
        let p = policy();
        let release = p.to_release(&p.parse("1.0-beta-SNAPSHOT").unwrap());
        let rendered = p.render(&release);
        assert!(!rendered.ends_with(DEFAULT_SNAPSHOT_SUFFIX));
        assert_eq!(p.parse(&rendered).unwrap(), release);
    }

    #[test]
    fn test_next_development_overflow() {
        let p = policy();
        let v = p.parse("18446744073709551615-SNAPSHOT").unwrap();
        let err = p.to_next_development(&p.to_release(&v)).unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidVersionFormat { .. }));

        // Only the bumped component matters.
        let major = VersionPolicy::new(DEFAULT_SNAPSHOT_SUFFIX, Increment::Major);
        let v = Version::new(vec![1, u64::MAX]);
        assert_eq!(major.render(&major.to_next_development(&v).unwrap()), "2.0-SNAPSHOT");
    }

    #[test]
    fn test_ordering() {
        let p = policy();
        let parse = |s| p.parse(s).unwrap();
        assert!(parse("1.2.3-SNAPSHOT") < parse("1.2.3"));
        assert!(parse("1.2.3-beta") < parse("1.2.3"));
        assert!(parse("1.2.3") < parse("1.2.4-SNAPSHOT"));
        assert!(parse("1.9") < parse("1.10"));
        assert!(parse("1.2.3-alpha") < parse("1.2.3-beta"));
        assert!(parse("1.2.3-beta-SNAPSHOT") < parse("1.2.3-beta"));
    }

    #[test]
    fn test_version_display() {
        let v = Version::new(vec![1, 2, 3]).with_qualifier("rc").as_development();
        assert_eq!(v.to_string(), "1.2.3-rc-SNAPSHOT");
    }
}
