//! Semantic version calculation for automated releases.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::AutomationLevel;

/// Tag used for the first release of a repository without parseable tags.
pub const INITIAL_RELEASE: &str = "v1.0.0";

/// `(major, minor, patch)` parsed from a release tag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTag {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[vV]?(\d+)\.(\d+)\.(\d+)").expect("version tag pattern is valid")
    })
}

impl VersionTag {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `vMAJOR.MINOR.PATCH` (the `v` is optional). Trailing
    /// pre-release or build suffixes are ignored.
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = tag_pattern().captures(tag.trim())?;
        let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }

    /// Parse the latest tag, falling back to `0.0.0` when absent or malformed.
    pub fn parse_or_zero(latest: Option<&str>) -> Self {
        latest.and_then(Self::parse).unwrap_or_default()
    }

    /// Increment for the given automation level. `basic` bumps the patch
    /// number; every other level bumps minor and resets patch. Major is never
    /// bumped automatically. `None` when the bumped component would overflow.
    pub fn bump(&self, level: AutomationLevel) -> Option<Self> {
        match level {
            AutomationLevel::Basic => Some(Self::new(
                self.major,
                self.minor,
                self.patch.checked_add(1)?,
            )),
            _ => Some(Self::new(self.major, self.minor.checked_add(1)?, 0)),
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Next tag after `latest` for `level`.
pub fn next_tag(latest: Option<&str>, level: AutomationLevel) -> Option<String> {
    VersionTag::parse_or_zero(latest)
        .bump(level)
        .map(|tag| tag.to_string())
}

/// Tag for the next automated release: [`INITIAL_RELEASE`] when the
/// repository has no parseable tag yet, [`next_tag`] otherwise.
pub fn release_tag(latest: Option<&str>, level: AutomationLevel) -> Option<String> {
    match latest.and_then(VersionTag::parse) {
        Some(current) => current.bump(level).map(|tag| tag.to_string()),
        None => Some(INITIAL_RELEASE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_optional_prefix() {
        assert_eq!(VersionTag::parse("v1.2.3"), Some(VersionTag::new(1, 2, 3)));
        assert_eq!(VersionTag::parse("V4.0.9"), Some(VersionTag::new(4, 0, 9)));
        assert_eq!(VersionTag::parse("0.10.2"), Some(VersionTag::new(0, 10, 2)));
        assert_eq!(
            VersionTag::parse("v2.1.0-rc.1"),
            Some(VersionTag::new(2, 1, 0))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(VersionTag::parse("release-1"), None);
        assert_eq!(VersionTag::parse("v1.2"), None);
        assert_eq!(VersionTag::parse(""), None);
    }

    #[test]
    fn test_basic_bumps_patch() {
        assert_eq!(
            next_tag(Some("v1.4.2"), AutomationLevel::Basic).as_deref(),
            Some("v1.4.3")
        );
    }

    #[test]
    fn test_other_levels_bump_minor_and_reset_patch() {
        for level in [
            AutomationLevel::Professional,
            AutomationLevel::ResearchGrade,
            AutomationLevel::Enterprise,
        ] {
            assert_eq!(next_tag(Some("v1.4.2"), level).as_deref(), Some("v1.5.0"));
        }
    }

    #[test]
    fn test_missing_tag_starts_from_zero() {
        assert_eq!(
            next_tag(None, AutomationLevel::Basic).as_deref(),
            Some("v0.0.1")
        );
        assert_eq!(
            next_tag(Some("nightly"), AutomationLevel::Enterprise).as_deref(),
            Some("v0.1.0")
        );
    }

    #[test]
    fn test_release_tag_bootstraps_initial_release() {
        assert_eq!(
            release_tag(None, AutomationLevel::Basic).as_deref(),
            Some(INITIAL_RELEASE)
        );
        assert_eq!(
            release_tag(Some("latest"), AutomationLevel::Professional).as_deref(),
            Some(INITIAL_RELEASE)
        );
        assert_eq!(
            release_tag(Some("v1.0.0"), AutomationLevel::Professional).as_deref(),
            Some("v1.1.0")
        );
    }

    #[test]
    fn test_major_is_never_bumped() {
        let tag = VersionTag::new(3, 9, 9);
        assert_eq!(tag.bump(AutomationLevel::Enterprise).unwrap().major, 3);
        assert_eq!(tag.bump(AutomationLevel::Basic).unwrap().major, 3);
    }

    #[test]
    fn test_bump_at_component_limit_yields_none() {
        assert_eq!(
            release_tag(Some("v1.2.18446744073709551615"), AutomationLevel::Basic),
            None
        );
        assert_eq!(
            next_tag(Some("v1.18446744073709551615.0"), AutomationLevel::Enterprise),
            None
        );
        // Minor is still free when only patch is at the limit.
        assert_eq!(
            release_tag(Some("v1.2.18446744073709551615"), AutomationLevel::Professional)
                .as_deref(),
            Some("v1.3.0")
        );
    }
}
