//! Package metadata already present in a source tree
//!
//! Only the first line of `debian/changelog` is consulted, e.g.
//! `foo (1.2-3) unstable; urgency=medium`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Location of the metadata record inside a source tree.
pub const CHANGELOG_PATH: &str = "debian/changelog";

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<package>[^ \t()]+)[ \t]+\((?P<version>[^()]+)\)")
        .expect("valid changelog header regex")
});

/// Name and version declared by an existing changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogHeader {
    pub package: String,
    pub version: String,
    pub revision: Option<String>,
}

impl ChangelogHeader {
    /// Parse the first changelog line.
    ///
    /// For native packages the whole parenthesised text is the version.
    /// Otherwise the text after the last `-` is the Debian revision.
    pub fn parse(line: &str, native: bool) -> Result<Self> {
        let line = line.trim_end();
        let caps = HEADER_RE
            .captures(line)
            .ok_or_else(|| Error::parse(line, "changelog must start with \"package (version)\""))?;

        let package = caps["package"].to_lowercase();
        let full = caps["version"].trim();

        let (version, revision) = match full.rsplit_once('-') {
            Some((version, revision)) if !native && !version.is_empty() && !revision.is_empty() => {
                (version.to_string(), Some(revision.to_string()))
            }
            _ => (full.to_string(), None),
        };
        if version.is_empty() {
            return Err(Error::parse(line, "changelog version is empty"));
        }

        Ok(Self {
            package,
            version,
            revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_non_native() {
        let header = ChangelogHeader::parse("foo (1.2-3) unstable; urgency=medium", false).unwrap();
        assert_eq!(header.package, "foo");
        assert_eq!(header.version, "1.2");
        assert_eq!(header.revision.as_deref(), Some("3"));
    }

    #[test]
    fn test_parse_native_keeps_dash_in_version() {
        let header = ChangelogHeader::parse("foo (1.2-3) unstable; urgency=medium", true).unwrap();
        assert_eq!(header.version, "1.2-3");
        assert_eq!(header.revision, None);
    }

    #[test]
    fn test_revision_split_uses_last_dash() {
        let header = ChangelogHeader::parse("foo (1.0-rc1-2ubuntu1) focal", false).unwrap();
        assert_eq!(header.version, "1.0-rc1");
        assert_eq!(header.revision.as_deref(), Some("2ubuntu1"));
    }

    #[test]
    fn test_package_is_lowercased() {
        let header = ChangelogHeader::parse("Foo (2.0)", false).unwrap();
        assert_eq!(header.package, "foo");
        assert_eq!(header.revision, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            ChangelogHeader::parse("Release notes for 1.0", false),
            Err(Error::Parse { .. })
        ));
    }
}
