//! Source descriptor classification
//!
//! Splits the single positional input (a URL, an SSH-style git address or a
//! local path) into its transport, host, path and final-segment parts, and
//! the final segment into package token, version token and extension.
//!
//! ```text
//! https://ftp.example.org/pub/foo-1.2.tar.gz
//! ^^^^^^^^ ^^^^^^^^^^^^^^ ^^^^ ^^^ ^^^^ ^^^^^^^
//! transport     host      path base ver  ext
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;

static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+._-]*@").expect("valid user regex"));

static URL_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<host>[A-Za-z][A-Za-z0-9+._-]*(?::[0-9]+)?)/").expect("valid host regex")
});

static SSH_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<host>[A-Za-z][A-Za-z0-9+._-]*):").expect("valid ssh host regex")
});

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>.+?)(?P<ver>[_-][0-9][A-Za-z0-9~+.-]*)?$").expect("valid version regex")
});

// An archive suffix followed by more text, e.g. `foo-1.0.tar.gz.sig`.
static EMBEDDED_ARCHIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:tar\.(?:gz|bz2|xz)|tgz|txz|tbz2?|tb2|git)\.").expect("valid archive regex")
});

/// How the input is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Local path
    #[default]
    None,
    Http,
    Https,
    Ftp,
    /// `git://` URL or `user@host:path`
    Git,
}

impl Transport {
    const PREFIXED: [Transport; 4] = [Self::Http, Self::Https, Self::Ftp, Self::Git];

    /// URL prefix for this transport, empty for local paths.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Http => "http://",
            Self::Https => "https://",
            Self::Ftp => "ftp://",
            Self::Git => "git://",
        }
    }

    fn strip_prefix(input: &str) -> (Transport, &str) {
        Self::PREFIXED
            .into_iter()
            .find_map(|t| input.strip_prefix(t.prefix()).map(|rest| (t, rest)))
            .unwrap_or((Self::None, input))
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "local"),
            other => f.write_str(other.prefix().trim_end_matches("://")),
        }
    }
}

/// Recognized suffixes of the final path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Extension {
    #[serde(rename = ".orig.tar.xz")]
    OrigTarXz,
    #[serde(rename = ".tar.xz")]
    TarXz,
    #[serde(rename = ".txz")]
    Txz,
    #[serde(rename = ".orig.tar.gz")]
    OrigTarGz,
    #[serde(rename = ".tar.gz")]
    TarGz,
    #[serde(rename = ".tgz")]
    Tgz,
    #[serde(rename = ".orig.tar.bz2")]
    OrigTarBz2,
    #[serde(rename = ".tar.bz2")]
    TarBz2,
    #[serde(rename = ".tbz")]
    Tbz,
    #[serde(rename = ".tb2")]
    Tb2,
    #[serde(rename = ".tbz2")]
    Tbz2,
    #[serde(rename = ".git")]
    Git,
}

impl Extension {
    pub const ALL: [Extension; 12] = [
        Self::OrigTarXz,
        Self::TarXz,
        Self::Txz,
        Self::OrigTarGz,
        Self::TarGz,
        Self::Tgz,
        Self::OrigTarBz2,
        Self::TarBz2,
        Self::Tbz,
        Self::Tb2,
        Self::Tbz2,
        Self::Git,
    ];

    /// The suffix including its leading dot.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::OrigTarXz => ".orig.tar.xz",
            Self::TarXz => ".tar.xz",
            Self::Txz => ".txz",
            Self::OrigTarGz => ".orig.tar.gz",
            Self::TarGz => ".tar.gz",
            Self::Tgz => ".tgz",
            Self::OrigTarBz2 => ".orig.tar.bz2",
            Self::TarBz2 => ".tar.bz2",
            Self::Tbz => ".tbz",
            Self::Tb2 => ".tb2",
            Self::Tbz2 => ".tbz2",
            Self::Git => ".git",
        }
    }

    /// Debian orig tarball (`package_version.orig.tar.*`)
    pub fn is_orig(&self) -> bool {
        matches!(self, Self::OrigTarXz | Self::OrigTarGz | Self::OrigTarBz2)
    }

    /// Compression format, `None` for `.git`.
    pub fn archive_format(&self) -> Option<ArchiveFormat> {
        match self {
            Self::OrigTarXz | Self::TarXz | Self::Txz => Some(ArchiveFormat::TarXz),
            Self::OrigTarGz | Self::TarGz | Self::Tgz => Some(ArchiveFormat::TarGz),
            Self::OrigTarBz2 | Self::TarBz2 | Self::Tbz | Self::Tb2 | Self::Tbz2 => {
                Some(ArchiveFormat::TarBz2)
            }
            Self::Git => None,
        }
    }

    /// Longest recognized suffix of `segment`, with the remaining stem.
    fn split(segment: &str) -> Option<(&str, Extension)> {
        Self::ALL
            .into_iter()
            .filter_map(|ext| segment.strip_suffix(ext.suffix()).map(|stem| (stem, ext)))
            .min_by_key(|(stem, _)| stem.len())
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Structured view of the positional input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    input: String,
    transport: Transport,
    auth_token: Option<String>,
    host: Option<String>,
    path_prefix: Option<String>,
    base_name: String,
    version_token: Option<String>,
    extension: Option<Extension>,
    vcs_suffix: bool,
    has_trailing_slash: bool,
}

impl SourceDescriptor {
    /// The input this descriptor was classified from.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// User token including the `@`, e.g. `git@`.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Directory part in front of the final segment, with its trailing `/`.
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Version token including its `-` or `_` separator.
    pub fn version_token(&self) -> Option<&str> {
        self.version_token.as_deref()
    }

    /// Version token without its separator.
    pub fn version(&self) -> Option<&str> {
        self.version_token.as_deref().map(|token| &token[1..])
    }

    /// The `-` or `_` introducing the version token.
    pub fn version_separator(&self) -> Option<char> {
        self.version_token.as_deref().and_then(|token| token.chars().next())
    }

    pub fn extension(&self) -> Option<Extension> {
        self.extension
    }

    /// A git transport address whose `.git` suffix was consumed as part of
    /// the repository address rather than recorded as an extension.
    pub fn has_vcs_suffix(&self) -> bool {
        self.vcs_suffix
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.has_trailing_slash
    }

    /// Package token and version token, i.e. the segment without its suffix.
    pub fn stem(&self) -> String {
        format!(
            "{}{}",
            self.base_name,
            self.version_token.as_deref().unwrap_or_default()
        )
    }

    /// The final path segment as it appeared in the input.
    pub fn final_segment(&self) -> String {
        let suffix = match (self.extension, self.vcs_suffix) {
            (Some(ext), _) => ext.suffix(),
            (None, true) => Extension::Git.suffix(),
            (None, false) => "",
        };
        format!("{}{}", self.stem(), suffix)
    }
}

/// Classify the positional input.
///
/// The caller substitutes the current directory name for an empty input
/// and strips any `file://` prefix beforehand.
pub fn classify(input: &str) -> Result<SourceDescriptor> {
    if input.is_empty() {
        return Err(Error::parse(input, "empty input"));
    }
    if input.chars().any(char::is_whitespace) {
        return Err(Error::parse(input, "whitespace is not allowed"));
    }

    let (mut transport, rest) = Transport::strip_prefix(input);
    if transport == Transport::None && rest.contains("://") {
        return Err(Error::parse(input, "unsupported URL scheme"));
    }

    let (auth_token, rest) = match USER_RE.find(rest) {
        Some(m) => (Some(m.as_str().to_string()), &rest[m.end()..]),
        None => (None, rest),
    };

    let (host, rest) = if transport != Transport::None {
        let caps = URL_HOST_RE
            .captures(rest)
            .ok_or_else(|| Error::parse(input, "malformed host in URL"))?;
        let end = caps.get(0).map_or(0, |m| m.end());
        (Some(caps["host"].to_string()), &rest[end..])
    } else if auth_token.is_some() {
        let caps = SSH_HOST_RE
            .captures(rest)
            .ok_or_else(|| Error::parse(input, "expected user@host:path"))?;
        let end = caps.get(0).map_or(0, |m| m.end());
        transport = Transport::Git;
        (Some(caps["host"].to_string()), &rest[end..])
    } else if rest.contains(':') {
        return Err(Error::parse(input, "malformed host:path combination"));
    } else {
        (None, rest)
    };

    let (rest, has_trailing_slash) = match rest.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (rest, false),
    };

    let (path_prefix, segment) = match rest.rfind('/') {
        Some(idx) => (Some(rest[..=idx].to_string()), &rest[idx + 1..]),
        None => (None, rest),
    };
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(Error::parse(input, "no package name in final path segment"));
    }

    let (stem, extension) = match Extension::split(segment) {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (segment, None),
    };
    if EMBEDDED_ARCHIVE_RE.is_match(&format!("{stem}.")) {
        return Err(Error::parse(input, "unrecognized extension after archive suffix"));
    }
    if stem.is_empty() {
        return Err(Error::parse(input, "archive name has no package part"));
    }

    let caps = VERSION_RE
        .captures(stem)
        .ok_or_else(|| Error::parse(input, "no package name in final path segment"))?;
    let base_name = caps["base"].to_string();
    let version_token = caps.name("ver").map(|m| m.as_str().to_string());

    let (extension, vcs_suffix) = match (transport, extension) {
        (Transport::Git, Some(Extension::Git)) => (None, true),
        (_, ext) => (ext, false),
    };

    let descriptor = SourceDescriptor {
        input: input.to_string(),
        transport,
        auth_token,
        host,
        path_prefix,
        base_name,
        version_token,
        extension,
        vcs_suffix,
        has_trailing_slash,
    };
    tracing::debug!(?descriptor, "Classified source input");
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_prefers_longest_suffix() {
        let (stem, ext) = Extension::split("foo_1.0.orig.tar.gz").unwrap();
        assert_eq!(stem, "foo_1.0");
        assert_eq!(ext, Extension::OrigTarGz);
    }

    #[test]
    fn test_tbz2_not_split_as_tbz() {
        let (stem, ext) = Extension::split("foo-1.tbz2").unwrap();
        assert_eq!(stem, "foo-1");
        assert_eq!(ext, Extension::Tbz2);
    }

    #[test]
    fn test_version_splits_at_first_numeric_token() {
        let d = classify("foo-bar-2.0").unwrap();
        assert_eq!(d.base_name(), "foo-bar");
        assert_eq!(d.version_token(), Some("-2.0"));
    }

    #[test]
    fn test_final_segment_restores_vcs_suffix() {
        let d = classify("git://example.org/foo.git").unwrap();
        assert_eq!(d.final_segment(), "foo.git");
    }

    #[test]
    fn test_transport_display() {
        assert_eq!(Transport::Https.to_string(), "https");
        assert_eq!(Transport::None.to_string(), "local");
    }
}
