//! Package identity reconciliation
//!
//! Each identity field is resolved from an ordered list of candidate
//! sources, highest precedence first:
//!
//! 1. explicit options (`-p`, `-u`, `-r`, `-z`)
//! 2. the first line of an existing `debian/changelog`
//! 3. the classified source descriptor
//! 4. the `name-version` pattern of the source directory name
//! 5. generated fallbacks
//!
//! Sources 1 and 2 are authoritative: when both are present and disagree,
//! reconciliation fails. Any other disagreement keeps the higher-precedence
//! value and records a [`Warning`].
//!
//! The archive format is the exception. An archive input, or an upstream
//! tarball already beside the source tree, fixes the format whatever `-z`
//! asks for.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::descriptor::SourceDescriptor;
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::identity::{PackageIdentity, working_dir_name};
use crate::metadata::ChangelogHeader;
use crate::method::{AcquisitionMethod, MethodFlags};
use crate::plan::ExistingTarball;

/// Debian revision of a first upload.
pub const FALLBACK_REVISION: &str = "1";

static DIRECTORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<package>[^-_/].+)-(?P<version>[0-9][^-]*)$").expect("valid directory regex")
});

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Explicit,
    Changelog,
    Descriptor,
    Directory,
    /// An upstream tarball found beside the source tree
    Tarball,
    Fallback,
}

/// How much a source's value is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// A declaration by the user or the packaging itself
    Authoritative,
    /// Derived from naming conventions
    Hint,
    Generated,
}

impl Source {
    pub fn authority(&self) -> Authority {
        match self {
            Self::Explicit | Self::Changelog => Authority::Authoritative,
            Self::Descriptor | Self::Directory | Self::Tarball => Authority::Hint,
            Self::Fallback => Authority::Generated,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit option"),
            Self::Changelog => write!(f, "debian/changelog"),
            Self::Descriptor => write!(f, "source URL/path"),
            Self::Directory => write!(f, "directory name"),
            Self::Tarball => write!(f, "existing tarball"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Identity field being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Name,
    Version,
    Revision,
    ArchiveFormat,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "package name"),
            Self::Version => write!(f, "upstream version"),
            Self::Revision => write!(f, "Debian revision"),
            Self::ArchiveFormat => write!(f, "archive format"),
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub name: Option<String>,
    pub version: Option<String>,
    pub revision: Option<String>,
    pub archive_format: Option<ArchiveFormat>,
    pub native: bool,
}

impl Overrides {
    pub fn method_flags(&self) -> MethodFlags {
        MethodFlags {
            native: self.native,
        }
    }
}

/// Everything the reconciler looks at.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub explicit: &'a Overrides,
    pub descriptor: &'a SourceDescriptor,
    pub method: AcquisitionMethod,
    /// First line of an existing `debian/changelog`
    pub changelog_line: Option<&'a str>,
    /// Base name of the source directory
    pub directory_name: Option<&'a str>,
    /// Upstream tarball already present beside the source tree
    pub existing_tarball: Option<&'a ExistingTarball>,
    /// Clock reading for the snapshot version fallback
    pub now: DateTime<Utc>,
}

/// A lower-precedence value that was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub field: Field,
    pub source: Source,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" from {} ignored: {}",
            self.field, self.value, self.source, self.reason
        )
    }
}

/// The source each identity field was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub name: Source,
    pub version: Source,
    pub revision: Option<Source>,
    pub archive_format: Source,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub identity: PackageIdentity,
    pub provenance: Provenance,
    pub warnings: Vec<Warning>,
}

/// Name and version suggested by a `name-version` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DirectoryHint {
    name: String,
    version: String,
}

impl DirectoryHint {
    fn parse(directory: &str) -> Option<Self> {
        DIRECTORY_RE.captures(directory).map(|caps| Self {
            name: caps["package"].to_lowercase(),
            version: caps["version"].to_string(),
        })
    }
}

struct Candidate<T> {
    source: Source,
    value: T,
}

struct FieldResolver<'w> {
    warnings: &'w mut Vec<Warning>,
}

impl FieldResolver<'_> {
    /// Pick the first candidate and check the rest against it.
    fn resolve<T>(
        &mut self,
        field: Field,
        candidates: impl IntoIterator<Item = (Source, Option<T>)>,
    ) -> Result<Option<Candidate<T>>>
    where
        T: PartialEq + fmt::Display,
    {
        let mut present = candidates
            .into_iter()
            .filter_map(|(source, value)| value.map(|value| Candidate { source, value }));

        let Some(winner) = present.next() else {
            return Ok(None);
        };

        for other in present {
            if other.value == winner.value {
                continue;
            }
            if winner.source.authority() == Authority::Authoritative
                && other.source.authority() == Authority::Authoritative
            {
                return Err(Error::Conflict {
                    field,
                    first_source: winner.source,
                    first: winner.value.to_string(),
                    second_source: other.source,
                    second: other.value.to_string(),
                });
            }
            self.warn(Warning {
                field,
                source: other.source,
                value: other.value.to_string(),
                reason: format!("{} says \"{}\"", winner.source, winner.value),
            });
        }

        Ok(Some(winner))
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Generated version for snapshot builds, `0~YYMMDDHHmm` in UTC.
pub fn snapshot_version(now: DateTime<Utc>) -> String {
    format!("0~{}", now.format("%y%m%d%H%M"))
}

/// Merge all sources into a validated [`PackageIdentity`].
///
/// The result depends only on `sources`, so calling this twice with the
/// same input yields the same identity.
pub fn reconcile(sources: &Sources<'_>) -> Result<Reconciled> {
    let explicit = sources.explicit;
    let native = explicit.native;
    let descriptor = sources.descriptor;

    let changelog = sources
        .changelog_line
        .map(|line| ChangelogHeader::parse(line, native))
        .transpose()?;
    let directory = sources.directory_name.and_then(DirectoryHint::parse);

    // A directory hint is one name/version pair. When the descriptor found
    // no version, its package token is the whole directory name and must not
    // be combined with the hint's version.
    let descriptor_name = match (&directory, descriptor.version()) {
        (Some(_), None) => None,
        _ => Some(descriptor.base_name().to_lowercase()),
    };

    let mut warnings = Vec::new();
    let mut resolver = FieldResolver {
        warnings: &mut warnings,
    };

    let name = resolver
        .resolve(
            Field::Name,
            [
                (Source::Explicit, non_empty(explicit.name.as_deref()).map(str::to_lowercase)),
                (Source::Changelog, changelog.as_ref().map(|c| c.package.clone())),
                (Source::Descriptor, descriptor_name),
                (Source::Directory, directory.as_ref().map(|d| d.name.clone())),
            ],
        )?
        .ok_or_else(|| Error::validation("no source names the package"))?;

    let version = resolver
        .resolve(
            Field::Version,
            [
                (Source::Explicit, non_empty(explicit.version.as_deref()).map(str::to_string)),
                (Source::Changelog, changelog.as_ref().map(|c| c.version.clone())),
                (Source::Descriptor, descriptor.version().map(str::to_lowercase)),
                (Source::Directory, directory.as_ref().map(|d| d.version.clone())),
            ],
        )?
        .unwrap_or_else(|| Candidate {
            source: Source::Fallback,
            value: snapshot_version(sources.now),
        });

    let explicit_revision = non_empty(explicit.revision.as_deref());
    let revision = if native {
        if let Some(value) = explicit_revision {
            resolver.warn(Warning {
                field: Field::Revision,
                source: Source::Explicit,
                value: value.to_string(),
                reason: "native packages have no Debian revision".to_string(),
            });
        }
        None
    } else {
        Some(
            resolver
                .resolve(
                    Field::Revision,
                    [
                        (Source::Explicit, explicit_revision.map(str::to_string)),
                        (Source::Changelog, changelog.as_ref().and_then(|c| c.revision.clone())),
                    ],
                )?
                .unwrap_or_else(|| Candidate {
                    source: Source::Fallback,
                    value: FALLBACK_REVISION.to_string(),
                }),
        )
    };

    let descriptor_format = descriptor.extension().and_then(|ext| ext.archive_format());
    let format_candidates = if sources.method.is_archive() {
        vec![
            (Source::Descriptor, descriptor_format),
            (Source::Explicit, explicit.archive_format),
        ]
    } else {
        vec![
            (Source::Tarball, sources.existing_tarball.map(|t| t.format)),
            (Source::Explicit, explicit.archive_format),
            (Source::Descriptor, descriptor_format),
        ]
    };
    let archive_format = resolver
        .resolve(Field::ArchiveFormat, format_candidates)?
        .unwrap_or_else(|| Candidate {
            source: Source::Fallback,
            value: ArchiveFormat::default(),
        });

    let provenance = Provenance {
        name: name.source,
        version: version.source,
        revision: revision.as_ref().map(|r| r.source),
        archive_format: archive_format.source,
    };

    let identity = PackageIdentity::new(
        name.value,
        version.value,
        revision.map(|r| r.value),
        native,
        archive_format.value,
        sources.method,
    );

    validate(&identity, &provenance, directory.as_ref(), sources.directory_name)?;

    tracing::debug!(?identity, ?provenance, "Reconciled package identity");
    Ok(Reconciled {
        identity,
        provenance,
        warnings,
    })
}

fn validate(
    identity: &PackageIdentity,
    provenance: &Provenance,
    directory: Option<&DirectoryHint>,
    directory_name: Option<&str>,
) -> Result<()> {
    let name = identity.name();
    if name.is_empty() {
        return Err(Error::validation("package name is empty"));
    }
    if name != name.to_lowercase() {
        return Err(Error::validation(format!(
            "package name \"{name}\" is not lower-case"
        )));
    }
    if identity.upstream_version().is_empty() {
        return Err(Error::validation("upstream version is empty"));
    }
    if !identity.is_native() && identity.debian_revision().is_none_or(str::is_empty) {
        return Err(Error::validation(
            "Debian revision is empty for a non-native package",
        ));
    }

    let expected = working_dir_name(name, identity.upstream_version());
    if identity.working_dir_name() != expected {
        return Err(Error::validation(format!(
            "working directory \"{}\" is not \"{expected}\"",
            identity.working_dir_name()
        )));
    }

    let used_directory = provenance.name == Source::Directory || provenance.version == Source::Directory;
    if let (true, Some(hint)) = (used_directory, directory) {
        let hinted = working_dir_name(&hint.name, &hint.version);
        if hinted != expected {
            return Err(Error::validation(format!(
                "working directory \"{expected}\" diverges from directory name \"{}\"",
                directory_name.unwrap_or(&hinted)
            )));
        }
    }

    Ok(())
}
