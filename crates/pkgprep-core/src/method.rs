//! Acquisition method selection
//!
//! Maps a classified descriptor onto exactly one way of obtaining the
//! source tree. The rules form a table over
//! `(transport class, extension class, trailing slash)`; the first
//! matching row wins.
//!
//! | transport        | extension              | trailing `/` | method             |
//! |------------------|------------------------|--------------|--------------------|
//! | http/https/ftp   | `.git` or user `git@`  | any          | `CloneVcs`         |
//! | http/https/ftp   | archive                | any          | `FetchRemote`      |
//! | git              | any                    | any          | `CloneVcs`         |
//! | none             | none                   | any          | `UseLocalTree`     |
//! | none             | `.git`                 | any          | unclassifiable     |
//! | none             | archive                | yes          | unclassifiable     |
//! | none             | archive                | no           | `CopyLocalArchive` |

use std::fmt;

use serde::Serialize;

use crate::descriptor::{Extension, SourceDescriptor, Transport};
use crate::error::{Error, Result};

/// How the source tree is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionMethod {
    /// Download an archive over http, https or ftp
    FetchRemote,
    /// Clone a git repository
    CloneVcs,
    /// Copy an archive from the local filesystem
    CopyLocalArchive,
    /// Use an existing local source tree
    UseLocalTree,
}

impl AcquisitionMethod {
    /// True when the source arrives as an archive rather than a tree.
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::FetchRemote | Self::CopyLocalArchive)
    }
}

impl fmt::Display for AcquisitionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchRemote => write!(f, "fetch-remote"),
            Self::CloneVcs => write!(f, "clone-vcs"),
            Self::CopyLocalArchive => write!(f, "copy-local-archive"),
            Self::UseLocalTree => write!(f, "use-local-tree"),
        }
    }
}

/// Explicit flags that constrain method selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodFlags {
    /// Native packages carry no separate orig tarball
    pub native: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportClass {
    Local,
    Web,
    Vcs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtensionClass {
    None,
    Vcs,
    Archive,
}

fn transport_class(transport: Transport) -> TransportClass {
    match transport {
        Transport::None => TransportClass::Local,
        Transport::Http | Transport::Https | Transport::Ftp => TransportClass::Web,
        Transport::Git => TransportClass::Vcs,
    }
}

// A `git@` user marks a repository whatever the suffix says.
fn extension_class(descriptor: &SourceDescriptor) -> ExtensionClass {
    match (descriptor.extension(), descriptor.auth_token()) {
        (_, Some("git@")) | (Some(Extension::Git), _) => ExtensionClass::Vcs,
        (None, _) => ExtensionClass::None,
        (Some(_), _) => ExtensionClass::Archive,
    }
}

/// Select the acquisition method for a classified descriptor.
pub fn select_method(descriptor: &SourceDescriptor, flags: &MethodFlags) -> Result<AcquisitionMethod> {
    let input = descriptor.input();

    if let Some(ext) = descriptor.extension().filter(Extension::is_orig) {
        if descriptor.version_separator() != Some('_') {
            return Err(Error::unclassifiable(
                input,
                format!("{ext} archives must be named package_version{ext}"),
            ));
        }
        if flags.native {
            return Err(Error::unclassifiable(
                input,
                format!("a native package has no {ext} archive"),
            ));
        }
    }

    let method = match (
        transport_class(descriptor.transport()),
        extension_class(descriptor),
        descriptor.has_trailing_slash(),
    ) {
        (TransportClass::Web, ExtensionClass::Vcs, _) => AcquisitionMethod::CloneVcs,
        (TransportClass::Web, ExtensionClass::Archive, _) => AcquisitionMethod::FetchRemote,
        (TransportClass::Web, ExtensionClass::None, _) => {
            return Err(Error::unclassifiable(
                input,
                "remote URL names neither an archive nor a git repository",
            ));
        }
        (TransportClass::Vcs, _, _) => AcquisitionMethod::CloneVcs,
        (TransportClass::Local, ExtensionClass::None, _) => AcquisitionMethod::UseLocalTree,
        (TransportClass::Local, ExtensionClass::Vcs, _) => {
            return Err(Error::unclassifiable(
                input,
                "a local .git path is neither a source tree nor an archive",
            ));
        }
        (TransportClass::Local, ExtensionClass::Archive, true) => {
            return Err(Error::unclassifiable(
                input,
                "an archive cannot be a directory",
            ));
        }
        (TransportClass::Local, ExtensionClass::Archive, false) => {
            AcquisitionMethod::CopyLocalArchive
        }
    };

    tracing::debug!(%method, "Selected acquisition method");
    Ok(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::classify;

    fn select(input: &str) -> Result<AcquisitionMethod> {
        select_method(&classify(input).unwrap(), &MethodFlags::default())
    }

    #[test]
    fn test_remote_archive_is_fetched() {
        assert_eq!(
            select("https://example.org/foo-1.2.tar.gz").unwrap(),
            AcquisitionMethod::FetchRemote
        );
    }

    #[test]
    fn test_archive_with_trailing_slash_is_unclassifiable() {
        assert!(matches!(
            select("foo.tar.gz/"),
            Err(Error::Unclassifiable { .. })
        ));
    }

    #[test]
    fn test_display_is_kebab_case() {
        assert_eq!(AcquisitionMethod::CopyLocalArchive.to_string(), "copy-local-archive");
    }
}
