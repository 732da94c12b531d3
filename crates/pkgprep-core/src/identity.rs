//! The resolved package identity

use serde::Serialize;

use crate::format::ArchiveFormat;
use crate::method::AcquisitionMethod;

/// Name, version and packaging shape of the package being prepared.
///
/// Built once by [`crate::reconcile::reconcile`] and never modified. The
/// fields are private so that a stage further down the pipeline cannot
/// patch a value after validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageIdentity {
    name: String,
    upstream_version: String,
    debian_revision: Option<String>,
    is_native: bool,
    archive_format: ArchiveFormat,
    working_dir_name: String,
    method: AcquisitionMethod,
}

impl PackageIdentity {
    pub(crate) fn new(
        name: String,
        upstream_version: String,
        debian_revision: Option<String>,
        is_native: bool,
        archive_format: ArchiveFormat,
        method: AcquisitionMethod,
    ) -> Self {
        let working_dir_name = working_dir_name(&name, &upstream_version);
        Self {
            name,
            upstream_version,
            debian_revision,
            is_native,
            archive_format,
            working_dir_name,
            method,
        }
    }

    /// Lower-cased source package name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn upstream_version(&self) -> &str {
        &self.upstream_version
    }

    /// Debian revision, `None` for native packages.
    pub fn debian_revision(&self) -> Option<&str> {
        self.debian_revision.as_deref()
    }

    pub fn is_native(&self) -> bool {
        self.is_native
    }

    pub fn archive_format(&self) -> ArchiveFormat {
        self.archive_format
    }

    /// `name-version`, the directory the source tree is prepared in.
    pub fn working_dir_name(&self) -> &str {
        &self.working_dir_name
    }

    pub fn method(&self) -> AcquisitionMethod {
        self.method
    }

    /// Version string as it appears in `debian/changelog`.
    pub fn changelog_version(&self) -> String {
        match &self.debian_revision {
            Some(revision) if !self.is_native => format!("{}-{}", self.upstream_version, revision),
            _ => self.upstream_version.clone(),
        }
    }

    /// `name-version.tar.xz` and friends.
    pub fn upstream_tarball_name(&self) -> String {
        self.upstream_tarball_name_as(self.archive_format)
    }

    /// `name_version.orig.tar.xz` and friends.
    pub fn orig_tarball_name(&self) -> String {
        self.orig_tarball_name_as(self.archive_format)
    }

    pub(crate) fn upstream_tarball_name_as(&self, format: ArchiveFormat) -> String {
        format!("{}.{}", self.working_dir_name, format.extension())
    }

    pub(crate) fn orig_tarball_name_as(&self, format: ArchiveFormat) -> String {
        format!(
            "{}_{}.orig.{}",
            self.name,
            self.upstream_version,
            format.extension()
        )
    }
}

pub(crate) fn working_dir_name(name: &str, version: &str) -> String {
    format!("{name}-{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(native: bool) -> PackageIdentity {
        PackageIdentity::new(
            "foo".to_string(),
            "1.2".to_string(),
            (!native).then(|| "1".to_string()),
            native,
            ArchiveFormat::TarGz,
            AcquisitionMethod::FetchRemote,
        )
    }

    #[test]
    fn test_working_dir_name() {
        assert_eq!(identity(false).working_dir_name(), "foo-1.2");
    }

    #[test]
    fn test_tarball_names() {
        let id = identity(false);
        assert_eq!(id.upstream_tarball_name(), "foo-1.2.tar.gz");
        assert_eq!(id.orig_tarball_name(), "foo_1.2.orig.tar.gz");
    }

    #[test]
    fn test_changelog_version() {
        assert_eq!(identity(false).changelog_version(), "1.2-1");
        assert_eq!(identity(true).changelog_version(), "1.2");
    }
}
