//! Acquisition plan
//!
//! The external steps that bring the source into `name-version/` and put
//! the upstream tarball beside it. The plan is data only: executing it is
//! the job of whatever consumes the resolved identity.

use std::fmt;

use serde::Serialize;

use crate::descriptor::SourceDescriptor;
use crate::format::ArchiveFormat;
use crate::identity::PackageIdentity;
use crate::method::AcquisitionMethod;

/// One external operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum Step {
    Download { url: String, file: String },
    Clone { url: String, dir: String },
    CopyArchive { from: String, to: String },
    CopyTree { from: String, to: String },
    Extract { archive: String, into: String },
    CreateTarball {
        dir: String,
        tarball: String,
        format: ArchiveFormat,
    },
    LinkOrig { tarball: String, orig: String },
}

impl Step {
    /// Shell rendition of the step, for display.
    pub fn command(&self) -> String {
        match self {
            Self::Download { url, file } => format!("wget -O '{file}' '{url}'"),
            Self::Clone { url, dir } => format!("git clone '{url}' '{dir}'"),
            Self::CopyArchive { from, to } => format!("cp -f '{from}' '{to}'"),
            Self::CopyTree { from, to } => format!("cp -dR '{from}/.' '{to}'"),
            Self::Extract { archive, into } => format!(
                "mkdir -p '{into}' && tar -xf '{archive}' -C '{into}' --strip-components=1"
            ),
            Self::CreateTarball {
                dir,
                tarball,
                format,
            } => format!(
                "tar --exclude '{dir}/debian' --anchored --exclude-vcs {} -cf '{tarball}' '{dir}'",
                format.compressor_flag()
            ),
            Self::LinkOrig { tarball, orig } => format!("ln -sf '{tarball}' '{orig}'"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command())
    }
}

/// An upstream tarball already present beside the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingTarball {
    pub file: String,
    pub format: ArchiveFormat,
}

impl ExistingTarball {
    /// Look for `name-version.tar.*`, then `name_version.orig.tar.*`.
    ///
    /// `has_file` answers whether a file of that name sits next to the
    /// working directory. The first hit in [`ArchiveFormat::ALL`] order wins.
    pub fn find(identity: &PackageIdentity, has_file: impl Fn(&str) -> bool) -> Option<Self> {
        let upstream = ArchiveFormat::ALL
            .into_iter()
            .map(|format| (identity.upstream_tarball_name_as(format), format));
        let orig = ArchiveFormat::ALL
            .into_iter()
            .map(|format| (identity.orig_tarball_name_as(format), format));

        upstream
            .chain(orig)
            .find(|(file, _)| has_file(file))
            .map(|(file, format)| Self { file, format })
    }
}

/// Ordered steps for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionPlan {
    /// Directory the upstream tree is taken from before it is copied
    pub source_dir: String,
    /// Upstream tarball the orig tarball links to, if any
    pub tarball: Option<String>,
    pub steps: Vec<Step>,
}

impl AcquisitionPlan {
    /// Build the plan for a resolved identity.
    ///
    /// A tree-based method with an `existing` tarball reuses it instead of
    /// creating a new one.
    pub fn new(
        descriptor: &SourceDescriptor,
        identity: &PackageIdentity,
        existing: Option<&ExistingTarball>,
    ) -> Self {
        let working_dir = identity.working_dir_name().to_string();
        let input = descriptor.input().to_string();
        let mut steps = Vec::new();

        let (source_dir, tarball) = match identity.method() {
            AcquisitionMethod::FetchRemote => {
                let archive = descriptor.final_segment();
                steps.push(Step::Download {
                    url: input,
                    file: archive.clone(),
                });
                steps.push(Step::Extract {
                    archive: archive.clone(),
                    into: working_dir.clone(),
                });
                (working_dir.clone(), Some(archive))
            }
            AcquisitionMethod::CopyLocalArchive => {
                let archive = descriptor.final_segment();
                if input != archive {
                    steps.push(Step::CopyArchive {
                        from: input,
                        to: archive.clone(),
                    });
                }
                steps.push(Step::Extract {
                    archive: archive.clone(),
                    into: working_dir.clone(),
                });
                (working_dir.clone(), Some(archive))
            }
            AcquisitionMethod::CloneVcs => {
                let clone_dir = descriptor.stem();
                steps.push(Step::Clone {
                    url: input,
                    dir: clone_dir.clone(),
                });
                Self::push_tree_steps(&mut steps, &clone_dir, identity, existing);
                (clone_dir, Self::tree_tarball(identity, existing))
            }
            AcquisitionMethod::UseLocalTree => {
                let tree = input.trim_end_matches('/').to_string();
                Self::push_tree_steps(&mut steps, &tree, identity, existing);
                (tree, Self::tree_tarball(identity, existing))
            }
        };

        if let Some(tarball) = tarball.as_deref().filter(|_| !identity.is_native()) {
            let orig = identity.orig_tarball_name();
            if tarball != orig {
                steps.push(Step::LinkOrig {
                    tarball: tarball.to_string(),
                    orig,
                });
            }
        }

        Self {
            source_dir,
            tarball,
            steps,
        }
    }

    fn push_tree_steps(
        steps: &mut Vec<Step>,
        tree: &str,
        identity: &PackageIdentity,
        existing: Option<&ExistingTarball>,
    ) {
        let working_dir = identity.working_dir_name();
        let tree_name = tree.rsplit('/').next().unwrap_or(tree);
        if tree_name != working_dir {
            steps.push(Step::CopyTree {
                from: tree.to_string(),
                to: working_dir.to_string(),
            });
        }
        if !identity.is_native() && existing.is_none() {
            steps.push(Step::CreateTarball {
                dir: working_dir.to_string(),
                tarball: identity.upstream_tarball_name(),
                format: identity.archive_format(),
            });
        }
    }

    fn tree_tarball(identity: &PackageIdentity, existing: Option<&ExistingTarball>) -> Option<String> {
        if identity.is_native() {
            return None;
        }
        Some(match existing {
            Some(found) => found.file.clone(),
            None => identity.upstream_tarball_name(),
        })
    }
}
