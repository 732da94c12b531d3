//! CLI argument parsing using clap derive

use clap::Parser;
use pkgprep_core::{ArchiveFormat, Overrides};

use crate::commands::ResolveRequest;

/// pkgprep - Classify an upstream source and resolve its Debian package identity
///
/// Examples:
///   pkgprep https://example.org/foo-1.2.tar.gz
///   pkgprep git@github.com:owner/foo.git -u 0.5
///   pkgprep -n                      # native package from the current directory
#[derive(Parser, Debug)]
#[command(name = "pkgprep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source URL, git address or local path [default: current directory]
    pub url: Option<String>,

    /// Legacy spelling of the positional URL
    #[arg(short = 'a', long, hide = true)]
    pub archive: Option<String>,

    /// Source package name
    #[arg(short = 'p', long = "package")]
    pub package: Option<String>,

    /// Upstream version
    #[arg(short = 'u', long = "upstreamversion")]
    pub upstream_version: Option<String>,

    /// Debian revision
    #[arg(short = 'r', long)]
    pub revision: Option<String>,

    /// Tarball compression: gz, bz2 or xz (first letter is enough)
    #[arg(short = 'z', long = "tarz", value_name = "EXT")]
    pub tarz: Option<String>,

    /// Native Debian package (no orig tarball, no revision)
    #[arg(short = 'n', long)]
    pub native: bool,

    /// Maintainer e-mail address
    #[arg(short = 'e', long, env = "DEBEMAIL")]
    pub email: Option<String>,

    /// Maintainer full name
    #[arg(short = 'f', long, env = "DEBFULLNAME")]
    pub fullname: Option<String>,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Values given explicitly with `-p`, `-u`, `-r`, `-z` and `-n`.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            name: self.package.clone(),
            version: self.upstream_version.clone(),
            revision: self.revision.clone(),
            archive_format: self
                .tarz
                .as_deref()
                .filter(|z| !z.is_empty())
                .map(ArchiveFormat::from_alias),
            native: self.native,
        }
    }

    pub fn request(&self) -> ResolveRequest {
        ResolveRequest {
            input: self.url.clone().or_else(|| self.archive.clone()),
            overrides: self.overrides(),
            json: self.json,
        }
    }
}
