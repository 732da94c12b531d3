//! Core resolution layer for pkgprep
//!
//! Turns one loosely structured input (a URL, a local path or the name of
//! the current directory) into a validated package identity and decides how
//! the upstream source is obtained:
//!
//! - **Classifier** ([`descriptor`]): splits the input into transport, host,
//!   path, package token, version token and extension
//! - **Selector** ([`method`]): picks one [`AcquisitionMethod`]
//! - **Reconciler** ([`reconcile`]): merges explicit options, an existing
//!   `debian/changelog`, the descriptor and the directory name into a
//!   [`PackageIdentity`]
//!
//! # Architecture
//!
//! ```text
//!            pkgprep-cli
//!                 |
//!            pkgprep-core
//!                 |
//!   classify -> select_method -> reconcile -> AcquisitionPlan
//! ```
//!
//! Nothing in this crate touches the filesystem or the network. The caller
//! reads the changelog line and executes the plan.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use pkgprep_core::{AcquisitionMethod, ArchiveFormat, Overrides, resolve};
//!
//! let resolution = resolve(
//!     "https://example.org/foo-1.2.tar.gz",
//!     &Overrides::default(),
//!     Utc::now(),
//! )
//! .unwrap();
//! assert_eq!(resolution.identity.method(), AcquisitionMethod::FetchRemote);
//! assert_eq!(resolution.identity.working_dir_name(), "foo-1.2");
//! assert_eq!(resolution.identity.archive_format(), ArchiveFormat::TarGz);
//! ```

pub mod descriptor;
pub mod error;
pub mod format;
pub mod identity;
pub mod metadata;
pub mod method;
pub mod pipeline;
pub mod plan;
pub mod reconcile;

pub use descriptor::{Extension, SourceDescriptor, Transport, classify};
pub use error::{Error, Result};
pub use format::ArchiveFormat;
pub use identity::PackageIdentity;
pub use metadata::{CHANGELOG_PATH, ChangelogHeader};
pub use method::{AcquisitionMethod, MethodFlags, select_method};
pub use pipeline::{Classified, Resolution, resolve};
pub use plan::{AcquisitionPlan, ExistingTarball, Step};
pub use reconcile::{
    Authority, Field, Overrides, Provenance, Reconciled, Source, Sources, Warning, reconcile,
    snapshot_version,
};
