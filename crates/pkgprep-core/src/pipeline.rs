//! Classifier, selector and reconciler chained together
//!
//! Resolution runs in two steps so that the caller can read on-disk
//! metadata once it knows which tree to look in:
//!
//! ```ignore
//! let classified = Classified::new(input, &overrides)?;
//! let line = classified.local_tree().and_then(read_first_changelog_line);
//! let resolution = classified.resolve_with(&overrides, line.as_deref(), Utc::now(), |file| {
//!     base.join(file).is_file()
//! })?;
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::descriptor::{SourceDescriptor, classify};
use crate::error::Result;
use crate::identity::PackageIdentity;
use crate::method::{AcquisitionMethod, select_method};
use crate::plan::{AcquisitionPlan, ExistingTarball};
use crate::reconcile::{Overrides, Provenance, Sources, Warning, reconcile};

/// A classified input with its acquisition method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    descriptor: SourceDescriptor,
    method: AcquisitionMethod,
}

impl Classified {
    /// Run the classifier and the method selector.
    pub fn new(input: &str, explicit: &Overrides) -> Result<Self> {
        let descriptor = classify(input)?;
        let method = select_method(&descriptor, &explicit.method_flags())?;
        Ok(Self { descriptor, method })
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    pub fn method(&self) -> AcquisitionMethod {
        self.method
    }

    /// Path of the existing source tree, for [`AcquisitionMethod::UseLocalTree`].
    pub fn local_tree(&self) -> Option<&str> {
        (self.method == AcquisitionMethod::UseLocalTree)
            .then(|| self.descriptor.input().trim_end_matches('/'))
    }

    /// Base name of the existing source tree.
    pub fn directory_name(&self) -> Option<String> {
        self.local_tree().map(|_| self.descriptor.final_segment())
    }

    /// Run the reconciler and build the acquisition plan.
    pub fn resolve(
        self,
        explicit: &Overrides,
        changelog_line: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Resolution> {
        self.resolve_with(explicit, changelog_line, now, |_| false)
    }

    /// Like [`Classified::resolve`], reusing an upstream tarball that
    /// already sits beside a local source tree.
    ///
    /// `has_file` is asked about candidate tarball names relative to the
    /// directory the working directory is created in.
    pub fn resolve_with(
        self,
        explicit: &Overrides,
        changelog_line: Option<&str>,
        now: DateTime<Utc>,
        has_file: impl Fn(&str) -> bool,
    ) -> Result<Resolution> {
        let directory_name = self.directory_name();
        let sources = Sources {
            explicit,
            descriptor: &self.descriptor,
            method: self.method,
            changelog_line,
            directory_name: directory_name.as_deref(),
            existing_tarball: None,
            now,
        };
        let mut reconciled = reconcile(&sources)?;

        // Name and version do not depend on the tarball, so a second pass
        // only settles the archive format.
        let existing = (self.method == AcquisitionMethod::UseLocalTree
            && !reconciled.identity.is_native())
        .then(|| ExistingTarball::find(&reconciled.identity, &has_file))
        .flatten();
        if let Some(found) = &existing {
            tracing::debug!(file = %found.file, "Reusing existing upstream tarball");
            reconciled = reconcile(&Sources {
                existing_tarball: Some(found),
                ..sources
            })?;
        }

        let plan = AcquisitionPlan::new(&self.descriptor, &reconciled.identity, existing.as_ref());

        Ok(Resolution {
            descriptor: self.descriptor,
            identity: reconciled.identity,
            provenance: reconciled.provenance,
            warnings: reconciled.warnings,
            plan,
        })
    }
}

/// Everything downstream consumers need from one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub descriptor: SourceDescriptor,
    pub identity: PackageIdentity,
    pub provenance: Provenance,
    pub warnings: Vec<Warning>,
    pub plan: AcquisitionPlan,
}

/// Resolve an input that needs no on-disk metadata.
pub fn resolve(input: &str, explicit: &Overrides, now: DateTime<Utc>) -> Result<Resolution> {
    Classified::new(input, explicit)?.resolve(explicit, None, now)
}
