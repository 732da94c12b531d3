use chrono::{TimeZone, Utc};
use pkgprep_core::{
    AcquisitionMethod, ArchiveFormat, Classified, Error, Overrides, Step, resolve,
};
use pretty_assertions::assert_eq;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
}

fn commands(steps: &[Step]) -> Vec<String> {
    steps.iter().map(Step::command).collect()
}

#[test]
fn test_fetch_remote_plan() {
    let r = resolve("https://example.org/foo-1.2.tar.gz", &Overrides::default(), now()).unwrap();

    assert_eq!(r.identity.method(), AcquisitionMethod::FetchRemote);
    assert_eq!(r.plan.tarball.as_deref(), Some("foo-1.2.tar.gz"));
    assert_eq!(
        commands(&r.plan.steps),
        vec![
            "wget -O 'foo-1.2.tar.gz' 'https://example.org/foo-1.2.tar.gz'".to_string(),
            "mkdir -p 'foo-1.2' && tar -xf 'foo-1.2.tar.gz' -C 'foo-1.2' --strip-components=1"
                .to_string(),
            "ln -sf 'foo-1.2.tar.gz' 'foo_1.2.orig.tar.gz'".to_string(),
        ]
    );
}

#[test]
fn test_orig_tarball_is_not_relinked() {
    let r = resolve("foo_1.2.orig.tar.xz", &Overrides::default(), now()).unwrap();

    assert_eq!(r.identity.method(), AcquisitionMethod::CopyLocalArchive);
    assert_eq!(r.descriptor.version_token(), Some("_1.2"));
    assert_eq!(r.identity.archive_format(), ArchiveFormat::TarXz);
    assert!(!r.plan.steps.iter().any(|s| matches!(s, Step::LinkOrig { .. })));
    assert!(!r.plan.steps.iter().any(|s| matches!(s, Step::CopyArchive { .. })));
}

#[test]
fn test_local_archive_elsewhere_is_copied() {
    let r = resolve("../dl/foo-2.0.tgz", &Overrides::default(), now()).unwrap();
    assert_eq!(
        r.plan.steps[0],
        Step::CopyArchive {
            from: "../dl/foo-2.0.tgz".to_string(),
            to: "foo-2.0.tgz".to_string(),
        }
    );
    assert_eq!(r.identity.orig_tarball_name(), "foo_2.0.orig.tar.gz");
}

#[test]
fn test_clone_plan_creates_tarball() {
    let explicit = Overrides {
        version: Some("0.5".to_string()),
        ..Default::default()
    };
    let r = resolve("git@github.com:owner/foo.git", &explicit, now()).unwrap();

    assert_eq!(r.identity.method(), AcquisitionMethod::CloneVcs);
    assert_eq!(r.plan.source_dir, "foo");
    assert_eq!(
        r.plan.steps,
        vec![
            Step::Clone {
                url: "git@github.com:owner/foo.git".to_string(),
                dir: "foo".to_string(),
            },
            Step::CopyTree {
                from: "foo".to_string(),
                to: "foo-0.5".to_string(),
            },
            Step::CreateTarball {
                dir: "foo-0.5".to_string(),
                tarball: "foo-0.5.tar.xz".to_string(),
                format: ArchiveFormat::TarXz,
            },
            Step::LinkOrig {
                tarball: "foo-0.5.tar.xz".to_string(),
                orig: "foo_0.5.orig.tar.xz".to_string(),
            },
        ]
    );
}

#[test]
fn test_native_tree_in_place_has_no_steps() {
    let explicit = Overrides {
        native: true,
        ..Default::default()
    };
    let r = resolve("foo-1.0/", &explicit, now()).unwrap();
    assert_eq!(r.plan.source_dir, "foo-1.0");
    assert!(r.plan.steps.is_empty());
    assert_eq!(r.plan.tarball, None);
}

#[test]
fn test_local_tree_reads_metadata_location() {
    let classified = Classified::new("src/foo-1.0/", &Overrides::default()).unwrap();
    assert_eq!(classified.method(), AcquisitionMethod::UseLocalTree);
    assert_eq!(classified.local_tree(), Some("src/foo-1.0"));
    assert_eq!(classified.directory_name().as_deref(), Some("foo-1.0"));

    let r = classified
        .resolve(
            &Overrides::default(),
            Some("foo (1.0-2) unstable; urgency=medium"),
            now(),
        )
        .unwrap();
    assert_eq!(r.identity.debian_revision(), Some("2"));
    assert_eq!(r.identity.changelog_version(), "1.0-2");
}

#[test]
fn test_remote_inputs_have_no_local_tree() {
    let classified =
        Classified::new("https://example.org/foo-1.2.tar.gz", &Overrides::default()).unwrap();
    assert_eq!(classified.local_tree(), None);
    assert_eq!(classified.directory_name(), None);
}

#[test]
fn test_git_url_identity() {
    let r = resolve("git://example.org/foo.git", &Overrides::default(), now()).unwrap();
    assert_eq!(r.identity.method(), AcquisitionMethod::CloneVcs);
    assert_eq!(r.descriptor.extension(), None);
    assert_eq!(r.descriptor.version_token(), None);
    assert_eq!(r.identity.upstream_version(), "0~2501150900");
}

#[test]
fn test_trailing_slash_archive_fails() {
    assert!(matches!(
        resolve("foo.tar.gz/", &Overrides::default(), now()),
        Err(Error::Unclassifiable { .. })
    ));
}

#[test]
fn test_resolution_serializes() {
    let r = resolve("https://example.org/foo-1.2.tar.gz", &Overrides::default(), now()).unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["identity"]["name"], "foo");
    assert_eq!(json["identity"]["archive_format"], "tar.gz");
    assert_eq!(json["identity"]["method"], "fetch-remote");
    assert_eq!(json["descriptor"]["extension"], ".tar.gz");
    assert_eq!(json["provenance"]["version"], "descriptor");
    assert_eq!(json["plan"]["steps"][0]["step"], "download");
}

#[test]
fn test_tarz_does_not_relabel_downloaded_archive() {
    let explicit = Overrides {
        archive_format: Some(ArchiveFormat::TarXz),
        ..Default::default()
    };
    let r = resolve("https://example.org/foo-1.2.tar.gz", &explicit, now()).unwrap();

    assert_eq!(r.identity.archive_format(), ArchiveFormat::TarGz);
    assert_eq!(
        r.plan.steps.last(),
        Some(&Step::LinkOrig {
            tarball: "foo-1.2.tar.gz".to_string(),
            orig: "foo_1.2.orig.tar.gz".to_string(),
        })
    );
    assert_eq!(r.warnings.len(), 1);
}

#[test]
fn test_tree_with_underscore_version_resolves() {
    let r = resolve("foo-1.0_beta", &Overrides::default(), now()).unwrap();
    assert_eq!(r.identity.name(), "foo");
    assert_eq!(r.identity.upstream_version(), "1.0_beta");
    assert_eq!(r.plan.source_dir, "foo-1.0_beta");
    assert!(!r.plan.steps.iter().any(|s| matches!(s, Step::CopyTree { .. })));
}

#[test]
fn test_existing_tarball_beside_tree_is_reused() {
    let classified = Classified::new("foo-1.0", &Overrides::default()).unwrap();
    let r = classified
        .resolve_with(&Overrides::default(), None, now(), |file| {
            file == "foo-1.0.tar.bz2"
        })
        .unwrap();

    assert_eq!(r.identity.archive_format(), ArchiveFormat::TarBz2);
    assert_eq!(r.plan.tarball.as_deref(), Some("foo-1.0.tar.bz2"));
    assert_eq!(
        commands(&r.plan.steps),
        vec!["ln -sf 'foo-1.0.tar.bz2' 'foo_1.0.orig.tar.bz2'".to_string()]
    );
}

#[test]
fn test_existing_orig_tarball_needs_no_steps() {
    let classified = Classified::new("foo-1.0", &Overrides::default()).unwrap();
    let r = classified
        .resolve_with(&Overrides::default(), None, now(), |file| {
            file == "foo_1.0.orig.tar.xz"
        })
        .unwrap();
    assert!(r.plan.steps.is_empty());
    assert_eq!(r.plan.tarball.as_deref(), Some("foo_1.0.orig.tar.xz"));
}

#[test]
fn test_native_tree_ignores_existing_tarball() {
    let explicit = Overrides {
        native: true,
        ..Default::default()
    };
    let classified = Classified::new("foo-1.0", &explicit).unwrap();
    let r = classified
        .resolve_with(&explicit, None, now(), |_| true)
        .unwrap();
    assert_eq!(r.plan.tarball, None);
    assert!(r.plan.steps.is_empty());
}
