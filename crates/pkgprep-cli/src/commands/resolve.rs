//! Resolve command implementation

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::Utc;
use colored::Colorize;
use pkgprep_core::{CHANGELOG_PATH, Classified, Overrides, Resolution};
use serde::Serialize;

use crate::config::Maintainer;
use crate::error::{CliError, Result};

/// Upper bound on the bytes read from `debian/changelog`.
const CHANGELOG_READ_LIMIT: u64 = 4096;

const FILE_SCHEME: &str = "file://";

/// What the command line asks to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub input: Option<String>,
    pub overrides: Overrides,
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    resolution: &'a Resolution,
    maintainer: &'a Maintainer,
}

/// Run the resolve command
pub fn run_resolve(cwd: &Path, request: &ResolveRequest, maintainer: &Maintainer) -> Result<()> {
    let (input, base) = normalize_input(request.input.as_deref(), cwd)?;
    tracing::debug!(%input, base = %base.display(), "Resolving source");

    let classified = Classified::new(&input, &request.overrides)?;
    let changelog_line = match classified.local_tree() {
        Some(tree) => read_changelog_line(&base.join(tree).join(CHANGELOG_PATH))?,
        None => None,
    };
    let resolution = classified.resolve_with(
        &request.overrides,
        changelog_line.as_deref(),
        Utc::now(),
        |file| base.join(file).is_file(),
    )?;

    if request.json {
        let report = Report {
            resolution: &resolution,
            maintainer,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&resolution, maintainer);
    }
    Ok(())
}

/// Drop a `file://` prefix and substitute the current directory for an
/// empty input or `.`.
///
/// Returns the input to classify and the directory it is relative to.
fn normalize_input(raw: Option<&str>, cwd: &Path) -> Result<(String, PathBuf)> {
    let input = raw.unwrap_or_default();
    let input = input.strip_prefix(FILE_SCHEME).unwrap_or(input);
    if !matches!(input, "" | "." | "./") {
        return Ok((input.to_string(), cwd.to_path_buf()));
    }

    let name = cwd
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::user(format!("Cannot name a package after {}", cwd.display())))?;
    let parent = cwd.parent().unwrap_or(cwd);
    Ok((name.to_string(), parent.to_path_buf()))
}

/// First line of the changelog at `path`, if the file exists.
fn read_changelog_line(path: &Path) -> Result<Option<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No changelog in source tree");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let mut buf = Vec::new();
    file.take(CHANGELOG_READ_LIMIT).read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf);
    let line = text.lines().next().unwrap_or_default().to_string();
    tracing::debug!(path = %path.display(), %line, "Read changelog header");
    Ok(Some(line))
}

fn print_summary(resolution: &Resolution, maintainer: &Maintainer) {
    let identity = &resolution.identity;
    let provenance = &resolution.provenance;
    let info = "I:".green();

    println!(
        "{} {} = {} ({})",
        info,
        "package".bold(),
        identity.name().cyan(),
        provenance.name
    );
    println!(
        "{} {} = {} ({})",
        info,
        "version".bold(),
        identity.upstream_version().cyan(),
        provenance.version
    );
    match (identity.debian_revision(), provenance.revision) {
        (Some(revision), Some(source)) => {
            println!("{} {} = {} ({})", info, "revision".bold(), revision.cyan(), source)
        }
        _ => println!("{} {} = {}", info, "revision".bold(), "none (native)".dimmed()),
    }
    println!(
        "{} {} = {} ({})",
        info,
        "format".bold(),
        identity.archive_format(),
        provenance.archive_format
    );
    println!("{} {} = {}", info, "method".bold(), identity.method());
    println!("{} {} = {}", info, "workdir".bold(), identity.working_dir_name());
    println!("{} {} = {}", info, "maintainer".bold(), maintainer);

    if resolution.plan.steps.is_empty() {
        println!("{} {}", info, "nothing to do".dimmed());
    }
    for step in &resolution.plan.steps {
        println!("{} $ {}", info, step);
    }
}
