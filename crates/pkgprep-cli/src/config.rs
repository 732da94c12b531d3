//! Maintainer identity
//!
//! Resolved in order from the command line (or `DEBEMAIL` / `DEBFULLNAME`),
//! the user configuration file and the login name:
//!
//! ```toml
//! # <config_dir>/pkgprep/config.toml
//! [maintainer]
//! email = "jdoe@example.org"
//! fullname = "J. Doe"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const CONFIG_FILE: &str = "config.toml";

/// The platform configuration directory for pkgprep.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pkgprep"))
}

/// Contents of the user configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub maintainer: MaintainerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MaintainerConfig {
    pub email: Option<String>,
    pub fullname: Option<String>,
}

impl UserConfig {
    /// Load `config.toml` from `dir`. A missing file gives the defaults.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(path) = dir.map(|d| d.join(CONFIG_FILE)) else {
            return Ok(Self::default());
        };
        if !path.is_file() {
            tracing::debug!(?path, "No user config found");
            return Ok(Self::default());
        }
        tracing::debug!(?path, "Loading user config");
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Who the package is prepared by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Maintainer {
    pub fullname: String,
    pub email: String,
}

impl Maintainer {
    pub fn resolve(
        email: Option<String>,
        fullname: Option<String>,
        config: &UserConfig,
        login: Option<String>,
    ) -> Self {
        let login = login
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let email = first_non_empty([email, config.maintainer.email.clone()])
            .unwrap_or_else(|| format!("{login}@localhost"));
        let fullname =
            first_non_empty([fullname, config.maintainer.fullname.clone()]).unwrap_or(login);
        Self { fullname, email }
    }
}

impl std::fmt::Display for Maintainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.fullname, self.email)
    }
}

fn first_non_empty<const N: usize>(values: [Option<String>; N]) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_config() -> UserConfig {
        UserConfig {
            maintainer: MaintainerConfig {
                email: Some("file@example.org".to_string()),
                fullname: Some("From File".to_string()),
            },
        }
    }

    #[test]
    fn test_command_line_wins() {
        let m = Maintainer::resolve(
            Some("cli@example.org".to_string()),
            Some("From Cli".to_string()),
            &file_config(),
            Some("jdoe".to_string()),
        );
        assert_eq!(m.to_string(), "From Cli <cli@example.org>");
    }

    #[test]
    fn test_config_file_then_login() {
        let m = Maintainer::resolve(None, Some(String::new()), &file_config(), None);
        assert_eq!(m.email, "file@example.org");
        assert_eq!(m.fullname, "From File");

        let m = Maintainer::resolve(None, None, &UserConfig::default(), Some("jdoe".to_string()));
        assert_eq!(m.email, "jdoe@localhost");
        assert_eq!(m.fullname, "jdoe");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(UserConfig::load(Some(dir.path())).unwrap(), UserConfig::default());
        assert_eq!(UserConfig::load(None).unwrap(), UserConfig::default());
    }

    #[test]
    fn test_load_maintainer_table() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[maintainer]\nemail = \"jdoe@example.org\"\n",
        )
        .unwrap();
        let config = UserConfig::load(Some(dir.path())).unwrap();
        assert_eq!(config.maintainer.email.as_deref(), Some("jdoe@example.org"));
        assert_eq!(config.maintainer.fullname, None);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[maintainer\n").unwrap();
        assert!(UserConfig::load(Some(dir.path())).is_err());
    }
}
