//! Archive compression formats

use std::fmt;

use serde::Serialize;

/// Compression format of the upstream tarball.
///
/// The identity only records the format. Turning it into a compressor
/// invocation is left to [`ArchiveFormat::compressor_flag`] at the point
/// where an external `tar` command is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ArchiveFormat {
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "tar.bz2")]
    TarBz2,
    #[default]
    #[serde(rename = "tar.xz")]
    TarXz,
}

impl ArchiveFormat {
    /// All formats, in the order they are probed for existing tarballs.
    pub const ALL: [ArchiveFormat; 3] = [Self::TarXz, Self::TarGz, Self::TarBz2];

    /// File extension without the leading dot, e.g. `tar.xz`.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
        }
    }

    /// The `tar` option selecting the compressor.
    pub fn compressor_flag(&self) -> &'static str {
        match self {
            Self::TarGz => "--gzip",
            Self::TarBz2 => "--bzip2",
            Self::TarXz => "--xz",
        }
    }

    /// Lenient parsing used for the `-z` option.
    ///
    /// Only the first letter counts: `g` is gzip, `b` is bzip2 and
    /// everything else falls back to xz.
    pub fn from_alias(value: &str) -> Self {
        match value.chars().next() {
            Some('g') => Self::TarGz,
            Some('b') => Self::TarBz2,
            _ => Self::TarXz,
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
