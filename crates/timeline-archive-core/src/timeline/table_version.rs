//! Table format versions and the archive conversion configuration.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// On-disk format version of a table.
///
/// Versions below [`TableVersion::EIGHT`] store commit metadata as JSON text;
/// from version 8 on, commit metadata uses the structured encoding and the
/// archive is an LSM timeline of [`crate::archive::LsmTimelineInstant`] records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableVersion(pub u32);

impl TableVersion {
    /// Table version 6.
    pub const SIX: TableVersion = TableVersion(6);
    /// Table version 7.
    pub const SEVEN: TableVersion = TableVersion(7);
    /// Table version 8: structured commit metadata, LSM archive.
    pub const EIGHT: TableVersion = TableVersion(8);
    /// Version written by this crate.
    pub const CURRENT: TableVersion = TableVersion::EIGHT;

    /// Returns true when this version is `other` or newer.
    pub fn at_least(self, other: TableVersion) -> bool {
        self >= other
    }
}

impl Default for TableVersion {
    fn default() -> Self {
        TableVersion::CURRENT
    }
}

impl fmt::Display for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error returned when a table version string is not a number.
#[derive(Debug, Snafu)]
#[snafu(display("Invalid table version {input:?}: {source}"))]
pub struct ParseTableVersionError {
    input: String,
    source: std::num::ParseIntError,
}

impl FromStr for TableVersion {
    type Err = ParseTableVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u32>()
            .map(TableVersion)
            .context(ParseTableVersionSnafu { input: trimmed })
    }
}

/// Configuration for archive record conversion.
///
/// JSON layout example: `{ "table_version": 8 }`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Format version of the table whose timeline is being converted.
    #[serde(default)]
    pub table_version: TableVersion,
}

impl ArchiveConfig {
    /// Configuration for a table at `table_version`.
    pub fn for_version(table_version: TableVersion) -> Self {
        Self { table_version }
    }
}
