//! Closed registry of timeline actions and the tags they carry in the archive.
//!
//! [`ActionKind`] is the action name written in timeline file names
//! (`commit`, `deltacommit`, ...). [`ActionType`] is the result tag stored in
//! an archived record. The mapping between the two lives in the shared
//! dispatch table (`crate::archive::dispatch`); this module only owns the
//! names.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// Error returned when an action name is not part of the closed registry.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("Unknown timeline action: {action:?}"))]
pub struct UnknownActionError {
    /// The unrecognized action name.
    pub action: String,
}

/// The category of a timeline operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Removal of older file versions.
    Clean,
    /// Copy-on-write commit.
    Commit,
    /// Merge-on-read delta commit.
    DeltaCommit,
    /// Insert-overwrite style replacement of file groups.
    ReplaceCommit,
    /// Clustering, which replaces file groups with re-laid-out ones.
    Clustering,
    /// Rollback of a failed or unwanted operation.
    Rollback,
    /// Savepoint pinning a point in the timeline.
    Savepoint,
    /// Compaction of log files into base files.
    Compaction,
    /// Compaction of log files into fewer log files.
    LogCompaction,
}

impl ActionKind {
    /// Every registered action, in registry order.
    pub const ALL: [ActionKind; 9] = [
        ActionKind::Clean,
        ActionKind::Commit,
        ActionKind::DeltaCommit,
        ActionKind::ReplaceCommit,
        ActionKind::Clustering,
        ActionKind::Rollback,
        ActionKind::Savepoint,
        ActionKind::Compaction,
        ActionKind::LogCompaction,
    ];

    /// The timeline name of this action.
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Clean => "clean",
            ActionKind::Commit => "commit",
            ActionKind::DeltaCommit => "deltacommit",
            ActionKind::ReplaceCommit => "replacecommit",
            ActionKind::Clustering => "clustering",
            ActionKind::Rollback => "rollback",
            ActionKind::Savepoint => "savepoint",
            ActionKind::Compaction => "compaction",
            ActionKind::LogCompaction => "logcompaction",
        }
    }

    /// True for the actions that replace file groups.
    pub const fn is_replace_family(self) -> bool {
        matches!(self, ActionKind::ReplaceCommit | ActionKind::Clustering)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = UnknownActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .context(UnknownActionSnafu { action: s })
    }
}

/// Result tag stored in an archived record's `action-type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Clean metadata or clean plan.
    Clean,
    /// Commit metadata.
    Commit,
    /// Delta commit metadata.
    DeltaCommit,
    /// Replace commit metadata family.
    ReplaceCommit,
    /// Clustering, stored with the replace commit metadata family.
    Clustering,
    /// Rollback metadata.
    Rollback,
    /// Savepoint metadata.
    Savepoint,
    /// Compaction plan.
    Compaction,
    /// Log compaction plan.
    LogCompaction,
}

impl ActionType {
    /// The tag as written into the archive.
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionType::Clean => "clean",
            ActionType::Commit => "commit",
            ActionType::DeltaCommit => "deltacommit",
            ActionType::ReplaceCommit => "replacecommit",
            ActionType::Clustering => "clustering",
            ActionType::Rollback => "rollback",
            ActionType::Savepoint => "savepoint",
            ActionType::Compaction => "compaction",
            ActionType::LogCompaction => "logcompaction",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstantState {
    /// The operation has been planned.
    Requested,
    /// The operation is being executed.
    Inflight,
    /// The operation finished and its metadata is durable.
    Completed,
}

impl InstantState {
    /// Every lifecycle state, in lifecycle order.
    pub const ALL: [InstantState; 3] = [
        InstantState::Requested,
        InstantState::Inflight,
        InstantState::Completed,
    ];

    /// The state name as written into the archive (`REQUESTED`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            InstantState::Requested => "REQUESTED",
            InstantState::Inflight => "INFLIGHT",
            InstantState::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for InstantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
