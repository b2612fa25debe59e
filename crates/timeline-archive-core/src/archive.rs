//! Conversion between timeline instants and archival records.
//!
//! - [`entry`]: the unified archival record ([`ArchivedMetaEntry`]).
//! - [`dispatch`]: the per-action rule table every entry point consults.
//! - [`builder`]: the two record entry points, from a live instant and from
//!   an archived LSM record.
//! - [`lsm`]: folding an active action into the compact LSM record.
//!
//! ```text
//!  InstantReader ──bytes──▶ ArchiveEntryBuilder::from_active_instant ─┐
//!                                                                     ├─▶ ArchivedMetaEntry
//!  LsmTimelineInstant ────▶ ArchiveEntryBuilder::from_lsm_record ─────┘
//!        ▲
//!        └── create_lsm_timeline_instant ◀── ActiveAction
//! ```
pub mod builder;
pub mod dispatch;
pub mod entry;
pub mod lsm;
mod payload;

pub use builder::{ArchiveEntryBuilder, empty_instant_entry};
pub use dispatch::{ActionRule, PayloadSlot, PlanSource, Presence, SlotRule, rule_for};
pub use entry::{ArchivedMetaEntry, DecodedPayload};
pub use lsm::{
    ActiveAction, LSM_TIMELINE_INSTANT_VERSION_1, LoadedActiveAction, LsmTimelineInstant,
    create_lsm_timeline_instant,
};

use snafu::{Backtrace, prelude::*};

use crate::codec::{CodecError, CommitMetadataError};
use crate::storage::StorageError;
use crate::timeline::{ActionKind, TableVersion};

/// Errors raised while building archival records.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArchiveError {
    /// The action is outside the closed registry.
    #[snafu(display("Not implemented: timeline action {action:?} is not supported"))]
    UnsupportedAction {
        /// The unrecognized action name.
        action: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// The archive-record read path was used on a table that predates it.
    #[snafu(display(
        "Archived LSM records require table version {required} or later, table is at {version}"
    ))]
    TableVersionTooOld {
        /// The table's version.
        version: TableVersion,
        /// The minimum version of the read path.
        required: TableVersion,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// Reading an instant's bytes failed.
    #[snafu(display("Failed to read instant {instant}: {source}"))]
    ReadInstant {
        /// The instant that could not be read.
        instant: String,
        /// Underlying storage error.
        #[snafu(backtrace)]
        source: StorageError,
    },

    /// Commit metadata of an instant could not be decoded.
    #[snafu(display("Failed to decode commit metadata of {action} {operation_id}: {source}"))]
    CommitMetadata {
        /// Operation id of the instant.
        operation_id: String,
        /// Action of the instant.
        action: ActionKind,
        /// Underlying commit metadata error.
        #[snafu(backtrace)]
        source: CommitMetadataError,
    },

    /// A non-commit payload of an instant could not be decoded.
    #[snafu(display("Failed to decode {slot} of {action} {operation_id}: {source}"))]
    PayloadDecode {
        /// Operation id of the instant.
        operation_id: String,
        /// Action of the instant.
        action: ActionKind,
        /// The payload that failed.
        slot: PayloadSlot,
        /// Underlying codec error.
        #[snafu(backtrace)]
        source: CodecError,
    },

    /// A payload the action requires is missing or empty.
    #[snafu(display("Missing {slot} for {action} {operation_id}"))]
    MissingPayload {
        /// Operation id of the instant.
        operation_id: String,
        /// Action of the instant.
        action: ActionKind,
        /// The missing payload.
        slot: PayloadSlot,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// An active action was assembled from no instants.
    #[snafu(display("An active action needs at least one instant"))]
    EmptyActiveAction {
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },
}
