//! Timeline vocabulary: action kinds, lifecycle states, instants, and the
//! read capability that fetches an instant's raw bytes.
//!
//! A table's timeline is an ordered sequence of operations. Each operation is
//! identified by its requested time (the operation id) and moves through the
//! lifecycle `REQUESTED -> INFLIGHT -> COMPLETED`, with one file of raw bytes
//! per state. This module only models the vocabulary; where those bytes live
//! on disk is decided by the [`InstantReader`] implementation the caller
//! injects.
//!
//! ```text
//! 20240101120000000.commit.requested     (empty)
//! 20240101120000000.commit.inflight      (empty or partial commit metadata)
//! 20240101120000000_...commit            (commit metadata)
//! ```
pub mod action;
pub mod instant;
pub mod reader;
pub mod table_version;

pub use action::{ActionKind, ActionType, InstantState, UnknownActionError};
pub use instant::Instant;
pub use reader::{InMemoryTimeline, InstantReader, LocalInstantReader};
pub use table_version::{ArchiveConfig, ParseTableVersionError, TableVersion};
