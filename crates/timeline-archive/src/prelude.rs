//! Wrapper prelude.
//!
//! The `timeline-archive` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::{
    ActionKind, ActionType, ActiveAction, ArchiveConfig, ArchiveEntryBuilder, ArchiveError,
    ArchivedMetaEntry, InMemoryTimeline, Instant, InstantReader, InstantState, LoadedActiveAction,
    LocalInstantReader, LsmTimelineInstant, PayloadSlot, TableLocation, TableVersion,
    create_lsm_timeline_instant, empty_instant_entry,
};
