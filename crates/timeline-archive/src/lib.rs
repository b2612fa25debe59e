//! # timeline-archive
//!
//! Archival record conversion for table timelines.
//!
//! This crate is the supported public entry point and provides a small, stable surface.
//!
//! ## Example
//!
//! ```rust,ignore
//! use timeline_archive::prelude::*;
//!
//! let builder = ArchiveEntryBuilder::new(ArchiveConfig::for_version(TableVersion::EIGHT));
//! let entry = builder.from_active_instant(&instant, &timeline).await?;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Payload entities namespace (wrapper-only).
pub mod model {
    pub use timeline_archive_core::model::*;
}

/// Encodings namespace (wrapper-only).
pub mod codec {
    pub use timeline_archive_core::codec::{
        CodecError, CommitMetadataError, CommitMetadataSerDe, CommitMetadataSerDeV1,
        CommitMetadataSerDeV2, STRUCTURED_MAGIC, decode_commit_metadata, decode_structured,
        encode_commit_metadata, encode_structured, encode_structured_to_text, serde_for,
    };
}

pub use timeline_archive_core::archive::{
    ActiveAction, ArchiveEntryBuilder, ArchiveError, ArchivedMetaEntry, LoadedActiveAction,
    LsmTimelineInstant, PayloadSlot, create_lsm_timeline_instant, empty_instant_entry,
};
pub use timeline_archive_core::storage::TableLocation;
pub use timeline_archive_core::timeline::{
    ActionKind, ActionType, ArchiveConfig, InMemoryTimeline, Instant, InstantReader, InstantState,
    LocalInstantReader, TableVersion,
};
