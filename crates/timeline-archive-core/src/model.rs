//! Payload entities carried by timeline instants.
//!
//! Two layers live here:
//!
//! - **Records**: structs deriving both [`prost::Message`] (the structured
//!   binary encoding) and serde (the legacy JSON text encoding, camelCase
//!   field names). These are what the archive stores.
//! - **Domain models** for commit metadata ([`CommitMetadata`],
//!   [`ReplaceCommitMetadata`]), which allow the legacy null partition key and
//!   use typed enums. Conversion between the two layers is explicit, see
//!   [`crate::codec::commit`].
//!
//! This module contains **pure** data types. Encoding and decoding entry
//! points live in [`crate::codec`].
pub mod clean;
pub mod commit;
pub mod compaction;
pub mod replace;
pub mod rollback;
pub mod savepoint;
pub mod write_stat;

pub use clean::{
    CleanFileInfo, CleanFileInfoList, CleanMetadata, CleanPartitionMetadata, CleanerPlan,
    InstantInfo,
};
pub use commit::{
    AnyCommitMetadata, CommitMetadata, CommitMetadataRecord, CommitMetadataType,
    ReplaceCommitMetadata, ReplaceCommitMetadataRecord, ReplacedFileIds, StructuredCommitMetadata,
    WriteOperationType,
};
pub use compaction::{CompactionOperation, CompactionPlan, CompactionStrategy};
pub use replace::{
    ClusteringGroup, ClusteringPlan, ClusteringStrategy, RequestedReplaceMetadata, SliceInfo,
};
pub use rollback::{RollbackInstantInfo, RollbackMetadata, RollbackPartitionMetadata};
pub use savepoint::{SavepointMetadata, SavepointPartitionMetadata};
pub use write_stat::{WriteStat, WriteStatList};

use serde::{Deserialize, Deserializer};

/// Deserialize an explicit JSON `null` as the type's default value.
///
/// Legacy text payloads write `null` for empty maps and missing strings.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
