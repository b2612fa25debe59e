//! Commit and replace-commit metadata.
//!
//! The domain types ([`CommitMetadata`], [`ReplaceCommitMetadata`]) key their
//! partition maps by `Option<String>` because legacy writers could record
//! stats under a null partition path. The records ([`CommitMetadataRecord`],
//! [`ReplaceCommitMetadataRecord`]) cannot represent that key; the mapping in
//! [`crate::codec::commit`] drops such entries on the way in.
//!
//! Record field tags 1-4 are shared by both record types, so a replace record
//! decodes as a plain commit record by ignoring its extra field.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::null_as_default;
use crate::model::write_stat::{WriteStat, WriteStatList};

/// The kind of write that produced a commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteOperationType {
    /// Insert.
    Insert,
    /// Insert of pre-tagged records.
    InsertPrepped,
    /// Upsert.
    Upsert,
    /// Upsert of pre-tagged records.
    UpsertPrepped,
    /// Bulk insert.
    BulkInsert,
    /// Bulk insert of pre-tagged records.
    BulkInsertPrepped,
    /// Delete.
    Delete,
    /// Delete of pre-tagged records.
    DeletePrepped,
    /// Bootstrap of an existing dataset.
    Bootstrap,
    /// Overwrite of the touched partitions.
    InsertOverwrite,
    /// Clustering.
    Cluster,
    /// Partition drop.
    DeletePartition,
    /// Overwrite of the whole table.
    InsertOverwriteTable,
    /// Compaction.
    Compact,
    /// Index build.
    Index,
    /// Schema change.
    AlterSchema,
    /// Log compaction.
    LogCompact,
    /// Missing or unrecognized operation.
    #[default]
    Unknown,
}

impl WriteOperationType {
    const ALL: [WriteOperationType; 18] = [
        WriteOperationType::Insert,
        WriteOperationType::InsertPrepped,
        WriteOperationType::Upsert,
        WriteOperationType::UpsertPrepped,
        WriteOperationType::BulkInsert,
        WriteOperationType::BulkInsertPrepped,
        WriteOperationType::Delete,
        WriteOperationType::DeletePrepped,
        WriteOperationType::Bootstrap,
        WriteOperationType::InsertOverwrite,
        WriteOperationType::Cluster,
        WriteOperationType::DeletePartition,
        WriteOperationType::InsertOverwriteTable,
        WriteOperationType::Compact,
        WriteOperationType::Index,
        WriteOperationType::AlterSchema,
        WriteOperationType::LogCompact,
        WriteOperationType::Unknown,
    ];

    /// The name stored in commit metadata (`UPSERT`, `INSERT_OVERWRITE`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            WriteOperationType::Insert => "INSERT",
            WriteOperationType::InsertPrepped => "INSERT_PREPPED",
            WriteOperationType::Upsert => "UPSERT",
            WriteOperationType::UpsertPrepped => "UPSERT_PREPPED",
            WriteOperationType::BulkInsert => "BULK_INSERT",
            WriteOperationType::BulkInsertPrepped => "BULK_INSERT_PREPPED",
            WriteOperationType::Delete => "DELETE",
            WriteOperationType::DeletePrepped => "DELETE_PREPPED",
            WriteOperationType::Bootstrap => "BOOTSTRAP",
            WriteOperationType::InsertOverwrite => "INSERT_OVERWRITE",
            WriteOperationType::Cluster => "CLUSTER",
            WriteOperationType::DeletePartition => "DELETE_PARTITION",
            WriteOperationType::InsertOverwriteTable => "INSERT_OVERWRITE_TABLE",
            WriteOperationType::Compact => "COMPACT",
            WriteOperationType::Index => "INDEX",
            WriteOperationType::AlterSchema => "ALTER_SCHEMA",
            WriteOperationType::LogCompact => "LOG_COMPACT",
            WriteOperationType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for WriteOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteOperationType {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to [`WriteOperationType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(WriteOperationType::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(WriteOperationType::Unknown))
    }
}

/// Which commit metadata schema a payload should be read or written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitMetadataType {
    /// Plain commit / delta commit metadata.
    Commit,
    /// Replace commit metadata (adds replaced file ids).
    Replace,
}

// ====================
// Records
// ====================

/// Replaced file ids of one partition, serialized as a bare JSON array.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplacedFileIds {
    /// File group ids replaced by the operation.
    #[prost(string, repeated, tag = "1")]
    pub file_ids: Vec<String>,
}

impl From<Vec<String>> for ReplacedFileIds {
    fn from(file_ids: Vec<String>) -> Self {
        Self { file_ids }
    }
}

/// Commit metadata as stored in the structured and text encodings.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitMetadataRecord {
    /// Write stats per partition path.
    #[prost(btree_map = "string, message", tag = "1")]
    #[serde(deserialize_with = "null_as_default")]
    pub partition_to_write_stats: BTreeMap<String, WriteStatList>,
    /// Free-form key/value metadata (schema, checkpoints, ...).
    #[prost(btree_map = "string, string", tag = "2")]
    #[serde(deserialize_with = "null_as_default")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Whether the commit was produced by compaction.
    #[prost(bool, tag = "3")]
    #[serde(deserialize_with = "null_as_default")]
    pub compacted: bool,
    /// Write operation name.
    #[prost(string, optional, tag = "4")]
    pub operation_type: Option<String>,
}

/// Replace commit metadata as stored in the structured and text encodings.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplaceCommitMetadataRecord {
    /// Write stats per partition path.
    #[prost(btree_map = "string, message", tag = "1")]
    #[serde(deserialize_with = "null_as_default")]
    pub partition_to_write_stats: BTreeMap<String, WriteStatList>,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "2")]
    #[serde(deserialize_with = "null_as_default")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Whether the commit was produced by compaction.
    #[prost(bool, tag = "3")]
    #[serde(deserialize_with = "null_as_default")]
    pub compacted: bool,
    /// Write operation name.
    #[prost(string, optional, tag = "4")]
    pub operation_type: Option<String>,
    /// File group ids replaced per partition path.
    #[prost(btree_map = "string, message", tag = "5")]
    #[serde(deserialize_with = "null_as_default")]
    pub partition_to_replace_file_ids: BTreeMap<String, ReplacedFileIds>,
}

/// A structured commit metadata payload of either schema.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuredCommitMetadata {
    /// Plain commit record.
    Commit(CommitMetadataRecord),
    /// Replace commit record.
    Replace(ReplaceCommitMetadataRecord),
}

impl StructuredCommitMetadata {
    /// The schema this payload was built with.
    pub fn metadata_type(&self) -> CommitMetadataType {
        match self {
            StructuredCommitMetadata::Commit(_) => CommitMetadataType::Commit,
            StructuredCommitMetadata::Replace(_) => CommitMetadataType::Replace,
        }
    }

    /// Project onto the plain commit schema, dropping replaced file ids.
    pub fn into_commit_record(self) -> CommitMetadataRecord {
        match self {
            StructuredCommitMetadata::Commit(record) => record,
            StructuredCommitMetadata::Replace(record) => CommitMetadataRecord {
                partition_to_write_stats: record.partition_to_write_stats,
                extra_metadata: record.extra_metadata,
                compacted: record.compacted,
                operation_type: record.operation_type,
            },
        }
    }

    /// Widen onto the replace schema; a plain commit replaced nothing.
    pub fn into_replace_record(self) -> ReplaceCommitMetadataRecord {
        match self {
            StructuredCommitMetadata::Replace(record) => record,
            StructuredCommitMetadata::Commit(record) => ReplaceCommitMetadataRecord {
                partition_to_write_stats: record.partition_to_write_stats,
                extra_metadata: record.extra_metadata,
                compacted: record.compacted,
                operation_type: record.operation_type,
                partition_to_replace_file_ids: BTreeMap::new(),
            },
        }
    }
}

// ====================
// Domain models
// ====================

/// Metadata stored with a commit or delta commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitMetadata {
    /// Write stats per partition path; `None` is the legacy null partition.
    pub partition_to_write_stats: BTreeMap<Option<String>, Vec<WriteStat>>,
    /// Free-form key/value metadata.
    pub extra_metadata: BTreeMap<String, String>,
    /// Whether the commit was produced by compaction.
    pub compacted: bool,
    /// Name of the write operation that produced the commit, as written.
    pub operation_type: Option<String>,
}

impl CommitMetadata {
    /// Empty metadata for a commit that is (or is not) a compaction.
    pub fn new(compacted: bool) -> Self {
        Self {
            compacted,
            ..Default::default()
        }
    }

    /// The write operation, or [`WriteOperationType::Unknown`] when the name
    /// is missing or not one this crate knows.
    pub fn write_operation_type(&self) -> WriteOperationType {
        self.operation_type
            .as_deref()
            .map_or(WriteOperationType::Unknown, |name| {
                name.parse().unwrap_or_default()
            })
    }

    /// Set the write operation by its canonical name.
    pub fn set_operation_type(&mut self, op: WriteOperationType) {
        self.operation_type = Some(op.as_str().to_string());
    }

    /// Record a write stat under `partition`.
    pub fn add_write_stat(&mut self, partition: Option<&str>, stat: WriteStat) {
        self.partition_to_write_stats
            .entry(partition.map(str::to_string))
            .or_default()
            .push(stat);
    }

    /// Set an extra metadata entry.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_metadata.insert(key.into(), value.into());
    }

    /// Look up an extra metadata entry.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.extra_metadata.get(key).map(String::as_str)
    }

    /// Non-null partition paths written by this commit.
    pub fn write_partition_paths(&self) -> Vec<&str> {
        self.partition_to_write_stats
            .keys()
            .filter_map(|k| k.as_deref())
            .collect()
    }

    /// All write stats, across partitions.
    pub fn write_stats(&self) -> impl Iterator<Item = &WriteStat> {
        self.partition_to_write_stats.values().flatten()
    }

    /// File id to relative path, for stats that carry both.
    pub fn file_id_to_path(&self) -> BTreeMap<&str, &str> {
        self.write_stats()
            .filter_map(|s| Some((s.file_id.as_deref()?, s.path.as_deref()?)))
            .collect()
    }

    /// Total records written across all files.
    pub fn total_records_written(&self) -> i64 {
        self.write_stats().map(|s| s.num_writes).sum()
    }

    /// Total records inserted across all files.
    pub fn total_inserts(&self) -> i64 {
        self.write_stats().map(|s| s.num_inserts).sum()
    }

    /// Total records updated across all files.
    pub fn total_updates(&self) -> i64 {
        self.write_stats().map(|s| s.num_update_writes).sum()
    }

    /// Total records deleted across all files.
    pub fn total_deletes(&self) -> i64 {
        self.write_stats().map(|s| s.num_deletes).sum()
    }
}

/// Metadata stored with a replace commit or clustering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplaceCommitMetadata {
    /// The commit metadata fields shared with plain commits.
    pub base: CommitMetadata,
    /// Replaced file ids per partition path; `None` is the legacy null partition.
    pub partition_to_replace_file_ids: BTreeMap<Option<String>, Vec<String>>,
}

impl ReplaceCommitMetadata {
    /// Record that `file_id` in `partition` was replaced.
    pub fn add_replace_file_id(&mut self, partition: Option<&str>, file_id: impl Into<String>) {
        self.partition_to_replace_file_ids
            .entry(partition.map(str::to_string))
            .or_default()
            .push(file_id.into());
    }

    /// Replaced file ids of `partition`.
    pub fn replaced_file_ids(&self, partition: &str) -> &[String] {
        self.partition_to_replace_file_ids
            .get(&Some(partition.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Commit metadata of either schema.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyCommitMetadata {
    /// Plain commit metadata.
    Commit(CommitMetadata),
    /// Replace commit metadata.
    Replace(ReplaceCommitMetadata),
}

impl AnyCommitMetadata {
    /// Default-valued metadata of the requested schema.
    pub fn default_for(metadata_type: CommitMetadataType) -> Self {
        match metadata_type {
            CommitMetadataType::Commit => AnyCommitMetadata::Commit(CommitMetadata::default()),
            CommitMetadataType::Replace => {
                AnyCommitMetadata::Replace(ReplaceCommitMetadata::default())
            }
        }
    }

    /// The schema of this metadata.
    pub fn metadata_type(&self) -> CommitMetadataType {
        match self {
            AnyCommitMetadata::Commit(_) => CommitMetadataType::Commit,
            AnyCommitMetadata::Replace(_) => CommitMetadataType::Replace,
        }
    }

    /// The fields shared by both schemas.
    pub fn base(&self) -> &CommitMetadata {
        match self {
            AnyCommitMetadata::Commit(m) => m,
            AnyCommitMetadata::Replace(m) => &m.base,
        }
    }
}

impl From<CommitMetadata> for AnyCommitMetadata {
    fn from(value: CommitMetadata) -> Self {
        AnyCommitMetadata::Commit(value)
    }
}

impl From<ReplaceCommitMetadata> for AnyCommitMetadata {
    fn from(value: ReplaceCommitMetadata) -> Self {
        AnyCommitMetadata::Replace(value)
    }
}
