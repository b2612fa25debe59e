//! Savepoint metadata.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Data files pinned by a savepoint in one partition.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavepointPartitionMetadata {
    /// Partition path.
    #[prost(string, tag = "1")]
    pub partition_path: String,
    /// Data files retained by the savepoint.
    #[prost(string, repeated, tag = "2")]
    pub savepoint_data_file: Vec<String>,
}

/// The metadata recorded when a savepoint completes.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavepointMetadata {
    /// User that created the savepoint.
    #[prost(string, tag = "1")]
    pub savepointed_by: String,
    /// Creation time in epoch milliseconds.
    #[prost(int64, tag = "2")]
    pub savepointed_at: i64,
    /// Free-form comments.
    #[prost(string, tag = "3")]
    pub comments: String,
    /// Per-partition pinned files.
    #[prost(btree_map = "string, message", tag = "4")]
    pub partition_metadata: BTreeMap<String, SavepointPartitionMetadata>,
    /// Metadata layout version.
    #[prost(int32, tag = "5")]
    pub version: i32,
}
