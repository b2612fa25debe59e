//! Clean plans and clean results.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reference to an instant by time, action, and state name.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstantInfo {
    /// Requested time of the instant.
    #[prost(string, tag = "1")]
    pub timestamp: String,
    /// Action name.
    #[prost(string, tag = "2")]
    pub action: String,
    /// State name.
    #[prost(string, tag = "3")]
    pub state: String,
}

/// A file scheduled for deletion by a clean.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanFileInfo {
    /// Full path of the file.
    #[prost(string, tag = "1")]
    pub file_path: String,
    /// Whether the file is a bootstrap base file.
    #[prost(bool, tag = "2")]
    pub is_bootstrap_base_file: bool,
}

/// Files to delete in one partition.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanFileInfoList {
    /// Files in the partition.
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<CleanFileInfo>,
}

/// The plan recorded when a clean is requested.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanerPlan {
    /// Oldest instant whose files must be retained.
    #[prost(message, optional, tag = "1")]
    pub earliest_instant_to_retain: Option<InstantInfo>,
    /// Last completed commit when the plan was made.
    #[prost(string, optional, tag = "2")]
    pub last_completed_commit_timestamp: Option<String>,
    /// Cleaning policy name.
    #[prost(string, tag = "3")]
    pub policy: String,
    /// Files to delete per partition path.
    #[prost(btree_map = "string, message", tag = "4")]
    pub file_paths_to_be_deleted_per_partition: BTreeMap<String, CleanFileInfoList>,
    /// Partitions deleted outright.
    #[prost(string, repeated, tag = "5")]
    pub partitions_to_be_deleted: Vec<String>,
    /// Plan layout version.
    #[prost(int32, tag = "6")]
    pub version: i32,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "7")]
    pub extra_metadata: BTreeMap<String, String>,
}

/// Outcome of cleaning one partition.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanPartitionMetadata {
    /// Partition path.
    #[prost(string, tag = "1")]
    pub partition_path: String,
    /// Cleaning policy name.
    #[prost(string, tag = "2")]
    pub policy: String,
    /// Patterns that were scheduled for deletion.
    #[prost(string, repeated, tag = "3")]
    pub delete_path_patterns: Vec<String>,
    /// Files deleted successfully.
    #[prost(string, repeated, tag = "4")]
    pub success_delete_files: Vec<String>,
    /// Files that could not be deleted.
    #[prost(string, repeated, tag = "5")]
    pub failed_delete_files: Vec<String>,
    /// Whether the whole partition was deleted.
    #[prost(bool, tag = "6")]
    pub is_partition_deleted: bool,
}

/// The metadata recorded when a clean completes.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanMetadata {
    /// Time the clean started.
    #[prost(string, tag = "1")]
    pub start_clean_time: String,
    /// Duration in milliseconds.
    #[prost(int64, tag = "2")]
    pub time_taken_in_millis: i64,
    /// Number of files deleted.
    #[prost(int32, tag = "3")]
    pub total_files_deleted: i32,
    /// Oldest commit retained.
    #[prost(string, tag = "4")]
    pub earliest_commit_to_retain: String,
    /// Last completed commit when the clean ran.
    #[prost(string, tag = "5")]
    pub last_completed_commit_timestamp: String,
    /// Per-partition results.
    #[prost(btree_map = "string, message", tag = "6")]
    pub partition_metadata: BTreeMap<String, CleanPartitionMetadata>,
    /// Metadata layout version.
    #[prost(int32, tag = "7")]
    pub version: i32,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "8")]
    pub extra_metadata: BTreeMap<String, String>,
}
