//! Rollback results.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of rolling back one partition.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RollbackPartitionMetadata {
    /// Partition path.
    #[prost(string, tag = "1")]
    pub partition_path: String,
    /// Files deleted successfully.
    #[prost(string, repeated, tag = "2")]
    pub success_delete_files: Vec<String>,
    /// Files that could not be deleted.
    #[prost(string, repeated, tag = "3")]
    pub failed_delete_files: Vec<String>,
    /// Rollback log files written, with their sizes.
    #[prost(btree_map = "string, int64", tag = "4")]
    pub rollback_log_files: BTreeMap<String, i64>,
    /// Log files written by the failed commit, with their sizes.
    #[prost(btree_map = "string, int64", tag = "5")]
    pub log_files_from_failed_commit: BTreeMap<String, i64>,
}

/// A rolled-back instant.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RollbackInstantInfo {
    /// Requested time of the rolled-back instant.
    #[prost(string, tag = "1")]
    pub commit_time: String,
    /// Action of the rolled-back instant.
    #[prost(string, tag = "2")]
    pub action: String,
}

/// The metadata recorded when a rollback completes.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RollbackMetadata {
    /// Time the rollback started.
    #[prost(string, tag = "1")]
    pub start_rollback_time: String,
    /// Duration in milliseconds.
    #[prost(int64, tag = "2")]
    pub time_taken_in_millis: i64,
    /// Number of files deleted.
    #[prost(int32, tag = "3")]
    pub total_files_deleted: i32,
    /// Requested times of the rolled-back commits.
    #[prost(string, repeated, tag = "4")]
    pub commits_rollback: Vec<String>,
    /// Per-partition results.
    #[prost(btree_map = "string, message", tag = "5")]
    pub partition_metadata: BTreeMap<String, RollbackPartitionMetadata>,
    /// Metadata layout version.
    #[prost(int32, tag = "6")]
    pub version: i32,
    /// Rolled-back instants with their actions.
    #[prost(message, repeated, tag = "7")]
    pub instants_rollback: Vec<RollbackInstantInfo>,
}
