//! Compaction plans, shared by compaction and log compaction.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Compaction of one file slice.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompactionOperation {
    /// Base instant time of the file slice.
    #[prost(string, tag = "1")]
    pub base_instant_time: String,
    /// Log files merged by the operation.
    #[prost(string, repeated, tag = "2")]
    pub delta_file_paths: Vec<String>,
    /// Base file of the slice, if any.
    #[prost(string, optional, tag = "3")]
    pub data_file_path: Option<String>,
    /// File group id.
    #[prost(string, tag = "4")]
    pub file_id: String,
    /// Partition path.
    #[prost(string, tag = "5")]
    pub partition_path: String,
    /// Strategy-specific metrics.
    #[prost(btree_map = "string, double", tag = "6")]
    pub metrics: BTreeMap<String, f64>,
    /// Bootstrap base file, if any.
    #[prost(string, optional, tag = "7")]
    pub bootstrap_file_path: Option<String>,
}

/// Strategy used to select the operations of a plan.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompactionStrategy {
    /// Compactor implementation name.
    #[prost(string, tag = "1")]
    pub compactor_class_name: String,
    /// Strategy parameters.
    #[prost(btree_map = "string, string", tag = "2")]
    pub strategy_params: BTreeMap<String, String>,
}

/// The plan recorded when a compaction or log compaction is requested.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompactionPlan {
    /// File slices to compact.
    #[prost(message, repeated, tag = "1")]
    pub operations: Vec<CompactionOperation>,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "2")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Plan layout version.
    #[prost(int32, tag = "3")]
    pub version: i32,
    /// Selection strategy, if recorded.
    #[prost(message, optional, tag = "4")]
    pub strategy: Option<CompactionStrategy>,
    /// Whether record-level metadata columns are preserved.
    #[prost(bool, tag = "5")]
    pub preserve_hoodie_metadata: bool,
}
