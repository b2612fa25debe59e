//! Requested replace metadata and the clustering plan it may carry.
//!
//! Requested replace files are not standardized: insert-overwrite writes an
//! empty file, clustering writes a plan. Both shapes are legitimate.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One file slice fed into a clustering group.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliceInfo {
    /// Base file of the slice.
    #[prost(string, tag = "1")]
    pub data_file_path: String,
    /// Log files of the slice.
    #[prost(string, repeated, tag = "2")]
    pub delta_file_paths: Vec<String>,
    /// File group id.
    #[prost(string, tag = "3")]
    pub file_id: String,
    /// Partition path.
    #[prost(string, tag = "4")]
    pub partition_path: String,
    /// Bootstrap base file, if any.
    #[prost(string, optional, tag = "5")]
    pub bootstrap_file_path: Option<String>,
    /// Plan layout version.
    #[prost(int32, tag = "6")]
    pub version: i32,
}

/// A set of file slices rewritten together.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusteringGroup {
    /// Input slices.
    #[prost(message, repeated, tag = "1")]
    pub slices: Vec<SliceInfo>,
    /// Strategy-specific metrics.
    #[prost(btree_map = "string, double", tag = "2")]
    pub metrics: BTreeMap<String, f64>,
    /// Number of output file groups.
    #[prost(int32, tag = "3")]
    pub num_output_file_groups: i32,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "4")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Plan layout version.
    #[prost(int32, tag = "5")]
    pub version: i32,
}

/// Strategy used to execute a clustering plan.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusteringStrategy {
    /// Execution strategy implementation name.
    #[prost(string, tag = "1")]
    pub strategy_class_name: String,
    /// Strategy parameters.
    #[prost(btree_map = "string, string", tag = "2")]
    pub strategy_params: BTreeMap<String, String>,
    /// Plan layout version.
    #[prost(int32, tag = "3")]
    pub version: i32,
}

/// A clustering plan.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusteringPlan {
    /// Groups to rewrite.
    #[prost(message, repeated, tag = "1")]
    pub input_groups: Vec<ClusteringGroup>,
    /// Execution strategy.
    #[prost(message, optional, tag = "2")]
    pub strategy: Option<ClusteringStrategy>,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "3")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Plan layout version.
    #[prost(int32, tag = "4")]
    pub version: i32,
    /// Whether record-level metadata columns are preserved.
    #[prost(bool, tag = "5")]
    pub preserve_hoodie_metadata: bool,
}

/// The metadata recorded when a replace commit or clustering is requested.
///
/// This shares the plan blob of an archived replace with inflight commit
/// metadata. Its version and operation type sit on tags whose wire types
/// differ from [`crate::model::CommitMetadataRecord`]'s, so a requested
/// payload never decodes as commit metadata.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestedReplaceMetadata {
    /// Write operation name (`CLUSTER`, `INSERT_OVERWRITE`, ...).
    #[prost(string, tag = "3")]
    pub operation_type: String,
    /// Clustering plan, for clustering requests.
    #[prost(message, optional, tag = "4")]
    pub clustering_plan: Option<ClusteringPlan>,
    /// Free-form key/value metadata.
    #[prost(btree_map = "string, string", tag = "2")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Metadata layout version.
    #[prost(int32, tag = "1")]
    pub version: i32,
}
