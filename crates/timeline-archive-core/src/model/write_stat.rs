//! Per-file write statistics recorded by commits.
use serde::{Deserialize, Serialize};

/// Statistics for one file written (or appended to) by an operation.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WriteStat {
    /// File group id.
    #[prost(string, optional, tag = "1")]
    pub file_id: Option<String>,
    /// Path of the written file, relative to the table base path.
    #[prost(string, optional, tag = "2")]
    pub path: Option<String>,
    /// Instant time of the previous version of this file group.
    #[prost(string, optional, tag = "3")]
    pub prev_commit: Option<String>,
    /// Total records written.
    #[prost(int64, tag = "4")]
    pub num_writes: i64,
    /// Records deleted.
    #[prost(int64, tag = "5")]
    pub num_deletes: i64,
    /// Records updated in place.
    #[prost(int64, tag = "6")]
    pub num_update_writes: i64,
    /// Records newly inserted.
    #[prost(int64, tag = "7")]
    pub num_inserts: i64,
    /// Bytes written.
    #[prost(int64, tag = "8")]
    pub total_write_bytes: i64,
    /// Records that failed to write.
    #[prost(int64, tag = "9")]
    pub total_write_errors: i64,
    /// Temporary path used while writing, if any.
    #[prost(string, optional, tag = "10")]
    pub temp_path: Option<String>,
    /// Partition the file belongs to.
    #[prost(string, optional, tag = "11")]
    pub partition_path: Option<String>,
    /// Log records read during compaction.
    #[prost(int64, tag = "12")]
    pub total_log_records: i64,
    /// Log files compacted.
    #[prost(int64, tag = "13")]
    pub total_log_files_compacted: i64,
    /// Size of the compacted log files.
    #[prost(int64, tag = "14")]
    pub total_log_size_compacted: i64,
    /// Records updated by compaction.
    #[prost(int64, tag = "15")]
    pub total_updated_records_compacted: i64,
    /// Log blocks read.
    #[prost(int64, tag = "16")]
    pub total_log_blocks: i64,
    /// Corrupt log blocks encountered.
    #[prost(int64, tag = "17")]
    pub total_corrupt_log_block: i64,
    /// Rollback blocks encountered.
    #[prost(int64, tag = "18")]
    pub total_rollback_blocks: i64,
    /// Final file size in bytes.
    #[prost(int64, tag = "19")]
    pub file_size_in_bytes: i64,
    /// Smallest event time seen in the written records.
    #[prost(int64, optional, tag = "20")]
    pub min_event_time: Option<i64>,
    /// Largest event time seen in the written records.
    #[prost(int64, optional, tag = "21")]
    pub max_event_time: Option<i64>,
}

impl WriteStat {
    /// Write stat for `file_id` at `path` within `partition`.
    pub fn for_file(partition: &str, file_id: &str, path: &str) -> Self {
        Self {
            file_id: Some(file_id.to_string()),
            path: Some(path.to_string()),
            partition_path: Some(partition.to_string()),
            ..Default::default()
        }
    }
}

/// The write stats of one partition.
///
/// Serialized as a bare JSON array so maps of these keep the legacy
/// `{"partition": [ ... ]}` shape.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteStatList {
    /// Stats in write order.
    #[prost(message, repeated, tag = "1")]
    pub stats: Vec<WriteStat>,
}

impl From<Vec<WriteStat>> for WriteStatList {
    fn from(stats: Vec<WriteStat>) -> Self {
        Self { stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_json_with_nulls_and_unknown_fields_decodes() {
        let json = r#"{
            "fileId": "fg-1",
            "path": "2024/01/01/fg-1_0-1-1_001.parquet",
            "prevCommit": "null",
            "numWrites": 10,
            "numInserts": 10,
            "tempPath": null,
            "partitionPath": "2024/01/01",
            "runtimeStats": { "totalScanTime": 0 },
            "logVersion": 0
        }"#;

        let stat: WriteStat = serde_json::from_str(json).expect("deserialize");

        assert_eq!(stat.file_id.as_deref(), Some("fg-1"));
        assert_eq!(stat.num_writes, 10);
        assert_eq!(stat.temp_path, None);
        assert_eq!(stat.num_deletes, 0);
    }

    #[test]
    fn stat_list_serializes_as_array() {
        let list = WriteStatList::from(vec![WriteStat::for_file("p1", "f1", "p1/f1.parquet")]);
        let json = serde_json::to_value(&list).expect("serialize");

        assert!(json.is_array());
        assert_eq!(json[0]["fileId"], "f1");
    }
}
