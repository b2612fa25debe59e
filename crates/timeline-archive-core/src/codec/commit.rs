//! Commit metadata encode/decode across both encodings.
//!
//! All mapping between the domain models and the records happens in this
//! file, and the null partition key is handled in exactly one place
//! (`keyed_by_partition`). Dropping null-keyed entries is lossy and only
//! goes one way; it is not an error.
use std::collections::BTreeMap;

use log::{info, warn};
use snafu::{Backtrace, prelude::*};

use crate::codec::{self, CodecError};
use crate::model::{
    AnyCommitMetadata, CommitMetadata, CommitMetadataRecord, CommitMetadataType,
    ReplaceCommitMetadata, ReplaceCommitMetadataRecord, StructuredCommitMetadata, WriteStatList,
};

const PARTITION_TO_WRITE_STATS: &str = "partitionToWriteStats";
const PARTITION_TO_REPLACE_FILE_IDS: &str = "partitionToReplaceFileIds";

/// Errors raised while converting commit metadata.
#[derive(Debug, Snafu)]
pub enum CommitMetadataError {
    /// Neither the structured nor the text decoding accepted the payload.
    #[snafu(display(
        "Unable to read commit metadata for bytes length: {len} \
         (structured: {structured}; text: {source})"
    ))]
    Unreadable {
        /// Length of the payload that could not be read.
        len: usize,
        /// Failure of the structured decoding attempt.
        structured: Box<CodecError>,
        /// Failure of the text decoding attempt.
        source: CodecError,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// Legacy text-only payload could not be read.
    #[snafu(display("Unable to read text commit metadata for bytes length: {len}: {source}"))]
    UnreadableText {
        /// Length of the payload that could not be read.
        len: usize,
        /// Underlying text codec failure.
        #[snafu(backtrace)]
        source: CodecError,
    },

    /// Serializing a record to JSON text failed.
    #[snafu(display("Failed to convert commit metadata to text: {source}"))]
    TextEncode {
        /// Underlying text codec failure.
        #[snafu(backtrace)]
        source: CodecError,
    },
}

/// Decode commit metadata of type `target`.
///
/// - Empty input yields a default-valued instance.
/// - Otherwise the structured encoding is tried first; on any failure the
///   bytes are decoded as legacy JSON text.
/// - If both fail, the error carries the input length.
pub fn decode_commit_metadata(
    bytes: &[u8],
    target: CommitMetadataType,
) -> Result<AnyCommitMetadata, CommitMetadataError> {
    if bytes.is_empty() {
        return Ok(AnyCommitMetadata::default_for(target));
    }

    let structured_err = match decode_structured_record(bytes, target) {
        Ok(record) => return Ok(from_structured(record)),
        Err(e) => e,
    };

    warn!(
        "Structured commit metadata decode failed for {} bytes; trying text decoding: {structured_err}",
        bytes.len()
    );

    match decode_text_record(bytes, target) {
        Ok(record) => Ok(from_structured(record)),
        Err(source) => Err(CommitMetadataError::Unreadable {
            len: bytes.len(),
            structured: Box::new(structured_err),
            source,
            backtrace: Backtrace::capture(),
        }),
    }
}

/// Decode commit metadata written as JSON text only (tables before version 8).
///
/// Empty input yields a default-valued instance.
pub fn decode_text_commit_metadata(
    bytes: &[u8],
    target: CommitMetadataType,
) -> Result<AnyCommitMetadata, CommitMetadataError> {
    if bytes.is_empty() {
        return Ok(AnyCommitMetadata::default_for(target));
    }
    decode_text_record(bytes, target)
        .map(from_structured)
        .context(UnreadableTextSnafu { len: bytes.len() })
}

/// Encode commit metadata in the framed structured encoding.
pub fn encode_commit_metadata(metadata: &AnyCommitMetadata) -> Vec<u8> {
    match to_structured(metadata) {
        StructuredCommitMetadata::Commit(record) => codec::encode_structured(&record),
        StructuredCommitMetadata::Replace(record) => codec::encode_structured(&record),
    }
}

/// Serialize a structured payload as JSON text using the `declared` schema.
///
/// The schema follows `declared`, not the payload's own shape: a replace
/// payload declared as a plain commit loses its replaced file ids, and a
/// plain payload declared as replace gains an empty replaced-file map.
pub fn encode_structured_to_text(
    payload: &StructuredCommitMetadata,
    declared: CommitMetadataType,
) -> Result<Vec<u8>, CommitMetadataError> {
    let payload = payload.clone();
    let text = match declared {
        CommitMetadataType::Commit => codec::encode_text(&payload.into_commit_record()),
        CommitMetadataType::Replace => codec::encode_text(&payload.into_replace_record()),
    };
    text.context(TextEncodeSnafu)
}

/// Map domain commit metadata onto its record, dropping null partition keys.
pub fn to_structured(metadata: &AnyCommitMetadata) -> StructuredCommitMetadata {
    match metadata {
        AnyCommitMetadata::Commit(m) => StructuredCommitMetadata::Commit(commit_record(m)),
        AnyCommitMetadata::Replace(m) => {
            let base = commit_record(&m.base);
            StructuredCommitMetadata::Replace(ReplaceCommitMetadataRecord {
                partition_to_write_stats: base.partition_to_write_stats,
                extra_metadata: base.extra_metadata,
                compacted: base.compacted,
                operation_type: base.operation_type,
                partition_to_replace_file_ids: keyed_by_partition(
                    PARTITION_TO_REPLACE_FILE_IDS,
                    &m.partition_to_replace_file_ids,
                    |ids| ids.clone().into(),
                ),
            })
        }
    }
}

/// Map a record back onto the domain model.
pub fn from_structured(payload: StructuredCommitMetadata) -> AnyCommitMetadata {
    match payload {
        StructuredCommitMetadata::Commit(record) => {
            AnyCommitMetadata::Commit(commit_from_record(record))
        }
        StructuredCommitMetadata::Replace(record) => {
            let partition_to_replace_file_ids = record
                .partition_to_replace_file_ids
                .into_iter()
                .map(|(partition, ids)| (Some(partition), ids.file_ids))
                .collect();
            let base = commit_from_record(CommitMetadataRecord {
                partition_to_write_stats: record.partition_to_write_stats,
                extra_metadata: record.extra_metadata,
                compacted: record.compacted,
                operation_type: record.operation_type,
            });
            AnyCommitMetadata::Replace(ReplaceCommitMetadata {
                base,
                partition_to_replace_file_ids,
            })
        }
    }
}

fn decode_structured_record(
    bytes: &[u8],
    target: CommitMetadataType,
) -> Result<StructuredCommitMetadata, CodecError> {
    match target {
        CommitMetadataType::Commit => codec::decode_structured::<CommitMetadataRecord>(bytes)
            .map(StructuredCommitMetadata::Commit),
        CommitMetadataType::Replace => {
            codec::decode_structured::<ReplaceCommitMetadataRecord>(bytes)
                .map(StructuredCommitMetadata::Replace)
        }
    }
}

fn decode_text_record(
    bytes: &[u8],
    target: CommitMetadataType,
) -> Result<StructuredCommitMetadata, CodecError> {
    match target {
        CommitMetadataType::Commit => {
            codec::decode_text::<CommitMetadataRecord>(bytes).map(StructuredCommitMetadata::Commit)
        }
        CommitMetadataType::Replace => codec::decode_text::<ReplaceCommitMetadataRecord>(bytes)
            .map(StructuredCommitMetadata::Replace),
    }
}

fn commit_record(metadata: &CommitMetadata) -> CommitMetadataRecord {
    CommitMetadataRecord {
        partition_to_write_stats: keyed_by_partition(
            PARTITION_TO_WRITE_STATS,
            &metadata.partition_to_write_stats,
            |stats| WriteStatList::from(stats.clone()),
        ),
        extra_metadata: metadata.extra_metadata.clone(),
        compacted: metadata.compacted,
        operation_type: metadata.operation_type.clone(),
    }
}

fn commit_from_record(record: CommitMetadataRecord) -> CommitMetadata {
    CommitMetadata {
        partition_to_write_stats: record
            .partition_to_write_stats
            .into_iter()
            .map(|(partition, list)| (Some(partition), list.stats))
            .collect(),
        extra_metadata: record.extra_metadata,
        compacted: record.compacted,
        operation_type: record.operation_type,
    }
}

/// Re-key a partition map for the record layer, dropping the null partition.
fn keyed_by_partition<V, R>(
    field: &str,
    map: &BTreeMap<Option<String>, V>,
    convert: impl Fn(&V) -> R,
) -> BTreeMap<String, R> {
    if map.contains_key(&None) {
        info!(
            "Dropping the null partition entry of {field}, keeping {} of {} entries",
            map.len() - 1,
            map.len()
        );
    }
    map.iter()
        .filter_map(|(partition, value)| {
            partition
                .as_ref()
                .map(|partition| (partition.clone(), convert(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{WriteOperationType, WriteStat};

    fn sample_commit() -> CommitMetadata {
        let mut meta = CommitMetadata::new(false);
        meta.set_operation_type(WriteOperationType::Upsert);
        meta.add_metadata("schema", r#"{"type":"record"}"#);
        meta.add_write_stat(
            Some("2024/01/01"),
            WriteStat {
                num_writes: 100,
                num_update_writes: 40,
                ..WriteStat::for_file("2024/01/01", "fg-1", "2024/01/01/fg-1.parquet")
            },
        );
        meta
    }

    fn sample_replace() -> ReplaceCommitMetadata {
        let mut meta = ReplaceCommitMetadata {
            base: sample_commit(),
            ..Default::default()
        };
        meta.base.set_operation_type(WriteOperationType::InsertOverwrite);
        meta.add_replace_file_id(Some("2024/01/01"), "fg-0");
        meta
    }

    #[test]
    fn empty_bytes_decode_to_defaults() {
        let decoded = decode_commit_metadata(&[], CommitMetadataType::Commit).expect("decode");
        assert_eq!(decoded, AnyCommitMetadata::Commit(CommitMetadata::default()));

        let decoded = decode_commit_metadata(&[], CommitMetadataType::Replace).expect("decode");
        assert_eq!(
            decoded,
            AnyCommitMetadata::Replace(ReplaceCommitMetadata::default())
        );
    }

    #[test]
    fn structured_encode_then_decode_is_identity() {
        let original = AnyCommitMetadata::Commit(sample_commit());
        let bytes = encode_commit_metadata(&original);

        let decoded = decode_commit_metadata(&bytes, CommitMetadataType::Commit).expect("decode");

        assert_eq!(decoded, original);
    }

    #[test]
    fn replace_encode_then_decode_is_identity() {
        let original = AnyCommitMetadata::Replace(sample_replace());
        let bytes = encode_commit_metadata(&original);

        let decoded = decode_commit_metadata(&bytes, CommitMetadataType::Replace).expect("decode");

        assert_eq!(decoded, original);
    }

    #[test]
    fn structured_decode_then_encode_is_identity() {
        let records = [
            CommitMetadataRecord {
                compacted: true,
                ..Default::default()
            },
            CommitMetadataRecord {
                operation_type: Some("BUCKET_RESCALE".to_string()),
                ..Default::default()
            },
            CommitMetadataRecord {
                operation_type: Some("insert".to_string()),
                ..Default::default()
            },
        ];

        for record in records {
            let bytes = codec::encode_structured(&record);

            let decoded =
                decode_commit_metadata(&bytes, CommitMetadataType::Commit).expect("decode");

            assert_eq!(encode_commit_metadata(&decoded), bytes, "{record:?}");
        }
    }

    #[test]
    fn replace_decode_then_encode_keeps_missing_operation_type() {
        let mut record = ReplaceCommitMetadataRecord::default();
        record
            .partition_to_replace_file_ids
            .insert("p1".to_string(), vec!["fg-0".to_string()].into());
        let bytes = codec::encode_structured(&record);

        let decoded = decode_commit_metadata(&bytes, CommitMetadataType::Replace).expect("decode");

        assert_eq!(decoded.base().operation_type, None);
        assert_eq!(encode_commit_metadata(&decoded), bytes);
    }

    #[test]
    fn null_partition_entries_are_dropped_and_nothing_else() {
        let mut with_null = sample_replace();
        with_null
            .base
            .add_write_stat(None, WriteStat::for_file("", "fg-9", "fg-9.parquet"));
        with_null.add_replace_file_id(None, "fg-8");

        let bytes = encode_commit_metadata(&AnyCommitMetadata::Replace(with_null));
        let decoded = decode_commit_metadata(&bytes, CommitMetadataType::Replace).expect("decode");

        assert_eq!(decoded, AnyCommitMetadata::Replace(sample_replace()));
    }

    #[test]
    fn legacy_text_decodes_through_fallback() {
        let json = br#"{
            "partitionToWriteStats": {
                "2024/01/01": [ { "fileId": "fg-1", "path": "2024/01/01/fg-1.parquet", "numWrites": 7 } ]
            },
            "compacted": false,
            "extraMetadata": { "schema": "{}" },
            "operationType": "INSERT",
            "writePartitionPaths": [ "2024/01/01" ]
        }"#;

        let decoded = decode_commit_metadata(json, CommitMetadataType::Commit).expect("fallback");

        let base = decoded.base();
        assert_eq!(base.write_operation_type(), WriteOperationType::Insert);
        assert_eq!(base.total_records_written(), 7);
        assert_eq!(base.metadata("schema"), Some("{}"));
    }

    #[test]
    fn garbage_fails_both_paths_with_length() {
        let garbage = b"\x00\x01not metadata";

        let err = decode_commit_metadata(garbage, CommitMetadataType::Commit).expect_err("garbage");

        assert!(matches!(err, CommitMetadataError::Unreadable { len, .. } if len == garbage.len()));
        assert!(err.to_string().contains("bytes length: 14"));
    }

    #[test]
    fn text_rendering_follows_declared_type() {
        let payload = to_structured(&AnyCommitMetadata::Replace(sample_replace()));

        let as_commit =
            encode_structured_to_text(&payload, CommitMetadataType::Commit).expect("text");
        let as_replace =
            encode_structured_to_text(&payload, CommitMetadataType::Replace).expect("text");

        let commit_json: serde_json::Value = serde_json::from_slice(&as_commit).expect("json");
        let replace_json: serde_json::Value = serde_json::from_slice(&as_replace).expect("json");
        assert!(commit_json.get("partitionToReplaceFileIds").is_none());
        assert_eq!(replace_json["partitionToReplaceFileIds"]["2024/01/01"][0], "fg-0");
        assert_eq!(commit_json["partitionToWriteStats"]["2024/01/01"][0]["numWrites"], 100);
    }

    #[test]
    fn text_rendering_reads_back_as_the_same_metadata() {
        let original = AnyCommitMetadata::Replace(sample_replace());
        let text = encode_structured_to_text(&to_structured(&original), CommitMetadataType::Replace)
            .expect("text");

        let decoded = decode_commit_metadata(&text, CommitMetadataType::Replace).expect("decode");

        assert_eq!(decoded, original);
    }

    #[test]
    fn text_only_decoder_rejects_structured_bytes() {
        let bytes = encode_commit_metadata(&AnyCommitMetadata::Commit(sample_commit()));

        let err = decode_text_commit_metadata(&bytes, CommitMetadataType::Commit)
            .expect_err("structured bytes are not JSON");

        assert!(matches!(err, CommitMetadataError::UnreadableText { .. }));
    }
}
