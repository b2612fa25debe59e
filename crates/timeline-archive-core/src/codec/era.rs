//! Commit metadata serializers per table format era.
//!
//! Tables before version 8 store commit metadata as JSON text only. From
//! version 8 on, writers emit the structured encoding and readers fall back to
//! text for instants written before the upgrade.
use std::fmt;

use crate::codec::commit::{
    self, CommitMetadataError, decode_commit_metadata, decode_text_commit_metadata,
    encode_commit_metadata,
};
use crate::model::{AnyCommitMetadata, CommitMetadataType};
use crate::timeline::TableVersion;

/// Reads and writes commit metadata the way one table format era does.
pub trait CommitMetadataSerDe: Send + Sync + fmt::Debug {
    /// Decode `bytes` as commit metadata of type `target`.
    fn deserialize(
        &self,
        bytes: &[u8],
        target: CommitMetadataType,
    ) -> Result<AnyCommitMetadata, CommitMetadataError>;

    /// Encode `metadata` in this era's on-disk form.
    fn serialize(&self, metadata: &AnyCommitMetadata) -> Result<Vec<u8>, CommitMetadataError>;
}

/// Text-only serializer for tables before version 8.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommitMetadataSerDeV1;

impl CommitMetadataSerDe for CommitMetadataSerDeV1 {
    fn deserialize(
        &self,
        bytes: &[u8],
        target: CommitMetadataType,
    ) -> Result<AnyCommitMetadata, CommitMetadataError> {
        decode_text_commit_metadata(bytes, target)
    }

    fn serialize(&self, metadata: &AnyCommitMetadata) -> Result<Vec<u8>, CommitMetadataError> {
        commit::encode_structured_to_text(
            &commit::to_structured(metadata),
            metadata.metadata_type(),
        )
    }
}

/// Structured serializer for tables at version 8 or later.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommitMetadataSerDeV2;

impl CommitMetadataSerDe for CommitMetadataSerDeV2 {
    fn deserialize(
        &self,
        bytes: &[u8],
        target: CommitMetadataType,
    ) -> Result<AnyCommitMetadata, CommitMetadataError> {
        decode_commit_metadata(bytes, target)
    }

    fn serialize(&self, metadata: &AnyCommitMetadata) -> Result<Vec<u8>, CommitMetadataError> {
        Ok(encode_commit_metadata(metadata))
    }
}

/// The serializer for tables at `version`.
pub fn serde_for(version: TableVersion) -> &'static dyn CommitMetadataSerDe {
    if version.at_least(TableVersion::EIGHT) {
        &CommitMetadataSerDeV2
    } else {
        &CommitMetadataSerDeV1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::STRUCTURED_MAGIC;
    use crate::model::{CommitMetadata, WriteOperationType, WriteStat};

    fn sample() -> AnyCommitMetadata {
        let mut meta = CommitMetadata::new(true);
        meta.set_operation_type(WriteOperationType::Compact);
        meta.add_write_stat(Some("p1"), WriteStat::for_file("p1", "fg-1", "p1/fg-1.parquet"));
        meta.into()
    }

    #[test]
    fn version_selects_serializer() {
        let v1 = format!("{:?}", serde_for(TableVersion::SIX));
        let v2 = format!("{:?}", serde_for(TableVersion::EIGHT));

        assert_eq!(v1, "CommitMetadataSerDeV1");
        assert_eq!(v2, "CommitMetadataSerDeV2");
        assert_eq!(format!("{:?}", serde_for(TableVersion(9))), "CommitMetadataSerDeV2");
    }

    #[test]
    fn v1_writes_text_and_reads_it_back() {
        let serde = serde_for(TableVersion::SEVEN);

        let bytes = serde.serialize(&sample()).expect("serialize");
        assert_eq!(bytes.first(), Some(&b'{'));

        let decoded = serde
            .deserialize(&bytes, CommitMetadataType::Commit)
            .expect("deserialize");
        assert_eq!(decoded, sample());
    }

    #[test]
    fn v2_writes_structured_and_reads_v1_text() {
        let v1_bytes = CommitMetadataSerDeV1.serialize(&sample()).expect("text");
        let v2_bytes = CommitMetadataSerDeV2.serialize(&sample()).expect("structured");

        assert!(v2_bytes.starts_with(&STRUCTURED_MAGIC));
        for bytes in [&v1_bytes, &v2_bytes] {
            let decoded = CommitMetadataSerDeV2
                .deserialize(bytes, CommitMetadataType::Commit)
                .expect("deserialize");
            assert_eq!(decoded, sample());
        }
    }
}
