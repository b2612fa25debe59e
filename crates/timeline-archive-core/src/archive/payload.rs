//! Decoding one payload slot under its presence policy.
use log::debug;
use prost::Message;
use snafu::prelude::*;

use crate::archive::dispatch::{PayloadSlot, Presence, SlotRule};
use crate::archive::entry::DecodedPayload;
use crate::archive::{
    ArchiveError, CommitMetadataSnafu, MissingPayloadSnafu, PayloadDecodeSnafu,
};
use crate::codec::{self, CommitMetadataSerDe, decode_commit_metadata, to_structured};
use crate::model::{CommitMetadataType, StructuredCommitMetadata};
use crate::timeline::ActionKind;

/// The instant being converted and the era serializer to read it with.
pub(crate) struct SlotDecoder<'a> {
    pub(crate) operation_id: &'a str,
    pub(crate) action: ActionKind,
    pub(crate) serde: &'a dyn CommitMetadataSerDe,
}

impl SlotDecoder<'_> {
    /// Decode `body` into `rule.slot`, or return `None` when the policy says
    /// the payload is absent.
    pub(crate) fn decode(
        &self,
        rule: SlotRule,
        body: Option<&[u8]>,
    ) -> Result<Option<DecodedPayload>, ArchiveError> {
        let body = body.unwrap_or_default();
        match rule.presence {
            Presence::Always => self.decode_payload(rule.slot, body).map(Some),
            Presence::NonEmpty | Presence::Probe if body.is_empty() => Ok(None),
            Presence::NonEmpty => self.decode_payload(rule.slot, body).map(Some),
            Presence::Required if body.is_empty() => MissingPayloadSnafu {
                operation_id: self.operation_id,
                action: self.action,
                slot: rule.slot,
            }
            .fail(),
            Presence::Required => self.decode_payload(rule.slot, body).map(Some),
            Presence::Probe => match self.decode_payload(rule.slot, body) {
                Ok(payload) => Ok(Some(payload)),
                Err(e) => {
                    debug!(
                        "{} {}: {} bytes are not a {}, leaving it absent: {e}",
                        self.action,
                        self.operation_id,
                        body.len(),
                        rule.slot
                    );
                    Ok(None)
                }
            },
        }
    }

    fn decode_payload(
        &self,
        slot: PayloadSlot,
        body: &[u8],
    ) -> Result<DecodedPayload, ArchiveError> {
        let payload = match slot {
            PayloadSlot::CleanMetadata => DecodedPayload::CleanMetadata(self.record(slot, body)?),
            PayloadSlot::CleanPlan => DecodedPayload::CleanPlan(self.record(slot, body)?),
            PayloadSlot::CommitMetadata => DecodedPayload::CommitMetadata(
                self.era_commit_metadata(body)?.into_commit_record(),
            ),
            PayloadSlot::ReplaceCommitMetadata => {
                // completed replace metadata is always read structured-first
                let metadata = decode_commit_metadata(body, CommitMetadataType::Replace)
                    .context(CommitMetadataSnafu {
                        operation_id: self.operation_id,
                        action: self.action,
                    })?;
                DecodedPayload::ReplaceCommitMetadata(
                    to_structured(&metadata).into_replace_record(),
                )
            }
            PayloadSlot::RequestedReplaceMetadata => {
                DecodedPayload::RequestedReplaceMetadata(self.record(slot, body)?)
            }
            PayloadSlot::InflightReplaceMetadata => DecodedPayload::InflightReplaceMetadata(
                self.era_commit_metadata(body)?.into_commit_record(),
            ),
            PayloadSlot::RollbackMetadata => {
                DecodedPayload::RollbackMetadata(self.record(slot, body)?)
            }
            PayloadSlot::SavepointMetadata => {
                DecodedPayload::SavepointMetadata(self.record(slot, body)?)
            }
            PayloadSlot::CompactionPlan => DecodedPayload::CompactionPlan(self.record(slot, body)?),
        };
        Ok(payload)
    }

    fn record<M: Message + Default>(
        &self,
        slot: PayloadSlot,
        body: &[u8],
    ) -> Result<M, ArchiveError> {
        codec::decode_structured_or_default(body).context(PayloadDecodeSnafu {
            operation_id: self.operation_id,
            action: self.action,
            slot,
        })
    }

    fn era_commit_metadata(
        &self,
        body: &[u8],
    ) -> Result<StructuredCommitMetadata, ArchiveError> {
        let metadata = self
            .serde
            .deserialize(body, CommitMetadataType::Commit)
            .context(CommitMetadataSnafu {
                operation_id: self.operation_id,
                action: self.action,
            })?;
        Ok(to_structured(&metadata))
    }
}
