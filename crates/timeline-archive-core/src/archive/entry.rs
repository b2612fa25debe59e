//! The unified archival record.
use serde::{Deserialize, Serialize};

use crate::archive::dispatch::{PayloadSlot, rule_for_type};
use crate::model::{
    CleanMetadata, CleanerPlan, CommitMetadataRecord, CompactionPlan, ReplaceCommitMetadataRecord,
    RequestedReplaceMetadata, RollbackMetadata, SavepointMetadata,
};
use crate::timeline::{ActionType, InstantState};

/// One archived instant: header fields plus the decoded payload(s).
///
/// Payload fields are absent unless the dispatch rules for
/// [`ArchivedMetaEntry::action_type`] populated them. A record with every
/// payload absent is valid; it stands for an empty completed instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchivedMetaEntry {
    /// Operation id (requested time) of the instant.
    pub operation_id: String,
    /// Lifecycle state name of the archived instant.
    pub action_state: InstantState,
    /// Completion time, when the instant completed.
    pub state_transition_time: Option<String>,
    /// Archive tag of the instant's action.
    pub action_type: ActionType,

    /// Completed clean metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_metadata: Option<CleanMetadata>,
    /// Pending clean plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_plan: Option<CleanerPlan>,
    /// Commit or delta commit metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_metadata: Option<CommitMetadataRecord>,
    /// Completed replace commit metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_commit_metadata: Option<ReplaceCommitMetadataRecord>,
    /// Requested replace metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_replace_metadata: Option<RequestedReplaceMetadata>,
    /// Inflight replace body, as commit metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflight_replace_metadata: Option<CommitMetadataRecord>,
    /// Completed rollback metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_metadata: Option<RollbackMetadata>,
    /// Completed savepoint metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savepoint_metadata: Option<SavepointMetadata>,
    /// Compaction or log compaction plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compaction_plan: Option<CompactionPlan>,
}

/// A decoded payload, tagged with the slot it belongs in.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedPayload {
    /// See [`PayloadSlot::CleanMetadata`].
    CleanMetadata(CleanMetadata),
    /// See [`PayloadSlot::CleanPlan`].
    CleanPlan(CleanerPlan),
    /// See [`PayloadSlot::CommitMetadata`].
    CommitMetadata(CommitMetadataRecord),
    /// See [`PayloadSlot::ReplaceCommitMetadata`].
    ReplaceCommitMetadata(ReplaceCommitMetadataRecord),
    /// See [`PayloadSlot::RequestedReplaceMetadata`].
    RequestedReplaceMetadata(RequestedReplaceMetadata),
    /// See [`PayloadSlot::InflightReplaceMetadata`].
    InflightReplaceMetadata(CommitMetadataRecord),
    /// See [`PayloadSlot::RollbackMetadata`].
    RollbackMetadata(RollbackMetadata),
    /// See [`PayloadSlot::SavepointMetadata`].
    SavepointMetadata(SavepointMetadata),
    /// See [`PayloadSlot::CompactionPlan`].
    CompactionPlan(CompactionPlan),
}

impl DecodedPayload {
    /// The record field this payload fills.
    pub fn slot(&self) -> PayloadSlot {
        match self {
            DecodedPayload::CleanMetadata(_) => PayloadSlot::CleanMetadata,
            DecodedPayload::CleanPlan(_) => PayloadSlot::CleanPlan,
            DecodedPayload::CommitMetadata(_) => PayloadSlot::CommitMetadata,
            DecodedPayload::ReplaceCommitMetadata(_) => PayloadSlot::ReplaceCommitMetadata,
            DecodedPayload::RequestedReplaceMetadata(_) => PayloadSlot::RequestedReplaceMetadata,
            DecodedPayload::InflightReplaceMetadata(_) => PayloadSlot::InflightReplaceMetadata,
            DecodedPayload::RollbackMetadata(_) => PayloadSlot::RollbackMetadata,
            DecodedPayload::SavepointMetadata(_) => PayloadSlot::SavepointMetadata,
            DecodedPayload::CompactionPlan(_) => PayloadSlot::CompactionPlan,
        }
    }
}

impl ArchivedMetaEntry {
    /// A record carrying only header fields.
    pub fn tag_only(
        operation_id: impl Into<String>,
        action_state: InstantState,
        state_transition_time: Option<String>,
        action_type: ActionType,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            action_state,
            state_transition_time,
            action_type,
            clean_metadata: None,
            clean_plan: None,
            commit_metadata: None,
            replace_commit_metadata: None,
            requested_replace_metadata: None,
            inflight_replace_metadata: None,
            rollback_metadata: None,
            savepoint_metadata: None,
            compaction_plan: None,
        }
    }

    /// Store `payload` in its slot, replacing any previous value.
    pub fn insert(&mut self, payload: DecodedPayload) {
        match payload {
            DecodedPayload::CleanMetadata(p) => self.clean_metadata = Some(p),
            DecodedPayload::CleanPlan(p) => self.clean_plan = Some(p),
            DecodedPayload::CommitMetadata(p) => self.commit_metadata = Some(p),
            DecodedPayload::ReplaceCommitMetadata(p) => self.replace_commit_metadata = Some(p),
            DecodedPayload::RequestedReplaceMetadata(p) => {
                self.requested_replace_metadata = Some(p)
            }
            DecodedPayload::InflightReplaceMetadata(p) => self.inflight_replace_metadata = Some(p),
            DecodedPayload::RollbackMetadata(p) => self.rollback_metadata = Some(p),
            DecodedPayload::SavepointMetadata(p) => self.savepoint_metadata = Some(p),
            DecodedPayload::CompactionPlan(p) => self.compaction_plan = Some(p),
        }
    }

    /// Returns true if `slot` holds a payload.
    pub fn has(&self, slot: PayloadSlot) -> bool {
        match slot {
            PayloadSlot::CleanMetadata => self.clean_metadata.is_some(),
            PayloadSlot::CleanPlan => self.clean_plan.is_some(),
            PayloadSlot::CommitMetadata => self.commit_metadata.is_some(),
            PayloadSlot::ReplaceCommitMetadata => self.replace_commit_metadata.is_some(),
            PayloadSlot::RequestedReplaceMetadata => self.requested_replace_metadata.is_some(),
            PayloadSlot::InflightReplaceMetadata => self.inflight_replace_metadata.is_some(),
            PayloadSlot::RollbackMetadata => self.rollback_metadata.is_some(),
            PayloadSlot::SavepointMetadata => self.savepoint_metadata.is_some(),
            PayloadSlot::CompactionPlan => self.compaction_plan.is_some(),
        }
    }

    /// Populated slots, in record field order.
    pub fn populated_slots(&self) -> Vec<PayloadSlot> {
        PayloadSlot::ALL
            .into_iter()
            .filter(|slot| self.has(*slot))
            .collect()
    }

    /// Returns true if every populated slot is one the record's tag allows.
    pub fn is_consistent(&self) -> bool {
        let rule = rule_for_type(self.action_type);
        self.populated_slots().into_iter().all(|slot| rule.allows(slot))
    }
}
