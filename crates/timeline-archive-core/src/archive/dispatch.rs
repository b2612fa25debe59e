//! The action dispatch table shared by every conversion entry point.
//!
//! One [`ActionRule`] per [`ActionKind`] names the archive tag, the payload
//! slot decoded for each live state, the slots decoded from an archived
//! record's metadata and plan blobs, and where the LSM encoder finds the
//! plan when the kind is the pending action. The live builder, the archive
//! builder and the LSM encoder all consult [`rule_for`], so they cannot
//! disagree about which payload belongs to which action.
//!
//! | kind            | requested          | inflight            | completed            |
//! |-----------------|--------------------|---------------------|----------------------|
//! | clean           | clean plan         | clean plan          | clean metadata       |
//! | commit / delta  | -                  | -                   | commit metadata      |
//! | replace / clust | requested replace? | inflight replace?   | replace metadata     |
//! | rollback        | -                  | -                   | rollback metadata?   |
//! | savepoint       | -                  | -                   | savepoint metadata!  |
//! | (log)compaction | compaction plan    | -                   | -                    |
//!
//! `?` marks slots that are absent on an empty body, `!` a required one.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timeline::{ActionKind, ActionType, InstantState};

/// One payload field of an archived record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadSlot {
    /// Completed clean metadata.
    CleanMetadata,
    /// Pending clean plan.
    CleanPlan,
    /// Commit or delta commit metadata.
    CommitMetadata,
    /// Completed replace commit metadata.
    ReplaceCommitMetadata,
    /// Requested replace metadata.
    RequestedReplaceMetadata,
    /// Inflight replace body, read as commit metadata.
    InflightReplaceMetadata,
    /// Completed rollback metadata.
    RollbackMetadata,
    /// Completed savepoint metadata.
    SavepointMetadata,
    /// Compaction or log compaction plan.
    CompactionPlan,
}

impl PayloadSlot {
    /// Every slot, in record field order.
    pub const ALL: [PayloadSlot; 9] = [
        PayloadSlot::CleanMetadata,
        PayloadSlot::CleanPlan,
        PayloadSlot::CommitMetadata,
        PayloadSlot::ReplaceCommitMetadata,
        PayloadSlot::RequestedReplaceMetadata,
        PayloadSlot::InflightReplaceMetadata,
        PayloadSlot::RollbackMetadata,
        PayloadSlot::SavepointMetadata,
        PayloadSlot::CompactionPlan,
    ];

    /// Field name of the slot in an archived record.
    pub const fn field_name(self) -> &'static str {
        match self {
            PayloadSlot::CleanMetadata => "clean-metadata",
            PayloadSlot::CleanPlan => "clean-plan",
            PayloadSlot::CommitMetadata => "commit-metadata",
            PayloadSlot::ReplaceCommitMetadata => "replace-commit-metadata",
            PayloadSlot::RequestedReplaceMetadata => "requested-replace-metadata",
            PayloadSlot::InflightReplaceMetadata => "inflight-replace-metadata",
            PayloadSlot::RollbackMetadata => "rollback-metadata",
            PayloadSlot::SavepointMetadata => "savepoint-metadata",
            PayloadSlot::CompactionPlan => "compaction-plan",
        }
    }
}

impl fmt::Display for PayloadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// How a missing or zero-length body is treated for a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Always decode; an empty or missing body decodes to default values.
    Always,
    /// Absent when the body is missing or empty.
    NonEmpty,
    /// A missing or empty body is an error.
    Required,
    /// Absent when the body is missing, empty, or does not decode.
    Probe,
}

/// A slot together with its presence policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotRule {
    /// The payload field this rule fills.
    pub slot: PayloadSlot,
    /// Treatment of empty bodies.
    pub presence: Presence,
}

impl SlotRule {
    const fn new(slot: PayloadSlot, presence: Presence) -> Option<Self> {
        Some(Self { slot, presence })
    }
}

/// Which per-state blob the LSM encoder stores as the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanSource {
    /// The requested clean plan.
    CleanPlan,
    /// The inflight commit metadata, else the requested replace metadata.
    ReplaceMetadata,
    /// The requested compaction plan.
    CompactionPlan,
    /// The requested log compaction plan.
    LogCompactionPlan,
}

/// Conversion rules for one action kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRule {
    /// The action kind the rule applies to.
    pub kind: ActionKind,
    /// Tag written into the archived record.
    pub action_type: ActionType,
    /// Slot decoded from a requested instant.
    pub requested: Option<SlotRule>,
    /// Slot decoded from an inflight instant.
    pub inflight: Option<SlotRule>,
    /// Slot decoded from a completed instant.
    pub completed: Option<SlotRule>,
    /// Slot decoded from an archived record's metadata blob.
    pub archived_metadata: Option<SlotRule>,
    /// Slot decoded from an archived record's plan blob.
    pub archived_plan: Option<SlotRule>,
    /// Plan stored by the LSM encoder when this kind is the pending action.
    pub pending_plan: Option<PlanSource>,
}

impl ActionRule {
    /// The slot decoded from a live instant in `state`.
    pub fn live(&self, state: InstantState) -> Option<SlotRule> {
        match state {
            InstantState::Requested => self.requested,
            InstantState::Inflight => self.inflight,
            InstantState::Completed => self.completed,
        }
    }

    /// Every slot this kind may populate, on either read path.
    pub fn allowed_slots(&self) -> impl Iterator<Item = PayloadSlot> + '_ {
        [
            self.requested,
            self.inflight,
            self.completed,
            self.archived_metadata,
            self.archived_plan,
        ]
        .into_iter()
        .flatten()
        .map(|rule| rule.slot)
    }

    /// Returns true if a record tagged with this kind may carry `slot`.
    pub fn allows(&self, slot: PayloadSlot) -> bool {
        self.allowed_slots().any(|allowed| allowed == slot)
    }
}

const fn commit_family(kind: ActionKind, action_type: ActionType) -> ActionRule {
    ActionRule {
        kind,
        action_type,
        requested: None,
        inflight: None,
        completed: SlotRule::new(PayloadSlot::CommitMetadata, Presence::Always),
        archived_metadata: SlotRule::new(PayloadSlot::CommitMetadata, Presence::NonEmpty),
        // a commit that completed a (log) compaction keeps its plan
        archived_plan: SlotRule::new(PayloadSlot::CompactionPlan, Presence::NonEmpty),
        pending_plan: None,
    }
}

const fn replace_family(kind: ActionKind, action_type: ActionType) -> ActionRule {
    ActionRule {
        kind,
        action_type,
        requested: SlotRule::new(PayloadSlot::RequestedReplaceMetadata, Presence::NonEmpty),
        inflight: SlotRule::new(PayloadSlot::InflightReplaceMetadata, Presence::NonEmpty),
        completed: SlotRule::new(PayloadSlot::ReplaceCommitMetadata, Presence::Always),
        archived_metadata: SlotRule::new(PayloadSlot::ReplaceCommitMetadata, Presence::NonEmpty),
        // the plan blob may hold requested replace metadata instead
        archived_plan: SlotRule::new(PayloadSlot::InflightReplaceMetadata, Presence::Probe),
        pending_plan: Some(PlanSource::ReplaceMetadata),
    }
}

const fn compaction_family(
    kind: ActionKind,
    action_type: ActionType,
    plan: PlanSource,
) -> ActionRule {
    ActionRule {
        kind,
        action_type,
        requested: SlotRule::new(PayloadSlot::CompactionPlan, Presence::Always),
        inflight: None,
        completed: None,
        archived_metadata: None,
        archived_plan: SlotRule::new(PayloadSlot::CompactionPlan, Presence::NonEmpty),
        pending_plan: Some(plan),
    }
}

static CLEAN: ActionRule = ActionRule {
    kind: ActionKind::Clean,
    action_type: ActionType::Clean,
    requested: SlotRule::new(PayloadSlot::CleanPlan, Presence::Always),
    inflight: SlotRule::new(PayloadSlot::CleanPlan, Presence::Always),
    completed: SlotRule::new(PayloadSlot::CleanMetadata, Presence::Always),
    archived_metadata: SlotRule::new(PayloadSlot::CleanMetadata, Presence::NonEmpty),
    archived_plan: SlotRule::new(PayloadSlot::CleanPlan, Presence::NonEmpty),
    pending_plan: Some(PlanSource::CleanPlan),
};

static COMMIT: ActionRule = commit_family(ActionKind::Commit, ActionType::Commit);

static DELTA_COMMIT: ActionRule = commit_family(ActionKind::DeltaCommit, ActionType::DeltaCommit);

static REPLACE_COMMIT: ActionRule =
    replace_family(ActionKind::ReplaceCommit, ActionType::ReplaceCommit);

static CLUSTERING: ActionRule = replace_family(ActionKind::Clustering, ActionType::Clustering);

static ROLLBACK: ActionRule = ActionRule {
    kind: ActionKind::Rollback,
    action_type: ActionType::Rollback,
    requested: None,
    inflight: None,
    completed: SlotRule::new(PayloadSlot::RollbackMetadata, Presence::NonEmpty),
    archived_metadata: SlotRule::new(PayloadSlot::RollbackMetadata, Presence::NonEmpty),
    archived_plan: None,
    pending_plan: None,
};

static SAVEPOINT: ActionRule = ActionRule {
    kind: ActionKind::Savepoint,
    action_type: ActionType::Savepoint,
    requested: None,
    inflight: None,
    completed: SlotRule::new(PayloadSlot::SavepointMetadata, Presence::Required),
    archived_metadata: SlotRule::new(PayloadSlot::SavepointMetadata, Presence::Required),
    archived_plan: None,
    pending_plan: None,
};

static COMPACTION: ActionRule = compaction_family(
    ActionKind::Compaction,
    ActionType::Compaction,
    PlanSource::CompactionPlan,
);

static LOG_COMPACTION: ActionRule = compaction_family(
    ActionKind::LogCompaction,
    ActionType::LogCompaction,
    PlanSource::LogCompactionPlan,
);

/// The conversion rules for `kind`.
pub fn rule_for(kind: ActionKind) -> &'static ActionRule {
    match kind {
        ActionKind::Clean => &CLEAN,
        ActionKind::Commit => &COMMIT,
        ActionKind::DeltaCommit => &DELTA_COMMIT,
        ActionKind::ReplaceCommit => &REPLACE_COMMIT,
        ActionKind::Clustering => &CLUSTERING,
        ActionKind::Rollback => &ROLLBACK,
        ActionKind::Savepoint => &SAVEPOINT,
        ActionKind::Compaction => &COMPACTION,
        ActionKind::LogCompaction => &LOG_COMPACTION,
    }
}

/// The conversion rules of the kind archived under `action_type`.
pub fn rule_for_type(action_type: ActionType) -> &'static ActionRule {
    let kind = match action_type {
        ActionType::Clean => ActionKind::Clean,
        ActionType::Commit => ActionKind::Commit,
        ActionType::DeltaCommit => ActionKind::DeltaCommit,
        ActionType::ReplaceCommit => ActionKind::ReplaceCommit,
        ActionType::Clustering => ActionKind::Clustering,
        ActionType::Rollback => ActionKind::Rollback,
        ActionType::Savepoint => ActionKind::Savepoint,
        ActionType::Compaction => ActionKind::Compaction,
        ActionType::LogCompaction => ActionKind::LogCompaction,
    };
    rule_for(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_own_rule_and_tag() {
        for kind in ActionKind::ALL {
            let rule = rule_for(kind);
            assert_eq!(rule.kind, kind);
            assert_eq!(rule.action_type.as_str(), kind.as_str());
            assert_eq!(rule_for_type(rule.action_type).kind, kind);
        }
    }

    #[test]
    fn replace_family_never_maps_to_commit_slot() {
        for kind in [ActionKind::ReplaceCommit, ActionKind::Clustering] {
            assert!(!rule_for(kind).allows(PayloadSlot::CommitMetadata));
            assert!(rule_for(kind).allows(PayloadSlot::ReplaceCommitMetadata));
        }
    }

    #[test]
    fn only_pending_kinds_contribute_plans() {
        let with_plan: Vec<_> = ActionKind::ALL
            .into_iter()
            .filter(|kind| rule_for(*kind).pending_plan.is_some())
            .collect();

        assert_eq!(
            with_plan,
            vec![
                ActionKind::Clean,
                ActionKind::ReplaceCommit,
                ActionKind::Clustering,
                ActionKind::Compaction,
                ActionKind::LogCompaction,
            ]
        );
    }

    #[test]
    fn archived_blobs_never_decode_to_defaults() {
        for kind in ActionKind::ALL {
            let rule = rule_for(kind);
            for slot_rule in [rule.archived_metadata, rule.archived_plan].into_iter().flatten() {
                assert_ne!(slot_rule.presence, Presence::Always, "{kind} {}", slot_rule.slot);
            }
        }
    }

    #[test]
    fn savepoint_is_the_only_required_slot() {
        let required: Vec<_> = ActionKind::ALL
            .into_iter()
            .flat_map(|kind| {
                let rule = rule_for(kind);
                [rule.completed, rule.archived_metadata]
            })
            .flatten()
            .filter(|rule| rule.presence == Presence::Required)
            .map(|rule| rule.slot)
            .collect();

        assert_eq!(
            required,
            vec![PayloadSlot::SavepointMetadata, PayloadSlot::SavepointMetadata]
        );
    }
}
