//! Compact LSM timeline records.
//!
//! When an operation leaves the active timeline, its per-state files are
//! folded into one [`LsmTimelineInstant`]: a `metadata` blob holding the
//! completed commit-family payload, and a `plan` blob holding whatever the
//! pending action planned. Which plan is kept is decided by the dispatch
//! table's [`PlanSource`] for the pending action.
//!
//! Both blobs are stored as-is; reading them back goes through
//! [`crate::archive::ArchiveEntryBuilder::from_lsm_record`].
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::archive::dispatch::{PlanSource, rule_for};
use crate::archive::{ArchiveError, EmptyActiveActionSnafu, ReadInstantSnafu};
use crate::codec::{self, CodecError};
use crate::timeline::{ActionKind, Instant, InstantReader, InstantState};

/// Format version stamped on every record this encoder writes.
pub const LSM_TIMELINE_INSTANT_VERSION_1: u32 = 1;

/// One archived operation in the LSM timeline.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LsmTimelineInstant {
    /// Operation id (requested time).
    #[prost(string, tag = "1")]
    pub instant_time: String,
    /// Completion time.
    #[prost(string, tag = "2")]
    pub completion_time: String,
    /// Action name of the completed instant.
    #[prost(string, tag = "3")]
    pub action: String,
    /// Encoder format version.
    #[prost(uint32, tag = "4")]
    pub version: u32,
    /// Commit-family payload of the completed instant.
    #[prost(bytes = "bytes", optional, tag = "5")]
    pub metadata: Option<Bytes>,
    /// Plan of the pending action.
    #[prost(bytes = "bytes", optional, tag = "6")]
    pub plan: Option<Bytes>,
}

impl LsmTimelineInstant {
    /// Frame the record in the structured encoding.
    pub fn to_framed_bytes(&self) -> Vec<u8> {
        codec::encode_structured(self)
    }

    /// Read a record framed by [`LsmTimelineInstant::to_framed_bytes`].
    pub fn from_framed_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode_structured(bytes)
    }
}

/// An operation on the active timeline, with lazy access to its payloads.
///
/// The `action` is the completed instant's action; the `pending_action` is
/// the action the operation was requested as. They differ for compaction,
/// which completes as a `commit`.
pub trait ActiveAction {
    /// Operation id.
    fn instant_time(&self) -> &str;
    /// Completion time, once completed.
    fn completion_time(&self) -> Option<&str>;
    /// Action of the completed instant.
    fn action(&self) -> ActionKind;
    /// Action of the requested and inflight instants.
    fn pending_action(&self) -> ActionKind;
    /// Completed commit-family payload.
    fn commit_metadata(&self) -> Option<Bytes>;
    /// Requested clean plan.
    fn clean_plan(&self) -> Option<Bytes>;
    /// Requested replace metadata.
    fn requested_commit_metadata(&self) -> Option<Bytes>;
    /// Inflight commit metadata.
    fn inflight_commit_metadata(&self) -> Option<Bytes>;
    /// Requested compaction plan.
    fn compaction_plan(&self) -> Option<Bytes>;
    /// Requested log compaction plan.
    fn log_compaction_plan(&self) -> Option<Bytes>;
}

/// An [`ActiveAction`] whose per-state bodies are already in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedActiveAction {
    instant_time: String,
    completion_time: Option<String>,
    action: ActionKind,
    pending_action: ActionKind,
    requested: Option<Bytes>,
    inflight: Option<Bytes>,
    completed: Option<Bytes>,
}

impl LoadedActiveAction {
    /// An operation with no bodies yet, completing as `action`.
    pub fn new(
        instant_time: impl Into<String>,
        pending_action: ActionKind,
        action: ActionKind,
    ) -> Self {
        Self {
            instant_time: instant_time.into(),
            completion_time: None,
            action,
            pending_action,
            requested: None,
            inflight: None,
            completed: None,
        }
    }

    /// Set the body of `state`. Empty bodies are treated as absent.
    pub fn with_body(mut self, state: InstantState, body: impl Into<Bytes>) -> Self {
        let body = Some(body.into()).filter(|b| !b.is_empty());
        match state {
            InstantState::Requested => self.requested = body,
            InstantState::Inflight => self.inflight = body,
            InstantState::Completed => self.completed = body,
        }
        self
    }

    /// Set the completion time.
    pub fn with_completion_time(mut self, completion_time: impl Into<String>) -> Self {
        self.completion_time = Some(completion_time.into());
        self
    }

    /// Load every instant of one operation through `reader`.
    ///
    /// The pending action is taken from the requested or inflight instants,
    /// the action from the completed one; either defaults to the other.
    pub async fn load(
        instants: &[Instant],
        reader: &dyn InstantReader,
    ) -> Result<Self, ArchiveError> {
        let first = instants.first().context(EmptyActiveActionSnafu)?;
        let pending = instants.iter().find(|i| !i.is_completed()).unwrap_or(first);
        let completed = instants.iter().find(|i| i.is_completed());

        let mut loaded = Self::new(
            first.requested_time.clone(),
            pending.action,
            completed.map_or(pending.action, |i| i.action),
        );
        loaded.completion_time = completed.and_then(|i| i.completion_time.clone());

        for instant in instants {
            let body = reader
                .read_instant_details(instant)
                .await
                .context(ReadInstantSnafu {
                    instant: instant.to_string(),
                })?;
            loaded = loaded.with_body(instant.state, body);
        }
        Ok(loaded)
    }
}

impl ActiveAction for LoadedActiveAction {
    fn instant_time(&self) -> &str {
        &self.instant_time
    }

    fn completion_time(&self) -> Option<&str> {
        self.completion_time.as_deref()
    }

    fn action(&self) -> ActionKind {
        self.action
    }

    fn pending_action(&self) -> ActionKind {
        self.pending_action
    }

    fn commit_metadata(&self) -> Option<Bytes> {
        self.completed.clone()
    }

    fn clean_plan(&self) -> Option<Bytes> {
        self.requested.clone()
    }

    fn requested_commit_metadata(&self) -> Option<Bytes> {
        self.requested.clone()
    }

    fn inflight_commit_metadata(&self) -> Option<Bytes> {
        self.inflight.clone()
    }

    fn compaction_plan(&self) -> Option<Bytes> {
        self.requested.clone()
    }

    fn log_compaction_plan(&self) -> Option<Bytes> {
        self.requested.clone()
    }
}

/// Fold `action` into its compact LSM record.
///
/// Absent sources leave the corresponding blob unset. For the replace
/// family, the inflight commit metadata wins over the requested metadata.
pub fn create_lsm_timeline_instant<A: ActiveAction + ?Sized>(action: &A) -> LsmTimelineInstant {
    let plan = match rule_for(action.pending_action()).pending_plan {
        Some(PlanSource::CleanPlan) => action.clean_plan(),
        Some(PlanSource::ReplaceMetadata) => action
            .inflight_commit_metadata()
            .or_else(|| action.requested_commit_metadata()),
        Some(PlanSource::CompactionPlan) => action.compaction_plan(),
        Some(PlanSource::LogCompactionPlan) => action.log_compaction_plan(),
        None => None,
    };

    LsmTimelineInstant {
        instant_time: action.instant_time().to_string(),
        completion_time: action.completion_time().unwrap_or_default().to_string(),
        action: action.action().as_str().to_string(),
        version: LSM_TIMELINE_INSTANT_VERSION_1,
        metadata: action.commit_metadata(),
        plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::InMemoryTimeline;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn inflight_replace_metadata_wins_over_requested() {
        let action =
            LoadedActiveAction::new("001", ActionKind::ReplaceCommit, ActionKind::ReplaceCommit)
                .with_body(InstantState::Requested, &b"requested"[..])
                .with_body(InstantState::Inflight, &b"inflight"[..])
                .with_body(InstantState::Completed, &b"completed"[..])
                .with_completion_time("002");

        let record = create_lsm_timeline_instant(&action);

        assert_eq!(record.plan.as_deref(), Some(&b"inflight"[..]));
        assert_eq!(record.metadata.as_deref(), Some(&b"completed"[..]));
        assert_eq!(record.version, LSM_TIMELINE_INSTANT_VERSION_1);
        assert_eq!(record.completion_time, "002");
    }

    #[test]
    fn empty_inflight_falls_back_to_requested_metadata() {
        let action = LoadedActiveAction::new("001", ActionKind::Clustering, ActionKind::Clustering)
            .with_body(InstantState::Requested, &b"requested"[..])
            .with_body(InstantState::Inflight, Bytes::new());

        let record = create_lsm_timeline_instant(&action);

        assert_eq!(record.plan.as_deref(), Some(&b"requested"[..]));
        assert_eq!(record.metadata, None);
    }

    #[test]
    fn compaction_keeps_plan_and_completes_as_commit() {
        let action = LoadedActiveAction::new("001", ActionKind::Compaction, ActionKind::Commit)
            .with_body(InstantState::Requested, &b"plan"[..])
            .with_body(InstantState::Completed, &b"metadata"[..]);

        let record = create_lsm_timeline_instant(&action);

        assert_eq!(record.action, "commit");
        assert_eq!(record.plan.as_deref(), Some(&b"plan"[..]));
    }

    #[test]
    fn actions_without_plan_source_leave_plan_unset() {
        for kind in [ActionKind::Commit, ActionKind::Rollback, ActionKind::Savepoint] {
            let action = LoadedActiveAction::new("001", kind, kind)
                .with_body(InstantState::Requested, &b"ignored"[..]);

            assert_eq!(create_lsm_timeline_instant(&action).plan, None);
        }
    }

    #[test]
    fn record_survives_framing() -> TestResult {
        let record = LsmTimelineInstant {
            instant_time: "001".to_string(),
            completion_time: "002".to_string(),
            action: "clean".to_string(),
            version: LSM_TIMELINE_INSTANT_VERSION_1,
            metadata: None,
            plan: Some(Bytes::from_static(b"plan")),
        };

        let back = LsmTimelineInstant::from_framed_bytes(&record.to_framed_bytes())?;

        assert_eq!(back, record);
        Ok(())
    }

    #[test]
    fn record_json_uses_archive_field_names() -> TestResult {
        let record = LsmTimelineInstant {
            instant_time: "001".to_string(),
            action: "commit".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&record)?;

        assert_eq!(json["instant-time"], "001");
        assert!(json.get("completion-time").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn load_reads_every_state_of_the_operation() -> TestResult {
        let requested = Instant::new(InstantState::Requested, ActionKind::Compaction, "001");
        let inflight = Instant::new(InstantState::Inflight, ActionKind::Compaction, "001");
        let completed = Instant::completed(ActionKind::Commit, "001", "002");
        let timeline = InMemoryTimeline::new()
            .with(&requested, &b"plan"[..])
            .with(&inflight, Bytes::new())
            .with(&completed, &b"metadata"[..]);

        let action =
            LoadedActiveAction::load(&[requested, inflight, completed], &timeline).await?;

        assert_eq!(action.pending_action(), ActionKind::Compaction);
        assert_eq!(action.action(), ActionKind::Commit);
        assert_eq!(action.completion_time(), Some("002"));
        assert_eq!(action.inflight_commit_metadata(), None);
        assert_eq!(action.compaction_plan().as_deref(), Some(&b"plan"[..]));
        Ok(())
    }

    #[tokio::test]
    async fn load_of_nothing_is_an_error() {
        let err = LoadedActiveAction::load(&[], &InMemoryTimeline::new())
            .await
            .expect_err("no instants");

        assert!(matches!(err, ArchiveError::EmptyActiveAction { .. }));
    }
}
