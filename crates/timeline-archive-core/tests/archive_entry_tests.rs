#![allow(missing_docs)]

use bytes::Bytes;
use timeline_archive_core::{
    archive::{
        ArchiveEntryBuilder, ArchiveError, ArchivedMetaEntry, LsmTimelineInstant, PayloadSlot,
    },
    codec::{encode_commit_metadata, encode_structured},
    model::{
        AnyCommitMetadata, CleanMetadata, CleanerPlan, CommitMetadata, CompactionOperation,
        CompactionPlan, ReplaceCommitMetadata, RequestedReplaceMetadata, RollbackMetadata,
        SavepointMetadata, WriteOperationType, WriteStat,
    },
    timeline::{ActionKind, ArchiveConfig, InMemoryTimeline, Instant, InstantState, TableVersion},
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn commit_metadata() -> CommitMetadata {
    let mut meta = CommitMetadata::new(false);
    meta.set_operation_type(WriteOperationType::Upsert);
    meta.add_write_stat(
        Some("2024/01/01"),
        WriteStat {
            num_writes: 10,
            num_inserts: 10,
            ..WriteStat::for_file("2024/01/01", "fg-1", "2024/01/01/fg-1_001.parquet")
        },
    );
    meta
}

fn replace_metadata() -> ReplaceCommitMetadata {
    let mut meta = ReplaceCommitMetadata {
        base: commit_metadata(),
        ..Default::default()
    };
    meta.base.set_operation_type(WriteOperationType::InsertOverwrite);
    meta.add_replace_file_id(Some("2024/01/01"), "fg-0");
    meta
}

fn compaction_plan() -> CompactionPlan {
    CompactionPlan {
        operations: vec![CompactionOperation {
            base_instant_time: "000".to_string(),
            file_id: "fg-1".to_string(),
            partition_path: "2024/01/01".to_string(),
            delta_file_paths: vec![".fg-1_000.log.1".to_string()],
            ..Default::default()
        }],
        version: 2,
        ..Default::default()
    }
}

/// A valid body for every (kind, state) pair; pairs with no payload rule
/// get bytes that would not decode as anything.
fn body_for(kind: ActionKind, state: InstantState) -> Vec<u8> {
    use ActionKind as K;
    use InstantState as S;

    match (kind, state) {
        (K::Clean, S::Requested | S::Inflight) => encode_structured(&CleanerPlan {
            policy: "KEEP_LATEST_COMMITS".to_string(),
            ..Default::default()
        }),
        (K::Clean, S::Completed) => encode_structured(&CleanMetadata {
            total_files_deleted: 3,
            ..Default::default()
        }),
        (K::Commit | K::DeltaCommit, S::Completed) => {
            encode_commit_metadata(&AnyCommitMetadata::Commit(commit_metadata()))
        }
        (K::ReplaceCommit | K::Clustering, S::Requested) => {
            encode_structured(&RequestedReplaceMetadata {
                operation_type: "CLUSTER".to_string(),
                version: 1,
                ..Default::default()
            })
        }
        (K::ReplaceCommit | K::Clustering, S::Inflight) => {
            encode_commit_metadata(&AnyCommitMetadata::Commit(commit_metadata()))
        }
        (K::ReplaceCommit | K::Clustering, S::Completed) => {
            encode_commit_metadata(&AnyCommitMetadata::Replace(replace_metadata()))
        }
        (K::Rollback, S::Completed) => encode_structured(&RollbackMetadata {
            commits_rollback: vec!["000".to_string()],
            ..Default::default()
        }),
        (K::Savepoint, S::Completed) => encode_structured(&SavepointMetadata {
            savepointed_by: "admin".to_string(),
            ..Default::default()
        }),
        (K::Compaction | K::LogCompaction, S::Requested) => encode_structured(&compaction_plan()),
        _ => b"\xffnot a payload".to_vec(),
    }
}

fn expected_slots(kind: ActionKind, state: InstantState) -> Vec<PayloadSlot> {
    use ActionKind as K;
    use InstantState as S;

    let slot = match (kind, state) {
        (K::Clean, S::Requested | S::Inflight) => Some(PayloadSlot::CleanPlan),
        (K::Clean, S::Completed) => Some(PayloadSlot::CleanMetadata),
        (K::Commit | K::DeltaCommit, S::Completed) => Some(PayloadSlot::CommitMetadata),
        (K::ReplaceCommit | K::Clustering, S::Requested) => {
            Some(PayloadSlot::RequestedReplaceMetadata)
        }
        (K::ReplaceCommit | K::Clustering, S::Inflight) => {
            Some(PayloadSlot::InflightReplaceMetadata)
        }
        (K::ReplaceCommit | K::Clustering, S::Completed) => {
            Some(PayloadSlot::ReplaceCommitMetadata)
        }
        (K::Rollback, S::Completed) => Some(PayloadSlot::RollbackMetadata),
        (K::Savepoint, S::Completed) => Some(PayloadSlot::SavepointMetadata),
        (K::Compaction | K::LogCompaction, S::Requested) => Some(PayloadSlot::CompactionPlan),
        _ => None,
    };
    slot.into_iter().collect()
}

fn instant(kind: ActionKind, state: InstantState) -> Instant {
    match state {
        InstantState::Completed => {
            Instant::completed(kind, "20240101000000000", "20240101000005000")
        }
        _ => Instant::new(state, kind, "20240101000000000"),
    }
}

async fn live_entry(
    kind: ActionKind,
    state: InstantState,
    body: impl Into<Bytes>,
) -> Result<ArchivedMetaEntry, ArchiveError> {
    let instant = instant(kind, state);
    let timeline = InMemoryTimeline::new().with(&instant, body);
    ArchiveEntryBuilder::default()
        .from_active_instant(&instant, &timeline)
        .await
}

#[tokio::test]
async fn presence_table_holds_for_every_kind_and_state() -> TestResult {
    for kind in ActionKind::ALL {
        for state in InstantState::ALL {
            let entry = live_entry(kind, state, body_for(kind, state)).await?;

            assert_eq!(
                entry.populated_slots(),
                expected_slots(kind, state),
                "{kind} {state}"
            );
            assert_eq!(entry.action_type.as_str(), kind.as_str(), "{kind} {state}");
            assert_eq!(entry.action_state, state);
            assert!(entry.is_consistent(), "{kind} {state}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn empty_completed_instant_is_tag_only_for_every_kind() -> TestResult {
    for kind in ActionKind::ALL {
        let entry = live_entry(kind, InstantState::Completed, Bytes::new()).await?;

        assert!(entry.populated_slots().is_empty(), "{kind}");
        assert_eq!(entry.action_type.as_str(), kind.as_str());
        assert_eq!(entry.operation_id, "20240101000000000");
        assert_eq!(entry.state_transition_time.as_deref(), Some("20240101000005000"));
    }
    Ok(())
}

#[tokio::test]
async fn empty_inflight_replace_commit_is_absent_not_an_error() -> TestResult {
    let entry = live_entry(ActionKind::ReplaceCommit, InstantState::Inflight, Bytes::new()).await?;

    assert_eq!(entry.action_type.as_str(), "replacecommit");
    assert_eq!(entry.inflight_replace_metadata, None);
    assert!(entry.populated_slots().is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_requested_insert_overwrite_is_absent() -> TestResult {
    let entry =
        live_entry(ActionKind::ReplaceCommit, InstantState::Requested, Bytes::new()).await?;

    assert_eq!(entry.requested_replace_metadata, None);
    Ok(())
}

#[tokio::test]
async fn requested_compaction_carries_only_its_plan() -> TestResult {
    let entry = live_entry(
        ActionKind::Compaction,
        InstantState::Requested,
        encode_structured(&compaction_plan()),
    )
    .await?;

    assert_eq!(entry.action_type.as_str(), "compaction");
    assert_eq!(entry.compaction_plan, Some(compaction_plan()));
    assert_eq!(entry.populated_slots(), vec![PayloadSlot::CompactionPlan]);
    Ok(())
}

#[tokio::test]
async fn completed_clustering_uses_replace_slot() -> TestResult {
    let entry = live_entry(
        ActionKind::Clustering,
        InstantState::Completed,
        body_for(ActionKind::Clustering, InstantState::Completed),
    )
    .await?;

    assert_eq!(entry.action_type.as_str(), "clustering");
    assert_eq!(entry.commit_metadata, None);
    let replace = entry.replace_commit_metadata.ok_or("replace metadata")?;
    assert_eq!(
        replace.partition_to_replace_file_ids["2024/01/01"].file_ids,
        vec!["fg-0".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn savepoint_without_metadata_blob_is_header_only_on_both_paths() -> TestResult {
    let record = LsmTimelineInstant {
        instant_time: "001".to_string(),
        completion_time: "002".to_string(),
        action: "savepoint".to_string(),
        plan: Some(Bytes::from_static(b"unrelated")),
        ..Default::default()
    };
    let instant = Instant::completed(ActionKind::Savepoint, "001", "002");
    let timeline = InMemoryTimeline::new().with(&instant, Bytes::new());
    let builder = ArchiveEntryBuilder::default();

    let archived = builder.from_lsm_record(&record)?;
    let live = builder.from_active_instant(&instant, &timeline).await?;

    assert_eq!(archived, live);
    assert_eq!(archived.savepoint_metadata, None);
    Ok(())
}

#[test]
fn corrupt_savepoint_metadata_blob_is_an_error() {
    let record = LsmTimelineInstant {
        instant_time: "001".to_string(),
        completion_time: "002".to_string(),
        action: "savepoint".to_string(),
        metadata: Some(Bytes::from_static(b"\xffnot a payload")),
        ..Default::default()
    };

    let err = ArchiveEntryBuilder::default()
        .from_lsm_record(&record)
        .expect_err("savepoint metadata is unreadable");

    assert!(matches!(
        err,
        ArchiveError::PayloadDecode { slot: PayloadSlot::SavepointMetadata, .. }
    ));
}

#[tokio::test]
async fn corrupt_rollback_metadata_is_reported_with_context() {
    let err = live_entry(
        ActionKind::Rollback,
        InstantState::Completed,
        Bytes::from_static(b"{ not protobuf }"),
    )
    .await
    .expect_err("corrupt");

    let message = err.to_string();
    assert!(message.contains("rollback-metadata"), "{message}");
    assert!(message.contains("20240101000000000"), "{message}");
}

#[test]
fn archive_record_path_rejects_old_tables() {
    for version in [TableVersion::SIX, TableVersion::SEVEN] {
        let builder = ArchiveEntryBuilder::new(ArchiveConfig::for_version(version));

        let err = builder
            .from_lsm_record(&LsmTimelineInstant::default())
            .expect_err("precondition");

        assert!(matches!(err, ArchiveError::TableVersionTooOld { .. }));
    }
}
