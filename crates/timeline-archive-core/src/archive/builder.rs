//! Building archival records from live instants and from archived LSM records.
use log::debug;
use snafu::prelude::*;

use crate::archive::dispatch::rule_for;
use crate::archive::entry::ArchivedMetaEntry;
use crate::archive::lsm::LsmTimelineInstant;
use crate::archive::payload::SlotDecoder;
use crate::archive::{
    ArchiveError, ReadInstantSnafu, TableVersionTooOldSnafu, UnsupportedActionSnafu,
};
use crate::codec::{CommitMetadataSerDe, serde_for};
use crate::timeline::{
    ActionKind, ArchiveConfig, Instant, InstantReader, InstantState, TableVersion,
};

/// Minimum table version of the archived LSM record read path.
const LSM_READ_MIN_VERSION: TableVersion = TableVersion::EIGHT;

/// Builds [`ArchivedMetaEntry`] values for one table.
///
/// The builder picks the commit metadata serializer matching the table's
/// version, so commit payloads are read the way that era wrote them.
#[derive(Debug, Clone)]
pub struct ArchiveEntryBuilder {
    config: ArchiveConfig,
    serde: &'static dyn CommitMetadataSerDe,
}

impl ArchiveEntryBuilder {
    /// Create a builder for a table described by `config`.
    pub fn new(config: ArchiveConfig) -> Self {
        let serde = serde_for(config.table_version);
        Self { config, serde }
    }

    /// The configuration the builder was created with.
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Build the record for one live instant, reading its bytes from `reader`.
    ///
    /// A completed instant with a zero-length body yields a header-only
    /// record (see [`empty_instant_entry`]).
    pub async fn from_active_instant(
        &self,
        instant: &Instant,
        reader: &dyn InstantReader,
    ) -> Result<ArchivedMetaEntry, ArchiveError> {
        let details = reader
            .read_instant_details(instant)
            .await
            .context(ReadInstantSnafu {
                instant: instant.to_string(),
            })?;

        if instant.is_completed() && details.is_empty() {
            return Ok(empty_instant_entry(instant));
        }

        let rule = rule_for(instant.action);
        let mut entry = ArchivedMetaEntry::tag_only(
            instant.requested_time.clone(),
            instant.state,
            instant.completion_time.clone(),
            rule.action_type,
        );

        if let Some(slot_rule) = rule.live(instant.state) {
            let decoder = self.decoder(&instant.requested_time, instant.action);
            if let Some(payload) = decoder.decode(slot_rule, Some(&details[..]))? {
                entry.insert(payload);
            }
        }
        Ok(entry)
    }

    /// Build the summary record for one archived LSM record.
    ///
    /// Only valid for tables at version 8 or later. The record is always
    /// completed; both its metadata and plan blobs are decoded. A kind that
    /// archives completed metadata but has no metadata blob yields the
    /// header-only record, like an empty completed instant on the live path.
    pub fn from_lsm_record(
        &self,
        record: &LsmTimelineInstant,
    ) -> Result<ArchivedMetaEntry, ArchiveError> {
        ensure!(
            self.config.table_version.at_least(LSM_READ_MIN_VERSION),
            TableVersionTooOldSnafu {
                version: self.config.table_version,
                required: LSM_READ_MIN_VERSION,
            }
        );

        let action: ActionKind = match record.action.parse() {
            Ok(action) => action,
            Err(_) => {
                return UnsupportedActionSnafu {
                    action: record.action.as_str(),
                }
                .fail();
            }
        };
        let rule = rule_for(action);
        let mut entry = ArchivedMetaEntry::tag_only(
            record.instant_time.clone(),
            InstantState::Completed,
            Some(record.completion_time.clone()),
            rule.action_type,
        );

        // the metadata blob is the completed body
        let metadata = record.metadata.as_deref().filter(|b| !b.is_empty());
        let plan = record.plan.as_deref().filter(|b| !b.is_empty());
        if metadata.is_none() && (plan.is_none() || rule.archived_metadata.is_some()) {
            debug!(
                "archived {action} {} has no completed payload, recording its header only",
                record.instant_time
            );
            return Ok(entry);
        }

        let decoder = self.decoder(&record.instant_time, action);
        for (slot_rule, body) in [(rule.archived_metadata, metadata), (rule.archived_plan, plan)] {
            let Some(slot_rule) = slot_rule else {
                continue;
            };
            if let Some(payload) = decoder.decode(slot_rule, body)? {
                entry.insert(payload);
            }
        }
        Ok(entry)
    }

    fn decoder<'a>(&'a self, operation_id: &'a str, action: ActionKind) -> SlotDecoder<'a> {
        SlotDecoder {
            operation_id,
            action,
            serde: self.serde,
        }
    }
}

impl Default for ArchiveEntryBuilder {
    fn default() -> Self {
        Self::new(ArchiveConfig::default())
    }
}

/// The header-only record for an instant whose completed body is empty.
///
/// Crashes can leave zero-length completed files behind; they are still
/// archived, with the action tag set and every payload absent.
pub fn empty_instant_entry(instant: &Instant) -> ArchivedMetaEntry {
    debug!("{instant} has an empty body, recording its header only");
    ArchivedMetaEntry::tag_only(
        instant.requested_time.clone(),
        instant.state,
        instant.completion_time.clone(),
        rule_for(instant.action).action_type,
    )
}
