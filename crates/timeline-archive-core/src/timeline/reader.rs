//! Read capability for instant payload bytes.
//!
//! The conversion core never decides where an instant's bytes live. Callers
//! inject an [`InstantReader`]; this module ships an in-memory implementation
//! and a local-filesystem one driven by a caller-supplied path resolver.
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use snafu::prelude::*;

use crate::storage::{self, MissingInstantSnafu, StorageResult, TableLocation};
use crate::timeline::action::{ActionKind, InstantState};
use crate::timeline::instant::Instant;

/// Fetches the raw bytes backing one state of an instant.
///
/// A zero-length result is a legitimate answer (crash-truncated or
/// intentionally empty files) and must not be turned into an error by
/// implementations.
#[async_trait]
pub trait InstantReader: Send + Sync {
    /// Read the bytes of `instant`.
    async fn read_instant_details(&self, instant: &Instant) -> StorageResult<Bytes>;
}

/// Timeline held entirely in memory, keyed by (requested time, action, state).
#[derive(Clone, Debug, Default)]
pub struct InMemoryTimeline {
    details: BTreeMap<(String, ActionKind, InstantState), Bytes>,
}

impl InMemoryTimeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bytes for `instant`, replacing any previous value.
    pub fn insert(&mut self, instant: &Instant, details: impl Into<Bytes>) {
        self.details.insert(
            (instant.requested_time.clone(), instant.action, instant.state),
            details.into(),
        );
    }

    /// Builder-style variant of [`InMemoryTimeline::insert`].
    pub fn with(mut self, instant: &Instant, details: impl Into<Bytes>) -> Self {
        self.insert(instant, details);
        self
    }

    /// Number of recorded instant states.
    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

#[async_trait]
impl InstantReader for InMemoryTimeline {
    async fn read_instant_details(&self, instant: &Instant) -> StorageResult<Bytes> {
        let key = (instant.requested_time.clone(), instant.action, instant.state);
        self.details
            .get(&key)
            .cloned()
            .context(MissingInstantSnafu {
                instant: instant.to_string(),
            })
    }
}

type PathResolver = dyn Fn(&Instant) -> PathBuf + Send + Sync;

/// Reads instant files from a local table root.
///
/// The file naming of the live timeline is owned by the caller, which
/// supplies `resolve` to map an instant to a path relative to the root.
pub struct LocalInstantReader {
    location: TableLocation,
    resolve: Box<PathResolver>,
}

impl LocalInstantReader {
    /// Create a reader rooted at `location`.
    pub fn new(
        location: TableLocation,
        resolve: impl Fn(&Instant) -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        Self {
            location,
            resolve: Box::new(resolve),
        }
    }

    /// Get the TableLocation of the reader.
    pub fn location(&self) -> &TableLocation {
        &self.location
    }
}

impl fmt::Debug for LocalInstantReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalInstantReader")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InstantReader for LocalInstantReader {
    async fn read_instant_details(&self, instant: &Instant) -> StorageResult<Bytes> {
        let rel = (self.resolve)(instant);
        let bytes = storage::read_all_bytes(&self.location, &rel).await?;
        Ok(Bytes::from(bytes))
    }
}
