//! A single observed timeline instant.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timeline::action::{ActionKind, InstantState};

/// One state of one operation on the timeline.
///
/// Instants are created and retired by the timeline itself; this crate only
/// reads them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instant {
    /// Operation identifier (the requested time, e.g. `20240101120000000`).
    pub requested_time: String,
    /// The operation's action kind.
    pub action: ActionKind,
    /// Lifecycle state this instant represents.
    pub state: InstantState,
    /// Completion time, present once the operation completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,
}

impl Instant {
    /// Create a pending instant (requested or inflight).
    pub fn new(state: InstantState, action: ActionKind, requested_time: impl Into<String>) -> Self {
        Self {
            requested_time: requested_time.into(),
            action,
            state,
            completion_time: None,
        }
    }

    /// Create a completed instant.
    pub fn completed(
        action: ActionKind,
        requested_time: impl Into<String>,
        completion_time: impl Into<String>,
    ) -> Self {
        Self {
            requested_time: requested_time.into(),
            action,
            state: InstantState::Completed,
            completion_time: Some(completion_time.into()),
        }
    }

    /// Returns true if the instant is in the `REQUESTED` state.
    pub fn is_requested(&self) -> bool {
        self.state == InstantState::Requested
    }

    /// Returns true if the instant is in the `INFLIGHT` state.
    pub fn is_inflight(&self) -> bool {
        self.state == InstantState::Inflight
    }

    /// Returns true if the instant is in the `COMPLETED` state.
    pub fn is_completed(&self) -> bool {
        self.state == InstantState::Completed
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}__{}__{}",
            self.requested_time, self.action, self.state
        )?;
        if let Some(completion) = &self.completion_time {
            write!(f, "__{completion}")?;
        }
        f.write_str("]")
    }
}
