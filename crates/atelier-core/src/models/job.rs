use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::media::{MediaKind, MediaRecord};

/// Lifecycle of one generation job.
///
/// Unlike the engine's own status strings, `Abandoned` is a hard ceiling:
/// a job that never reaches a terminal engine status stops being polled
/// after a configured number of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Submitted,
    Polling,
    Success,
    Error,
    Abandoned,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobPhase::Success | JobPhase::Error | JobPhase::Abandoned
        )
    }
}

/// Snapshot of a generation job as tracked by the poller and exposed to
/// clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    pub id: Uuid,
    pub kind: MediaKind,
    /// Engine-assigned id for the submitted job graph.
    pub prompt_id: String,
    pub phase: JobPhase,
    /// Human-readable note for error/partial-failure outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The journaled record, present once the job reached a terminal phase
    /// that produced one (success, or sweep exhaustion with a fallback).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<MediaRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobState {
    pub fn new(kind: MediaKind, prompt_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            prompt_id,
            phase: JobPhase::Submitted,
            message: None,
            record: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(!JobPhase::Submitted.is_terminal());
        assert!(!JobPhase::Polling.is_terminal());
        assert!(JobPhase::Success.is_terminal());
        assert!(JobPhase::Error.is_terminal());
        assert!(JobPhase::Abandoned.is_terminal());
    }

    #[test]
    fn test_new_job_starts_submitted() {
        let job = JobState::new(MediaKind::Image, "p1".to_string());
        assert_eq!(job.phase, JobPhase::Submitted);
        assert!(job.record.is_none());
        assert_eq!(job.prompt_id, "p1");
    }
}
