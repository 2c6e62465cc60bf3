//! Session facade: the thin loop driver around the core.
//!
//! Owns no decision logic. One step is: ingest the incoming staff message,
//! ask the coordinator for the next skill, run it through the executor,
//! fold the outcome with the reducer, hand back the new snapshot plus the
//! reply text. Which session maps to which snapshot is the caller's
//! concern; state is a value here.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::coordinator::next_skill;
use crate::reducer::apply_outcome;
use crate::skill::{ExecuteError, SkillExecutor, SnapshotSink};
use crate::types::{GoalFacts, Persona, SessionState, Speaker};

/// Step errors surfaced to the front end.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("session is already complete")]
    SessionComplete,

    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Result of a single conversation step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// The new immutable state snapshot.
    pub state: SessionState,
    /// Reply text to show the counterparty.
    pub reply: String,
}

/// Drives sessions against an executor and a snapshot sink.
pub struct SessionRuntime {
    executor: Arc<dyn SkillExecutor>,
    sink: Arc<dyn SnapshotSink>,
}

impl SessionRuntime {
    pub fn new(executor: Arc<dyn SkillExecutor>, sink: Arc<dyn SnapshotSink>) -> Self {
        Self { executor, sink }
    }

    /// Create a fresh session state for the given goal facts.
    pub fn create(&self, persona: Persona, goals: GoalFacts) -> SessionState {
        SessionState::new(persona, goals)
    }

    /// True exactly when the coordinator reports no next skill.
    pub fn is_complete(&self, state: &SessionState) -> bool {
        next_skill(state).is_none()
    }

    /// Run one turn. The input state is untouched; the returned snapshot
    /// carries the appended turns and the advanced workflow cursor.
    pub async fn step(
        &self,
        state: &SessionState,
        incoming: Option<&str>,
    ) -> Result<StepResult, StepError> {
        let mut current = state.clone();
        if let Some(message) = incoming {
            current.append_turn(Speaker::Staff, message);
        }

        let Some(kind) = next_skill(&current) else {
            return Err(StepError::SessionComplete);
        };
        debug!(session = %current.id, skill = %kind, "executing skill");

        let last_staff = current
            .scratchpad
            .last_staff_message
            .clone()
            .unwrap_or_default();
        let outcome = self.executor.execute(kind, &current, &last_staff).await?;
        if outcome.kind() != kind {
            return Err(StepError::Execute(ExecuteError::KindMismatch {
                expected: kind,
                got: outcome.kind(),
            }));
        }

        let reply = outcome.reply().to_string();
        let next = apply_outcome(&current, &outcome, self.sink.as_ref());
        Ok(StepResult { state: next, reply })
    }
}
