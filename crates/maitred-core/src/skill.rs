//! Skill contracts shared with the executor.
//!
//! Each conversational capability has a fixed, typed result shape. The
//! shapes form a tagged union so the reducer is one exhaustive match and a
//! new skill cannot be added without a compile error at every seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::{
    AvailabilityStatus, ConfirmationStatus, MenuPreferences, ReservationDetails, SessionState,
    Stage,
};

/// Category of capability invoked on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Greeting,
    Availability,
    DetailsCollection,
    MenuDiscussion,
    Confirmation,
    AlternativeReview,
    ErrorRecovery,
    SaveReservation,
}

impl SkillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillKind::Greeting => "greeting",
            SkillKind::Availability => "availability",
            SkillKind::DetailsCollection => "details_collection",
            SkillKind::MenuDiscussion => "menu_discussion",
            SkillKind::Confirmation => "confirmation",
            SkillKind::AlternativeReview => "alternative_review",
            SkillKind::ErrorRecovery => "error_recovery",
            SkillKind::SaveReservation => "save_reservation",
        }
    }

    /// One-line description used when prompting for this skill.
    pub fn description(&self) -> &'static str {
        match self {
            SkillKind::Greeting => "Greet the staff and state the intent to book a table.",
            SkillKind::Availability => {
                "Share desired slot details and interpret staff availability responses."
            }
            SkillKind::DetailsCollection => {
                "Provide the guest's booking details and confirm next steps."
            }
            SkillKind::MenuDiscussion => "Ask the staff follow-up questions about the menu.",
            SkillKind::Confirmation => {
                "Interpret the staff's final answer and react as the guest."
            }
            SkillKind::AlternativeReview => {
                "Evaluate and respond to alternative slots suggested by the staff."
            }
            SkillKind::ErrorRecovery => {
                "Recover from booking errors and restart the request if needed."
            }
            SkillKind::SaveReservation => {
                "Acknowledge the confirmed booking so it can be stored."
            }
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Greeting responses need no extra structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingOutcome {
    pub reply: String,
}

/// How the staff responded to the requested slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityOutcome {
    pub reply: String,
    #[serde(default)]
    pub availability_status: AvailabilityStatus,
    #[serde(default)]
    pub suggested_alternatives: Vec<String>,
    #[serde(default)]
    pub selected_slot_note: Option<String>,
    #[serde(default)]
    pub pending_questions: Vec<String>,
    #[serde(default)]
    pub special_request_rejected: bool,
}

/// Booking details shared with (and acknowledged by) staff this turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsOutcome {
    pub reply: String,
    #[serde(default)]
    pub details: ReservationDetails,
    #[serde(default)]
    pub needs_menu_dialog: bool,
}

fn default_menu_next_stage() -> Stage {
    Stage::AwaitConfirmation
}

/// Menu-related questions or highlights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuOutcome {
    pub reply: String,
    #[serde(default)]
    pub menu_preferences: MenuPreferences,
    /// Stage to move to next; the reducer trusts this verbatim.
    #[serde(default = "default_menu_next_stage")]
    pub next_stage: Stage,
}

/// Outcome of the booking confirmation exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationOutcome {
    pub reply: String,
    #[serde(default)]
    pub confirmation_status: ConfirmationStatus,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub confirmed_details: ReservationDetails,
}

/// Result of weighing staff-suggested alternative slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeOutcome {
    pub reply: String,
    #[serde(default)]
    pub alternative_selected: bool,
    #[serde(default)]
    pub accepted_slot_description: Option<String>,
    #[serde(default)]
    pub should_end_conversation: bool,
}

fn default_reset_stage() -> Stage {
    Stage::SharePreferences
}

/// Guides the state machine back to a safe point after a blocking issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub reply: String,
    #[serde(default = "default_reset_stage")]
    pub reset_stage: Stage,
}

/// Final acknowledgement before the reservation is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub reply: String,
    #[serde(default)]
    pub follow_up_needed: bool,
}

/// Structured result of one skill execution.
///
/// Every shape carries a mandatory human-readable `reply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "skill", rename_all = "snake_case")]
pub enum SkillOutcome {
    Greeting(GreetingOutcome),
    Availability(AvailabilityOutcome),
    DetailsCollection(DetailsOutcome),
    MenuDiscussion(MenuOutcome),
    Confirmation(ConfirmationOutcome),
    AlternativeReview(AlternativeOutcome),
    ErrorRecovery(RecoveryOutcome),
    SaveReservation(SaveOutcome),
}

impl SkillOutcome {
    pub fn kind(&self) -> SkillKind {
        match self {
            SkillOutcome::Greeting(_) => SkillKind::Greeting,
            SkillOutcome::Availability(_) => SkillKind::Availability,
            SkillOutcome::DetailsCollection(_) => SkillKind::DetailsCollection,
            SkillOutcome::MenuDiscussion(_) => SkillKind::MenuDiscussion,
            SkillOutcome::Confirmation(_) => SkillKind::Confirmation,
            SkillOutcome::AlternativeReview(_) => SkillKind::AlternativeReview,
            SkillOutcome::ErrorRecovery(_) => SkillKind::ErrorRecovery,
            SkillOutcome::SaveReservation(_) => SkillKind::SaveReservation,
        }
    }

    /// The human-readable reply present on every variant.
    pub fn reply(&self) -> &str {
        match self {
            SkillOutcome::Greeting(o) => &o.reply,
            SkillOutcome::Availability(o) => &o.reply,
            SkillOutcome::DetailsCollection(o) => &o.reply,
            SkillOutcome::MenuDiscussion(o) => &o.reply,
            SkillOutcome::Confirmation(o) => &o.reply,
            SkillOutcome::AlternativeReview(o) => &o.reply,
            SkillOutcome::ErrorRecovery(o) => &o.reply,
            SkillOutcome::SaveReservation(o) => &o.reply,
        }
    }
}

/// Executor errors surfaced to the session facade.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("llm error: {0}")]
    Llm(String),

    #[error("malformed skill outcome: {0}")]
    Malformed(String),

    #[error("outcome kind mismatch: expected {expected}, got {got}")]
    KindMismatch { expected: SkillKind, got: SkillKind },
}

/// Produces a structured outcome for a skill given the current state and
/// the latest incoming message. Implementations own prompt rendering and
/// the generation backend; the core only sees this contract.
#[async_trait]
pub trait SkillExecutor: Send + Sync {
    async fn execute(
        &self,
        kind: SkillKind,
        state: &SessionState,
        incoming: &str,
    ) -> Result<SkillOutcome, ExecuteError>;
}

/// Persistence errors. Never fatal to a conversation: the save handler
/// downgrades them to a marker string.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persists a finished (or failed) negotiation and returns a storage
/// location identifier. The core does not interpret the identifier.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, state: &SessionState) -> Result<String, SnapshotError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_kind_and_reply_accessors() {
        let outcome = SkillOutcome::Greeting(GreetingOutcome {
            reply: "Good evening!".to_string(),
        });
        assert_eq!(outcome.kind(), SkillKind::Greeting);
        assert_eq!(outcome.reply(), "Good evening!");

        let outcome = SkillOutcome::SaveReservation(SaveOutcome {
            reply: "All set.".to_string(),
            follow_up_needed: false,
        });
        assert_eq!(outcome.kind(), SkillKind::SaveReservation);
    }

    #[test]
    fn test_outcome_defaults_fill_missing_fields() {
        let parsed: AvailabilityOutcome =
            serde_json::from_str(r#"{"reply":"checking"}"#).expect("minimal payload parses");
        assert_eq!(parsed.availability_status, AvailabilityStatus::Unknown);
        assert!(parsed.suggested_alternatives.is_empty());
        assert!(!parsed.special_request_rejected);

        let parsed: RecoveryOutcome =
            serde_json::from_str(r#"{"reply":"let me start over"}"#).expect("parses");
        assert_eq!(parsed.reset_stage, Stage::SharePreferences);
    }
}
