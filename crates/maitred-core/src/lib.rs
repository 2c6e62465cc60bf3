//! # Maitred Core
//!
//! Deterministic conversation workflow for the table-booking guest persona.
//!
//! This crate contains:
//! - Session state definitions (persona, goal facts, workflow cursor, scratchpad)
//! - Coordinator: pure `state -> next skill` routing
//! - Reducer: folds each skill outcome into a new immutable state
//! - Skill outcome contracts and the executor / snapshot trait seams
//!
//! This crate does NOT care about:
//! - How prompts are rendered or which LLM answers them
//! - How snapshots are encoded on disk
//! - How the conversation is presented to a human

pub mod coordinator;
pub mod reducer;
pub mod session;
pub mod skill;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::coordinator::next_skill;
    pub use crate::reducer::{apply_outcome, derive_topic, fields_flagged_in_text};
    pub use crate::session::{SessionRuntime, StepError, StepResult};
    pub use crate::skill::{
        AlternativeOutcome, AvailabilityOutcome, ConfirmationOutcome, DetailsOutcome,
        ExecuteError, GreetingOutcome, MenuOutcome, RecoveryOutcome, SaveOutcome, SkillExecutor,
        SkillKind, SkillOutcome, SnapshotError, SnapshotSink,
    };
    pub use crate::types::{
        AlternativeOption, AvailabilityStatus, ConfirmationStatus, ConfirmedFields,
        ConversationTurn, DesiredSlot, EpisodicLog, GoalFacts, MenuPreferences, PartySize,
        Persona, ReservationDetails, ReservationField, Scratchpad, SessionState, Speaker, Stage,
        Topic, WorkflowState,
    };
}

pub use coordinator::next_skill;
pub use reducer::apply_outcome;
pub use session::{SessionRuntime, StepError, StepResult};
pub use skill::{ExecuteError, SkillExecutor, SkillKind, SkillOutcome, SnapshotError, SnapshotSink};
pub use types::{GoalFacts, Persona, SessionState, Stage};
