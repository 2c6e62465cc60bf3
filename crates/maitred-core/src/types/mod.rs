//! Session state type definitions
//!
//! The memory model is pure data: constructors and small derived-field
//! helpers, no transition logic. Transitions live in the reducer.

mod memory;
mod reservation;
mod stage;

pub use memory::{
    ConfirmedFields, DesiredSlot, EpisodicLog, GoalFacts, Persona, Scratchpad, SessionState,
    WorkflowState,
};
pub use reservation::{
    AlternativeOption, ConversationTurn, MenuPreferences, PartySize, PartySizeError,
    ReservationDetails, Speaker,
};
pub use stage::{AvailabilityStatus, ConfirmationStatus, ReservationField, Stage, Topic};
