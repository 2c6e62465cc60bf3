//! The layered session memory tree.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::reservation::{
    AlternativeOption, ConversationTurn, MenuPreferences, PartySize, ReservationDetails, Speaker,
};
use super::stage::{AvailabilityStatus, ConfirmationStatus, ReservationField, Stage, Topic};

/// Static identity and guardrails for the guest persona. Immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub description: String,
    pub languages: Vec<String>,
    pub principles: Vec<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Sarah".to_string(),
            description: "You are Sarah Mitchell, a thoughtful person who wants to book a table \
                          at a restaurant. Always speak as a guest (never as staff), share only \
                          personal data from memory, and respond with gratitude even when \
                          availability is limited. Keep your responses to maximum two concise \
                          sentences and reveal only details that are currently being asked by \
                          staff."
                .to_string(),
            languages: vec!["en".to_string()],
            principles: vec![
                "Always speak as a guest and never pretend to be staff.".to_string(),
                "Thank them for every response and show patience.".to_string(),
                "Do not make up new contact information.".to_string(),
                "Ask for clarification instead of guessing when you don't know something."
                    .to_string(),
                "Respond in maximum two sentences and only within the scope of what is being \
                 asked."
                    .to_string(),
            ],
        }
    }
}

/// Preferred booking parameters the guest would like to request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesiredSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: PartySize,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl Default for DesiredSlot {
    fn default() -> Self {
        let tomorrow = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap_or_else(|| Utc::now().date_naive());
        Self {
            date: tomorrow,
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default(),
            party_size: PartySize::default(),
            occasion: None,
            special_requests: None,
        }
    }
}

/// Long-term knowledge the guest relies on. Set once at session creation
/// and treated as ground truth; the reducer never writes here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalFacts {
    pub restaurant_name: String,
    pub guest_name: String,
    pub guest_phone: String,
    #[serde(default)]
    pub celebration_reason: Option<String>,
    #[serde(default)]
    pub favorite_dishes: Vec<String>,
    #[serde(default)]
    pub dietary_notes: Option<String>,
    #[serde(default)]
    pub talking_points: Vec<String>,
    #[serde(default)]
    pub desired: DesiredSlot,
    #[serde(default)]
    pub fallback_slots: Vec<String>,
}

/// Append-only log of noteworthy events. Write-only in this version;
/// present for extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodicLog {
    events: Vec<String>,
}

impl EpisodicLog {
    pub fn record(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }
}

/// Per-field confirmation flags for the negotiable booking attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedFields {
    pub date: bool,
    pub time: bool,
    pub party_size: bool,
    pub occasion: bool,
    pub special_requests: bool,
    pub contact_name: bool,
    pub contact_phone: bool,
}

impl ConfirmedFields {
    /// The sole gate for leaving the contact/confirmation phase: every one
    /// of the seven tracked flags must be set.
    pub fn all_required_confirmed(&self) -> bool {
        self.date
            && self.time
            && self.party_size
            && self.occasion
            && self.special_requests
            && self.contact_name
            && self.contact_phone
    }

    pub fn is_confirmed(&self, field: ReservationField) -> bool {
        match field {
            ReservationField::Date => self.date,
            ReservationField::Time => self.time,
            ReservationField::PartySize => self.party_size,
            ReservationField::Occasion => self.occasion,
            ReservationField::SpecialRequests => self.special_requests,
            ReservationField::ContactName => self.contact_name,
            ReservationField::ContactPhone => self.contact_phone,
        }
    }

    pub fn set(&mut self, field: ReservationField, confirmed: bool) {
        match field {
            ReservationField::Date => self.date = confirmed,
            ReservationField::Time => self.time = confirmed,
            ReservationField::PartySize => self.party_size = confirmed,
            ReservationField::Occasion => self.occasion = confirmed,
            ReservationField::SpecialRequests => self.special_requests = confirmed,
            ReservationField::ContactName => self.contact_name = confirmed,
            ReservationField::ContactPhone => self.contact_phone = confirmed,
        }
    }

    pub fn confirm_all(&mut self) {
        for field in ReservationField::PRIORITY {
            self.set(field, true);
        }
    }

    /// First unconfirmed field in ask-priority order.
    pub fn first_unconfirmed(&self) -> Option<ReservationField> {
        ReservationField::PRIORITY
            .into_iter()
            .find(|field| !self.is_confirmed(*field))
    }
}

/// The state-machine cursor that drives the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub stage: Stage,
    pub availability_status: AvailabilityStatus,
    pub confirmation_status: ConfirmationStatus,
    pub confirmed_fields: ConfirmedFields,
    /// Field names still needing explicit staff sign-off after a premature
    /// "confirmed" verdict.
    pub missing_explicit_confirmations: Vec<ReservationField>,
    /// Sticky error token; while set, routing forces error recovery.
    pub blocking_issue: Option<String>,
    pub selected_slot_note: Option<String>,
    pub saved_file_path: Option<String>,
    /// Derived; recomputed by the reducer's topic projection, never set
    /// directly by a handler.
    pub current_topic: Topic,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            stage: Stage::Intro,
            availability_status: AvailabilityStatus::Unknown,
            confirmation_status: ConfirmationStatus::Pending,
            confirmed_fields: ConfirmedFields::default(),
            missing_explicit_confirmations: Vec::new(),
            blocking_issue: None,
            selected_slot_note: None,
            saved_file_path: None,
            current_topic: Topic::Greeting,
        }
    }
}

/// Short-term scratchpad for the current dialogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scratchpad {
    pub turns: Vec<ConversationTurn>,
    pub last_staff_message: Option<String>,
    pub last_guest_message: Option<String>,
    /// Snapshot of the goal facts taken at session start, kept for
    /// comparison against what staff agrees to.
    pub goal_reservation: ReservationDetails,
    /// What the counterparty has explicitly agreed to so far.
    pub confirmed_reservation: ReservationDetails,
    pub menu_preferences: MenuPreferences,
    pub proposed_alternatives: Vec<AlternativeOption>,
    pub pending_questions: Vec<String>,
}

/// Root of the memory tree for one negotiation session.
///
/// Threaded through every step as an immutable value: the reducer works on
/// a private copy and returns it, so a handed-out snapshot never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: String,
    pub persona: Persona,
    pub goals: GoalFacts,
    pub episodic: EpisodicLog,
    pub workflow: WorkflowState,
    pub scratchpad: Scratchpad,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Create a fresh session, deriving the goal reservation from the
    /// supplied goal facts.
    pub fn new(persona: Persona, goals: GoalFacts) -> Self {
        let now = Utc::now();
        let goal_reservation = ReservationDetails {
            date: Some(goals.desired.date),
            time: Some(goals.desired.time),
            party_size: Some(goals.desired.party_size),
            occasion: goals.desired.occasion.clone(),
            special_requests: goals.desired.special_requests.clone(),
            contact_name: Some(goals.guest_name.clone()),
            contact_phone: Some(goals.guest_phone.clone()),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            persona,
            goals,
            episodic: EpisodicLog::default(),
            workflow: WorkflowState::default(),
            scratchpad: Scratchpad {
                goal_reservation,
                ..Scratchpad::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a transcript entry and update the matching last-message slot.
    /// No deduplication: every call grows the transcript by exactly one.
    pub fn append_turn(&mut self, speaker: Speaker, message: impl Into<String>) {
        let message = message.into();
        match speaker {
            Speaker::Staff => self.scratchpad.last_staff_message = Some(message.clone()),
            Speaker::Guest => self.scratchpad.last_guest_message = Some(message.clone()),
        }
        self.scratchpad.turns.push(ConversationTurn { speaker, message });
    }
}
