//! Workflow enumerations shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse phase of the negotiation from the guest's point of view.
///
/// Ordered but branching: availability can cycle with preference sharing,
/// alternatives review can loop back, and confirmation can backtrack to
/// contact collection. `WrapUp` and `End` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intro,
    SharePreferences,
    AwaitAvailability,
    ReviewAlternatives,
    ProvideContact,
    MenuDiscussion,
    AwaitConfirmation,
    SaveData,
    WrapUp,
    End,
}

impl Stage {
    /// Check if the stage is terminal (no further skill will run)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::WrapUp | Stage::End)
    }
}

/// How the restaurant responded to the requested slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    Unknown,
    WaitingOnStaff,
    SlotAccepted,
    AlternativesOffered,
    Declined,
}

/// State of the staff's confirmation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    #[default]
    Pending,
    ConfirmedByStaff,
    NeedsClarification,
}

/// Negotiable booking attributes tracked field-by-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationField {
    Date,
    Time,
    PartySize,
    Occasion,
    SpecialRequests,
    ContactName,
    ContactPhone,
}

impl ReservationField {
    /// Order in which unconfirmed fields are brought up with staff.
    pub const PRIORITY: [ReservationField; 7] = [
        ReservationField::PartySize,
        ReservationField::ContactName,
        ReservationField::ContactPhone,
        ReservationField::Occasion,
        ReservationField::SpecialRequests,
        ReservationField::Date,
        ReservationField::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationField::Date => "date",
            ReservationField::Time => "time",
            ReservationField::PartySize => "party_size",
            ReservationField::Occasion => "occasion",
            ReservationField::SpecialRequests => "special_requests",
            ReservationField::ContactName => "contact_name",
            ReservationField::ContactPhone => "contact_phone",
        }
    }
}

impl fmt::Display for ReservationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived label naming the current conversational focus.
///
/// Always a pure projection of the workflow cursor; never set by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Greeting,
    ConfirmingAvailability,
    ConfirmingDate,
    ConfirmingTime,
    ConfirmingPartySize,
    ConfirmingSpecialRequests,
    ConfirmingContactDetails,
    ConfirmingOccasion,
    MenuDiscussion,
    AwaitingConfirmation,
    Closing,
    ResolvingIssue,
    #[default]
    Idle,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Topic::Greeting => "greeting",
            Topic::ConfirmingAvailability => "confirming availability",
            Topic::ConfirmingDate => "confirming date",
            Topic::ConfirmingTime => "confirming time",
            Topic::ConfirmingPartySize => "confirming party size",
            Topic::ConfirmingSpecialRequests => "confirming special requests",
            Topic::ConfirmingContactDetails => "confirming contact details",
            Topic::ConfirmingOccasion => "confirming occasion",
            Topic::MenuDiscussion => "menu discussion",
            Topic::AwaitingConfirmation => "awaiting final confirmation",
            Topic::Closing => "closing the reservation",
            Topic::ResolvingIssue => "resolving an issue",
            Topic::Idle => "no specific topic",
        };
        f.write_str(text)
    }
}
