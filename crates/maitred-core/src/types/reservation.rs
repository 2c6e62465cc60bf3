//! Reservation and transcript value types.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::stage::ReservationField;

/// Party size bounded to what a single table booking can hold.
///
/// The bound lives in the constructor, not in validation sprinkled through
/// the model: an out-of-range value is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PartySize(u8);

/// Error for out-of-range party sizes.
#[derive(Debug, Clone, Error)]
#[error("party size must be between {min} and {max}, got {got}", min = PartySize::MIN, max = PartySize::MAX)]
pub struct PartySizeError {
    pub got: u8,
}

impl PartySize {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;

    pub fn new(value: u8) -> Result<Self, PartySizeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PartySizeError { got: value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for PartySize {
    /// A table for two.
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for PartySize {
    type Error = PartySizeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartySize> for u8 {
    fn from(value: PartySize) -> Self {
        value.0
    }
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The automated guest persona.
    Guest,
    /// The restaurant counterparty.
    Staff,
}

/// A single entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub message: String,
}

/// Structured information required to book a table.
///
/// Every field is optional: the struct doubles as the negotiation goal
/// (fully populated at session start) and as the running record of what
/// staff has explicitly agreed to (filled field-by-field).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetails {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub party_size: Option<PartySize>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl ReservationDetails {
    /// Whether the payload carries a usable value for `field`.
    pub fn has(&self, field: ReservationField) -> bool {
        match field {
            ReservationField::Date => self.date.is_some(),
            ReservationField::Time => self.time.is_some(),
            ReservationField::PartySize => self.party_size.is_some(),
            ReservationField::Occasion => has_text(&self.occasion),
            ReservationField::SpecialRequests => has_text(&self.special_requests),
            ReservationField::ContactName => has_text(&self.contact_name),
            ReservationField::ContactPhone => has_text(&self.contact_phone),
        }
    }

    /// Copy a single field's value from `source` into `self`.
    pub fn adopt_field(&mut self, field: ReservationField, source: &ReservationDetails) {
        match field {
            ReservationField::Date => self.date = source.date,
            ReservationField::Time => self.time = source.time,
            ReservationField::PartySize => self.party_size = source.party_size,
            ReservationField::Occasion => self.occasion = source.occasion.clone(),
            ReservationField::SpecialRequests => {
                self.special_requests = source.special_requests.clone()
            }
            ReservationField::ContactName => self.contact_name = source.contact_name.clone(),
            ReservationField::ContactPhone => self.contact_phone = source.contact_phone.clone(),
        }
    }

    /// Overlay every field `source` carries onto `self`, leaving the rest.
    pub fn merge_present(&mut self, source: &ReservationDetails) {
        for field in ReservationField::PRIORITY {
            if source.has(field) {
                self.adopt_field(field, source);
            }
        }
    }
}

/// Optional menu discussion outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuPreferences {
    #[serde(default)]
    pub requested: bool,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub dietary_notes: Option<String>,
}

/// A candidate slot suggested by staff when the requested one is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub accepted: bool,
}

impl AlternativeOption {
    pub fn proposed(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            notes: None,
            accepted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_size_bounds() {
        assert!(PartySize::new(1).is_ok());
        assert!(PartySize::new(16).is_ok());
        assert!(PartySize::new(0).is_err());
        assert!(PartySize::new(17).is_err());
        assert_eq!(PartySize::new(4).unwrap().get(), 4);
    }

    #[test]
    fn test_has_ignores_blank_text() {
        let details = ReservationDetails {
            contact_name: Some("  ".to_string()),
            occasion: Some("birthday".to_string()),
            ..Default::default()
        };
        assert!(!details.has(ReservationField::ContactName));
        assert!(details.has(ReservationField::Occasion));
        assert!(!details.has(ReservationField::Date));
    }

    #[test]
    fn test_merge_present_keeps_existing_fields() {
        let mut base = ReservationDetails {
            contact_name: Some("Sarah".to_string()),
            party_size: Some(PartySize::new(2).unwrap()),
            ..Default::default()
        };
        let incoming = ReservationDetails {
            occasion: Some("anniversary".to_string()),
            ..Default::default()
        };
        base.merge_present(&incoming);
        assert_eq!(base.contact_name.as_deref(), Some("Sarah"));
        assert_eq!(base.occasion.as_deref(), Some("anniversary"));
        assert!(base.party_size.is_some());
    }
}
