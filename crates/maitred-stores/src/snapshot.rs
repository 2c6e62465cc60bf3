//! JSON snapshot persistence for finished negotiations.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use tracing::info;

use maitred_core::skill::{SnapshotError, SnapshotSink};
use maitred_core::types::{ReservationDetails, SessionState, Speaker};

/// Writes one pretty-printed JSON file per persisted session into a
/// directory, named `<guest slug>_<utc stamp>.json`.
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSink for JsonSnapshotStore {
    fn persist(&self, state: &SessionState) -> Result<String, SnapshotError> {
        fs::create_dir_all(&self.dir)?;

        let now = Utc::now();
        let filename = format!(
            "{}_{}.json",
            slugify(&state.goals.guest_name),
            now.format("%Y%m%d_%H%M%S")
        );
        let path = self.dir.join(filename);

        let payload = json!({
            "generated_at": now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "guest": {
                "name": state.goals.guest_name,
                "phone": state.goals.guest_phone,
            },
            "restaurant": state.goals.restaurant_name,
            "workflow": {
                "stage": state.workflow.stage,
                "availability_status": state.workflow.availability_status,
                "confirmation_status": state.workflow.confirmation_status,
                "selected_slot_note": state.workflow.selected_slot_note,
            },
            "goal_reservation": serialize_reservation(&state.scratchpad.goal_reservation),
            "confirmed_reservation": serialize_reservation(&state.scratchpad.confirmed_reservation),
            "menu_preferences": {
                "requested": state.scratchpad.menu_preferences.requested,
                "highlights": state.scratchpad.menu_preferences.highlights,
                "dietary_notes": state.scratchpad.menu_preferences.dietary_notes,
            },
            "conversation_summary": {
                "turns": state.scratchpad.turns.iter().map(|turn| {
                    json!({
                        "speaker": match turn.speaker {
                            Speaker::Guest => "guest",
                            Speaker::Staff => "staff",
                        },
                        "message": turn.message,
                    })
                }).collect::<Vec<_>>(),
            },
        });

        fs::write(&path, serde_json::to_string_pretty(&payload)?)?;
        info!(path = %path.display(), "reservation snapshot written");
        Ok(path.display().to_string())
    }
}

// Dates go out as ISO, times at minute precision.
fn serialize_reservation(details: &ReservationDetails) -> serde_json::Value {
    json!({
        "date": details.date.map(|d| d.format("%Y-%m-%d").to_string()),
        "time": details.time.map(|t| t.format("%H:%M").to_string()),
        "party_size": details.party_size.map(|p| p.get()),
        "occasion": details.occasion,
        "special_requests": details.special_requests,
        "contact_name": details.contact_name,
        "contact_phone": details.contact_phone,
    })
}

fn slugify(value: &str) -> String {
    let slug: String = value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        "reservation".to_string()
    } else {
        slug
    }
}
