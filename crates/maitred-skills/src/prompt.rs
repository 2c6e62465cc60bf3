//! Per-skill prompt assembly.
//!
//! Prompts are plain string builders: a system prompt describing the
//! persona, the goal facts, and the exact JSON contract for the skill, and
//! a user prompt carrying the transcript tail plus the latest staff
//! message.

use std::fmt::Write;

use maitred_core::prelude::*;

/// How many transcript turns are replayed into the user prompt.
const TRANSCRIPT_TAIL: usize = 12;

/// Build the (system, user) prompt pair for one skill execution.
pub fn build_prompt(kind: SkillKind, state: &SessionState, incoming: &str) -> (String, String) {
    (build_system(kind, state), build_user(kind, state, incoming))
}

fn build_system(kind: SkillKind, state: &SessionState) -> String {
    let mut system = String::new();
    system.push_str(state.persona.description.trim());
    system.push_str("\n\nGround rules:\n");
    for (index, principle) in state.persona.principles.iter().enumerate() {
        let _ = writeln!(system, "{}) {}", index + 1, principle);
    }

    system.push_str("\nWhat you know (never invent beyond this):\n");
    let goals = &state.goals;
    let _ = writeln!(system, "- restaurant: {}", goals.restaurant_name);
    let _ = writeln!(system, "- your name: {}", goals.guest_name);
    let _ = writeln!(system, "- your phone: {}", goals.guest_phone);
    let desired = &goals.desired;
    let _ = writeln!(
        system,
        "- desired slot: {} at {} for {} people",
        desired.date.format("%Y-%m-%d"),
        desired.time.format("%H:%M"),
        desired.party_size
    );
    if let Some(occasion) = &desired.occasion {
        let _ = writeln!(system, "- occasion: {occasion}");
    }
    if let Some(requests) = &desired.special_requests {
        let _ = writeln!(system, "- special requests: {requests}");
    }
    if let Some(notes) = &goals.dietary_notes {
        let _ = writeln!(system, "- dietary notes: {notes}");
    }
    if !goals.favorite_dishes.is_empty() {
        let _ = writeln!(system, "- favorite dishes: {}", goals.favorite_dishes.join(", "));
    }
    if !goals.fallback_slots.is_empty() {
        let _ = writeln!(
            system,
            "- acceptable fallback slots: {}",
            goals.fallback_slots.join(", ")
        );
    }

    system.push_str("\nConversation status:\n");
    let workflow = &state.workflow;
    let _ = writeln!(system, "- current focus: {}", workflow.current_topic);
    if !state.scratchpad.pending_questions.is_empty() {
        let _ = writeln!(
            system,
            "- open questions from staff: {}",
            state.scratchpad.pending_questions.join(" | ")
        );
    }
    if !workflow.missing_explicit_confirmations.is_empty() {
        let fields: Vec<&str> = workflow
            .missing_explicit_confirmations
            .iter()
            .map(|f| f.as_str())
            .collect();
        let _ = writeln!(
            system,
            "- still awaiting explicit staff confirmation of: {}",
            fields.join(", ")
        );
    }
    if !state.scratchpad.proposed_alternatives.is_empty() {
        system.push_str("- alternatives on the table:\n");
        for option in &state.scratchpad.proposed_alternatives {
            let _ = writeln!(system, "  * {}", option.description);
        }
    }

    let _ = writeln!(system, "\nCurrent task: {}", kind.description());
    system.push_str("\nOutput rules:\n");
    system.push_str("1) Return ONLY one valid JSON object matching the shape below.\n");
    system.push_str("2) The \"reply\" field is what you say out loud; keep it to two sentences.\n");
    system.push_str("3) Dates use YYYY-MM-DD, times use HH:MM:SS, party_size is an integer 1-16.\n");
    system.push_str("4) Omit optional fields you have no evidence for; never guess.\n");
    system.push_str("\nJSON shape:\n");
    system.push_str(outcome_shape(kind));
    system.push('\n');
    system
}

fn build_user(kind: SkillKind, state: &SessionState, incoming: &str) -> String {
    let mut user = String::new();

    let turns = &state.scratchpad.turns;
    if !turns.is_empty() {
        user.push_str("Conversation so far:\n");
        let skip = turns.len().saturating_sub(TRANSCRIPT_TAIL);
        for turn in turns.iter().skip(skip) {
            let speaker = match turn.speaker {
                Speaker::Guest => "you",
                Speaker::Staff => "staff",
            };
            let _ = writeln!(user, "- {}: {}", speaker, turn.message);
        }
        user.push('\n');
    }

    if incoming.is_empty() {
        user.push_str("The staff has not said anything yet; you open the conversation.\n");
    } else {
        let _ = writeln!(user, "Staff just said: {incoming}");
    }
    let _ = writeln!(user, "\nRespond for the task \"{kind}\". Return JSON only.");
    user
}

/// The JSON contract for each skill's structured outcome. Field semantics
/// mirror the outcome structs in `maitred-core`.
fn outcome_shape(kind: SkillKind) -> &'static str {
    match kind {
        SkillKind::Greeting => r#"{"reply":"..."}"#,
        SkillKind::Availability => {
            r#"{"reply":"...","availability_status":"unknown|waiting_on_staff|slot_accepted|alternatives_offered|declined","suggested_alternatives":["..."],"selected_slot_note":"...","pending_questions":["..."],"special_request_rejected":false}"#
        }
        SkillKind::DetailsCollection => {
            r#"{"reply":"...","details":{"date":"YYYY-MM-DD","time":"HH:MM:SS","party_size":2,"occasion":"...","special_requests":"...","contact_name":"...","contact_phone":"..."},"needs_menu_dialog":false}"#
        }
        SkillKind::MenuDiscussion => {
            r#"{"reply":"...","menu_preferences":{"requested":true,"highlights":["..."],"dietary_notes":"..."},"next_stage":"menu_discussion|await_confirmation"}"#
        }
        SkillKind::Confirmation => {
            r#"{"reply":"...","confirmation_status":"pending|confirmed_by_staff|needs_clarification","booking_reference":"...","error_message":"...","confirmed_details":{"date":"YYYY-MM-DD","time":"HH:MM:SS","party_size":2,"special_requests":"..."}}"#
        }
        SkillKind::AlternativeReview => {
            r#"{"reply":"...","alternative_selected":false,"accepted_slot_description":"...","should_end_conversation":false}"#
        }
        SkillKind::ErrorRecovery => {
            r#"{"reply":"...","reset_stage":"intro|share_preferences|await_availability|provide_contact|await_confirmation"}"#
        }
        SkillKind::SaveReservation => r#"{"reply":"...","follow_up_needed":false}"#,
    }
}
