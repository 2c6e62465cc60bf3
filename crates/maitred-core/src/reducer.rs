//! Transition reducer: folds a skill outcome into a new session state.
//!
//! One handler per skill kind. Every handler works on a private copy of
//! the state, appends the reply as a guest turn, applies the outcome's
//! structured fields, and recomputes stage and topic. The caller never
//! observes partial mutation.

use tracing::{debug, warn};

use crate::skill::{
    AlternativeOutcome, AvailabilityOutcome, ConfirmationOutcome, DetailsOutcome, GreetingOutcome,
    MenuOutcome, RecoveryOutcome, SaveOutcome, SkillOutcome, SnapshotSink,
};
use crate::types::{
    AlternativeOption, AvailabilityStatus, ConfirmationStatus, ReservationField, SessionState,
    Speaker, Stage, Topic, WorkflowState,
};

/// Apply a skill outcome to the state, producing the next snapshot.
///
/// The snapshot sink is consulted only by the save-reservation handler;
/// every other transition is pure.
pub fn apply_outcome(
    state: &SessionState,
    outcome: &SkillOutcome,
    sink: &dyn SnapshotSink,
) -> SessionState {
    let mut next = state.clone();
    next.append_turn(Speaker::Guest, outcome.reply());

    match outcome {
        SkillOutcome::Greeting(o) => handle_greeting(&mut next, o),
        SkillOutcome::Availability(o) => handle_availability(&mut next, o),
        SkillOutcome::DetailsCollection(o) => handle_details(&mut next, o),
        SkillOutcome::MenuDiscussion(o) => handle_menu(&mut next, o),
        SkillOutcome::Confirmation(o) => handle_confirmation(&mut next, o),
        SkillOutcome::AlternativeReview(o) => handle_alternative(&mut next, o),
        SkillOutcome::ErrorRecovery(o) => handle_recovery(&mut next, o),
        SkillOutcome::SaveReservation(o) => handle_save(&mut next, o, sink),
    }

    next.workflow.current_topic = derive_topic(&next.workflow);
    next.updated_at = chrono::Utc::now();
    debug!(
        stage = ?next.workflow.stage,
        topic = %next.workflow.current_topic,
        skill = %outcome.kind(),
        "applied skill outcome"
    );
    next
}

fn handle_greeting(state: &mut SessionState, _outcome: &GreetingOutcome) {
    state.workflow.stage = Stage::SharePreferences;
    state.scratchpad.pending_questions.clear();
}

fn handle_availability(state: &mut SessionState, outcome: &AvailabilityOutcome) {
    state.workflow.availability_status = outcome.availability_status;
    state.workflow.selected_slot_note = outcome.selected_slot_note.clone();
    state.scratchpad.pending_questions = outcome.pending_questions.clone();

    if outcome.special_request_rejected {
        // Terminal dead-end: the sticky issue is intentionally never
        // cleared, and WRAP_UP keeps the coordinator from routing to
        // recovery.
        state.workflow.stage = Stage::WrapUp;
        state.workflow.blocking_issue = Some("special_request_rejected".to_string());
        state.scratchpad.proposed_alternatives.clear();
        state
            .episodic
            .record("staff rejected the special request; negotiation abandoned");
        return;
    }

    state.workflow.blocking_issue = None;
    if !outcome.suggested_alternatives.is_empty() {
        state.scratchpad.proposed_alternatives = outcome
            .suggested_alternatives
            .iter()
            .map(AlternativeOption::proposed)
            .collect();
    } else if outcome.availability_status == AvailabilityStatus::SlotAccepted {
        state.scratchpad.proposed_alternatives.clear();
    }

    match outcome.availability_status {
        AvailabilityStatus::SlotAccepted => {
            state.workflow.confirmed_fields.set(ReservationField::Date, true);
            state.workflow.confirmed_fields.set(ReservationField::Time, true);
            state.workflow.stage = Stage::ProvideContact;
            adopt_goal_slot(state);
        }
        AvailabilityStatus::WaitingOnStaff => state.workflow.stage = Stage::AwaitAvailability,
        AvailabilityStatus::AlternativesOffered | AvailabilityStatus::Declined => {
            state.workflow.stage = Stage::ReviewAlternatives
        }
        AvailabilityStatus::Unknown => state.workflow.stage = Stage::SharePreferences,
    }
}

// When a slot is accepted the agreed date/time are the requested ones;
// record them so the post-confirmation audit can see them.
fn adopt_goal_slot(state: &mut SessionState) {
    let goal = state.scratchpad.goal_reservation.clone();
    let confirmed = &mut state.scratchpad.confirmed_reservation;
    confirmed.adopt_field(ReservationField::Date, &goal);
    confirmed.adopt_field(ReservationField::Time, &goal);
}

fn handle_details(state: &mut SessionState, outcome: &DetailsOutcome) {
    let mut payload = outcome.details.clone();
    if !payload.has(ReservationField::ContactName) && payload.contact_name.is_some() {
        payload.contact_name = Some(state.goals.guest_name.clone());
    }
    if !payload.has(ReservationField::ContactPhone) && payload.contact_phone.is_some() {
        payload.contact_phone = Some(state.goals.guest_phone.clone());
    }

    for field in ReservationField::PRIORITY {
        if payload.has(field) && !state.workflow.confirmed_fields.is_confirmed(field) {
            state.workflow.confirmed_fields.set(field, true);
            state
                .scratchpad
                .confirmed_reservation
                .adopt_field(field, &payload);
        }
    }
    state.scratchpad.pending_questions.clear();

    if state.workflow.confirmed_fields.all_required_confirmed() {
        state.workflow.stage = if outcome.needs_menu_dialog {
            Stage::MenuDiscussion
        } else {
            Stage::AwaitConfirmation
        };
    } else {
        state.workflow.stage = Stage::ProvideContact;
    }
}

fn handle_menu(state: &mut SessionState, outcome: &MenuOutcome) {
    state.scratchpad.menu_preferences = outcome.menu_preferences.clone();
    // The executor knows whether the menu chat is finished; its stage
    // recommendation is taken verbatim.
    state.workflow.stage = outcome.next_stage;
}

/// Subset of fields audited after a "confirmed" verdict. Narrower than the
/// seven-flag gate on purpose; see DESIGN.md.
const CONFIRMATION_AUDIT_FIELDS: [ReservationField; 4] = [
    ReservationField::Date,
    ReservationField::Time,
    ReservationField::PartySize,
    ReservationField::SpecialRequests,
];

fn handle_confirmation(state: &mut SessionState, outcome: &ConfirmationOutcome) {
    state.workflow.confirmation_status = outcome.confirmation_status;
    state.workflow.blocking_issue = if outcome.confirmation_status == ConfirmationStatus::Pending {
        outcome.error_message.clone()
    } else {
        None
    };
    if let Some(reference) = &outcome.booking_reference {
        state.workflow.selected_slot_note = Some(reference.clone());
    }

    match outcome.confirmation_status {
        ConfirmationStatus::ConfirmedByStaff => {
            state
                .scratchpad
                .confirmed_reservation
                .merge_present(&outcome.confirmed_details);

            let missing: Vec<ReservationField> = CONFIRMATION_AUDIT_FIELDS
                .into_iter()
                .filter(|field| !state.scratchpad.confirmed_reservation.has(*field))
                .collect();

            if missing.is_empty() {
                state.workflow.confirmed_fields.confirm_all();
                state.workflow.missing_explicit_confirmations.clear();
                state.workflow.stage = Stage::SaveData;
                state.scratchpad.pending_questions.clear();
            } else {
                // Staff said "confirmed" but left required fields open:
                // stay put and keep asking.
                warn!(?missing, "confirmation verdict missing required fields");
                state.workflow.confirmation_status = ConfirmationStatus::Pending;
                state.workflow.missing_explicit_confirmations = missing;
                state.workflow.stage = Stage::AwaitConfirmation;
            }
        }
        ConfirmationStatus::NeedsClarification => {
            state.workflow.stage = Stage::ProvideContact;
            state.workflow.blocking_issue = None;
            state.scratchpad.pending_questions =
                outcome.error_message.clone().into_iter().collect();
            if let Some(message) = &outcome.error_message {
                for field in fields_flagged_in_text(message) {
                    state.workflow.confirmed_fields.set(field, false);
                }
            }
        }
        ConfirmationStatus::Pending => state.workflow.stage = Stage::AwaitConfirmation,
    }
}

fn handle_alternative(state: &mut SessionState, outcome: &AlternativeOutcome) {
    let accepted = outcome
        .accepted_slot_description
        .as_deref()
        .filter(|d| !d.trim().is_empty());

    if let (true, Some(description)) = (outcome.alternative_selected, accepted) {
        state.workflow.availability_status = AvailabilityStatus::SlotAccepted;
        state.workflow.confirmed_fields.set(ReservationField::Date, true);
        state.workflow.confirmed_fields.set(ReservationField::Time, true);
        state.workflow.selected_slot_note = Some(description.to_string());
        state.workflow.stage = Stage::ProvideContact;
        state.scratchpad.proposed_alternatives = vec![AlternativeOption {
            description: description.to_string(),
            notes: Some("accepted by guest".to_string()),
            accepted: true,
        }];
        adopt_goal_slot(state);
    } else {
        state.workflow.availability_status = AvailabilityStatus::AlternativesOffered;
        state.workflow.stage = if outcome.should_end_conversation {
            Stage::End
        } else {
            Stage::AwaitAvailability
        };
    }
}

fn handle_recovery(state: &mut SessionState, outcome: &RecoveryOutcome) {
    state.workflow.blocking_issue = None;
    state.workflow.confirmation_status = ConfirmationStatus::Pending;
    state.workflow.stage = outcome.reset_stage;
}

fn handle_save(state: &mut SessionState, outcome: &SaveOutcome, sink: &dyn SnapshotSink) {
    if outcome.follow_up_needed {
        state.workflow.stage = Stage::AwaitConfirmation;
        return;
    }

    match sink.persist(state) {
        Ok(path) => {
            state
                .episodic
                .record(format!("reservation snapshot stored at {path}"));
            state.workflow.saved_file_path = Some(path);
        }
        Err(err) => {
            // Failing to write the snapshot must not abort the wrap-up.
            warn!(error = %err, "snapshot persistence failed");
            state.workflow.saved_file_path = Some(format!("save-failed: {err}"));
        }
    }
    state.workflow.stage = Stage::WrapUp;
}

/// Pure projection of the current conversational topic from the workflow
/// cursor. Called after every handler; nothing else assigns the topic.
pub fn derive_topic(workflow: &WorkflowState) -> Topic {
    if workflow.blocking_issue.is_some() {
        return Topic::ResolvingIssue;
    }
    match workflow.stage {
        Stage::Intro => Topic::Greeting,
        Stage::SharePreferences | Stage::AwaitAvailability | Stage::ReviewAlternatives => {
            Topic::ConfirmingAvailability
        }
        Stage::ProvideContact => match workflow.confirmed_fields.first_unconfirmed() {
            Some(ReservationField::Date) => Topic::ConfirmingDate,
            Some(ReservationField::Time) => Topic::ConfirmingTime,
            Some(ReservationField::PartySize) => Topic::ConfirmingPartySize,
            Some(ReservationField::SpecialRequests) => Topic::ConfirmingSpecialRequests,
            Some(ReservationField::Occasion) => Topic::ConfirmingOccasion,
            Some(ReservationField::ContactName)
            | Some(ReservationField::ContactPhone)
            | None => Topic::ConfirmingContactDetails,
        },
        Stage::MenuDiscussion => Topic::MenuDiscussion,
        Stage::AwaitConfirmation => Topic::AwaitingConfirmation,
        Stage::SaveData | Stage::WrapUp | Stage::End => Topic::Closing,
    }
}

/// Heuristic used when staff asks for clarification: any negotiable field
/// keyword-matched in the message gets un-confirmed so details collection
/// re-asks for it. Known to be fragile; kept behind this seam so a
/// structured "fields needing clarification" list can replace it without
/// touching the handlers.
pub fn fields_flagged_in_text(message: &str) -> Vec<ReservationField> {
    let lowered = message.to_lowercase();
    let mut flagged = Vec::new();
    if lowered.contains("date") {
        flagged.push(ReservationField::Date);
    }
    if lowered.contains("time") {
        flagged.push(ReservationField::Time);
    }
    if lowered.contains("phone") {
        flagged.push(ReservationField::ContactPhone);
    }
    if lowered.contains("name") {
        flagged.push(ReservationField::ContactName);
    }
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SnapshotError;
    use crate::types::{GoalFacts, PartySize, Persona, ReservationDetails};

    struct MemorySink;

    impl SnapshotSink for MemorySink {
        fn persist(&self, _state: &SessionState) -> Result<String, SnapshotError> {
            Ok("memory://snapshot".to_string())
        }
    }

    struct BrokenSink;

    impl SnapshotSink for BrokenSink {
        fn persist(&self, _state: &SessionState) -> Result<String, SnapshotError> {
            Err(SnapshotError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "disk full",
            )))
        }
    }

    fn fresh_state() -> SessionState {
        let goals = GoalFacts {
            restaurant_name: "Azure Bistro".to_string(),
            guest_name: "Sarah Mitchell".to_string(),
            guest_phone: "+1 555 0137".to_string(),
            ..Default::default()
        };
        SessionState::new(Persona::default(), goals)
    }

    fn reply(text: &str) -> String {
        text.to_string()
    }

    #[test]
    fn test_greeting_moves_to_share_preferences() {
        let mut state = fresh_state();
        state.scratchpad.pending_questions = vec!["old question".to_string()];
        let outcome = SkillOutcome::Greeting(GreetingOutcome {
            reply: reply("Good evening, I'd like to book a table."),
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::SharePreferences);
        assert!(next.scratchpad.pending_questions.is_empty());
        assert_eq!(next.workflow.current_topic, Topic::ConfirmingAvailability);
        // Reply landed as a guest turn on the new snapshot only.
        assert_eq!(next.scratchpad.turns.len(), 1);
        assert!(state.scratchpad.turns.is_empty());
    }

    #[test]
    fn test_availability_slot_accepted_confirms_date_and_time() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::SharePreferences;
        let outcome = SkillOutcome::Availability(AvailabilityOutcome {
            reply: reply("Wonderful, 7pm works for us!"),
            availability_status: AvailabilityStatus::SlotAccepted,
            suggested_alternatives: vec![],
            selected_slot_note: Some("19:00 window table".to_string()),
            pending_questions: vec![],
            special_request_rejected: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::ProvideContact);
        assert!(next.workflow.confirmed_fields.date);
        assert!(next.workflow.confirmed_fields.time);
        assert!(next.scratchpad.proposed_alternatives.is_empty());
        assert!(next.scratchpad.confirmed_reservation.date.is_some());
        assert!(next.scratchpad.confirmed_reservation.time.is_some());
        // First unconfirmed field in priority order is party size.
        assert_eq!(next.workflow.current_topic, Topic::ConfirmingPartySize);
    }

    #[test]
    fn test_availability_alternatives_offered_records_options() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::SharePreferences;
        let outcome = SkillOutcome::Availability(AvailabilityOutcome {
            reply: reply("Could you do 6pm or 9pm instead?"),
            availability_status: AvailabilityStatus::AlternativesOffered,
            suggested_alternatives: vec!["6pm".to_string(), "9pm".to_string()],
            selected_slot_note: None,
            pending_questions: vec![],
            special_request_rejected: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::ReviewAlternatives);
        assert_eq!(next.scratchpad.proposed_alternatives.len(), 2);
        assert!(!next.scratchpad.proposed_alternatives[0].accepted);
    }

    #[test]
    fn test_availability_waiting_keeps_cycling() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::SharePreferences;
        let outcome = SkillOutcome::Availability(AvailabilityOutcome {
            reply: reply("Of course, take your time."),
            availability_status: AvailabilityStatus::WaitingOnStaff,
            suggested_alternatives: vec![],
            selected_slot_note: None,
            pending_questions: vec!["checking the book".to_string()],
            special_request_rejected: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);
        assert_eq!(next.workflow.stage, Stage::AwaitAvailability);
        assert_eq!(next.scratchpad.pending_questions.len(), 1);
    }

    #[test]
    fn test_special_request_rejection_is_a_terminal_dead_end() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::AwaitAvailability;
        state.scratchpad.proposed_alternatives =
            vec![AlternativeOption::proposed("8pm")];
        let outcome = SkillOutcome::Availability(AvailabilityOutcome {
            reply: reply("I understand, thank you anyway."),
            availability_status: AvailabilityStatus::Declined,
            suggested_alternatives: vec!["8pm".to_string()],
            selected_slot_note: None,
            pending_questions: vec![],
            special_request_rejected: true,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::WrapUp);
        assert_eq!(
            next.workflow.blocking_issue.as_deref(),
            Some("special_request_rejected")
        );
        assert!(next.scratchpad.proposed_alternatives.is_empty());
        // Terminal stage wins over the sticky issue: no further skill runs.
        assert!(crate::coordinator::next_skill(&next).is_none());
    }

    #[test]
    fn test_details_partial_payload_confirms_only_present_fields() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::ProvideContact;
        let outcome = SkillOutcome::DetailsCollection(DetailsOutcome {
            reply: reply("We'll be two people."),
            details: ReservationDetails {
                party_size: Some(PartySize::new(2).unwrap()),
                ..Default::default()
            },
            needs_menu_dialog: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert!(next.workflow.confirmed_fields.party_size);
        assert!(!next.workflow.confirmed_fields.date);
        assert!(!next.workflow.confirmed_fields.contact_name);
        assert_eq!(next.workflow.stage, Stage::ProvideContact);
        assert_eq!(next.workflow.current_topic, Topic::ConfirmingContactDetails);
        assert_eq!(
            next.scratchpad.confirmed_reservation.party_size,
            Some(PartySize::new(2).unwrap())
        );
    }

    #[test]
    fn test_details_full_payload_advances_to_confirmation() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::ProvideContact;
        let outcome = SkillOutcome::DetailsCollection(DetailsOutcome {
            reply: reply("Here is everything you asked for."),
            details: ReservationDetails {
                date: state.scratchpad.goal_reservation.date,
                time: state.scratchpad.goal_reservation.time,
                party_size: Some(PartySize::new(2).unwrap()),
                occasion: Some("anniversary".to_string()),
                special_requests: Some("window table".to_string()),
                contact_name: Some("Sarah Mitchell".to_string()),
                contact_phone: Some("+1 555 0137".to_string()),
            },
            needs_menu_dialog: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert!(next.workflow.confirmed_fields.all_required_confirmed());
        assert_eq!(next.workflow.stage, Stage::AwaitConfirmation);
        assert_eq!(next.workflow.current_topic, Topic::AwaitingConfirmation);
    }

    #[test]
    fn test_details_menu_detour_when_requested() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::ProvideContact;
        state.workflow.confirmed_fields.confirm_all();
        let outcome = SkillOutcome::DetailsCollection(DetailsOutcome {
            reply: reply("Could you tell me about the tasting menu?"),
            details: ReservationDetails::default(),
            needs_menu_dialog: true,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);
        assert_eq!(next.workflow.stage, Stage::MenuDiscussion);
        assert_eq!(next.workflow.current_topic, Topic::MenuDiscussion);
    }

    #[test]
    fn test_menu_handler_trusts_recommended_stage() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::MenuDiscussion;
        let outcome = SkillOutcome::MenuDiscussion(MenuOutcome {
            reply: reply("The tasting menu sounds lovely."),
            menu_preferences: crate::types::MenuPreferences {
                requested: true,
                highlights: vec!["tasting menu".to_string()],
                dietary_notes: None,
            },
            next_stage: Stage::AwaitConfirmation,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);
        assert_eq!(next.workflow.stage, Stage::AwaitConfirmation);
        assert!(next.scratchpad.menu_preferences.requested);
    }

    #[test]
    fn test_confirmed_verdict_with_missing_fields_downgrades_to_pending() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::AwaitConfirmation;
        state.workflow.confirmed_fields.confirm_all();
        // Staff confirmed, but the agreed record never captured a date.
        state.scratchpad.confirmed_reservation = ReservationDetails {
            time: state.scratchpad.goal_reservation.time,
            party_size: Some(PartySize::new(2).unwrap()),
            special_requests: Some("window table".to_string()),
            ..Default::default()
        };
        let outcome = SkillOutcome::Confirmation(ConfirmationOutcome {
            reply: reply("Thank you for confirming!"),
            confirmation_status: ConfirmationStatus::ConfirmedByStaff,
            booking_reference: None,
            error_message: None,
            confirmed_details: ReservationDetails::default(),
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.confirmation_status, ConfirmationStatus::Pending);
        assert_eq!(next.workflow.stage, Stage::AwaitConfirmation);
        assert_eq!(
            next.workflow.missing_explicit_confirmations,
            vec![ReservationField::Date]
        );
    }

    #[test]
    fn test_confirmed_verdict_with_complete_record_moves_to_save() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::AwaitConfirmation;
        let outcome = SkillOutcome::Confirmation(ConfirmationOutcome {
            reply: reply("Perfect, see you then!"),
            confirmation_status: ConfirmationStatus::ConfirmedByStaff,
            booking_reference: Some("AZ-1207".to_string()),
            error_message: None,
            confirmed_details: ReservationDetails {
                date: state.scratchpad.goal_reservation.date,
                time: state.scratchpad.goal_reservation.time,
                party_size: Some(PartySize::new(2).unwrap()),
                special_requests: Some("window table".to_string()),
                ..Default::default()
            },
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::SaveData);
        assert!(next.workflow.confirmed_fields.all_required_confirmed());
        assert_eq!(next.workflow.selected_slot_note.as_deref(), Some("AZ-1207"));
        assert!(next.workflow.missing_explicit_confirmations.is_empty());
        assert_eq!(next.workflow.current_topic, Topic::Closing);
    }

    #[test]
    fn test_clarification_backtracks_and_unconfirms_flagged_fields() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::AwaitConfirmation;
        state.workflow.confirmed_fields.confirm_all();
        let outcome = SkillOutcome::Confirmation(ConfirmationOutcome {
            reply: reply("Let me double-check that for you."),
            confirmation_status: ConfirmationStatus::NeedsClarification,
            booking_reference: None,
            error_message: Some("Which date did you mean, and what is your phone number?".to_string()),
            confirmed_details: ReservationDetails::default(),
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::ProvideContact);
        assert!(next.workflow.blocking_issue.is_none());
        assert_eq!(next.scratchpad.pending_questions.len(), 1);
        assert!(!next.workflow.confirmed_fields.date);
        assert!(!next.workflow.confirmed_fields.contact_phone);
        assert!(next.workflow.confirmed_fields.party_size);
        // Contact phone precedes date in ask order, so it sets the topic.
        assert_eq!(next.workflow.current_topic, Topic::ConfirmingContactDetails);
    }

    #[test]
    fn test_pending_confirmation_records_blocking_issue() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::AwaitConfirmation;
        let outcome = SkillOutcome::Confirmation(ConfirmationOutcome {
            reply: reply("I'll wait while you check."),
            confirmation_status: ConfirmationStatus::Pending,
            booking_reference: None,
            error_message: Some("system offline".to_string()),
            confirmed_details: ReservationDetails::default(),
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::AwaitConfirmation);
        assert_eq!(next.workflow.blocking_issue.as_deref(), Some("system offline"));
        assert_eq!(next.workflow.current_topic, Topic::ResolvingIssue);
        assert_eq!(
            crate::coordinator::next_skill(&next),
            Some(crate::skill::SkillKind::ErrorRecovery)
        );
    }

    #[test]
    fn test_alternative_accepted_replaces_list_and_advances() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::ReviewAlternatives;
        state.scratchpad.proposed_alternatives = vec![
            AlternativeOption::proposed("tomorrow 8pm"),
            AlternativeOption::proposed("friday 6pm"),
        ];
        let outcome = SkillOutcome::AlternativeReview(AlternativeOutcome {
            reply: reply("Tomorrow at 8pm would be lovely."),
            alternative_selected: true,
            accepted_slot_description: Some("tomorrow 8pm".to_string()),
            should_end_conversation: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::ProvideContact);
        assert!(next.workflow.confirmed_fields.date);
        assert!(next.workflow.confirmed_fields.time);
        assert_eq!(next.scratchpad.proposed_alternatives.len(), 1);
        assert!(next.scratchpad.proposed_alternatives[0].accepted);
        assert_eq!(
            next.scratchpad.proposed_alternatives[0].description,
            "tomorrow 8pm"
        );
        assert_eq!(
            next.workflow.availability_status,
            AvailabilityStatus::SlotAccepted
        );
    }

    #[test]
    fn test_alternative_declined_cycles_or_ends() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::ReviewAlternatives;
        let cycle = SkillOutcome::AlternativeReview(AlternativeOutcome {
            reply: reply("Neither works; is anything else open?"),
            alternative_selected: false,
            accepted_slot_description: None,
            should_end_conversation: false,
        });
        let next = apply_outcome(&state, &cycle, &MemorySink);
        assert_eq!(next.workflow.stage, Stage::AwaitAvailability);

        let give_up = SkillOutcome::AlternativeReview(AlternativeOutcome {
            reply: reply("Thank you anyway, goodbye."),
            alternative_selected: false,
            accepted_slot_description: None,
            should_end_conversation: true,
        });
        let done = apply_outcome(&state, &give_up, &MemorySink);
        assert_eq!(done.workflow.stage, Stage::End);
        assert!(crate::coordinator::next_skill(&done).is_none());
    }

    #[test]
    fn test_error_recovery_resets_to_named_stage() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::AwaitConfirmation;
        state.workflow.blocking_issue = Some("booking system glitch".to_string());
        state.workflow.confirmation_status = ConfirmationStatus::NeedsClarification;
        let outcome = SkillOutcome::ErrorRecovery(RecoveryOutcome {
            reply: reply("No trouble at all, let's try again."),
            reset_stage: Stage::SharePreferences,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert!(next.workflow.blocking_issue.is_none());
        assert_eq!(next.workflow.confirmation_status, ConfirmationStatus::Pending);
        assert_eq!(next.workflow.stage, Stage::SharePreferences);
        assert_eq!(next.workflow.current_topic, Topic::ConfirmingAvailability);
    }

    #[test]
    fn test_save_records_path_and_wraps_up() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::SaveData;
        let outcome = SkillOutcome::SaveReservation(SaveOutcome {
            reply: reply("Everything is booked, thank you so much!"),
            follow_up_needed: false,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);

        assert_eq!(next.workflow.stage, Stage::WrapUp);
        assert_eq!(
            next.workflow.saved_file_path.as_deref(),
            Some("memory://snapshot")
        );
        assert_eq!(next.episodic.events().len(), 1);
    }

    #[test]
    fn test_save_failure_degrades_to_marker() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::SaveData;
        let outcome = SkillOutcome::SaveReservation(SaveOutcome {
            reply: reply("Everything is booked!"),
            follow_up_needed: false,
        });

        let next = apply_outcome(&state, &outcome, &BrokenSink);

        assert_eq!(next.workflow.stage, Stage::WrapUp);
        let marker = next.workflow.saved_file_path.expect("marker recorded");
        assert!(marker.starts_with("save-failed:"));
    }

    #[test]
    fn test_save_follow_up_returns_to_confirmation() {
        let mut state = fresh_state();
        state.workflow.stage = Stage::SaveData;
        let outcome = SkillOutcome::SaveReservation(SaveOutcome {
            reply: reply("One more detail to settle first."),
            follow_up_needed: true,
        });

        let next = apply_outcome(&state, &outcome, &MemorySink);
        assert_eq!(next.workflow.stage, Stage::AwaitConfirmation);
        assert!(next.workflow.saved_file_path.is_none());
    }

    #[test]
    fn test_fields_flagged_in_text_matches_keywords() {
        assert_eq!(
            fields_flagged_in_text("What DATE and time did you want?"),
            vec![ReservationField::Date, ReservationField::Time]
        );
        assert_eq!(
            fields_flagged_in_text("Could you repeat your name?"),
            vec![ReservationField::ContactName]
        );
        assert!(fields_flagged_in_text("How many of you?").is_empty());
    }
}
