//! Coordinator: pure stage-to-skill routing.
//!
//! The coordinator selects the next skill from the current state and
//! nothing else. It is total over every reachable state: `None` is
//! returned exactly when the stage is terminal, so the conversation loop
//! can never stall on a live session.

use crate::skill::SkillKind;
use crate::types::{ConfirmationStatus, SessionState, Stage};

/// Select the next skill for the current workflow stage.
///
/// Priority order: terminal stages finish the session, a blocking issue
/// forces error recovery, then routing dispatches by stage. `Stage` is an
/// exhaustive enum, so the dispatch is total by construction.
pub fn next_skill(state: &SessionState) -> Option<SkillKind> {
    let workflow = &state.workflow;

    if workflow.stage.is_terminal() {
        return None;
    }

    if workflow.blocking_issue.is_some() {
        return Some(SkillKind::ErrorRecovery);
    }

    let skill = match workflow.stage {
        Stage::Intro => SkillKind::Greeting,
        Stage::SharePreferences | Stage::AwaitAvailability => SkillKind::Availability,
        Stage::ReviewAlternatives => SkillKind::AlternativeReview,
        Stage::ProvideContact => SkillKind::DetailsCollection,
        Stage::MenuDiscussion => SkillKind::MenuDiscussion,
        Stage::AwaitConfirmation => {
            if workflow.confirmation_status == ConfirmationStatus::NeedsClarification {
                SkillKind::DetailsCollection
            } else {
                SkillKind::Confirmation
            }
        }
        Stage::SaveData => SkillKind::SaveReservation,
        // Handled above; kept unreachable rather than silently re-routed.
        Stage::WrapUp | Stage::End => return None,
    };
    Some(skill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GoalFacts, Persona};

    fn state_at(stage: Stage) -> SessionState {
        let mut state = SessionState::new(Persona::default(), GoalFacts::default());
        state.workflow.stage = stage;
        state
    }

    const ALL_STAGES: [Stage; 10] = [
        Stage::Intro,
        Stage::SharePreferences,
        Stage::AwaitAvailability,
        Stage::ReviewAlternatives,
        Stage::ProvideContact,
        Stage::MenuDiscussion,
        Stage::AwaitConfirmation,
        Stage::SaveData,
        Stage::WrapUp,
        Stage::End,
    ];

    #[test]
    fn test_none_exactly_on_terminal_stages() {
        for stage in ALL_STAGES {
            let state = state_at(stage);
            assert_eq!(next_skill(&state).is_none(), stage.is_terminal());
        }
    }

    #[test]
    fn test_blocking_issue_overrides_every_live_stage() {
        for stage in ALL_STAGES {
            let mut state = state_at(stage);
            state.workflow.blocking_issue = Some("kitchen fire".to_string());
            let expected = if stage.is_terminal() {
                None
            } else {
                Some(SkillKind::ErrorRecovery)
            };
            assert_eq!(next_skill(&state), expected);
        }
    }

    #[test]
    fn test_stage_dispatch_table() {
        assert_eq!(next_skill(&state_at(Stage::Intro)), Some(SkillKind::Greeting));
        assert_eq!(
            next_skill(&state_at(Stage::SharePreferences)),
            Some(SkillKind::Availability)
        );
        assert_eq!(
            next_skill(&state_at(Stage::AwaitAvailability)),
            Some(SkillKind::Availability)
        );
        assert_eq!(
            next_skill(&state_at(Stage::ReviewAlternatives)),
            Some(SkillKind::AlternativeReview)
        );
        assert_eq!(
            next_skill(&state_at(Stage::ProvideContact)),
            Some(SkillKind::DetailsCollection)
        );
        assert_eq!(
            next_skill(&state_at(Stage::MenuDiscussion)),
            Some(SkillKind::MenuDiscussion)
        );
        assert_eq!(
            next_skill(&state_at(Stage::SaveData)),
            Some(SkillKind::SaveReservation)
        );
    }

    #[test]
    fn test_await_confirmation_branches_on_clarification() {
        let mut state = state_at(Stage::AwaitConfirmation);
        assert_eq!(next_skill(&state), Some(SkillKind::Confirmation));

        state.workflow.confirmation_status = ConfirmationStatus::NeedsClarification;
        assert_eq!(next_skill(&state), Some(SkillKind::DetailsCollection));
    }
}
