//! LLM-backed implementation of the core's `SkillExecutor` contract.

use async_trait::async_trait;
use tracing::{debug, warn};

use maitred_core::skill::{
    AlternativeOutcome, AvailabilityOutcome, ConfirmationOutcome, DetailsOutcome, ExecuteError,
    GreetingOutcome, MenuOutcome, RecoveryOutcome, SaveOutcome, SkillExecutor, SkillKind,
    SkillOutcome,
};
use maitred_core::types::SessionState;

use crate::llm::{LlmClient, LlmRequest};
use crate::prompt::build_prompt;

const MAX_OUTPUT_LOG_CHARS: usize = 2_000;

/// Invocation settings for skill executions.
#[derive(Debug, Clone)]
pub struct SkillExecutorConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for SkillExecutorConfig {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_output_tokens: 1_200,
        }
    }
}

/// Executes one skill per turn: render prompt, call the LLM, parse the
/// kind's outcome shape.
pub struct LlmSkillExecutor<C: LlmClient> {
    client: C,
    config: SkillExecutorConfig,
}

impl<C: LlmClient> LlmSkillExecutor<C> {
    pub fn new(client: C, config: SkillExecutorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl<C: LlmClient> SkillExecutor for LlmSkillExecutor<C> {
    async fn execute(
        &self,
        kind: SkillKind,
        state: &SessionState,
        incoming: &str,
    ) -> Result<SkillOutcome, ExecuteError> {
        let (system, user) = build_prompt(kind, state, incoming);
        let raw = self
            .client
            .complete(LlmRequest {
                system,
                user,
                model: self.config.model.clone(),
                temperature: self.config.temperature,
                max_tokens: self.config.max_output_tokens,
            })
            .await
            .map_err(|e| ExecuteError::Llm(e.to_string()))?;

        debug!(
            skill = %kind,
            output = %truncate_for_log(&raw, MAX_OUTPUT_LOG_CHARS),
            "skill output received"
        );
        let json = extract_json(&raw);
        parse_outcome(kind, json).map_err(|e| {
            warn!(skill = %kind, error = %e, "failed to parse skill outcome");
            e
        })
    }
}

/// Strip markdown code fences and leading prose so the payload starts at
/// the first JSON object.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_fence = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.strip_suffix("```").unwrap_or(rest))
        .unwrap_or(trimmed);
    let start = without_fence.find('{').unwrap_or(0);
    let end = without_fence.rfind('}').map(|i| i + 1).unwrap_or(without_fence.len());
    without_fence.get(start..end).unwrap_or(without_fence).trim()
}

fn parse_outcome(kind: SkillKind, json: &str) -> Result<SkillOutcome, ExecuteError> {
    let malformed = |e: serde_json::Error| ExecuteError::Malformed(e.to_string());
    let outcome = match kind {
        SkillKind::Greeting => {
            SkillOutcome::Greeting(serde_json::from_str::<GreetingOutcome>(json).map_err(malformed)?)
        }
        SkillKind::Availability => SkillOutcome::Availability(
            serde_json::from_str::<AvailabilityOutcome>(json).map_err(malformed)?,
        ),
        SkillKind::DetailsCollection => SkillOutcome::DetailsCollection(
            serde_json::from_str::<DetailsOutcome>(json).map_err(malformed)?,
        ),
        SkillKind::MenuDiscussion => {
            SkillOutcome::MenuDiscussion(serde_json::from_str::<MenuOutcome>(json).map_err(malformed)?)
        }
        SkillKind::Confirmation => SkillOutcome::Confirmation(
            serde_json::from_str::<ConfirmationOutcome>(json).map_err(malformed)?,
        ),
        SkillKind::AlternativeReview => SkillOutcome::AlternativeReview(
            serde_json::from_str::<AlternativeOutcome>(json).map_err(malformed)?,
        ),
        SkillKind::ErrorRecovery => SkillOutcome::ErrorRecovery(
            serde_json::from_str::<RecoveryOutcome>(json).map_err(malformed)?,
        ),
        SkillKind::SaveReservation => {
            SkillOutcome::SaveReservation(serde_json::from_str::<SaveOutcome>(json).map_err(malformed)?)
        }
    };
    Ok(outcome)
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}…[truncated]")
    }
}
