//! # Maitred Skills
//!
//! The action executor collaborator: renders per-skill prompts, calls an
//! LLM backend, and parses the structured outcome the core expects.
//!
//! The core never sees any of this; it only consumes the `SkillExecutor`
//! contract from `maitred-core`.

mod executor;
mod llm;
mod prompt;

pub use executor::{LlmSkillExecutor, SkillExecutorConfig};
pub use llm::{LlmClient, LlmError, LlmRequest, OpenRouterClient, OpenRouterConfig};
pub use prompt::build_prompt;
