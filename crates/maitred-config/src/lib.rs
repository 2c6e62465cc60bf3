//! # Maitred Config
//!
//! Single-file YAML configuration: one `maitred.yaml` configures the app,
//! the LLM backend, and the guest's booking goal.

mod loader;

pub use loader::{load_config, resolve_api_key, ConfigError};

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use maitred_core::types::{DesiredSlot, GoalFacts, PartySize};

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaitredConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub guest: GuestConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Directory reservation snapshots are written to.
    #[serde(default = "default_reservations_dir")]
    pub reservations_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            reservations_dir: default_reservations_dir(),
        }
    }
}

fn default_app_name() -> String {
    "maitred".to_string()
}

fn default_reservations_dir() -> String {
    "reservations".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key; never the key itself.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    1_200
}

fn default_timeout_secs() -> u64 {
    30
}

/// The guest persona's booking goal, as configured.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestConfig {
    #[serde(default = "default_restaurant_name")]
    pub restaurant_name: String,
    #[serde(default = "default_guest_name")]
    pub name: String,
    #[serde(default = "default_guest_phone")]
    pub phone: String,
    #[serde(default)]
    pub celebration_reason: Option<String>,
    #[serde(default)]
    pub favorite_dishes: Vec<String>,
    #[serde(default)]
    pub dietary_notes: Option<String>,
    #[serde(default)]
    pub talking_points: Vec<String>,
    /// Desired booking date; defaults to tomorrow when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_desired_time")]
    pub time: NaiveTime,
    #[serde(default = "default_party_size")]
    pub party_size: u8,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub fallback_slots: Vec<String>,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            restaurant_name: default_restaurant_name(),
            name: default_guest_name(),
            phone: default_guest_phone(),
            celebration_reason: None,
            favorite_dishes: Vec::new(),
            dietary_notes: None,
            talking_points: Vec::new(),
            date: None,
            time: default_desired_time(),
            party_size: default_party_size(),
            occasion: None,
            special_requests: None,
            fallback_slots: Vec::new(),
        }
    }
}

fn default_restaurant_name() -> String {
    "Azure Bistro".to_string()
}

fn default_guest_name() -> String {
    "Sarah Mitchell".to_string()
}

fn default_guest_phone() -> String {
    "+1 555 0137".to_string()
}

fn default_desired_time() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default()
}

fn default_party_size() -> u8 {
    2
}

impl GuestConfig {
    /// Convert the configured goal into the core's goal facts.
    pub fn to_goal_facts(&self) -> Result<GoalFacts, ConfigError> {
        let party_size = PartySize::new(self.party_size)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let date = self.date.unwrap_or_else(|| {
            Utc::now()
                .date_naive()
                .checked_add_days(Days::new(1))
                .unwrap_or_else(|| Utc::now().date_naive())
        });
        Ok(GoalFacts {
            restaurant_name: self.restaurant_name.clone(),
            guest_name: self.name.clone(),
            guest_phone: self.phone.clone(),
            celebration_reason: self.celebration_reason.clone(),
            favorite_dishes: self.favorite_dishes.clone(),
            dietary_notes: self.dietary_notes.clone(),
            talking_points: self.talking_points.clone(),
            desired: DesiredSlot {
                date,
                time: self.time,
                party_size,
                occasion: self.occasion.clone(),
                special_requests: self.special_requests.clone(),
            },
            fallback_slots: self.fallback_slots.clone(),
        })
    }
}
