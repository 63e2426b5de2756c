use crate::config::OpenAiSettings;
use crate::domain::fallback::generate_fallback;
use crate::domain::models::{GoalReading, InsightPayload, InsightResult, ProfileReading};
use crate::domain::summary::{summarize_mental, summarize_physical, MentalSummary, PhysicalSummary};
use crate::services::ai::{CompletionBackend, CompletionRequest, UpstreamError};
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a supportive wellness coach. Provide inclusive, age and gender neutral guidance. Output strict JSON with keys insights (array of strings), suggestions (array of strings), and goals (array of strings). Keep items short and actionable. Avoid medical diagnosis.";

const DEFAULT_ERROR_STATUS: u16 = 500;

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("OPENAI_API_KEY is not set")]
    ConfigMissing,
    /// Served with offline advice so the caller still has something to show.
    #[error("quota_exceeded")]
    QuotaExceeded { fallback: InsightResult },
    #[error("{message}")]
    Upstream { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct InsightSettings {
    pub model: String,
    pub max_tokens: u16,
    pub temperature: f32,
}

impl From<&OpenAiSettings> for InsightSettings {
    fn from(s: &OpenAiSettings) -> Self {
        Self {
            model: s.model.clone(),
            max_tokens: s.max_tokens,
            temperature: s.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompactPayload<'a> {
    profile: ProfileReading,
    physical_summary: &'a PhysicalSummary,
    mental_summary: &'a MentalSummary,
    goals: &'a [GoalReading],
}

/// Turns a user's records into AI wellness advice, falling back to local
/// rules when the completion service reports quota exhaustion.
pub struct InsightService {
    backend: Arc<dyn CompletionBackend>,
    settings: InsightSettings,
}

impl InsightService {
    pub fn new(backend: Arc<dyn CompletionBackend>, settings: InsightSettings) -> Self {
        Self { backend, settings }
    }

    /// False when requests would fail with `ConfigMissing`.
    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    pub async fn request_insights(&self, payload: &InsightPayload) -> Result<InsightResult, InsightError> {
        if !self.is_configured() {
            return Err(InsightError::ConfigMissing);
        }

        let physical = summarize_physical(&payload.physical);
        let mental = summarize_mental(&payload.mental);

        let compact = CompactPayload {
            profile: payload.profile.clone().unwrap_or_default(),
            physical_summary: &physical,
            mental_summary: &mental,
            goals: &payload.goals,
        };
        let user = serde_json::to_string(&compact).map_err(|e| {
            tracing::error!("Failed to encode insight payload: {}", e);
            InsightError::Upstream {
                status: DEFAULT_ERROR_STATUS,
                message: "Failed to generate insights".to_string(),
            }
        })?;

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            user,
            json_mode: true,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        match self.backend.complete(request).await {
            Ok(raw) => Ok(parse_insights(&raw)),
            Err(err) if is_quota_error(&err) => {
                tracing::warn!(
                    "Insight quota exceeded (status {:?}), serving fallback advice",
                    err.status
                );
                Err(InsightError::QuotaExceeded {
                    fallback: generate_fallback(&physical, &mental),
                })
            }
            Err(err) => {
                tracing::error!("Insight completion failed: {}", err);
                Err(InsightError::Upstream {
                    status: error_status(err.status),
                    message: err.message,
                })
            }
        }
    }
}

fn is_quota_error(err: &UpstreamError) -> bool {
    err.status == Some(429)
        || err.message.to_lowercase().contains("quota")
        || err
            .code
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains("quota"))
}

// A failure without an error status still has to surface as a server error.
fn error_status(status: Option<u16>) -> u16 {
    match status {
        Some(s) if (400..=599).contains(&s) => s,
        _ => DEFAULT_ERROR_STATUS,
    }
}

fn parse_insights(raw: &str) -> InsightResult {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    match serde_json::from_str::<InsightResult>(raw) {
        Ok(result) => {
            tracing::debug!(
                "Insight completion parsed: {} insights, {} suggestions",
                result.insights.len(),
                result.suggestions.len()
            );
            result
        }
        Err(e) => {
            tracing::warn!("Unparsable insight completion, returning empty result: {}", e);
            InsightResult::default()
        }
    }
}
