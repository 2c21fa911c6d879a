//! Diagnosis types and the model request.
//!
//! [`DiagnosisResult`] is the structured record the service returns to the
//! caller. The model is asked for exactly this shape via a system prompt
//! that fixes the schema, arities, and output language; the reply is still
//! treated as untrusted text and must pass [`crate::validate_response`].

use serde::{Deserialize, Serialize};

use crate::extract::ExtractedContent;
use crate::snapshot::PageSnapshot;
use crate::{PagePulseError, Result};
use url::Url;

/// Number of top issues the diagnosis must contain.
pub const TOP_ISSUE_COUNT: usize = 3;

/// Number of quick wins the diagnosis must contain.
pub const QUICK_WIN_COUNT: usize = 5;

/// Estimated impact of a conversion issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// One conversion blocker found on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Short name of the problem.
    pub title: String,
    /// Why this hurts conversion, grounded in the page evidence.
    pub reason: String,
    /// Estimated impact on conversion rate.
    pub impact: Impact,
}

/// A low-effort fix the page owner can apply immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickWin {
    /// What to change.
    pub action: String,
    /// How to change it, concretely.
    pub how_to: String,
    /// Suggested replacement copy, when the fix is textual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_copy: Option<String>,
}

/// One examined criterion of the conversion checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// The criterion that was examined.
    pub item: String,
    /// Whether the page satisfies it.
    pub passed: bool,
    /// Optional note on what was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Five-dimension score breakdown, each 0–100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Above-the-fold clarity: does a visitor get it in three seconds?
    pub first_impression: u8,
    /// Is the value proposition concrete and specific?
    pub value_clarity: u8,
    /// Visibility and wording of the calls to action.
    pub cta_strength: u8,
    /// Social proof, guarantees, and credibility signals.
    pub trust_signals: u8,
    /// Friction on the way to converting (forms, navigation, choices).
    pub friction: u8,
}

/// The structured conversion diagnosis returned to the caller.
///
/// `snapshot` never comes from the model: [`serde(skip_deserializing)`]
/// discards anything snapshot-shaped in the model output, and the pipeline
/// fills the field with the server-computed [`PageSnapshot`] afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisResult {
    /// One-line overall summary.
    pub summary: String,
    /// Overall score, 0–100.
    pub score: u8,
    /// Per-dimension scores.
    pub breakdown: ScoreBreakdown,
    /// Exactly three top conversion blockers.
    pub top_issues: Vec<Issue>,
    /// Exactly five quick-win actions.
    pub quick_wins: Vec<QuickWin>,
    /// Ordered priority plan, 4–6 steps.
    pub priority_plan: Vec<String>,
    /// Examined criteria, 8–14 items.
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Server-computed page snapshot (authoritative).
    #[serde(skip_deserializing)]
    pub snapshot: PageSnapshot,
}

/// Configuration for the model call.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key for the model service.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Model identifier, treated as configuration.
    pub model: String,
    /// Sampling temperature; kept low for deterministic-leaning output.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Target language for every free-text field (e.g. "ja", "en").
    pub language: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout: 60,
            language: "ja".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Requests a diagnosis from the model service.
///
/// Builds the system and user messages, performs one bounded POST to the
/// configured `/chat/completions` endpoint, and returns the raw reply text.
/// Any failure of the call itself — network, auth, quota, non-success
/// status, or an empty reply — is [`PagePulseError::ModelRequest`], fatal to
/// the request and never retried.
pub async fn request_diagnosis(
    config: &ModelConfig, url: &Url, content: &ExtractedContent, snapshot: &PageSnapshot,
) -> Result<String> {
    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage { role: "system", content: system_prompt(&config.language) },
            ChatMessage { role: "user", content: user_prompt(url, content, snapshot) },
        ],
        temperature: config.temperature,
        response_format: ResponseFormat { format_type: "json_object" },
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| PagePulseError::ModelRequest(e.to_string()))?;

    let response = client
        .post(format!("{}/chat/completions", config.api_base.trim_end_matches('/')))
        .bearer_auth(&config.api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PagePulseError::ModelRequest(format!("timed out after {} seconds", config.timeout))
            } else {
                PagePulseError::ModelRequest(e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(200).collect();
        return Err(PagePulseError::ModelRequest(format!(
            "service returned HTTP {}: {}",
            status.as_u16(),
            excerpt
        )));
    }

    let reply: ChatResponse = response
        .json()
        .await
        .map_err(|e| PagePulseError::ModelRequest(format!("unreadable service response: {}", e)))?;

    reply
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| PagePulseError::ModelRequest("service response contained no choices".to_string()))
}

/// System message: fixes the output schema and formatting rules.
fn system_prompt(language: &str) -> String {
    format!(
        "You are a conversion rate optimization expert diagnosing a landing page.\n\
         Respond with a single JSON object and nothing else: no markdown, no code fences, no commentary.\n\
         Write every free-text field in this language: {language}.\n\
         The JSON object must have exactly these fields:\n\
         - \"summary\": string, a one-line overall diagnosis\n\
         - \"score\": integer 0-100, the overall conversion readiness\n\
         - \"breakdown\": object with integer fields 0-100: \"first_impression\", \"value_clarity\", \
           \"cta_strength\", \"trust_signals\", \"friction\"; keep them consistent with \"score\"\n\
         - \"top_issues\": array of EXACTLY 3 objects {{\"title\", \"reason\", \"impact\"}}, \
           impact one of \"HIGH\", \"MEDIUM\", \"LOW\", ordered by impact\n\
         - \"quick_wins\": array of EXACTLY 5 objects {{\"action\", \"how_to\", \"example_copy\"}}, \
           example_copy may be null\n\
         - \"priority_plan\": array of 4 to 6 strings, ordered steps\n\
         - \"checklist\": array of 8 to 14 objects {{\"item\", \"passed\", \"note\"}}, note may be null\n\
         Ground every claim in the provided page content and snapshot; do not invent page elements."
    )
}

/// User message: the URL, the snapshot as serialized evidence, and the text.
fn user_prompt(url: &Url, content: &ExtractedContent, snapshot: &PageSnapshot) -> String {
    let snapshot_json = serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Diagnose the conversion blockers of this page and propose concrete fixes.\n\n\
         URL: {url}\n\n\
         Page snapshot (server-extracted evidence):\n{snapshot_json}\n\n\
         Main page content (cleaned, possibly truncated):\n{text}",
        url = url,
        snapshot_json = snapshot_json,
        text = content.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_content() -> ExtractedContent {
        ExtractedContent { text: "Some page text.".to_string(), strategy: "region-fallback", truncated: false }
    }

    #[test]
    fn test_model_config_default() {
        let config = ModelConfig::default();
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.timeout, 60);
        assert_eq!(config.language, "ja");
        assert!(config.api_base.contains("api.openai.com"));
    }

    #[test]
    fn test_system_prompt_fixes_arities_and_language() {
        let prompt = system_prompt("ja");
        assert!(prompt.contains("EXACTLY 3"));
        assert!(prompt.contains("EXACTLY 5"));
        assert!(prompt.contains("language: ja"));
        assert!(prompt.contains("no code fences"));
    }

    #[test]
    fn test_user_prompt_embeds_evidence() {
        let url = Url::parse("https://example.com/lp").unwrap();
        let snapshot =
            PageSnapshot { cta_candidates: vec!["無料で試す".to_string()], link_count: 3, ..Default::default() };

        let prompt = user_prompt(&url, &sample_content(), &snapshot);
        assert!(prompt.contains("https://example.com/lp"));
        assert!(prompt.contains("無料で試す"));
        assert!(prompt.contains("Some page text."));
    }

    #[test]
    fn test_impact_serialization_is_uppercase() {
        assert_eq!(serde_json::to_string(&Impact::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::from_str::<Impact>("\"LOW\"").unwrap(), Impact::Low);
        assert!(serde_json::from_str::<Impact>("\"high\"").is_err());
    }

    #[test]
    fn test_diagnosis_serializes_snapshot() {
        let diagnosis = DiagnosisResult {
            summary: "ok".to_string(),
            score: 70,
            breakdown: ScoreBreakdown {
                first_impression: 70,
                value_clarity: 70,
                cta_strength: 70,
                trust_signals: 70,
                friction: 70,
            },
            top_issues: Vec::new(),
            quick_wins: Vec::new(),
            priority_plan: Vec::new(),
            checklist: Vec::new(),
            snapshot: PageSnapshot { link_count: 7, ..Default::default() },
        };

        let json = serde_json::to_value(&diagnosis).unwrap();
        assert_eq!(json["snapshot"]["link_count"], 7);
    }
}
