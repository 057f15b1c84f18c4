//! Resume analysis: prompt, one model call, lenient parsing of the reply

use crate::error::{Result, ResumeStudioError};
use crate::llm::client::AnalysisProvider;
use crate::llm::prompts::{PromptParams, PromptTemplates};
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Structured feedback, when the model followed the requested shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub score: Option<f32>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub strengths: Vec<String>,
    #[serde(default, alias = "gaps", deserialize_with = "lenient_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, alias = "recommendations", deserialize_with = "lenient_list")]
    pub suggestions: Vec<String>,
    #[serde(
        default,
        alias = "keywordMatch",
        alias = "keywordMatchPercentage",
        alias = "keyword_match_percentage",
        deserialize_with = "lenient_percent"
    )]
    pub keyword_match: Option<f32>,
}

impl AnalysisResult {
    fn has_content(&self) -> bool {
        self.score.is_some()
            || self.keyword_match.is_some()
            || !self.strengths.is_empty()
            || !self.weaknesses.is_empty()
            || !self.suggestions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Structured(AnalysisResult),
    /// The model's text could not be read as structured feedback
    Raw { text: String, reason: String },
}

impl AnalysisOutcome {
    pub fn is_structured(&self) -> bool {
        matches!(self, AnalysisOutcome::Structured(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            AnalysisOutcome::Structured(_) => "Analysis complete",
            AnalysisOutcome::Raw { .. } => "Failed to parse analysis results; showing raw feedback",
        }
    }
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```$").expect("fence pattern is valid")
    })
}

/// Remove a surrounding ``` fence (with optional language tag)
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match fence_pattern().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse model text into an outcome; never fails
pub fn parse_analysis_response(text: &str) -> AnalysisOutcome {
    let body = strip_code_fences(text);

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(value),
        Err(first_error) => match outer_object(body) {
            Some(candidate) => serde_json::from_str::<Value>(candidate).map_err(|_| first_error),
            None => Err(first_error),
        },
    };

    let value = match value {
        Ok(value) if value.is_object() => value,
        Ok(_) => return raw(text, "response is not a JSON object".to_string()),
        Err(e) => return raw(text, e.to_string()),
    };

    match serde_json::from_value::<AnalysisResult>(value) {
        Ok(result) if result.has_content() => AnalysisOutcome::Structured(result),
        Ok(_) => raw(text, "response has none of the expected fields".to_string()),
        Err(e) => raw(text, e.to_string()),
    }
}

fn raw(text: &str, reason: String) -> AnalysisOutcome {
    warn!("Falling back to raw analysis text: {}", reason);
    AnalysisOutcome::Raw {
        text: text.trim().to_string(),
        reason,
    }
}

/// The span from the first `{` to the last `}`
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn lenient_percent<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite())
        .map(|n| (n as f32).clamp(0.0, 100.0)))
}

fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_text).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    };
    Ok(items)
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Null => None,
        // Objects such as {"title": .., "description": ..} keep their text parts
        Value::Object(map) => {
            let parts: Vec<String> = map
                .values()
                .filter_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(": "))
            }
        }
        other => Some(other.to_string()),
    }
}

/// Builds the prompt, calls the provider once, parses the reply
pub struct ResumeAnalyzer<P> {
    provider: P,
    prompt_templates: PromptTemplates,
}

impl<P: AnalysisProvider> ResumeAnalyzer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            prompt_templates: PromptTemplates::default(),
        }
    }

    pub async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<AnalysisOutcome> {
        if resume_text.trim().is_empty() {
            return Err(ResumeStudioError::InvalidInput("Resume text is empty".to_string()));
        }
        if job_text.trim().is_empty() {
            return Err(ResumeStudioError::InvalidInput("Job description is empty".to_string()));
        }

        let prompt = self.prompt_templates.render_analysis(&PromptParams {
            resume_content: resume_text.to_string(),
            job_content: job_text.to_string(),
        });

        let reply = self.provider.generate(&prompt).await?;
        let outcome = parse_analysis_response(&reply);
        info!("{}", outcome.status());
        Ok(outcome)
    }
}
