//! Hosted generative-language endpoint client

use crate::config::AiConfig;
use crate::error::{Result, ResumeStudioError};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Something that turns a prompt into model text
pub trait AnalysisProvider {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// One POST per call. No retries and no timeout beyond the HTTP stack's.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &AiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ResumeStudioError::Configuration(
                "No AI API key configured".to_string(),
            ));
        }
        Ok(Self::new(&config.endpoint, &config.model, &config.api_key))
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl AnalysisProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        info!("Requesting analysis from {}", self.model);
        let response = self
            .http
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!("AI endpoint responded {}", status.as_u16());
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ResumeStudioError::AiService {
                status: status.as_u16(),
                message: crate::backend::client::error_message(&message),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ResumeStudioError::ResponseParse(format!("Unexpected AI response envelope: {}", e)))?;

        parsed.text().ok_or(ResumeStudioError::EmptyResponse)
    }
}
