//! Resume analysis end to end with a scripted provider and a mock AI endpoint

use resume_studio::error::{Result, ResumeStudioError};
use resume_studio::llm::analyzer::{AnalysisOutcome, ResumeAnalyzer};
use resume_studio::llm::client::{AnalysisProvider, GeminiClient};
use resume_studio::output::formatter::{OutputFormat, ReportGenerator, RAW_NOTICE};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Returns a fixed reply and remembers every prompt it was given
#[derive(Clone)]
struct ScriptedProvider {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl AnalysisProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

const RESUME: &str = "Jane Smith\nSite Reliability Engineer at Globex\nSkills: Rust, Kubernetes";
const JOB: &str = "Senior Platform Engineer. Requirements: Kubernetes, Terraform.";

#[tokio::test]
async fn test_fenced_json_reply_is_structured() {
    let provider = ScriptedProvider::new(
        "```json\n{\"score\": 78, \"strengths\": [\"Kubernetes operations\"], \"weaknesses\": [\"No Terraform\"], \"suggestions\": [\"Mention IaC work\"], \"keywordMatch\": \"65%\"}\n```",
    );
    let analyzer = ResumeAnalyzer::new(provider.clone());

    let outcome = analyzer.analyze(RESUME, JOB).await.unwrap();

    match &outcome {
        AnalysisOutcome::Structured(result) => {
            assert_eq!(result.score, Some(78.0));
            assert_eq!(result.keyword_match, Some(65.0));
            assert_eq!(result.weaknesses, vec!["No Terraform".to_string()]);
        }
        other => panic!("expected structured outcome, got {other:?}"),
    }

    assert_eq!(provider.calls(), 1);
    let prompt = provider.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Site Reliability Engineer at Globex"));
    assert!(prompt.contains("Terraform"));
    assert!(!prompt.contains("{resume}"));
    assert!(!prompt.contains("{job}"));
}

#[tokio::test]
async fn test_prose_reply_falls_back_to_raw_text() {
    let provider = ScriptedProvider::new("Overall a good fit, but add Terraform experience.");
    let analyzer = ResumeAnalyzer::new(provider);

    let outcome = analyzer.analyze(RESUME, JOB).await.unwrap();

    assert!(!outcome.is_structured());
    assert_eq!(outcome.status(), "Failed to parse analysis results; showing raw feedback");

    let report = ReportGenerator::new(false)
        .generate(&outcome, OutputFormat::Console)
        .unwrap();
    assert!(report.contains(RAW_NOTICE));
    assert!(report.contains("add Terraform experience"));
}

#[tokio::test]
async fn test_empty_inputs_are_rejected_before_calling_the_model() {
    let provider = ScriptedProvider::new("{}");
    let analyzer = ResumeAnalyzer::new(provider.clone());

    let err = analyzer.analyze("   ", JOB).await.unwrap_err();
    assert!(matches!(err, ResumeStudioError::InvalidInput(_)));
    let err = analyzer.analyze(RESUME, "").await.unwrap_err();
    assert!(matches!(err, ResumeStudioError::InvalidInput(_)));

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_gemini_round_trip_through_analyzer() {
    let server = MockServer::start().await;
    let reply = json!({
        "strengths": ["Rust"],
        "recommendations": ["Quantify uptime improvements"],
        "score": 91
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(query_param("key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": reply}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = ResumeAnalyzer::new(GeminiClient::new(server.uri(), "gemini-test", "k"));
    let outcome = analyzer.analyze(RESUME, JOB).await.unwrap();

    let markdown = ReportGenerator::new(false)
        .generate(&outcome, OutputFormat::Markdown)
        .unwrap();
    assert!(markdown.contains("**Overall Score:** 91% (Excellent)"));
    assert!(markdown.contains("- Quantify uptime improvements"));
}

#[tokio::test]
async fn test_ai_service_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let analyzer = ResumeAnalyzer::new(GeminiClient::new(server.uri(), "gemini-test", "k"));
    let err = analyzer.analyze(RESUME, JOB).await.unwrap_err();

    match err {
        ResumeStudioError::AiService { status, .. } => assert_eq!(status, 429),
        other => panic!("unexpected error: {other:?}"),
    }
}
