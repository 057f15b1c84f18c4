//! Error handling for resume studio

use thiserror::Error;

/// Guidance shown when a file type cannot be uploaded or read.
pub const UNSUPPORTED_FILE_GUIDANCE: &str = "Please upload a PDF, DOCX, or JSON file";

#[derive(Error, Debug)]
pub enum ResumeStudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("AI service error (status {status}): {message}")]
    AiService { status: u16, message: String },

    #[error("AI service returned no text")]
    EmptyResponse,

    #[error("Failed to parse response: {0}")]
    ResponseParse(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File format not supported: {0}. {guidance}", guidance = UNSUPPORTED_FILE_GUIDANCE)]
    UnsupportedFormat(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rendering error: {0}")]
    Rendering(String),
}

pub type Result<T> = std::result::Result<T, ResumeStudioError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ResumeStudioError {
    fn from(err: anyhow::Error) -> Self {
        ResumeStudioError::InvalidInput(err.to_string())
    }
}

impl From<askama::Error> for ResumeStudioError {
    fn from(err: askama::Error) -> Self {
        ResumeStudioError::Rendering(err.to_string())
    }
}

impl From<url::ParseError> for ResumeStudioError {
    fn from(err: url::ParseError) -> Self {
        ResumeStudioError::Configuration(format!("Invalid URL: {}", err))
    }
}
