//! Output formatters for analysis feedback

use crate::error::{Result, ResumeStudioError};
use crate::llm::analyzer::{AnalysisOutcome, AnalysisResult};
use colored::{Color, Colorize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = ResumeStudioError;

    fn from_str(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(ResumeStudioError::InvalidInput(format!(
                "Invalid output format: {}. Supported: console, json, markdown",
                format
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Console => write!(f, "console"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Trait for formatting analysis outcomes
pub trait OutputFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

pub const RAW_NOTICE: &str = "Could not parse structured feedback; showing the model's response as-is.";

fn score_label(score: f32) -> &'static str {
    match score.round() as u32 {
        90..=100 => "Excellent",
        80..=89 => "Very Good",
        70..=79 => "Good",
        60..=69 => "Fair",
        _ => "Needs Work",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.bold().underline())
        } else {
            format!("\n{}\n{}\n", title, "-".repeat(title.len()))
        }
    }

    fn format_score_badge(&self, score: f32) -> String {
        let color = match score.round() as u32 {
            80..=100 => Color::Green,
            60..=79 => Color::Yellow,
            _ => Color::Red,
        };
        self.colorize(&format!("{:.0}% ({})", score, score_label(score)), color)
    }

    fn format_list(&self, out: &mut String, title: &str, items: &[String], marker: &str, color: Color) {
        if items.is_empty() {
            return;
        }
        out.push_str(&self.format_header(title));
        for item in items {
            out.push_str(&format!("  {} {}\n", self.colorize(marker, color), item));
        }
    }

    fn format_structured(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();
        out.push_str(&self.format_header("Resume Analysis"));
        if let Some(score) = result.score {
            out.push_str(&format!("  Overall Score: {}\n", self.format_score_badge(score)));
        }
        if let Some(keyword_match) = result.keyword_match {
            out.push_str(&format!("  Keyword Match: {}\n", self.format_score_badge(keyword_match)));
        }
        self.format_list(&mut out, "Strengths", &result.strengths, "+", Color::Green);
        self.format_list(&mut out, "Weaknesses", &result.weaknesses, "-", Color::Red);
        self.format_list(&mut out, "Suggestions", &result.suggestions, "→", Color::Cyan);
        out
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        Ok(match outcome {
            AnalysisOutcome::Structured(result) => self.format_structured(result),
            AnalysisOutcome::Raw { text, .. } => {
                format!(
                    "{}\n{}\n{}\n",
                    self.format_header("Resume Analysis"),
                    self.colorize(RAW_NOTICE, Color::Yellow),
                    text
                )
            }
        })
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(outcome)?)
        } else {
            Ok(serde_json::to_string(outcome)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn markdown_list(out: &mut String, title: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        out.push_str(&format!("\n## {}\n\n", title));
        for item in items {
            out.push_str(&format!("- {}\n", item));
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        let mut out = String::from("# Resume Analysis\n");
        match outcome {
            AnalysisOutcome::Structured(result) => {
                out.push('\n');
                if let Some(score) = result.score {
                    out.push_str(&format!("**Overall Score:** {:.0}% ({})\n\n", score, score_label(score)));
                }
                if let Some(keyword_match) = result.keyword_match {
                    out.push_str(&format!("**Keyword Match:** {:.0}%\n", keyword_match));
                }
                Self::markdown_list(&mut out, "Strengths", &result.strengths);
                Self::markdown_list(&mut out, "Weaknesses", &result.weaknesses);
                Self::markdown_list(&mut out, "Suggestions", &result.suggestions);
            }
            AnalysisOutcome::Raw { text, .. } => {
                out.push_str(&format!("\n> {}\n\n{}\n", RAW_NOTICE, text));
            }
        }
        Ok(out)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ReportGenerator {
    pub fn new(use_colors: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter,
        }
    }

    pub fn generate(&self, outcome: &AnalysisOutcome, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_outcome(outcome),
            OutputFormat::Json => self.json_formatter.format_outcome(outcome),
            OutputFormat::Markdown => self.markdown_formatter.format_outcome(outcome),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn save_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured() -> AnalysisOutcome {
        AnalysisOutcome::Structured(AnalysisResult {
            score: Some(84.0),
            strengths: vec!["Strong Rust background".to_string()],
            weaknesses: vec![],
            suggestions: vec!["Quantify impact".to_string()],
            keyword_match: Some(61.0),
        })
    }

    #[test]
    fn test_console_plain_output() {
        let text = ConsoleFormatter::new(false).format_outcome(&structured()).unwrap();
        assert!(text.contains("Overall Score: 84% (Very Good)"));
        assert!(text.contains("Keyword Match: 61% (Fair)"));
        assert!(text.contains("+ Strong Rust background"));
        assert!(!text.contains("Weaknesses"));
    }

    #[test]
    fn test_raw_outcome_shows_notice_and_text() {
        let raw = AnalysisOutcome::Raw {
            text: "Looks fine overall.".to_string(),
            reason: "expected value".to_string(),
        };
        let generator = ReportGenerator::new(false);
        for format in [OutputFormat::Console, OutputFormat::Markdown] {
            let text = generator.generate(&raw, format).unwrap();
            assert!(text.contains(RAW_NOTICE));
            assert!(text.contains("Looks fine overall."));
        }
    }

    #[test]
    fn test_json_output_is_tagged() {
        let json = JsonFormatter::new(false).format_outcome(&structured()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "structured");
        assert_eq!(value["score"], 84.0);
    }

    #[test]
    fn test_markdown_output() {
        let md = MarkdownFormatter.format_outcome(&structured()).unwrap();
        assert!(md.starts_with("# Resume Analysis"));
        assert!(md.contains("## Suggestions\n\n- Quantify impact"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
