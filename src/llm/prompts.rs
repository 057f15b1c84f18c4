//! Single prompt for resume and job description analysis

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub analysis: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            analysis: ANALYSIS_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for prompt template substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptParams {
    pub resume_content: String,
    pub job_content: String,
}

impl PromptTemplates {
    pub fn render_analysis(&self, params: &PromptParams) -> String {
        debug!(
            "Building analysis prompt (resume: {} chars, job: {} chars)",
            params.resume_content.len(),
            params.job_content.len()
        );

        // Job first so a literal "{job}" inside the resume text stays untouched
        self.analysis
            .replace("{job}", params.job_content.trim())
            .replace("{resume}", params.resume_content.trim())
    }
}

const ANALYSIS_TEMPLATE: &str = r#"You are an experienced technical recruiter and resume reviewer.
Compare the resume below with the job description and assess how well the candidate fits.

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

<RESUME>
{resume}
</RESUME>

Respond with a single JSON object and nothing else, using exactly these keys:
{
  "score": <overall fit from 0 to 100>,
  "strengths": [<specific strengths of this resume for this job>],
  "weaknesses": [<specific gaps or weaknesses>],
  "suggestions": [<concrete edits that would improve the resume for this job>],
  "keywordMatch": <percentage from 0 to 100 of important job keywords present in the resume>
}

Reference the actual resume content, not generic advice."#;
