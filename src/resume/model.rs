//! Resume document and record structures

use crate::error::{Result, ResumeStudioError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The editable resume content. Every field is free-form text and optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeData {
    pub title: String,
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub skills: String,
    pub certifications: String,
    pub awards: String,
    pub languages: String,
    pub social_links: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

/// The list sections of a resume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Experience,
    Education,
    Projects,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Experience => write!(f, "experience"),
            Section::Education => write!(f, "education"),
            Section::Projects => write!(f, "projects"),
        }
    }
}

impl FromStr for Section {
    type Err = ResumeStudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "experience" | "experiences" | "work" => Ok(Section::Experience),
            "education" => Ok(Section::Education),
            "projects" | "project" => Ok(Section::Projects),
            _ => Err(ResumeStudioError::InvalidInput(format!(
                "Unknown section: {}. Expected experience, education, or projects",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    #[default]
    Draft,
    Complete,
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeStatus::Draft => write!(f, "draft"),
            ResumeStatus::Complete => write!(f, "complete"),
        }
    }
}

impl FromStr for ResumeStatus {
    type Err = ResumeStudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ResumeStatus::Draft),
            "complete" | "completed" => Ok(ResumeStatus::Complete),
            _ => Err(ResumeStudioError::InvalidInput(format!("Unknown status: {}", s))),
        }
    }
}

/// A persisted row of the `resumes` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: ResumeData,
    #[serde(default)]
    pub status: ResumeStatus,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new resume row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResume {
    pub title: String,
    pub data: ResumeData,
    pub status: ResumeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl NewResume {
    pub fn from_data(data: ResumeData) -> Self {
        Self {
            title: data.display_title(),
            data,
            status: ResumeStatus::Draft,
            file_path: None,
        }
    }
}

/// Patch payload; absent fields are left unchanged remotely
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResumeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResumeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl ResumeUpdate {
    pub fn from_data(data: ResumeData) -> Self {
        Self {
            title: Some(data.display_title()),
            data: Some(data),
            ..Default::default()
        }
    }
}

impl ResumeData {
    /// Title for listings: explicit title, then the person's name, then a placeholder
    pub fn display_title(&self) -> String {
        let title = self.title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        let name = self.personal_info.full_name.trim();
        if !name.is_empty() {
            return format!("{}'s Resume", name);
        }
        "Untitled Resume".to_string()
    }

    pub fn is_empty(&self) -> bool {
        *self == ResumeData::default()
    }

    pub fn entry_count(&self, section: Section) -> usize {
        match section {
            Section::Experience => self.experience.len(),
            Section::Education => self.education.len(),
            Section::Projects => self.projects.len(),
        }
    }

    /// Flatten to plain text for analysis prompts
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        let info = &self.personal_info;

        push_line(&mut out, &info.full_name);
        let contact: Vec<&str> = [&info.email, &info.phone, &info.location, &info.website]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !contact.is_empty() {
            push_line(&mut out, &contact.join(" | "));
        }

        push_block(&mut out, "Summary", &self.summary);

        if !self.experience.is_empty() {
            out.push_str("\nExperience\n");
            for exp in &self.experience {
                push_line(&mut out, &entry_heading(&exp.role, &exp.company, &exp.start_date, &exp.end_date));
                push_line(&mut out, &exp.description);
            }
        }

        if !self.education.is_empty() {
            out.push_str("\nEducation\n");
            for edu in &self.education {
                push_line(&mut out, &entry_heading(&edu.degree, &edu.school, &edu.start_date, &edu.end_date));
                push_line(&mut out, &edu.description);
            }
        }

        if !self.projects.is_empty() {
            out.push_str("\nProjects\n");
            for project in &self.projects {
                push_line(&mut out, &entry_heading(&project.name, &project.role, &project.start_date, &project.end_date));
                push_line(&mut out, &project.description);
            }
        }

        push_block(&mut out, "Skills", &self.skills);
        push_block(&mut out, "Certifications", &self.certifications);
        push_block(&mut out, "Awards", &self.awards);
        push_block(&mut out, "Languages", &self.languages);
        push_block(&mut out, "Links", &self.social_links);

        out.trim().to_string()
    }
}

/// "Primary at Secondary (start - end)", dropping empty parts
pub fn entry_heading(primary: &str, secondary: &str, start: &str, end: &str) -> String {
    let mut heading = match (primary.trim(), secondary.trim()) {
        ("", "") => String::new(),
        (p, "") => p.to_string(),
        ("", s) => s.to_string(),
        (p, s) => format!("{} at {}", p, s),
    };
    let dates = date_range(start, end);
    if !dates.is_empty() {
        if !heading.is_empty() {
            heading.push(' ');
        }
        heading.push_str(&format!("({})", dates));
    }
    heading
}

pub fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => format!("{} - Present", s),
        ("", e) => e.to_string(),
        (s, e) => format!("{} - {}", s, e),
    }
}

fn push_line(out: &mut String, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        out.push_str(line);
        out.push('\n');
    }
}

fn push_block(out: &mut String, heading: &str, body: &str) {
    if !body.trim().is_empty() {
        out.push('\n');
        out.push_str(heading);
        out.push('\n');
        push_line(out, body);
    }
}
