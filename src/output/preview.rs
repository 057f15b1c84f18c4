//! Resume preview layouts

use crate::error::{Result, ResumeStudioError};
use crate::resume::model::{date_range, ResumeData};
use askama::Template;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Classic,
    Modern,
    Minimal,
}

impl TemplateKind {
    pub fn all() -> [TemplateKind; 3] {
        [TemplateKind::Classic, TemplateKind::Modern, TemplateKind::Minimal]
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Classic => write!(f, "classic"),
            TemplateKind::Modern => write!(f, "modern"),
            TemplateKind::Minimal => write!(f, "minimal"),
        }
    }
}

impl FromStr for TemplateKind {
    type Err = ResumeStudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(TemplateKind::Classic),
            "modern" => Ok(TemplateKind::Modern),
            "minimal" => Ok(TemplateKind::Minimal),
            _ => Err(ResumeStudioError::InvalidInput(format!(
                "Unknown template: {}. Available: classic, modern, minimal",
                s
            ))),
        }
    }
}

/// One experience, education, or project entry ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub heading: String,
    pub subheading: String,
    pub dates: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraView {
    pub label: String,
    pub body: String,
}

/// Display projection of resume data shared by every layout; empty parts are dropped
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeView {
    pub name: String,
    pub title: String,
    pub contact: Vec<String>,
    pub summary: String,
    pub experience: Vec<EntryView>,
    pub education: Vec<EntryView>,
    pub projects: Vec<EntryView>,
    pub extras: Vec<ExtraView>,
}

impl ResumeView {
    pub fn from_data(data: &ResumeData) -> Self {
        let info = &data.personal_info;
        let contact = [&info.email, &info.phone, &info.location, &info.website]
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let extras = [
            ("Skills", &data.skills),
            ("Certifications", &data.certifications),
            ("Awards", &data.awards),
            ("Languages", &data.languages),
            ("Links", &data.social_links),
        ]
        .iter()
        .filter(|(_, body)| !body.trim().is_empty())
        .map(|(label, body)| ExtraView {
            label: label.to_string(),
            body: body.trim().to_string(),
        })
        .collect();

        Self {
            name: non_empty_or(&info.full_name, "Your Name"),
            title: data.title.trim().to_string(),
            contact,
            summary: data.summary.trim().to_string(),
            experience: data
                .experience
                .iter()
                .map(|e| entry(&e.role, &e.company, &e.start_date, &e.end_date, &e.description))
                .filter(|e| !is_blank(e))
                .collect(),
            education: data
                .education
                .iter()
                .map(|e| entry(&e.degree, &e.school, &e.start_date, &e.end_date, &e.description))
                .filter(|e| !is_blank(e))
                .collect(),
            projects: data
                .projects
                .iter()
                .map(|p| entry(&p.name, &p.role, &p.start_date, &p.end_date, &p.description))
                .filter(|e| !is_blank(e))
                .collect(),
            extras,
        }
    }

    /// Sections in display order as (label, entries)
    pub fn sections(&self) -> [(&'static str, &[EntryView]); 3] {
        [
            ("Experience", &self.experience),
            ("Education", &self.education),
            ("Projects", &self.projects),
        ]
    }
}

fn entry(heading: &str, subheading: &str, start: &str, end: &str, description: &str) -> EntryView {
    EntryView {
        heading: heading.trim().to_string(),
        subheading: subheading.trim().to_string(),
        dates: date_range(start, end),
        description: description.trim().to_string(),
    }
}

fn is_blank(entry: &EntryView) -> bool {
    entry.heading.is_empty() && entry.subheading.is_empty() && entry.dates.is_empty() && entry.description.is_empty()
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{{ v.name }}</title>
    <style>
        body { font-family: Georgia, 'Times New Roman', serif; color: #222; max-width: 800px; margin: 0 auto; padding: 40px; }
        header { text-align: center; border-bottom: 2px solid #222; padding-bottom: 12px; }
        h1 { margin: 0; font-size: 2em; letter-spacing: 1px; }
        h2 { font-size: 1.1em; text-transform: uppercase; border-bottom: 1px solid #999; margin-top: 24px; }
        .entry { margin: 10px 0; }
        .entry-head { display: flex; justify-content: space-between; font-weight: bold; }
        .sub { font-style: italic; }
        .contact { color: #555; }
    </style>
</head>
<body>
    <header>
        <h1>{{ v.name }}</h1>
        {% if !v.title.is_empty() %}<p>{{ v.title }}</p>{% endif %}
        {% if !v.contact.is_empty() %}<p class="contact">{{ v.contact.join(" | ") }}</p>{% endif %}
    </header>
    {% if !v.summary.is_empty() %}
    <section>
        <h2>Summary</h2>
        <p>{{ v.summary }}</p>
    </section>
    {% endif %}
    {% for (label, entries) in v.sections() %}
    {% if !entries.is_empty() %}
    <section>
        <h2>{{ label }}</h2>
        {% for e in entries %}
        <div class="entry">
            <div class="entry-head"><span>{{ e.heading }}</span><span>{{ e.dates }}</span></div>
            {% if !e.subheading.is_empty() %}<div class="sub">{{ e.subheading }}</div>{% endif %}
            {% if !e.description.is_empty() %}<p>{{ e.description }}</p>{% endif %}
        </div>
        {% endfor %}
    </section>
    {% endif %}
    {% endfor %}
    {% for x in v.extras %}
    <section>
        <h2>{{ x.label }}</h2>
        <p>{{ x.body }}</p>
    </section>
    {% endfor %}
</body>
</html>"#, ext = "html")]
struct ClassicTemplate<'a> {
    v: &'a ResumeView,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{{ v.name }}</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; color: #333; }
        .layout { display: grid; grid-template-columns: 260px 1fr; min-height: 100vh; }
        aside { background: #1f3a5f; color: #fff; padding: 32px 24px; }
        aside h1 { font-size: 1.6em; margin: 0 0 6px; }
        aside .title { color: #9ec5ff; margin-bottom: 20px; }
        aside h3 { color: #9ec5ff; font-size: 0.9em; text-transform: uppercase; margin-top: 24px; }
        main { padding: 32px 40px; }
        main h2 { color: #1f3a5f; border-left: 4px solid #007acc; padding-left: 10px; }
        .entry { margin-bottom: 16px; }
        .entry strong { color: #1f3a5f; }
        .dates { color: #888; font-size: 0.9em; float: right; }
    </style>
</head>
<body>
<div class="layout">
    <aside>
        <h1>{{ v.name }}</h1>
        {% if !v.title.is_empty() %}<div class="title">{{ v.title }}</div>{% endif %}
        {% for c in v.contact %}<div>{{ c }}</div>{% endfor %}
        {% for x in v.extras %}
        <h3>{{ x.label }}</h3>
        <p>{{ x.body }}</p>
        {% endfor %}
    </aside>
    <main>
        {% if !v.summary.is_empty() %}
        <h2>Profile</h2>
        <p>{{ v.summary }}</p>
        {% endif %}
        {% for (label, entries) in v.sections() %}
        {% if !entries.is_empty() %}
        <h2>{{ label }}</h2>
        {% for e in entries %}
        <div class="entry">
            <span class="dates">{{ e.dates }}</span>
            <strong>{{ e.heading }}</strong>{% if !e.subheading.is_empty() %} · {{ e.subheading }}{% endif %}
            {% if !e.description.is_empty() %}<p>{{ e.description }}</p>{% endif %}
        </div>
        {% endfor %}
        {% endif %}
        {% endfor %}
    </main>
</div>
</body>
</html>"#, ext = "html")]
struct ModernTemplate<'a> {
    v: &'a ResumeView,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{{ v.name }}</title>
    <style>
        body { font-family: 'Helvetica Neue', Arial, sans-serif; color: #111; max-width: 720px; margin: 48px auto; line-height: 1.5; }
        h1 { font-weight: 300; font-size: 2.2em; margin-bottom: 0; }
        h2 { font-weight: 400; font-size: 0.85em; letter-spacing: 2px; text-transform: uppercase; color: #777; margin-top: 32px; }
        .muted { color: #777; }
    </style>
</head>
<body>
    <h1>{{ v.name }}</h1>
    <p class="muted">{% if !v.title.is_empty() %}{{ v.title }}{% if !v.contact.is_empty() %} · {% endif %}{% endif %}{{ v.contact.join(" · ") }}</p>
    {% if !v.summary.is_empty() %}<p>{{ v.summary }}</p>{% endif %}
    {% for (label, entries) in v.sections() %}
    {% if !entries.is_empty() %}
    <h2>{{ label }}</h2>
    {% for e in entries %}
    <p><strong>{{ e.heading }}</strong>{% if !e.subheading.is_empty() %}, {{ e.subheading }}{% endif %} <span class="muted">{{ e.dates }}</span>{% if !e.description.is_empty() %}<br>{{ e.description }}{% endif %}</p>
    {% endfor %}
    {% endif %}
    {% endfor %}
    {% for x in v.extras %}
    <h2>{{ x.label }}</h2>
    <p>{{ x.body }}</p>
    {% endfor %}
</body>
</html>"#, ext = "html")]
struct MinimalTemplate<'a> {
    v: &'a ResumeView,
}

/// Render the resume as a standalone HTML page in the chosen layout
pub fn render_html(data: &ResumeData, kind: TemplateKind) -> Result<String> {
    let view = ResumeView::from_data(data);
    let html = match kind {
        TemplateKind::Classic => ClassicTemplate { v: &view }.render()?,
        TemplateKind::Modern => ModernTemplate { v: &view }.render()?,
        TemplateKind::Minimal => MinimalTemplate { v: &view }.render()?,
    };
    Ok(html)
}

/// Terminal preview
pub fn render_text(data: &ResumeData, use_colors: bool) -> String {
    let view = ResumeView::from_data(data);
    let paint = |text: &str, heading: bool| -> String {
        match (use_colors, heading) {
            (true, true) => text.bold().cyan().to_string(),
            (true, false) => text.bold().to_string(),
            (false, _) => text.to_string(),
        }
    };

    let mut out = String::new();
    out.push_str(&paint(&view.name, true));
    out.push('\n');
    if !view.title.is_empty() {
        out.push_str(&view.title);
        out.push('\n');
    }
    if !view.contact.is_empty() {
        out.push_str(&view.contact.join(" | "));
        out.push('\n');
    }
    out.push_str(&"=".repeat(50));
    out.push('\n');

    if !view.summary.is_empty() {
        out.push_str(&format!("\n{}\n{}\n", paint("SUMMARY", true), view.summary));
    }

    for (label, entries) in view.sections() {
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}\n", paint(&label.to_uppercase(), true)));
        for e in entries {
            let mut line = paint(&e.heading, false);
            if !e.subheading.is_empty() {
                line.push_str(&format!(" - {}", e.subheading));
            }
            if !e.dates.is_empty() {
                line.push_str(&format!(" ({})", e.dates));
            }
            out.push_str(&format!("  • {}\n", line));
            if !e.description.is_empty() {
                for desc_line in e.description.lines() {
                    out.push_str(&format!("    {}\n", desc_line.trim()));
                }
            }
        }
    }

    for extra in &view.extras {
        out.push_str(&format!("\n{}\n{}\n", paint(&extra.label.to_uppercase(), true), extra.body));
    }

    out
}
