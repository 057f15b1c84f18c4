//! CLI interface for resume studio

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-studio")]
#[command(about = "Build, preview, export, and analyze resumes")]
#[command(long_about = "Edit a resume section by section, sync it to your account, preview it in several layouts, export it to PDF, and get AI feedback against a job description")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with the configured identity provider
    Login {
        /// Redirect URL from the browser after signing in (prompted for when omitted)
        #[arg(long)]
        callback: Option<String>,
    },

    /// Sign out and forget the local session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Edit the local resume draft
    Form {
        #[command(subcommand)]
        action: FormAction,
    },

    /// Saved resumes in your account
    Resumes {
        #[command(subcommand)]
        action: ResumeAction,
    },

    /// Upload a resume file (PDF, DOCX, JSON) to your account
    Upload {
        /// File to upload
        file: PathBuf,

        /// Attach the uploaded file to this saved resume
        #[arg(long)]
        resume_id: Option<String>,
    },

    /// Get AI feedback on a resume for a job description
    Analyze {
        /// Resume file (PDF, DOCX, JSON, TXT, MD); the local draft is used when omitted
        #[arg(short, long, conflicts_with = "stored")]
        resume: Option<PathBuf>,

        /// Analyze a previously uploaded file, by its storage path
        #[arg(long)]
        stored: Option<String>,

        /// Job description file (TXT, MD, PDF, DOCX)
        #[arg(short, long)]
        job: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Render the draft with a template as HTML
    Preview {
        /// Template: classic, modern, minimal
        #[arg(short, long)]
        template: Option<String>,

        /// Write the HTML here instead of printing it
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Export the draft to a PDF file
    Export {
        /// Output file
        #[arg(short, long, default_value = "resume.pdf")]
        output: PathBuf,

        /// Template: classic, modern, minimal
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum FormAction {
    /// Print the draft
    Show {
        /// Print the raw JSON instead of the text preview
        #[arg(long)]
        json: bool,
    },

    /// Set a field, e.g. `summary`, `personal.email`, `experience.0.company`
    Set {
        field: String,
        value: String,
    },

    /// Append an empty entry to experience, education, or projects
    Add {
        section: String,
    },

    /// Remove an entry by index
    Remove {
        section: String,
        index: usize,
    },

    /// Replace the draft with the contents of a resume JSON file
    Import {
        file: PathBuf,
    },

    /// Discard the draft
    Reset,
}

#[derive(Subcommand)]
pub enum ResumeAction {
    /// List your saved resumes
    List,

    /// Save the draft (creates on first save, updates afterwards)
    Save {
        /// Mark the saved resume as complete instead of a draft
        #[arg(long)]
        complete: bool,
    },

    /// Load a saved resume into the draft
    Open {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
