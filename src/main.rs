//! Resume studio: build, sync, preview, export, and analyze resumes

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_studio::auth::{AuthClient, SessionHolder, User};
use resume_studio::backend::{BackendClient, FileStorage, ResumeRepository, RestProfileStore, RestResumeRepository};
use resume_studio::cli::{self, Cli, Commands, ConfigAction, FormAction, ResumeAction};
use resume_studio::input::InputManager;
use resume_studio::llm::analyzer::ResumeAnalyzer;
use resume_studio::llm::client::GeminiClient;
use resume_studio::output::formatter::{save_to_file, OutputFormat, ReportGenerator};
use resume_studio::output::pdf::PdfExporter;
use resume_studio::output::preview::{render_html, render_text, TemplateKind};
use resume_studio::resume::{ResumeData, ResumeForm, ResumeStatus, ResumeUpdate, Section};
use resume_studio::storage::LocalStore;
use resume_studio::{Config, Result, ResumeStudioError};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

/// Everything a command needs to talk to the account
struct App {
    config: Config,
    store: LocalStore,
    backend: BackendClient,
    auth: AuthClient,
    session: SessionHolder<RestProfileStore>,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        config.ensure_backend()?;
        let store = LocalStore::new(config.local_store_path());
        let backend = BackendClient::from_config(&config.backend)?;
        let auth = AuthClient::new(
            backend.clone(),
            store.clone(),
            config.backend.oauth_provider.clone(),
            config.backend.redirect_url.clone(),
        );
        let session = SessionHolder::new(RestProfileStore::new(backend.clone()));
        Ok(Self {
            config,
            store,
            backend,
            auth,
            session,
        })
    }

    /// The signed-in user and a client carrying their token
    async fn signed_in(&self) -> Result<(User, BackendClient)> {
        let mut events = self.auth.subscribe();
        let restored = self.auth.restore_session().await?;
        self.session.apply_pending(&mut events).await;

        match (restored, self.session.current_user()) {
            (Some(session), Some(user)) => Ok((user, self.backend.clone().with_access_token(session.access_token))),
            _ => Err(ResumeStudioError::NotAuthenticated),
        }
    }

    fn form(&self) -> Result<ResumeForm> {
        ResumeForm::load(self.store.clone())
    }
}

/// The draft works without an account, so it only needs the local store
fn local_form(config: &Config) -> Result<ResumeForm> {
    ResumeForm::load(LocalStore::new(config.local_store_path()))
}

fn template_or_default(config: &Config, template: Option<String>) -> Result<TemplateKind> {
    match template {
        Some(name) => name.parse(),
        None => Ok(config.preview.default_template),
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Login { callback } => {
            let app = App::new(config)?;
            let callback = match callback {
                Some(url) => url,
                None => {
                    println!("🔐 Open this URL in your browser to sign in:\n");
                    println!("   {}\n", app.auth.authorize_url()?);
                    prompt_line("Paste the URL you were redirected to: ")?
                }
            };

            let mut events = app.auth.subscribe();
            let session = app.auth.sign_in_with_callback(&callback).await?;
            app.session.apply_pending(&mut events).await;

            let name = session
                .user
                .full_name()
                .or_else(|| session.user.email.clone())
                .unwrap_or_else(|| session.user.id.clone());
            println!("✅ Signed in as {}", name);
        }

        Commands::Logout => {
            let app = App::new(config)?;
            let mut events = app.auth.subscribe();
            app.auth.sign_out().await?;
            app.session.apply_pending(&mut events).await;
            println!("👋 Signed out");
        }

        Commands::Whoami => {
            let app = App::new(config)?;
            match app.signed_in().await {
                Ok((user, _)) => {
                    println!("👤 {}", user.full_name().unwrap_or_else(|| "(no name)".to_string()));
                    if let Some(email) = &user.email {
                        println!("   Email: {}", email);
                    }
                    println!("   ID: {}", user.id);
                }
                Err(ResumeStudioError::NotAuthenticated) => println!("Not signed in. Run `resume-studio login`."),
                Err(e) => return Err(e),
            }
        }

        Commands::Form { action } => {
            let mut form = local_form(&config)?;
            match action {
                FormAction::Show { json } => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(form.data())?);
                    } else {
                        println!("{}", render_text(form.data(), config.preview.color_output));
                    }
                    if let Some(id) = form.record_id() {
                        println!("\n(saved as {})", id);
                    }
                }
                FormAction::Set { field, value } => {
                    form.set_field(&field, &value)?;
                    println!("✏️  {} updated", field);
                }
                FormAction::Add { section } => {
                    let section: Section = section.parse()?;
                    let index = form.add_entry(section)?;
                    println!("➕ Added {} entry #{}", section, index);
                    println!("💡 Fill it in with: resume-studio form set {}.{}.<field> <value>", section, index);
                }
                FormAction::Remove { section, index } => {
                    let section: Section = section.parse()?;
                    form.remove_entry(section, index)?;
                    println!("🗑️  Removed {} entry #{}", section, index);
                }
                FormAction::Import { file } => {
                    cli::validate_file_extension(&file, &["json"])
                        .map_err(|e| ResumeStudioError::InvalidInput(format!("Resume data file: {}", e)))?;
                    let content = tokio::fs::read_to_string(&file).await?;
                    let imported: ResumeData = serde_json::from_str(&content)?;
                    form.edit(|data| *data = imported)?;
                    println!("📥 Imported {}", file.display());
                }
                FormAction::Reset => {
                    form.reset()?;
                    println!("🔄 Draft cleared");
                }
            }
        }

        Commands::Resumes { action } => {
            let app = App::new(config)?;
            let (user, client) = app.signed_in().await?;
            let repo = RestResumeRepository::new(client);

            match action {
                ResumeAction::List => {
                    let records = repo.list_by_user(&user.id).await?;
                    if records.is_empty() {
                        println!("No saved resumes yet. Save the draft with: resume-studio resumes save");
                    }
                    for record in records {
                        let updated = record
                            .updated_at
                            .or(record.created_at)
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        println!("📄 {}  {}  [{}]  {}", record.id, record.title, record.status, updated);
                    }
                }
                ResumeAction::Save { complete } => {
                    let mut form = app.form()?;
                    let result = if complete {
                        form.save_with_status(&repo, &user.id, ResumeStatus::Complete).await
                    } else {
                        form.save(&repo, &user.id).await
                    };
                    println!("{}", form.status());
                    result?;
                }
                ResumeAction::Open { id } => {
                    let mut form = app.form()?;
                    let result = form.open(&repo, &id).await;
                    println!("{}", form.status());
                    result?;
                }
            }
        }

        Commands::Upload { file, resume_id } => {
            info!("Uploading {}", file.display());
            // Reject unsupported files before touching the network
            resume_studio::backend::storage::validate_upload(&file)?;

            let app = App::new(config)?;
            let (user, client) = app.signed_in().await?;
            let storage = FileStorage::new(client.clone(), app.config.backend.bucket.clone());
            let object = storage.upload(&user.id, &file).await?;
            println!("☁️  Uploaded to {}", object);

            if let Some(id) = resume_id {
                let repo = RestResumeRepository::new(client);
                let update = ResumeUpdate {
                    file_path: Some(object),
                    ..Default::default()
                };
                repo.update(&id, &update).await?;
                println!("🔗 Attached to resume {}", id);
            }
        }

        Commands::Analyze {
            resume,
            stored,
            job,
            output,
            save,
        } => {
            info!("Starting resume analysis");

            cli::validate_file_extension(&job, &["txt", "md", "pdf", "docx"])
                .map_err(|e| ResumeStudioError::InvalidInput(format!("Job description file: {}", e)))?;
            let output_format: OutputFormat = output.parse()?;

            let mut input_manager = InputManager::new();
            let resume_text = match (&resume, &stored) {
                (Some(path), _) => {
                    println!("📄 Resume: {}", path.display());
                    input_manager.extract_text(path).await?
                }
                (None, Some(object)) => {
                    println!("📄 Resume: {} (uploaded)", object);
                    let app = App::new(config.clone())?;
                    let (_, client) = app.signed_in().await?;
                    let bytes = FileStorage::new(client, app.config.backend.bucket.clone())
                        .download(object)
                        .await?;
                    input_manager.extract_bytes(object, &bytes)?
                }
                (None, None) => {
                    println!("📄 Resume: local draft");
                    local_form(&config)?.data().to_plain_text()
                }
            };
            println!("💼 Job Description: {}", job.display());
            let job_text = input_manager.extract_text(&job).await?;

            let provider = GeminiClient::from_config(&config.ai)?;
            let analyzer = ResumeAnalyzer::new(provider);

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .map_err(|e| ResumeStudioError::Configuration(e.to_string()))?,
            );
            spinner.set_message("Analyzing resume against the job description...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            let outcome = analyzer.analyze(&resume_text, &job_text).await;
            spinner.finish_and_clear();
            let outcome = outcome?;

            if !outcome.is_structured() {
                println!("⚠️  {}", outcome.status());
            }

            let report = ReportGenerator::new(config.preview.color_output).generate(&outcome, output_format)?;
            println!("{}", report);

            if let Some(path) = save {
                // Files never carry terminal colors
                let plain = ReportGenerator::new(false).generate(&outcome, output_format)?;
                save_to_file(&plain, &path)?;
                println!("💾 Saved report to {}", path.display());
            }
        }

        Commands::Preview { template, save } => {
            let kind = template_or_default(&config, template)?;
            let form = local_form(&config)?;
            let html = render_html(form.data(), kind)?;
            match save {
                Some(path) => {
                    save_to_file(&html, &path)?;
                    println!("🖼️  Wrote {} preview to {}", kind, path.display());
                }
                None => println!("{}", html),
            }
        }

        Commands::Export { output, template } => {
            let kind = template_or_default(&config, template)?;
            let form = local_form(&config)?;
            export_pdf(form.data(), kind, &output)?;
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Backend URL: {}", config.backend.url);
                println!("Backend key: {}", mask(&config.backend.anon_key));
                println!("Storage bucket: {}", config.backend.bucket);
                println!("Sign-in provider: {}", config.backend.oauth_provider);
                println!("Redirect URL: {}", config.backend.redirect_url);
                println!("\nAI endpoint: {}", config.ai.endpoint);
                println!("AI model: {}", config.ai.model);
                println!("AI key: {}", mask(&config.ai.api_key));
                println!("\nDefault template: {}", config.preview.default_template);
                println!("Data directory: {}", config.storage.data_dir.display());
            }
            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }
            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

/// Export failures are reported to the user and end the process with an error code
fn export_pdf(data: &ResumeData, kind: TemplateKind, output: &Path) -> Result<()> {
    match PdfExporter::new(kind).export(data, output) {
        Ok(()) => {
            println!("📑 Exported {} to {}", data.display_title(), output.display());
            Ok(())
        }
        Err(e) => {
            println!("❌ Error exporting PDF: {}", e);
            Err(e)
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        return Err(ResumeStudioError::InvalidInput("No redirect URL given".to_string()));
    }
    Ok(line)
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        format!("{}…", secret.chars().take(4).collect::<String>())
    }
}
