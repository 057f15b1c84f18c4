//! Editable resume form state, mirrored into local storage on every change

use crate::backend::resumes::ResumeRepository;
use crate::error::{Result, ResumeStudioError};
use crate::resume::model::{
    Education, Experience, NewResume, Project, ResumeData, ResumeStatus, ResumeUpdate, Section,
};
use crate::storage::LocalStore;
use log::{error, info, warn};
use std::fmt;

pub const DRAFT_KEY: &str = "resume-draft";
pub const DRAFT_ID_KEY: &str = "resume-draft-id";

#[derive(Debug, Clone, PartialEq)]
pub enum FormStatus {
    Idle,
    Saved(String),
    Loaded(String),
    Error(String),
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormStatus::Idle => write!(f, "Unsaved changes are kept locally"),
            FormStatus::Saved(id) => write!(f, "Resume saved successfully ({})", id),
            FormStatus::Loaded(id) => write!(f, "Loaded resume {}", id),
            FormStatus::Error(message) => write!(f, "{}", message),
        }
    }
}

pub struct ResumeForm {
    data: ResumeData,
    record_id: Option<String>,
    status: FormStatus,
    store: LocalStore,
}

impl ResumeForm {
    /// Restore the draft left in local storage, or start empty
    pub fn load(store: LocalStore) -> Result<Self> {
        let data = store.get::<ResumeData>(DRAFT_KEY)?.unwrap_or_default();
        let record_id = store.get::<String>(DRAFT_ID_KEY)?;
        Ok(Self {
            data,
            record_id,
            status: FormStatus::Idle,
            store,
        })
    }

    pub fn data(&self) -> &ResumeData {
        &self.data
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn edit<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ResumeData),
    {
        f(&mut self.data);
        self.persist()
    }

    /// Set one field by dotted path, e.g. `summary`, `personal.email`, `experience.0.company`
    pub fn set_field(&mut self, path: &str, value: &str) -> Result<()> {
        let target = field_mut(&mut self.data, path)?;
        *target = value.to_string();
        self.persist()
    }

    /// Append an empty entry and return its index
    pub fn add_entry(&mut self, section: Section) -> Result<usize> {
        let index = self.data.entry_count(section);
        match section {
            Section::Experience => self.data.experience.push(Experience::default()),
            Section::Education => self.data.education.push(Education::default()),
            Section::Projects => self.data.projects.push(Project::default()),
        }
        self.persist()?;
        Ok(index)
    }

    pub fn remove_entry(&mut self, section: Section, index: usize) -> Result<()> {
        let len = self.data.entry_count(section);
        if index >= len {
            return Err(out_of_range(section, index, len));
        }
        match section {
            Section::Experience => {
                self.data.experience.remove(index);
            }
            Section::Education => {
                self.data.education.remove(index);
            }
            Section::Projects => {
                self.data.projects.remove(index);
            }
        }
        self.persist()
    }

    /// Create the remote record on first save, update it afterwards.
    ///
    /// On failure the status carries the message and the form data is left as it was.
    /// A new record is created as a draft; updates leave the remote status alone.
    pub async fn save<R: ResumeRepository>(&mut self, repo: &R, user_id: &str) -> Result<String> {
        self.save_record(repo, user_id, None).await
    }

    /// Save and set the record's status, e.g. to mark the resume complete
    pub async fn save_with_status<R: ResumeRepository>(
        &mut self,
        repo: &R,
        user_id: &str,
        status: ResumeStatus,
    ) -> Result<String> {
        self.save_record(repo, user_id, Some(status)).await
    }

    async fn save_record<R: ResumeRepository>(
        &mut self,
        repo: &R,
        user_id: &str,
        status: Option<ResumeStatus>,
    ) -> Result<String> {
        let result = match self.record_id.as_deref() {
            Some(id) => {
                let update = ResumeUpdate {
                    status,
                    ..ResumeUpdate::from_data(self.data.clone())
                };
                repo.update(id, &update).await
            }
            None => {
                let mut resume = NewResume::from_data(self.data.clone());
                if let Some(status) = status {
                    resume.status = status;
                }
                repo.create(user_id, &resume).await
            }
        };

        match result {
            Ok(record) => {
                info!("Saved resume {} ({})", record.id, record.status);
                self.record_id = Some(record.id.clone());
                self.status = FormStatus::Saved(record.id.clone());
                // In-memory state already points at the remote record
                if let Err(e) = self.store.set(DRAFT_ID_KEY, &record.id) {
                    warn!("Saved resume {} but could not remember its id locally: {}", record.id, e);
                }
                Ok(record.id)
            }
            Err(e) => {
                error!("Error saving resume: {}", e);
                self.status = FormStatus::Error(format!("Error saving resume: {}", e));
                Err(e)
            }
        }
    }

    /// Replace the form with a stored record
    pub async fn open<R: ResumeRepository>(&mut self, repo: &R, id: &str) -> Result<()> {
        match repo.fetch(id).await {
            Ok(record) => {
                self.data = record.data;
                self.record_id = Some(record.id.clone());
                self.status = FormStatus::Loaded(record.id.clone());
                if let Err(e) = self.store.set(DRAFT_ID_KEY, &record.id).and_then(|_| self.persist()) {
                    warn!("Loaded resume {} but could not keep it as the local draft: {}", record.id, e);
                }
                Ok(())
            }
            Err(e) => {
                error!("Error loading resume {}: {}", id, e);
                self.status = FormStatus::Error(format!("Error loading resume: {}", e));
                Err(e)
            }
        }
    }

    /// Start over with an empty form and forget the draft
    pub fn reset(&mut self) -> Result<()> {
        self.data = ResumeData::default();
        self.record_id = None;
        self.status = FormStatus::Idle;
        self.store.remove(DRAFT_KEY)?;
        self.store.remove(DRAFT_ID_KEY)?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.store.set(DRAFT_KEY, &self.data)
    }
}

fn out_of_range(section: Section, index: usize, len: usize) -> ResumeStudioError {
    ResumeStudioError::InvalidInput(format!(
        "No {} entry at index {} ({} entries)",
        section, index, len
    ))
}

fn unknown_field(path: &str) -> ResumeStudioError {
    ResumeStudioError::InvalidInput(format!("Unknown field: {}", path))
}

fn field_mut<'a>(data: &'a mut ResumeData, path: &str) -> Result<&'a mut String> {
    let parts: Vec<&str> = path.split('.').map(str::trim).collect();

    match parts.as_slice() {
        ["title"] => Ok(&mut data.title),
        ["summary"] => Ok(&mut data.summary),
        ["skills"] => Ok(&mut data.skills),
        ["certifications"] => Ok(&mut data.certifications),
        ["awards"] => Ok(&mut data.awards),
        ["languages"] => Ok(&mut data.languages),
        ["social_links"] | ["socialLinks"] | ["links"] => Ok(&mut data.social_links),
        ["personal", field] => {
            let info = &mut data.personal_info;
            match *field {
                "full_name" | "fullName" | "name" => Ok(&mut info.full_name),
                "email" => Ok(&mut info.email),
                "phone" => Ok(&mut info.phone),
                "location" => Ok(&mut info.location),
                "website" => Ok(&mut info.website),
                _ => Err(unknown_field(path)),
            }
        }
        [section, index, field] => {
            let section: Section = section.parse()?;
            let index: usize = index.parse().map_err(|_| {
                ResumeStudioError::InvalidInput(format!("Invalid index in field path: {}", path))
            })?;
            let len = data.entry_count(section);
            if index >= len {
                return Err(out_of_range(section, index, len));
            }
            let target = match section {
                Section::Experience => experience_field(&mut data.experience[index], field),
                Section::Education => education_field(&mut data.education[index], field),
                Section::Projects => project_field(&mut data.projects[index], field),
            };
            target.ok_or_else(|| unknown_field(path))
        }
        _ => Err(unknown_field(path)),
    }
}

fn experience_field<'a>(entry: &'a mut Experience, field: &str) -> Option<&'a mut String> {
    match field {
        "company" => Some(&mut entry.company),
        "role" | "position" => Some(&mut entry.role),
        "start" | "start_date" | "startDate" => Some(&mut entry.start_date),
        "end" | "end_date" | "endDate" => Some(&mut entry.end_date),
        "description" => Some(&mut entry.description),
        _ => None,
    }
}

fn education_field<'a>(entry: &'a mut Education, field: &str) -> Option<&'a mut String> {
    match field {
        "school" | "institution" => Some(&mut entry.school),
        "degree" => Some(&mut entry.degree),
        "start" | "start_date" | "startDate" => Some(&mut entry.start_date),
        "end" | "end_date" | "endDate" => Some(&mut entry.end_date),
        "description" => Some(&mut entry.description),
        _ => None,
    }
}

fn project_field<'a>(entry: &'a mut Project, field: &str) -> Option<&'a mut String> {
    match field {
        "name" => Some(&mut entry.name),
        "role" => Some(&mut entry.role),
        "start" | "start_date" | "startDate" => Some(&mut entry.start_date),
        "end" | "end_date" | "endDate" => Some(&mut entry.end_date),
        "description" => Some(&mut entry.description),
        _ => None,
    }
}
