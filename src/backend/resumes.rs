//! Resume record access against the `resumes` table

use crate::backend::client::BackendClient;
use crate::error::{Result, ResumeStudioError};
use crate::resume::model::{NewResume, ResumeRecord, ResumeUpdate};
use chrono::{DateTime, Utc};
use log::info;
use reqwest::Method;
use serde::Serialize;
use std::future::Future;

const RESUMES_PATH: &str = "rest/v1/resumes";

pub trait ResumeRepository {
    fn create(
        &self,
        user_id: &str,
        resume: &NewResume,
    ) -> impl Future<Output = Result<ResumeRecord>> + Send;

    /// Newest first
    fn list_by_user(&self, user_id: &str) -> impl Future<Output = Result<Vec<ResumeRecord>>> + Send;

    fn fetch(&self, id: &str) -> impl Future<Output = Result<ResumeRecord>> + Send;

    fn update(
        &self,
        id: &str,
        update: &ResumeUpdate,
    ) -> impl Future<Output = Result<ResumeRecord>> + Send;
}

#[derive(Serialize)]
struct InsertRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    resume: &'a NewResume,
}

#[derive(Serialize)]
struct PatchRow<'a> {
    #[serde(flatten)]
    update: &'a ResumeUpdate,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RestResumeRepository {
    client: BackendClient,
}

impl RestResumeRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn first_row(rows: Vec<ResumeRecord>, context: &str) -> Result<ResumeRecord> {
        rows.into_iter().next().ok_or_else(|| {
            ResumeStudioError::ResponseParse(format!("{} returned no rows", context))
        })
    }
}

impl ResumeRepository for RestResumeRepository {
    async fn create(&self, user_id: &str, resume: &NewResume) -> Result<ResumeRecord> {
        let url = self.client.endpoint(RESUMES_PATH)?;
        let request = self
            .client
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&InsertRow { user_id, resume });

        let rows: Vec<ResumeRecord> = self.client.send(request).await?.json().await?;
        let record = Self::first_row(rows, "insert")?;
        info!("Created resume {} for user {}", record.id, user_id);
        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ResumeRecord>> {
        let url = self.client.endpoint(RESUMES_PATH)?;
        let request = self.client.request(Method::GET, url).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "created_at.desc".to_string()),
        ]);

        Ok(self.client.send(request).await?.json().await?)
    }

    async fn fetch(&self, id: &str) -> Result<ResumeRecord> {
        let url = self.client.endpoint(RESUMES_PATH)?;
        let request = self
            .client
            .request(Method::GET, url)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);

        let rows: Vec<ResumeRecord> = self.client.send(request).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ResumeStudioError::NotFound(format!("resume {}", id)))
    }

    async fn update(&self, id: &str, update: &ResumeUpdate) -> Result<ResumeRecord> {
        let url = self.client.endpoint(RESUMES_PATH)?;
        let request = self
            .client
            .request(Method::PATCH, url)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&PatchRow {
                update,
                updated_at: Utc::now(),
            });

        let rows: Vec<ResumeRecord> = self.client.send(request).await?.json().await?;
        // PostgREST answers an update that matched nothing with an empty array
        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| ResumeStudioError::NotFound(format!("resume {}", id)))?;
        info!("Updated resume {}", record.id);
        Ok(record)
    }
}
