//! Managed backend platform: tables and object storage

pub mod client;
pub mod profiles;
pub mod resumes;
pub mod storage;

pub use client::BackendClient;
pub use profiles::{Profile, ProfileStore, RestProfileStore};
pub use resumes::{ResumeRepository, RestResumeRepository};
pub use storage::FileStorage;
