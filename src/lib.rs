//! Resume studio library

pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod resume;
pub mod storage;

pub use config::Config;
pub use error::{Result, ResumeStudioError};
