//! Resume content: data model and form state

pub mod form;
pub mod model;

pub use form::{FormStatus, ResumeForm};
pub use model::{NewResume, ResumeData, ResumeRecord, ResumeStatus, ResumeUpdate, Section};
