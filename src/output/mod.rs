//! Output: resume previews, PDF export, analysis reports

pub mod formatter;
pub mod pdf;
pub mod preview;
