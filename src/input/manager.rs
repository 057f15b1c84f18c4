//! Input manager for handling different file types

use crate::error::{Result, ResumeStudioError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    docx_text, json_text, markdown_to_text, DocxExtractor, JsonExtractor, MarkdownExtractor, PdfExtractor,
    PlainTextExtractor, TextExtractor,
};
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Unsupported types are rejected before the file is touched
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let file_type = FileType::from_path(path);
        if file_type == FileType::Unknown {
            return Err(ResumeStudioError::UnsupportedFormat(path.display().to_string()));
        }

        let path_str = path.to_string_lossy().to_string();

        if let Some(cached_text) = self.cache.get(&path_str) {
            info!("Using cached text for: {}", path.display());
            return Ok(cached_text.clone());
        }

        if !path.exists() {
            return Err(ResumeStudioError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Docx => {
                info!("Extracting text from DOCX: {}", path.display());
                DocxExtractor.extract(path).await?
            }
            FileType::Json => {
                info!("Reading resume JSON: {}", path.display());
                JsonExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(ResumeStudioError::UnsupportedFormat(path.display().to_string()));
            }
        };

        self.cache.insert(path_str, text.clone());

        Ok(text)
    }

    /// Extract from content already in memory, such as a downloaded upload.
    /// The type comes from `name`'s extension; results are not cached.
    pub fn extract_bytes(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let file_type = FileType::from_path(Path::new(name));
        info!("Extracting {} text from {} ({} bytes)", file_type_label(file_type), name, bytes.len());

        match file_type {
            FileType::Pdf => pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
                ResumeStudioError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", name, e))
            }),
            FileType::Docx => docx_text(bytes)
                .map_err(|e| ResumeStudioError::DocxExtraction(format!("Failed to read DOCX '{}': {}", name, e))),
            FileType::Json | FileType::Text | FileType::Markdown => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| ResumeStudioError::InvalidInput(format!("{} is not UTF-8 text: {}", name, e)))?;
                match file_type {
                    FileType::Json => json_text(text),
                    FileType::Markdown => Ok(markdown_to_text(text)),
                    _ => Ok(text.to_string()),
                }
            }
            FileType::Unknown => Err(ResumeStudioError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn file_type_label(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Pdf => "PDF",
        FileType::Docx => "DOCX",
        FileType::Json => "JSON",
        FileType::Text => "plain",
        FileType::Markdown => "markdown",
        FileType::Unknown => "unknown",
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bytes_by_name() {
        let manager = InputManager::new();
        let text = manager
            .extract_bytes("u1/1_cv.json", br#"{"personalInfo": {"fullName": "Ada"}, "skills": "Math"}"#)
            .unwrap();
        assert!(text.starts_with("Ada"));
        assert!(text.contains("Math"));

        let md = manager.extract_bytes("notes.md", b"# Title\n\n*hi*").unwrap();
        assert_eq!(md, "Title\nhi");
    }

    #[test]
    fn test_extract_bytes_rejects_unknown_and_bad_utf8() {
        let manager = InputManager::new();
        assert!(matches!(
            manager.extract_bytes("cv.exe", b"MZ"),
            Err(ResumeStudioError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            manager.extract_bytes("cv.txt", &[0xff, 0xfe, 0x00]),
            Err(ResumeStudioError::InvalidInput(_))
        ));
    }
}
