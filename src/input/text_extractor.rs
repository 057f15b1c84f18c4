//! Text extraction from various file formats

use crate::error::{Result, ResumeStudioError};
use crate::resume::model::ResumeData;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild,
};
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ResumeStudioError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })?;
        Ok(text)
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        docx_text(&bytes).map_err(|e| {
            ResumeStudioError::DocxExtraction(format!("Failed to read DOCX '{}': {}", path.display(), e))
        })
    }
}

/// Paragraph text of a DOCX body, one paragraph per line; table cells are read in row order
pub fn docx_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => push_paragraph(&mut lines, paragraph),
            DocumentChild::Table(table) => push_table(&mut lines, table),
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn push_paragraph(lines: &mut Vec<String>, paragraph: &Paragraph) {
    let mut line = String::new();
    push_runs(&mut line, &paragraph.children);
    let line = line.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}

fn push_runs(line: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => line.push_str(&text.text),
                        RunChild::Tab(_) => line.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_runs(line, &link.children),
            _ => {}
        }
    }
}

fn push_table(lines: &mut Vec<String>, table: &Table) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => push_paragraph(lines, paragraph),
                    TableCellContent::Table(nested) => push_table(lines, nested),
                    _ => {}
                }
            }
        }
    }
}

/// Reads resume JSON exports; other JSON is passed through pretty-printed
pub struct JsonExtractor;

impl TextExtractor for JsonExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        json_text(&content)
    }
}

pub fn json_text(content: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if value.is_object() {
        if let Ok(data) = serde_json::from_value::<ResumeData>(value.clone()) {
            if !data.is_empty() {
                return Ok(data.to_plain_text());
            }
        }
    }

    Ok(serde_json::to_string_pretty(&value)?)
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown_content))
    }
}

pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(Tag::Paragraph) | Event::End(Tag::Heading(..)) | Event::End(Tag::Item) => {
                text.push('\n')
            }
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Run, TableCell, TableRow};
    use std::io::Cursor;

    fn cell(text: &str) -> TableCell {
        TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
    }

    #[test]
    fn test_docx_text_reads_tables_and_hyperlinks() {
        let nested = docx_rs::Table::new(vec![TableRow::new(vec![cell("Kubernetes, Terraform")])]);
        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Doe")))
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text("Portfolio: ")).add_hyperlink(
                    Hyperlink::new("https://janedoe.dev", HyperlinkType::External)
                        .add_run(Run::new().add_text("janedoe.dev")),
                ),
            )
            .add_table(docx_rs::Table::new(vec![
                TableRow::new(vec![cell("2019 - 2023"), cell("Site Reliability Engineer, Globex")]),
                TableRow::new(vec![cell("Skills"), TableCell::new().add_table(nested)]),
            ]));

        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        let text = docx_text(buffer.get_ref()).unwrap();

        assert!(text.contains("Jane Doe"), "{text}");
        assert!(text.contains("Portfolio:"), "{text}");
        assert!(text.contains("janedoe.dev"), "{text}");
        assert!(text.contains("2019 - 2023"), "{text}");
        assert!(text.contains("Site Reliability Engineer, Globex"), "{text}");
        assert!(text.contains("Kubernetes, Terraform"), "{text}");
    }

    #[test]
    fn test_docx_text_rejects_non_docx_bytes() {
        assert!(docx_text(b"plain text").is_err());
    }

    #[test]
    fn test_markdown_to_text_strips_formatting() {
        let text = markdown_to_text("# Jane Doe\n\n**Senior** engineer\n\n- Rust\n- `tokio`\n");
        assert_eq!(text, "Jane Doe\nSenior engineer\nRust\ntokio");
    }

    #[test]
    fn test_json_text_for_resume_shape() {
        let text = json_text(r#"{"personalInfo": {"fullName": "Jane"}, "skills": "Rust"}"#).unwrap();
        assert!(text.contains("Jane"));
        assert!(text.contains("Skills\nRust"));
    }

    #[test]
    fn test_json_text_for_other_shapes() {
        let text = json_text(r#"[1, 2]"#).unwrap();
        assert!(text.contains('1'));
        assert!(json_text("not json").is_err());
    }
}
