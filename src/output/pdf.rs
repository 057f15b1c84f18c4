//! PDF export of a resume

use crate::error::{Result, ResumeStudioError};
use crate::output::preview::{ResumeView, TemplateKind};
use crate::resume::model::ResumeData;
use anyhow::{anyhow, Context};
use log::{error, info};
use printpdf::{IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::Path;
use ttf_parser::Face;
use unicode_segmentation::UnicodeSegmentation;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.35;

const NAME_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.5;

const SERIF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif.ttf");
const SERIF_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif-Bold.ttf");
const SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const SANS_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");
const MONO: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");
const MONO_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono-Bold.ttf");

pub struct PdfExporter {
    template: TemplateKind,
}

/// An embedded TrueType font and its parsed glyph table
struct EmbeddedFont {
    font: IndirectFontRef,
    face: Face<'static>,
}

impl EmbeddedFont {
    fn load(doc: &PdfDocumentReference, bytes: &'static [u8]) -> anyhow::Result<Self> {
        let face = Face::parse(bytes, 0).context("parsing embedded font")?;
        let font = doc
            .add_external_font(Cursor::new(bytes))
            .map_err(|e| anyhow!("{:?}", e))
            .context("embedding font")?;
        Ok(Self { font, face })
    }
}

struct Fonts {
    regular: EmbeddedFont,
    bold: EmbeddedFont,
    /// Average glyph width as a fraction of the font size
    width_factor: f32,
}

impl Fonts {
    fn for_template(doc: &PdfDocumentReference, template: TemplateKind) -> anyhow::Result<Self> {
        let (regular, bold, width_factor) = match template {
            TemplateKind::Classic => (SERIF, SERIF_BOLD, 0.52),
            TemplateKind::Modern => (SANS, SANS_BOLD, 0.55),
            TemplateKind::Minimal => (MONO, MONO_BOLD, 0.6),
        };
        Ok(Self {
            regular: EmbeddedFont::load(doc, regular).context("loading regular font")?,
            bold: EmbeddedFont::load(doc, bold).context("loading bold font")?,
            width_factor,
        })
    }
}

/// Tracks the write position and starts new pages as needed
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
    /// Characters the fonts have no glyph for
    missing: BTreeSet<char>,
}

impl PageWriter {
    fn new(title: &str) -> Self {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
            missing: BTreeSet::new(),
        }
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
            self.pages += 1;
        }
    }

    fn line(&mut self, text: &str, size: f32, font: &EmbeddedFont, indent: f32) {
        self.missing.extend(
            text.chars()
                .filter(|c| !c.is_control() && font.face.glyph_index(*c).is_none()),
        );
        let height = size * PT_TO_MM * LINE_SPACING;
        self.ensure_space(height);
        self.y -= height;
        self.layer.use_text(text, size, Mm(MARGIN + indent), Mm(self.y), &font.font);
    }

    fn wrapped(&mut self, text: &str, size: f32, fonts: &Fonts, bold: bool, indent: f32) {
        let font = if bold { &fonts.bold } else { &fonts.regular };
        let glyph_width = size * PT_TO_MM * fonts.width_factor;
        let max_chars = (((PAGE_WIDTH - 2.0 * MARGIN - indent) / glyph_width) as usize).max(10);
        for line in wrap_text(text, max_chars) {
            self.line(&line, size, font, indent);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

impl PdfExporter {
    pub fn new(template: TemplateKind) -> Self {
        Self { template }
    }

    pub fn render(&self, data: &ResumeData) -> Result<Vec<u8>> {
        self.build(data)
            .map_err(|e| ResumeStudioError::Export(format!("{:#}", e)))
    }

    /// Write the PDF to `path`, creating parent directories
    pub fn export(&self, data: &ResumeData, path: &Path) -> Result<()> {
        let bytes = self.render(data).map_err(|e| {
            error!("PDF export failed: {}", e);
            e
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &bytes)?;
        info!("Exported {} ({} bytes) with the {} template", path.display(), bytes.len(), self.template);
        Ok(())
    }

    fn build(&self, data: &ResumeData) -> anyhow::Result<Vec<u8>> {
        let view = ResumeView::from_data(data);
        let mut writer = PageWriter::new(&data.display_title());

        let fonts = Fonts::for_template(&writer.doc, self.template)?;

        writer.wrapped(&view.name, NAME_SIZE, &fonts, true, 0.0);
        if !view.title.is_empty() {
            writer.wrapped(&view.title, HEADING_SIZE, &fonts, false, 0.0);
        }
        if !view.contact.is_empty() {
            writer.wrapped(&view.contact.join(" | "), BODY_SIZE, &fonts, false, 0.0);
        }

        if !view.summary.is_empty() {
            self.heading(&mut writer, &fonts, "Summary");
            writer.wrapped(&view.summary, BODY_SIZE, &fonts, false, 0.0);
        }

        for (label, entries) in view.sections() {
            if entries.is_empty() {
                continue;
            }
            self.heading(&mut writer, &fonts, label);
            for entry in entries {
                let mut head = entry.heading.clone();
                if !entry.subheading.is_empty() {
                    if !head.is_empty() {
                        head.push_str(" - ");
                    }
                    head.push_str(&entry.subheading);
                }
                writer.wrapped(&head, BODY_SIZE, &fonts, true, 0.0);
                if !entry.dates.is_empty() {
                    writer.wrapped(&entry.dates, BODY_SIZE - 1.0, &fonts, false, 0.0);
                }
                if !entry.description.is_empty() {
                    writer.wrapped(&entry.description, BODY_SIZE, &fonts, false, 4.0);
                }
                writer.gap(2.0);
            }
        }

        for extra in &view.extras {
            self.heading(&mut writer, &fonts, &extra.label);
            writer.wrapped(&extra.body, BODY_SIZE, &fonts, false, 0.0);
        }

        if !writer.missing.is_empty() {
            let chars: Vec<String> = writer.missing.iter().map(|c| format!("'{}' (U+{:04X})", c, *c as u32)).collect();
            return Err(anyhow!(
                "the {} template font cannot draw {}; remove or transliterate these characters before exporting",
                self.template,
                chars.join(", ")
            ));
        }

        let pages = writer.pages;
        let PageWriter { doc, .. } = writer;
        let bytes = doc
            .save_to_bytes()
            .map_err(|e| anyhow!("{:?}", e))
            .context("serializing PDF")?;
        info!("Rendered PDF with {} page(s)", pages);
        Ok(bytes)
    }

    fn heading(&self, writer: &mut PageWriter, fonts: &Fonts, label: &str) {
        writer.gap(4.0);
        let text = match self.template {
            TemplateKind::Minimal => label.to_lowercase(),
            _ => label.to_uppercase(),
        };
        writer.line(&text, HEADING_SIZE, &fonts.bold, 0.0);
        writer.gap(1.0);
    }
}

/// Greedy word wrap measured in graphemes; overlong words are split
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let graphemes: Vec<&str> = word.graphemes(true).collect();

            if graphemes.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                for chunk in graphemes.chunks(max_chars) {
                    lines.push(chunk.concat());
                }
                // Continue after the last full chunk
                if let Some(last) = lines.pop() {
                    current_len = last.graphemes(true).count();
                    current = last;
                }
                continue;
            }

            let needed = if current.is_empty() { graphemes.len() } else { current_len + 1 + graphemes.len() };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += graphemes.len();
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
