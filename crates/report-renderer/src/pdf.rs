//! Paginated PDF layout.
//!
//! Consumes the ordered section list and lays it out on A4 pages with a
//! repeating header band and page-number footer, breaking pages as content
//! runs past the bottom margin. Uses the built-in Helvetica faces, so the
//! output needs no font assets and is deterministic.

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Rect, Rgb,
};
use report_core::ReportError;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::section::{Align, Section, Table};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN_X: f64 = 15.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN_X;
const CONTENT_TOP: f64 = 30.0;
const CONTENT_BOTTOM: f64 = 275.0;
const FOOTER_BASELINE: f64 = 287.0;

/// Points to millimeters.
const PT_TO_MM: f64 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size. Used for
/// word wrapping and centering; built-in fonts carry no metrics API.
const CHAR_WIDTH_EM: f64 = 0.5;

const HEADER_BAND_COLOR: (u8, u8, u8) = (41, 128, 185);
const HEADING_BAND_COLOR: (u8, u8, u8) = (236, 240, 241);
const RATING_COLOR: (u8, u8, u8) = (0, 150, 0);
const FOOTNOTE_COLOR: (u8, u8, u8) = (100, 100, 100);
const FOOTER_COLOR: (u8, u8, u8) = (128, 128, 128);
const BLACK: (u8, u8, u8) = (0, 0, 0);
const WHITE: (u8, u8, u8) = (255, 255, 255);

/// Rendered artifact location and size.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub path: PathBuf,
    pub pages: usize,
}

/// Lay the sections out and write the PDF to `out_path`.
pub fn render_pdf(
    title: &str,
    sections: &[Section],
    out_path: &Path,
) -> Result<RenderedDocument, ReportError> {
    let mut writer = PdfWriter::new(title)?;
    for section in sections {
        writer.render_section(section)?;
    }
    let pages = writer.pages;
    writer.save(out_path)?;
    tracing::debug!(pages, path = %out_path.display(), "wrote report PDF");
    Ok(RenderedDocument {
        path: out_path.to_path_buf(),
        pages,
    })
}

/// Estimated width of a string in millimeters.
fn text_width_mm(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * CHAR_WIDTH_EM * PT_TO_MM
}

/// Greedy word wrap against an estimated line capacity.
pub(crate) fn wrap_text(text: &str, width_mm: f64, font_size: f64) -> Vec<String> {
    let max_chars =
        ((width_mm / (font_size * CHAR_WIDTH_EM * PT_TO_MM)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
        // Hard-break words longer than a full line.
        while current.chars().count() > max_chars {
            let head: String = current.chars().take(max_chars).collect();
            let tail: String = current.chars().skip(max_chars).collect();
            lines.push(head);
            current = tail;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn rgb(c: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0,
        None,
    ))
}

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    /// Distance of the current baseline from the top of the page.
    cursor: f64,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| ReportError::Render(e.to_string()))?;

        let layer = doc.get_page(page).get_layer(layer);
        let mut writer = Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            cursor: CONTENT_TOP,
            pages: 1,
        };
        writer.draw_page_chrome();
        Ok(writer)
    }

    fn save(self, out_path: &Path) -> Result<(), ReportError> {
        let file = File::create(out_path).map_err(|e| ReportError::Render(e.to_string()))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| ReportError::Render(e.to_string()))
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.cursor = CONTENT_TOP;
        self.draw_page_chrome();
    }

    /// Repeating banner and page-number footer.
    fn draw_page_chrome(&mut self) {
        self.layer.set_fill_color(rgb(HEADER_BAND_COLOR));
        self.layer.add_rect(
            Rect::new(
                Mm(0.0),
                Mm((PAGE_HEIGHT - 20.0) as f32),
                Mm(PAGE_WIDTH as f32),
                Mm((PAGE_HEIGHT - 8.0) as f32),
            )
            .with_mode(PaintMode::Fill),
        );
        self.text_at(
            "EQUITY RESEARCH REPORT",
            &self.bold.clone(),
            16.0,
            self.centered_x("EQUITY RESEARCH REPORT", 16.0),
            16.5,
            WHITE,
        );

        let footer = format!("Page {}", self.pages);
        self.text_at(
            &footer,
            &self.italic.clone(),
            8.0,
            self.centered_x(&footer, 8.0),
            FOOTER_BASELINE,
            FOOTER_COLOR,
        );
    }

    fn centered_x(&self, text: &str, font_size: f64) -> f64 {
        (PAGE_WIDTH - text_width_mm(text, font_size)) / 2.0
    }

    /// Draw one line with its baseline `y_from_top` millimeters below the
    /// top edge.
    fn text_at(
        &self,
        text: &str,
        font: &IndirectFontRef,
        font_size: f64,
        x: f64,
        y_from_top: f64,
        color: (u8, u8, u8),
    ) {
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(
            text,
            font_size as f32,
            Mm(x as f32),
            Mm((PAGE_HEIGHT - y_from_top) as f32),
            font,
        );
    }

    fn ensure_space(&mut self, needed_mm: f64) {
        if self.cursor + needed_mm > CONTENT_BOTTOM {
            self.new_page();
        }
    }

    fn line(
        &mut self,
        text: &str,
        font: &IndirectFontRef,
        font_size: f64,
        x: f64,
        advance: f64,
        color: (u8, u8, u8),
    ) {
        self.ensure_space(advance);
        self.cursor += advance;
        self.text_at(text, font, font_size, x, self.cursor, color);
    }

    fn wrapped(
        &mut self,
        text: &str,
        font: &IndirectFontRef,
        font_size: f64,
        line_height: f64,
        color: (u8, u8, u8),
    ) {
        for line in wrap_text(text, CONTENT_WIDTH, font_size) {
            self.line(&line, &font.clone(), font_size, MARGIN_X, line_height, color);
        }
    }

    fn render_section(&mut self, section: &Section) -> Result<(), ReportError> {
        match section {
            Section::Title(text) => {
                self.ensure_space(14.0);
                let x = self.centered_x(text, 24.0);
                self.line(text, &self.bold.clone(), 24.0, x, 14.0, BLACK);
            }
            Section::SubTitle(text) => {
                self.ensure_space(11.0);
                let x = self.centered_x(text, 18.0);
                self.line(text, &self.bold.clone(), 18.0, x, 11.0, BLACK);
            }
            Section::CenterText(text) => {
                self.ensure_space(8.0);
                let x = self.centered_x(text, 12.0);
                self.line(text, &self.regular.clone(), 12.0, x, 8.0, BLACK);
            }
            Section::Heading(text) => {
                self.ensure_space(12.0);
                self.layer.set_fill_color(rgb(HEADING_BAND_COLOR));
                self.layer.add_rect(
                    Rect::new(
                        Mm((MARGIN_X - 2.0) as f32),
                        Mm((PAGE_HEIGHT - self.cursor - 9.0) as f32),
                        Mm((PAGE_WIDTH - MARGIN_X + 2.0) as f32),
                        Mm((PAGE_HEIGHT - self.cursor - 1.0) as f32),
                    )
                    .with_mode(PaintMode::Fill),
                );
                self.cursor += 7.0;
                self.text_at(text, &self.bold.clone(), 14.0, MARGIN_X, self.cursor, BLACK);
                self.cursor += 5.0;
            }
            Section::SubHeading(text) => {
                self.line(text, &self.bold.clone(), 12.0, MARGIN_X, 8.0, BLACK);
            }
            Section::Paragraph(text) => {
                self.wrapped(text, &self.regular.clone(), 10.0, 5.0, BLACK);
                self.cursor += 2.0;
            }
            Section::KeyLine(text) => {
                self.line(text, &self.bold.clone(), 12.0, MARGIN_X, 8.0, BLACK);
            }
            Section::Rating(text) => {
                self.ensure_space(12.0);
                let x = self.centered_x(text, 16.0);
                self.line(text, &self.bold.clone(), 16.0, x, 10.0, RATING_COLOR);
            }
            Section::Footnote(text) => {
                self.wrapped(text, &self.italic.clone(), 8.0, 4.0, FOOTNOTE_COLOR);
                self.cursor += 2.0;
            }
            Section::Table(table) => self.render_table(table),
            Section::Image { path, width_mm } => self.render_image(path, *width_mm)?,
            Section::Spacer(mm) => self.cursor += mm,
            Section::PageBreak => self.new_page(),
        }
        Ok(())
    }

    fn render_table(&mut self, table: &Table) {
        const HEADER_HEIGHT: f64 = 7.0;
        const ROW_HEIGHT: f64 = 6.0;
        const FONT_SIZE: f64 = 9.0;

        let start_x = (PAGE_WIDTH - table.width_mm()) / 2.0;

        // Keep the header attached to at least one data row.
        self.ensure_space(HEADER_HEIGHT + ROW_HEIGHT);

        let headers: Vec<String> = table.columns.iter().map(|c| c.header.clone()).collect();
        self.table_row(table, &headers, start_x, HEADER_HEIGHT, FONT_SIZE, true);

        for row in &table.rows {
            self.ensure_space(ROW_HEIGHT);
            self.table_row(table, row, start_x, ROW_HEIGHT, FONT_SIZE, false);
        }
        self.cursor += 3.0;
    }

    fn table_row(
        &mut self,
        table: &Table,
        cells: &[String],
        start_x: f64,
        height: f64,
        font_size: f64,
        bold: bool,
    ) {
        let top = self.cursor;
        self.layer.set_outline_color(rgb(BLACK));
        self.layer.set_outline_thickness(0.4);

        let mut x = start_x;
        for (column, cell) in table.columns.iter().zip(cells.iter()) {
            self.layer.add_rect(
                Rect::new(
                    Mm(x as f32),
                    Mm((PAGE_HEIGHT - top - height) as f32),
                    Mm((x + column.width_mm) as f32),
                    Mm((PAGE_HEIGHT - top) as f32),
                )
                .with_mode(PaintMode::Stroke),
            );

            let text_x = match column.align {
                Align::Left => x + 1.5,
                Align::Center => {
                    x + (column.width_mm - text_width_mm(cell, font_size)).max(0.0) / 2.0
                }
            };
            let font = if bold { &self.bold } else { &self.regular };
            self.text_at(
                cell,
                &font.clone(),
                font_size,
                text_x,
                top + height - 1.8,
                BLACK,
            );
            x += column.width_mm;
        }
        self.cursor = top + height;
    }

    fn render_image(&mut self, path: &Path, width_mm: f64) -> Result<(), ReportError> {
        let file = File::open(path).map_err(|e| {
            ReportError::Render(format!("missing chart asset {}: {}", path.display(), e))
        })?;
        let decoder = PngDecoder::new(BufReader::new(file))
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let image = Image::try_from(decoder).map_err(|e| ReportError::Render(e.to_string()))?;

        let px_width = image.image.width.0 as f64;
        let px_height = image.image.height.0 as f64;
        if px_width <= 0.0 || px_height <= 0.0 {
            return Err(ReportError::Render("empty chart image".to_string()));
        }
        let height_mm = px_height * width_mm / px_width;
        let dpi = px_width / (width_mm / 25.4);

        self.ensure_space(height_mm + 6.0);
        let x = (PAGE_WIDTH - width_mm) / 2.0;
        let y_top = self.cursor;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x as f32)),
                translate_y: Some(Mm((PAGE_HEIGHT - y_top - height_mm) as f32)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
        self.cursor += height_mm + 6.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Column;

    fn out_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("equity_report_{}_{}.pdf", name, std::process::id()))
    }

    #[test]
    fn wrap_respects_estimated_capacity() {
        let lines = wrap_text("alpha beta gamma delta", 20.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 12);
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
    }

    #[test]
    fn wrap_hard_breaks_oversized_words() {
        let lines = wrap_text("abcdefghijklmnopqrstuvwxyz", 10.0, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn renders_single_page_document() {
        let sections = vec![
            Section::Title("Test Company".to_string()),
            Section::Heading("SUMMARY".to_string()),
            Section::Paragraph("A short paragraph.".to_string()),
        ];
        let path = out_path("single");
        let doc = render_pdf("Test", &sections, &path).unwrap();
        assert_eq!(doc.pages, 1);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn page_breaks_and_overflow_add_pages() {
        let mut sections = vec![Section::Heading("LONG".to_string())];
        for _ in 0..120 {
            sections.push(Section::Paragraph(
                "Filler paragraph that occupies vertical space on the page.".to_string(),
            ));
        }
        sections.push(Section::PageBreak);
        sections.push(Section::Paragraph("Tail".to_string()));

        let path = out_path("multi");
        let doc = render_pdf("Test", &sections, &path).unwrap();
        assert!(doc.pages > 2, "pages: {}", doc.pages);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn tables_render_with_headers_and_rows() {
        let table = Table {
            columns: vec![
                Column::new("Year", 50.0, Align::Center),
                Column::new("Total Revenue ($B)", 60.0, Align::Center),
                Column::new("YoY Growth", 60.0, Align::Center),
            ],
            rows: vec![
                vec!["2024E".into(), "45.0".into(), "Actual/Est".into()],
                vec!["2025E".into(), "59.5".into(), "32%".into()],
            ],
        };
        let path = out_path("table");
        let doc = render_pdf("Test", &[Section::Table(table)], &path).unwrap();
        assert_eq!(doc.pages, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_image_is_a_render_failure() {
        let sections = vec![Section::Image {
            path: PathBuf::from("/nonexistent/chart.png"),
            width_mm: 180.0,
        }];
        let path = out_path("missing_image");
        let err = render_pdf("Test", &sections, &path).unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
    }
}
