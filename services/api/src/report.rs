//! PDF export of an inventory table
//!
//! A4 landscape, built-in Helvetica. Every page repeats the title, the
//! status counts and the column headers, followed by up to
//! [`ROWS_PER_PAGE`] records.

use anyhow::{Result, anyhow};
use domain::{Category, StatusSummary};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::BufWriter;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 6.0;
const TABLE_TOP: f32 = 172.0;
const BODY_SIZE: f32 = 8.0;
/// Rough width of one Helvetica glyph at `BODY_SIZE`, in millimetres
const GLYPH_WIDTH: f32 = 1.6;

pub const ROWS_PER_PAGE: usize = 25;

/// Data of one exported report
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub title: &'a str,
    pub category: Category,
    pub summary: StatusSummary,
    pub headers: &'a [&'a str],
    pub rows: Vec<Vec<String>>,
}

/// Truncate `text` to `max_chars`, marking the cut with "..."
pub fn fit_cell(text: &str, max_chars: usize) -> String {
    let text = text.replace(['\n', '\r'], " ");
    if text.chars().count() <= max_chars {
        return text;
    }

    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }

    let mut fitted: String = text.chars().take(max_chars - 3).collect();
    fitted.push_str("...");
    fitted
}

/// Number of pages needed for `rows` records, at least one
pub fn page_count(rows: usize) -> usize {
    rows.div_ceil(ROWS_PER_PAGE).max(1)
}

fn column_width(columns: usize) -> f32 {
    (PAGE_WIDTH - 2.0 * MARGIN) / columns.max(1) as f32
}

fn summary_line(summary: &StatusSummary) -> String {
    format!(
        "Available: {}    Unavailable: {}    Checked out: {}    Other: {}    Total: {}",
        summary.available,
        summary.unavailable,
        summary.checked_out,
        summary.unclassified,
        summary.total
    )
}

fn draw_row(layer: &PdfLayerReference, font: &IndirectFontRef, cells: &[String], y: f32) {
    let width = column_width(cells.len());
    let max_chars = (width / GLYPH_WIDTH) as usize;

    for (i, cell) in cells.iter().enumerate() {
        let x = MARGIN + i as f32 * width;
        layer.use_text(fit_cell(cell, max_chars), BODY_SIZE, Mm(x), Mm(y), font);
    }
}

/// Render the report to PDF bytes
pub fn render(report: &Report<'_>) -> Result<Vec<u8>> {
    let title = format!("{} - {}", report.title, report.category);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Failed to load font: {:?}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Failed to load font: {:?}", e))?;

    let headers: Vec<String> = report.headers.iter().map(|h| h.to_string()).collect();
    let pages = page_count(report.rows.len());
    let mut chunks = report.rows.chunks(ROWS_PER_PAGE);

    for page in 0..pages {
        let layer = if page == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };

        layer.use_text(&title, 14.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 15.0), &bold);
        layer.use_text(
            summary_line(&report.summary),
            10.0,
            Mm(MARGIN),
            Mm(PAGE_HEIGHT - 24.0),
            &regular,
        );
        draw_row(&layer, &bold, &headers, TABLE_TOP);

        let rows = chunks.next().unwrap_or_default();
        if rows.is_empty() {
            layer.use_text(
                "No records",
                BODY_SIZE,
                Mm(MARGIN),
                Mm(TABLE_TOP - ROW_HEIGHT),
                &regular,
            );
        }
        for (i, row) in rows.iter().enumerate() {
            let y = TABLE_TOP - (i + 1) as f32 * ROW_HEIGHT;
            draw_row(&layer, &regular, row, y);
        }

        layer.use_text(
            format!("Page {} of {}", page + 1, pages),
            BODY_SIZE,
            Mm(PAGE_WIDTH - MARGIN - 25.0),
            Mm(MARGIN / 2.0),
            &regular,
        );
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| anyhow!("Failed to write PDF: {:?}", e))?;

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush PDF: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(rows: usize) -> Report<'static> {
        Report {
            title: "SISTEMA DE CONTROLE DE MATERIAL",
            category: Category::Cl2,
            summary: domain::summarize(["OK", "defeito"]),
            headers: &["ID", "Name", "Status"],
            rows: (0..rows)
                .map(|i| vec![i.to_string(), format!("Item {}", i), "AVAILABLE".to_string()])
                .collect(),
        }
    }

    #[test]
    fn test_fit_cell() {
        assert_eq!(fit_cell("short", 10), "short");
        assert_eq!(fit_cell("a rather long name", 10), "a rathe...");
        assert_eq!(fit_cell("abcdef", 2), "ab");
        assert_eq!(fit_cell("line\nbreak", 20), "line break");
        assert_eq!(fit_cell("manutenção", 10), "manutenção");
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(ROWS_PER_PAGE), 1);
        assert_eq!(page_count(ROWS_PER_PAGE + 1), 2);
    }

    #[test]
    fn test_summary_line_lists_every_bucket() {
        let line = summary_line(&domain::summarize(["OK", "banana"]));
        assert!(line.contains("Available: 1"));
        assert!(line.contains("Other: 1"));
        assert!(line.contains("Total: 2"));
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&report(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_and_multi_page() {
        assert!(render(&report(0)).unwrap().starts_with(b"%PDF"));
        assert!(
            render(&report(ROWS_PER_PAGE * 2 + 1))
                .unwrap()
                .starts_with(b"%PDF")
        );
    }
}
