//! Renderers with predictable output for tests.

use async_trait::async_trait;
use bytes::Bytes;

use super::{CellValue, PageSettings, PdfRenderer, RenderError, Sheet, SheetSettings, SpreadsheetRenderer};

/// Returns a `%PDF` marker followed by the HTML it was given.
pub struct EchoPdf;

#[async_trait]
impl PdfRenderer for EchoPdf {
    async fn render(&self, html: &str, _page: &PageSettings) -> Result<Bytes, RenderError> {
        Ok(Bytes::from(format!("%PDF-fake\n{html}")))
    }
}

/// Succeeds with nothing.
pub struct EmptyPdf;

#[async_trait]
impl PdfRenderer for EmptyPdf {
    async fn render(&self, _html: &str, _page: &PageSettings) -> Result<Bytes, RenderError> {
        Ok(Bytes::new())
    }
}

/// Writes one comma-separated line per row, header first.
pub struct TextSheets;

#[async_trait]
impl SpreadsheetRenderer for TextSheets {
    async fn render(&self, sheet: &Sheet, _settings: &SheetSettings) -> Result<Bytes, RenderError> {
        let mut out = sheet.header.join(",");
        for row in &sheet.rows {
            out.push('\n');
            let cells: Vec<String> = row
                .iter()
                .map(|c| match c {
                    CellValue::Text(t) => t.clone(),
                    CellValue::Number(n) => n.to_string(),
                })
                .collect();
            out.push_str(&cells.join(","));
        }
        Ok(Bytes::from(out))
    }
}

/// Fails every call.
pub struct Failing;

#[async_trait]
impl PdfRenderer for Failing {
    async fn render(&self, _html: &str, _page: &PageSettings) -> Result<Bytes, RenderError> {
        Err(RenderError::Pdf("renderer crashed".into()))
    }
}

#[async_trait]
impl SpreadsheetRenderer for Failing {
    async fn render(&self, _sheet: &Sheet, _settings: &SheetSettings) -> Result<Bytes, RenderError> {
        Err(RenderError::Spreadsheet("renderer crashed".into()))
    }
}
