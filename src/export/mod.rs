//! Rendering a list of users into a downloadable PDF or spreadsheet.

mod html;
pub mod pdf;
pub mod xlsx;

#[cfg(test)]
pub mod fakes;

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, instrument};

use crate::users::repo_types::User;

pub use html::render_table_html;
pub use pdf::{Orientation, PageSettings, PdfRenderer, WkhtmltopdfRenderer};
pub use xlsx::{CellValue, Sheet, SheetSettings, SpreadsheetRenderer, XlsxRenderer};

pub const UNSUPPORTED_FORMAT: &str = "Invalid export format. Supported formats: PDF, Excel.";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("pdf renderer failed: {0}")]
    Pdf(String),
    #[error("spreadsheet renderer failed: {0}")]
    Spreadsheet(String),
    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("renderer io: {0}")]
    Io(#[from] std::io::Error),
    #[error("renderer returned no output")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    /// Case-insensitive; `None` for anything but `pdf` and `excel`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "excel" => Some(Self::Excel),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Pdf => "users_export.pdf",
            Self::Excel => "users_export.xlsx",
        }
    }
}

#[derive(Debug)]
pub struct Export {
    pub format: ExportFormat,
    pub bytes: Bytes,
}

/// Builds the `Users` sheet: `ID, Username, Age`.
pub fn users_sheet(users: &[User]) -> Sheet {
    Sheet {
        name: "Users".into(),
        header: vec!["ID".into(), "Username".into(), "Age".into()],
        rows: users
            .iter()
            .map(|u| {
                vec![
                    CellValue::Text(u.id.to_string()),
                    CellValue::Text(u.username.clone()),
                    CellValue::Number(f64::from(u.age)),
                ]
            })
            .collect(),
    }
}

#[derive(Clone)]
pub struct Exporter {
    pdf: Arc<dyn PdfRenderer>,
    sheets: Arc<dyn SpreadsheetRenderer>,
    page: PageSettings,
    sheet: SheetSettings,
}

impl Exporter {
    pub fn new(
        pdf: Arc<dyn PdfRenderer>,
        sheets: Arc<dyn SpreadsheetRenderer>,
        page: PageSettings,
        sheet: SheetSettings,
    ) -> Self {
        Self {
            pdf,
            sheets,
            page,
            sheet,
        }
    }

    #[instrument(skip(self, users), fields(count = users.len()))]
    pub async fn export(&self, users: &[User], format: ExportFormat) -> Result<Export, RenderError> {
        let bytes = match format {
            ExportFormat::Pdf => {
                let html = render_table_html(users);
                self.pdf.render(&html, &self.page).await?
            }
            ExportFormat::Excel => self.sheets.render(&users_sheet(users), &self.sheet).await?,
        };
        if bytes.is_empty() {
            return Err(RenderError::Empty);
        }

        info!(?format, bytes = bytes.len(), "export rendered");
        Ok(Export { format, bytes })
    }
}
