use async_trait::async_trait;
use bytes::Bytes;
use rust_xlsxwriter::{DocProperties, Format, Workbook};

use super::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

/// One worksheet: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Options applied to a single render call.
#[derive(Debug, Clone)]
pub struct SheetSettings {
    pub autofit: bool,
    pub bold_header: bool,
    pub freeze_header: bool,
    pub author: Option<String>,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            autofit: true,
            bold_header: true,
            freeze_header: false,
            author: None,
        }
    }
}

/// Serializes rows into a spreadsheet file.
#[async_trait]
pub trait SpreadsheetRenderer: Send + Sync {
    async fn render(&self, sheet: &Sheet, settings: &SheetSettings) -> Result<Bytes, RenderError>;
}

/// Writes `.xlsx` workbooks with rust_xlsxwriter on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxRenderer;

#[async_trait]
impl SpreadsheetRenderer for XlsxRenderer {
    async fn render(&self, sheet: &Sheet, settings: &SheetSettings) -> Result<Bytes, RenderError> {
        let sheet = sheet.clone();
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || write_workbook(&sheet, &settings))
            .await
            .map_err(|e| RenderError::Spreadsheet(format!("render task failed: {e}")))?
    }
}

fn write_workbook(sheet: &Sheet, settings: &SheetSettings) -> Result<Bytes, RenderError> {
    let mut workbook = Workbook::new();
    if let Some(author) = &settings.author {
        let properties = DocProperties::new().set_author(author.as_str());
        workbook.set_properties(&properties);
    }

    let header_format = if settings.bold_header {
        Format::new().set_bold()
    } else {
        Format::new()
    };

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name.as_str())?;

    for (col, title) in sheet.header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title.as_str(), &header_format)?;
    }
    for (i, row) in sheet.rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Text(text) => worksheet.write_string(row_num, col as u16, text.as_str())?,
                CellValue::Number(n) => worksheet.write_number(row_num, col as u16, *n)?,
            };
        }
    }

    if settings.freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }
    if settings.autofit {
        worksheet.autofit();
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> Sheet {
        Sheet {
            name: "Users".into(),
            header: vec!["ID".into(), "Username".into(), "Age".into()],
            rows: vec![vec![
                CellValue::Text("224ea291-646a-47b8-ae34-330713535816".into()),
                CellValue::Text("shubham@gmail.com".into()),
                CellValue::Number(27.0),
            ]],
        }
    }

    #[tokio::test]
    async fn writes_a_zip_container() {
        let bytes = XlsxRenderer
            .render(&sample_sheet(), &SheetSettings::default())
            .await
            .expect("xlsx should render");
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn settings_are_per_call() {
        let with_author = SheetSettings {
            author: Some("userdir".into()),
            freeze_header: true,
            ..SheetSettings::default()
        };
        assert!(XlsxRenderer.render(&sample_sheet(), &with_author).await.is_ok());
        assert!(XlsxRenderer
            .render(&sample_sheet(), &SheetSettings::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn invalid_sheet_name_is_a_render_error() {
        let mut sheet = sample_sheet();
        sheet.name = "bad[name]".into();
        let err = XlsxRenderer
            .render(&sheet, &SheetSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Xlsx(_)));
    }
}
