use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::RenderError;

/// Converts an HTML document into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, page: &PageSettings) -> Result<Bytes, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(format!("unknown orientation {other:?}")),
        }
    }
}

impl Orientation {
    fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub paper_size: &'static str,
    pub orientation: Orientation,
    pub margin_mm: u32,
    pub font_size: u32,
    /// `[page]` and `[toPage]` are substituted by the renderer.
    pub header_right: String,
    pub footer_right: String,
    pub stylesheet: Option<PathBuf>,
}

impl PageSettings {
    /// A4 portrait, 10 mm margins, page counter in header and footer.
    pub fn a4(stylesheet: Option<PathBuf>) -> Self {
        Self {
            paper_size: "A4",
            orientation: Orientation::Portrait,
            margin_mm: 10,
            font_size: 9,
            header_right: "Page [page] of [toPage]".into(),
            footer_right: "[page]".into(),
            stylesheet,
        }
    }

    /// Command line for `wkhtmltopdf`, excluding input and output.
    pub fn to_args(&self) -> Vec<OsString> {
        let margin = format!("{}mm", self.margin_mm);
        let font_size = self.font_size.to_string();
        let mut args: Vec<OsString> = vec![
            "--quiet".into(),
            "--page-size".into(),
            self.paper_size.into(),
            "--orientation".into(),
            self.orientation.as_str().into(),
        ];
        for side in ["--margin-top", "--margin-bottom", "--margin-left", "--margin-right"] {
            args.push(side.into());
            args.push(margin.clone().into());
        }
        args.extend([
            "--encoding".into(),
            "utf-8".into(),
            // the document arrives on stdin, so relative links never resolve
            "--load-error-handling".into(),
            "ignore".into(),
            "--load-media-error-handling".into(),
            "ignore".into(),
            "--header-right".into(),
            self.header_right.clone().into(),
            "--header-font-size".into(),
            font_size.clone().into(),
            "--header-line".into(),
            "--footer-right".into(),
            self.footer_right.clone().into(),
            "--footer-font-size".into(),
            font_size.into(),
            "--footer-line".into(),
        ]);
        if let Some(css) = &self.stylesheet {
            args.push("--enable-local-file-access".into());
            args.push("--user-style-sheet".into());
            args.push(css.clone().into_os_string());
        }
        args
    }
}

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Runs the `wkhtmltopdf` binary: HTML on stdin, PDF on stdout.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    binary: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    #[instrument(skip(self, html, page), fields(binary = %self.binary.display()))]
    async fn render(&self, html: &str, page: &PageSettings) -> Result<Bytes, RenderError> {
        let mut child = Command::new(&self.binary)
            .args(page.to_args())
            .arg("-")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::Pdf("renderer stdin unavailable".into()))?;
        let input = html.as_bytes().to_vec();
        // stdout is drained concurrently so a large document cannot fill the pipe
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !is_pdf(&output.stdout) {
                return Err(RenderError::Pdf(format!(
                    "exited with {}: {}",
                    output.status,
                    stderr.trim()
                )));
            }
            // load errors on linked resources still produce a document
            warn!(status = %output.status, stderr = %stderr.trim(), "pdf renderer reported errors");
        }
        writer
            .await
            .map_err(|e| RenderError::Pdf(format!("stdin writer failed: {e}")))??;

        debug!(bytes = output.stdout.len(), "pdf rendered");
        Ok(Bytes::from(output.stdout))
    }
}
