// Growth-plan export: transcript → plain body text → paginated PDF on disk.
// PDF layout and serialization are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod pdf;

use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::session::Transcript;

pub use pdf::{default_page_setup, PageSetup};

pub const DOCUMENT_TITLE: &str = "InnerVoice AI – Personal Growth Plan";
/// File name offered to the browser on download.
pub const DOWNLOAD_FILE_NAME: &str = "InnerVoice_Growth_Plan.pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// A rendered growth plan.
#[derive(Debug, Clone)]
pub struct GrowthPlan {
    /// The plain text the document body was built from.
    #[allow(dead_code)]
    pub body: String,
    pub page_count: usize,
    pub pdf: Bytes,
}

/// Renders a body string into a growth-plan document. Pure: no I/O.
pub fn render_growth_plan(body: &str, setup: &PageSetup) -> Result<GrowthPlan, ExportError> {
    let pages = pdf::layout_document(DOCUMENT_TITLE, body, setup);
    let bytes = pdf::render_pdf(&pages, setup)?;
    Ok(GrowthPlan {
        body: body.to_string(),
        page_count: pages.len(),
        pdf: Bytes::from(bytes),
    })
}

/// Renders the transcript and writes it to `path`, replacing any earlier export.
///
/// The file is written to a temporary sibling first and then renamed over `path`,
/// so a reader never sees a half-written document.
pub async fn export_transcript(
    transcript: &Transcript,
    path: &Path,
    setup: &PageSetup,
) -> Result<GrowthPlan, ExportError> {
    let body = transcript.render_plain();
    let path: PathBuf = path.to_path_buf();
    let setup = setup.clone();

    let plan = tokio::task::spawn_blocking(move || -> Result<GrowthPlan, ExportError> {
        let plan = render_growth_plan(&body, &setup)?;
        write_atomically(&path, &plan.pdf)?;
        Ok(plan)
    })
    .await
    .map_err(|e| ExportError::Task(e.to_string()))??;

    info!(
        "Exported growth plan: {} messages, {} pages, {} bytes",
        transcript.len(),
        plan.page_count,
        plan.pdf.len()
    );
    Ok(plan)
}

fn write_atomically(path: &Path, data: &[u8]) -> Result<(), ExportError> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::pdf::tests::extract_lines;
    use crate::session::Role;

    fn sample_transcript(k: usize) -> Transcript {
        let mut transcript = Transcript::new();
        for i in 0..k {
            if i % 2 == 0 {
                transcript.append(Role::User, format!("question number {i}"));
            } else {
                transcript.append(Role::Assistant, format!("answer number {i}"));
            }
        }
        transcript
    }

    #[tokio::test]
    async fn test_export_contains_every_entry_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growth_plan.pdf");
        let transcript = sample_transcript(6);

        let plan = export_transcript(&transcript, &path, &default_page_setup())
            .await
            .unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, plan.pdf.as_ref());

        // Drop the title line, then read the body back as one paragraph.
        let pages = extract_lines(&on_disk);
        let body_text = pages.concat()[1..].join(" ");
        let mut cursor = 0;
        for m in transcript.all() {
            let entry = format!("{}: {}", m.role.label(), m.content);
            let found = body_text[cursor..]
                .find(&entry)
                .unwrap_or_else(|| panic!("missing or out of order: {entry}"));
            cursor += found + entry.len();
        }
    }

    #[tokio::test]
    async fn test_export_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growth_plan.pdf");
        let transcript = sample_transcript(4);

        let first = export_transcript(&transcript, &path, &default_page_setup())
            .await
            .unwrap();
        let second = export_transcript(&transcript, &path, &default_page_setup())
            .await
            .unwrap();

        assert_eq!(first.body, second.body);
        assert_eq!(first.pdf, second.pdf);
        assert_eq!(std::fs::read(&path).unwrap(), second.pdf.as_ref());
    }

    #[test]
    fn test_title_encodes_en_dash() {
        let plan = render_growth_plan("USER: hi", &default_page_setup()).unwrap();
        let pages = extract_lines(&plan.pdf);
        assert_eq!(pages[0][0], "InnerVoice AI \u{96} Personal Growth Plan");
    }

    #[tokio::test]
    async fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("growth_plan.pdf");
        let err = export_transcript(&sample_transcript(2), &path, &default_page_setup())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
