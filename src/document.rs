//! Document handles and source-directory enumeration.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Errors raised while resolving the input document set.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("source directory '{}' does not exist", .0.display())]
    SourceDirMissing(PathBuf),

    #[error("no PDF documents found in '{}'", .0.display())]
    NoDocuments(PathBuf),

    #[error("failed to read source directory: {0}")]
    Io(#[from] std::io::Error),
}

/// One input PDF: its display name and its location on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub path: PathBuf,
}

impl Document {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }
}

/// List the PDF files directly inside `dir`, sorted by filename.
///
/// Non-recursive; the extension match is case-insensitive. A missing
/// directory and an empty result are distinct errors so the caller can
/// report them precisely.
pub fn enumerate_pdfs(dir: &Path) -> Result<Vec<Document>, ConfigurationError> {
    if !dir.is_dir() {
        return Err(ConfigurationError::SourceDirMissing(dir.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            documents.push(Document::new(path));
        }
    }

    if documents.is_empty() {
        return Err(ConfigurationError::NoDocuments(dir.to_path_buf()));
    }

    documents.sort_by(|a, b| a.name.cmp(&b.name));
    info!(count = documents.len(), dir = %dir.display(), "Enumerated PDF documents");
    Ok(documents)
}
