//! Discovers and reads plain-text source documents.
//!
//! Format parsing beyond plain text (PDF extraction etc.) is an external
//! concern; this loader only consumes `.txt` and `.md` files.

use crate::error::{Error, Result};
use crate::types::Document;
use std::fs;
use std::path::{Path, PathBuf};

/// Load every `.txt`/`.md` file under `root`, sorted by path for
/// deterministic chunk ordering.
///
/// Fails when the directory itself is missing (a configuration error);
/// individual unreadable files fail the load too rather than silently
/// shrinking the corpus.
pub fn load_documents(root: &Path) -> Result<Vec<Document>> {
    if !root.is_dir() {
        return Err(Error::InvalidConfig(format!(
            "document directory '{}' does not exist",
            root.display()
        )));
    }

    let files = list_text_files(root);
    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let text = read_file_content(path)?;
        let doc_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        documents.push(Document {
            doc_id,
            path: path.to_string_lossy().to_string(),
            text,
        });
    }
    tracing::info!(
        directory = %root.display(),
        documents = documents.len(),
        "loaded source documents"
    );
    Ok(documents)
}

fn read_file_content(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        // Not valid UTF-8; fall back to a lossy read.
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}

fn list_text_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("txt") | Some("md")
        ) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}
