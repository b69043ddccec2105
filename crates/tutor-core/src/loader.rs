//! Plain-text document loading.
//!
//! PDF extraction is an external collaborator; this loader consumes its
//! output layout instead: one `.txt` file per source document, with pages
//! separated by form feed (`\x0c`). A file without form feeds is a single
//! page-1 document.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::types::PageRecord;

pub fn load_pages(data_dir: &Path) -> Result<Vec<PageRecord>> {
    if !data_dir.exists() {
        return Err(Error::Setup(format!(
            "document directory {} does not exist; create it and add extracted .txt files",
            data_dir.display()
        )));
    }

    let files = list_txt_files(data_dir);
    if files.is_empty() {
        return Err(Error::Setup(format!(
            "no source documents found under {}; add extracted .txt files and re-run ingest",
            data_dir.display()
        )));
    }

    let mut pages = Vec::new();
    for file_path in &files {
        let content = read_file_content(file_path)?;
        let source = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        for (i, page_text) in content.split('\u{c}').enumerate() {
            if page_text.trim().is_empty() {
                continue;
            }
            pages.push(PageRecord {
                text: page_text.to_string(),
                page: Some(i as u32 + 1),
                source: source.clone(),
            });
        }
    }

    info!(files = files.len(), pages = pages.len(), "loaded source documents");
    Ok(pages)
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => {
            let bytes = fs::read(file_path)
                .map_err(|e| Error::Operation(format!("reading {}: {}", file_path.display(), e)))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();
    txt_files.sort();
    txt_files
}
