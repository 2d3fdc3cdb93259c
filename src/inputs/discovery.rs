// src/inputs/discovery.rs
use crate::inputs::models::{InputFile, InputKind};
use crate::utils::error::InputError;
use std::path::Path;
use walkdir::WalkDir;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Maps a path to the kind of input it is, by extension (ASCII case-insensitive).
pub fn classify(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("pdf") {
        Some(InputKind::Pdf)
    } else if SPREADSHEET_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        Some(InputKind::Spreadsheet)
    } else {
        None
    }
}

/// Lists the processable files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Entries that cannot be inspected are
/// logged and left out.
pub fn discover_inputs(dir: &Path) -> Result<Vec<InputFile>, InputError> {
    if !dir.is_dir() {
        return Err(InputError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input folder {} does not exist", dir.display()),
        )));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match classify(path) {
            Some(kind) => {
                tracing::debug!("Found {:?} input: {}", kind, path.display());
                files.push(InputFile { path: path.to_path_buf(), kind });
            }
            None => tracing::debug!("Ignoring unsupported file: {}", path.display()),
        }
    }

    Ok(files)
}
