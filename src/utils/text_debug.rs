// src/utils/text_debug.rs
use crate::extractors::PageTrace;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the page-by-page extraction trace of one PDF, every line tagged with
/// the action the state machine took on it.
pub fn save_extraction_trace(debug_dir: &Path, document: &str, pages: &[PageTrace]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(debug_dir)?;

    let stem = Path::new(document)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.to_string());
    let path = debug_dir.join(format!("{}_trace.txt", stem));
    let mut out = BufWriter::new(File::create(&path)?);

    writeln!(out, "# {}", document)?;
    for page in pages {
        writeln!(out)?;
        writeln!(out, "## page {}", page.page)?;
        if let Some(err) = &page.error {
            writeln!(out, "!! unreadable: {}", err)?;
        }
        for line in &page.lines {
            writeln!(out, "{} {}", line.action.tag(), line.text)?;
        }
    }
    out.flush()?;

    tracing::info!("Saved extraction trace to {}", path.display());
    Ok(path)
}
