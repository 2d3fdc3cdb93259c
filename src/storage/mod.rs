// src/storage/mod.rs
pub mod xlsx;

use crate::utils::error::StorageError;
use crate::workbook::assembler::RunStats;
use crate::workbook::OutputWorkbook;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct StorageManager {
    output_path: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager writing to `output_path`, creating its parent directory if needed
    pub fn new<P: AsRef<Path>>(output_path: P) -> Result<Self, StorageError> {
        let output_path = output_path.as_ref().to_path_buf();

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }
        }

        Ok(Self { output_path })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn output_dir(&self) -> PathBuf {
        match self.output_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Renders and saves the workbook. The file at the output path is either
    /// fully replaced or left untouched: the bytes go to a temporary file in the
    /// same directory which is then renamed over the target.
    pub fn save_workbook(&self, workbook: &OutputWorkbook) -> Result<PathBuf, StorageError> {
        let bytes = xlsx::render_workbook(workbook)?;

        let mut tmp = NamedTempFile::new_in(self.output_dir()).map_err(StorageError::IoError)?;
        tmp.write_all(&bytes).map_err(StorageError::IoError)?;
        tmp.as_file().sync_all().map_err(StorageError::IoError)?;

        tmp.persist(&self.output_path).map_err(|e| StorageError::Persist {
            path: self.output_path.display().to_string(),
            source: e.error,
        })?;

        tracing::info!("Saved workbook ({} sheets, {} bytes) to {}", workbook.sheets().len(), bytes.len(), self.output_path.display());
        Ok(self.output_path.clone())
    }

    /// Saves metadata about the run in JSON format next to the workbook
    pub fn save_run_metadata(&self, workbook: &OutputWorkbook, stats: &RunStats) -> Result<PathBuf, StorageError> {
        let stem = self
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let file_path = self.output_dir().join(format!("{}_meta.json", stem));

        // Create metadata structure
        let metadata = serde_json::json!({
            "output": self.output_path.display().to_string(),
            "sheets": workbook.sheet_names(),
            "stats": stats,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}
