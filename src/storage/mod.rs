// src/storage/mod.rs
use crate::extractors::ReportExtractor;
use crate::report::models::process_area_counters;
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves one extraction run as pretty-printed JSON under
    /// `<base_dir>/<report_name>/extraction.json`. The zeroed process-area
    /// counter scaffold rides along for the spreadsheet-writing stage to
    /// populate.
    pub fn save_results(
        &self,
        report_name: &str,
        extractor: &ReportExtractor,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(report_name);

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let file_path = target_dir.join("extraction.json");

        let results = serde_json::json!({
            "source_report": report_name,
            "worksheet": extractor.worksheet(),
            "findings": extractor.table_data(),
            "project_info": extractor.project_info(),
            "process_areas": process_area_counters(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let results_str = serde_json::to_string_pretty(&results)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, results_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved extraction results to {}", file_path.display());

        Ok(file_path)
    }
}
