// src/workbook/mod.rs
use crate::utils::error::WorkbookError;
use calamine::{open_workbook, Reader, Xlsx};
use std::path::{Path, PathBuf};

/// Pass-through handle for the spreadsheet-writing stage: the workbook and
/// the worksheet the extraction results are destined for. This module only
/// verifies the target exists; all writing happens downstream.
#[derive(Debug, Clone)]
pub struct WorksheetHandle {
    pub workbook: PathBuf,
    pub worksheet: String,
}

/// Opens the trending workbook and checks that the named worksheet exists.
/// A missing file or missing sheet is a fatal, user-visible error raised
/// before any extraction runs.
pub fn open_worksheet<P: AsRef<Path>>(
    path: P,
    worksheet: &str,
) -> Result<WorksheetHandle, WorkbookError> {
    let path = path.as_ref();
    let workbook: Xlsx<std::io::BufReader<std::fs::File>> =
        open_workbook(path).map_err(|e: calamine::XlsxError| WorkbookError::Open(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    tracing::debug!("Workbook {} sheets: {:?}", path.display(), sheet_names);

    if !sheet_names.iter().any(|name| name.as_str() == worksheet) {
        return Err(WorkbookError::SheetNotFound(worksheet.to_string()));
    }

    Ok(WorksheetHandle {
        workbook: path.to_path_buf(),
        worksheet: worksheet.to_string(),
    })
}
