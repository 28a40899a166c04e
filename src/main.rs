// src/main.rs
mod extractors;
mod report;
mod storage;
mod utils;
mod workbook;

use clap::Parser;
use extractors::ReportExtractor;
use std::path::PathBuf;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the final CAPA report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the final CAPA report (.docx)
    #[arg(short, long)]
    report: PathBuf,

    /// Path to the trending workbook (.xlsx); when given, the target
    /// worksheet is verified to exist before extraction runs
    #[arg(short, long)]
    workbook: Option<PathBuf>,

    /// Worksheet the extracted data is destined for
    #[arg(short = 's', long, default_value = "Sheet1")]
    worksheet: String,

    /// Output directory for extraction results
    #[arg(short, long, default_value = "./output")]
    output_dir: String,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Read the report document
    let document = report::read_report(&args.report)?;

    // 5. Verify the workbook target before extracting, so a bad worksheet
    //    name fails up front rather than after the work is done
    if let Some(workbook_path) = &args.workbook {
        let handle = workbook::open_worksheet(workbook_path, &args.worksheet)?;
        tracing::info!(
            "Workbook target verified: {} -> {}",
            handle.workbook.display(),
            handle.worksheet
        );
    } else {
        tracing::debug!("No workbook given, results go to JSON only");
    }

    // 6. Run the extraction
    let mut extractor = ReportExtractor::new(document, args.worksheet.clone());
    extractor.process_document();

    tracing::info!(
        "Extracted {} findings rows and {} metadata fields",
        extractor.table_data().len(),
        extractor.project_info().len()
    );

    // 7. Persist the results
    let report_name = args
        .report
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Config(format!("Invalid report path: {}", args.report.display())))?;

    let results_path = storage.save_results(&report_name, &extractor)?;
    tracing::info!("Results saved to: {}", results_path.display());

    Ok(())
}
