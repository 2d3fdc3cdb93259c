// src/main.rs
mod utils;
mod extractors;
mod inputs;
mod reconcile;
mod storage;
mod workbook;

use clap::{Parser, ValueEnum};
use reconcile::ReconcileColumns;
use storage::StorageManager;
use utils::AppError;
use workbook::assembler::{Assembler, AssemblerConfig};

/// Which reference column names the per-instrument sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LabelColumn {
    /// `best ticker`
    BestTicker,
    /// `best name`
    BestName,
}

impl LabelColumn {
    fn column_name(self) -> &'static str {
        match self {
            LabelColumn::BestTicker => "best ticker",
            LabelColumn::BestName => "best name",
        }
    }
}

/// Combines statement PDFs and instrument spreadsheets into a single workbook
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder containing the PDFs and spreadsheets to combine
    #[arg(short, long, default_value = "input")]
    input_dir: String,

    /// Path of the combined workbook to write
    #[arg(short, long, default_value = "output/combined_output.xlsx")]
    output: String,

    /// Reference column used to name the per-instrument sheets
    #[arg(long, value_enum, default_value_t = LabelColumn::BestTicker)]
    label_column: LabelColumn,

    /// File-name fragment identifying the reference spreadsheet (case-insensitive)
    #[arg(long, default_value = "instrument_id")]
    reference_marker: String,

    /// File-name fragment identifying the import spreadsheet (case-insensitive)
    #[arg(long, default_value = "import tdx")]
    import_marker: String,

    /// Debug mode - save annotated extraction traces for every PDF
    #[arg(short, long)]
    debug: bool,

    /// Also write a JSON summary of the run next to the workbook
    #[arg(long)]
    metadata: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Find input files
    let input_dir = std::path::Path::new(&args.input_dir);
    if !input_dir.is_dir() {
        tracing::error!("Input folder {} does not exist.", input_dir.display());
        return Err(AppError::Config(format!("input folder {} does not exist", input_dir.display())));
    }
    let files = inputs::discover_inputs(input_dir)?;
    tracing::info!("Found {} input files in {}", files.len(), input_dir.display());

    // 4. Initialize storage (creates the output directory)
    let storage = StorageManager::new(&args.output)?;

    // 5. Process every file, then build the workbook
    let debug_dir = args.debug.then(|| {
        storage
            .output_path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("debug")
    });
    let config = AssemblerConfig {
        reference_marker: args.reference_marker.clone(),
        import_marker: args.import_marker.clone(),
        columns: ReconcileColumns {
            reference_label: args.label_column.column_name().to_string(),
            ..ReconcileColumns::default()
        },
        debug_dir,
    };
    let assembler = Assembler::new(config);
    let accumulator = assembler.process_files(&files);
    let (workbook, stats) = assembler.assemble(accumulator);

    // 6. Save the workbook; this is the only step allowed to abort the run
    match storage.save_workbook(&workbook) {
        Ok(path) => tracing::info!("Combined table and spreadsheet sheets saved to {}", path.display()),
        Err(e) => {
            tracing::error!("Error saving workbook {}: {}", args.output, e);
            return Err(e.into());
        }
    }

    if args.metadata {
        match storage.save_run_metadata(&workbook, &stats) {
            Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
            Err(e) => tracing::warn!("Failed to save run metadata: {}", e),
        }
    }

    tracing::info!(
        "Processing finished. PDFs: {} ({} unreadable), lines: {}, spreadsheets: {} ({} failed), instrument sheets: {}",
        stats.pdf_documents,
        stats.pdf_unreadable,
        stats.captured_lines,
        stats.spreadsheets,
        stats.spreadsheets_failed,
        stats.extract_sheets
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["statement_combiner"]);
        assert_eq!(args.input_dir, "input");
        assert_eq!(args.output, "output/combined_output.xlsx");
        assert_eq!(args.label_column, LabelColumn::BestTicker);
        assert!(!args.debug && !args.metadata);
    }

    #[test]
    fn test_cli_label_variant() {
        let args = Args::parse_from(["statement_combiner", "--label-column", "best-name", "-i", "in", "-d"]);
        assert_eq!(args.label_column.column_name(), "best name");
        assert_eq!(args.input_dir, "in");
        assert!(args.debug);
    }
}
