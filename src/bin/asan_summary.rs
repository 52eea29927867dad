//! Consolidate AddressSanitizer test logs into a single HTML report.
//!
//! Reads every file in the log directory in sorted name order, extracts
//! leak and error reports, and writes `asan_summary.html` into the output
//! directory. Leaks already reported by an earlier file in the run are
//! suppressed; grown leaks and all errors are kept.
//!
//! # Usage
//!
//! ```bash
//! asan_summary ./report-out ./test-logs
//! ASAN_LOG_DIR=./test-logs asan_summary ./report-out
//! asan_summary ./report-out ./test-logs --json
//! ```

use asan_report::page;
use asan_report::report::ReportBuilder;
use clap::Parser;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "asan_summary")]
#[command(about = "Consolidate AddressSanitizer test logs into a single HTML report")]
#[command(version)]
struct Args {
    /// Directory the report is written to
    out_dir: PathBuf,

    /// Directory containing the sanitizer log files
    #[arg(env = "ASAN_LOG_DIR")]
    log_dir: PathBuf,

    /// Also write a machine-readable asan_summary.json
    #[arg(long)]
    json: bool,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut log_files: Vec<(String, PathBuf)> = Vec::new();
    let entries = fs::read_dir(&args.log_dir).map_err(|e| {
        format!(
            "Failed to read log directory '{}': {}",
            args.log_dir.display(),
            e
        )
    })?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let name = entry.file_name().to_string_lossy().into_owned();
            log_files.push((name, entry.path()));
        }
    }
    // Sorted name order keeps runs deterministic; leak deduplication
    // depends on the file history up to each file.
    log_files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut builder = ReportBuilder::new();
    for (name, path) in &log_files {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read log file '{}': {}", path.display(), e))?;
        builder.add_file(name, &text);
    }
    let report = builder.finish();

    eprintln!(
        "Processed {} log files: {} new leaks, {} grown leaks, {} errors, {} warnings",
        report.summary.files,
        report.summary.new_leaks,
        report.summary.grown_leaks,
        report.summary.errors,
        report.summary.warnings,
    );

    let html_path = args.out_dir.join(page::OUTPUT_FILE);
    write_atomically(&args.out_dir, &html_path, |writer| {
        report.write_html(writer)
    })?;
    eprintln!("Wrote '{}'", html_path.display());

    if args.json {
        let json_path = args.out_dir.join(page::JSON_OUTPUT_FILE);
        write_atomically(&args.out_dir, &json_path, |writer| {
            report.write_json(writer)
        })?;
        eprintln!("Wrote '{}'", json_path.display());
    }

    Ok(())
}

/// Write through a temporary file renamed into place, so an aborted run
/// never leaves a half-written report behind.
fn write_atomically<F>(out_dir: &Path, final_path: &Path, write: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut BufWriter<File>) -> asan_report::report::Result<()>,
{
    let tmp_path = out_dir.join(".asan_summary.tmp");
    let file = File::create(&tmp_path).map_err(|e| {
        format!(
            "Failed to create output file '{}': {}",
            tmp_path.display(),
            e
        )
    })?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp_path, final_path).map_err(|e| {
        format!(
            "Failed to move report into place at '{}': {}",
            final_path.display(),
            e
        )
    })?;
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
