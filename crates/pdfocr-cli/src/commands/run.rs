//! Run command - OCR every file in a directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pdfocr_core::models::config::FailurePolicy;
use pdfocr_core::{DirectoryEvent, DirectoryOutcome, Pipeline};

use super::{OutputFormat, PipelineArgs, load_config, write_result};

/// Name reported in the timing line.
const DRIVER_NAME: &str = "process_directory";

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files";

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory to process (default: input.directory from config)
    input: Option<PathBuf>,

    /// Write one output file per input into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Maximum files processed at once (0 = unbounded)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error, collecting failed files
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.pipeline.apply(&mut config);
    if let Some(jobs) = args.jobs {
        config.concurrency.max_files = jobs;
    }
    if args.continue_on_error {
        config.concurrency.on_failure = FailurePolicy::Isolate;
    }
    config.validate()?;

    let dir = args
        .input
        .clone()
        .unwrap_or_else(|| config.input.directory.clone());

    let pipeline = Pipeline::from_config(&config)?;
    info!(
        "Processing with {} DPI, file limit {:?}, page limit {:?}",
        pipeline.dpi(),
        pipeline.file_limit().max(),
        pipeline.page_limit().max()
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)?
            .progress_chars("=>-"),
    );

    let start = Instant::now();

    let outcome = pipeline
        .process_directory_with(&dir, |event| match event {
            DirectoryEvent::Listed { dir, total } => {
                pb.suspend(|| {
                    println!(
                        "{} Found {} files to process in {}",
                        style("ℹ").blue(),
                        total,
                        dir.display()
                    )
                });
                pb.set_length(total as u64);
            }
            DirectoryEvent::Completed { .. } => pb.inc(1),
        })
        .await;
    pb.finish_and_clear();
    let outcome = outcome?;

    let elapsed = start.elapsed();

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
        for result in &outcome.results {
            write_result(output_dir, result, args.format)?;
        }
        println!(
            "{} Wrote {} files to {}",
            style("✓").green(),
            outcome.results.len(),
            output_dir.display()
        );
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcome)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if !outcome.failures.is_empty() {
        println!(
            "   {} successful, {} failed",
            style(outcome.results.len()).green(),
            style(outcome.failures.len()).red()
        );
        println!("{}", style("Failed files:").red());
        for failure in &outcome.failures {
            println!("  - {}: {}", failure.path.display(), failure.error);
        }
    }

    println!("{}", timing_line(elapsed));

    Ok(())
}

/// The end-of-run report line.
fn timing_line(elapsed: Duration) -> String {
    format!("Took us [{:.2}s] to run [{}]", elapsed.as_secs_f64(), DRIVER_NAME)
}

fn write_summary(path: &Path, outcome: &DirectoryOutcome) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "pages",
        "characters",
        "processing_time_ms",
        "error",
    ])?;

    for result in &outcome.results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let pages = result.page_count().to_string();
        let characters = result.char_count().to_string();
        let elapsed = result.processing_time_ms.to_string();
        wtr.write_record([
            filename,
            "success",
            pages.as_str(),
            characters.as_str(),
            elapsed.as_str(),
            "",
        ])?;
    }

    for failure in &outcome.failures {
        let filename = failure.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        wtr.write_record([filename, "error", "", "", "", failure.error.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
