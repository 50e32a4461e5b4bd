//! File command - OCR a single PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pdfocr_core::Pipeline;

use super::{OutputFormat, PipelineArgs, format_result, load_config};

/// Arguments for the file command.
#[derive(Args)]
pub struct FileArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

pub async fn run(args: FileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.pipeline.apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = Pipeline::from_config(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Recognizing {}", args.input.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = pipeline.process_file(args.input.clone()).await;
    pb.finish_and_clear();
    let result = result?;

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} pages written to {} in {:.2}s",
            style("✓").green(),
            result.page_count(),
            output_path.display(),
            start.elapsed().as_secs_f64()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
