//! Process command - extract identity fields from a single file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use idscan_core::models::config::{IdscanConfig, OcrEngineKind, ThresholdMode};
use idscan_core::{DocumentPipeline, IdscanError, ProgressEvent, Report};

use super::config::load_config;

/// Arguments for processing a file.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    input: Option<PathBuf>,

    /// Unexpected extra paths; exactly one input is accepted
    #[arg(hide = true)]
    extra: Vec<PathBuf>,

    /// Treat the input as already-recognized text and only extract fields
    #[arg(long)]
    text: bool,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// OCR languages, joined with '+' (e.g. eng+hin)
    #[arg(short, long, value_delimiter = '+')]
    lang: Vec<String>,

    /// DPI for rendering PDF pages
    #[arg(long)]
    dpi: Option<u32>,

    /// Maximum number of PDF pages to process (0 = all)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Binarization strategy
    #[arg(long, value_enum)]
    threshold: Option<ThresholdArg>,

    /// OCR engine
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// Save enhanced page images into this directory
    #[arg(long, value_name = "DIR")]
    save_enhanced: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ThresholdArg {
    /// Local mean threshold
    Adaptive,
    /// Global Otsu threshold
    Otsu,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EngineArg {
    /// Tesseract command-line binary
    Tesseract,
    /// Pure Rust ONNX models (Latin script only)
    Onnx,
}

impl ProcessArgs {
    /// The input path, or `None` unless exactly one was given.
    fn input(&self) -> Option<&Path> {
        if !self.extra.is_empty() {
            warn!("Expected one input path, got {}", self.extra.len() + 1);
            return None;
        }
        self.input.as_deref()
    }

    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut IdscanConfig) {
        if !self.lang.is_empty() {
            config.ocr.languages = self.lang.clone();
        }
        if let Some(dpi) = self.dpi {
            config.pdf.render_dpi = dpi;
        }
        if let Some(max_pages) = self.max_pages {
            config.pdf.max_pages = max_pages;
        }
        if let Some(threshold) = self.threshold {
            config.enhance.mode = match threshold {
                ThresholdArg::Adaptive => ThresholdMode::Adaptive,
                ThresholdArg::Otsu => ThresholdMode::Otsu,
            };
        }
        if let Some(engine) = self.engine {
            config.ocr.engine = match engine {
                EngineArg::Tesseract => OcrEngineKind::Tesseract,
                EngineArg::Onnx => OcrEngineKind::Onnx,
            };
        }
        if let Some(dir) = &self.save_enhanced {
            config.enhance.debug_dir = Some(dir.clone());
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            let report = Report::failure(IdscanError::Config(format!("{:#}", e)));
            write_report(&report, &args)?;
            return Ok(ExitCode::SUCCESS);
        }
    };
    args.apply(&mut config);
    debug!("Effective configuration: {:?}", config);

    let pb = progress_bar()?;
    let spinner = pb.clone();
    let pipeline = DocumentPipeline::new(config)
        .with_progress(move |event| spinner.set_message(describe(event)));

    let input = args.input();
    if let Some(path) = input {
        info!("Processing file: {}", path.display());
    }

    let report = if args.text {
        pipeline.run_text(input)
    } else {
        pipeline.run(input)
    };

    pb.finish_and_clear();
    write_report(&report, &args)?;

    debug!("Total processing time: {:?}", start.elapsed());

    // Only a missing path exits non-zero
    if input.is_none() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Ok(pb)
}

fn describe(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Opened { kind, pages } => format!("Opened {:?} ({} pages)", kind, pages),
        ProgressEvent::Rendering { page } => format!("Rendering page {}...", page),
        ProgressEvent::Enhancing { page } => format!("Enhancing page {}...", page),
        ProgressEvent::Recognizing { page } => format!("Running OCR on page {}...", page),
        ProgressEvent::Extracting { page } => format!("Extracting fields from page {}...", page),
        ProgressEvent::Finished => "Done".to_string(),
    }
}

fn write_report(report: &Report, args: &ProcessArgs) -> anyhow::Result<()> {
    let output = if args.pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, format!("{}\n", output))?;
        info!("Output written to {}", output_path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}
