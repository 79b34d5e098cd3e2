//! desgen: turn an image file into curves for a graphing calculator.
//!
//! Decodes the image, shrinks it to the working width, runs the
//! image-to-curve pipeline, and writes the curves as calculator
//! expressions, JSON, or an SVG preview.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin desgen -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod downsample;
mod logger;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use desgen_export::{SvgMetadata, Viewport, fit_viewport, to_expression_text, to_svg};
use desgen_pipeline::diagnostics::{Clock, StoppedClock, run_pipeline};
use desgen_pipeline::{Curve, Dimensions, EdgeDetectorKind, EdgeMap, PipelineConfig, ProcessResult};
use serde::Serialize;

use crate::downsample::{DownsampleFilter, downsample};

/// Input files larger than this are rejected before decoding.
const MAX_INPUT_BYTES: u64 = 5 * 1024 * 1024;

/// Default working width in pixels.
const DEFAULT_WORKING_WIDTH: u32 = 500;

/// Convert an image into vector curves for a graphing calculator.
#[derive(Parser)]
#[command(name = "desgen", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Weak-edge gradient threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_LOW_THRESHOLD)]
    low: i32,

    /// Strong-edge gradient threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_HIGH_THRESHOLD)]
    high: i32,

    /// Maximum number of curves, longest contours first.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MAX_CURVES, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_curves: usize,

    /// Stretch contrast, blur and close gaps before edge detection.
    #[arg(long)]
    enhance: bool,

    /// Simplification tolerance in plot units.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SIMPLIFY_TOLERANCE)]
    tolerance: f64,

    /// Plot extent along the image's longer axis.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_TARGET_SPAN)]
    target_span: f64,

    /// Edge detection strategy.
    #[arg(long, value_enum, default_value_t = Detector::TwoLevel)]
    edge_detector: Detector,

    /// Images wider than this are scaled down to it before processing.
    #[arg(long, default_value_t = DEFAULT_WORKING_WIDTH, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    working_width: u32,

    /// Resampling filter used when scaling down.
    #[arg(long, value_enum, default_value_t = DownsampleFilter::default())]
    downsample_filter: DownsampleFilter,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Expressions)]
    format: Format,

    /// Write output to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write the edge map as a PNG.
    #[arg(long)]
    edges: Option<PathBuf>,

    /// Print a per-stage timing report to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

/// Edge detection strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Detector {
    /// Sobel magnitude with a two-level threshold.
    TwoLevel,
    /// Full Canny with non-maximum suppression.
    Canny,
}

/// Output format selection.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Calculator list and polygon expressions.
    Expressions,
    /// Curves, counts and viewport as JSON.
    Json,
    /// SVG preview.
    Svg,
}

/// JSON document written by `--format json`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    curves: &'a [Curve],
    contour_count: usize,
    dimensions: Dimensions,
    viewport: Option<Viewport>,
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PipelineConfig {
            low_threshold: cli.low,
            high_threshold: cli.high,
            max_curves: cli.max_curves,
            enhance: cli.enhance,
            simplify_tolerance: cli.tolerance,
            target_span: cli.target_span,
            edge_detector: match cli.edge_detector {
                Detector::TwoLevel => EdgeDetectorKind::TwoLevel,
                Detector::Canny => EdgeDetectorKind::Canny,
            },
        }
    };
    config.validate().map_err(|e| format!("Error: {e}"))?;
    Ok(config)
}

/// Read and decode the image, refusing oversized files up front.
fn load_image(path: &Path) -> Result<image::DynamicImage, String> {
    let size = std::fs::metadata(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?
        .len();
    if size > MAX_INPUT_BYTES {
        return Err(format!(
            "{} is {size} bytes; images larger than 5 MiB are not accepted",
            path.display(),
        ));
    }
    let bytes = std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    log::info!("Image: {} ({} bytes)", path.display(), bytes.len());
    image::load_from_memory(&bytes).map_err(|e| format!("Error decoding {}: {e}", path.display()))
}

/// Save the edge map the curves were traced from as a PNG.
fn write_edge_map(edges: &EdgeMap, path: &Path) -> Result<(), String> {
    edges
        .as_image()
        .save(path)
        .map_err(|e| format!("Error writing edge map to {}: {e}", path.display()))?;
    log::info!("Edge map written to {}", path.display());
    Ok(())
}

/// One-line summary of the parameters, used as the SVG description.
fn describe(config: &PipelineConfig) -> String {
    format!(
        "low={} high={} max_curves={} enhance={} tolerance={} span={} detector={}",
        config.low_threshold,
        config.high_threshold,
        config.max_curves,
        config.enhance,
        config.simplify_tolerance,
        config.target_span,
        config.edge_detector,
    )
}

fn render(
    cli: &Cli,
    config: &PipelineConfig,
    result: &ProcessResult,
) -> Result<String, String> {
    match cli.format {
        Format::Expressions => Ok(to_expression_text(&result.curves)),
        Format::Json => {
            let doc = JsonOutput {
                curves: &result.curves,
                contour_count: result.contour_count,
                dimensions: result.dimensions,
                viewport: fit_viewport(&result.curves),
            };
            serde_json::to_string_pretty(&doc)
                .map(|json| json + "\n")
                .map_err(|e| format!("Error serializing curves: {e}"))
        }
        Format::Svg => {
            let title = cli
                .image_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("desgen");
            let desc = describe(config);
            let metadata = SvgMetadata {
                title: Some(title),
                description: Some(&desc),
            };
            Ok(to_svg(&result.curves, config.target_span, &metadata))
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;
    log::debug!("Config: {config:?}");

    let decoded = load_image(&cli.image_path)?;
    let (original_w, original_h) = (decoded.width(), decoded.height());
    let (working, resized) = downsample(decoded, cli.working_width, cli.downsample_filter);
    let rgba = working.to_rgba8();
    if resized {
        log::info!(
            "Downsampled {original_w}x{original_h} -> {}x{}",
            rgba.width(),
            rgba.height(),
        );
    }

    let (w, h) = (rgba.width(), rgba.height());
    let run = if cli.diagnostics {
        run_pipeline(rgba.as_raw(), w, h, &config, &StdClock)
    } else {
        run_pipeline(rgba.as_raw(), w, h, &config, &StoppedClock)
    }
    .map_err(|e| format!("Pipeline error: {e}"))?;
    if cli.diagnostics {
        eprintln!("{}", run.diagnostics.report());
    }
    let result = &run.result;

    log::info!(
        "Generated {} curves from {} contours",
        result.curves.len(),
        result.contour_count,
    );
    if result.curves.is_empty() {
        log::warn!("No curves found; try lowering --low/--high or enabling --enhance");
    }

    if let Some(ref edges_path) = cli.edges {
        write_edge_map(&run.edges, edges_path)?;
    }

    let rendered = render(cli, &config, result)?;
    match cli.output {
        Some(ref path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
            log::info!("Output written to {} ({} bytes)", path.display(), rendered.len());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| format!("Error writing to stdout: {e}"))?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = logger::level_from_verbosity(cli.verbose, cli.quiet);
    if let Err(e) = logger::init_with_level(level) {
        eprintln!("Error installing logger: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
