//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! [`run_pipeline`] runs the same stages as [`process`](crate::process)
//! and records a [`StageDiagnostics`] for each one, alongside the edge
//! map the contours were traced from. Time is read through the
//! host-supplied [`Clock`].
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::curve::{CurveBuilder, rank_contours};
use crate::edge::{EdgeDetector, EdgeLevel, EdgeMap};
use crate::types::{Contour, Dimensions, PipelineConfig, PipelineError, ProcessResult};
use crate::{contour, contrast, grayscale};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
///
/// Hosts supply the implementation (`std::time::Instant` on native, a
/// performance counter elsewhere), which keeps this crate free of
/// platform time APIs.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// A clock that never advances. Used when timings are not wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoppedClock;

impl Clock for StoppedClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// The enhancement stage is `None` when `config.enhance` is off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// RGBA to grayscale conversion.
    pub grayscale: StageDiagnostics,
    /// Contrast stretch, strong blur and closing (only when enabled).
    pub enhance: Option<StageDiagnostics>,
    /// Edge detection.
    pub edge_detection: StageDiagnostics,
    /// Contour tracing.
    pub contour_tracing: StageDiagnostics,
    /// Ranking, mapping, simplification and curve assembly.
    pub curve_building: StageDiagnostics,
    /// Total duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Grayscale conversion metrics.
    Grayscale {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// Enhancement metrics.
    Enhance {
        /// Darkest input intensity before stretching.
        min_intensity: u8,
        /// Brightest input intensity before stretching.
        max_intensity: u8,
    },
    /// Edge detection metrics.
    EdgeDetection {
        /// Which detector ran.
        detector: String,
        /// Weak-edge threshold.
        low_threshold: i32,
        /// Strong-edge threshold.
        high_threshold: i32,
        /// Cells classified as strong.
        strong_pixel_count: u64,
        /// Cells classified as weak.
        weak_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Contour tracing metrics.
    ContourTracing {
        /// Number of contours found.
        contour_count: usize,
        /// Total number of points across all contours.
        total_point_count: usize,
        /// Minimum points in any single contour.
        min_contour_points: usize,
        /// Maximum points in any single contour.
        max_contour_points: usize,
        /// Mean points per contour.
        mean_contour_points: f64,
    },
    /// Curve building metrics.
    CurveBuilding {
        /// Douglas-Peucker tolerance in target-space units.
        tolerance: f64,
        /// Contours kept by ranking.
        selected_count: usize,
        /// Curves emitted.
        curve_count: usize,
        /// Total points in the selected contours.
        points_before: usize,
        /// Total points in the emitted curves.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Working image width in pixels.
    pub image_width: u32,
    /// Working image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of contours traced.
    pub contour_count: usize,
    /// Number of curves emitted.
    pub curve_count: usize,
    /// Points across all emitted curves.
    pub final_point_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages: Vec<(&str, &StageDiagnostics)> = vec![("Grayscale", &self.grayscale)];
        if let Some(ref e) = self.enhance {
            stages.push(("Enhance", e));
        }
        stages.push(("Edge Detection", &self.edge_detection));
        stages.push(("Contour Tracing", &self.contour_tracing));
        stages.push(("Curve Building", &self.curve_building));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Curves: {}  |  Final points: {}",
            self.summary.contour_count, self.summary.curve_count, self.summary.final_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Grayscale { width, height } => format!("{width}x{height}"),
        StageMetrics::Enhance {
            min_intensity,
            max_intensity,
        } => format!("range {min_intensity}..={max_intensity} -> 0..=255"),
        StageMetrics::EdgeDetection {
            detector,
            low_threshold,
            high_threshold,
            strong_pixel_count,
            weak_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                (*strong_pixel_count + *weak_pixel_count) as f64 / *total_pixel_count as f64
                    * 100.0
            } else {
                0.0
            };
            format!(
                "{detector} low={low_threshold} high={high_threshold} strong={strong_pixel_count} weak={weak_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::ContourTracing {
            contour_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => {
            format!(
                "{contour_count} contours, {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})",
            )
        }
        StageMetrics::CurveBuilding {
            tolerance,
            selected_count,
            curve_count,
            points_before,
            points_after,
            reduction_ratio,
        } => {
            format!(
                "tol={tolerance:.2} {selected_count} selected -> {curve_count} curves, {points_before}->{points_after} pts ({:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
    }
}

/// Statistics for a set of contours.
struct ContourStats {
    total: usize,
    min: usize,
    max: usize,
    mean: f64,
}

fn contour_stats(contours: &[Contour]) -> ContourStats {
    let total: usize = contours.iter().map(Contour::len).sum();
    let min = contours.iter().map(Contour::len).min().unwrap_or(0);
    let max = contours.iter().map(Contour::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if contours.is_empty() {
        0.0
    } else {
        total as f64 / contours.len() as f64
    };
    ContourStats {
        total,
        min,
        max,
        mean,
    }
}

/// Time a stage, returning its output and elapsed duration.
fn timed<C: Clock + ?Sized, T>(clock: &C, stage: impl FnOnce() -> T) -> (T, Duration) {
    let start = clock.now();
    let out = stage();
    (out, clock.elapsed(&start))
}

/// Everything a single pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Curves, contour count and working dimensions.
    pub result: ProcessResult,
    /// Per-stage timings and metrics.
    pub diagnostics: PipelineDiagnostics,
    /// Edge map the contours were traced from.
    pub edges: EdgeMap,
}

/// Run the full pipeline and record per-stage diagnostics.
///
/// Produces exactly the [`ProcessResult`] that [`process`](crate::process)
/// would for the same input.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock + ?Sized>(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    run_pipeline(rgba, width, height, config, clock).map(|run| (run.result, run.diagnostics))
}

/// Run the full pipeline, keeping the diagnostics and the edge map.
///
/// # Errors
///
/// Same as [`process`](crate::process).
pub fn run_pipeline<C: Clock + ?Sized>(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
    clock: &C,
) -> Result<PipelineRun, PipelineError> {
    config.validate()?;
    let pipeline_start = clock.now();

    let (gray, gray_time) = timed(clock, || grayscale::to_grayscale(rgba, width, height));
    let gray = gray?;
    let dimensions = Dimensions::of(&gray);
    log::debug!("grayscale: {}x{}", dimensions.width, dimensions.height);
    let grayscale_diag = StageDiagnostics {
        duration: gray_time,
        metrics: StageMetrics::Grayscale { width, height },
    };

    let (working, enhance_diag) = if config.enhance {
        let (min_intensity, max_intensity) = contrast::intensity_range(&gray).unwrap_or((0, 0));
        let (enhanced, enhance_time) = timed(clock, || crate::enhance(&gray));
        let enhanced = enhanced?;
        log::debug!("enhance: input range {min_intensity}..={max_intensity}");
        (
            enhanced,
            Some(StageDiagnostics {
                duration: enhance_time,
                metrics: StageMetrics::Enhance {
                    min_intensity,
                    max_intensity,
                },
            }),
        )
    } else {
        (gray, None)
    };

    let (edges, edge_time) = timed(clock, || {
        config
            .edge_detector
            .detect(&working, config.low_threshold, config.high_threshold)
    });
    let edges: EdgeMap = edges?;
    let strong = edges.count(EdgeLevel::Strong);
    let weak = edges.count(EdgeLevel::Weak);
    log::debug!(
        "edge detection ({}): {strong} strong, {weak} weak",
        config.edge_detector,
    );
    let edge_diag = StageDiagnostics {
        duration: edge_time,
        metrics: StageMetrics::EdgeDetection {
            detector: config.edge_detector.to_string(),
            low_threshold: config.low_threshold,
            high_threshold: config.high_threshold,
            strong_pixel_count: strong,
            weak_pixel_count: weak,
            total_pixel_count: u64::from(width) * u64::from(height),
        },
    };

    let (contours, trace_time) = timed(clock, || contour::find_contours(&edges));
    let stats = contour_stats(&contours);
    log::debug!(
        "contour tracing: {} contours, {} points",
        contours.len(),
        stats.total,
    );
    let trace_diag = StageDiagnostics {
        duration: trace_time,
        metrics: StageMetrics::ContourTracing {
            contour_count: contours.len(),
            total_point_count: stats.total,
            min_contour_points: stats.min,
            max_contour_points: stats.max,
            mean_contour_points: stats.mean,
        },
    };

    let builder = CurveBuilder::from_config(config);
    let (curves, build_time) = timed(clock, || builder.build(&contours, dimensions));
    let curves = curves?;
    let selected = rank_contours(&contours, config.max_curves);
    let points_before: usize = selected.iter().map(|c| c.len()).sum();
    let points_after: usize = curves.iter().map(crate::Curve::len).sum();
    #[allow(clippy::cast_precision_loss)]
    let reduction_ratio = if points_before > 0 {
        1.0 - points_after as f64 / points_before as f64
    } else {
        0.0
    };
    let build_diag = StageDiagnostics {
        duration: build_time,
        metrics: StageMetrics::CurveBuilding {
            tolerance: config.simplify_tolerance,
            selected_count: selected.len(),
            curve_count: curves.len(),
            points_before,
            points_after,
            reduction_ratio,
        },
    };

    let total_duration = clock.elapsed(&pipeline_start);
    let summary = PipelineSummary {
        image_width: width,
        image_height: height,
        pixel_count: u64::from(width) * u64::from(height),
        contour_count: contours.len(),
        curve_count: curves.len(),
        final_point_count: points_after,
    };

    let result = ProcessResult {
        curves,
        contour_count: contours.len(),
        dimensions,
    };
    let diagnostics = PipelineDiagnostics {
        grayscale: grayscale_diag,
        enhance: enhance_diag,
        edge_detection: edge_diag,
        contour_tracing: trace_diag,
        curve_building: build_diag,
        total_duration,
        summary,
    };

    Ok(PipelineRun {
        result,
        diagnostics,
        edges,
    })
}
