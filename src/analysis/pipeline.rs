//! End-to-end page analysis: alignment, stroke detection, line grouping,
//! metric estimation and scoring, composed into one call.

use image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

use crate::analysis::estimators;
use crate::analysis::grouping::{LineGrouper, line_counts};
use crate::core::config::PipelineConfig;
use crate::core::errors::PalographError;
use crate::core::roi::{RoiFrac, RoiRect};
use crate::domain::levels::{OrderPattern, ReasoningLevel};
use crate::domain::metrics::AssessmentResult;
use crate::domain::stroke::Line;
use crate::processors::align::DocumentAligner;
use crate::processors::binarize::{binarize_region, ink_ratio};
use crate::processors::strokes::StrokeDetector;
use crate::scoring::engine::{AssessmentContext, Measurements, ScoringEngine};

/// Per-run options supplied by the caller. Any override present here
/// wins over the corresponding automatic measurement.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Error count reported by the examiner.
    pub errors: u32,
    /// ROI for this sheet; falls back to the configured default.
    pub roi: Option<RoiFrac>,
    /// Swap the left and right margin measurements (scanned mirrored).
    pub swap_lr_margins: bool,
    /// Normalized irregularity tokens.
    pub irregularities: Vec<String>,
    /// Examiner-observed order pattern; measured when absent.
    pub order_pattern: Option<OrderPattern>,
    /// Examiner-assessed reasoning level.
    pub reasoning_level: Option<ReasoningLevel>,
    /// Examiner-entered measurements; each present field replaces the
    /// automatic one.
    pub overrides: Measurements,
}

/// Everything one analysis run produces, including the intermediate
/// images needed for reports and overlays.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    /// The assessment document.
    pub result: AssessmentResult,
    /// Strokes per detected line, top to bottom.
    pub line_counts: Vec<u32>,
    /// Lines in ROI-local coordinates.
    pub local_lines: Vec<Line>,
    /// Lines translated into aligned-page coordinates.
    pub global_lines: Vec<Line>,
    /// The pixel rectangle that was analyzed.
    pub roi_rect: RoiRect,
    /// The rectified page.
    pub aligned: RgbImage,
    /// The cropped analysis region.
    pub region: RgbImage,
    /// The binarized region (ink = 255).
    pub binary: GrayImage,
    /// The cleaned vertical-stroke mask.
    pub mask: GrayImage,
}

/// Composes the full measurement pipeline over a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: PipelineConfig,
    aligner: DocumentAligner,
    detector: StrokeDetector,
    grouper: LineGrouper,
    engine: ScoringEngine,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Analyzer {
    /// Builds an analyzer; each stage gets its slice of the config.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            aligner: DocumentAligner::new(config.aligner.clone()),
            detector: StrokeDetector::new(config.detector.clone()),
            grouper: LineGrouper::new(config.grouping.clone()),
            engine: ScoringEngine::new(config.score.clone()),
            config,
        }
    }

    /// The configuration this analyzer runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The scoring engine, for count-only manual assessments.
    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Loads an image from disk and runs the full analysis.
    pub fn process_path(
        &self,
        path: impl AsRef<Path>,
        options: &ProcessOptions,
    ) -> Result<PageAnalysis, PalographError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "analyzing sheet");
        let aligned = self.aligner.load_and_align(path)?;
        Ok(self.analyze_aligned(aligned, options))
    }

    /// Runs the full analysis on an already loaded image.
    pub fn process_image(&self, image: &DynamicImage, options: &ProcessOptions) -> PageAnalysis {
        self.analyze_aligned(self.aligner.align(image), options)
    }

    fn analyze_aligned(&self, aligned: RgbImage, options: &ProcessOptions) -> PageAnalysis {
        let (region, roi_rect) = self.aligner.crop_roi(&aligned, options.roi);
        let binary = binarize_region(&region, &self.config.aligner);
        let detected = self.detector.detect(&binary);
        let local_lines = self.grouper.group(&detected.strokes);
        let counts = line_counts(&local_lines);
        let global_lines: Vec<Line> = local_lines
            .iter()
            .map(|l| l.translate(roi_rect.x1, roi_rect.y1))
            .collect();

        tracing::debug!(
            lines = local_lines.len(),
            strokes = detected.strokes.len(),
            "grouping complete"
        );

        let auto = self.measure(&aligned, &region, &detected.mask, &local_lines, &global_lines, &counts, options);
        let measurements = merged_measurements(auto, &options.overrides);

        let context = AssessmentContext {
            errors: options.errors,
            irregularities: options.irregularities.clone(),
            order_pattern: options
                .order_pattern
                .unwrap_or_else(|| estimators::order_pattern(&local_lines)),
            reasoning_level: options.reasoning_level.unwrap_or_default(),
        };

        let mut result = self.engine.assess_counts(&counts, &measurements, &context);
        result.auto_quality = Some(estimators::auto_quality(
            ink_ratio(&binary),
            &local_lines,
            &counts,
        ));

        tracing::info!(
            total = result.raw.total,
            lines = counts.len(),
            score = result.raw.final_score,
            "analysis complete"
        );

        PageAnalysis {
            result,
            line_counts: counts,
            local_lines,
            global_lines,
            roi_rect,
            aligned,
            region,
            binary,
            mask: detected.mask,
        }
    }

    /// All automatic physical measurements for one sheet.
    fn measure(
        &self,
        aligned: &RgbImage,
        region: &RgbImage,
        mask: &GrayImage,
        local_lines: &[Line],
        global_lines: &[Line],
        counts: &[u32],
        options: &ProcessOptions,
    ) -> Measurements {
        let mm_per_px = self.config.aligner.mm_per_px();
        let region_gray = DynamicImage::ImageRgb8(region.clone()).to_luma8();

        let margins = estimators::margins_mm(global_lines, aligned.width(), mm_per_px)
            .map(|m| if options.swap_lr_margins { m.swap_lr() } else { m });

        Measurements {
            spacing_mm: estimators::spacing_mm(local_lines, mm_per_px),
            stroke_height_mm: estimators::stroke_height_mm(local_lines, mm_per_px),
            line_spacing_mm: estimators::line_spacing_mm(local_lines, mm_per_px),
            line_direction_deg: estimators::line_direction_deg(local_lines),
            stroke_inclination_deg: estimators::stroke_inclination_deg(local_lines),
            margin_left_mm: margins.map(|m| m.left_mm),
            margin_right_mm: margins.map(|m| m.right_mm),
            margin_top_mm: margins.map(|m| m.top_mm),
            pressure: estimators::pressure_level(&region_gray, mask, local_lines),
            stroke_quality: estimators::stroke_quality_level(local_lines),
            organization: estimators::organization_level(local_lines, counts),
        }
    }
}

/// Per-field precedence: an examiner-entered value always replaces the
/// automatic one; absent overrides leave the measurement untouched.
fn merged_measurements(auto: Measurements, overrides: &Measurements) -> Measurements {
    Measurements {
        spacing_mm: overrides.spacing_mm.or(auto.spacing_mm),
        stroke_height_mm: overrides.stroke_height_mm.or(auto.stroke_height_mm),
        line_spacing_mm: overrides.line_spacing_mm.or(auto.line_spacing_mm),
        line_direction_deg: overrides.line_direction_deg.or(auto.line_direction_deg),
        stroke_inclination_deg: overrides
            .stroke_inclination_deg
            .or(auto.stroke_inclination_deg),
        margin_left_mm: overrides.margin_left_mm.or(auto.margin_left_mm),
        margin_right_mm: overrides.margin_right_mm.or(auto.margin_right_mm),
        margin_top_mm: overrides.margin_top_mm.or(auto.margin_top_mm),
        pressure: overrides.pressure.or(auto.pressure),
        stroke_quality: overrides.stroke_quality.or(auto.stroke_quality),
        organization: overrides.organization.or(auto.organization),
    }
}
