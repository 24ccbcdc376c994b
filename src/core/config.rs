//! Configuration for the measurement pipeline and scoring engine.
//!
//! Every stage reads its thresholds from an explicit config struct that is
//! constructed once per run and passed down; nothing is module-level state.
//! The defaults are the domain-supplied constants the threshold tables in
//! [`crate::scoring`] were calibrated against.

use crate::core::roi::RoiFrac;
use serde::{Deserialize, Serialize};

/// Settings for page alignment, ROI cropping and binarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Canonical page width in pixels after rectification.
    pub target_width: u32,
    /// Canonical page height in pixels after rectification.
    pub target_height: u32,
    /// Assumed physical page width, used for the pixel-to-mm scale.
    pub page_width_mm: f64,
    /// Minimum fraction of image area a candidate page quad must cover.
    pub min_quad_area_frac: f64,
    /// Gaussian blur sigma before edge detection.
    pub blur_sigma: f32,
    /// Canny low threshold.
    pub canny_low: f32,
    /// Canny high threshold.
    pub canny_high: f32,
    /// Chebyshev radius of the morphological closing applied to the edge map.
    pub edge_close_radius: u8,
    /// Polygon-approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_frac: f64,
    /// How many of the largest contours to consider as page candidates.
    pub max_contour_candidates: usize,
    /// Region of interest used when the caller does not supply one.
    pub default_roi: RoiFrac,
    /// Bilateral denoise window size in pixels.
    pub bilateral_window: u32,
    /// Bilateral denoise color sigma.
    pub bilateral_sigma_color: f32,
    /// Bilateral denoise spatial sigma.
    pub bilateral_sigma_spatial: f32,
    /// Half-size of the local-mean window for adaptive thresholding.
    pub adaptive_block_radius: u32,
    /// Constant subtracted from the local mean before thresholding.
    pub adaptive_c: i32,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            // A4 portrait at ~150 dpi.
            target_width: 1240,
            target_height: 1754,
            page_width_mm: 210.0,
            min_quad_area_frac: 0.25,
            blur_sigma: 2.0,
            canny_low: 50.0,
            canny_high: 150.0,
            edge_close_radius: 2,
            approx_epsilon_frac: 0.02,
            max_contour_candidates: 20,
            default_roi: RoiFrac::new(0.03, 0.14, 0.98, 0.72),
            bilateral_window: 7,
            bilateral_sigma_color: 35.0,
            bilateral_sigma_spatial: 35.0,
            adaptive_block_radius: 15,
            adaptive_c: 10,
        }
    }
}

impl AlignerConfig {
    /// Millimeters per pixel on the aligned page.
    pub fn mm_per_px(&self) -> f64 {
        self.page_width_mm / f64::from(self.target_width)
    }
}

/// Settings for isolating vertical ink strokes in the binarized region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Height of the vertical opening kernel (keeps vertical structure).
    pub vertical_kernel_height: u32,
    /// Width of the horizontal opening kernel (finds form lines to remove).
    pub horizontal_kernel_width: u32,
    /// Height of the small vertical closing that reconnects broken strokes.
    pub reconnect_kernel_height: u32,
    /// Minimum component pixel area.
    pub min_area: u32,
    /// Maximum component pixel area.
    pub max_area: u32,
    /// Minimum component height in pixels.
    pub min_height: u32,
    /// Maximum component width in pixels.
    pub max_width: u32,
    /// Minimum height/width ratio; flatter components are discarded.
    pub min_aspect_ratio: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            vertical_kernel_height: 9,
            horizontal_kernel_width: 41,
            reconnect_kernel_height: 3,
            min_area: 12,
            max_area: 2500,
            min_height: 8,
            max_width: 25,
            min_aspect_ratio: 1.8,
        }
    }
}

/// Settings for clustering strokes into writing lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Fixed vertical tolerance in pixels for band membership.
    pub line_tolerance_y: f64,
    /// Factor applied to the median stroke height; the effective tolerance
    /// is the larger of this and `line_tolerance_y`.
    pub median_height_factor: f64,
    /// Bands with fewer strokes than this are discarded as noise.
    pub min_strokes_per_line: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            line_tolerance_y: 18.0,
            median_height_factor: 0.75,
            min_strokes_per_line: 3,
        }
    }
}

/// Settings for the composite score and block statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Test protocol time allotted per block, in seconds.
    pub time_per_block_seconds: f64,
    /// Number of consecutive lines summed into one block.
    pub block_size_lines: usize,
    /// Score penalty per counted error.
    pub error_penalty: f64,
    /// Weight of the per-line variability term in the composite score.
    pub variability_penalty_factor: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            time_per_block_seconds: 150.0,
            block_size_lines: 5,
            error_penalty: 10.0,
            variability_penalty_factor: 0.5,
        }
    }
}

/// Aggregate configuration for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Alignment, cropping and binarization settings.
    pub aligner: AlignerConfig,
    /// Stroke detection settings.
    pub detector: DetectorConfig,
    /// Line grouping settings.
    pub grouping: GroupingConfig,
    /// Scoring constants.
    pub score: ScoreConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mm_per_px_uses_page_width() {
        let cfg = AlignerConfig::default();
        let expected = 210.0 / 1240.0;
        assert!((cfg.mm_per_px() - expected).abs() < 1e-12);
    }

    #[test]
    fn defaults_round_trip_through_serde() {
        let cfg = PipelineConfig::default();
        let text = serde_json::to_string(&cfg).expect("serialize");
        let back: PipelineConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back.detector.min_area, cfg.detector.min_area);
        assert_eq!(back.score.block_size_lines, cfg.score.block_size_lines);
    }
}
