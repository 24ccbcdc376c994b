//! Physical-unit measurements and qualitative signals derived from the
//! grouped lines.
//!
//! Every estimator returns an explicit `Option` (or an enum with an
//! uninformed variant) when the data is insufficient; the scoring engine
//! turns that absence into its "not computed" sentinel. None of them
//! substitutes a numeric default.

use image::GrayImage;

use crate::analysis::stats::{coefficient_of_variation, mean, pstdev, regression_slope};
use crate::domain::levels::{OrderPattern, OrganizationLevel, PressureLevel, StrokeQualityLevel};
use crate::domain::metrics::AutoQuality;
use crate::domain::stroke::Line;
use crate::processors::binarize::mean_ink_darkness;

/// Page margins around the written area, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left_mm: f64,
    pub right_mm: f64,
    pub top_mm: f64,
}

impl Margins {
    /// Exchanges left and right, for mirrored captures. Top is untouched.
    pub fn swap_lr(self) -> Self {
        Self {
            left_mm: self.right_mm,
            right_mm: self.left_mm,
            top_mm: self.top_mm,
        }
    }
}

/// Mean horizontal gap between consecutive stroke boxes, in mm.
///
/// Gaps outside `(0, 200)` pixels are treated as artifacts and skipped.
pub fn spacing_mm(lines: &[Line], mm_per_px: f64) -> Option<f64> {
    let mut gaps = Vec::new();
    for line in lines {
        for pair in line.strokes.windows(2) {
            let gap_px = f64::from(pair[1].x) - f64::from(pair[0].right());
            if gap_px > 0.0 && gap_px < 200.0 {
                gaps.push(gap_px * mm_per_px);
            }
        }
    }
    mean(&gaps)
}

/// Mean stroke height across all lines, in mm.
pub fn stroke_height_mm(lines: &[Line], mm_per_px: f64) -> Option<f64> {
    let heights: Vec<f64> = lines
        .iter()
        .flat_map(|l| l.strokes.iter())
        .map(|s| f64::from(s.height) * mm_per_px)
        .collect();
    mean(&heights)
}

/// Mean clear gap between consecutive line baselines, in mm.
///
/// The gap is baseline-to-baseline distance minus the average stroke
/// height of the two lines; values outside `(-50, 300)` pixels are
/// skipped.
pub fn line_spacing_mm(lines: &[Line], mm_per_px: f64) -> Option<f64> {
    if lines.len() < 2 {
        return None;
    }
    let baselines: Vec<f64> = lines.iter().map(Line::baseline_y).collect();
    let heights: Vec<f64> = lines.iter().map(Line::mean_height).collect();

    let mut gaps = Vec::new();
    for i in 1..baselines.len() {
        let raw_gap = baselines[i] - baselines[i - 1];
        let ref_height = (heights[i] + heights[i - 1]) / 2.0;
        let clear_gap = raw_gap - ref_height;
        if clear_gap > -50.0 && clear_gap < 300.0 {
            gaps.push(clear_gap * mm_per_px);
        }
    }
    mean(&gaps)
}

/// Mean baseline slope across qualifying lines, in degrees.
///
/// A line qualifies with at least 8 strokes and non-degenerate horizontal
/// spread; the slope comes from a least-squares fit of stroke bottoms
/// over stroke centers.
pub fn line_direction_deg(lines: &[Line]) -> Option<f64> {
    let mut angles = Vec::new();
    for line in lines {
        if line.len() < 8 {
            continue;
        }
        let xs: Vec<f64> = line.strokes.iter().map(|s| s.center_x).collect();
        let ys: Vec<f64> = line.strokes.iter().map(|s| f64::from(s.bottom())).collect();
        if pstdev(&xs) < 1e-3 {
            continue;
        }
        if let Some(slope) = regression_slope(&xs, &ys) {
            angles.push(slope.atan().to_degrees());
        }
    }
    mean(&angles)
}

/// Mean stroke orientation across all lines, in degrees.
pub fn stroke_inclination_deg(lines: &[Line]) -> Option<f64> {
    let angles: Vec<f64> = lines
        .iter()
        .flat_map(|l| l.strokes.iter())
        .map(|s| s.angle_deg)
        .collect();
    mean(&angles)
}

/// Left/right/top margins from lines in aligned-page coordinates.
pub fn margins_mm(global_lines: &[Line], page_width: u32, mm_per_px: f64) -> Option<Margins> {
    let strokes: Vec<_> = global_lines.iter().flat_map(|l| l.strokes.iter()).collect();
    if strokes.is_empty() {
        return None;
    }
    let min_left = strokes.iter().map(|s| s.x).min()?;
    let max_right = strokes.iter().map(|s| s.right()).max()?;
    let min_top = strokes.iter().map(|s| s.y).min()?;

    Some(Margins {
        left_mm: f64::from(min_left) * mm_per_px,
        right_mm: f64::from(page_width.saturating_sub(max_right)) * mm_per_px,
        top_mm: f64::from(min_top) * mm_per_px,
    })
}

/// Writing pressure from mean ink darkness and mean stroke width.
pub fn pressure_level(
    region_gray: &GrayImage,
    mask: &GrayImage,
    lines: &[Line],
) -> Option<PressureLevel> {
    let darkness = mean_ink_darkness(region_gray, mask)?;
    let widths: Vec<f64> = lines
        .iter()
        .flat_map(|l| l.strokes.iter())
        .map(|s| f64::from(s.width))
        .collect();
    let mean_width = mean(&widths).unwrap_or(0.0);

    if darkness > 150.0 || mean_width >= 3.2 {
        Some(PressureLevel::Forte)
    } else if darkness < 85.0 && mean_width <= 2.0 {
        Some(PressureLevel::Leve)
    } else {
        Some(PressureLevel::Media)
    }
}

/// Trace quality from mean fill ratio and mean deviation from vertical.
pub fn stroke_quality_level(lines: &[Line]) -> Option<StrokeQualityLevel> {
    let strokes: Vec<_> = lines.iter().flat_map(|l| l.strokes.iter()).collect();
    if strokes.is_empty() {
        return None;
    }
    let fills: Vec<f64> = strokes.iter().map(|s| s.fill_ratio()).collect();
    let deviations: Vec<f64> = strokes.iter().map(|s| (s.angle_deg - 90.0).abs()).collect();
    let mean_fill = mean(&fills).unwrap_or(0.0);
    let mean_dev = mean(&deviations).unwrap_or(0.0);

    if mean_fill < 0.33 {
        Some(StrokeQualityLevel::Descontinua)
    } else if mean_dev > 8.0 {
        Some(StrokeQualityLevel::Curva)
    } else {
        Some(StrokeQualityLevel::Reta)
    }
}

/// Organization from the variability of line counts (weight 0.6) and of
/// consecutive line-center gaps (weight 0.4).
pub fn organization_level(lines: &[Line], line_counts: &[u32]) -> Option<OrganizationLevel> {
    if lines.is_empty() {
        return None;
    }
    let counts: Vec<f64> = line_counts.iter().map(|&c| f64::from(c)).collect();
    let counts_cv = coefficient_of_variation(&counts);

    let centers: Vec<f64> = lines.iter().map(|l| l.center_y).collect();
    let gaps: Vec<f64> = centers.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let gaps_cv = coefficient_of_variation(&gaps);

    let score = counts_cv * 0.6 + gaps_cv * 0.4;
    Some(if score <= 0.06 {
        OrganizationLevel::MuitoBoa
    } else if score <= 0.12 {
        OrganizationLevel::Boa
    } else if score <= 0.20 {
        OrganizationLevel::Regular
    } else if score <= 0.30 {
        OrganizationLevel::Ruim
    } else {
        OrganizationLevel::MuitoRuim
    })
}

/// Ordered/disordered cadence from the dispersion of intra-line gaps.
///
/// Only lines with at least 3 strokes contribute; with no qualifying
/// line the pattern stays uninformed.
pub fn order_pattern(lines: &[Line]) -> OrderPattern {
    let mut dispersions = Vec::new();
    for line in lines {
        if line.len() < 3 {
            continue;
        }
        let xs: Vec<f64> = line.strokes.iter().map(|s| f64::from(s.x)).collect();
        let gaps: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        match mean(&gaps) {
            Some(avg) if avg > 0.0 => dispersions.push(pstdev(&gaps) / avg),
            _ => {}
        }
    }
    match mean(&dispersions) {
        Some(d) if d <= 0.45 => OrderPattern::Ordenados,
        Some(_) => OrderPattern::Desordenados,
        None => OrderPattern::NaoInformado,
    }
}

/// Confidence that the automatic measurement can be trusted.
///
/// Starts at 1.0 and applies a fixed penalty per detected problem; a
/// score under 0.7 flags the sheet for manual review.
pub fn auto_quality(ink_ratio: f64, lines: &[Line], line_counts: &[u32]) -> AutoQuality {
    let mut score = 1.0f64;
    let mut flags = Vec::new();

    if ink_ratio < 0.005 {
        score -= 0.35;
        flags.push("tracos_muito_fracos".to_string());
    } else if ink_ratio > 0.18 {
        score -= 0.25;
        flags.push("ruido_ou_sombra_alta".to_string());
    }

    if lines.len() < 3 {
        score -= 0.25;
        flags.push("poucas_linhas_detectadas".to_string());
    }

    let counts: Vec<f64> = line_counts.iter().map(|&c| f64::from(c)).collect();
    if coefficient_of_variation(&counts) > 0.55 {
        score -= 0.15;
        flags.push("alta_variacao_contagem_linhas".to_string());
    }

    if lines.iter().any(|l| l.len() < 8) {
        score -= 0.1;
        flags.push("linhas_curtas_detectadas".to_string());
    }

    let score = score.clamp(0.0, 1.0);
    AutoQuality {
        score,
        requires_manual_review: score < 0.7,
        flags,
        ink_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stroke::Stroke;

    fn line_from(strokes: Vec<Stroke>) -> Line {
        let center_y = strokes.iter().map(|s| s.center_y).sum::<f64>() / strokes.len() as f64;
        Line { strokes, center_y, tolerance: 18.0 }
    }

    fn even_row(y: u32, start_x: u32, step: u32, n: u32, height: u32) -> Line {
        line_from(
            (0..n)
                .map(|i| Stroke::new(start_x + i * step, y, 2, height, height * 2, 90.0))
                .collect(),
        )
    }

    #[test]
    fn spacing_uses_box_gaps_not_centers() {
        // Boxes 2 wide every 10px: gap is 8px between right and next left.
        let lines = vec![even_row(10, 5, 10, 5, 12)];
        let got = spacing_mm(&lines, 0.5).expect("gaps exist");
        assert!((got - 4.0).abs() < 1e-9);
    }

    #[test]
    fn spacing_is_none_without_neighbors() {
        let lines = vec![line_from(vec![Stroke::new(5, 10, 2, 12, 20, 90.0)])];
        assert!(spacing_mm(&lines, 0.5).is_none());
    }

    #[test]
    fn line_spacing_subtracts_stroke_heights() {
        // Two rows of height 10, tops at y=10 and y=40: baselines 20 and
        // 50, clear gap = 30 - 10 = 20px.
        let lines = vec![even_row(10, 5, 10, 4, 10), even_row(40, 5, 10, 4, 10)];
        let got = line_spacing_mm(&lines, 1.0).expect("two lines");
        assert!((got - 20.0).abs() < 1e-9);
        assert!(line_spacing_mm(&lines[..1], 1.0).is_none());
    }

    #[test]
    fn line_direction_requires_eight_strokes() {
        let short = vec![even_row(10, 5, 10, 7, 10)];
        assert!(line_direction_deg(&short).is_none());

        // A perfectly level 8-stroke row has slope 0.
        let level = vec![even_row(10, 5, 10, 8, 10)];
        let angle = line_direction_deg(&level).expect("qualifying line");
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn line_direction_reads_baseline_slope() {
        // Tops rising by 1px per stroke over 10px steps: slope 0.1.
        let strokes: Vec<Stroke> = (0..8)
            .map(|i| Stroke::new(5 + i * 10, 10 + i, 2, 10, 20, 90.0))
            .collect();
        let lines = vec![line_from(strokes)];
        let angle = line_direction_deg(&lines).expect("qualifying line");
        assert!((angle - 0.1f64.atan().to_degrees()).abs() < 1e-6);
    }

    #[test]
    fn margins_come_from_extreme_boxes() {
        let lines = vec![even_row(30, 20, 10, 4, 10)];
        let m = margins_mm(&lines, 100, 1.0).expect("strokes exist");
        assert_eq!(m.left_mm, 20.0);
        assert_eq!(m.right_mm, 48.0); // last box ends at 52
        assert_eq!(m.top_mm, 30.0);

        let swapped = m.swap_lr();
        assert_eq!(swapped.left_mm, 48.0);
        assert_eq!(swapped.right_mm, 20.0);
        assert_eq!(swapped.top_mm, 30.0);
    }

    #[test]
    fn margins_absent_without_strokes() {
        assert!(margins_mm(&[], 100, 1.0).is_none());
    }

    #[test]
    fn even_rows_read_as_ordered() {
        let lines = vec![even_row(10, 5, 10, 6, 10)];
        assert_eq!(order_pattern(&lines), OrderPattern::Ordenados);
    }

    #[test]
    fn ragged_rows_read_as_disordered() {
        let xs = [5u32, 7, 30, 33, 70, 74];
        let strokes: Vec<Stroke> =
            xs.iter().map(|&x| Stroke::new(x, 10, 2, 10, 20, 90.0)).collect();
        let lines = vec![line_from(strokes)];
        assert_eq!(order_pattern(&lines), OrderPattern::Desordenados);
    }

    #[test]
    fn order_pattern_uninformed_for_tiny_lines() {
        let lines = vec![line_from(vec![
            Stroke::new(5, 10, 2, 10, 20, 90.0),
            Stroke::new(15, 10, 2, 10, 20, 90.0),
        ])];
        assert_eq!(order_pattern(&lines), OrderPattern::NaoInformado);
    }

    #[test]
    fn organization_rewards_even_layout() {
        let lines: Vec<Line> = (0..5).map(|i| even_row(10 + i * 30, 5, 10, 6, 10)).collect();
        let counts = vec![6u32; 5];
        assert_eq!(
            organization_level(&lines, &counts),
            Some(OrganizationLevel::MuitoBoa)
        );
    }

    #[test]
    fn auto_quality_penalizes_weak_ink_and_few_lines() {
        let lines = vec![even_row(10, 5, 10, 9, 10)];
        let counts = vec![9u32];
        let q = auto_quality(0.001, &lines, &counts);
        // 1.0 - 0.35 (weak ink) - 0.25 (under 3 lines) = 0.40
        assert!((q.score - 0.40).abs() < 1e-9);
        assert!(q.requires_manual_review);
        assert_eq!(
            q.flags,
            vec!["tracos_muito_fracos", "poucas_linhas_detectadas"]
        );
    }

    #[test]
    fn auto_quality_of_a_clean_sheet_is_full() {
        let lines: Vec<Line> = (0..5).map(|i| even_row(10 + i * 30, 5, 10, 9, 10)).collect();
        let counts = vec![9u32; 5];
        let q = auto_quality(0.02, &lines, &counts);
        assert_eq!(q.score, 1.0);
        assert!(!q.requires_manual_review);
        assert!(q.flags.is_empty());
    }
}
