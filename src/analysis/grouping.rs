//! Greedy banding of strokes into writing lines.
//!
//! Strokes are walked in (center-y, center-x) order and attached to the
//! first existing band whose running mean center is within tolerance;
//! the band mean is recomputed after every insertion. First-matching-band
//! assignment is deliberate and must stay deterministic: identical input
//! always yields identical line membership.

use crate::analysis::stats::median;
use crate::core::config::GroupingConfig;
use crate::domain::stroke::{Line, Stroke};

/// Clusters detected strokes into horizontal writing lines.
#[derive(Debug, Clone)]
pub struct LineGrouper {
    config: GroupingConfig,
}

struct Band {
    center_y: f64,
    sum_y: f64,
    items: Vec<Stroke>,
}

impl LineGrouper {
    /// Creates a grouper with the given settings.
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// The settings this grouper runs with.
    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Effective vertical tolerance for the given strokes: the larger of
    /// the fixed pixel tolerance and the configured factor of the median
    /// stroke height.
    pub fn tolerance_for(&self, strokes: &[Stroke]) -> f64 {
        let heights: Vec<f64> = strokes.iter().map(|s| f64::from(s.height)).collect();
        let median_h = median(&heights).unwrap_or(0.0);
        self.config
            .line_tolerance_y
            .max(median_h * self.config.median_height_factor)
    }

    /// Groups strokes into lines. Bands with fewer than the minimum
    /// stroke count are dropped; surviving lines are sorted by vertical
    /// center with members ordered left-to-right.
    pub fn group(&self, strokes: &[Stroke]) -> Vec<Line> {
        if strokes.is_empty() {
            return Vec::new();
        }

        let tolerance = self.tolerance_for(strokes);
        let mut sorted: Vec<Stroke> = strokes.to_vec();
        sorted.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));

        let mut bands: Vec<Band> = Vec::new();
        for stroke in sorted {
            let slot = bands
                .iter_mut()
                .find(|band| (stroke.center_y - band.center_y).abs() <= tolerance);
            match slot {
                Some(band) => {
                    band.items.push(stroke);
                    band.sum_y += stroke.center_y;
                    band.center_y = band.sum_y / band.items.len() as f64;
                }
                None => bands.push(Band {
                    center_y: stroke.center_y,
                    sum_y: stroke.center_y,
                    items: vec![stroke],
                }),
            }
        }

        bands.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));

        let lines: Vec<Line> = bands
            .into_iter()
            .filter(|band| band.items.len() >= self.config.min_strokes_per_line)
            .map(|mut band| {
                band.items.sort_by(|a, b| a.x.cmp(&b.x));
                Line {
                    strokes: band.items,
                    center_y: band.center_y,
                    tolerance,
                }
            })
            .collect();
        tracing::debug!(lines = lines.len(), tolerance, "line grouping complete");
        lines
    }
}

/// Per-line stroke counts, the engine's main input.
pub fn line_counts(lines: &[Line]) -> Vec<u32> {
    lines.iter().map(|l| l.len() as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke_at(cx: u32, cy: u32) -> Stroke {
        // 2x10 box centered on (cx, cy).
        Stroke::new(cx - 1, cy - 5, 2, 10, 16, 90.0)
    }

    fn row(y: u32, xs: &[u32]) -> Vec<Stroke> {
        xs.iter().map(|&x| stroke_at(x, y)).collect()
    }

    fn grouper() -> LineGrouper {
        LineGrouper::new(GroupingConfig::default())
    }

    #[test]
    fn groups_two_well_separated_rows() {
        let mut strokes = row(40, &[10, 20, 30, 40]);
        strokes.extend(row(100, &[12, 25, 37]));
        let lines = grouper().group(&strokes);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(lines[1].len(), 3);
        assert!(lines[0].center_y < lines[1].center_y);
    }

    #[test]
    fn members_are_sorted_left_to_right() {
        let strokes = row(40, &[40, 10, 30, 20]);
        let lines = grouper().group(&strokes);
        assert_eq!(lines.len(), 1);
        let xs: Vec<u32> = lines[0].strokes.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![9, 19, 29, 39]);
    }

    #[test]
    fn bands_below_minimum_count_are_dropped() {
        let mut strokes = row(40, &[10, 20, 30]);
        strokes.extend(row(120, &[15, 35])); // only 2 strokes
        let lines = grouper().group(&strokes);
        assert_eq!(lines.len(), 1);
        assert!((lines[0].center_y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn tolerance_grows_with_tall_strokes() {
        let g = grouper();
        let short = row(40, &[10, 20, 30]);
        assert_eq!(g.tolerance_for(&short), 18.0);

        let tall: Vec<Stroke> = (0..3).map(|i| Stroke::new(10 * i, 0, 2, 40, 60, 90.0)).collect();
        assert_eq!(g.tolerance_for(&tall), 30.0);
    }

    #[test]
    fn grouping_is_deterministic() {
        // Row at 58 sits exactly on the tolerance boundary of the row at
        // 40, a worst case for stable assignment.
        let mut strokes = row(40, &[10, 20, 30, 40, 50]);
        strokes.extend(row(58, &[12, 22, 32]));
        strokes.extend(row(130, &[14, 24, 34]));

        let first = grouper().group(&strokes);
        for _ in 0..5 {
            let again = grouper().group(&strokes);
            assert_eq!(again, first);
        }
    }

    #[test]
    fn first_matching_band_wins() {
        // A stroke equidistant-ish between two bands must go to the band
        // opened first (the upper one), not the nearest one.
        let cfg = GroupingConfig {
            line_tolerance_y: 20.0,
            median_height_factor: 0.0,
            min_strokes_per_line: 1,
        };
        let g = LineGrouper::new(cfg);
        let strokes = vec![stroke_at(10, 40), stroke_at(20, 75), stroke_at(30, 58)];
        // Walk order by cy: 40, 58, 75. The 58 stroke joins the band at 40
        // (|58-40| <= 20), shifting its mean to 49; the 75 stroke then opens
        // its own band (|75-49| > 20).
        let lines = g.group(&strokes);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 1);
    }

    #[test]
    fn line_counts_reports_members_per_line() {
        let mut strokes = row(40, &[10, 20, 30, 40]);
        strokes.extend(row(100, &[12, 25, 37]));
        let lines = grouper().group(&strokes);
        assert_eq!(line_counts(&lines), vec![4, 3]);
    }
}
