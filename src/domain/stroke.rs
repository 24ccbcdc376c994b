//! Stroke and line primitives produced by detection and grouping.

use serde::{Deserialize, Serialize};

/// One detected vertical ink mark on the sheet.
///
/// A stroke is created once per connected component that survives the
/// geometric filters and is immutable afterwards. Coordinates are in the
/// coordinate system of the image the stroke was detected in (the ROI);
/// [`Stroke::translate`] moves it into whole-page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Left edge of the bounding box.
    pub x: u32,
    /// Top edge of the bounding box.
    pub y: u32,
    /// Bounding-box width.
    pub width: u32,
    /// Bounding-box height.
    pub height: u32,
    /// Pixel count of the connected component.
    pub area: u32,
    /// Bounding-box centroid, x.
    pub center_x: f64,
    /// Bounding-box centroid, y.
    pub center_y: f64,
    /// Orientation in degrees within `[0, 180)`, from second-order image
    /// moments; 90 means perfectly vertical.
    pub angle_deg: f64,
}

impl Stroke {
    /// Builds a stroke from its bounding box, area and orientation.
    pub fn new(x: u32, y: u32, width: u32, height: u32, area: u32, angle_deg: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            area,
            center_x: f64::from(x) + f64::from(width) / 2.0,
            center_y: f64::from(y) + f64::from(height) / 2.0,
            angle_deg,
        }
    }

    /// Right edge of the bounding box (exclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge of the bounding box (exclusive).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Height/width ratio; zero-width strokes report 0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            f64::from(self.height) / f64::from(self.width)
        }
    }

    /// Fraction of the bounding box covered by ink.
    pub fn fill_ratio(&self) -> f64 {
        let box_area = f64::from(self.width) * f64::from(self.height);
        f64::from(self.area) / box_area.max(1.0)
    }

    /// Returns a copy shifted by `(dx, dy)` pixels.
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            center_x: self.center_x + f64::from(dx),
            center_y: self.center_y + f64::from(dy),
            ..*self
        }
    }
}

/// A horizontal cluster of strokes written together.
///
/// Lines own their strokes after grouping; members are ordered
/// left-to-right and a line always has at least the configured minimum
/// number of members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Member strokes, sorted by left edge.
    pub strokes: Vec<Stroke>,
    /// Mean vertical center of the member strokes.
    pub center_y: f64,
    /// Membership tolerance (pixels) the band was formed with.
    pub tolerance: f64,
}

impl Line {
    /// Number of strokes in the line.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// True when the line holds no strokes (cannot happen after grouping).
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Mean bottom edge of the member strokes (the writing baseline).
    pub fn baseline_y(&self) -> f64 {
        mean(self.strokes.iter().map(|s| f64::from(s.bottom())))
    }

    /// Mean stroke height within the line.
    pub fn mean_height(&self) -> f64 {
        mean(self.strokes.iter().map(|s| f64::from(s.height)))
    }

    /// Returns a copy with every stroke shifted by `(dx, dy)` pixels.
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self {
            strokes: self.strokes.iter().map(|s| s.translate(dx, dy)).collect(),
            center_y: self.center_y + f64::from(dy),
            tolerance: self.tolerance,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 { 0.0 } else { sum / n as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_box_center() {
        let s = Stroke::new(10, 20, 4, 10, 30, 90.0);
        assert_eq!(s.center_x, 12.0);
        assert_eq!(s.center_y, 25.0);
        assert_eq!(s.right(), 14);
        assert_eq!(s.bottom(), 30);
    }

    #[test]
    fn translate_shifts_box_and_centroid() {
        let s = Stroke::new(5, 5, 2, 8, 12, 88.0).translate(100, 50);
        assert_eq!(s.x, 105);
        assert_eq!(s.y, 55);
        assert_eq!(s.center_x, 106.0);
        assert_eq!(s.center_y, 59.0);
        assert_eq!(s.angle_deg, 88.0);
    }

    #[test]
    fn baseline_and_height_are_means() {
        let line = Line {
            strokes: vec![
                Stroke::new(0, 10, 2, 10, 15, 90.0),
                Stroke::new(5, 12, 2, 8, 12, 90.0),
            ],
            center_y: 15.5,
            tolerance: 18.0,
        };
        assert!((line.baseline_y() - 20.0).abs() < 1e-9);
        assert!((line.mean_height() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_width_has_zero_aspect() {
        let s = Stroke::new(0, 0, 0, 10, 0, 90.0);
        assert_eq!(s.aspect_ratio(), 0.0);
    }
}
