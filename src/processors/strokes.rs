//! Vertical-stroke isolation and measurement.
//!
//! Works on the inverted binary region (ink = 255). Thin vertical
//! structure is kept with a vertical opening, residual form rules are
//! removed by subtracting a wide horizontal opening, and a small vertical
//! closing reconnects strokes broken by the threshold. Surviving
//! connected components are filtered geometrically and measured.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::core::config::DetectorConfig;
use crate::domain::stroke::Stroke;

/// Cleaned ink mask plus the strokes measured from it.
#[derive(Debug, Clone)]
pub struct DetectedStrokes {
    /// Strokes sorted by (center-y, center-x).
    pub strokes: Vec<Stroke>,
    /// The cleaned stroke mask, aligned with the input region.
    pub mask: GrayImage,
}

/// Isolates and measures vertical ink strokes.
#[derive(Debug, Clone)]
pub struct StrokeDetector {
    config: DetectorConfig,
}

impl StrokeDetector {
    /// Creates a detector with the given settings.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// The settings this detector runs with.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs the full detection pass over an inverted binary region.
    pub fn detect(&self, binary: &GrayImage) -> DetectedStrokes {
        let mask = self.clean_mask(binary);
        let strokes = self.measure_components(&mask);
        tracing::debug!(strokes = strokes.len(), "stroke detection complete");
        DetectedStrokes { strokes, mask }
    }

    /// Keeps vertical structure and removes horizontal form rules.
    pub fn clean_mask(&self, binary: &GrayImage) -> GrayImage {
        let vertical = open_vertical(binary, self.config.vertical_kernel_height);
        let horizontal = open_horizontal(&vertical, self.config.horizontal_kernel_width);
        let cleaned = subtract(&vertical, &horizontal);
        close_vertical(&cleaned, self.config.reconnect_kernel_height)
    }

    /// Labels the mask (8-connectivity), filters components geometrically
    /// and measures the survivors.
    fn measure_components(&self, mask: &GrayImage) -> Vec<Stroke> {
        let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
        let label_count = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
        if label_count == 0 {
            return Vec::new();
        }

        let mut stats = vec![ComponentStats::default(); label_count + 1];
        for (x, y, p) in labels.enumerate_pixels() {
            let label = p.0[0] as usize;
            if label > 0 {
                stats[label].add_pixel(x, y);
            }
        }

        let cfg = &self.config;
        let mut strokes: Vec<Stroke> = stats
            .iter()
            .skip(1)
            .filter_map(|s| s.to_stroke())
            .filter(|s| {
                s.area >= cfg.min_area
                    && s.area <= cfg.max_area
                    && s.height >= cfg.min_height
                    && s.width <= cfg.max_width
                    && s.aspect_ratio() >= cfg.min_aspect_ratio
            })
            .collect();
        strokes.sort_by(|a, b| {
            a.center_y
                .total_cmp(&b.center_y)
                .then(a.center_x.total_cmp(&b.center_x))
        });
        strokes
    }
}

/// Per-label accumulator: bounding box plus raw image moments.
#[derive(Debug, Clone, Copy, Default)]
struct ComponentStats {
    area: u32,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    m10: f64,
    m01: f64,
    m20: f64,
    m02: f64,
    m11: f64,
}

impl ComponentStats {
    fn add_pixel(&mut self, x: u32, y: u32) {
        if self.area == 0 {
            self.min_x = x;
            self.max_x = x;
            self.min_y = y;
            self.max_y = y;
        } else {
            self.min_x = self.min_x.min(x);
            self.max_x = self.max_x.max(x);
            self.min_y = self.min_y.min(y);
            self.max_y = self.max_y.max(y);
        }
        self.area += 1;
        let (xf, yf) = (f64::from(x), f64::from(y));
        self.m10 += xf;
        self.m01 += yf;
        self.m20 += xf * xf;
        self.m02 += yf * yf;
        self.m11 += xf * yf;
    }

    fn to_stroke(&self) -> Option<Stroke> {
        if self.area == 0 {
            return None;
        }
        Some(Stroke::new(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x + 1,
            self.max_y - self.min_y + 1,
            self.area,
            self.orientation_deg(),
        ))
    }

    /// Orientation from the central second moments, normalized to
    /// `[0, 180)` with 90 meaning vertical; degenerate moments default
    /// to exactly vertical.
    fn orientation_deg(&self) -> f64 {
        let m00 = f64::from(self.area);
        let cx = self.m10 / m00;
        let cy = self.m01 / m00;
        let mu20 = self.m20 - cx * self.m10;
        let mu02 = self.m02 - cy * self.m01;
        let mu11 = self.m11 - cx * self.m01;

        let num = 2.0 * mu11;
        let den = mu20 - mu02;
        if num.abs() <= 1e-9 && den.abs() <= 1e-9 {
            return 90.0;
        }
        let mut angle = (0.5 * num.atan2(den)).to_degrees();
        if angle < 0.0 {
            angle += 180.0;
        }
        angle
    }
}

/// Morphological opening with a 1-wide, `k`-tall kernel.
fn open_vertical(img: &GrayImage, k: u32) -> GrayImage {
    max_filter_vertical(&min_filter_vertical(img, k), k)
}

/// Morphological opening with a `k`-wide, 1-tall kernel.
fn open_horizontal(img: &GrayImage, k: u32) -> GrayImage {
    max_filter_horizontal(&min_filter_horizontal(img, k), k)
}

/// Morphological closing with a 1-wide, `k`-tall kernel.
fn close_vertical(img: &GrayImage, k: u32) -> GrayImage {
    min_filter_vertical(&max_filter_vertical(img, k), k)
}

/// Pixelwise saturating subtraction.
fn subtract(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut out = a.clone();
    for (o, bp) in out.pixels_mut().zip(b.pixels()) {
        o.0[0] = o.0[0].saturating_sub(bp.0[0]);
    }
    out
}

// Run-based 1xN / Nx1 min and max filters. The window is centered on the
// pixel and clipped at the image border (out-of-bounds samples are
// ignored, so erosion never eats into the border by itself).

fn min_filter_vertical(img: &GrayImage, k: u32) -> GrayImage {
    filter_1d(img, k, true, u8::min, 255)
}

fn max_filter_vertical(img: &GrayImage, k: u32) -> GrayImage {
    filter_1d(img, k, true, u8::max, 0)
}

fn min_filter_horizontal(img: &GrayImage, k: u32) -> GrayImage {
    filter_1d(img, k, false, u8::min, 255)
}

fn max_filter_horizontal(img: &GrayImage, k: u32) -> GrayImage {
    filter_1d(img, k, false, u8::max, 0)
}

fn filter_1d(
    img: &GrayImage,
    k: u32,
    vertical: bool,
    fold: fn(u8, u8) -> u8,
    identity: u8,
) -> GrayImage {
    if k <= 1 {
        return img.clone();
    }
    let (width, height) = img.dimensions();
    let mut out = GrayImage::new(width, height);
    let before = (k - 1) / 2;
    let after = k / 2;

    for y in 0..height {
        for x in 0..width {
            let (center, limit) = if vertical { (y, height) } else { (x, width) };
            let lo = center.saturating_sub(before);
            let hi = (center + after).min(limit - 1);
            let mut acc = identity;
            for c in lo..=hi {
                let v = if vertical {
                    img.get_pixel(x, c).0[0]
                } else {
                    img.get_pixel(c, y).0[0]
                };
                acc = fold(acc, v);
            }
            out.put_pixel(x, y, Luma([acc]));
        }
    }
    out
}
