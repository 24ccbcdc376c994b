//! Page rectification and region-of-interest cropping.
//!
//! The aligner looks for the sheet outline in a raw photograph, warps it
//! onto a canonical fixed-size page, and crops the configured fractional
//! region for downstream analysis. When no page outline is found the
//! image is plainly resized to the canonical dimensions instead; the run
//! continues without perspective correction.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::close;
use imageproc::distance_transform::Norm;
use imageproc::point::Point;
use std::path::Path;

use crate::core::config::AlignerConfig;
use crate::core::errors::PalographError;
use crate::core::roi::{RoiFrac, RoiRect};

/// Rectifies raw sheet photographs onto a canonical page.
#[derive(Debug, Clone)]
pub struct DocumentAligner {
    config: AlignerConfig,
}

impl DocumentAligner {
    /// Creates an aligner with the given settings.
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    /// The settings this aligner runs with.
    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Loads an image from disk and rectifies it.
    ///
    /// An unreadable file is fatal for the run.
    pub fn load_and_align(&self, path: impl AsRef<Path>) -> Result<RgbImage, PalographError> {
        let image = image::open(path.as_ref())?;
        Ok(self.align(&image))
    }

    /// Rectifies an already decoded image onto the canonical page.
    ///
    /// When a page quadrilateral is found it is warped to the target
    /// dimensions; otherwise the whole image is resized.
    pub fn align(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        match self.find_page_quad(&rgb) {
            Some(corners) => match self.warp_to_target(&rgb, corners) {
                Some(warped) => warped,
                None => {
                    tracing::warn!("degenerate page quad, falling back to plain resize");
                    self.resize_to_target(&rgb)
                }
            },
            None => {
                tracing::debug!("no page outline found, falling back to plain resize");
                self.resize_to_target(&rgb)
            }
        }
    }

    /// Crops the fractional ROI out of an aligned page.
    ///
    /// Returns the cropped region together with its pixel rectangle in
    /// aligned-page coordinates. A missing ROI uses the configured default.
    pub fn crop_roi(&self, aligned: &RgbImage, roi: Option<RoiFrac>) -> (RgbImage, RoiRect) {
        let frac = roi.unwrap_or(self.config.default_roi);
        let rect = frac.to_pixel_rect(aligned.width(), aligned.height());
        let region =
            imageops::crop_imm(aligned, rect.x1, rect.y1, rect.width(), rect.height()).to_image();
        tracing::debug!(
            x1 = rect.x1,
            y1 = rect.y1,
            width = rect.width(),
            height = rect.height(),
            "ROI cropped"
        );
        (region, rect)
    }

    /// Searches for the sheet outline: the largest 4-vertex contour
    /// covering at least the configured fraction of the image area.
    fn find_page_quad(&self, rgb: &RgbImage) -> Option<[(f32, f32); 4]> {
        let gray = DynamicImage::ImageRgb8(rgb.clone()).to_luma8();
        let blurred = gaussian_blur_f32(&gray, self.config.blur_sigma);
        let edges = canny(&blurred, self.config.canny_low, self.config.canny_high);
        let closed = close(&edges, Norm::LInf, self.config.edge_close_radius);

        let mut outers: Vec<Contour<i32>> = find_contours::<i32>(&closed)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.points.len() >= 4)
            .collect();
        if outers.is_empty() {
            return None;
        }

        let img_area = f64::from(rgb.width()) * f64::from(rgb.height());
        let min_area = img_area * self.config.min_quad_area_frac;

        outers.sort_by(|a, b| {
            shoelace_area(&b.points)
                .total_cmp(&shoelace_area(&a.points))
        });

        for contour in outers.iter().take(self.config.max_contour_candidates) {
            let area = shoelace_area(&contour.points);
            if area < min_area {
                // Sorted descending; everything after is smaller too.
                break;
            }
            let epsilon = self.config.approx_epsilon_frac * arc_length(&contour.points, true);
            let approx = approximate_polygon_dp(&contour.points, epsilon, true);
            if approx.len() == 4 {
                let quad = [
                    (approx[0].x as f32, approx[0].y as f32),
                    (approx[1].x as f32, approx[1].y as f32),
                    (approx[2].x as f32, approx[2].y as f32),
                    (approx[3].x as f32, approx[3].y as f32),
                ];
                tracing::debug!(area, "page quadrilateral found");
                return Some(order_corners(quad));
            }
        }
        None
    }

    /// Warps the ordered page corners onto the canonical page rectangle.
    fn warp_to_target(&self, rgb: &RgbImage, corners: [(f32, f32); 4]) -> Option<RgbImage> {
        let w = self.config.target_width as f32;
        let h = self.config.target_height as f32;
        let dest = [(0.0, 0.0), (w - 1.0, 0.0), (w - 1.0, h - 1.0), (0.0, h - 1.0)];
        let projection = Projection::from_control_points(corners, dest)?;

        let mut output = RgbImage::from_pixel(
            self.config.target_width,
            self.config.target_height,
            Rgb([255u8, 255, 255]),
        );
        warp_into(
            rgb,
            &projection,
            Interpolation::Bilinear,
            Rgb([255u8, 255, 255]),
            &mut output,
        );
        Some(output)
    }

    fn resize_to_target(&self, rgb: &RgbImage) -> RgbImage {
        imageops::resize(
            rgb,
            self.config.target_width,
            self.config.target_height,
            FilterType::Triangle,
        )
    }
}

/// Orders four corners as top-left, top-right, bottom-right, bottom-left.
///
/// Top-left has the smallest x+y sum, bottom-right the largest; top-right
/// has the smallest y-x difference, bottom-left the largest.
fn order_corners(points: [(f32, f32); 4]) -> [(f32, f32); 4] {
    let by_key = |key: fn((f32, f32)) -> f32, max: bool| -> (f32, f32) {
        let mut best = points[0];
        for &p in &points[1..] {
            let better = if max { key(p) > key(best) } else { key(p) < key(best) };
            if better {
                best = p;
            }
        }
        best
    };
    let sum = |(x, y): (f32, f32)| x + y;
    let diff = |(x, y): (f32, f32)| y - x;
    [
        by_key(sum, false),
        by_key(diff, false),
        by_key(sum, true),
        by_key(diff, true),
    ]
}

/// Absolute polygon area via the shoelace formula.
fn shoelace_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        twice_area += f64::from(a.x) * f64::from(b.y) - f64::from(b.x) * f64::from(a.y);
    }
    (twice_area / 2.0).abs()
}
