//! Region binarization: grayscale, contrast equalization, edge-preserving
//! denoise and an adaptive local-mean threshold.
//!
//! The output convention is inverted: ink is 255, paper is 0. Everything
//! downstream (morphology, component labeling) assumes that convention.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::bilateral_filter;

use crate::core::config::AlignerConfig;

/// Binarizes a cropped region image with ink mapped to 255.
pub fn binarize_region(region: &RgbImage, config: &AlignerConfig) -> GrayImage {
    let gray = DynamicImage::ImageRgb8(region.clone()).to_luma8();
    let equalized = equalize_histogram(&gray);
    let denoised = bilateral_filter(
        &equalized,
        config.bilateral_window,
        config.bilateral_sigma_color,
        config.bilateral_sigma_spatial,
    );
    adaptive_threshold_inv(&denoised, config.adaptive_block_radius, config.adaptive_c)
}

/// Fraction of ink pixels in an inverted binary image.
pub fn ink_ratio(binary: &GrayImage) -> f64 {
    let total = u64::from(binary.width()) * u64::from(binary.height());
    if total == 0 {
        return 0.0;
    }
    let ink = binary.pixels().filter(|p| p.0[0] > 0).count() as f64;
    ink / total as f64
}

/// Mean gray value of the source image under the ink mask, used by the
/// pressure estimator. Darkness is reported as `255 - mean`, so larger
/// means darker ink. `None` when the mask is empty.
pub fn mean_ink_darkness(gray: &GrayImage, mask: &GrayImage) -> Option<f64> {
    let mut sum = 0u64;
    let mut n = 0u64;
    for (g, m) in gray.pixels().zip(mask.pixels()) {
        if m.0[0] > 0 {
            sum += u64::from(g.0[0]);
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some(255.0 - sum as f64 / n as f64)
    }
}

/// Local-mean adaptive threshold with inverted output.
///
/// Each pixel is compared against the mean of its square neighborhood
/// (side `2*block_radius + 1`) minus `c`; darker pixels become 255.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_radius: u32, c: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral = integral_image(gray);
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let local_mean = window_mean(&integral, width, height, x, y, block_radius);
            let threshold = (local_mean as i32 - c).clamp(0, 255) as u8;
            let value = gray.get_pixel(x, y).0[0];
            let out = if value < threshold { 255u8 } else { 0u8 };
            output.put_pixel(x, y, Luma([out]));
        }
    }
    output
}

/// Summed-area table with a zero-padded border; dimensions
/// `(width+1) x (height+1)`, row-major.
fn integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += u64::from(gray.get_pixel(x, y).0[0]);
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[idx - stride];
        }
    }
    table
}

/// Mean pixel value of the radius-`r` square window centered on `(cx, cy)`,
/// clamped to image bounds.
fn window_mean(integral: &[u64], width: u32, height: u32, cx: u32, cy: u32, r: u32) -> f64 {
    let stride = (width + 1) as usize;
    let x1 = cx.saturating_sub(r) as usize;
    let y1 = cy.saturating_sub(r) as usize;
    let x2 = ((cx + r + 1) as usize).min(width as usize);
    let y2 = ((cy + r + 1) as usize).min(height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    let sum = integral[y2 * stride + x2] as f64 - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;
    sum / area
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_with_dark_bar() -> GrayImage {
        let mut img = GrayImage::from_pixel(40, 40, Luma([230u8]));
        for y in 5..30 {
            for x in 18..21 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        img
    }

    #[test]
    fn adaptive_threshold_marks_dark_bar_as_ink() {
        let binary = adaptive_threshold_inv(&white_with_dark_bar(), 10, 10);
        assert_eq!(binary.get_pixel(19, 15).0[0], 255);
        assert_eq!(binary.get_pixel(2, 2).0[0], 0);
        assert_eq!(binary.get_pixel(38, 38).0[0], 0);
    }

    #[test]
    fn ink_ratio_counts_nonzero_pixels() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([0u8]));
        for x in 0..5 {
            img.put_pixel(x, 0, Luma([255u8]));
        }
        assert!((ink_ratio(&img) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn ink_ratio_of_empty_image_is_zero() {
        let img = GrayImage::new(0, 0);
        assert_eq!(ink_ratio(&img), 0.0);
    }

    #[test]
    fn mean_ink_darkness_reads_only_masked_pixels() {
        let gray = white_with_dark_bar();
        let mut mask = GrayImage::from_pixel(40, 40, Luma([0u8]));
        for y in 5..30 {
            for x in 18..21 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        let darkness = mean_ink_darkness(&gray, &mask).expect("mask is non-empty");
        assert!((darkness - 235.0).abs() < 1e-9);
    }

    #[test]
    fn mean_ink_darkness_is_none_for_empty_mask() {
        let gray = GrayImage::from_pixel(8, 8, Luma([200u8]));
        let mask = GrayImage::from_pixel(8, 8, Luma([0u8]));
        assert!(mean_ink_darkness(&gray, &mask).is_none());
    }

    #[test]
    fn integral_window_mean_matches_direct_mean() {
        let img = white_with_dark_bar();
        let integral = integral_image(&img);
        let mut sum = 0u64;
        let mut n = 0u64;
        for y in 0..11u32 {
            for x in 0..11u32 {
                sum += u64::from(img.get_pixel(x, y).0[0]);
                n += 1;
            }
        }
        let direct = sum as f64 / n as f64;
        let fast = window_mean(&integral, 40, 40, 5, 5, 5);
        assert!((direct - fast).abs() < 1e-9);
    }
}
