//! Region-of-interest specification for the rectified page.
//!
//! Callers describe the analyzed sub-rectangle as four fractions of the
//! aligned page (`x1,y1,x2,y2`, each in `[0, 1]`). The textual form is an
//! external interface: parsing is the exact inverse of formatting, and any
//! string that does not contain exactly four numbers is a format error.

use crate::core::errors::PalographError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fractional region of interest on the aligned page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiFrac {
    /// Left edge as a fraction of page width.
    pub x1: f64,
    /// Top edge as a fraction of page height.
    pub y1: f64,
    /// Right edge as a fraction of page width.
    pub x2: f64,
    /// Bottom edge as a fraction of page height.
    pub y2: f64,
}

impl RoiFrac {
    /// Creates an ROI from raw fractions. Values are kept as given;
    /// clamping and degenerate-range handling happen in [`Self::to_pixel_rect`].
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Parses the `x1,y1,x2,y2` textual form.
    ///
    /// Exactly four comma-separated floats are required; anything else is
    /// an [`PalographError::InvalidInput`].
    pub fn parse(text: &str) -> Result<Self, PalographError> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(PalographError::invalid_input(format!(
                "ROI spec needs 4 values x1,y1,x2,y2, got {}",
                parts.len()
            )));
        }
        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse::<f64>().map_err(|_| {
                PalographError::invalid_input(format!("ROI value '{part}' is not a number"))
            })?;
        }
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Converts the fractional ROI into a pixel rectangle on an aligned
    /// image of the given dimensions.
    ///
    /// Fractions are clamped to `[0, 1]`; an inverted or degenerate axis
    /// range resets that axis to the full `0..1` span. The resulting pixel
    /// rectangle is always at least 1x1 and inside the image.
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> RoiRect {
        let clamp = |v: f64| v.clamp(0.0, 1.0);
        let (mut x1f, mut x2f) = (clamp(self.x1), clamp(self.x2));
        let (mut y1f, mut y2f) = (clamp(self.y1), clamp(self.y2));
        if x2f <= x1f {
            (x1f, x2f) = (0.0, 1.0);
        }
        if y2f <= y1f {
            (y1f, y2f) = (0.0, 1.0);
        }

        let w = width as f64;
        let h = height as f64;
        let x1 = ((w * x1f).round() as u32).min(width.saturating_sub(1));
        let y1 = ((h * y1f).round() as u32).min(height.saturating_sub(1));
        let x2 = ((w * x2f).round() as u32).clamp(x1 + 1, width.max(x1 + 1));
        let y2 = ((h * y2f).round() as u32).clamp(y1 + 1, height.max(y1 + 1));
        RoiRect { x1, y1, x2, y2 }
    }
}

impl fmt::Display for RoiFrac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

impl FromStr for RoiFrac {
    type Err = PalographError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Pixel rectangle of the analyzed region, in aligned-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRect {
    /// Left edge in pixels (inclusive).
    pub x1: u32,
    /// Top edge in pixels (inclusive).
    pub y1: u32,
    /// Right edge in pixels (exclusive).
    pub x2: u32,
    /// Bottom edge in pixels (exclusive).
    pub y2: u32,
}

impl RoiRect {
    /// Width of the rectangle in pixels.
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Height of the rectangle in pixels.
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_inverse_of_format() {
        let roi = RoiFrac::new(0.03, 0.14, 0.98, 0.72);
        let text = roi.to_string();
        let parsed = RoiFrac::parse(&text).expect("round trip");
        assert_eq!(parsed, roi);
    }

    #[test]
    fn parse_rejects_wrong_arity() {
        assert!(RoiFrac::parse("0.1,0.2,0.3").is_err());
        assert!(RoiFrac::parse("0.1,0.2,0.3,0.4,0.5").is_err());
        assert!(RoiFrac::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_numeric_values() {
        assert!(RoiFrac::parse("0.1,zero,0.3,0.4").is_err());
    }

    #[test]
    fn pixel_rect_clamps_out_of_range_fractions() {
        let roi = RoiFrac::new(-0.5, 0.0, 1.5, 1.0);
        let rect = roi.to_pixel_rect(100, 200);
        assert_eq!(rect, RoiRect { x1: 0, y1: 0, x2: 100, y2: 200 });
    }

    #[test]
    fn inverted_axis_resets_to_full_span() {
        let roi = RoiFrac::new(0.8, 0.2, 0.2, 0.7);
        let rect = roi.to_pixel_rect(100, 100);
        assert_eq!(rect.x1, 0);
        assert_eq!(rect.x2, 100);
        // y axis was valid and must survive untouched
        assert_eq!(rect.y1, 20);
        assert_eq!(rect.y2, 70);
    }

    #[test]
    fn pixel_rect_is_never_empty() {
        let roi = RoiFrac::new(0.999, 0.999, 1.0, 1.0);
        let rect = roi.to_pixel_rect(50, 50);
        assert!(rect.width() >= 1);
        assert!(rect.height() >= 1);
    }
}
