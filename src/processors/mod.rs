//! Image-processing stages: page alignment, binarization and stroke
//! detection.

pub mod align;
pub mod binarize;
pub mod strokes;

pub use align::DocumentAligner;
pub use binarize::{binarize_region, ink_ratio};
pub use strokes::{DetectedStrokes, StrokeDetector};
