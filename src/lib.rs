//! Automatic scorer for handwritten stroke-pattern test sheets.
//!
//! A scanned or photographed test sheet goes through a fixed pipeline:
//! page rectification, region-of-interest cropping, binarization,
//! vertical-stroke detection, line grouping, physical measurement and
//! finally rule-based classification into the standard scoring
//! dimensions. An optional trained-model layer can record or replace
//! individual verdicts.
//!
//! The entry point for whole images is [`analysis::Analyzer`]; for
//! examiner-counted sheets without an image, use
//! [`scoring::ScoringEngine::assess_manual`].
//!
//! ```no_run
//! use palograph::analysis::{Analyzer, ProcessOptions};
//! use palograph::core::config::PipelineConfig;
//!
//! # fn main() -> Result<(), palograph::core::errors::PalographError> {
//! let analyzer = Analyzer::new(PipelineConfig::default());
//! let analysis = analyzer.process_path("sheet.png", &ProcessOptions::default())?;
//! println!(
//!     "{} strokes on {} lines",
//!     analysis.result.raw.total,
//!     analysis.line_counts.len()
//! );
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod core;
pub mod domain;
pub mod ml;
pub mod processors;
pub mod scoring;

pub use crate::analysis::{Analyzer, PageAnalysis, ProcessOptions};
pub use crate::core::config::PipelineConfig;
pub use crate::core::errors::PalographError;
pub use crate::core::roi::{RoiFrac, RoiRect};
pub use crate::domain::metrics::AssessmentResult;
pub use crate::scoring::{ManualAssessment, ScoringEngine};
