//! Core building blocks: error types, configuration and the ROI spec.

pub mod config;
pub mod errors;
pub mod roi;

pub use config::{AlignerConfig, DetectorConfig, GroupingConfig, PipelineConfig, ScoreConfig};
pub use errors::PalographError;
pub use roi::{RoiFrac, RoiRect};
