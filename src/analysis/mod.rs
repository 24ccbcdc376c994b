//! Measurement and analysis: statistics, line grouping, physical
//! estimators, the end-to-end pipeline, report artifacts and batch
//! tooling.

pub mod batch;
pub mod estimators;
pub mod grouping;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use grouping::{LineGrouper, line_counts};
pub use pipeline::{Analyzer, PageAnalysis, ProcessOptions};
