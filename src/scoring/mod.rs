//! Rule-based classification and scoring.
//!
//! [`bands`] holds the fixed threshold tables, [`text`] the narrative
//! lookups, [`irregularities`] the irregularity vocabulary and
//! [`engine`] composes them into a full [`crate::domain::metrics::AssessmentResult`].

pub mod bands;
pub mod engine;
pub mod irregularities;
pub mod text;

pub use engine::{AssessmentContext, ManualAssessment, Measurements, ScoringEngine};
pub use irregularities::parse_irregularities_text;
