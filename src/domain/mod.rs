//! Domain types shared across the pipeline and the scoring engine.

pub mod levels;
pub mod metrics;
pub mod stroke;

pub use levels::{
    OrderPattern, OrganizationLevel, PressureLevel, ReasoningLevel, StrokeQualityLevel,
};
pub use metrics::{
    AssessmentResult, AutoQuality, Classification, Classifications, FusionSummary,
    IrregularityFinding, MlPrediction, RawMetrics, TraitInterpretation,
};
pub use stroke::{Line, Stroke};
