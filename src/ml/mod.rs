//! Optional trained-model layer: feature extraction, serialized forests,
//! the versioned artifact format and prediction fusion.
//!
//! Nothing here is required for a rule-only assessment; the pipeline
//! produces complete results without an artifact on disk.

pub mod artifact;
pub mod features;
pub mod forest;
pub mod fusion;

pub use artifact::{ModelArtifact, TargetSpec, TrainingReport};
pub use features::{FEATURE_NAMES, extract_feature_vector};
pub use forest::Forest;
pub use fusion::{FusionMode, fuse};
