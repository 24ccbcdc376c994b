//! Fuses ensemble predictions into a rule-derived assessment.
//!
//! The rule verdicts are always computed first; fusion then either
//! records the predictions (`assist`), replaces verdicts the ensemble is
//! confident about (`hybrid`) or replaces them unconditionally
//! (`override`). The audit trail of fired rules is never rewritten, and
//! fusing the same result twice is a no-op.

use crate::domain::metrics::{AssessmentResult, FusionSummary};
use crate::ml::artifact::ModelArtifact;
use crate::ml::features::extract_feature_vector;

/// Rule id stamped on a verdict replaced by a confident hybrid fusion.
pub const RULE_ML_FUSED: &str = "ML_FUSED";
/// Rule id stamped on a verdict replaced unconditionally.
pub const RULE_ML_OVERRIDE: &str = "ML_OVERRIDE";

/// How aggressively predictions replace rule verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionMode {
    /// Record predictions only; verdicts stay rule-derived.
    #[default]
    Assist,
    /// Replace a verdict when the prediction clears the confidence
    /// threshold.
    Hybrid,
    /// Replace every predicted verdict regardless of confidence.
    Override,
}

impl FusionMode {
    /// Parses a mode name. Unrecognized names fall back to the safe
    /// [`FusionMode::Assist`] with a warning rather than failing the run.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "assist" => Self::Assist,
            "hybrid" => Self::Hybrid,
            "override" => Self::Override,
            other => {
                tracing::warn!(mode = other, "unknown fusion mode, falling back to assist");
                Self::Assist
            }
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Assist => "assist",
            Self::Hybrid => "hybrid",
            Self::Override => "override",
        }
    }
}

/// Runs one fusion pass and returns the fused document. The input is
/// left untouched; `result.fusion` on the output records what happened.
pub fn fuse(
    result: &AssessmentResult,
    artifact: &ModelArtifact,
    mode: FusionMode,
    confidence_threshold: f64,
) -> AssessmentResult {
    let mut fused = result.clone();
    let features = extract_feature_vector(&result.raw);
    let predictions = artifact.predict_all(&features);
    let mut applied = Vec::new();

    for (target, prediction) in &predictions {
        let Some(spec) = artifact.target_spec(target) else {
            continue;
        };
        let confident = prediction.confidence.is_some_and(|c| c >= confidence_threshold);
        let (apply, rule_id) = match mode {
            FusionMode::Assist => (false, RULE_ML_FUSED),
            FusionMode::Hybrid => (confident, RULE_ML_FUSED),
            FusionMode::Override => (true, RULE_ML_OVERRIDE),
        };
        if !apply {
            continue;
        }

        if spec.structured {
            if let Some(slot) = fused.classifications.by_key_mut(&spec.classification_key) {
                slot.level = prediction.label.clone();
                slot.range = "modelo".to_string();
                slot.rule_id = rule_id.to_string();
                slot.ml_confidence = prediction.confidence;
                applied.push(target.clone());
            }
        } else if spec.classification_key == "quality_pattern" {
            fused.classifications.quality_pattern = prediction.label.clone();
            applied.push(target.clone());
        }
    }

    tracing::debug!(
        mode = mode.name(),
        predicted = predictions.len(),
        applied = applied.len(),
        "fusion pass complete"
    );

    fused.fusion = Some(FusionSummary {
        mode: mode.name().to_string(),
        confidence_threshold,
        predictions,
        applied_targets: applied,
    });
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ScoreConfig;
    use crate::ml::artifact::{ModelArtifact, SCHEMA_VERSION, TargetModel, TargetSpec, TrainingReport};
    use crate::ml::features::FEATURE_NAMES;
    use crate::ml::forest::{DecisionTree, Forest, Node};
    use crate::scoring::engine::{AssessmentContext, ManualAssessment, Measurements, ScoringEngine};
    use std::collections::BTreeMap;

    fn base_result() -> AssessmentResult {
        let engine = ScoringEngine::new(ScoreConfig::default());
        let manual = ManualAssessment {
            total: 460,
            block_totals: vec![91, 90, 84, 91, 94],
            measurements: Measurements::default(),
            context: AssessmentContext::default(),
            nor: None,
        };
        engine.assess_manual(&manual)
    }

    /// One-tree forests have vote fraction 1.0; a three-tree 2:1 split
    /// gives 0.667 for sub-threshold cases.
    fn artifact_with(confidence_split: bool) -> ModelArtifact {
        let trees = if confidence_split {
            vec![
                DecisionTree { root: Node::Leaf { class: 0 } },
                DecisionTree { root: Node::Leaf { class: 0 } },
                DecisionTree { root: Node::Leaf { class: 1 } },
            ]
        } else {
            vec![DecisionTree { root: Node::Leaf { class: 0 } }]
        };
        ModelArtifact {
            schema_version: SCHEMA_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            targets: BTreeMap::from([
                (
                    "rhythm".to_string(),
                    TargetModel {
                        spec: TargetSpec {
                            classification_key: "rhythm".to_string(),
                            structured: true,
                        },
                        report: TrainingReport { trained: true, reason: None, samples: 30 },
                        forest: Some(Forest {
                            labels: vec!["Alto".to_string(), "Baixo".to_string()],
                            trees,
                        }),
                    },
                ),
                (
                    "quality_pattern".to_string(),
                    TargetModel {
                        spec: TargetSpec {
                            classification_key: "quality_pattern".to_string(),
                            structured: false,
                        },
                        report: TrainingReport { trained: true, reason: None, samples: 30 },
                        forest: Some(Forest {
                            labels: vec!["Rigido".to_string()],
                            trees: vec![DecisionTree { root: Node::Leaf { class: 0 } }],
                        }),
                    },
                ),
            ]),
        }
    }

    #[test]
    fn assist_records_predictions_without_altering_verdicts() {
        let result = base_result();
        let fused = fuse(&result, &artifact_with(false), FusionMode::Assist, 0.75);
        assert_eq!(fused.classifications.rhythm.level, result.classifications.rhythm.level);
        assert_eq!(fused.classifications.quality_pattern, result.classifications.quality_pattern);
        let summary = fused.fusion.expect("summary");
        assert_eq!(summary.mode, "assist");
        assert_eq!(summary.predictions.len(), 2);
        assert!(summary.applied_targets.is_empty());
    }

    #[test]
    fn hybrid_leaves_low_confidence_predictions_unapplied() {
        let result = base_result();
        // 2/3 vote fraction = 0.667, below the 0.75 threshold.
        let fused = fuse(&result, &artifact_with(true), FusionMode::Hybrid, 0.75);
        assert_eq!(fused.classifications.rhythm.level, result.classifications.rhythm.level);
        assert_ne!(fused.classifications.rhythm.rule_id, RULE_ML_FUSED);
        // The unanimous quality-pattern forest clears the threshold.
        assert_eq!(fused.classifications.quality_pattern, "Rigido");
    }

    #[test]
    fn hybrid_applies_confident_predictions() {
        let result = base_result();
        let fused = fuse(&result, &artifact_with(false), FusionMode::Hybrid, 0.75);
        assert_eq!(fused.classifications.rhythm.level, "Alto");
        assert_eq!(fused.classifications.rhythm.rule_id, RULE_ML_FUSED);
        assert_eq!(fused.classifications.rhythm.ml_confidence, Some(1.0));
    }

    #[test]
    fn override_replaces_regardless_of_confidence() {
        let result = base_result();
        let fused = fuse(&result, &artifact_with(true), FusionMode::Override, 0.99);
        assert_eq!(fused.classifications.rhythm.level, "Alto");
        assert_eq!(fused.classifications.rhythm.rule_id, RULE_ML_OVERRIDE);
    }

    #[test]
    fn fusion_never_edits_the_applied_rules() {
        let result = base_result();
        let fused = fuse(&result, &artifact_with(false), FusionMode::Override, 0.5);
        assert_eq!(fused.applied_rules, result.applied_rules);
        assert!(!fused.applied_rules.iter().any(|r| r.starts_with("ML_")));
    }

    #[test]
    fn fusing_twice_is_idempotent() {
        let result = base_result();
        let artifact = artifact_with(false);
        let once = fuse(&result, &artifact, FusionMode::Hybrid, 0.5);
        let twice = fuse(&once, &artifact, FusionMode::Hybrid, 0.5);
        assert_eq!(once.classifications.rhythm, twice.classifications.rhythm);
        assert_eq!(once.fusion, twice.fusion);
    }

    #[test]
    fn unknown_mode_names_fall_back_to_assist() {
        assert_eq!(FusionMode::from_name("HYBRID"), FusionMode::Hybrid);
        assert_eq!(FusionMode::from_name("experimental"), FusionMode::Assist);
        assert_eq!(FusionMode::from_name(" override "), FusionMode::Override);
    }
}
