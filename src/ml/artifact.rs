//! Versioned on-disk format for trained ensembles.
//!
//! An artifact bundles one forest per classification target together
//! with the feature schema it was trained against and a per-target
//! training report. Loading validates everything up front so prediction
//! can never index out of range.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::errors::PalographError;
use crate::domain::metrics::MlPrediction;
use crate::ml::features::FEATURE_NAMES;
use crate::ml::forest::Forest;

/// Current artifact schema version. Bumped on any layout change.
pub const SCHEMA_VERSION: u32 = 1;

/// Where a target's prediction lands in the assessment document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Key into the structured classifications, or `"quality_pattern"`.
    pub classification_key: String,
    /// True when the target maps onto a structured classification with
    /// a rule id; false for the free-form quality pattern.
    pub structured: bool,
}

/// Outcome of offline training for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Whether a usable model was produced.
    pub trained: bool,
    /// Why training was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Number of labeled samples the target had available.
    pub samples: usize,
}

/// One target's model and bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetModel {
    pub spec: TargetSpec,
    pub report: TrainingReport,
    /// Absent when training was skipped for this target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forest: Option<Forest>,
}

/// The full trained-model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    /// Feature schema the forests were trained against.
    pub feature_names: Vec<String>,
    /// Models keyed by target name.
    pub targets: BTreeMap<String, TargetModel>,
}

/// The eight predictable targets and where each one lands.
pub fn default_targets() -> BTreeMap<String, TargetSpec> {
    let spec = |key: &str, structured: bool| TargetSpec {
        classification_key: key.to_string(),
        structured,
    };
    BTreeMap::from([
        ("productivity".to_string(), spec("productivity", true)),
        ("rhythm".to_string(), spec("rhythm", true)),
        ("quality_pattern".to_string(), spec("quality_pattern", false)),
        ("organization".to_string(), spec("organization", true)),
        ("line_direction".to_string(), spec("line_direction", true)),
        ("stroke_inclination".to_string(), spec("stroke_inclination", true)),
        ("pressure".to_string(), spec("pressure", true)),
        ("stroke_quality".to_string(), spec("stroke_quality", true)),
    ])
}

impl ModelArtifact {
    /// Loads and validates an artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PalographError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PalographError::model_artifact(path.display().to_string(), e.to_string()))?;
        let artifact: Self = serde_json::from_str(&text)
            .map_err(|e| PalographError::model_artifact(path.display().to_string(), e.to_string()))?;
        artifact
            .validate()
            .map_err(|reason| PalographError::model_artifact(path.display().to_string(), reason))?;
        tracing::info!(
            path = %path.display(),
            targets = artifact.targets.len(),
            "model artifact loaded"
        );
        Ok(artifact)
    }

    /// Structural validation: schema version, feature schema and every
    /// stored forest.
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(format!(
                "schema version {} (supported: {SCHEMA_VERSION})",
                self.schema_version
            ));
        }
        if self.feature_names != FEATURE_NAMES {
            return Err("feature schema does not match this build".to_string());
        }
        for (name, target) in &self.targets {
            if target.report.trained != target.forest.is_some() {
                return Err(format!("target '{name}': trained flag disagrees with stored model"));
            }
            if let Some(forest) = &target.forest {
                forest
                    .validate(self.feature_names.len())
                    .map_err(|e| format!("target '{name}': {e}"))?;
            }
        }
        Ok(())
    }

    /// Predictions for every trained target, keyed by target name.
    pub fn predict_all(&self, features: &[f64]) -> BTreeMap<String, MlPrediction> {
        self.targets
            .iter()
            .filter_map(|(name, target)| {
                let forest = target.forest.as_ref()?;
                forest.predict(features).map(|p| (name.clone(), p))
            })
            .collect()
    }

    /// Target spec lookup.
    pub fn target_spec(&self, name: &str) -> Option<&TargetSpec> {
        self.targets.get(name).map(|t| &t.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::forest::{DecisionTree, Node};

    fn trained_target(key: &str, labels: &[&str], class: usize) -> TargetModel {
        TargetModel {
            spec: TargetSpec { classification_key: key.to_string(), structured: true },
            report: TrainingReport { trained: true, reason: None, samples: 40 },
            forest: Some(Forest {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                trees: vec![DecisionTree { root: Node::Leaf { class } }],
            }),
        }
    }

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            schema_version: SCHEMA_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            targets: BTreeMap::from([
                ("rhythm".to_string(), trained_target("rhythm", &["Medio", "Alto"], 0)),
                (
                    "pressure".to_string(),
                    TargetModel {
                        spec: TargetSpec {
                            classification_key: "pressure".to_string(),
                            structured: true,
                        },
                        report: TrainingReport {
                            trained: false,
                            reason: Some("menos de 20 exemplos rotulados".to_string()),
                            samples: 7,
                        },
                        forest: None,
                    },
                ),
            ]),
        }
    }

    #[test]
    fn valid_artifact_passes_validation() {
        assert!(artifact().validate().is_ok());
    }

    #[test]
    fn wrong_schema_version_is_rejected() {
        let mut a = artifact();
        a.schema_version = 99;
        assert!(a.validate().unwrap_err().contains("schema version"));
    }

    #[test]
    fn wrong_feature_schema_is_rejected() {
        let mut a = artifact();
        a.feature_names.pop();
        assert!(a.validate().is_err());
    }

    #[test]
    fn trained_flag_must_match_stored_model() {
        let mut a = artifact();
        a.targets.get_mut("rhythm").unwrap().report.trained = false;
        assert!(a.validate().unwrap_err().contains("rhythm"));
    }

    #[test]
    fn predict_all_skips_untrained_targets() {
        let predictions = artifact().predict_all(&[0.0; 17]);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions["rhythm"].label, "Medio");
    }

    #[test]
    fn load_round_trips_through_json() -> Result<(), PalographError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ensemble.json");
        std::fs::write(&path, serde_json::to_string(&artifact())?)?;
        let loaded = ModelArtifact::load(&path)?;
        assert_eq!(loaded.targets.len(), 2);
        Ok(())
    }

    #[test]
    fn load_reports_the_offending_path() {
        let err = ModelArtifact::load("/nonexistent/ensemble.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ensemble.json"));
    }

    #[test]
    fn default_targets_cover_all_eight() {
        let targets = default_targets();
        assert_eq!(targets.len(), 8);
        assert!(!targets["quality_pattern"].structured);
        assert!(targets["productivity"].structured);
    }
}
