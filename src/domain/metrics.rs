//! Result aggregates: raw measurements, classifications and the final
//! assessment document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar measurements derived from the grouped lines (or supplied
/// manually). Optional fields are `None` when the data was insufficient
/// to estimate them; that absence propagates to a "not computed"
/// classification instead of a numeric default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Total stroke count across all lines.
    pub total: u32,
    /// Number of detected lines; absent for count-only manual runs.
    pub lines: Option<u32>,
    /// Mean strokes per line.
    pub mean_per_line: f64,
    /// Population standard deviation of per-line counts.
    pub std_dev: f64,
    /// Coefficient of variation of per-line counts.
    pub variability_cv: f64,
    /// Estimated seconds spent per line under the test protocol.
    pub seconds_per_line: f64,
    /// Caller-reported error count.
    pub errors: u32,
    /// Composite score (total minus error and variability penalties).
    pub final_score: f64,
    /// Rhythm statistic; absent with fewer than two blocks.
    pub nor: Option<f64>,
    /// Stroke totals per fixed-size block of lines.
    pub block_totals: Vec<u32>,
    /// Mean horizontal gap between neighboring strokes, mm.
    pub spacing_mm: Option<f64>,
    /// Mean stroke height, mm.
    pub stroke_height_mm: Option<f64>,
    /// Mean baseline-to-baseline gap net of stroke heights, mm.
    pub line_spacing_mm: Option<f64>,
    /// Mean baseline slope across qualifying lines, degrees.
    pub line_direction_deg: Option<f64>,
    /// Mean stroke orientation, degrees (90 = vertical).
    pub stroke_inclination_deg: Option<f64>,
    /// Left margin, mm.
    pub margin_left_mm: Option<f64>,
    /// Right margin, mm.
    pub margin_right_mm: Option<f64>,
    /// Top margin, mm.
    pub margin_top_mm: Option<f64>,
}

/// One ordinal verdict: a level label, the threshold range that produced
/// it and the identifier of the rule that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Level label, e.g. `"Media"`.
    pub level: String,
    /// Human-readable range that matched, e.g. `"377-571"`.
    pub range: String,
    /// Identifier of the rule that produced the verdict.
    pub rule_id: String,
    /// Confidence of the fused model prediction, when one replaced the
    /// rule verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_confidence: Option<f64>,
}

impl Classification {
    /// Builds a rule-derived classification.
    pub fn new(
        level: impl Into<String>,
        range: impl Into<String>,
        rule_id: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            range: range.into(),
            rule_id: rule_id.into(),
            ml_confidence: None,
        }
    }

    /// The "not computed" sentinel for a dimension with no data.
    pub fn not_computed(rule_id: impl Into<String>) -> Self {
        Self::new("Nao calculado", "sem dados", rule_id)
    }
}

/// Every classified dimension of one assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifications {
    pub productivity: Classification,
    pub rhythm: Classification,
    pub spacing: Classification,
    pub stroke_size: Classification,
    pub line_spacing: Classification,
    pub line_direction: Classification,
    pub stroke_inclination: Classification,
    pub margin_left: Classification,
    pub margin_right: Classification,
    pub margin_top: Classification,
    pub pressure: Classification,
    pub stroke_quality: Classification,
    pub organization: Classification,
    /// Overall quality-of-output pattern; qualitative, no numeric range.
    pub quality_pattern: String,
    /// Shape of the block-total curve; qualitative, no numeric range.
    pub shape_pattern: String,
}

impl Classifications {
    /// Mutable access to a structured dimension by its target key, used
    /// when fusing model predictions. Unknown keys yield `None`.
    pub fn by_key_mut(&mut self, key: &str) -> Option<&mut Classification> {
        match key {
            "productivity" => Some(&mut self.productivity),
            "rhythm" => Some(&mut self.rhythm),
            "spacing" => Some(&mut self.spacing),
            "stroke_size" => Some(&mut self.stroke_size),
            "line_spacing" => Some(&mut self.line_spacing),
            "line_direction" => Some(&mut self.line_direction),
            "stroke_inclination" => Some(&mut self.stroke_inclination),
            "margin_left" => Some(&mut self.margin_left),
            "margin_right" => Some(&mut self.margin_right),
            "margin_top" => Some(&mut self.margin_top),
            "pressure" => Some(&mut self.pressure),
            "stroke_quality" => Some(&mut self.stroke_quality),
            "organization" => Some(&mut self.organization),
            _ => None,
        }
    }

    /// All structured classifications paired with their target keys, for
    /// the audit trail.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Classification)> {
        [
            ("productivity", &self.productivity),
            ("rhythm", &self.rhythm),
            ("spacing", &self.spacing),
            ("stroke_size", &self.stroke_size),
            ("line_spacing", &self.line_spacing),
            ("line_direction", &self.line_direction),
            ("stroke_inclination", &self.stroke_inclination),
            ("margin_left", &self.margin_left),
            ("margin_right", &self.margin_right),
            ("margin_top", &self.margin_top),
            ("pressure", &self.pressure),
            ("stroke_quality", &self.stroke_quality),
            ("organization", &self.organization),
        ]
        .into_iter()
    }
}

/// One dimension's narrative reading, joined from its classification and
/// the fixed interpretation texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitInterpretation {
    /// Display name of the dimension, e.g. `"Produtividade"`.
    pub dimension: String,
    /// Level label the narrative was keyed by.
    pub level: String,
    /// Range label carried over from the classification.
    pub range: String,
    /// Rule id carried over, absent for purely qualitative entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// The narrative text.
    pub interpretation: String,
}

/// One matched handwriting irregularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrregularityFinding {
    /// Canonical display name of the irregularity.
    pub item: String,
    /// Rule id of the vocabulary entry.
    pub rule_id: String,
    /// Narrative text of the finding.
    pub interpretation: String,
}

/// Confidence that the fully-automatic measurement is trustworthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoQuality {
    /// Confidence in `[0, 1]`; starts at 1 and drops per penalty.
    pub score: f64,
    /// True when the score fell below the review threshold.
    pub requires_manual_review: bool,
    /// One entry per penalty applied, naming the trigger.
    pub flags: Vec<String>,
    /// Ink pixels over region pixels, kept for diagnostics.
    pub ink_ratio: f64,
}

/// One target's prediction from the trained ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    /// Predicted level label.
    pub label: String,
    /// Vote fraction of the winning label; absent when unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Record of a fusion pass: what was predicted and what was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSummary {
    /// Mode the fusion ran under (`assist`/`hybrid`/`override`).
    pub mode: String,
    /// Confidence threshold the hybrid mode compared against.
    pub confidence_threshold: f64,
    /// Every prediction that was considered, keyed by target name.
    pub predictions: BTreeMap<String, MlPrediction>,
    /// Target names whose classification was actually replaced.
    pub applied_targets: Vec<String>,
}

/// The externally visible output of one assessment. Immutable once
/// built; fusion produces a new value rather than editing in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Raw measurements the verdicts were derived from.
    pub raw: RawMetrics,
    /// Ordinal verdict per dimension.
    pub classifications: Classifications,
    /// Narrative reading per dimension.
    pub traits: Vec<TraitInterpretation>,
    /// Matched irregularity findings.
    pub irregularities: Vec<IrregularityFinding>,
    /// Sorted, deduplicated ids of every rule that fired.
    pub applied_rules: Vec<String>,
    /// Free-text observations (rhythm/productivity cross notes).
    pub observations: Vec<String>,
    /// Measurement confidence, present for image-derived runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_quality: Option<AutoQuality>,
    /// Fusion record, present once a fusion pass ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fusion: Option<FusionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_key_mut_covers_every_iterated_key() {
        let sentinel = Classification::not_computed("X_000");
        let mut all = Classifications {
            productivity: sentinel.clone(),
            rhythm: sentinel.clone(),
            spacing: sentinel.clone(),
            stroke_size: sentinel.clone(),
            line_spacing: sentinel.clone(),
            line_direction: sentinel.clone(),
            stroke_inclination: sentinel.clone(),
            margin_left: sentinel.clone(),
            margin_right: sentinel.clone(),
            margin_top: sentinel.clone(),
            pressure: sentinel.clone(),
            stroke_quality: sentinel.clone(),
            organization: sentinel.clone(),
            quality_pattern: "Nao classificado".into(),
            shape_pattern: "Indeterminado".into(),
        };
        let keys: Vec<&'static str> = all.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 13);
        for key in keys {
            assert!(all.by_key_mut(key).is_some(), "missing key {key}");
        }
        assert!(all.by_key_mut("quality_pattern").is_none());
    }

    #[test]
    fn not_computed_sentinel_has_fixed_labels() {
        let c = Classification::not_computed("RIT_000");
        assert_eq!(c.level, "Nao calculado");
        assert_eq!(c.range, "sem dados");
        assert_eq!(c.rule_id, "RIT_000");
        assert!(c.ml_confidence.is_none());
    }
}
