//! A serialized random-forest classifier evaluated at inference time.
//!
//! Training happens offline; this module only walks the stored trees and
//! turns majority votes into a labeled prediction with a vote-fraction
//! confidence.

use serde::{Deserialize, Serialize};

use crate::domain::metrics::MlPrediction;

/// One decision-tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Internal split: `feature <= threshold` goes left, otherwise right.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Terminal node voting for one class index.
    Leaf { class: usize },
}

impl Node {
    fn walk(&self, features: &[f64]) -> usize {
        match self {
            Node::Leaf { class } => *class,
            Node::Split { feature, threshold, left, right } => {
                let value = features.get(*feature).copied().unwrap_or(0.0);
                if value <= *threshold {
                    left.walk(features)
                } else {
                    right.walk(features)
                }
            }
        }
    }

    fn check(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            Node::Leaf { class } => {
                if *class >= n_classes {
                    return Err(format!("leaf class {class} out of range (< {n_classes})"));
                }
                Ok(())
            }
            Node::Split { feature, left, right, .. } => {
                if *feature >= n_features {
                    return Err(format!("split feature {feature} out of range (< {n_features})"));
                }
                left.check(n_features, n_classes)?;
                right.check(n_features, n_classes)
            }
        }
    }
}

/// One tree of the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: Node,
}

impl DecisionTree {
    /// Class index this tree votes for.
    pub fn predict(&self, features: &[f64]) -> usize {
        self.root.walk(features)
    }
}

/// A voting ensemble over one classification target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forest {
    /// Class labels, indexed by the leaf class indices.
    pub labels: Vec<String>,
    /// The voting trees.
    pub trees: Vec<DecisionTree>,
}

impl Forest {
    /// Majority vote across all trees. `None` for an empty ensemble.
    /// Confidence is the winning label's vote fraction; ties go to the
    /// lowest class index so prediction is deterministic.
    pub fn predict(&self, features: &[f64]) -> Option<MlPrediction> {
        if self.trees.is_empty() || self.labels.is_empty() {
            return None;
        }
        let mut votes = vec![0usize; self.labels.len()];
        for tree in &self.trees {
            let class = tree.predict(features).min(self.labels.len() - 1);
            votes[class] += 1;
        }
        let (winner, count) = votes
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |best, (idx, &n)| {
                if n > best.1 { (idx, n) } else { best }
            });
        Some(MlPrediction {
            label: self.labels[winner].clone(),
            confidence: Some(count as f64 / self.trees.len() as f64),
        })
    }

    /// Structural validation against the feature schema: every split
    /// must reference a real feature column and every leaf a real label.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.labels.is_empty() {
            return Err("forest has no class labels".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.root
                .check(n_features, self.labels.len())
                .map_err(|e| format!("tree {idx}: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(class: usize) -> Node {
        Node::Leaf { class }
    }

    fn split(feature: usize, threshold: f64, left: Node, right: Node) -> Node {
        Node::Split { feature, threshold, left: Box::new(left), right: Box::new(right) }
    }

    /// Three trees over feature 0: two vote class 1 above 5.0, one
    /// always votes class 0.
    fn forest() -> Forest {
        Forest {
            labels: vec!["baixo".to_string(), "alto".to_string()],
            trees: vec![
                DecisionTree { root: split(0, 5.0, leaf(0), leaf(1)) },
                DecisionTree { root: split(0, 5.0, leaf(0), leaf(1)) },
                DecisionTree { root: leaf(0) },
            ],
        }
    }

    #[test]
    fn majority_vote_wins_with_vote_fraction_confidence() {
        let p = forest().predict(&[9.0]).expect("prediction");
        assert_eq!(p.label, "alto");
        assert!((p.confidence.unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn unanimous_vote_has_full_confidence() {
        let p = forest().predict(&[1.0]).expect("prediction");
        assert_eq!(p.label, "baixo");
        assert_eq!(p.confidence, Some(1.0));
    }

    #[test]
    fn missing_feature_columns_read_as_zero() {
        let p = forest().predict(&[]).expect("prediction");
        // 0.0 <= 5.0 on every split, all trees vote class 0.
        assert_eq!(p.label, "baixo");
    }

    #[test]
    fn empty_ensemble_predicts_nothing() {
        let f = Forest { labels: vec!["a".to_string()], trees: Vec::new() };
        assert!(f.predict(&[1.0]).is_none());
    }

    #[test]
    fn validation_rejects_out_of_range_references() {
        let bad_feature = Forest {
            labels: vec!["a".to_string()],
            trees: vec![DecisionTree { root: split(17, 0.0, leaf(0), leaf(0)) }],
        };
        assert!(bad_feature.validate(17).is_err());

        let bad_class = Forest {
            labels: vec!["a".to_string()],
            trees: vec![DecisionTree { root: leaf(1) }],
        };
        assert!(bad_class.validate(17).is_err());

        assert!(forest().validate(17).is_ok());
    }
}
