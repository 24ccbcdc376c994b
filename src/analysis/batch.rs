//! Batch interfaces: labeled-sheet tables, feature-dataset building for
//! offline training, and validation against manually counted sheets.

use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::pipeline::{Analyzer, ProcessOptions};
use crate::core::errors::PalographError;
use crate::ml::features::{FEATURE_NAMES, extract_feature_vector};

/// One row of the labels table: an image plus its examiner labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSheet {
    /// Image path, relative to the dataset base directory.
    pub image_path: String,
    /// Examiner-reported error count.
    pub errors: u32,
    /// Target labels keyed by target name (the `target_` column suffix).
    pub labels: BTreeMap<String, String>,
}

/// Reads the labels table. Required column: `image_path`. Optional:
/// `errors` and any number of `target_*` columns, whose suffix becomes
/// the target name. Empty label cells are skipped.
pub fn read_labels_csv(path: impl AsRef<Path>) -> Result<Vec<LabeledSheet>, PalographError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();

    let path_col = headers
        .iter()
        .position(|h| h == "image_path")
        .ok_or_else(|| PalographError::invalid_input("labels table needs an image_path column"))?;
    let errors_col = headers.iter().position(|h| h == "errors");
    let target_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| h.strip_prefix("target_").map(|t| (idx, t.to_string())))
        .collect();

    let mut sheets = Vec::new();
    for record in reader.records() {
        let record = record?;
        let image_path = record
            .get(path_col)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PalographError::invalid_input("labels row without image_path"))?
            .to_string();
        let errors = match errors_col.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => 0,
            Some(text) => text.parse::<u32>().map_err(|_| {
                PalographError::invalid_input(format!(
                    "errors value '{text}' for {image_path} is not a count"
                ))
            })?,
        };
        let labels = target_cols
            .iter()
            .filter_map(|(idx, name)| {
                record
                    .get(*idx)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.clone(), v.to_string()))
            })
            .collect();
        sheets.push(LabeledSheet { image_path, errors, labels });
    }
    Ok(sheets)
}

/// One feature row of a built dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSample {
    pub image_path: String,
    /// Feature values in [`FEATURE_NAMES`] order.
    pub features: Vec<f64>,
    pub labels: BTreeMap<String, String>,
}

/// The training dataset extracted from a batch of labeled sheets.
#[derive(Debug, Clone)]
pub struct FeatureDataset {
    pub samples: Vec<DatasetSample>,
    /// Sheets whose image could not be processed.
    pub skipped: usize,
}

/// Analyzes every labeled sheet in parallel and extracts its feature
/// vector. Unreadable images are logged and skipped rather than failing
/// the batch.
pub fn build_feature_dataset(
    analyzer: &Analyzer,
    sheets: &[LabeledSheet],
    base_dir: impl AsRef<Path>,
) -> FeatureDataset {
    let base_dir = base_dir.as_ref();
    let rows: Vec<Option<DatasetSample>> = sheets
        .par_iter()
        .map(|sheet| {
            let options = ProcessOptions { errors: sheet.errors, ..ProcessOptions::default() };
            match analyzer.process_path(base_dir.join(&sheet.image_path), &options) {
                Ok(analysis) => Some(DatasetSample {
                    image_path: sheet.image_path.clone(),
                    features: extract_feature_vector(&analysis.result.raw),
                    labels: sheet.labels.clone(),
                }),
                Err(err) => {
                    tracing::warn!(image = %sheet.image_path, error = %err, "skipping sheet");
                    None
                }
            }
        })
        .collect();

    let skipped = rows.iter().filter(|r| r.is_none()).count();
    let samples = rows.into_iter().flatten().collect();
    FeatureDataset { samples, skipped }
}

/// Writes a built dataset as CSV: `image_path`, one column per feature,
/// then one `target_*` column per label seen anywhere in the batch.
pub fn save_dataset_csv(
    path: impl AsRef<Path>,
    dataset: &FeatureDataset,
) -> Result<(), PalographError> {
    let target_names: Vec<String> = dataset
        .samples
        .iter()
        .flat_map(|s| s.labels.keys().cloned())
        .unique()
        .sorted()
        .collect();

    let mut writer = csv::Writer::from_path(path.as_ref())?;
    let mut header = vec!["image_path".to_string()];
    header.extend(FEATURE_NAMES.iter().map(|n| n.to_string()));
    header.extend(target_names.iter().map(|t| format!("target_{t}")));
    writer.write_record(&header)?;

    for sample in &dataset.samples {
        let mut row = vec![sample.image_path.clone()];
        row.extend(sample.features.iter().map(|v| v.to_string()));
        row.extend(
            target_names
                .iter()
                .map(|t| sample.labels.get(t).cloned().unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Ground truth for one sheet: the manual count.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTruth {
    pub image_path: String,
    pub total: u32,
    /// Per-line counts, top to bottom; may be empty when only the total
    /// was recorded.
    pub line_counts: Vec<u32>,
}

/// Reads the ground-truth table. Columns: `image_path`, `total` and an
/// optional `line_counts` holding `;`-separated counts.
pub fn read_truth_csv(path: impl AsRef<Path>) -> Result<Vec<SheetTruth>, PalographError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let path_col = col("image_path")
        .ok_or_else(|| PalographError::invalid_input("truth table needs an image_path column"))?;
    let total_col = col("total")
        .ok_or_else(|| PalographError::invalid_input("truth table needs a total column"))?;
    let counts_col = col("line_counts");

    let mut truths = Vec::new();
    for record in reader.records() {
        let record = record?;
        let image_path = record.get(path_col).unwrap_or("").trim().to_string();
        let total_text = record.get(total_col).unwrap_or("").trim();
        let total = total_text.parse::<u32>().map_err(|_| {
            PalographError::invalid_input(format!(
                "total '{total_text}' for {image_path} is not a count"
            ))
        })?;
        let line_counts = match counts_col.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => Vec::new(),
            Some(text) => text
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| {
                    t.parse::<u32>().map_err(|_| {
                        PalographError::invalid_input(format!(
                            "line count '{t}' for {image_path} is not a count"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
        };
        truths.push(SheetTruth { image_path, total, line_counts });
    }
    Ok(truths)
}

/// Per-sheet comparison between detection and the manual count.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetValidation {
    pub image_path: String,
    pub predicted_total: u32,
    pub expected_total: u32,
    pub abs_error: f64,
    /// Absent when the expected total is zero.
    pub pct_error: Option<f64>,
    pub exact: bool,
    /// Mean absolute per-line error with the shorter side zero-padded;
    /// absent when no per-line truth was recorded.
    pub line_mae: Option<f64>,
}

/// Aggregate accuracy over a validation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub sheets: Vec<SheetValidation>,
    pub mae_total: f64,
    pub mape_total_percent: f64,
    pub exact_match_total_percent: f64,
    /// Mean of the per-sheet line MAEs; 0 when none was computable.
    pub line_mae: f64,
}

/// Analyzes every truth sheet and compares detection against the manual
/// counts. Fails on the first unreadable image: a validation run with
/// holes in it is not a measurement.
pub fn validate_against_truth(
    analyzer: &Analyzer,
    truths: &[SheetTruth],
    base_dir: impl AsRef<Path>,
) -> Result<ValidationReport, PalographError> {
    let base_dir = base_dir.as_ref();
    let sheets = truths
        .par_iter()
        .map(|truth| {
            let analysis =
                analyzer.process_path(base_dir.join(&truth.image_path), &ProcessOptions::default())?;
            Ok(compare_sheet(truth, analysis.result.raw.total, &analysis.line_counts))
        })
        .collect::<Result<Vec<_>, PalographError>>()?;
    Ok(summarize(sheets))
}

fn compare_sheet(truth: &SheetTruth, predicted_total: u32, predicted_lines: &[u32]) -> SheetValidation {
    let abs_error = (f64::from(predicted_total) - f64::from(truth.total)).abs();
    let pct_error = (truth.total > 0).then(|| abs_error / f64::from(truth.total) * 100.0);
    let line_mae = (!truth.line_counts.is_empty()).then(|| {
        let len = truth.line_counts.len().max(predicted_lines.len());
        let at = |v: &[u32], i: usize| v.get(i).copied().unwrap_or(0);
        (0..len)
            .map(|i| {
                (f64::from(at(predicted_lines, i)) - f64::from(at(&truth.line_counts, i))).abs()
            })
            .sum::<f64>()
            / len as f64
    });
    SheetValidation {
        image_path: truth.image_path.clone(),
        predicted_total,
        expected_total: truth.total,
        abs_error,
        pct_error,
        exact: predicted_total == truth.total,
        line_mae,
    }
}

fn summarize(sheets: Vec<SheetValidation>) -> ValidationReport {
    let n = sheets.len().max(1) as f64;
    let mae_total = sheets.iter().map(|s| s.abs_error).sum::<f64>() / n;
    let pct: Vec<f64> = sheets.iter().filter_map(|s| s.pct_error).collect();
    let mape_total_percent = if pct.is_empty() {
        0.0
    } else {
        pct.iter().sum::<f64>() / pct.len() as f64
    };
    let exact_match_total_percent =
        sheets.iter().filter(|s| s.exact).count() as f64 / n * 100.0;
    let maes: Vec<f64> = sheets.iter().filter_map(|s| s.line_mae).collect();
    let line_mae = if maes.is_empty() {
        0.0
    } else {
        maes.iter().sum::<f64>() / maes.len() as f64
    };
    ValidationReport {
        sheets,
        mae_total,
        mape_total_percent,
        exact_match_total_percent,
        line_mae,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_csv_extracts_targets_and_errors() -> Result<(), PalographError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("labels.csv");
        std::fs::write(
            &path,
            "image_path,errors,target_rhythm,target_pressure,notes\n\
             a.png,2,Alto,,ignored\n\
             b.png,,Medio,forte,x\n",
        )?;
        let sheets = read_labels_csv(&path)?;
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].errors, 2);
        assert_eq!(sheets[0].labels.len(), 1); // empty pressure cell dropped
        assert_eq!(sheets[0].labels["rhythm"], "Alto");
        assert_eq!(sheets[1].errors, 0);
        assert_eq!(sheets[1].labels["pressure"], "forte");
        Ok(())
    }

    #[test]
    fn labels_csv_requires_the_image_path_column() -> Result<(), PalographError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("labels.csv");
        std::fs::write(&path, "picture,errors\na.png,1\n")?;
        assert!(read_labels_csv(&path).is_err());
        Ok(())
    }

    #[test]
    fn truth_csv_parses_semicolon_line_counts() -> Result<(), PalographError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("truth.csv");
        std::fs::write(
            &path,
            "image_path,total,line_counts\na.png,92,18;19;20;17;18\nb.png,40,\n",
        )?;
        let truths = read_truth_csv(&path)?;
        assert_eq!(truths[0].line_counts, vec![18, 19, 20, 17, 18]);
        assert!(truths[1].line_counts.is_empty());
        Ok(())
    }

    #[test]
    fn comparison_pads_the_shorter_count_list_with_zeros() {
        let truth = SheetTruth {
            image_path: "a.png".to_string(),
            total: 50,
            line_counts: vec![20, 20, 10],
        };
        let v = compare_sheet(&truth, 40, &[20, 20]);
        assert_eq!(v.abs_error, 10.0);
        assert_eq!(v.pct_error, Some(20.0));
        assert!(!v.exact);
        // Diffs 0, 0, 10 over 3 lines.
        assert!((v.line_mae.unwrap() - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn summary_aggregates_over_the_batch() {
        let truth_a = SheetTruth { image_path: "a".into(), total: 100, line_counts: vec![50, 50] };
        let truth_b = SheetTruth { image_path: "b".into(), total: 200, line_counts: Vec::new() };
        let report = summarize(vec![
            compare_sheet(&truth_a, 100, &[50, 50]),
            compare_sheet(&truth_b, 190, &[95, 95]),
        ]);
        assert_eq!(report.mae_total, 5.0);
        assert_eq!(report.mape_total_percent, 2.5);
        assert_eq!(report.exact_match_total_percent, 50.0);
        assert_eq!(report.line_mae, 0.0); // the only per-line truth matched exactly
    }

    #[test]
    fn dataset_csv_layout_is_stable() -> Result<(), PalographError> {
        let dataset = FeatureDataset {
            samples: vec![DatasetSample {
                image_path: "a.png".to_string(),
                features: vec![1.0; FEATURE_NAMES.len()],
                labels: BTreeMap::from([("rhythm".to_string(), "Alto".to_string())]),
            }],
            skipped: 0,
        };
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dataset.csv");
        save_dataset_csv(&path, &dataset)?;
        let text = std::fs::read_to_string(&path)?;
        let header = text.lines().next().unwrap_or("");
        assert!(header.starts_with("image_path,total,lines,"));
        assert!(header.ends_with("target_rhythm"));
        Ok(())
    }
}
