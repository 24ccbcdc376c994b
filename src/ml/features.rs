//! Fixed feature schema shared by dataset building, training artifacts
//! and prediction.

use crate::domain::metrics::RawMetrics;

/// Feature column names, in the exact order [`extract_feature_vector`]
/// emits them. Artifacts are validated against this list so a model is
/// never applied to a vector with a different layout.
pub const FEATURE_NAMES: [&str; 17] = [
    "total",
    "lines",
    "mean_per_line",
    "std_dev",
    "variability_cv",
    "seconds_per_line",
    "errors",
    "final_score",
    "nor",
    "spacing_mm",
    "stroke_height_mm",
    "line_spacing_mm",
    "line_direction_deg",
    "stroke_inclination_deg",
    "margin_left_mm",
    "margin_right_mm",
    "margin_top_mm",
];

/// Flattens raw metrics into the fixed feature vector. Absent optional
/// measurements become `0.0`, matching how the training rows were built.
pub fn extract_feature_vector(raw: &RawMetrics) -> Vec<f64> {
    let opt = |v: Option<f64>| v.unwrap_or(0.0);
    vec![
        f64::from(raw.total),
        raw.lines.map(f64::from).unwrap_or(0.0),
        raw.mean_per_line,
        raw.std_dev,
        raw.variability_cv,
        raw.seconds_per_line,
        f64::from(raw.errors),
        raw.final_score,
        opt(raw.nor),
        opt(raw.spacing_mm),
        opt(raw.stroke_height_mm),
        opt(raw.line_spacing_mm),
        opt(raw.line_direction_deg),
        opt(raw.stroke_inclination_deg),
        opt(raw.margin_left_mm),
        opt(raw.margin_right_mm),
        opt(raw.margin_top_mm),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_length_matches_the_schema() {
        let v = extract_feature_vector(&RawMetrics::default());
        assert_eq!(v.len(), FEATURE_NAMES.len());
    }

    #[test]
    fn absent_measurements_become_zero() {
        let raw = RawMetrics {
            total: 460,
            nor: None,
            spacing_mm: None,
            ..RawMetrics::default()
        };
        let v = extract_feature_vector(&raw);
        assert_eq!(v[0], 460.0);
        assert_eq!(v[8], 0.0); // nor
        assert_eq!(v[9], 0.0); // spacing_mm
    }

    #[test]
    fn values_land_in_their_named_columns() {
        let raw = RawMetrics {
            total: 100,
            lines: Some(25),
            nor: Some(4.25),
            margin_top_mm: Some(7.5),
            ..RawMetrics::default()
        };
        let v = extract_feature_vector(&raw);
        let col = |name: &str| FEATURE_NAMES.iter().position(|n| *n == name).unwrap();
        assert_eq!(v[col("lines")], 25.0);
        assert_eq!(v[col("nor")], 4.25);
        assert_eq!(v[col("margin_top_mm")], 7.5);
    }
}
