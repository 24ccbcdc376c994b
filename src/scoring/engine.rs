//! The rule-based classification and scoring engine.
//!
//! A pure function from aggregated counts, measurements and qualitative
//! levels to an [`AssessmentResult`]. Missing optional measurements never
//! raise; they flow into "not computed" sentinel classifications. The
//! rhythm statistic (NOR) is absent whenever fewer than two blocks
//! exist, on every call path.

use std::collections::BTreeSet;

use crate::analysis::stats::{coefficient_of_variation, mean, pstdev};
use crate::core::config::ScoreConfig;
use crate::domain::levels::{
    OrderPattern, OrganizationLevel, PressureLevel, ReasoningLevel, StrokeQualityLevel,
};
use crate::domain::metrics::{
    AssessmentResult, Classification, Classifications, RawMetrics, TraitInterpretation,
};
use crate::scoring::bands::{
    self, classify, classify_organization, classify_pressure, classify_stroke_quality,
};
use crate::scoring::irregularities::evaluate_irregularities;
use crate::scoring::text;

/// Physical measurements and qualitative levels feeding the engine.
/// All optional; manual values are substituted into these fields before
/// the engine runs, so manual always wins over automatic per field.
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    pub spacing_mm: Option<f64>,
    pub stroke_height_mm: Option<f64>,
    pub line_spacing_mm: Option<f64>,
    pub line_direction_deg: Option<f64>,
    pub stroke_inclination_deg: Option<f64>,
    pub margin_left_mm: Option<f64>,
    pub margin_right_mm: Option<f64>,
    pub margin_top_mm: Option<f64>,
    pub pressure: Option<PressureLevel>,
    pub stroke_quality: Option<StrokeQualityLevel>,
    pub organization: Option<OrganizationLevel>,
}

/// Caller-supplied context that is not a measurement.
#[derive(Debug, Clone, Default)]
pub struct AssessmentContext {
    /// Error count reported by the examiner.
    pub errors: u32,
    /// Normalized irregularity tokens.
    pub irregularities: Vec<String>,
    /// Intra-line order pattern.
    pub order_pattern: OrderPattern,
    /// Examiner-assessed reasoning level.
    pub reasoning_level: ReasoningLevel,
}

/// Input for a count-only manual assessment (no image).
#[derive(Debug, Clone, Default)]
pub struct ManualAssessment {
    /// Mandatory total stroke count.
    pub total: u32,
    /// Examiner-computed rhythm figure; wins over block-derived NOR.
    pub nor: Option<f64>,
    /// Block totals, when the examiner counted them.
    pub block_totals: Vec<u32>,
    pub measurements: Measurements,
    pub context: AssessmentContext,
}

/// Maps measurements onto the fixed threshold tables and composes the
/// assessment document.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoreConfig,
}

impl ScoringEngine {
    /// Creates an engine with the given scoring constants.
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    /// The constants this engine runs with.
    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Full assessment from per-line stroke counts.
    pub fn assess_counts(
        &self,
        line_counts: &[u32],
        measurements: &Measurements,
        context: &AssessmentContext,
    ) -> AssessmentResult {
        if line_counts.is_empty() {
            tracing::warn!("no lines to assess, returning the empty result");
            return self.empty_result(context.errors);
        }

        let counts: Vec<f64> = line_counts.iter().map(|&c| f64::from(c)).collect();
        let total: u32 = line_counts.iter().sum();
        let avg = mean(&counts).unwrap_or(0.0);
        let std = if counts.len() > 1 { pstdev(&counts) } else { 0.0 };
        let cv = coefficient_of_variation(&counts);

        let seconds_per_line =
            self.config.time_per_block_seconds / self.config.block_size_lines.max(1) as f64;
        let score = f64::from(total)
            - f64::from(context.errors) * self.config.error_penalty
            - cv * f64::from(total) * self.config.variability_penalty_factor;

        let blocks = split_blocks(line_counts, self.config.block_size_lines);
        let nor = compute_nor(&blocks);

        let raw = RawMetrics {
            total,
            lines: Some(line_counts.len() as u32),
            mean_per_line: avg,
            std_dev: std,
            variability_cv: cv,
            seconds_per_line,
            errors: context.errors,
            final_score: score,
            nor,
            block_totals: blocks,
            spacing_mm: measurements.spacing_mm,
            stroke_height_mm: measurements.stroke_height_mm,
            line_spacing_mm: measurements.line_spacing_mm,
            line_direction_deg: measurements.line_direction_deg,
            stroke_inclination_deg: measurements.stroke_inclination_deg,
            margin_left_mm: measurements.margin_left_mm,
            margin_right_mm: measurements.margin_right_mm,
            margin_top_mm: measurements.margin_top_mm,
        };

        let observations = text::nor_productivity_notes(total, nor);
        self.finish(raw, measurements, context, observations)
    }

    /// Full assessment from an examiner-entered total, without an image.
    pub fn assess_manual(&self, manual: &ManualAssessment) -> AssessmentResult {
        let nor = manual
            .nor
            .or_else(|| compute_nor(&manual.block_totals));

        let raw = RawMetrics {
            total: manual.total,
            lines: None,
            mean_per_line: 0.0,
            std_dev: 0.0,
            variability_cv: 0.0,
            seconds_per_line: self.config.time_per_block_seconds
                / self.config.block_size_lines.max(1) as f64,
            errors: manual.context.errors,
            final_score: f64::from(manual.total)
                - f64::from(manual.context.errors) * self.config.error_penalty,
            nor,
            block_totals: manual.block_totals.clone(),
            spacing_mm: manual.measurements.spacing_mm,
            stroke_height_mm: manual.measurements.stroke_height_mm,
            line_spacing_mm: manual.measurements.line_spacing_mm,
            line_direction_deg: manual.measurements.line_direction_deg,
            stroke_inclination_deg: manual.measurements.stroke_inclination_deg,
            margin_left_mm: manual.measurements.margin_left_mm,
            margin_right_mm: manual.measurements.margin_right_mm,
            margin_top_mm: manual.measurements.margin_top_mm,
        };

        let mut observations = vec![
            text::prod_order_interpretation(
                manual.total,
                manual.context.order_pattern,
                manual.context.reasoning_level,
            ),
            text::rhythm_observation(&classify(nor, bands::RHYTHM, "RIT_000").level),
        ];
        observations.extend(text::nor_productivity_notes(manual.total, nor));

        self.finish(raw, &manual.measurements, &manual.context, observations)
    }

    /// Shared tail: classify everything, build traits, collect the audit
    /// trail.
    fn finish(
        &self,
        raw: RawMetrics,
        measurements: &Measurements,
        context: &AssessmentContext,
        observations: Vec<String>,
    ) -> AssessmentResult {
        let productivity = classify(Some(f64::from(raw.total)), bands::PRODUCTIVITY, "PROD_000");
        let shape = shape_classification(&raw.block_totals, raw.nor);
        let quality = quality_interpretation(&productivity.level, raw.nor, &shape);

        let classifications = Classifications {
            productivity,
            rhythm: classify(raw.nor, bands::RHYTHM, "RIT_000"),
            spacing: classify(raw.spacing_mm, bands::SPACING, "DISTPALO_000"),
            stroke_size: classify(raw.stroke_height_mm, bands::STROKE_SIZE, "TAM_000"),
            line_spacing: classify(raw.line_spacing_mm, bands::LINE_SPACING, "DISTLIN_000"),
            line_direction: classify(raw.line_direction_deg, bands::LINE_DIRECTION, "DIRLIN_000"),
            stroke_inclination: classify(
                raw.stroke_inclination_deg,
                bands::STROKE_INCLINATION,
                "INCPALO_000",
            ),
            margin_left: classify(raw.margin_left_mm, bands::MARGIN_LEFT, "MARGEME_000"),
            margin_right: classify(raw.margin_right_mm, bands::MARGIN_RIGHT, "MARGEMD_000"),
            margin_top: classify(raw.margin_top_mm, bands::MARGIN_TOP, "MARGEMS_000"),
            pressure: classify_pressure(measurements.pressure),
            stroke_quality: classify_stroke_quality(measurements.stroke_quality),
            organization: classify_organization(measurements.organization),
            quality_pattern: quality,
            shape_pattern: shape,
        };

        let irregularities = evaluate_irregularities(&context.irregularities);

        let mut rules: BTreeSet<String> = classifications
            .iter()
            .map(|(_, c)| c.rule_id.clone())
            .collect();
        rules.extend(irregularities.iter().map(|f| f.rule_id.clone()));

        let traits = build_traits(&classifications, &raw, context);

        AssessmentResult {
            raw,
            classifications,
            traits,
            irregularities,
            applied_rules: rules.into_iter().collect(),
            observations,
            auto_quality: None,
            fusion: None,
        }
    }

    /// Result for a sheet where nothing was detected: every dimension is
    /// the sentinel, no rules fire and no narratives are produced.
    fn empty_result(&self, errors: u32) -> AssessmentResult {
        let raw = RawMetrics {
            total: 0,
            lines: Some(0),
            seconds_per_line: self.config.time_per_block_seconds
                / self.config.block_size_lines.max(1) as f64,
            errors,
            ..RawMetrics::default()
        };
        let sentinel = |id: &str| Classification::not_computed(id);
        AssessmentResult {
            raw,
            classifications: Classifications {
                productivity: sentinel("PROD_000"),
                rhythm: sentinel("RIT_000"),
                spacing: sentinel("DISTPALO_000"),
                stroke_size: sentinel("TAM_000"),
                line_spacing: sentinel("DISTLIN_000"),
                line_direction: sentinel("DIRLIN_000"),
                stroke_inclination: sentinel("INCPALO_000"),
                margin_left: sentinel("MARGEME_000"),
                margin_right: sentinel("MARGEMD_000"),
                margin_top: sentinel("MARGEMS_000"),
                pressure: sentinel("PRESS_000"),
                stroke_quality: sentinel("TRACO_000"),
                organization: sentinel("ORG_000"),
                quality_pattern: "Nao classificado".to_string(),
                shape_pattern: "Indeterminado".to_string(),
            },
            traits: Vec::new(),
            irregularities: Vec::new(),
            applied_rules: Vec::new(),
            observations: Vec::new(),
            auto_quality: None,
            fusion: None,
        }
    }
}

/// Sums line counts in fixed-size consecutive groups.
pub fn split_blocks(line_counts: &[u32], block_size: usize) -> Vec<u32> {
    let size = block_size.max(1);
    line_counts.chunks(size).map(|c| c.iter().sum()).collect()
}

/// Rhythm statistic: mean absolute difference between consecutive block
/// totals. Absent with fewer than two blocks.
pub fn compute_nor(block_totals: &[u32]) -> Option<f64> {
    if block_totals.len() < 2 {
        return None;
    }
    let diffs: Vec<f64> = block_totals
        .windows(2)
        .map(|w| (f64::from(w[1]) - f64::from(w[0])).abs())
        .collect();
    mean(&diffs)
}

/// Shape of the block-total curve.
pub fn shape_classification(block_totals: &[u32], nor: Option<f64>) -> String {
    let Some(nor) = nor else {
        return "Indeterminado".to_string();
    };
    if block_totals.len() < 3 {
        return "Indeterminado".to_string();
    }

    let first = block_totals[0];
    let last = block_totals[block_totals.len() - 1];
    let mid = block_totals[block_totals.len() / 2];

    if nor <= 6.0 {
        return "Regular".to_string();
    }
    if last > first && block_totals.windows(2).all(|w| w[1] >= w[0]) {
        return "Ascendente".to_string();
    }
    if first > last && block_totals.windows(2).all(|w| w[1] <= w[0]) {
        return "Descendente".to_string();
    }

    let end_mean = (f64::from(first) + f64::from(last)) / 2.0;
    if f64::from(mid) > end_mean {
        "Convexa".to_string()
    } else if f64::from(mid) < end_mean {
        "Concava".to_string()
    } else {
        "Irregular".to_string()
    }
}

/// Overall quality-of-output pattern from productivity, NOR and shape.
/// Ordered rule list, first match wins.
pub fn quality_interpretation(productivity_level: &str, nor: Option<f64>, shape: &str) -> String {
    let Some(nor) = nor else {
        return "Nao classificado".to_string();
    };

    let prod_low = matches!(productivity_level, "Inferior ou Lento" | "Medio Inferior ou Baixa");
    let prod_med = productivity_level == "Media";

    if (4.0..=6.0).contains(&nor) && prod_med {
        "Equilibrado".to_string()
    } else if (0.0..=3.0).contains(&nor) && (prod_med || prod_low) {
        "Rigido".to_string()
    } else if nor > 6.0 && shape == "Ascendente" && prod_med {
        "Ascendente ou Crescente".to_string()
    } else if nor > 6.0 && shape == "Descendente" {
        "Descendente ou Decrescente".to_string()
    } else if nor > 6.0 && shape == "Convexa" {
        "Convexa".to_string()
    } else if nor > 6.0 && shape == "Concava" {
        "Concava".to_string()
    } else if nor > 6.0 {
        "Irregular ou Oscilante".to_string()
    } else {
        "Nao classificado".to_string()
    }
}

/// One narrative entry per classified dimension, plus the quality
/// pattern and the speed/order reading.
fn build_traits(
    classifications: &Classifications,
    raw: &RawMetrics,
    context: &AssessmentContext,
) -> Vec<TraitInterpretation> {
    let entry = |name: &str, c: &Classification, interpretation: String| TraitInterpretation {
        dimension: name.to_string(),
        level: c.level.clone(),
        range: c.range.clone(),
        rule_id: Some(c.rule_id.clone()),
        interpretation,
    };

    let c = classifications;
    let mut traits = vec![
        entry("Produtividade", &c.productivity, text::productivity_text(&c.productivity.level)),
        entry("Ritmo (NOR)", &c.rhythm, text::rhythm_text(&c.rhythm.level)),
        entry("Distancia entre palos", &c.spacing, text::spacing_text(&c.spacing.level)),
        entry("Tamanho dos palos", &c.stroke_size, text::stroke_size_text(&c.stroke_size.level)),
        entry(
            "Distancia entre linhas",
            &c.line_spacing,
            text::line_spacing_text(&c.line_spacing.level),
        ),
        entry(
            "Inclinacao dos palos",
            &c.stroke_inclination,
            text::inclination_text(&c.stroke_inclination.level),
        ),
        entry(
            "Direcao das linhas",
            &c.line_direction,
            text::line_direction_text(&c.line_direction.level),
        ),
        entry("Margem esquerda", &c.margin_left, text::margin_left_text(&c.margin_left.level)),
        entry("Margem direita", &c.margin_right, text::margin_right_text(&c.margin_right.level)),
        entry("Margem superior", &c.margin_top, text::margin_top_text(&c.margin_top.level)),
        entry("Pressao", &c.pressure, text::pressure_text(&c.pressure.level)),
        entry(
            "Qualidade do tracado",
            &c.stroke_quality,
            text::stroke_quality_text(&c.stroke_quality.level),
        ),
        entry("Organizacao/Ordem", &c.organization, text::organization_text(&c.organization.level)),
    ];

    traits.push(TraitInterpretation {
        dimension: "Qualidade do rendimento".to_string(),
        level: c.quality_pattern.clone(),
        range: "qualitativa".to_string(),
        rule_id: None,
        interpretation: text::quality_pattern_text(&c.quality_pattern),
    });

    let order_label = match context.order_pattern {
        OrderPattern::Ordenados => "ordenados",
        OrderPattern::Desordenados => "desordenados",
        OrderPattern::NaoInformado => "nao_informado",
    };
    traits.push(TraitInterpretation {
        dimension: "Ordem x Velocidade".to_string(),
        level: order_label.to_string(),
        range: "qualitativa".to_string(),
        rule_id: None,
        interpretation: text::prod_order_interpretation(
            raw.total,
            context.order_pattern,
            context.reasoning_level,
        ),
    });

    traits
}
