//! Fixed threshold tables, one per classified dimension.
//!
//! Each table is an ordered slice of bands evaluated first-match-wins;
//! the last entry is always a catch-all so no value is ever silently
//! dropped — values between the documented ranges land in a named
//! transition band with its own rule id. The thresholds are
//! domain-supplied constants, not fitted values.

use crate::domain::levels::{OrganizationLevel, PressureLevel, StrokeQualityLevel};
use crate::domain::metrics::Classification;

/// One row of a threshold table.
pub struct Band {
    pub level: &'static str,
    pub range: &'static str,
    pub rule_id: &'static str,
    pub matches: fn(f64) -> bool,
}

/// First-match-wins evaluation. Tables end in a catch-all, so this
/// always produces a verdict for a present value; absent values map to
/// the dimension's "not computed" sentinel.
pub fn classify(value: Option<f64>, bands: &[Band], sentinel_rule_id: &'static str) -> Classification {
    let Some(v) = value else {
        return Classification::not_computed(sentinel_rule_id);
    };
    for band in bands {
        if (band.matches)(v) {
            return Classification::new(band.level, band.range, band.rule_id);
        }
    }
    // Unreachable with well-formed tables; the catch-all matches anything.
    Classification::not_computed(sentinel_rule_id)
}

/// Total stroke count (productivity).
pub const PRODUCTIVITY: &[Band] = &[
    Band { level: "Superior ou Muito Alta", range: "total > 862", rule_id: "PROD_001", matches: |t| t > 862.0 },
    Band { level: "Medio Superior ou Alta", range: "607-754", rule_id: "PROD_002", matches: |t| (607.0..=754.0).contains(&t) },
    Band { level: "Media", range: "377-571", rule_id: "PROD_003", matches: |t| (377.0..=571.0).contains(&t) },
    Band { level: "Medio Inferior ou Baixa", range: "267-348", rule_id: "PROD_004", matches: |t| (267.0..=348.0).contains(&t) },
    Band { level: "Inferior ou Lento", range: "< 230", rule_id: "PROD_005", matches: |t| t < 230.0 },
    Band { level: "Faixa de transicao", range: "230-266, 349-376, 572-606 ou 755-862", rule_id: "PROD_999", matches: |_| true },
];

/// Rhythm statistic (NOR).
pub const RHYTHM: &[Band] = &[
    Band { level: "Muito Alto", range: ">= 15.6", rule_id: "RIT_001", matches: |n| n >= 15.6 },
    Band { level: "Alto", range: "8.6-12.8", rule_id: "RIT_002", matches: |n| (8.6..=12.8).contains(&n) },
    Band { level: "Medio", range: "4.2-8.0", rule_id: "RIT_003", matches: |n| (4.2..=8.0).contains(&n) },
    Band { level: "Baixo", range: "2.6-3.8", rule_id: "RIT_004", matches: |n| (2.6..=3.8).contains(&n) },
    Band { level: "Muito Baixo", range: "1.2-2.0", rule_id: "RIT_005", matches: |n| (1.2..=2.0).contains(&n) },
    Band { level: "Intermediario", range: "fora das faixas centrais da apostila", rule_id: "RIT_999", matches: |_| true },
];

/// Horizontal spacing between strokes, mm.
pub const SPACING: &[Band] = &[
    Band { level: "Muito Aumentada ou Muito Ampla", range: ">= 4.8 mm", rule_id: "DISTPALO_001", matches: |v| v >= 4.8 },
    Band { level: "Aumentada ou Ampla", range: "4.0-4.7 mm", rule_id: "DISTPALO_002", matches: |v| (4.0..=4.7).contains(&v) },
    Band { level: "Normal ou Media", range: "2.3-3.9 mm", rule_id: "DISTPALO_003", matches: |v| (2.3..=3.9).contains(&v) },
    Band { level: "Diminuida ou Estreita", range: "1.5-2.2 mm", rule_id: "DISTPALO_004", matches: |v| (1.5..=2.2).contains(&v) },
    Band { level: "Muito Diminuida ou Muito Estreita", range: "< 1.4 mm", rule_id: "DISTPALO_005", matches: |v| v < 1.4 },
    Band { level: "Intermediaria", range: "fora das faixas centrais da apostila", rule_id: "DISTPALO_999", matches: |_| true },
];

/// Stroke height, mm.
pub const STROKE_SIZE: &[Band] = &[
    Band { level: "Muito Aumentado ou Muito Grande", range: "> 9.8 mm", rule_id: "TAM_001", matches: |v| v > 9.8 },
    Band { level: "Aumentado ou Grande", range: "8.5-9.7 mm", rule_id: "TAM_002", matches: |v| (8.5..=9.7).contains(&v) },
    Band { level: "Normal ou Medio", range: "5.7-8.4 mm", rule_id: "TAM_003", matches: |v| (5.7..=8.4).contains(&v) },
    Band { level: "Diminuido ou Pequeno", range: "4.3-5.6 mm", rule_id: "TAM_004", matches: |v| (4.3..=5.6).contains(&v) },
    Band { level: "Muito Diminuido ou Muito Pequeno", range: "< 4.3 mm", rule_id: "TAM_005", matches: |_| true },
];

/// Clear gap between writing lines, mm.
pub const LINE_SPACING: &[Band] = &[
    Band { level: "Muito Aumentada ou Afastada", range: ">= 8.9 mm", rule_id: "DISTLIN_001", matches: |v| v >= 8.9 },
    Band { level: "Aumentada ou Afastada", range: "6.9-8.8 mm", rule_id: "DISTLIN_002", matches: |v| (6.9..=8.8).contains(&v) },
    Band { level: "Normal ou Media", range: "3.0-6.8 mm", rule_id: "DISTLIN_003", matches: |v| (3.0..=6.8).contains(&v) },
    Band { level: "Diminuida, Estreita ou Proxima", range: "1.1-2.9 mm", rule_id: "DISTLIN_004", matches: |v| (1.1..=2.9).contains(&v) },
    Band { level: "Muito Diminuida", range: "0.0-1.0 mm", rule_id: "DISTLIN_005", matches: |v| (0.0..=1.0).contains(&v) },
    Band { level: "Linhas tocando/sobrepostas", range: "< 0.0 mm", rule_id: "DISTLIN_006", matches: |_| true },
];

/// Baseline direction angle, degrees.
pub const LINE_DIRECTION: &[Band] = &[
    Band { level: "Muito Ascendente", range: ">= +3.1 graus", rule_id: "DIRLIN_001", matches: |v| v >= 3.1 },
    Band { level: "Ascendente", range: "+1.5 a +3.0 graus", rule_id: "DIRLIN_002", matches: |v| (1.5..=3.0).contains(&v) },
    Band { level: "Horizontal ou Retilinea Normal", range: "-2.0 a +1.4 graus", rule_id: "DIRLIN_003", matches: |v| (-2.0..=1.4).contains(&v) },
    Band { level: "Descendente", range: "-3.5 a -2.0 graus", rule_id: "DIRLIN_004", matches: |v| (-3.5..=-2.0).contains(&v) },
    Band { level: "Muito Descendente", range: "< -3.5 graus", rule_id: "DIRLIN_005", matches: |_| true },
];

/// Stroke inclination angle, degrees (90 = vertical).
pub const STROKE_INCLINATION: &[Band] = &[
    Band { level: "Muito inclinado para a Direita", range: ">= 99.8 graus", rule_id: "INCPALO_001", matches: |v| v >= 99.8 },
    Band { level: "Inclinado para a Direita", range: "94.5-99.7 graus", rule_id: "INCPALO_002", matches: |v| (94.5..99.8).contains(&v) },
    Band { level: "Vertical ou Reta", range: "83.8-94.4 graus", rule_id: "INCPALO_003", matches: |v| (83.8..=94.4).contains(&v) },
    Band { level: "Inclinado para a Esquerda", range: "78.5-83.7 graus", rule_id: "INCPALO_004", matches: |v| (78.5..83.8).contains(&v) },
    Band { level: "Muito inclinado para a Esquerda", range: "< 78.5 graus", rule_id: "INCPALO_005", matches: |_| true },
];

/// Left margin, mm.
pub const MARGIN_LEFT: &[Band] = &[
    Band { level: "Muito Aumentada", range: ">= 13.8 mm", rule_id: "MARGEME_001", matches: |v| v >= 13.8 },
    Band { level: "Aumentada ou Larga", range: "10.9-13.7 mm", rule_id: "MARGEME_002", matches: |v| (10.9..=13.7).contains(&v) },
    Band { level: "Normal ou Media", range: "4.9-10.8 mm", rule_id: "MARGEME_003", matches: |v| (4.9..=10.8).contains(&v) },
    Band { level: "Diminuida ou Estreita", range: "1.9-4.8 mm", rule_id: "MARGEME_004", matches: |v| (1.9..=4.8).contains(&v) },
    Band { level: "Muito Diminuida ou Estreita", range: "<= 1.8 mm", rule_id: "MARGEME_005", matches: |_| true },
];

/// Right margin, mm.
pub const MARGIN_RIGHT: &[Band] = &[
    Band { level: "Aumentada ou Larga", range: ">= 8.7 mm", rule_id: "MARGEMD_001", matches: |v| v >= 8.7 },
    Band { level: "Normal", range: "1.8-8.6 mm", rule_id: "MARGEMD_002", matches: |v| (1.8..=8.6).contains(&v) },
    Band { level: "Diminuida", range: "<= 1.7 mm", rule_id: "MARGEMD_003", matches: |_| true },
];

/// Top margin, mm.
pub const MARGIN_TOP: &[Band] = &[
    Band { level: "Aumentada", range: ">= 8.5 mm", rule_id: "MARGEMS_001", matches: |v| v >= 8.5 },
    Band { level: "Normal", range: "2.4-8.4 mm", rule_id: "MARGEMS_002", matches: |v| (2.4..=8.4).contains(&v) },
    Band { level: "Diminuida", range: "<= 2.3 mm", rule_id: "MARGEMS_003", matches: |_| true },
];

/// Pressure is qualitative: the enum maps directly onto its verdict.
pub fn classify_pressure(level: Option<PressureLevel>) -> Classification {
    match level {
        Some(PressureLevel::Forte) => Classification::new("Forte", "qualitativa", "PRESS_001"),
        Some(PressureLevel::Media) => {
            Classification::new("Media ou Normal", "qualitativa", "PRESS_002")
        }
        Some(PressureLevel::Leve) => {
            Classification::new("Fraca, Leve ou Delicada", "qualitativa", "PRESS_003")
        }
        Some(PressureLevel::Irregular) => {
            Classification::new("Irregular", "qualitativa", "PRESS_004")
        }
        None => Classification::not_computed("PRESS_000"),
    }
}

/// Stroke trace quality, qualitative.
pub fn classify_stroke_quality(level: Option<StrokeQualityLevel>) -> Classification {
    match level {
        Some(StrokeQualityLevel::Reta) => {
            Classification::new("Tracos Firmes ou Retos", "qualitativa", "TRACO_001")
        }
        Some(StrokeQualityLevel::Curva) => {
            Classification::new("Tracos Frouxos, Curvos ou Brandos", "qualitativa", "TRACO_002")
        }
        Some(StrokeQualityLevel::Descontinua) => {
            Classification::new("Interrompida ou Descontinua", "qualitativa", "TRACO_003")
        }
        None => Classification::not_computed("TRACO_000"),
    }
}

/// Sheet organization, qualitative.
pub fn classify_organization(level: Option<OrganizationLevel>) -> Classification {
    match level {
        Some(OrganizationLevel::MuitoBoa) => {
            Classification::new("Muito Boa", "qualitativa", "ORG_001")
        }
        Some(OrganizationLevel::Boa) => Classification::new("Boa", "qualitativa", "ORG_002"),
        Some(OrganizationLevel::Regular) => {
            Classification::new("Regular", "qualitativa", "ORG_003")
        }
        Some(OrganizationLevel::Ruim) => Classification::new("Ruim", "qualitativa", "ORG_004"),
        Some(OrganizationLevel::MuitoRuim) => {
            Classification::new("Muito Ruim", "qualitativa", "ORG_005")
        }
        None => Classification::not_computed("ORG_000"),
    }
}
