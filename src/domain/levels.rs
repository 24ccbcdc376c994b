//! Enumerated qualitative levels.
//!
//! Free-text level descriptions coming from the caller (form fields,
//! label tables) are normalized into these enums exactly once, at the
//! boundary; downstream code matches on the enum and never re-parses
//! strings. Parsing is deliberately forgiving (substring matching on the
//! lowercased input) because the labels originate from hand-filled
//! spreadsheets.

use serde::{Deserialize, Serialize};

/// Writing pressure, estimated from ink darkness and stroke width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureLevel {
    /// Heavy pressure.
    Forte,
    /// Medium pressure.
    Media,
    /// Light pressure.
    Leve,
    /// Pressure varies along the sheet (manual assessments only).
    Irregular,
}

impl PressureLevel {
    /// Normalizes a free-text description, `None` when unrecognized.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim().to_lowercase();
        if t.contains("forte") {
            Some(Self::Forte)
        } else if t.contains("media") || t.contains("normal") {
            Some(Self::Media)
        } else if t.contains("leve") || t.contains("fraca") || t.contains("delicada") {
            Some(Self::Leve)
        } else if t.contains("irregular") {
            Some(Self::Irregular)
        } else {
            None
        }
    }
}

/// Stroke trace quality, from fill ratio and deviation from vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeQualityLevel {
    /// Firm, straight traces.
    Reta,
    /// Loose or curved traces.
    Curva,
    /// Broken or discontinuous traces.
    Descontinua,
}

impl StrokeQualityLevel {
    /// Normalizes a free-text description, `None` when unrecognized.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim().to_lowercase();
        if t.contains("reta") || t.contains("reto") || t.contains("firme") {
            Some(Self::Reta)
        } else if t.contains("curv") || t.contains("froux") || t.contains("brando") {
            Some(Self::Curva)
        } else if t.contains("descontin") || t.contains("interromp") {
            Some(Self::Descontinua)
        } else {
            None
        }
    }
}

/// Overall sheet organization, from the composite layout variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationLevel {
    MuitoBoa,
    Boa,
    Regular,
    Ruim,
    MuitoRuim,
}

impl OrganizationLevel {
    /// Normalizes a free-text description, `None` when unrecognized.
    ///
    /// "muito boa"/"muito ruim" must be checked before their plain
    /// counterparts because of the substring match.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim().to_lowercase();
        if t.contains("muito boa") {
            Some(Self::MuitoBoa)
        } else if t == "boa" || t.contains(" boa") {
            Some(Self::Boa)
        } else if t.contains("regular") {
            Some(Self::Regular)
        } else if t.contains("muito ruim") {
            Some(Self::MuitoRuim)
        } else if t.contains("ruim") {
            Some(Self::Ruim)
        } else {
            None
        }
    }
}

/// Whether the strokes within each line keep an even, ordered cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPattern {
    Ordenados,
    Desordenados,
    #[default]
    NaoInformado,
}

/// Examiner-supplied reasoning level; it only tones down one narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningLevel {
    MedioInferiorOuInferior,
    #[default]
    NaoInformado,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_parse_matches_substrings() {
        assert_eq!(PressureLevel::parse("Forte"), Some(PressureLevel::Forte));
        assert_eq!(
            PressureLevel::parse("pressao media"),
            Some(PressureLevel::Media)
        );
        assert_eq!(PressureLevel::parse("normal"), Some(PressureLevel::Media));
        assert_eq!(
            PressureLevel::parse("bem delicada"),
            Some(PressureLevel::Leve)
        );
        assert_eq!(PressureLevel::parse("???"), None);
    }

    #[test]
    fn organization_prefers_muito_variants() {
        assert_eq!(
            OrganizationLevel::parse("muito boa"),
            Some(OrganizationLevel::MuitoBoa)
        );
        assert_eq!(
            OrganizationLevel::parse("muito ruim"),
            Some(OrganizationLevel::MuitoRuim)
        );
        assert_eq!(OrganizationLevel::parse("boa"), Some(OrganizationLevel::Boa));
        assert_eq!(
            OrganizationLevel::parse("ruim"),
            Some(OrganizationLevel::Ruim)
        );
    }

    #[test]
    fn stroke_quality_accepts_synonyms() {
        assert_eq!(
            StrokeQualityLevel::parse("tracos firmes"),
            Some(StrokeQualityLevel::Reta)
        );
        assert_eq!(
            StrokeQualityLevel::parse("frouxa"),
            Some(StrokeQualityLevel::Curva)
        );
        assert_eq!(
            StrokeQualityLevel::parse("interrompida"),
            Some(StrokeQualityLevel::Descontinua)
        );
    }
}
