//! Matching of free-text irregularity tokens against the fixed
//! vocabulary of known handwriting irregularities.

use crate::domain::metrics::IrregularityFinding;

/// (normalized token, rule id, display name, narrative).
const VOCABULARY: &[(&str, &str, &str, &str)] = &[
    ("tremor inicial", "IRREG_001", "Tremor Inicial", "Inseguranca inicial diante de situacoes novas."),
    ("tremor constante", "IRREG_002", "Tremor Constante", "Sugere alteracao persistente no controle motor/emocional."),
    ("tremor acentuado", "IRREG_003", "Tremor Acentuado", "Oscilacao intensa com possiveis sinais neurologicos/alta tensao."),
    ("gancho inferior direito", "IRREG_004", "Gancho Inferior Direito", "Pode reagir com mal-humor em conflitos."),
    ("gancho inferior esquerdo", "IRREG_005", "Gancho Inferior Esquerdo", "Tendencia a autocritica agressiva e dificuldade de esquecer conflitos."),
    ("gancho superior direito", "IRREG_006", "Gancho Superior Direito", "Tendencia a explosoes e critica aos outros."),
    ("gancho superior esquerdo", "IRREG_007", "Gancho Superior Esquerdo", "Tendencia a autocobranca e autopunicao."),
    ("lacos", "IRREG_008", "Lacos", "Tendencia a conter energia sem externalizacao adequada."),
    ("palos quebrados", "IRREG_009", "Palos Quebrados", "Indicador de irregularidade importante do tracado."),
    ("chamines", "IRREG_010", "Chamines", "Pode associar-se a ansiedade quando confirmado por outros sinais."),
    ("tracado repassado", "IRREG_011", "Tracado Repassado", "Sugere dificuldade de decisao e rigidez mental."),
    ("correcoes", "IRREG_012", "Correcoes e Retoques", "Sinal de inseguranca e insatisfacao."),
];

/// Splits a free-text field into normalized tokens. Both `;` and `,`
/// separate entries; empty entries are dropped.
pub fn parse_irregularities_text(text: &str) -> Vec<String> {
    text.replace(',', ";")
        .split(';')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Matches tokens against the vocabulary. Unknown tokens are silently
/// ignored; they are caller vocabulary, not errors.
pub fn evaluate_irregularities(items: &[String]) -> Vec<IrregularityFinding> {
    items
        .iter()
        .filter_map(|item| {
            VOCABULARY
                .iter()
                .find(|(token, ..)| token == item)
                .map(|&(_, rule_id, name, narrative)| IrregularityFinding {
                    item: name.to_string(),
                    rule_id: rule_id.to_string(),
                    interpretation: narrative.to_string(),
                })
        })
        .collect()
}
