//! Fixed narrative lookup tables keyed by level label.
//!
//! Every lookup falls back to a generic inconclusive text for labels it
//! does not know (including labels injected by model fusion); there is
//! never a missing entry.

use crate::domain::levels::{OrderPattern, ReasoningLevel};

fn lookup(table: &[(&str, &str)], level: &str, fallback: &'static str) -> String {
    table
        .iter()
        .find(|(key, _)| *key == level)
        .map(|&(_, text)| text.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn productivity_text(level: &str) -> String {
    lookup(
        &[
            ("Superior ou Muito Alta", "Rendimento muito acima do esperado, com alta capacidade produtiva."),
            ("Medio Superior ou Alta", "Rendimento acima do esperado para a faixa de referencia."),
            ("Media", "Rendimento adequado ao esperado para a funcao."),
            ("Medio Inferior ou Baixa", "Rendimento abaixo do esperado, com menor produtividade."),
            ("Inferior ou Lento", "Rendimento muito abaixo do esperado, com producao deficiente."),
            ("Faixa de transicao", "Resultado em faixa intermediaria de transicao entre categorias."),
        ],
        level,
        "Sem interpretacao conclusiva para produtividade.",
    )
}

pub fn rhythm_text(level: &str) -> String {
    lookup(
        &[
            ("Muito Alto", "Grandes oscilacoes no desempenho e tendencia a instabilidade de ritmo."),
            ("Alto", "Flutuacoes no ritmo, com menor constancia na execucao."),
            ("Medio", "Adaptacao razoavel a tarefas rotineiras."),
            ("Baixo", "Ritmo estavel, com maior uniformidade de producao."),
            ("Muito Baixo", "Alta regularidade na execucao, com baixa oscilacao e possivel rigidez."),
            ("Intermediario", "Ritmo em faixa intermediaria, requer leitura conjunta com outros indicadores."),
        ],
        level,
        "Sem interpretacao conclusiva para ritmo.",
    )
}

pub fn spacing_text(level: &str) -> String {
    lookup(
        &[
            ("Normal ou Media", "Boa organizacao, metodo e foco em objetivos."),
            ("Aumentada ou Ampla", "Maior extroversao e necessidade de contato/apoio externo."),
            ("Muito Aumentada ou Muito Ampla", "Tendencia a dispersao e necessidade de chamar atencao."),
            ("Diminuida ou Estreita", "Perfil mais reservado, cuidadoso e autoexigente."),
            ("Muito Diminuida ou Muito Estreita", "Tendencia a desconfianca, ciumes e foco excessivo em detalhes."),
            ("Intermediaria", "Padrao intermediario, exigindo correlacao com outros achados."),
        ],
        level,
        "Sem interpretacao conclusiva para distancia entre palos.",
    )
}

pub fn stroke_size_text(level: &str) -> String {
    lookup(
        &[
            ("Normal ou Medio", "Boa adaptacao ao meio social."),
            ("Aumentado ou Grande", "Perfil mais expansivo, autoconfiante e ambicioso."),
            ("Muito Aumentado ou Muito Grande", "Tendencia a exibicionismo e atitudes mais extravagantes."),
            ("Diminuido ou Pequeno", "Maior introversao, concentracao e foco em detalhes."),
            ("Muito Diminuido ou Muito Pequeno", "Tendencia a inseguranca e sentimento de inferioridade."),
        ],
        level,
        "Sem interpretacao conclusiva para tamanho dos palos.",
    )
}

pub fn line_spacing_text(level: &str) -> String {
    lookup(
        &[
            ("Normal ou Media", "Relacao interpessoal equilibrada, com limites adequados."),
            ("Aumentada ou Afastada", "Relacoes mais formais e cautelosas; prefere maior distancia social."),
            ("Muito Aumentada ou Afastada", "Excesso de cautela e maior afastamento interpessoal."),
            ("Diminuida, Estreita ou Proxima", "Busca contato social frequente, com risco de excesso de proximidade."),
            ("Muito Diminuida", "Contato intenso com menor percepcao de limites interpessoais."),
            ("Linhas tocando/sobrepostas", "Dificuldade acentuada em limites interpessoais."),
        ],
        level,
        "Sem interpretacao conclusiva para distancia entre linhas.",
    )
}

pub fn line_direction_text(level: &str) -> String {
    lookup(
        &[
            ("Horizontal ou Retilinea Normal", "Tendencia a comportamento mais equilibrado e convencional."),
            ("Ascendente", "Maior iniciativa, dinamismo e otimismo diante de tarefas."),
            ("Muito Ascendente", "Impulso elevado, com risco de exagero e menor realismo."),
            ("Descendente", "Tendencia a queda de energia/esforco diante de dificuldades."),
            ("Muito Descendente", "Indicador de desanimo acentuado e baixo vigor de continuidade."),
        ],
        level,
        "Sem interpretacao conclusiva para direcao das linhas.",
    )
}

pub fn quality_pattern_text(level: &str) -> String {
    lookup(
        &[
            ("Equilibrado", "Execucao uniforme e estavel."),
            ("Rigido", "Maior rigidez de estilo e controle."),
            ("Ascendente ou Crescente", "Dinamismo com aumento progressivo de rendimento."),
            ("Descendente ou Decrescente", "Inicia com mais energia e reduz ao longo da tarefa."),
            ("Convexa", "Aumenta producao no meio e perde folego ao final."),
            ("Concava", "Oscila com recuperacao de rendimento apos queda inicial."),
            ("Irregular ou Oscilante", "Variabilidade marcante no ritmo de execucao."),
        ],
        level,
        "Sem interpretacao conclusiva para qualidade do rendimento.",
    )
}

pub fn inclination_text(level: &str) -> String {
    lookup(
        &[
            ("Vertical ou Reta", "Perfil mais reservado e objetivo nas interacoes."),
            ("Inclinado para a Direita", "Maior extroversao e busca de contato social."),
            ("Muito inclinado para a Direita", "Subjetividade elevada e tendencia a impulsos expansivos."),
            ("Inclinado para a Esquerda", "Maior introversao, reserva e cautela social."),
            ("Muito inclinado para a Esquerda", "Reserva acentuada e maior tendencia ao isolamento."),
        ],
        level,
        "Sem interpretacao conclusiva para inclinacao dos palos.",
    )
}

pub fn margin_left_text(level: &str) -> String {
    lookup(
        &[
            ("Normal ou Media", "Interesse por iniciativa com controle de responsabilidades."),
            ("Aumentada ou Larga", "Maior extroversao e menor foco em obrigacoes."),
            ("Muito Aumentada", "Tendencia a despreocupacao com obrigacoes e limite financeiro."),
            ("Diminuida ou Estreita", "Perfil mais recatado e reflexivo para decidir."),
            ("Muito Diminuida ou Estreita", "Reserva social acentuada e alta prudencia."),
        ],
        level,
        "Sem interpretacao conclusiva para margem esquerda.",
    )
}

pub fn margin_right_text(level: &str) -> String {
    lookup(
        &[
            ("Normal", "Adaptacao social funcional diante de novas situacoes."),
            ("Aumentada ou Larga", "Maior dificuldade de adaptacao ao novo e exposicao."),
            ("Diminuida", "Perfil mais dinamico, com risco de precipitacao em decisoes."),
        ],
        level,
        "Sem interpretacao conclusiva para margem direita.",
    )
}

pub fn margin_top_text(level: &str) -> String {
    lookup(
        &[
            ("Normal", "Relacao de respeito adequada com figuras de autoridade."),
            ("Aumentada", "Postura defensiva e distanciamento em relacao a autoridade."),
            ("Diminuida", "Tendencia a menor delimitacao no contato com autoridade."),
        ],
        level,
        "Sem interpretacao conclusiva para margem superior.",
    )
}

pub fn pressure_text(level: &str) -> String {
    lookup(
        &[
            ("Forte", "Maior vigor, com possibilidade de menor precisao fina."),
            ("Media ou Normal", "Equilibrio entre energia e planejamento."),
            ("Fraca, Leve ou Delicada", "Maior delicadeza e menor disposicao para esforco fisico."),
            ("Irregular", "Instabilidade de energia e persistencia na tarefa."),
        ],
        level,
        "Sem interpretacao conclusiva para pressao.",
    )
}

pub fn stroke_quality_text(level: &str) -> String {
    lookup(
        &[
            ("Tracos Firmes ou Retos", "Maior determinacao e objetividade na conduta."),
            ("Tracos Frouxos, Curvos ou Brandos", "Maior flexibilidade com menor firmeza de imposicao."),
            ("Interrompida ou Descontinua", "Pode indicar tensao/ansiedade e oscilacao de continuidade."),
        ],
        level,
        "Sem interpretacao conclusiva para qualidade do tracado.",
    )
}

pub fn organization_text(level: &str) -> String {
    lookup(
        &[
            ("Muito Boa", "Elevado cuidado com ordem, metodo e apresentacao."),
            ("Boa", "Boa organizacao e metodo de execucao."),
            ("Regular", "Organizacao intermediaria com limites parcialmente oscilantes."),
            ("Ruim", "Baixa objetividade e metodo na execucao."),
            ("Muito Ruim", "Necessidade de supervisao para tarefas de ordem e metodo."),
        ],
        level,
        "Sem interpretacao conclusiva para organizacao.",
    )
}

/// Free-standing observation line for the rhythm level.
pub fn rhythm_observation(level: &str) -> String {
    lookup(
        &[
            ("Muito Alto", "Ritmo muito alto: grandes variacoes no desempenho."),
            ("Alto", "Ritmo alto: flutuacoes e instabilidade no desempenho das tarefas."),
            ("Medio", "Ritmo medio: boa adaptacao a tarefas rotineiras."),
            ("Baixo", "Ritmo baixo: estabilidade no ritmo de producao com certa uniformidade."),
            ("Muito Baixo", "Ritmo muito baixo: alta regularidade, baixa oscilacao e tendencia a rigidez."),
        ],
        level,
        "Ritmo sem classificacao conclusiva.",
    )
}

fn speed_group(total: u32) -> &'static str {
    if total < 377 {
        "lentidao"
    } else if total > 571 {
        "rapidez"
    } else {
        "normal"
    }
}

fn apply_reasoning_adjustment(text: String, reasoning: ReasoningLevel) -> String {
    if reasoning == ReasoningLevel::MedioInferiorOuInferior {
        text.replace(" e facilidade para resolver problemas", "")
    } else {
        text
    }
}

/// Joint narrative for speed (total) and intra-line order.
pub fn prod_order_interpretation(
    total: u32,
    order: OrderPattern,
    reasoning: ReasoningLevel,
) -> String {
    match speed_group(total) {
        "lentidao" => match order {
            OrderPattern::Ordenados => {
                "Lentidao com palos ordenados: boa capacidade de observar, ordenar e classificar; aptidao para reproduzir mais do que criar.".to_string()
            }
            OrderPattern::Desordenados => {
                "Lentidao com palos desordenados: sugere dificuldade de compreensao e organizacao da tarefa.".to_string()
            }
            OrderPattern::NaoInformado => {
                "Lentidao: rendimento abaixo do esperado para o grupo de referencia.".to_string()
            }
        },
        "normal" => apply_reasoning_adjustment(
            "Numero de palos em faixa normal: capacidade de executar tarefas com vivacidade, adaptacao as situacoes e facilidade para resolver problemas.".to_string(),
            reasoning,
        ),
        _ => match order {
            OrderPattern::Desordenados => {
                "Rapidez com palos desordenados: tende a valorizar rapidez acima da qualidade do trabalho.".to_string()
            }
            _ => apply_reasoning_adjustment(
                "Rapidez com palos ordenados: capacidade de executar tarefas com vivacidade, adaptacao as situacoes e facilidade para resolver problemas.".to_string(),
                reasoning,
            ),
        },
    }
}

/// Cross notes between productivity and the rhythm statistic.
pub fn nor_productivity_notes(total: u32, nor: Option<f64>) -> Vec<String> {
    let Some(nor) = nor else {
        return Vec::new();
    };
    let mut notes = Vec::new();

    if total < 377 {
        if nor < 5.0 {
            notes.push("Produtividade abaixo da media com NOR < 5: tendencia a regularidade e estabilidade.".to_string());
        }
        if nor > 8.0 {
            notes.push("Produtividade abaixo da media com NOR > 8: tendencia a instabilidade emocional.".to_string());
        }
        if nor > 15.0 {
            notes.push("Produtividade abaixo da media com NOR > 15: tendencia a maior emotividade e descontrole.".to_string());
        }
    }

    if (377..=754).contains(&total) {
        if nor < 5.0 {
            notes.push("Produtividade media/alta com NOR < 5: bom equilibrio ritmico.".to_string());
        }
        if (8.0..=10.0).contains(&nor) {
            notes.push("Produtividade media/alta com NOR 8-10: rapidez com queda de qualidade/ritmo.".to_string());
        }
        if nor > 15.0 {
            notes.push("Produtividade media/alta com NOR > 15: possivel descontrole da atividade.".to_string());
        }
    }

    if total > 862 {
        if nor < 6.0 {
            notes.push("Produtividade muito alta com NOR < 6: rapidez com melhor controle.".to_string());
        }
        if nor > 8.0 {
            notes.push("Produtividade muito alta com NOR > 8: rapidez com menor controle.".to_string());
        }
        if nor > 12.0 {
            notes.push("Produtividade muito alta com NOR > 12: risco de precipitacao e baixa precisao.".to_string());
        }
    }

    notes
}
