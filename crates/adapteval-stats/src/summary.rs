use crate::Criterion;
use adapteval_core::model::EvaluationRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// n/mean/std/min/max for one agent under one criterion.
#[derive(Debug, Clone, Serialize)]
pub struct AgentCriterionSummary {
    pub agent: String,
    pub criterion: Criterion,
    pub n: u32,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-agent score summaries, sorted by agent then criterion for
/// deterministic output.
pub fn agent_summary(rows: &[EvaluationRow]) -> Vec<AgentCriterionSummary> {
    let mut grouped: BTreeMap<(String, usize), Vec<f64>> = BTreeMap::new();
    for row in rows {
        for (ci, criterion) in Criterion::ALL.iter().enumerate() {
            if let Some(v) = criterion.value(row) {
                grouped
                    .entry((row.agent.clone(), ci))
                    .or_default()
                    .push(v);
            }
        }
    }

    let mut out = Vec::with_capacity(grouped.len());
    for ((agent, ci), vs) in grouped {
        if vs.is_empty() {
            continue;
        }
        let n = vs.len() as u32;
        let mean = vs.iter().sum::<f64>() / n as f64;
        let variance = vs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        let min = vs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = vs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        out.push(AgentCriterionSummary {
            agent,
            criterion: Criterion::ALL[ci],
            n,
            mean,
            std: variance.sqrt(),
            min,
            max,
        });
    }
    out
}
