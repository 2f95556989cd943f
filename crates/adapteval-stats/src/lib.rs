//! Read-only aggregation over recorded evaluation rows: per-agent
//! summaries, criterion correlations, score distributions, and
//! per-question review data for the dashboards.

use adapteval_core::model::EvaluationRow;
use serde::Serialize;

pub mod correlation;
pub mod distribution;
pub mod review;
pub mod summary;

/// The four scoring criteria, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Relevance,
    Credibility,
    Uncertainty,
    Actionability,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Relevance,
        Criterion::Credibility,
        Criterion::Uncertainty,
        Criterion::Actionability,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Relevance => "relevance",
            Criterion::Credibility => "credibility",
            Criterion::Uncertainty => "uncertainty",
            Criterion::Actionability => "actionability",
        }
    }

    /// Raw cell value; 0 marks a malformed cell and is excluded from
    /// aggregation by `value`.
    pub fn raw(&self, row: &EvaluationRow) -> u8 {
        match self {
            Criterion::Relevance => row.relevance,
            Criterion::Credibility => row.credibility,
            Criterion::Uncertainty => row.uncertainty,
            Criterion::Actionability => row.actionability,
        }
    }

    pub fn value(&self, row: &EvaluationRow) -> Option<f64> {
        let v = self.raw(row);
        (v >= 1 && v <= 10).then_some(v as f64)
    }
}

/// Platform-level counts for the dashboard header.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub questions: usize,
    pub evaluations: usize,
    pub raters: usize,
    pub agents: usize,
}

pub fn overview(rows: &[EvaluationRow]) -> Overview {
    use std::collections::HashSet;
    let questions: HashSet<&str> = rows.iter().map(|r| r.question_id.as_str()).collect();
    let raters: HashSet<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
    let agents: HashSet<&str> = rows.iter().map(|r| r.agent.as_str()).collect();
    Overview {
        questions: questions.len(),
        evaluations: rows.len(),
        raters: raters.len(),
        agents: agents.len(),
    }
}

#[cfg(test)]
pub(crate) fn fixture_row(
    user: &str,
    qid: &str,
    agent: &str,
    scores: [u8; 4],
) -> EvaluationRow {
    use adapteval_core::model::ScoreSet;
    EvaluationRow::new(
        user,
        qid,
        agent,
        &ScoreSet {
            relevance: scores[0],
            credibility: scores[1],
            uncertainty: scores[2],
            actionability: scores[3],
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_counts_distinct_entities() {
        let rows = vec![
            fixture_row("u1", "Q1", "Plain-LLM", [5, 5, 5, 5]),
            fixture_row("u1", "Q1", "Climsight", [6, 6, 6, 6]),
            fixture_row("u2", "Q2", "Plain-LLM", [7, 7, 7, 7]),
        ];
        let o = overview(&rows);
        assert_eq!(o.questions, 2);
        assert_eq!(o.evaluations, 3);
        assert_eq!(o.raters, 2);
        assert_eq!(o.agents, 2);
    }

    #[test]
    fn zero_scores_are_excluded_from_values() {
        let row = fixture_row("u", "Q1", "a", [0, 3, 10, 11]);
        assert_eq!(Criterion::Relevance.value(&row), None);
        assert_eq!(Criterion::Credibility.value(&row), Some(3.0));
        assert_eq!(Criterion::Uncertainty.value(&row), Some(10.0));
        assert_eq!(Criterion::Actionability.value(&row), None);
    }
}
