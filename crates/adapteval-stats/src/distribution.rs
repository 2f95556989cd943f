use crate::Criterion;
use adapteval_core::model::EvaluationRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Histogram of scores 1..=10; `counts[0]` is the count of score 1.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionEntry {
    pub agent: String,
    pub criterion: Criterion,
    pub counts: [u64; 10],
}

/// Per agent × criterion score histograms, sorted by agent then
/// criterion.
pub fn score_distributions(rows: &[EvaluationRow]) -> Vec<DistributionEntry> {
    let mut grouped: BTreeMap<(String, usize), [u64; 10]> = BTreeMap::new();
    for row in rows {
        for (ci, criterion) in Criterion::ALL.iter().enumerate() {
            let v = criterion.raw(row);
            if (1..=10).contains(&v) {
                let counts = grouped
                    .entry((row.agent.clone(), ci))
                    .or_insert([0u64; 10]);
                counts[(v - 1) as usize] += 1;
            }
        }
    }

    grouped
        .into_iter()
        .map(|((agent, ci), counts)| DistributionEntry {
            agent,
            criterion: Criterion::ALL[ci],
            counts,
        })
        .collect()
}

/// Histogram of one criterion across all agents.
pub fn overall_distribution(rows: &[EvaluationRow], criterion: Criterion) -> [u64; 10] {
    let mut counts = [0u64; 10];
    for row in rows {
        let v = criterion.raw(row);
        if (1..=10).contains(&v) {
            counts[(v - 1) as usize] += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture_row;

    #[test]
    fn histogram_covers_the_full_score_range() {
        let rows: Vec<_> = (1..=10)
            .map(|v| fixture_row("u", &format!("Q{}", v), "A", [v, 1, 1, 1]))
            .collect();
        let counts = overall_distribution(&rows, Criterion::Relevance);
        assert_eq!(counts, [1; 10]);
    }

    #[test]
    fn unset_scores_are_not_counted() {
        let rows = vec![fixture_row("u", "Q1", "A", [0, 5, 5, 5])];
        let counts = overall_distribution(&rows, Criterion::Relevance);
        assert_eq!(counts.iter().sum::<u64>(), 0);
    }

    #[test]
    fn per_agent_entries_are_split() {
        let rows = vec![
            fixture_row("u", "Q1", "A", [2, 2, 2, 2]),
            fixture_row("u", "Q1", "B", [9, 9, 9, 9]),
        ];
        let entries = score_distributions(&rows);
        assert_eq!(entries.len(), 8);
        let a_rel = entries
            .iter()
            .find(|e| e.agent == "A" && e.criterion == Criterion::Relevance)
            .unwrap();
        assert_eq!(a_rel.counts[1], 1);
        assert_eq!(a_rel.counts.iter().sum::<u64>(), 1);
    }
}
