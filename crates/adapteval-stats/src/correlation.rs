use crate::Criterion;
use adapteval_core::model::EvaluationRow;
use serde::Serialize;

/// Pearson r between two criteria across all rows where both are set.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationEntry {
    pub a: Criterion,
    pub b: Criterion,
    /// `None` when fewer than two paired samples exist or either side
    /// has zero variance.
    pub r: Option<f64>,
    pub n: u32,
}

/// Correlation for every unordered criterion pair.
pub fn criterion_correlations(rows: &[EvaluationRow]) -> Vec<CorrelationEntry> {
    let mut out = Vec::new();
    for (i, a) in Criterion::ALL.iter().enumerate() {
        for b in Criterion::ALL.iter().skip(i + 1) {
            let pairs: Vec<(f64, f64)> = rows
                .iter()
                .filter_map(|row| Some((a.value(row)?, b.value(row)?)))
                .collect();
            out.push(CorrelationEntry {
                a: *a,
                b: *b,
                r: pearson(&pairs),
                n: pairs.len() as u32,
            });
        }
    }
    out
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture_row;

    #[test]
    fn perfectly_correlated_criteria_give_r_one() {
        let rows: Vec<_> = (1..=5)
            .map(|v| fixture_row("u", &format!("Q{}", v), "A", [v, v, 1, 1]))
            .collect();
        let entries = criterion_correlations(&rows);
        let rel_cred = entries
            .iter()
            .find(|e| e.a == Criterion::Relevance && e.b == Criterion::Credibility)
            .unwrap();
        assert!((rel_cred.r.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(rel_cred.n, 5);
    }

    #[test]
    fn anti_correlated_criteria_give_r_minus_one() {
        let rows: Vec<_> = (1..=5)
            .map(|v| fixture_row("u", &format!("Q{}", v), "A", [v, 11 - v, 1, 1]))
            .collect();
        let entries = criterion_correlations(&rows);
        let rel_cred = entries
            .iter()
            .find(|e| e.a == Criterion::Relevance && e.b == Criterion::Credibility)
            .unwrap();
        assert!((rel_cred.r.unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_yields_none() {
        let rows = vec![
            fixture_row("u", "Q1", "A", [5, 3, 1, 1]),
            fixture_row("u", "Q2", "A", [5, 7, 1, 1]),
        ];
        let entries = criterion_correlations(&rows);
        let rel_cred = entries
            .iter()
            .find(|e| e.a == Criterion::Relevance && e.b == Criterion::Credibility)
            .unwrap();
        assert!(rel_cred.r.is_none());
    }

    #[test]
    fn all_six_pairs_are_reported() {
        let entries = criterion_correlations(&[]);
        assert_eq!(entries.len(), 6);
        assert!(entries.iter().all(|e| e.r.is_none() && e.n == 0));
    }
}
