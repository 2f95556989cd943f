use crate::model::{question_id, AgentResponse, RatedPair};
use crate::responses::ResponseStore;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// One sampled (baseline, alternate) answer pair for a question the
/// rater has not scored yet.
#[derive(Debug, Clone)]
pub struct SampledPair {
    pub index: String,
    pub question_id: String,
    pub baseline: AgentResponse,
    pub alternate: AgentResponse,
}

/// Picks an unrated question paired with one randomly chosen alternate
/// agent against the fixed baseline.
///
/// The alternate is drawn once per candidate question, not searched
/// exhaustively: a question can be skipped even though a different
/// alternate would have satisfied the constraint. That incompleteness is
/// intentional product behavior; do not widen the search here.
///
/// Candidates whose baseline or alternate file is missing are skipped as
/// no-data. `Ok(None)` means exhaustion: every remaining combination has
/// been rated already.
pub fn sample_pair(
    store: &ResponseStore,
    baseline: &str,
    alternates: &[String],
    rated: &HashSet<RatedPair>,
    rng: &mut impl Rng,
) -> anyhow::Result<Option<SampledPair>> {
    if alternates.is_empty() {
        anyhow::bail!("no alternate agents configured");
    }

    let mut indices = store.indices(baseline)?;
    indices.shuffle(rng);

    for idx in indices {
        let qid = question_id(&idx);
        let alt_agent = alternates
            .choose(rng)
            .ok_or_else(|| anyhow::anyhow!("no alternate agents configured"))?;

        if rated.contains(&(qid.clone(), baseline.to_string()))
            || rated.contains(&(qid.clone(), alt_agent.clone()))
        {
            continue;
        }

        let Some(base) = store.load(baseline, &idx)? else {
            tracing::debug!(index = %idx, agent = %baseline, "response file missing, skipping");
            continue;
        };
        let Some(alt) = store.load(alt_agent, &idx)? else {
            tracing::debug!(index = %idx, agent = %alt_agent, "response file missing, skipping");
            continue;
        };

        return Ok(Some(SampledPair {
            question_id: qid,
            index: idx,
            baseline: base,
            alternate: alt,
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::write_response_file;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    const BASELINE: &str = "Plain-LLM";

    fn fixture(indices: &[&str], alternates: &[&str]) -> (tempfile::TempDir, ResponseStore) {
        let dir = tempdir().unwrap();
        for idx in indices {
            write_response_file(dir.path(), "v", BASELINE, idx, "q", "base answer").unwrap();
            for alt in alternates {
                write_response_file(dir.path(), "v", alt, idx, "q", "alt answer").unwrap();
            }
        }
        let store = ResponseStore::new(dir.path(), "v");
        (dir, store)
    }

    fn alts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fully_rated_universe_reports_exhaustion() {
        let alternates = alts(&["A1", "A2"]);
        let (_dir, store) = fixture(&["0", "1"], &["A1", "A2"]);

        let mut rated = HashSet::new();
        for idx in ["0", "1"] {
            let qid = question_id(idx);
            rated.insert((qid.clone(), BASELINE.to_string()));
            rated.insert((qid.clone(), "A1".to_string()));
            rated.insert((qid, "A2".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(7);
        let got = sample_pair(&store, BASELINE, &alternates, &rated, &mut rng).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn single_unrated_index_is_eventually_returned() {
        let alternates = alts(&["A1"]);
        let (_dir, store) = fixture(&["0", "1", "2"], &["A1"]);

        let mut rated = HashSet::new();
        for idx in ["0", "1"] {
            let qid = question_id(idx);
            rated.insert((qid.clone(), BASELINE.to_string()));
            rated.insert((qid, "A1".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = false;
        for _ in 0..50 {
            let got = sample_pair(&store, BASELINE, &alternates, &rated, &mut rng).unwrap();
            let pair = got.expect("one combination is still open");
            assert_eq!(pair.question_id, "Q2");
            assert!(!rated.contains(&(pair.question_id.clone(), pair.baseline.agent.clone())));
            assert!(!rated.contains(&(pair.question_id.clone(), pair.alternate.agent.clone())));
            seen = true;
        }
        assert!(seen);
    }

    #[test]
    fn never_returns_a_rated_combination() {
        let alternates = alts(&["A1", "A2"]);
        let (_dir, store) = fixture(&["0", "1", "2", "3"], &["A1", "A2"]);

        let mut rated = HashSet::new();
        rated.insert(("Q1".to_string(), BASELINE.to_string()));
        rated.insert(("Q3".to_string(), "A2".to_string()));

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let got = sample_pair(&store, BASELINE, &alternates, &rated, &mut rng)
                .unwrap()
                .expect("open combinations remain");
            assert!(!rated.contains(&(got.question_id.clone(), got.baseline.agent.clone())));
            assert!(!rated.contains(&(got.question_id.clone(), got.alternate.agent.clone())));
        }
    }

    #[test]
    fn missing_alternate_file_skips_the_candidate() {
        let dir = tempdir().unwrap();
        write_response_file(dir.path(), "v", BASELINE, "0", "q", "base").unwrap();
        // no A1 file for index 0
        let store = ResponseStore::new(dir.path(), "v");

        let mut rng = StdRng::seed_from_u64(3);
        let got = sample_pair(&store, BASELINE, &alts(&["A1"]), &HashSet::new(), &mut rng).unwrap();
        assert!(got.is_none());
    }
}
