use crate::model::{EvaluationRow, RatedPair};
use crate::storage::cache::RatedPairsCache;
use crate::storage::{parse_eval_rows, TabularStore, EVALUATIONS_SHEET};
use std::collections::HashSet;
use std::sync::Arc;

/// Append-only log of rating events over the external tabular store,
/// with a read-through cache of each rater's rated-pair set.
pub struct EvaluationLog {
    store: Arc<dyn TabularStore>,
    cache: RatedPairsCache,
}

impl EvaluationLog {
    pub fn new(store: Arc<dyn TabularStore>, cache: RatedPairsCache) -> Self {
        Self { store, cache }
    }

    /// Appends the two rows of one completed question, one per answer.
    /// Rows are never updated in place.
    pub async fn append_pair(&self, rows: [EvaluationRow; 2]) -> anyhow::Result<()> {
        let user_id = rows[0].user_id.clone();
        for row in &rows {
            self.store
                .append_row(EVALUATIONS_SHEET, &row.to_row())
                .await?;
        }
        self.cache.invalidate(&user_id);
        Ok(())
    }

    /// The rater's already-rated (question, agent) set, recomputed from
    /// the log on cache miss.
    pub async fn rated_pairs(&self, user_id: &str) -> anyhow::Result<Arc<HashSet<RatedPair>>> {
        if let Some(pairs) = self.cache.get(user_id) {
            return Ok(pairs);
        }
        let pairs: HashSet<RatedPair> = self
            .rows_for_user(user_id)
            .await?
            .into_iter()
            .map(|r| (r.question_id, r.agent))
            .collect();
        let pairs = Arc::new(pairs);
        self.cache.insert(user_id.to_string(), pairs.clone());
        Ok(pairs)
    }

    pub async fn all_rows(&self) -> anyhow::Result<Vec<EvaluationRow>> {
        let raw = self.store.read_all(EVALUATIONS_SHEET).await?;
        Ok(parse_eval_rows(&raw))
    }

    pub async fn rows_for_user(&self, user_id: &str) -> anyhow::Result<Vec<EvaluationRow>> {
        Ok(self
            .all_rows()
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect())
    }

    /// Compensating delete: removes both rows for (rater, question) by
    /// rewriting the sheet minus the matching rows. The header and every
    /// other rater's rows are preserved verbatim. Returns the number of
    /// rows removed.
    pub async fn delete_question(&self, user_id: &str, question_id: &str) -> anyhow::Result<usize> {
        let raw = self.store.read_all(EVALUATIONS_SHEET).await?;
        let mut kept: Vec<Vec<String>> = Vec::with_capacity(raw.len());
        let mut removed = 0usize;
        for row in raw {
            let matches = EvaluationRow::from_row(&row)
                .map(|r| r.user_id == user_id && r.question_id == question_id)
                .unwrap_or(false);
            if matches {
                removed += 1;
            } else {
                kept.push(row);
            }
        }
        if removed > 0 {
            self.store.rewrite(EVALUATIONS_SHEET, &kept).await?;
        }
        self.cache.invalidate(user_id);
        Ok(removed)
    }
}
