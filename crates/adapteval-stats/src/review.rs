use crate::Criterion;
use adapteval_core::model::{question_ord, EvaluationRow, UserRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-agent mean scores for one question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionAgentSummary {
    pub agent: String,
    pub n: u32,
    /// Mean per criterion in `Criterion::ALL` order; `None` when no set
    /// scores exist for that criterion.
    pub means: [Option<f64>; 4],
}

/// Everything the admin review needs for one question, minus the
/// response texts (the caller attaches those from the response store).
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub question_id: String,
    pub evaluations: u32,
    pub evaluators: u32,
    pub agents: Vec<QuestionAgentSummary>,
    pub roles: Vec<(String, u32)>,
    pub institutions: Vec<(String, u32)>,
}

/// Per-question aggregation in natural question order, with rater
/// demographics joined from the users sheet.
pub fn question_summaries(
    rows: &[EvaluationRow],
    users: &[UserRecord],
) -> Vec<QuestionSummary> {
    let by_id: HashMap<&str, &UserRecord> =
        users.iter().map(|u| (u.user_id.as_str(), u)).collect();

    let mut by_question: BTreeMap<&str, Vec<&EvaluationRow>> = BTreeMap::new();
    for row in rows {
        by_question.entry(&row.question_id).or_default().push(row);
    }

    let mut out: Vec<QuestionSummary> = Vec::with_capacity(by_question.len());
    for (qid, q_rows) in by_question {
        let mut per_agent: BTreeMap<&str, Vec<&EvaluationRow>> = BTreeMap::new();
        let mut evaluators: std::collections::HashSet<&str> = Default::default();
        let mut roles: BTreeMap<String, u32> = BTreeMap::new();
        let mut institutions: BTreeMap<String, u32> = BTreeMap::new();

        for row in &q_rows {
            per_agent.entry(&row.agent).or_default().push(row);
            evaluators.insert(&row.user_id);
            if let Some(user) = by_id.get(row.user_id.as_str()) {
                if !user.role.trim().is_empty() {
                    *roles.entry(user.role.clone()).or_default() += 1;
                }
                if !user.institution.trim().is_empty() {
                    *institutions.entry(user.institution.clone()).or_default() += 1;
                }
            }
        }

        let agents = per_agent
            .into_iter()
            .map(|(agent, agent_rows)| {
                let mut means: [Option<f64>; 4] = [None; 4];
                for (ci, criterion) in Criterion::ALL.iter().enumerate() {
                    let vs: Vec<f64> = agent_rows
                        .iter()
                        .filter_map(|r| criterion.value(r))
                        .collect();
                    if !vs.is_empty() {
                        means[ci] = Some(vs.iter().sum::<f64>() / vs.len() as f64);
                    }
                }
                QuestionAgentSummary {
                    agent: agent.to_string(),
                    n: agent_rows.len() as u32,
                    means,
                }
            })
            .collect();

        out.push(QuestionSummary {
            question_id: qid.to_string(),
            evaluations: q_rows.len() as u32,
            evaluators: evaluators.len() as u32,
            agents,
            roles: roles.into_iter().collect(),
            institutions: institutions.into_iter().collect(),
        });
    }

    out.sort_by_key(|q| question_ord(&q.question_id));
    out
}
