use serde::{Deserialize, Serialize};

/// One precomputed answer file. Files are produced upstream and loaded
/// read-only; the field names on disk are the upstream ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(rename = "QuestionText")]
    pub question_text: String,
    #[serde(rename = "ResponseText")]
    pub response_text: String,
    #[serde(rename = "Agent")]
    pub agent: String,
}

/// The four quality criteria, each scored 1..=10. Zero is the "unset"
/// sentinel coming from an untouched score widget and never persists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreSet {
    #[serde(default)]
    pub relevance: u8,
    #[serde(default)]
    pub credibility: u8,
    #[serde(default)]
    pub uncertainty: u8,
    #[serde(default)]
    pub actionability: u8,
}

impl ScoreSet {
    pub fn criteria(&self) -> [(&'static str, u8); 4] {
        [
            ("relevance", self.relevance),
            ("credibility", self.credibility),
            ("uncertainty", self.uncertainty),
            ("actionability", self.actionability),
        ]
    }

    /// Rejects submissions with any criterion unset (0) or out of range.
    /// The message is user-visible.
    pub fn validate(&self) -> Result<(), String> {
        let mut unset = Vec::new();
        for (name, v) in self.criteria() {
            if v == 0 {
                unset.push(name);
            } else if v > 10 {
                return Err(format!("score for {} must be between 1 and 10", name));
            }
        }
        if unset.is_empty() {
            Ok(())
        } else {
            Err(format!("please score all criteria (missing: {})", unset.join(", ")))
        }
    }
}

/// One stored rating event: four scores for one (rater, question, agent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub user_id: String,
    pub question_id: String,
    pub agent: String,
    pub relevance: u8,
    pub credibility: u8,
    pub uncertainty: u8,
    pub actionability: u8,
    pub recorded_at: String,
}

impl EvaluationRow {
    pub fn new(user_id: &str, question_id: &str, agent: &str, scores: &ScoreSet) -> Self {
        Self {
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            agent: agent.to_string(),
            relevance: scores.relevance,
            credibility: scores.credibility,
            uncertainty: scores.uncertainty,
            actionability: scores.actionability,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn scores(&self) -> ScoreSet {
        ScoreSet {
            relevance: self.relevance,
            credibility: self.credibility,
            uncertainty: self.uncertainty,
            actionability: self.actionability,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.question_id.clone(),
            self.agent.clone(),
            self.relevance.to_string(),
            self.credibility.to_string(),
            self.uncertainty.to_string(),
            self.actionability.to_string(),
            self.recorded_at.clone(),
        ]
    }

    /// Tolerant parse of one sheet row. Score cells that fail to parse
    /// become 0 so a hand-edited sheet degrades instead of aborting reads.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 7 {
            return None;
        }
        let score = |i: usize| row.get(i).and_then(|c| c.parse::<u8>().ok()).unwrap_or(0);
        Some(Self {
            user_id: row[0].clone(),
            question_id: row[1].clone(),
            agent: row[2].clone(),
            relevance: score(3),
            credibility: score(4),
            uncertainty: score(5),
            actionability: score(6),
            recorded_at: row.get(7).cloned().unwrap_or_default(),
        })
    }
}

/// One registered rater. Informational fields are set once at
/// registration and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    /// sha256 hex; empty in identifier-only deployments.
    pub password_hash: String,
    pub background: String,
    pub role: String,
    pub institution: String,
    pub wants_updates: String,
}

impl UserRecord {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.username.clone(),
            self.password_hash.clone(),
            self.background.clone(),
            self.role.clone(),
            self.institution.clone(),
            self.wants_updates.clone(),
        ]
    }

    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 2 {
            return None;
        }
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Some(Self {
            user_id: row[0].clone(),
            username: row[1].clone(),
            password_hash: cell(2),
            background: cell(3),
            role: cell(4),
            institution: cell(5),
            wants_updates: cell(6),
        })
    }
}

/// Registration form payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaterProfile {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub wants_updates: bool,
}

/// A (question_id, agent) combination a rater has already scored.
pub type RatedPair = (String, String);

pub fn question_id(index: &str) -> String {
    format!("Q{}", index)
}

/// Numeric part of a question id, for natural ordering (Q2 before Q10).
pub fn question_ord(question_id: &str) -> u64 {
    question_id
        .trim_start_matches('Q')
        .parse::<u64>()
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_unset_criterion() {
        let s = ScoreSet {
            relevance: 5,
            credibility: 0,
            uncertainty: 3,
            actionability: 9,
        };
        let err = s.validate().unwrap_err();
        assert!(err.contains("credibility"), "{}", err);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let s = ScoreSet {
            relevance: 11,
            credibility: 1,
            uncertainty: 1,
            actionability: 1,
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_accepts_full_range() {
        let s = ScoreSet {
            relevance: 1,
            credibility: 10,
            uncertainty: 5,
            actionability: 7,
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn evaluation_row_roundtrip() {
        let scores = ScoreSet {
            relevance: 8,
            credibility: 7,
            uncertainty: 6,
            actionability: 5,
        };
        let row = EvaluationRow::new("u-1", "Q3", "Climsight", &scores);
        let cells = row.to_row();
        let back = EvaluationRow::from_row(&cells).unwrap();
        assert_eq!(back.user_id, "u-1");
        assert_eq!(back.question_id, "Q3");
        assert_eq!(back.agent, "Climsight");
        assert_eq!(back.relevance, 8);
        assert_eq!(back.actionability, 5);
    }

    #[test]
    fn malformed_score_cell_degrades_to_zero() {
        let cells: Vec<String> = ["u", "Q1", "a", "x", "2", "3", "4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = EvaluationRow::from_row(&cells).unwrap();
        assert_eq!(row.relevance, 0);
        assert_eq!(row.credibility, 2);
    }

    #[test]
    fn question_natural_order() {
        assert!(question_ord("Q2") < question_ord("Q10"));
    }
}
