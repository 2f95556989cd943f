use crate::model::AgentResponse;
use std::path::{Path, PathBuf};

/// Read-only store of precomputed answer files, one per
/// (agent, question-index) pair, laid out as
/// `<root>/<variant>/<agent>/response_<index>.json`.
pub struct ResponseStore {
    root: PathBuf,
    variant: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    Missing { agent: String, index: String },
    Unparsable { agent: String, index: String, error: String },
}

impl ResponseStore {
    pub fn new(root: impl Into<PathBuf>, variant: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            variant: variant.into(),
        }
    }

    fn agent_dir(&self, agent: &str) -> PathBuf {
        self.root.join(&self.variant).join(agent)
    }

    pub fn response_path(&self, agent: &str, index: &str) -> PathBuf {
        self.agent_dir(agent).join(format!("response_{}.json", index))
    }

    /// Question indices available for the given agent, taken from its
    /// directory listing. The baseline agent's listing defines the
    /// question universe.
    pub fn indices(&self, agent: &str) -> anyhow::Result<Vec<String>> {
        let dir = self.agent_dir(agent);
        let mut out = Vec::new();
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("failed to list {}: {}", dir.display(), e))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(idx) = name
                .strip_prefix("response_")
                .and_then(|s| s.strip_suffix(".json"))
            {
                out.push(idx.to_string());
            }
        }
        out.sort_by_key(|idx| idx.parse::<u64>().unwrap_or(u64::MAX));
        Ok(out)
    }

    /// Loads one response file. A missing file is no-data (`Ok(None)`),
    /// not an error; a file that exists but does not parse is an error.
    pub fn load(&self, agent: &str, index: &str) -> anyhow::Result<Option<AgentResponse>> {
        let path = self.response_path(agent, index);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => anyhow::bail!("failed to read {}: {}", path.display(), e),
        };
        let resp: AgentResponse = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
        Ok(Some(resp))
    }

    /// The canonical question text is the baseline agent's copy.
    pub fn question_text(&self, baseline: &str, index: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load(baseline, index)?.map(|r| r.question_text))
    }

    /// Checks every (agent, index) combination for missing or unparsable
    /// files, with the baseline listing as the index universe.
    pub fn audit(&self, baseline: &str, alternates: &[String]) -> anyhow::Result<Vec<AuditIssue>> {
        let indices = self.indices(baseline)?;
        let mut agents: Vec<&str> = vec![baseline];
        agents.extend(alternates.iter().map(|s| s.as_str()));

        let mut issues = Vec::new();
        for agent in agents {
            for idx in &indices {
                let path = self.response_path(agent, idx);
                if !path.exists() {
                    issues.push(AuditIssue::Missing {
                        agent: agent.to_string(),
                        index: idx.clone(),
                    });
                    continue;
                }
                if let Err(e) = self.load(agent, idx) {
                    issues.push(AuditIssue::Unparsable {
                        agent: agent.to_string(),
                        index: idx.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(issues)
    }
}

/// Test and demo fixture helper.
pub fn write_response_file(
    root: &Path,
    variant: &str,
    agent: &str,
    index: &str,
    question: &str,
    text: &str,
) -> anyhow::Result<()> {
    let dir = root.join(variant).join(agent);
    std::fs::create_dir_all(&dir)?;
    let body = serde_json::json!({
        "QuestionText": question,
        "ResponseText": text,
        "Agent": agent,
    });
    std::fs::write(
        dir.join(format!("response_{}.json", index)),
        serde_json::to_string_pretty(&body)?,
    )?;
    Ok(())
}
