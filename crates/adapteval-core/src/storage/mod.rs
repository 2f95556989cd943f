use crate::config::AppConfig;
use crate::model::{EvaluationRow, UserRecord};
use async_trait::async_trait;
use std::sync::Arc;

pub mod cache;
pub mod memory;
pub mod sheets;

pub const EVALUATIONS_SHEET: &str = "evaluations";
pub const USERS_SHEET: &str = "users";

pub const EVALUATIONS_HEADER: [&str; 8] = [
    "user_id",
    "question_id",
    "agent",
    "relevance",
    "credibility",
    "uncertainty",
    "actionability",
    "recorded_at",
];

pub const USERS_HEADER: [&str; 7] = [
    "user_id",
    "username",
    "password_hash",
    "background",
    "role",
    "institution",
    "wants_updates",
];

/// The external tabular store, two sheets, read-all/append-row access.
/// Appends rely on the store's own serialization; there is no
/// optimistic-concurrency discipline on top.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// All rows of a sheet, header row included.
    async fn read_all(&self, sheet: &str) -> anyhow::Result<Vec<Vec<String>>>;
    async fn append_row(&self, sheet: &str, row: &[String]) -> anyhow::Result<()>;
    /// Replaces the full sheet content. Only the compensating paired
    /// delete uses this.
    async fn rewrite(&self, sheet: &str, rows: &[Vec<String>]) -> anyhow::Result<()>;
}

fn is_header(row: &[String], header: &[&str]) -> bool {
    row.first().map(|c| c.as_str()) == header.first().copied()
}

/// Parses evaluation rows, skipping the header and malformed rows.
pub fn parse_eval_rows(raw: &[Vec<String>]) -> Vec<EvaluationRow> {
    raw.iter()
        .filter(|r| !is_header(r, &EVALUATIONS_HEADER))
        .filter_map(|r| EvaluationRow::from_row(r))
        .collect()
}

/// Parses user rows, skipping the header and malformed rows.
pub fn parse_user_rows(raw: &[Vec<String>]) -> Vec<UserRecord> {
    raw.iter()
        .filter(|r| !is_header(r, &USERS_HEADER))
        .filter_map(|r| UserRecord::from_row(r))
        .collect()
}

pub fn header_row(header: &[&str]) -> Vec<String> {
    header.iter().map(|s| s.to_string()).collect()
}

/// Store factory for the configured backend. The sheets token comes
/// from the environment, never from the config file.
pub fn build_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn TabularStore>> {
    match cfg.store.backend.as_str() {
        "sheets" => {
            if cfg.store.spreadsheet_id.is_empty() {
                anyhow::bail!("store.spreadsheet_id must be set for the sheets backend");
            }
            let token = std::env::var(&cfg.store.api_token_env).map_err(|_| {
                anyhow::anyhow!(
                    "environment variable {} must carry the sheets API token",
                    cfg.store.api_token_env
                )
            })?;
            Ok(Arc::new(sheets::SheetsStore::new(
                cfg.store.spreadsheet_id.clone(),
                token,
            )))
        }
        "memory" => Ok(Arc::new(memory::MemStore::with_headers())),
        other => anyhow::bail!("unknown store backend: {}", other),
    }
}
