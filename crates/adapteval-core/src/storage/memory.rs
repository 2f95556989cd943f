use super::{header_row, TabularStore, EVALUATIONS_HEADER, EVALUATIONS_SHEET, USERS_HEADER, USERS_SHEET};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stand-in for the spreadsheet, used by tests and local
/// smoke runs.
#[derive(Default)]
pub struct MemStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both application sheets provisioned with their header rows, as a
    /// deployed spreadsheet would be.
    pub fn with_headers() -> Self {
        let store = Self::new();
        {
            let mut sheets = store.sheets.lock().unwrap();
            sheets.insert(EVALUATIONS_SHEET.to_string(), vec![header_row(&EVALUATIONS_HEADER)]);
            sheets.insert(USERS_SHEET.to_string(), vec![header_row(&USERS_HEADER)]);
        }
        store
    }
}

#[async_trait]
impl TabularStore for MemStore {
    async fn read_all(&self, sheet: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let sheets = self.sheets.lock().unwrap();
        Ok(sheets.get(sheet).cloned().unwrap_or_default())
    }

    async fn append_row(&self, sheet: &str, row: &[String]) -> anyhow::Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        sheets.entry(sheet.to_string()).or_default().push(row.to_vec());
        Ok(())
    }

    async fn rewrite(&self, sheet: &str, rows: &[Vec<String>]) -> anyhow::Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        sheets.insert(sheet.to_string(), rows.to_vec());
        Ok(())
    }
}
