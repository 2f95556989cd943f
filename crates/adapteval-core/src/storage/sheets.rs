use super::TabularStore;
use async_trait::async_trait;
use serde_json::json;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets values-API client. One spreadsheet, one worksheet per
/// logical sheet, bearer-token auth. Appends map to the API's atomic
/// `values:append`; rewrite is `values:clear` followed by a bulk update.
pub struct SheetsStore {
    pub spreadsheet_id: String,
    pub api_token: String,
    pub client: reqwest::Client,
}

impl SheetsStore {
    pub fn new(spreadsheet_id: String, api_token: String) -> Self {
        Self {
            spreadsheet_id,
            api_token,
            client: reqwest::Client::new(),
        }
    }

    fn values_url(&self, sheet: &str, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}!A:Z{}",
            BASE_URL, self.spreadsheet_id, sheet, suffix
        )
    }

    async fn check(resp: reqwest::Response, what: &str) -> anyhow::Result<reqwest::Response> {
        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("sheets API {} failed ({}): {}", what, status, error_text);
        }
        Ok(resp)
    }
}

#[async_trait]
impl TabularStore for SheetsStore {
    async fn read_all(&self, sheet: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let resp = self
            .client
            .get(self.values_url(sheet, ""))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;
        let resp = Self::check(resp, "read").await?;

        let body: serde_json::Value = resp.json().await?;
        let rows = body
            .get("values")
            .and_then(|v| v.as_array())
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| {
                                cells
                                    .iter()
                                    .map(|c| c.as_str().unwrap_or_default().to_string())
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn append_row(&self, sheet: &str, row: &[String]) -> anyhow::Result<()> {
        let body = json!({ "values": [row] });
        let resp = self
            .client
            .post(self.values_url(sheet, ":append?valueInputOption=RAW"))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        Self::check(resp, "append").await?;
        Ok(())
    }

    async fn rewrite(&self, sheet: &str, rows: &[Vec<String>]) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(self.values_url(sheet, ":clear"))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&json!({}))
            .send()
            .await?;
        Self::check(resp, "clear").await?;

        if rows.is_empty() {
            return Ok(());
        }

        let body = json!({ "values": rows });
        let resp = self
            .client
            .put(format!(
                "{}/{}/values/{}!A1?valueInputOption=RAW",
                BASE_URL, self.spreadsheet_id, sheet
            ))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        Self::check(resp, "update").await?;
        Ok(())
    }
}
