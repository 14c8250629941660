//! Connectivity checks for the external APIs the sync depends on.

use std::time::Instant;

use crate::config;
use crate::error::LitSyncError;
use crate::sources::notion::NotionClient;
use crate::sources::pubmed::PubMedClient;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub api: String,
    pub status: String,
    pub latency: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.healthy == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# litsync Health Check\n\n");
        out.push_str("| API | Status | Latency |\n");
        out.push_str("|-----|--------|---------|\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                row.api, row.status, row.latency
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} APIs healthy\n",
            self.healthy, self.total
        ));
        out
    }
}

async fn check_one(api: &str, request: reqwest::RequestBuilder) -> HealthRow {
    let start = Instant::now();
    match request.send().await {
        Ok(resp) => {
            let status = resp.status();
            let elapsed = start.elapsed().as_millis();
            if status.is_success() {
                HealthRow {
                    api: api.to_string(),
                    status: "ok".into(),
                    latency: format!("{elapsed}ms"),
                }
            } else {
                HealthRow {
                    api: api.to_string(),
                    status: "error".into(),
                    latency: format!("{elapsed}ms (HTTP {})", status.as_u16()),
                }
            }
        }
        Err(err) => {
            let reason = if err.is_timeout() {
                "timeout"
            } else if err.is_connect() {
                "connect"
            } else {
                "error"
            };
            HealthRow {
                api: api.to_string(),
                status: "error".into(),
                latency: reason.into(),
            }
        }
    }
}

pub async fn run(json: bool) -> Result<(), LitSyncError> {
    let client = crate::sources::http_client()?;
    let mut rows = Vec::new();

    let esearch = format!(
        "{}/esearch.fcgi",
        PubMedClient::base_url().trim_end_matches('/')
    );
    rows.push(
        check_one(
            "PubMed E-utilities",
            client.get(&esearch).query(&[
                ("db", "pubmed"),
                ("retmode", "json"),
                ("retmax", "1"),
                ("term", "health"),
            ]),
        )
        .await,
    );

    // The Notion API rejects anonymous requests, so this row only exists
    // when a token is configured.
    if let Ok(token) = std::env::var(config::NOTION_TOKEN_ENV) {
        let users = format!("{}/users", NotionClient::base_url().trim_end_matches('/'));
        rows.push(
            check_one(
                "Notion",
                client
                    .get(&users)
                    .query(&[("page_size", "1")])
                    .bearer_auth(token.trim())
                    .header("Notion-Version", crate::sources::notion::NOTION_VERSION),
            )
            .await,
        );
    }

    let healthy = rows.iter().filter(|row| row.status == "ok").count();
    let report = HealthReport {
        healthy,
        total: rows.len(),
        rows,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(LitSyncError::Output)?
        );
    } else {
        print!("{}", report.to_markdown());
        if !report.all_healthy() {
            println!("\nSome APIs are unreachable; sync runs may fail.");
        }
    }
    Ok(())
}
