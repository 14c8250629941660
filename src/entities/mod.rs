pub mod article;

use serde::Serialize;

use crate::error::LitSyncError;

/// Outcome of one query: either the number of articles the pipeline
/// returned, or the error that aborted it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryReport {
    pub fn succeeded(query: &str, article_count: usize) -> Self {
        Self {
            query: query.to_string(),
            article_count: Some(article_count),
            error: None,
        }
    }

    pub fn failed(query: &str, error: &LitSyncError) -> Self {
        Self {
            query: query.to_string(),
            article_count: None,
            error: Some(error.to_string()),
        }
    }
}

/// Ordered per-query outcomes for one full pass over the query list.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub queries: Vec<QueryReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.queries
            .iter()
            .filter(|report| report.error.is_none())
            .count()
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Literature Sync Run\n\n");
        out.push_str("| Query | Articles | Error |\n");
        out.push_str("|-------|----------|-------|\n");
        for report in &self.queries {
            let articles = report
                .article_count
                .map(|count| count.to_string())
                .unwrap_or_else(|| "-".to_string());
            let error = report.error.as_deref().unwrap_or("-");
            out.push_str(&format!("| {} | {} | {} |\n", report.query, articles, error));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} queries succeeded\n",
            self.succeeded(),
            self.queries.len()
        ));
        out
    }
}
