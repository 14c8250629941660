//! Query runner and Notion synchronization.
//!
//! Failure isolation is layered: a search/fetch error aborts only its query,
//! a page-creation error aborts only its article, and a failed existence
//! check degrades to "assume no duplicate" so the run keeps moving.

use tracing::{error, info};

use crate::config::Config;
use crate::entities::article::{self, Article};
use crate::entities::{QueryReport, RunSummary};
use crate::error::LitSyncError;
use crate::sources::notion::NotionClient;
use crate::sources::pubmed::PubMedClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Skipped,
}

pub struct SyncEngine {
    pubmed: PubMedClient,
    notion: NotionClient,
}

impl SyncEngine {
    pub fn new(config: &Config) -> Result<Self, LitSyncError> {
        Ok(Self {
            pubmed: PubMedClient::new()?,
            notion: NotionClient::new(
                config.notion_token.clone(),
                config.notion_database_id.clone(),
            )?,
        })
    }

    #[cfg(test)]
    fn new_for_test(pubmed: PubMedClient, notion: NotionClient) -> Self {
        Self { pubmed, notion }
    }

    /// Process every query in order, one at a time. Per-query failures are
    /// recorded in the summary and never stop the remaining queries.
    pub async fn run(&self, queries: &[String]) -> RunSummary {
        let mut reports = Vec::with_capacity(queries.len());
        for raw in queries {
            let query = raw.trim();
            if query.is_empty() {
                continue;
            }
            info!(query, "Processing query");
            match self.run_query(query).await {
                Ok(article_count) => {
                    reports.push(QueryReport::succeeded(query, article_count));
                }
                Err(err) => {
                    error!(query, %err, "Query failed");
                    reports.push(QueryReport::failed(query, &err));
                }
            }
        }
        RunSummary { queries: reports }
    }

    async fn run_query(&self, query: &str) -> Result<usize, LitSyncError> {
        let articles = article::fetch_for_query(&self.pubmed, query).await?;
        info!(query, count = articles.len(), "Fetched articles");
        for article in &articles {
            // One bad article must not stop the rest of this query's batch.
            if let Err(err) = self.upsert(article).await {
                error!(pmid = %article.pmid, %err, "Failed to sync article");
            }
        }
        Ok(articles.len())
    }

    /// Create a page for the article unless one with the same PMID already
    /// exists. The existence check is best-effort: when it cannot answer
    /// (non-numeric PMID, transport failure) creation proceeds anyway.
    pub async fn upsert(&self, article: &Article) -> Result<SyncAction, LitSyncError> {
        if let Some(page_id) = self.notion.find_page_by_pmid(&article.pmid).await? {
            info!(pmid = %article.pmid, page_id = %page_id, "Page already exists, skipping");
            return Ok(SyncAction::Skipped);
        }
        self.notion.create_page(article).await?;
        info!(pmid = %article.pmid, "Created page");
        Ok(SyncAction::Created)
    }
}
