//! Notion API client: existence check by numeric PMID and page creation.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::article::Article;
use crate::error::LitSyncError;

const NOTION_BASE: &str = "https://api.notion.com/v1";
const NOTION_BASE_ENV: &str = "LITSYNC_NOTION_BASE";
const NOTION_API: &str = "notion";
pub(crate) const NOTION_VERSION: &str = "2022-06-28";
const DOI_RESOLVER_BASE: &str = "https://doi.org";
const PMID_PROPERTY: &str = "PMID";

pub struct NotionClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
    token: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(token: String, database_id: String) -> Result<Self, LitSyncError> {
        Ok(Self {
            client: crate::sources::http_client()?,
            base: crate::sources::env_base(NOTION_BASE, NOTION_BASE_ENV),
            token,
            database_id,
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(
        base: String,
        token: String,
        database_id: String,
    ) -> Result<Self, LitSyncError> {
        Ok(Self {
            client: crate::sources::http_client()?,
            base: Cow::Owned(base),
            token,
            database_id,
        })
    }

    pub(crate) fn base_url() -> Cow<'static, str> {
        crate::sources::env_base(NOTION_BASE, NOTION_BASE_ENV)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Look up an existing page keyed by the numeric PMID property.
    ///
    /// Returns `Ok(None)` when the PMID is not numeric or when the lookup
    /// itself fails at the transport level; both cases fall through to page
    /// creation rather than blocking the run.
    pub async fn find_page_by_pmid(&self, pmid: &str) -> Result<Option<String>, LitSyncError> {
        let Ok(pmid_number) = pmid.trim().parse::<i64>() else {
            warn!(pmid, "PMID is not numeric; existence check skipped");
            return Ok(None);
        };

        let url = self.endpoint(&format!("databases/{}/query", self.database_id));
        let body = DatabaseQueryRequest {
            filter: PmidFilter {
                property: PMID_PROPERTY,
                number: NumberEquals {
                    equals: pmid_number,
                },
            },
            page_size: 1,
        };
        let resp = match self.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(err) => {
                warn!(%err, pmid, "Notion database query failed; treating as no existing page");
                return Ok(None);
            }
        };
        let status = resp.status();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, pmid, "Notion database query failed; treating as no existing page");
                return Ok(None);
            }
        };
        if !status.is_success() {
            warn!(
                pmid,
                status = status.as_u16(),
                body = %crate::sources::body_excerpt(&bytes),
                "Notion database query failed; treating as no existing page"
            );
            return Ok(None);
        }

        let data: DatabaseQueryResponse =
            serde_json::from_slice(&bytes).map_err(|source| LitSyncError::ApiJson {
                api: NOTION_API.to_string(),
                source,
            })?;
        Ok(data
            .results
            .into_iter()
            .next()
            .map(|page| page.id.unwrap_or_default()))
    }

    /// Create a database page for the article. Non-2xx is fatal for this
    /// article; the runner catches it so the rest of the batch continues.
    pub async fn create_page(&self, article: &Article) -> Result<(), LitSyncError> {
        let url = self.endpoint("pages");
        let body = CreatePageRequest {
            parent: PageParent {
                database_id: self.database_id.clone(),
            },
            properties: PageProperties::from_article(article),
        };
        let resp = self.post(&url).json(&body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(LitSyncError::Api {
                api: NOTION_API.to_string(),
                message: format!(
                    "page create HTTP {status}: {}",
                    crate::sources::body_excerpt(&bytes)
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct DatabaseQueryRequest {
    filter: PmidFilter,
    page_size: u32,
}

#[derive(Debug, Serialize)]
struct PmidFilter {
    property: &'static str,
    number: NumberEquals,
}

#[derive(Debug, Serialize)]
struct NumberEquals {
    equals: i64,
}

#[derive(Debug, Deserialize)]
struct DatabaseQueryResponse {
    #[serde(default)]
    results: Vec<DatabaseQueryResult>,
}

#[derive(Debug, Deserialize)]
struct DatabaseQueryResult {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePageRequest {
    parent: PageParent,
    properties: PageProperties,
}

#[derive(Debug, Serialize)]
struct PageParent {
    database_id: String,
}

/// Property payload for page creation. Absent fields are skipped during
/// serialization, so the outgoing property set never contains a null value.
#[derive(Debug, Serialize)]
pub(crate) struct PageProperties {
    #[serde(rename = "Title")]
    title: TitleProperty,
    #[serde(rename = "PubMed URL")]
    pubmed_url: UrlProperty,
    #[serde(rename = "Publication Date", skip_serializing_if = "Option::is_none")]
    publication_date: Option<DateProperty>,
    #[serde(rename = "DOI URL", skip_serializing_if = "Option::is_none")]
    doi_url: Option<UrlProperty>,
    #[serde(rename = "Abstract", skip_serializing_if = "Option::is_none")]
    abstract_text: Option<RichTextProperty>,
    #[serde(rename = "PMID", skip_serializing_if = "Option::is_none")]
    pmid: Option<NumberProperty>,
}

impl PageProperties {
    pub(crate) fn from_article(article: &Article) -> Self {
        Self {
            title: TitleProperty {
                title: vec![RichText::new(&article.title)],
            },
            pubmed_url: UrlProperty {
                url: article.url.clone(),
            },
            publication_date: article.publication_date.as_ref().map(|date| DateProperty {
                date: DateStart {
                    start: date.clone(),
                },
            }),
            doi_url: (!article.doi.is_empty()).then(|| UrlProperty {
                url: format!("{DOI_RESOLVER_BASE}/{}", article.doi),
            }),
            abstract_text: (!article.abstract_text.is_empty()).then(|| RichTextProperty {
                rich_text: vec![RichText::new(&article.abstract_text)],
            }),
            pmid: article
                .pmid
                .trim()
                .parse::<i64>()
                .ok()
                .map(|number| NumberProperty { number }),
        }
    }
}

#[derive(Debug, Serialize)]
struct TitleProperty {
    title: Vec<RichText>,
}

#[derive(Debug, Serialize)]
struct RichTextProperty {
    rich_text: Vec<RichText>,
}

#[derive(Debug, Serialize)]
struct RichText {
    text: TextContent,
}

impl RichText {
    fn new(content: &str) -> Self {
        Self {
            text: TextContent {
                content: content.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct TextContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct UrlProperty {
    url: String,
}

#[derive(Debug, Serialize)]
struct DateProperty {
    date: DateStart,
}

#[derive(Debug, Serialize)]
struct DateStart {
    start: String,
}

#[derive(Debug, Serialize)]
struct NumberProperty {
    number: i64,
}
