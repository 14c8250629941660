//! NCBI E-utilities client: ESearch resolves a query to PMIDs, EFetch
//! retrieves the citation detail document for a batch of PMIDs.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Value;

use crate::error::LitSyncError;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const EUTILS_BASE_ENV: &str = "LITSYNC_EUTILS_BASE";
const PUBMED_API: &str = "pubmed";

/// Fixed result cap per query, newest publications first.
const SEARCH_RESULT_LIMIT: usize = 20;

pub struct PubMedClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
}

impl PubMedClient {
    pub fn new() -> Result<Self, LitSyncError> {
        Ok(Self {
            client: crate::sources::http_client()?,
            base: crate::sources::env_base(EUTILS_BASE, EUTILS_BASE_ENV),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(base: String) -> Result<Self, LitSyncError> {
        Ok(Self {
            client: crate::sources::http_client()?,
            base: Cow::Owned(base),
        })
    }

    pub(crate) fn base_url() -> Cow<'static, str> {
        crate::sources::env_base(EUTILS_BASE, EUTILS_BASE_ENV)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Resolve a free-text query into PMIDs ordered by publication date.
    ///
    /// A response that lacks the `esearchresult.idlist` path yields an empty
    /// list; only a transport failure or non-success status is an error.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, LitSyncError> {
        let url = self.endpoint("esearch.fcgi");
        let retmax = SEARCH_RESULT_LIMIT.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("db", "pubmed"),
                ("retmode", "json"),
                ("sort", "pub+date"),
                ("retmax", retmax.as_str()),
                ("term", query),
            ])
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(LitSyncError::Api {
                api: PUBMED_API.to_string(),
                message: format!(
                    "esearch HTTP {status}: {}",
                    crate::sources::body_excerpt(&bytes)
                ),
            });
        }

        let data: Value = serde_json::from_slice(&bytes).map_err(|source| LitSyncError::ApiJson {
            api: PUBMED_API.to_string(),
            source,
        })?;
        let ids = data
            .get("esearchresult")
            .and_then(|result| result.get("idlist"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    /// Fetch the EFetch detail document for a batch of PMIDs in one call.
    /// Callers must not pass an empty batch; the pipeline short-circuits
    /// before reaching this.
    pub async fn fetch_details(&self, pmids: &[String]) -> Result<String, LitSyncError> {
        let url = self.endpoint("efetch.fcgi");
        let ids = pmids.join(",");
        let resp = self
            .client
            .get(&url)
            .query(&[("db", "pubmed"), ("retmode", "xml"), ("id", ids.as_str())])
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(LitSyncError::Api {
                api: PUBMED_API.to_string(),
                message: format!(
                    "efetch HTTP {status}: {}",
                    crate::sources::body_excerpt(&bytes)
                ),
            });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// EFetch XML models. Every nesting level is optional so a record missing any
// intermediate node still deserializes; the transform layer decides what a
// usable record needs.

#[derive(Debug, Default, Deserialize)]
pub struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticleRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PubmedArticleRecord {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: Option<MedlineCitation>,
    #[serde(rename = "PubmedData")]
    pub pubmed_data: Option<PubmedData>,
}

#[derive(Debug, Deserialize)]
pub struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<PmidNode>,
    #[serde(rename = "Article")]
    pub article: Option<ArticleNode>,
}

#[derive(Debug, Deserialize)]
pub struct PmidNode {
    #[serde(rename = "$text")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleNode {
    #[serde(rename = "Journal")]
    pub journal: Option<Journal>,
    #[serde(rename = "ArticleTitle")]
    pub title: Option<String>,
    #[serde(rename = "Abstract")]
    pub abstract_node: Option<AbstractNode>,
}

#[derive(Debug, Deserialize)]
pub struct AbstractNode {
    #[serde(rename = "AbstractText", default)]
    pub sections: Vec<AbstractText>,
}

#[derive(Debug, Deserialize)]
pub struct AbstractText {
    #[serde(rename = "$text")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Journal {
    #[serde(rename = "JournalIssue")]
    pub issue: Option<JournalIssue>,
}

#[derive(Debug, Deserialize)]
pub struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
pub struct PubDate {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Day")]
    pub day: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PubmedData {
    #[serde(rename = "ArticleIdList")]
    pub article_id_list: Option<ArticleIdList>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleIdList {
    #[serde(rename = "ArticleId", default)]
    pub ids: Vec<ArticleId>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleId {
    #[serde(rename = "@IdType")]
    pub id_type: Option<String>,
    #[serde(rename = "$text")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_builds_expected_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("db", "pubmed"))
            .and(query_param("retmode", "json"))
            .and(query_param("sort", "pub+date"))
            .and(query_param("retmax", "20"))
            .and(query_param("term", "covid-19 vaccine"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": {"idlist": ["111", "222"]}
            })))
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        let ids = client.search("covid-19 vaccine").await.unwrap();
        assert_eq!(ids, vec!["111", "222"]);
    }

    #[tokio::test]
    async fn search_returns_empty_when_idlist_is_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"header": {}})),
            )
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        assert!(client.search("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_returns_empty_when_idlist_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": {"idlist": "not-a-list"}
            })))
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        assert!(client.search("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_propagates_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        let err = client.search("anything").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("unavailable"));
    }

    #[tokio::test]
    async fn fetch_details_joins_pmids_into_one_batch_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .and(query_param("db", "pubmed"))
            .and(query_param("retmode", "xml"))
            .and(query_param("id", "111,222"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<PubmedArticleSet></PubmedArticleSet>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        let xml = client
            .fetch_details(&["111".to_string(), "222".to_string()])
            .await
            .unwrap();
        assert!(xml.contains("PubmedArticleSet"));
    }

    #[tokio::test]
    async fn fetch_details_propagates_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        let err = client
            .fetch_details(&["111".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
