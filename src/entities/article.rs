use serde::Serialize;
use tracing::debug;

use crate::error::LitSyncError;
use crate::sources::pubmed::PubMedClient;
use crate::transform;

/// Canonical article record, built once during parsing and never mutated.
/// `pmid` is the sole dedup key; an empty `pmid` is valid output of the
/// parser but unusable for deduplication downstream.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    /// Empty string means absent.
    pub doi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    pub url: String,
}

/// Resolve a free-text query into articles: ESearch for PMIDs, one batched
/// EFetch for details, then parse. An empty search result short-circuits
/// without touching the detail endpoint. Search and fetch errors propagate
/// to the caller; they are fatal for this query only.
pub async fn fetch_for_query(
    pubmed: &PubMedClient,
    query: &str,
) -> Result<Vec<Article>, LitSyncError> {
    let pmids = pubmed.search(query).await?;
    debug!(count = pmids.len(), query, "ESearch returned PMIDs");
    if pmids.is_empty() {
        return Ok(Vec::new());
    }
    let xml = pubmed.fetch_details(&pmids).await?;
    transform::article::parse_articles(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TWO_RECORD_XML: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
<PubmedArticle>
    <MedlineCitation>
        <PMID Version="1">111</PMID>
        <Article>
            <Journal>
                <JournalIssue>
                    <PubDate><Year>2021</Year><Month>Mar</Month><Day>15</Day></PubDate>
                </JournalIssue>
            </Journal>
            <ArticleTitle>First article</ArticleTitle>
        </Article>
    </MedlineCitation>
</PubmedArticle>
<PubmedArticle>
    <MedlineCitation>
        <PMID Version="1">222</PMID>
        <Article>
            <ArticleTitle>Second article</ArticleTitle>
        </Article>
    </MedlineCitation>
    <PubmedData>
        <ArticleIdList>
            <ArticleId IdType="pubmed">222</ArticleId>
            <ArticleId IdType="doi">10.1000/x</ArticleId>
        </ArticleIdList>
    </PubmedData>
</PubmedArticle>
</PubmedArticleSet>"#;

    #[tokio::test]
    async fn empty_search_short_circuits_the_detail_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": {"idlist": []}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        let articles = fetch_for_query(&client, "no hits").await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn pipeline_yields_parsed_articles_in_search_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("term", "covid-19 vaccine"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "esearchresult": {"idlist": ["111", "222"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .and(query_param("id", "111,222"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TWO_RECORD_XML))
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        let articles = fetch_for_query(&client, "covid-19 vaccine").await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].pmid, "111");
        assert_eq!(articles[0].publication_date.as_deref(), Some("2021-03-15"));
        assert!(articles[0].doi.is_empty());
        assert_eq!(articles[1].pmid, "222");
        assert_eq!(articles[1].doi, "10.1000/x");
        assert_eq!(articles[1].publication_date, None);
        assert_eq!(articles[1].url, "https://pubmed.ncbi.nlm.nih.gov/222/");
    }

    #[tokio::test]
    async fn search_failure_propagates_to_the_caller() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = PubMedClient::new_for_test(server.uri()).unwrap();
        assert!(fetch_for_query(&client, "anything").await.is_err());
    }
}
