//! Conversion of EFetch citation records into canonical [`Article`] values.

use tracing::warn;

use crate::entities::article::Article;
use crate::error::LitSyncError;
use crate::sources::pubmed::{PubmedArticleRecord, PubmedArticleSet};
use crate::utils::date;

const ARTICLE_URL_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";
const TITLE_PLACEHOLDER: &str = "[No title]";
const DOI_ID_TYPE: &str = "doi";

// Presentation markup PubMed embeds inside titles and abstracts; stripped
// before deserialization so those elements read as plain text.
const INLINE_MARKUP_TAGS: &[&str] = &[
    "<i>", "</i>", "<b>", "</b>", "<sup>", "</sup>", "<sub>", "</sub>", "<u>", "</u>",
];

/// Parse a batch EFetch document into articles, in document order.
///
/// Each record is converted independently: a record missing its required
/// substructure is logged and skipped, never aborting the batch. A document
/// that is not well-formed XML fails the whole batch and is fatal for the
/// query that fetched it. Duplicate PMIDs are both emitted; dedup belongs to
/// the sync layer.
pub fn parse_articles(xml: &str) -> Result<Vec<Article>, LitSyncError> {
    let cleaned = strip_inline_markup(xml);
    let set: PubmedArticleSet = quick_xml::de::from_str(&cleaned)?;

    let mut articles = Vec::with_capacity(set.articles.len());
    for record in set.articles {
        match article_from_record(record) {
            Ok(article) => articles.push(article),
            Err(err) => warn!(%err, "Skipping citation record that could not be parsed"),
        }
    }
    Ok(articles)
}

fn article_from_record(record: PubmedArticleRecord) -> Result<Article, LitSyncError> {
    let citation = record
        .medline_citation
        .ok_or(LitSyncError::MalformedRecord("MedlineCitation"))?;
    let node = citation
        .article
        .ok_or(LitSyncError::MalformedRecord("Article"))?;

    // An absent PMID is not a parse failure; the record is emitted with an
    // empty identifier and the sync layer treats it as un-dedupable.
    let pmid = citation
        .pmid
        .and_then(|pmid| pmid.value)
        .map(|value| value.trim().to_string())
        .unwrap_or_default();

    let title = node
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

    let abstract_text = node
        .abstract_node
        .map(|node| {
            node.sections
                .into_iter()
                .map(|section| section.value.unwrap_or_default())
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default();

    // The last doi-typed entry wins when the list carries more than one.
    let doi = record
        .pubmed_data
        .and_then(|data| data.article_id_list)
        .map(|list| list.ids)
        .unwrap_or_default()
        .into_iter()
        .filter(|id| id.id_type.as_deref() == Some(DOI_ID_TYPE))
        .map(|id| id.value.unwrap_or_default())
        .next_back()
        .unwrap_or_default();

    let publication_date = node
        .journal
        .and_then(|journal| journal.issue)
        .and_then(|issue| issue.pub_date)
        .and_then(|pub_date| {
            date::format_pub_date(
                pub_date.year.as_deref(),
                pub_date.month.as_deref(),
                pub_date.day.as_deref(),
            )
        });

    let url = article_url(&pmid);
    Ok(Article {
        pmid,
        title,
        abstract_text,
        doi,
        publication_date,
        url,
    })
}

fn article_url(pmid: &str) -> String {
    format!("{ARTICLE_URL_BASE}/{pmid}/")
}

fn strip_inline_markup(xml: &str) -> String {
    let mut out = xml.to_string();
    for tag in INLINE_MARKUP_TAGS {
        if out.contains(tag) {
            out = out.replace(tag, "");
        }
    }
    out
}
