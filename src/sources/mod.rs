//! Shared plumbing for the external HTTP sources.

use std::borrow::Cow;

use crate::error::LitSyncError;

pub mod notion;
pub mod pubmed;

const BODY_EXCERPT_MAX: usize = 512;

pub(crate) fn http_client() -> Result<reqwest::Client, LitSyncError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("litsync/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Base URL for an API, overridable through an environment variable so tests
/// and alternate deployments can point at a different host.
pub(crate) fn env_base(default: &'static str, env_key: &str) -> Cow<'static, str> {
    match std::env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Cow::Owned(value),
        _ => Cow::Borrowed(default),
    }
}

/// Truncated, lossily-decoded response body for error messages.
pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut excerpt: String = text.chars().take(BODY_EXCERPT_MAX).collect();
    if text.chars().count() > BODY_EXCERPT_MAX {
        excerpt.push('…');
    }
    excerpt
}
