use thiserror::Error;

#[derive(Debug, Error)]
pub enum LitSyncError {
    #[error("Required setting {0} is not set")]
    MissingConfig(String),

    #[error("{api} API error: {message}")]
    Api { api: String, message: String },

    #[error("{api} returned invalid JSON: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid citation XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Malformed citation record: missing {0}")]
    MalformedRecord(&'static str),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode output: {0}")]
    Output(#[source] serde_json::Error),
}
