use thiserror::Error;

/// Why a single resource could not be loaded.
///
/// Recorded on the failed [`Page`](super::Page); only the seed's failure
/// ever leaves the engine, wrapped in [`CrawlError::RootUnreachable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("response body is not valid UTF-8")]
    Decode,

    #[error("fetch cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Transport(err.to_string()),
        }
    }
}

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("root page {url} is unreachable: {source}")]
    RootUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("could not find any sub-URLs on {url}")]
    NoSubresourcesFound { url: String },

    #[error("invalid keyword pattern: {0}")]
    InvalidKeyword(#[from] regex::Error),
}
