// ── Core error types ──
//
// Four failure families, each detectable at a different stage:
// `QueryBuildError` before any I/O, `AuthError` during session
// resolution, page-fetch failures during aggregation, and `CacheError`
// around the session file. `CoreError` is the umbrella the executor
// returns; the CLI maps it onto exit classes.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed filter, sort, or pagination input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryBuildError {
    #[error("invalid filter '{input}': expected field:operator:value")]
    MalformedFilter { input: String },

    #[error("invalid filter operator '{operator}' in '{input}': must be one of {valid}")]
    UnknownOperator {
        operator: String,
        input: String,
        valid: String,
    },

    #[error("invalid page size {0}: must be between 1 and {max}", max = crate::query::MAX_PAGE_SIZE)]
    PageSize(i64),

    #[error("invalid start index {0}: must not be negative")]
    StartIndex(i64),

    #[error("sort field must not be empty")]
    EmptySortField,
}

/// Session exchange failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The API refused the configured key id / key value / client id.
    #[error("credentials rejected: {message}")]
    Rejected { message: String },

    /// The API could not be reached at all (DNS, refused, TLS, timeout).
    #[error("cannot reach {url}")]
    Unreachable {
        url: String,
        #[source]
        source: cvcue_api::Error,
    },

    /// Anything else that went wrong during the exchange.
    #[error("session exchange failed")]
    Exchange {
        #[source]
        source: cvcue_api::Error,
    },
}

impl AuthError {
    /// Classify an API error raised while logging in.
    pub fn from_api(err: cvcue_api::Error, url: &url::Url) -> Self {
        if err.is_rejection() {
            Self::Rejected {
                message: err.to_string(),
            }
        } else if matches!(
            err,
            cvcue_api::Error::Transport(_) | cvcue_api::Error::Tls(_)
        ) {
            Self::Unreachable {
                url: url.to_string(),
                source: err,
            }
        } else {
            Self::Exchange { source: err }
        }
    }
}

/// Session cache file failures. Never fatal to a listing.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot read session cache {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session cache {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write session cache {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot remove session cache {}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Query(#[from] QueryBuildError),

    #[error("authentication failed")]
    Auth(#[from] AuthError),

    /// Page `page` (1-based) failed; everything fetched before it is discarded.
    #[error("page {page} (startindex {start_index}) failed")]
    PageFetch {
        page: usize,
        start_index: u64,
        #[source]
        source: cvcue_api::Error,
    },

    #[error("operation cancelled at page {page}")]
    Cancelled { page: usize },
}

impl CoreError {
    /// Underlying transport error, when the failure came from the wire.
    pub fn api_error(&self) -> Option<&cvcue_api::Error> {
        match self {
            Self::PageFetch { source, .. }
            | Self::Auth(AuthError::Unreachable { source, .. } | AuthError::Exchange { source }) => {
                Some(source)
            }
            _ => None,
        }
    }
}
