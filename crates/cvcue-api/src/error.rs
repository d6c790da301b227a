use thiserror::Error;

/// Top-level error type for the `cvcue-api` crate.
///
/// Covers every failure mode of the CV-CUE REST surface: session
/// exchange, transport, HTTP status errors, and response decoding.
/// `cvcue-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (bad key id / key value, disabled client, etc.)
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// Login returned success but no `JSESSIONID` cookie.
    #[error("Login response did not carry a session cookie")]
    MissingSessionCookie,

    /// The server refused the session token on a data request.
    #[error("Session expired or revoked -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A header value could not be constructed (e.g. a token with control characters).
    #[error("Invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status from a CV-CUE endpoint.
    #[error("CV-CUE API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credentials themselves were refused.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::MissingSessionCookie | Self::SessionExpired
        )
    }

    /// Returns `true` if the transport gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the server could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
