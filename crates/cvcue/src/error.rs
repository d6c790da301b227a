//! CLI error types with miette diagnostics.
//!
//! Maps core and config failures into user-facing errors with actionable
//! help text and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use cvcue_config::ConfigError;
use cvcue_core::{ApiError, AuthError, CacheError, CoreError, QueryBuildError};

/// Exit codes, one per failure class.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    /// Unreachable host, or an HTTP error while fetching pages.
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Query ────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(cvcue::invalid_query),
        help(
            "Filters take the form field:operator:value, e.g. --filter name:contains:Arista\n\
             Valid operators: equals, contains, notContains, greaterThan, lessThan,\n\
             greaterThanOrEquals, lessThanOrEquals, notEquals"
        )
    )]
    Query(#[from] QueryBuildError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cvcue::validation))]
    Validation { field: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(cvcue::auth_failed),
        help(
            "Verify the key id, key value and client id for profile '{profile}'.\n\
             They come from --key-id/--key-value/--client-id, the CV_CUE_* environment\n\
             variables, or the profile in the config file."
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("Session exchange with CV-CUE failed")]
    #[diagnostic(
        code(cvcue::login_failed),
        help("The login endpoint answered with an error. Re-run with -vv to see the exchange.")
    )]
    LoginFailed {
        #[source]
        source: ApiError,
    },

    #[error("The server no longer accepts the cached session")]
    #[diagnostic(
        code(cvcue::session_rejected),
        help("The session cache has been cleared. Run the command again to log in.")
    )]
    SessionRejected,

    #[error("Missing {field} for profile '{profile}'")]
    #[diagnostic(
        code(cvcue::missing_setting),
        help("Set {env}, pass the matching flag, or add it to the profile in {path}")
    )]
    MissingSetting {
        field: String,
        env: String,
        profile: String,
        path: String,
    },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach {target}")]
    #[diagnostic(
        code(cvcue::connection_failed),
        help(
            "Check the base URL and your network connection.\n\
             For appliances with self-signed certificates, try --insecure (-k)."
        )
    )]
    ConnectionFailed {
        target: String,
        #[source]
        source: ApiError,
    },

    #[error("Request timed out {context}")]
    #[diagnostic(
        code(cvcue::timeout),
        help("Increase the timeout with --timeout or try a smaller --pagesize.")
    )]
    Timeout { context: String },

    #[error("Fetching page {page} (startindex {start_index}) failed")]
    #[diagnostic(
        code(cvcue::page_failed),
        help("No partial results were printed. Re-run with -vv to see the requests.")
    )]
    PageFailed {
        page: usize,
        start_index: u64,
        #[source]
        source: ApiError,
    },

    #[error("CV-CUE request failed")]
    #[diagnostic(code(cvcue::api_error))]
    Api(#[source] ApiError),

    #[error("Cancelled")]
    #[diagnostic(code(cvcue::cancelled))]
    Cancelled,

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cvcue::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(cvcue::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(cvcue::session_cache))]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not encode output: {0}")]
    #[diagnostic(code(cvcue::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Query(_) | Self::Validation { .. } | Self::MissingSetting { .. } => {
                exit_code::USAGE
            }
            Self::AuthFailed { .. } | Self::LoginFailed { .. } | Self::SessionRejected => {
                exit_code::AUTH
            }
            Self::ConnectionFailed { .. } | Self::PageFailed { .. } | Self::Api(_) => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::CANCELLED,
            Self::ProfileNotFound { .. }
            | Self::Config(_)
            | Self::Cache(_)
            | Self::Io(_)
            | Self::Json(_) => exit_code::GENERAL,
        }
    }

    /// Attach the profile name to authentication failures.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.into(),
            },
            other => other,
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                context: "talking to CV-CUE".into(),
            }
        } else {
            Self::Api(err)
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::MissingField {
                field,
                env,
                profile,
            } => Self::MissingSetting {
                field: field.into(),
                env: env.into(),
                profile,
                path: cvcue_config::config_path().display().to_string(),
            },
            ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            ConfigError::Figment(err) => Self::Config(err),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Query(err) => Self::Query(err),

            CoreError::Auth(AuthError::Rejected { message }) => Self::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::Auth(AuthError::Unreachable { url, source }) => {
                if source.is_timeout() {
                    Self::Timeout {
                        context: format!("logging in at {url}"),
                    }
                } else {
                    Self::ConnectionFailed {
                        target: url,
                        source,
                    }
                }
            }
            CoreError::Auth(AuthError::Exchange { source }) => Self::LoginFailed { source },

            CoreError::PageFetch { source, .. } if source.is_rejection() => Self::SessionRejected,
            CoreError::PageFetch {
                page,
                start_index,
                source,
            } => {
                if source.is_timeout() {
                    Self::Timeout {
                        context: format!("fetching page {page} (startindex {start_index})"),
                    }
                } else if source.is_connect() {
                    Self::ConnectionFailed {
                        target: format!("CV-CUE while fetching page {page}"),
                        source,
                    }
                } else {
                    Self::PageFailed {
                        page,
                        start_index,
                        source,
                    }
                }
            }

            CoreError::Cancelled { .. } => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ApiError {
        ApiError::Api {
            status,
            message: "upstream".into(),
        }
    }

    #[test]
    fn failed_login_exchange_is_an_auth_failure() {
        let err = CliError::from(CoreError::Auth(AuthError::Exchange { source: api(500) }));
        assert!(matches!(err, CliError::LoginFailed { .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn failed_page_is_a_transport_failure() {
        let err = CliError::from(CoreError::PageFetch {
            page: 2,
            start_index: 100,
            source: api(502),
        });
        assert!(matches!(err, CliError::PageFailed { page: 2, .. }));
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn rejected_page_is_a_session_failure() {
        let err = CliError::from(CoreError::PageFetch {
            page: 1,
            start_index: 0,
            source: ApiError::SessionExpired,
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn missing_setting_is_a_usage_error() {
        let err = CliError::from(ConfigError::MissingField {
            field: "key id",
            env: "CV_CUE_KEY_ID",
            profile: "default".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn exit_classes_are_distinct() {
        let codes = [
            CliError::from(CoreError::Auth(AuthError::Exchange { source: api(500) })).exit_code(),
            CliError::from(CoreError::PageFetch {
                page: 1,
                start_index: 0,
                source: api(502),
            })
            .exit_code(),
            CliError::Validation {
                field: "timeout".into(),
                reason: "not a number".into(),
            }
            .exit_code(),
            CliError::Io(std::io::Error::other("disk")).exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b, "exit classes collide: {codes:?}");
            }
        }
    }
}
