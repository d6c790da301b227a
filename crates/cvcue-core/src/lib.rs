// cvcue-core: Query composition and pagination engine between cvcue-api and the CLI.

pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod paginator;
pub mod projector;
pub mod query;
pub mod record;
pub mod remote;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ClientConfig;
pub use error::{AuthError, CacheError, CoreError, QueryBuildError};
pub use executor::{CommandExecutor, ListMode, ListOutcome, ListRequest};
pub use filter::{FilterClause, FilterExpression, FilterMode, FilterOperator};
pub use paginator::{PageFetcher, Paginator};
pub use projector::{
    CompactLine, CompactListing, CountSource, DEVICE_COLUMNS, DeviceTable, ProjectionMode,
    RenderableOutput,
};
pub use query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, QueryIntent, QuerySpec, SortSpec};
pub use record::{AggregatedResult, DeviceRecord, FetchedPage, PageResult};
pub use remote::CueAuthenticator;
pub use session::{
    Authenticator, DEFAULT_SAFETY_MARGIN, Session, SessionOwner, SessionStatus, SessionStore,
};

// Transport types callers need to build a `ClientConfig`.
pub use cvcue_api::{
    ApiKeyCredentials, CueClient, DEFAULT_SESSION_TIMEOUT_SECS, Error as ApiError, TlsMode,
    TransportConfig,
};
