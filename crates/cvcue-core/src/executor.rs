// ── Command orchestration ──
//
// One invocation: compile the query (no I/O), resolve a session once,
// walk the pages, project. Partial results never escape a failed run.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::paginator::{PageFetcher, Paginator};
use crate::projector::{ProjectionMode, RenderableOutput, project};
use crate::query::{QueryIntent, compile};
use crate::session::{Authenticator, Session, SessionStore};

/// One page, or every page from the start index on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    SinglePage,
    All,
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub intent: QueryIntent,
    pub mode: ListMode,
    pub projection: ProjectionMode,
}

/// A completed listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOutcome {
    pub output: RenderableOutput,
    /// Last total the server reported, if it reported one.
    pub total_count: Option<u64>,
    /// Single-page mode only: the page came back full.
    pub has_more: bool,
    pub pages: usize,
}

pub struct CommandExecutor<A, F> {
    sessions: SessionStore,
    authenticator: A,
    fetcher: F,
    cancel: CancellationToken,
}

impl<A, F> CommandExecutor<A, F>
where
    A: Authenticator + Sync,
    F: PageFetcher + Sync,
{
    pub fn new(sessions: SessionStore, authenticator: A, fetcher: F) -> Self {
        Self {
            sessions,
            authenticator,
            fetcher,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Force a fresh login and cache it.
    pub async fn login(&self) -> Result<Session, CoreError> {
        Ok(self.sessions.login(&self.authenticator).await?)
    }

    pub async fn list(&self, request: &ListRequest) -> Result<ListOutcome, CoreError> {
        self.list_with_progress(request, |_, _| {}).await
    }

    /// `list`, reporting `(pages, records)` after each page of a full sweep.
    pub async fn list_with_progress(
        &self,
        request: &ListRequest,
        on_page: impl FnMut(usize, usize),
    ) -> Result<ListOutcome, CoreError> {
        let query = compile(&request.intent)?;
        let session = self.sessions.ensure_valid(&self.authenticator).await?;
        let paginator =
            Paginator::new(&self.fetcher, &session).with_cancellation(self.cancel.clone());

        let (records, total_count, has_more, pages) = match request.mode {
            ListMode::SinglePage => {
                let page = paginator.fetch_page(&query).await?;
                (page.records, page.total_count, page.has_more, 1)
            }
            ListMode::All => {
                let all = paginator.fetch_all_with(&query, on_page).await?;
                (all.records, all.total_count, false, all.pages)
            }
        };
        debug!("{} records from {pages} page(s)", records.len());

        Ok(ListOutcome {
            output: project(records, total_count, request.projection),
            total_count,
            has_more,
            pages,
        })
    }
}
