// ── Pagination engine ──
//
// Drives a `PageFetcher` from the query's start index until a page comes
// back short. Pages are fetched strictly one after another; each request
// is issued only once the previous page has arrived and been judged.

use std::future::Future;

use futures_core::Stream;
use futures_util::{StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::query::QuerySpec;
use crate::record::{AggregatedResult, DeviceRecord, FetchedPage, PageResult};
use crate::session::Session;

/// Source of raw pages for a query.
pub trait PageFetcher {
    fn fetch_page(
        &self,
        session: &Session,
        query: &QuerySpec,
    ) -> impl Future<Output = Result<FetchedPage, cvcue_api::Error>> + Send;
}

/// Sequential page walker bound to one session.
pub struct Paginator<'a, F> {
    fetcher: &'a F,
    session: &'a Session,
    cancel: CancellationToken,
}

impl<'a, F> Paginator<'a, F>
where
    F: PageFetcher + Sync,
{
    pub fn new(fetcher: &'a F, session: &'a Session) -> Self {
        Self {
            fetcher,
            session,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between pages (or abandon an in-flight page) once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetch exactly one page at the query's start index.
    pub async fn fetch_page(&self, query: &QuerySpec) -> Result<PageResult, CoreError> {
        self.fetch_numbered(query, 1).await
    }

    async fn fetch_numbered(&self, query: &QuerySpec, page: usize) -> Result<PageResult, CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled { page });
        }
        debug!(
            "fetching page {page} (startindex {}, pagesize {})",
            query.start_index(),
            query.page_size()
        );

        let fetched = tokio::select! {
            () = self.cancel.cancelled() => return Err(CoreError::Cancelled { page }),
            result = self.fetcher.fetch_page(self.session, query) => result,
        }
        .map_err(|source| CoreError::PageFetch {
            page,
            start_index: query.start_index(),
            source,
        })?;

        let received = fetched.records.len();
        let has_more = u32::try_from(received).is_ok_and(|n| n == query.page_size());
        debug!("page {page}: {received} records, has_more={has_more}");

        Ok(PageResult {
            records: fetched.records,
            total_count: fetched.total_count,
            has_more,
        })
    }

    /// Every page from the query's start index, in order.
    ///
    /// The stream ends after the first short page, or after the first error.
    pub fn pages(&self, query: &QuerySpec) -> impl Stream<Item = Result<PageResult, CoreError>> + '_ {
        let query = query.clone();
        async_stream::try_stream! {
            let mut current = query;
            let mut page = 1usize;
            loop {
                let result = self.fetch_numbered(&current, page).await?;
                let has_more = result.has_more;
                let received = u64::try_from(result.records.len()).unwrap_or(u64::MAX);
                yield result;

                if !has_more {
                    break;
                }
                let Some(next) = current.start_index().checked_add(received) else {
                    warn!("start index overflow after page {page}, stopping");
                    break;
                };
                current = current.with_start_index(next);
                page += 1;
            }
        }
    }

    /// Every record from the query's start index, page boundaries hidden.
    pub fn records(
        &self,
        query: &QuerySpec,
    ) -> impl Stream<Item = Result<DeviceRecord, CoreError>> + '_ {
        self.pages(query)
            .map_ok(|page| futures_util::stream::iter(page.records.into_iter().map(Ok::<_, CoreError>)))
            .try_flatten()
    }

    /// Collect a full sweep. Any page failure aborts the whole sweep and
    /// discards what was collected so far.
    pub async fn fetch_all(&self, query: &QuerySpec) -> Result<AggregatedResult, CoreError> {
        self.fetch_all_with(query, |_, _| {}).await
    }

    /// `fetch_all`, calling `on_page(pages_so_far, records_so_far)` after
    /// each page arrives.
    pub async fn fetch_all_with(
        &self,
        query: &QuerySpec,
        mut on_page: impl FnMut(usize, usize),
    ) -> Result<AggregatedResult, CoreError> {
        let mut pages = std::pin::pin!(self.pages(query));

        let mut result = AggregatedResult::default();
        while let Some(page) = pages.next().await {
            let page = page?;
            result.pages += 1;
            on_page(result.pages, result.records.len() + page.records.len());
            if page.total_count.is_some() {
                result.total_count = page.total_count;
            }
            result.records.extend(page.records);
        }

        debug!(
            "sweep complete: {} records in {} pages",
            result.records.len(),
            result.pages
        );
        Ok(result)
    }
}
