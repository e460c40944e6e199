//! Deferred calls: one page, a page stream, or everything

use super::quickbase::QuickBase;
use crate::error::Result;
use crate::ops::{Marshaled, Operation};
use crate::pagination::{records_count, PaginationState, Paginator};
use crate::value::QbValue;
use futures::future::BoxFuture;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::future::IntoFuture;
use tracing::debug;

/// A prepared call that has not been sent yet
///
/// Awaiting it fetches a single page. [`pages`](Self::pages) streams every
/// page in order and [`all`](Self::all) folds them into one response.
/// Pages are requested one after another; dropping the stream stops
/// paging after the page in flight.
#[derive(Debug)]
#[must_use = "calls do nothing unless awaited or iterated"]
pub struct PendingCall<'a> {
    client: &'a QuickBase,
    operation: Operation,
    params: QbValue,
    max_pages: Option<usize>,
}

/// Iteration state carried between page fetches
struct PageCursor {
    request: Marshaled,
    paginator: Box<dyn Paginator>,
    state: PaginationState,
    max_pages: Option<usize>,
}

impl<'a> PendingCall<'a> {
    pub(crate) fn new(client: &'a QuickBase, operation: Operation, params: QbValue) -> Self {
        Self {
            client,
            operation,
            params,
            max_pages: None,
        }
    }

    /// Operation this call will run
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Parameters as they will be marshaled
    pub fn params(&self) -> &QbValue {
        &self.params
    }

    /// Stop after `n` pages (at least one)
    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = Some(n.max(1));
        self
    }

    /// Fetch a single page
    pub async fn send(self) -> Result<QbValue> {
        let request = self.operation.def().marshal(&self.params.to_json());
        let value = self.client.execute(self.operation, &request).await?;
        Ok(self.client.revive(self.operation, value))
    }

    /// Stream of pages, fetched lazily and strictly in sequence
    pub fn pages(self) -> impl Stream<Item = Result<QbValue>> + Send + 'a {
        let client = self.client;
        let operation = self.operation;
        self.raw_pages()
            .map_ok(move |page| client.revive(operation, page))
    }

    /// Fetch every page and fold them into one response
    pub async fn all(self) -> Result<QbValue> {
        let client = self.client;
        let operation = self.operation;
        let pages: Vec<Value> = self.raw_pages().try_collect().await?;

        debug!("{}: accumulated {} page(s)", operation, pages.len());

        let value = operation.def().pagination.accumulate(pages);
        Ok(client.revive(operation, value))
    }

    fn raw_pages(self) -> impl Stream<Item = Result<Value>> + Send + 'a {
        let def = self.operation.def();
        let cursor = PageCursor {
            request: def.marshal(&self.params.to_json()),
            paginator: def.pagination.paginator(def.method),
            state: PaginationState::new(),
            max_pages: self.max_pages,
        };

        let client = self.client;
        let operation = self.operation;
        stream::try_unfold(cursor, move |cursor| next_page(client, operation, cursor))
    }
}

/// Fetch the next page, or `None` once paging is finished
async fn next_page(
    client: &QuickBase,
    operation: Operation,
    mut cursor: PageCursor,
) -> Result<Option<(Value, PageCursor)>> {
    if cursor.state.done {
        return Ok(None);
    }
    if let Some(max) = cursor.max_pages {
        if cursor.state.pages >= max {
            debug!("{}: page cap of {} reached", operation, max);
            return Ok(None);
        }
    }

    let page = client.execute(operation, &cursor.request).await?;
    cursor.state.pages += 1;

    let count = records_count(&page, operation.def().pagination.records_field());
    let next = cursor
        .paginator
        .process_response(&page, count, &mut cursor.state);

    debug!(
        "{}: page {} returned {} record(s), {} so far",
        operation, cursor.state.pages, count, cursor.state.total_fetched
    );

    cursor.request.apply(&next);
    Ok(Some((page, cursor)))
}

impl<'a> IntoFuture for PendingCall<'a> {
    type Output = Result<QbValue>;
    type IntoFuture = BoxFuture<'a, Result<QbValue>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
