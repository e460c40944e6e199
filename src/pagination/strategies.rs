//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, PaginationState, Paginator, SkipTarget};
use crate::types::Method;
use serde_json::Value;

// ============================================================================
// Skip Pagination
// ============================================================================

/// Skip-based pagination (records queries, reports, relationships)
///
/// Responses carry `metadata: { skip, numRecords, totalRecords }` (or the
/// operation's own count/total names). The next request skips past what
/// has been returned so far.
#[derive(Debug, Clone)]
pub struct SkipPaginator {
    /// Cursor placement
    pub target: SkipTarget,
    /// Metadata field with the page's item count
    pub count_field: &'static str,
    /// Metadata field with the overall item count
    pub total_field: &'static str,
}

impl SkipPaginator {
    /// Create a new skip paginator
    pub fn new(target: SkipTarget, count_field: &'static str, total_field: &'static str) -> Self {
        Self {
            target,
            count_field,
            total_field,
        }
    }
}

impl Paginator for SkipPaginator {
    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        let metadata = |name: &str| {
            body.get("metadata")
                .and_then(|m| m.get(name))
                .and_then(Value::as_u64)
        };

        let skip = metadata("skip").unwrap_or(state.skip);
        let count = metadata(self.count_field).unwrap_or(records_count as u64);

        if records_count == 0 || count == 0 {
            state.mark_done();
            return NextPage::Done;
        }

        let next = skip + count;
        match metadata(self.total_field) {
            Some(total) if next < total => {
                state.skip = next;
                match self.target {
                    SkipTarget::Query => NextPage::with_param("skip", next.to_string()),
                    SkipTarget::BodyOptions => NextPage::with_body_field(&["options", "skip"], next),
                }
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

// ============================================================================
// Token Pagination
// ============================================================================

/// Continuation token pagination (users, audit, analytics)
///
/// The token is read from `metadata.<field>` or a top-level `<field>`
/// and sent back in the query for GET requests, in the body otherwise.
#[derive(Debug, Clone)]
pub struct TokenPaginator {
    /// Token field name
    pub field: &'static str,
    /// Verb of the paged request
    pub method: Method,
}

impl TokenPaginator {
    /// Create a new token paginator
    pub fn new(field: &'static str, method: Method) -> Self {
        Self { field, method }
    }
}

impl Paginator for TokenPaginator {
    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        let token = body
            .get("metadata")
            .and_then(|m| m.get(self.field))
            .or_else(|| body.get(self.field))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            state.mark_done();
            return NextPage::Done;
        };

        // An empty page or a repeated token would loop forever
        if records_count == 0 || state.token(self.field) == Some(token) {
            state.mark_done();
            return NextPage::Done;
        }

        state.set_token(self.field, token.to_string());
        if self.method == Method::GET {
            NextPage::with_param(self.field, token)
        } else {
            NextPage::with_body_field(&[self.field], token)
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn process_response(
        &self,
        _body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);
        state.mark_done();
        NextPage::Done
    }
}
