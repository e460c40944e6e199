//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{NoPaginator, SkipPaginator, TokenPaginator};
use crate::types::Method;
use serde_json::Value;
use std::collections::HashMap;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq)]
pub enum NextPage {
    /// More pages available; merge these into the previous request
    Continue {
        /// Query parameters to add/replace
        query_params: HashMap<String, String>,
        /// Body fields to set, addressed by key path
        body_fields: Vec<(Vec<String>, Value)>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a single query parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(key.into(), value.into());
        Self::Continue {
            query_params: params,
            body_fields: Vec::new(),
        }
    }

    /// Create a continuation that sets one (possibly nested) body field
    pub fn with_body_field(path: &[&str], value: impl Into<Value>) -> Self {
        Self::Continue {
            query_params: HashMap::new(),
            body_fields: vec![(
                path.iter().map(|s| (*s).to_string()).collect(),
                value.into(),
            )],
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Where a skip cursor goes on the follow-up request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipTarget {
    /// `?skip=N`
    Query,
    /// `{"options": {"skip": N}}`
    BodyOptions,
}

/// How an operation pages, fixed per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    /// Single response
    #[default]
    None,

    /// Offset paging driven by `metadata.skip` and the count/total fields
    Skip {
        /// Cursor placement
        target: SkipTarget,
        /// Array holding the page's items
        records: &'static str,
        /// Metadata field with the number of items on this page
        count: &'static str,
        /// Metadata field with the number of items overall
        total: &'static str,
    },

    /// Opaque continuation token
    Token {
        /// Token field, read from `metadata.<field>` or `<field>` and sent
        /// back under the same name
        field: &'static str,
        /// Array holding the page's items
        records: &'static str,
    },
}

impl Pagination {
    /// Skip paging over `data` with the usual record metadata
    pub const fn skip(target: SkipTarget) -> Self {
        Self::Skip {
            target,
            records: "data",
            count: "numRecords",
            total: "totalRecords",
        }
    }

    /// Token paging
    pub const fn token(field: &'static str, records: &'static str) -> Self {
        Self::Token { field, records }
    }

    /// Field whose array is concatenated across pages
    pub fn records_field(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Skip { records, .. } | Self::Token { records, .. } => Some(*records),
        }
    }

    /// Metadata count field rewritten after accumulation
    pub fn count_field(&self) -> Option<&'static str> {
        match self {
            Self::Skip { count, .. } => Some(*count),
            _ => None,
        }
    }

    pub fn is_paginated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Fold fetched pages into one response
    ///
    /// The first page is the envelope. Its records array becomes the
    /// concatenation of every page's array, the metadata count is set to
    /// the combined length and any continuation token is dropped.
    pub fn accumulate(&self, pages: Vec<Value>) -> Value {
        let mut pages = pages.into_iter();
        let Some(mut first) = pages.next() else {
            return Value::Null;
        };
        let Some(field) = self.records_field() else {
            return first;
        };

        let mut records = match first.get_mut(field).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        for mut page in pages {
            if let Some(Value::Array(items)) = page.get_mut(field).map(Value::take) {
                records.extend(items);
            }
        }
        let total = records.len();

        if let Some(envelope) = first.as_object_mut() {
            envelope.insert(field.to_string(), Value::Array(records));
            if let Self::Token { field: token, .. } = self {
                envelope.remove(*token);
            }
        }

        if let Some(metadata) = first.get_mut("metadata").and_then(Value::as_object_mut) {
            match self {
                Self::Skip { count, .. } => {
                    // `skip` stays at the first page's offset, where the combined data starts
                    metadata.insert((*count).to_string(), total.into());
                }
                Self::Token { field: token, .. } => {
                    metadata.remove(*token);
                }
                Self::None => {}
            }
        }

        first
    }

    /// Build the strategy for a request sent with `method`
    pub fn paginator(&self, method: Method) -> Box<dyn Paginator> {
        match *self {
            Self::None => Box::new(NoPaginator),
            Self::Skip {
                target,
                count,
                total,
                ..
            } => Box::new(SkipPaginator::new(target, count, total)),
            Self::Token { field, .. } => Box::new(TokenPaginator::new(field, method)),
        }
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Items skipped so far (skip paging)
    pub skip: u64,
    /// Last `nextPageToken` seen
    pub next_page_token: Option<String>,
    /// Last `nextToken` seen
    pub next_token: Option<String>,
    /// Pages fetched
    pub pages: usize,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }

    /// Last token seen for a token field
    pub fn token(&self, field: &str) -> Option<&str> {
        match field {
            "nextPageToken" => self.next_page_token.as_deref(),
            _ => self.next_token.as_deref(),
        }
    }

    /// Remember the token for a token field
    pub fn set_token(&mut self, field: &str, token: String) {
        match field {
            "nextPageToken" => self.next_page_token = Some(token),
            _ => self.next_token = Some(token),
        }
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Process a response and determine if there's a next page
    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage;
}

/// Number of items in a page's records array
pub fn records_count(body: &Value, records: Option<&str>) -> usize {
    records
        .and_then(|field| body.get(field))
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
